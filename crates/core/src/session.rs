use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{Attempt, Generation, Language, LoadError, Score};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has not been started")]
    NotStarted,

    #[error("session already completed")]
    Completed,

    #[error("a load is already in progress")]
    Busy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Handle for one outstanding load. Only the newest ticket may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: Generation,
    language: Language,
}

impl LoadTicket {
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }
}

/// What happened when a load result was handed back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { items: usize },
    Failed(LoadError),
    /// The ticket was superseded; the result was dropped unseen.
    Discarded,
}

/// Whether a successful load zeroes the running score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetPolicy {
    Fresh,
    KeepScore,
}

//
// ─── FETCH GUARD ───────────────────────────────────────────────────────────────
//

/// In-flight flag plus generation counter for one page's remote fetches.
#[derive(Debug, Clone, Default)]
pub struct FetchGuard {
    generation: Generation,
    loading: bool,
}

impl FetchGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start a fetch unless one is already outstanding.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Busy` while a fetch is in flight.
    pub fn begin(&mut self) -> Result<Generation, SessionError> {
        if self.loading {
            return Err(SessionError::Busy);
        }
        Ok(self.supersede())
    }

    /// Start a fetch unconditionally; any outstanding one becomes stale.
    pub fn supersede(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.loading = true;
        self.generation
    }

    /// Mark `generation` as resolved. Returns false if it is stale.
    pub fn settle(&mut self, generation: Generation) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        true
    }

    /// Invalidate any outstanding fetch without starting a new one.
    pub fn abandon(&mut self) {
        self.generation = self.generation.next();
        self.loading = false;
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One playthrough of a game page: the loaded items, a cursor into them and
/// the running score.
///
/// Every transition is a method on this value; controllers own exactly one
/// session and project it into a view after each call.
pub struct Session<I> {
    language: Language,
    items: Vec<I>,
    cursor: usize,
    score: Score,
    status: SessionStatus,
    guard: FetchGuard,
    marks: Vec<Option<bool>>,
    submissions: u32,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl<I> Session<I> {
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            language,
            items: Vec::new(),
            cursor: 0,
            score: Score::default(),
            status: SessionStatus::NotStarted,
            guard: FetchGuard::new(),
            marks: Vec::new(),
            submissions: 0,
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn items(&self) -> &[I] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.guard.is_loading()
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.guard.generation()
    }

    /// Responses submitted since the last reset, scored or not.
    #[must_use]
    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn current(&self) -> Option<&I> {
        match self.status {
            SessionStatus::InProgress => self.items.get(self.cursor),
            _ => None,
        }
    }

    /// Verdict recorded for the item at `index`, if it has been scored.
    #[must_use]
    pub fn mark(&self, index: usize) -> Option<bool> {
        self.marks.get(index).copied().flatten()
    }

    /// Request content for `language`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Busy` while another load is outstanding.
    pub fn begin_load(&mut self, language: Language) -> Result<LoadTicket, SessionError> {
        let generation = self.guard.begin()?;
        Ok(LoadTicket {
            generation,
            language,
        })
    }

    /// Request content for `language`, invalidating any outstanding load.
    pub fn supersede_load(&mut self, language: Language) -> LoadTicket {
        LoadTicket {
            generation: self.guard.supersede(),
            language,
        }
    }

    /// Drop interest in any outstanding load.
    pub fn abandon_load(&mut self) {
        self.guard.abandon();
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// Stale tickets are discarded without touching state. Failures only
    /// clear the in-flight flag. An empty batch counts as `LoadError::Empty`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<I>, LoadError>,
        policy: ResetPolicy,
        now: DateTime<Utc>,
    ) -> LoadOutcome {
        if !self.guard.settle(ticket.generation) {
            return LoadOutcome::Discarded;
        }

        let items = match result {
            Ok(items) if items.is_empty() => return LoadOutcome::Failed(LoadError::Empty),
            Ok(items) => items,
            Err(err) => return LoadOutcome::Failed(err),
        };

        let count = items.len();
        self.language = ticket.language;
        self.marks = vec![None; count];
        self.items = items;
        self.cursor = 0;
        self.status = SessionStatus::InProgress;
        self.completed_at = None;
        if policy == ResetPolicy::Fresh || self.started_at.is_none() {
            self.score = Score::default();
            self.submissions = 0;
            self.started_at = Some(now);
        }
        LoadOutcome::Applied { items: count }
    }

    /// Judge a response to the current item. Only the first verdict per item
    /// moves the score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` unless the session is in progress.
    pub fn judge(
        &mut self,
        response: impl Into<String>,
        is_correct: bool,
    ) -> Result<Attempt, SessionError> {
        self.require_in_progress()?;
        self.submissions = self.submissions.saturating_add(1);

        let index = self.cursor;
        let counted = match self.marks.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(is_correct);
                self.score.record(is_correct);
                true
            }
            _ => false,
        };

        Ok(Attempt {
            item_index: index,
            response: response.into(),
            is_correct,
            counted,
        })
    }

    /// Score a response unconditionally, for games that judge many
    /// responses per item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` unless the session is in progress.
    pub fn tally(
        &mut self,
        response: impl Into<String>,
        is_correct: bool,
    ) -> Result<Attempt, SessionError> {
        self.require_in_progress()?;
        self.submissions = self.submissions.saturating_add(1);
        self.score.record(is_correct);
        Ok(Attempt {
            item_index: self.cursor,
            response: response.into(),
            is_correct,
            counted: true,
        })
    }

    /// Count a submission that does not affect the score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` unless the session is in progress.
    pub fn note_attempt(&mut self) -> Result<(), SessionError> {
        self.require_in_progress()?;
        self.submissions = self.submissions.saturating_add(1);
        Ok(())
    }

    /// Swap the current item for a newer server rendition of it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` unless the session is in progress.
    pub fn replace_current(&mut self, item: I) -> Result<(), SessionError> {
        self.require_in_progress()?;
        let slot = self
            .items
            .get_mut(self.cursor)
            .ok_or(SessionError::Completed)?;
        *slot = item;
        Ok(())
    }

    /// Move to the next item. Reaching the end completes the session;
    /// further calls leave it untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first successful load.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<SessionStatus, SessionError> {
        match self.status {
            SessionStatus::NotStarted => Err(SessionError::NotStarted),
            SessionStatus::Completed => Ok(SessionStatus::Completed),
            SessionStatus::InProgress => {
                self.cursor = (self.cursor + 1).min(self.items.len());
                if self.cursor == self.items.len() {
                    self.status = SessionStatus::Completed;
                    self.completed_at = Some(now);
                }
                Ok(self.status)
            }
        }
    }

    /// Move to the previous item, clamped at the first. From `Completed`
    /// this re-enters the last item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first successful load.
    pub fn retreat(&mut self) -> Result<SessionStatus, SessionError> {
        match self.status {
            SessionStatus::NotStarted => Err(SessionError::NotStarted),
            SessionStatus::Completed => {
                self.cursor = self.items.len().saturating_sub(1);
                self.status = SessionStatus::InProgress;
                self.completed_at = None;
                Ok(self.status)
            }
            SessionStatus::InProgress => {
                self.cursor = self.cursor.saturating_sub(1);
                Ok(self.status)
            }
        }
    }

    /// Replay the loaded items from the start with a zeroed score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` if nothing has been loaded.
    pub fn restart(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.status == SessionStatus::NotStarted {
            return Err(SessionError::NotStarted);
        }
        self.cursor = 0;
        self.score = Score::default();
        self.submissions = 0;
        self.marks = vec![None; self.items.len()];
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        self.completed_at = None;
        Ok(())
    }

    fn require_in_progress(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::InProgress if self.cursor < self.items.len() => Ok(()),
            SessionStatus::NotStarted => Err(SessionError::NotStarted),
            _ => Err(SessionError::Completed),
        }
    }
}

impl<I> fmt::Debug for Session<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("language", &self.language)
            .field("items_len", &self.items.len())
            .field("cursor", &self.cursor)
            .field("score", &self.score)
            .field("status", &self.status)
            .field("guard", &self.guard)
            .field("submissions", &self.submissions)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
