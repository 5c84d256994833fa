use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use lingo_core::Clock;
use lingo_core::model::{Attempt, Language, LoadError, WordPage};
use lingo_core::session::{LoadOutcome, ResetPolicy, Session, SessionError, SessionStatus};
use lingo_core::validation::{GameKind, ValidationStrategy};

use super::{PendingLoad, begin_load, log_outcome};
use crate::auth::AuthGuard;
use crate::error::ControllerError;
use crate::loader::ContentLoader;
use crate::view::DragDropView;

/// Word pairs shown together on one board.
pub const WORDS_PER_PAGE: usize = 4;

/// How long a wrong drop stays highlighted.
pub const MISMATCH_REVERT_MS: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCard {
    pub word: String,
    pub matched: bool,
}

/// A translation label bound to the word it answers. `pair` is its position
/// within the page, stable across reshuffles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCard {
    pub label: String,
    pub answer: String,
    pub pair: usize,
    pub matched: bool,
}

/// Locked positions of one page: source slots and target pair positions.
///
/// Positions rather than words, so repeated words on a page lock separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMatches {
    sources: HashSet<usize>,
    targets: HashSet<usize>,
}

impl PageMatches {
    #[must_use]
    pub fn source_locked(&self, slot: usize) -> bool {
        self.sources.contains(&slot)
    }

    #[must_use]
    pub fn target_locked(&self, pair: usize) -> bool {
        self.targets.contains(&pair)
    }

    pub fn lock(&mut self, source: usize, target_pair: usize) {
        self.sources.insert(source);
        self.targets.insert(target_pair);
    }

    pub fn clear(&mut self) {
        self.sources.clear();
        self.targets.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchFlash {
    pub source: usize,
    pub target: usize,
    pub until: DateTime<Utc>,
}

/// One displayed page: sources in page order, targets shuffled.
#[derive(Debug, Clone)]
pub struct DragBoard {
    sources: Vec<SourceCard>,
    targets: Vec<TargetCard>,
    flashes: Vec<MismatchFlash>,
}

impl DragBoard {
    /// Lay out `page`, re-locking the positions recorded in `matched`.
    pub fn build<R: Rng + ?Sized>(page: &WordPage, matched: &PageMatches, rng: &mut R) -> Self {
        let sources = page
            .pairs()
            .iter()
            .enumerate()
            .map(|(slot, pair)| SourceCard {
                word: pair.word().to_string(),
                matched: matched.source_locked(slot),
            })
            .collect();

        let mut targets: Vec<TargetCard> = page
            .pairs()
            .iter()
            .enumerate()
            .map(|(position, pair)| TargetCard {
                label: pair.translation_label().to_string(),
                answer: pair.word().to_string(),
                pair: position,
                matched: matched.target_locked(position),
            })
            .collect();
        targets.as_mut_slice().shuffle(rng);

        Self {
            sources,
            targets,
            flashes: Vec::new(),
        }
    }

    #[must_use]
    pub fn sources(&self) -> &[SourceCard] {
        &self.sources
    }

    #[must_use]
    pub fn targets(&self) -> &[TargetCard] {
        &self.targets
    }

    #[must_use]
    pub fn flashes(&self) -> &[MismatchFlash] {
        &self.flashes
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sources.iter().all(|card| card.matched)
    }

    #[must_use]
    pub fn source_flashing(&self, slot: usize, now: DateTime<Utc>) -> bool {
        self.flashes
            .iter()
            .any(|flash| flash.source == slot && flash.until > now)
    }

    #[must_use]
    pub fn target_flashing(&self, slot: usize, now: DateTime<Utc>) -> bool {
        self.flashes
            .iter()
            .any(|flash| flash.target == slot && flash.until > now)
    }

    /// Drop flashes whose deadline has passed. Returns how many were removed.
    pub fn clear_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.flashes.len();
        self.flashes.retain(|flash| flash.until > now);
        before - self.flashes.len()
    }

    /// Returns the dragged word, the target's pair position and the verdict.
    fn judge(&self, source: usize, target: usize) -> Result<(&str, usize, bool), ControllerError> {
        let source_card = self
            .sources
            .get(source)
            .ok_or(ControllerError::UnknownSlot(source))?;
        let target_card = self
            .targets
            .get(target)
            .ok_or(ControllerError::UnknownSlot(target))?;
        if source_card.matched {
            return Err(ControllerError::AlreadyMatched(source));
        }
        if target_card.matched {
            return Err(ControllerError::AlreadyMatched(target));
        }
        Ok((
            &source_card.word,
            target_card.pair,
            target_card.answer == source_card.word,
        ))
    }

    fn lock(&mut self, source: usize, target: usize) {
        if let Some(card) = self.sources.get_mut(source) {
            card.matched = true;
        }
        if let Some(card) = self.targets.get_mut(target) {
            card.matched = true;
        }
        self.flashes
            .retain(|flash| flash.source != source && flash.target != target);
    }
}

/// Result of one drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropFeedback {
    pub attempt: Attempt,
    pub page_complete: bool,
}

/// Drag-and-drop matching game. Every drop is scored.
pub struct DragDropController {
    loader: ContentLoader,
    auth: AuthGuard,
    clock: Clock,
    rng: StdRng,
    session: Session<WordPage>,
    matched: Vec<PageMatches>,
    board: Option<DragBoard>,
    message: Option<String>,
}

impl DragDropController {
    #[must_use]
    pub fn new(loader: ContentLoader, auth: AuthGuard, clock: Clock, language: Language) -> Self {
        Self {
            loader,
            auth,
            clock,
            rng: StdRng::from_os_rng(),
            session: Session::new(language),
            matched: Vec::new(),
            board: None,
            message: None,
        }
    }

    /// Use a fixed RNG, e.g. `StdRng::seed_from_u64`, for repeatable shuffles.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session<WordPage> {
        &self.session
    }

    #[must_use]
    pub fn board(&self) -> Option<&DragBoard> {
        self.board.as_ref()
    }

    #[must_use]
    pub fn strategy(&self) -> ValidationStrategy {
        GameKind::DragDrop.strategy()
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Api(AuthMissing)` without a stored token and
    /// `SessionError::Busy` while a load is in flight.
    pub async fn begin_start(&mut self) -> Result<PendingLoad, ControllerError> {
        let language = self.session.language();
        begin_load(&mut self.session, &self.auth, language, false).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Api(AuthMissing)` without a stored token.
    pub async fn begin_change_language(
        &mut self,
        language: Language,
    ) -> Result<PendingLoad, ControllerError> {
        begin_load(&mut self.session, &self.auth, language, true).await
    }

    /// Fetch all word pairs and split them into pages.
    ///
    /// # Errors
    ///
    /// Returns the `LoadError` reported by the loader.
    pub async fn fetch(&self, pending: &PendingLoad) -> Result<Vec<WordPage>, LoadError> {
        let pairs = self
            .loader
            .word_pairs(pending.token(), pending.language())
            .await?;
        Ok(WordPage::paginate(pairs, WORDS_PER_PAGE))
    }

    pub fn complete_load(
        &mut self,
        pending: PendingLoad,
        result: Result<Vec<WordPage>, LoadError>,
    ) -> LoadOutcome {
        let ticket = pending.ticket();
        let outcome =
            self.session
                .finish_load(ticket, result, ResetPolicy::Fresh, self.clock.now());
        match &outcome {
            LoadOutcome::Applied { items } => {
                self.matched = vec![PageMatches::default(); *items];
                self.message = None;
                self.redisplay();
            }
            LoadOutcome::Failed(err) => self.message = Some(err.user_message()),
            LoadOutcome::Discarded => {}
        }
        log_outcome("drag-drop", ticket, &outcome);
        outcome
    }

    /// # Errors
    ///
    /// See `begin_start`. Load failures are reported in the outcome.
    pub async fn start(&mut self) -> Result<LoadOutcome, ControllerError> {
        let pending = self.begin_start().await?;
        let result = self.fetch(&pending).await;
        Ok(self.complete_load(pending, result))
    }

    /// # Errors
    ///
    /// See `begin_change_language`.
    pub async fn change_language(
        &mut self,
        language: Language,
    ) -> Result<LoadOutcome, ControllerError> {
        let pending = self.begin_change_language(language).await?;
        let result = self.fetch(&pending).await;
        Ok(self.complete_load(pending, result))
    }

    /// Drop the source card in slot `source` on the target card in slot
    /// `target`. A wrong drop flashes both cards for `MISMATCH_REVERT_MS`.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::UnknownSlot` or `AlreadyMatched` for an
    /// invalid drop and `ControllerError::Session` unless a page is showing.
    pub fn drop_word(&mut self, source: usize, target: usize) -> Result<DropFeedback, ControllerError> {
        let Some(board) = self.board.as_mut() else {
            return Err(not_showing(self.session.status()).into());
        };
        let (word, pair, is_correct) = board.judge(source, target)?;
        let attempt = self.session.tally(word, is_correct)?;

        if is_correct {
            board.lock(source, target);
            if let Some(matched) = self.matched.get_mut(self.session.cursor()) {
                matched.lock(source, pair);
            }
        } else {
            board.flashes.push(MismatchFlash {
                source,
                target,
                until: self.clock.deadline_after(MISMATCH_REVERT_MS),
            });
        }
        debug!(source, target, correct = is_correct, "word dropped");

        Ok(DropFeedback {
            attempt,
            page_complete: board.is_complete(),
        })
    }

    /// Clear expired mismatch highlights.
    pub fn tick(&mut self) -> usize {
        self.tick_at(self.clock.now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> usize {
        self.board
            .as_mut()
            .map_or(0, |board| board.clear_expired(now))
    }

    /// Show the next page, or complete after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first load.
    pub fn advance(&mut self) -> Result<SessionStatus, ControllerError> {
        let status = self.session.advance(self.clock.now())?;
        self.redisplay();
        Ok(status)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first load.
    pub fn retreat(&mut self) -> Result<SessionStatus, ControllerError> {
        let status = self.session.retreat()?;
        self.redisplay();
        Ok(status)
    }

    /// Replay from the first page with nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first load.
    pub fn restart(&mut self) -> Result<(), ControllerError> {
        self.session.restart(self.clock.now())?;
        self.matched.iter_mut().for_each(PageMatches::clear);
        self.message = None;
        self.redisplay();
        Ok(())
    }

    pub fn leave(&mut self) {
        self.session.abandon_load();
    }

    #[must_use]
    pub fn view(&self) -> DragDropView {
        DragDropView::project(
            &self.session,
            self.board.as_ref(),
            self.clock.now(),
            self.message.as_deref(),
        )
    }

    fn redisplay(&mut self) {
        let empty = PageMatches::default();
        let matched = self.matched.get(self.session.cursor()).unwrap_or(&empty);
        self.board = self
            .session
            .current()
            .map(|page| DragBoard::build(page, matched, &mut self.rng));
    }
}

fn not_showing(status: SessionStatus) -> SessionError {
    match status {
        SessionStatus::NotStarted => SessionError::NotStarted,
        _ => SessionError::Completed,
    }
}
