use tracing::{debug, info};

use lingo_core::Clock;
use lingo_core::model::{Attempt, BingoGrid, Difficulty, Language, LoadError};
use lingo_core::session::{LoadOutcome, LoadTicket, ResetPolicy, Session, SessionError, SessionStatus};
use lingo_core::validation::{GameKind, ValidationStrategy, require_text};

use super::log_outcome;
use crate::error::ControllerError;
use crate::loader::ContentLoader;
use crate::view::BingoView;

/// Points shown per correctly translated word.
pub const BINGO_POINTS: u32 = 10;

/// A word-list request plus the level it asked for.
#[derive(Debug, Clone, Copy)]
pub struct PendingGrid {
    ticket: LoadTicket,
    difficulty: Difficulty,
}

impl PendingGrid {
    #[must_use]
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.ticket.language()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoFeedback {
    pub attempt: Attempt,
    pub correct_translation: String,
    pub points: u32,
    pub message: String,
}

/// Translation bingo. The server hands out a word list per level and judges
/// each typed translation; the first verdict on a cell is the one scored.
pub struct BingoController {
    loader: ContentLoader,
    clock: Clock,
    session: Session<BingoGrid>,
    difficulty: Difficulty,
    message: Option<String>,
}

impl BingoController {
    #[must_use]
    pub fn new(loader: ContentLoader, clock: Clock, language: Language) -> Self {
        Self {
            loader,
            clock,
            session: Session::new(language),
            difficulty: Difficulty::default(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session<BingoGrid> {
        &self.session
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn grid(&self) -> Option<&BingoGrid> {
        self.session.current()
    }

    #[must_use]
    pub fn strategy(&self) -> ValidationStrategy {
        GameKind::Bingo.strategy()
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.session.score().correct.saturating_mul(BINGO_POINTS)
    }

    /// Question shown after picking `cell`.
    #[must_use]
    pub fn prompt(&self, cell: usize) -> Option<String> {
        let cell = self.grid()?.cell(cell)?;
        Some(format!(
            "Translate the word \"{}\" to {}:",
            cell.word().word(),
            self.session.language().display_name()
        ))
    }

    /// Request a card at the current level and language.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Busy` while a load is in flight.
    pub fn begin_start(&mut self) -> Result<PendingGrid, ControllerError> {
        let ticket = self.session.begin_load(self.session.language())?;
        Ok(self.pending(ticket, self.difficulty))
    }

    /// Request a card in `language`, superseding any outstanding load.
    pub fn begin_change_language(&mut self, language: Language) -> PendingGrid {
        let ticket = self.session.supersede_load(language);
        self.pending(ticket, self.difficulty)
    }

    /// Request a card at `difficulty`, superseding any outstanding load. The
    /// level only sticks once its words are applied.
    pub fn begin_change_difficulty(&mut self, difficulty: Difficulty) -> PendingGrid {
        let ticket = self.session.supersede_load(self.session.language());
        self.pending(ticket, difficulty)
    }

    /// # Errors
    ///
    /// Returns the `LoadError` reported by the loader.
    pub async fn fetch(&self, pending: &PendingGrid) -> Result<Vec<BingoGrid>, LoadError> {
        let grid = self
            .loader
            .bingo_grid(pending.difficulty, pending.language())
            .await?;
        Ok(vec![grid])
    }

    pub fn complete_load(
        &mut self,
        pending: PendingGrid,
        result: Result<Vec<BingoGrid>, LoadError>,
    ) -> LoadOutcome {
        let ticket = pending.ticket;
        let outcome = self
            .session
            .finish_load(ticket, result, ResetPolicy::Fresh, self.clock.now());
        match &outcome {
            LoadOutcome::Applied { .. } => {
                self.difficulty = pending.difficulty;
                self.message = None;
            }
            LoadOutcome::Failed(err) => self.message = Some(err.user_message()),
            LoadOutcome::Discarded => {}
        }
        log_outcome("bingo", ticket, &outcome);
        outcome
    }

    /// # Errors
    ///
    /// See `begin_start`. Load failures are reported in the outcome.
    pub async fn start(&mut self) -> Result<LoadOutcome, ControllerError> {
        let pending = self.begin_start()?;
        let result = self.fetch(&pending).await;
        Ok(self.complete_load(pending, result))
    }

    pub async fn change_language(&mut self, language: Language) -> LoadOutcome {
        let pending = self.begin_change_language(language);
        let result = self.fetch(&pending).await;
        self.complete_load(pending, result)
    }

    pub async fn change_difficulty(&mut self, difficulty: Difficulty) -> LoadOutcome {
        let pending = self.begin_change_difficulty(difficulty);
        let result = self.fetch(&pending).await;
        self.complete_load(pending, result)
    }

    /// Send a translation of the word in `cell` to the server.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api(ValidationFailure)` before any request
    /// for a blank translation, `UnknownSlot` for a cell off the card,
    /// `SessionError` unless a card is showing, and the server's error
    /// otherwise.
    pub async fn answer(
        &mut self,
        cell: usize,
        translation: &str,
    ) -> Result<BingoFeedback, ControllerError> {
        let translation = require_text("translation", translation)?.to_lowercase();
        if self.session.is_loading() {
            return Err(SessionError::Busy.into());
        }
        let word_id = match self.session.current() {
            Some(grid) => grid
                .cell(cell)
                .ok_or(ControllerError::UnknownSlot(cell))?
                .word()
                .id()
                .to_string(),
            None if self.session.status() == SessionStatus::NotStarted => {
                return Err(SessionError::NotStarted.into());
            }
            None => return Err(SessionError::Completed.into()),
        };

        let verdict = self
            .loader
            .check_translation(&word_id, self.session.language(), &translation)
            .await?;

        let mut grid = self
            .session
            .current()
            .cloned()
            .ok_or(SessionError::Completed)?;
        let previous = grid.record(cell, verdict.is_correct, verdict.correct_translation.clone());
        self.session.replace_current(grid)?;

        let counted = if previous.is_none() {
            self.session.tally(translation.as_str(), verdict.is_correct)?;
            true
        } else {
            self.session.note_attempt()?;
            false
        };
        debug!(cell, %word_id, is_correct = verdict.is_correct, counted, "translation judged");

        let message = if verdict.is_correct {
            format!("Correct! The correct translation is: {}", verdict.correct_translation)
        } else {
            format!("Incorrect! The correct translation is: {}", verdict.correct_translation)
        };
        self.message = Some(message.clone());
        if self.is_card_complete() {
            info!(points = self.points(), "bingo card complete");
        }

        Ok(BingoFeedback {
            attempt: Attempt {
                item_index: cell,
                response: translation,
                is_correct: verdict.is_correct,
                counted,
            },
            correct_translation: verdict.correct_translation,
            points: self.points(),
            message,
        })
    }

    /// True once every cell has a verdict.
    #[must_use]
    pub fn is_card_complete(&self) -> bool {
        self.grid()
            .is_some_and(|grid| grid.cells().iter().all(|cell| cell.verdict().is_some()))
    }

    /// Clear every verdict and the score, keeping the words.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` if no card has been loaded.
    pub fn restart(&mut self) -> Result<(), ControllerError> {
        self.session.restart(self.clock.now())?;
        if let Some(mut grid) = self.session.current().cloned() {
            grid.clear_verdicts();
            self.session.replace_current(grid)?;
        }
        self.message = None;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.session.abandon_load();
    }

    #[must_use]
    pub fn view(&self) -> BingoView {
        BingoView::project(
            &self.session,
            self.difficulty,
            self.points(),
            self.message.as_deref(),
        )
    }

    fn pending(&self, ticket: LoadTicket, difficulty: Difficulty) -> PendingGrid {
        debug!(
            language = %ticket.language(),
            %difficulty,
            generation = ticket.generation().value(),
            "bingo load requested"
        );
        PendingGrid { ticket, difficulty }
    }
}
