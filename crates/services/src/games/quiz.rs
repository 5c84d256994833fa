use tracing::debug;

use lingo_core::Clock;
use lingo_core::model::{Attempt, Language, LoadError, QuizItem};
use lingo_core::session::{LoadOutcome, ResetPolicy, Session, SessionError, SessionStatus};
use lingo_core::validation::{GameKind, ValidationStrategy, answers_match, require_text};

use super::{PendingLoad, begin_load, log_outcome};
use crate::auth::AuthGuard;
use crate::error::ControllerError;
use crate::loader::ContentLoader;
use crate::view::QuizView;

/// Multiple-choice quiz for one language. Answers are judged locally.
pub struct QuizController {
    loader: ContentLoader,
    auth: AuthGuard,
    clock: Clock,
    session: Session<QuizItem>,
    message: Option<String>,
}

impl QuizController {
    #[must_use]
    pub fn new(loader: ContentLoader, auth: AuthGuard, clock: Clock, language: Language) -> Self {
        Self {
            loader,
            auth,
            clock,
            session: Session::new(language),
            message: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session<QuizItem> {
        &self.session
    }

    #[must_use]
    pub fn strategy(&self) -> ValidationStrategy {
        GameKind::Quiz.strategy()
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

    /// Like `begin_start`, but never busy: any outstanding load goes stale.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api(AuthMissing)` without a stored token.
    pub async fn begin_change_language(
        &mut self,
        language: Language,
    ) -> Result<PendingLoad, ControllerError> {
        begin_load(&mut self.session, &self.auth, language, true).await
    }

    /// # Errors
    ///
    /// Returns the `LoadError` reported by the loader.
    pub async fn fetch(&self, pending: &PendingLoad) -> Result<Vec<QuizItem>, LoadError> {
        self.loader
            .quizzes(pending.token(), pending.language())
            .await
    }

    pub fn complete_load(
        &mut self,
        pending: PendingLoad,
        result: Result<Vec<QuizItem>, LoadError>,
    ) -> LoadOutcome {
        let ticket = pending.ticket();
        let outcome =
            self.session
                .finish_load(ticket, result, ResetPolicy::Fresh, self.clock.now());
        match &outcome {
            LoadOutcome::Applied { .. } => self.message = None,
            LoadOutcome::Failed(err) => self.message = Some(err.user_message()),
            LoadOutcome::Discarded => {}
        }
        log_outcome("quiz", ticket, &outcome);
        outcome
    }

    /// Load questions for the current language and start from the first.
    ///
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

    /// Judge the chosen option against the current question.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api(ValidationFailure)` for a blank answer and
    /// `ControllerError::Session` unless a question is showing.
    pub fn submit_answer(&mut self, response: &str) -> Result<Attempt, ControllerError> {
        let response = require_text("answer", response)?;
        let is_correct = {
            let item = self.current_item()?;
            answers_match(item.answer(), response)
        };
        let attempt = self.session.judge(response, is_correct)?;
        debug!(
            index = attempt.item_index,
            correct = attempt.is_correct,
            counted = attempt.counted,
            "quiz answer judged"
        );
        Ok(attempt)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first load.
    pub fn advance(&mut self) -> Result<SessionStatus, ControllerError> {
        Ok(self.session.advance(self.clock.now())?)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first load.
    pub fn retreat(&mut self) -> Result<SessionStatus, ControllerError> {
        Ok(self.session.retreat()?)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first load.
    pub fn restart(&mut self) -> Result<(), ControllerError> {
        self.session.restart(self.clock.now())?;
        self.message = None;
        Ok(())
    }

    /// Drop interest in any outstanding load, e.g. when the page closes.
    pub fn leave(&mut self) {
        self.session.abandon_load();
    }

    #[must_use]
    pub fn view(&self) -> QuizView {
        QuizView::project(&self.session, self.message.as_deref())
    }

    fn current_item(&self) -> Result<&QuizItem, SessionError> {
        self.session.current().ok_or(match self.session.status() {
            SessionStatus::NotStarted => SessionError::NotStarted,
            _ => SessionError::Completed,
        })
    }
}
