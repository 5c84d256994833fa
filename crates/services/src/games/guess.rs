use std::collections::HashSet;

use tracing::{debug, info};

use lingo_core::Clock;
use lingo_core::model::{HiddenWord, Keyboard, Language, LoadError, WordIndex};
use lingo_core::session::{
    FetchGuard, LoadOutcome, ResetPolicy, Session, SessionError, SessionStatus,
};
use lingo_core::validation::{GameKind, ValidationStrategy, parse_letter};

use super::{PendingLoad, begin_load, log_outcome};
use crate::auth::AuthGuard;
use crate::error::ControllerError;
use crate::loader::ContentLoader;
use crate::view::GuessView;

const SOLVED_MESSAGE: &str = "You guessed the word!";
const HIT_MESSAGE: &str = "Correct guess!";
const MISS_MESSAGE: &str = "Wrong guess, try again.";

/// A word request plus the index and score policy it was made with.
#[derive(Debug, Clone)]
pub struct PendingWord {
    load: PendingLoad,
    index: WordIndex,
    policy: ResetPolicy,
}

impl PendingWord {
    #[must_use]
    pub fn load(&self) -> &PendingLoad {
        &self.load
    }

    #[must_use]
    pub fn index(&self) -> WordIndex {
        self.index
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    /// No unknown slot left. `counted` is false if this word index was
    /// already solved earlier in the session.
    Solved { counted: bool },
    Hit,
    Miss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessFeedback {
    pub outcome: GuessOutcome,
    pub mask: String,
    pub message: &'static str,
}

/// Letter-guessing game. The server owns the word and judges each letter;
/// this side renders its verdict and scores fully revealed words.
pub struct GuessWordController {
    loader: ContentLoader,
    auth: AuthGuard,
    clock: Clock,
    session: Session<HiddenWord>,
    word_index: WordIndex,
    solved: HashSet<WordIndex>,
    keyboard: Option<Keyboard>,
    keyboard_guard: FetchGuard,
    misses: u32,
    message: Option<String>,
}

impl GuessWordController {
    #[must_use]
    pub fn new(loader: ContentLoader, auth: AuthGuard, clock: Clock, language: Language) -> Self {
        Self {
            loader,
            auth,
            clock,
            session: Session::new(language),
            word_index: WordIndex::default(),
            solved: HashSet::new(),
            keyboard: None,
            keyboard_guard: FetchGuard::new(),
            misses: 0,
            message: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session<HiddenWord> {
        &self.session
    }

    #[must_use]
    pub fn word_index(&self) -> WordIndex {
        self.word_index
    }

    #[must_use]
    pub fn keyboard(&self) -> Option<&Keyboard> {
        self.keyboard.as_ref()
    }

    #[must_use]
    pub fn strategy(&self) -> ValidationStrategy {
        GameKind::GuessWord.strategy()
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Request the word at the current index.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api(AuthMissing)` without a stored token and
    /// `SessionError::Busy` while a load is in flight.
    pub async fn begin_start(&mut self) -> Result<PendingWord, ControllerError> {
        self.begin_word(self.word_index, false, ResetPolicy::Fresh).await
    }

    /// Request the first word in `language`, superseding any outstanding load.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api(AuthMissing)` without a stored token.
    pub async fn begin_change_language(
        &mut self,
        language: Language,
    ) -> Result<PendingWord, ControllerError> {
        let load = begin_load(&mut self.session, &self.auth, language, true).await?;
        Ok(PendingWord {
            load,
            index: WordIndex::default(),
            policy: ResetPolicy::Fresh,
        })
    }

    /// # Errors
    ///
    /// Returns the `LoadError` reported by the loader.
    pub async fn fetch(&self, pending: &PendingWord) -> Result<Vec<HiddenWord>, LoadError> {
        let word = self
            .loader
            .guess_start(pending.load.token(), pending.load.language(), pending.index)
            .await?;
        Ok(vec![word])
    }

    /// Apply a fetched word. The index moves only when the word is applied.
    pub fn complete_load(
        &mut self,
        pending: PendingWord,
        result: Result<Vec<HiddenWord>, LoadError>,
    ) -> LoadOutcome {
        let ticket = pending.load.ticket();
        let outcome = self
            .session
            .finish_load(ticket, result, pending.policy, self.clock.now());
        match &outcome {
            LoadOutcome::Applied { .. } => {
                if pending.policy == ResetPolicy::Fresh {
                    self.solved.clear();
                }
                self.word_index = pending.index;
                self.misses = 0;
                self.message = Some(format!(
                    "Game started! Language: {}",
                    ticket.language().code().to_uppercase()
                ));
            }
            LoadOutcome::Failed(err) => self.message = Some(err.user_message()),
            LoadOutcome::Discarded => {}
        }
        log_outcome("guess-word", ticket, &outcome);
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

    /// Switch language, restart at the first word and reload the keyboard.
    ///
    /// # Errors
    ///
    /// See `begin_change_language`. A keyboard failure is only logged.
    pub async fn change_language(
        &mut self,
        language: Language,
    ) -> Result<LoadOutcome, ControllerError> {
        let pending = self.begin_change_language(language).await?;
        let result = self.fetch(&pending).await;
        let outcome = self.complete_load(pending, result);
        self.load_keyboard(language).await;
        Ok(outcome)
    }

    /// Fetch the word after the current one, keeping the score.
    ///
    /// # Errors
    ///
    /// See `begin_start`.
    pub async fn next_word(&mut self) -> Result<LoadOutcome, ControllerError> {
        let pending = self
            .begin_word(self.word_index.next(), false, ResetPolicy::KeepScore)
            .await?;
        let result = self.fetch(&pending).await;
        Ok(self.complete_load(pending, result))
    }

    /// Fetch the word before the current one. Does nothing at the first word.
    ///
    /// # Errors
    ///
    /// See `begin_start`.
    pub async fn previous_word(&mut self) -> Result<Option<LoadOutcome>, ControllerError> {
        if self.word_index.value() == 0 {
            return Ok(None);
        }
        let pending = self
            .begin_word(self.word_index.previous(), false, ResetPolicy::KeepScore)
            .await?;
        let result = self.fetch(&pending).await;
        Ok(Some(self.complete_load(pending, result)))
    }

    /// Send one letter to the server and render its verdict.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api(ValidationFailure)` before any request
    /// unless `input` is a single letter, `SessionError` unless an unsolved
    /// word is showing, and the server's error otherwise.
    pub async fn guess(&mut self, input: &str) -> Result<GuessFeedback, ControllerError> {
        let letter = parse_letter(input)?;
        if self.session.is_loading() {
            return Err(SessionError::Busy.into());
        }
        let solved = match self.session.current() {
            Some(word) => word.mask().is_solved(),
            None if self.session.status() == SessionStatus::NotStarted => {
                return Err(SessionError::NotStarted.into());
            }
            None => return Err(SessionError::Completed.into()),
        };
        if solved {
            return Err(SessionError::Completed.into());
        }

        let token = self.auth.require_token().await?;
        let reply = self.loader.guess_letter(&token, letter).await?;
        let mask = reply.word.mask().to_string();
        let solved = reply.success && reply.word.mask().is_solved();
        self.session.replace_current(reply.word)?;

        let outcome = if solved {
            let counted = if self.solved.insert(self.word_index) {
                self.session.judge(letter, true)?.counted
            } else {
                self.session.note_attempt()?;
                false
            };
            info!(index = %self.word_index, counted, "word solved");
            GuessOutcome::Solved { counted }
        } else {
            self.session.note_attempt()?;
            if reply.success {
                GuessOutcome::Hit
            } else {
                self.misses = self.misses.saturating_add(1);
                GuessOutcome::Miss
            }
        };
        debug!(%letter, ?outcome, "letter judged");

        let message = match outcome {
            GuessOutcome::Solved { .. } => SOLVED_MESSAGE,
            GuessOutcome::Hit => HIT_MESSAGE,
            GuessOutcome::Miss => MISS_MESSAGE,
        };
        self.message = Some(message.to_string());
        Ok(GuessFeedback {
            outcome,
            mask,
            message,
        })
    }

    /// Fetch the on-screen keyboard for `language`. A newer request makes
    /// older ones stale. Returns true if a keyboard was applied.
    pub async fn load_keyboard(&mut self, language: Language) -> bool {
        let generation = self.keyboard_guard.supersede();
        let result = self.loader.keyboard(language).await;
        if !self.keyboard_guard.settle(generation) {
            debug!(%language, "stale keyboard discarded");
            return false;
        }
        match result {
            Ok(keyboard) => {
                self.keyboard = Some(keyboard);
                true
            }
            Err(_) => {
                self.message = Some("Error loading keyboard.".to_string());
                false
            }
        }
    }

    pub fn leave(&mut self) {
        self.session.abandon_load();
        self.keyboard_guard.abandon();
    }

    #[must_use]
    pub fn view(&self) -> GuessView {
        GuessView::project(
            &self.session,
            self.word_index.value(),
            self.keyboard.as_ref(),
            self.misses,
            self.message.as_deref(),
        )
    }

    async fn begin_word(
        &mut self,
        index: WordIndex,
        supersede: bool,
        policy: ResetPolicy,
    ) -> Result<PendingWord, ControllerError> {
        let language = self.session.language();
        let load = begin_load(&mut self.session, &self.auth, language, supersede).await?;
        Ok(PendingWord {
            load,
            index,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use lingo_core::time::fixed_clock;
    use storage::repository::{ClientStateRepository, InMemoryRepository, StateKey};

    use crate::api::InMemoryBackend;

    async fn controller(backend: InMemoryBackend) -> GuessWordController {
        let state = Arc::new(InMemoryRepository::new());
        state.set(StateKey::Token, "t").await.unwrap();
        GuessWordController::new(
            ContentLoader::new(Arc::new(backend)),
            AuthGuard::new(state),
            fixed_clock(),
            Language::Fr,
        )
    }

    #[tokio::test]
    async fn bad_letter_is_rejected_before_any_request() {
        let backend = InMemoryBackend::new().with_guess_words(Language::Fr, &[("chat", "cat")]);
        let mut game = controller(backend.clone()).await;
        game.start().await.unwrap();
        let sent = backend.request_count();

        for input in ["", "ab", "3"] {
            let err = game.guess(input).await.unwrap_err();
            assert!(matches!(err, ControllerError::Api(_)), "{input:?}");
        }
        assert_eq!(backend.request_count(), sent);
    }

    #[tokio::test]
    async fn previous_at_first_word_is_a_no_op() {
        let backend = InMemoryBackend::new().with_guess_words(Language::Fr, &[("chat", "cat")]);
        let mut game = controller(backend).await;
        game.start().await.unwrap();
        assert_eq!(game.previous_word().await.unwrap(), None);
        assert_eq!(game.word_index().value(), 0);
    }

    #[tokio::test]
    async fn missing_next_word_keeps_current_index() {
        let backend = InMemoryBackend::new().with_guess_words(Language::Fr, &[("chat", "cat")]);
        let mut game = controller(backend).await;
        game.start().await.unwrap();

        let outcome = game.next_word().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Failed(LoadError::NotFound));
        assert_eq!(game.word_index().value(), 0);
        assert_eq!(game.view().mask, "_ _ _ _");
    }

    #[tokio::test]
    async fn revisited_word_is_not_scored_twice() {
        let backend = InMemoryBackend::new()
            .with_guess_words(Language::Fr, &[("eau", "water"), ("sel", "salt")]);
        let mut game = controller(backend).await;
        game.start().await.unwrap();
        for letter in ["e", "a", "u"] {
            game.guess(letter).await.unwrap();
        }
        assert_eq!(game.session().score().correct, 1);

        game.next_word().await.unwrap();
        game.previous_word().await.unwrap();
        assert_eq!(game.word_index().value(), 0);

        game.guess("e").await.unwrap();
        game.guess("a").await.unwrap();
        let again = game.guess("u").await.unwrap();
        assert_eq!(again.outcome, GuessOutcome::Solved { counted: false });
        assert_eq!(game.session().score().correct, 1);
        assert!(game.session().score().total() <= game.session().submissions());

        game.start().await.unwrap();
        for letter in ["e", "a", "u"] {
            game.guess(letter).await.unwrap();
        }
        assert_eq!(game.session().score().correct, 1);
    }

    #[tokio::test]
    async fn keyboard_loads_per_language() {
        let backend = InMemoryBackend::new()
            .with_guess_words(Language::De, &[("hund", "dog")])
            .with_keyboard(Language::De, &["ä", "ö", "ü", "ß"]);
        let mut game = controller(backend).await;

        game.change_language(Language::De).await.unwrap();
        assert_eq!(game.keyboard().map(|k| k.keys().len()), Some(4));
        assert_eq!(game.view().keys.len(), 4);
        assert_eq!(game.strategy(), ValidationStrategy::RemoteConfirm);
    }
}
