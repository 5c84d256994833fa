use std::sync::Arc;

use lingo_core::model::Language;
use storage::repository::Storage;

use crate::Clock;
use crate::api::{AuthBackend, ContentSource, HttpBackend, InMemoryBackend};
use crate::auth::{AuthGuard, AuthService};
use crate::config::ApiConfig;
use crate::error::AppServicesError;
use crate::dictionary::DictionaryService;
use crate::flashcards::FlashcardPager;
use crate::games::{BingoController, DragDropController, GuessWordController, QuizController};
use crate::loader::ContentLoader;
use crate::prefs::PrefsService;

/// Assembles the app-facing services and hands out one controller per page.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    loader: ContentLoader,
    auth: Arc<AuthService>,
    prefs: Arc<PrefsService>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        storage: &Storage,
        content: Arc<dyn ContentSource>,
        auth_backend: Arc<dyn AuthBackend>,
        clock: Clock,
    ) -> Self {
        Self {
            clock,
            loader: ContentLoader::new(content),
            auth: Arc::new(AuthService::new(
                auth_backend,
                Arc::clone(&storage.client_state),
            )),
            prefs: Arc::new(PrefsService::new(Arc::clone(&storage.client_state))),
        }
    }

    /// Build services backed by `SQLite` client state and the REST API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: ApiConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let backend = Arc::new(HttpBackend::new(config));
        Ok(Self::new(&storage, backend.clone(), backend, clock))
    }

    /// Build services on top of an in-process backend and the given storage.
    #[must_use]
    pub fn with_backend(storage: &Storage, backend: InMemoryBackend, clock: Clock) -> Self {
        let backend = Arc::new(backend);
        Self::new(storage, backend.clone(), backend, clock)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn guard(&self) -> AuthGuard {
        self.auth.guard()
    }

    #[must_use]
    pub fn prefs(&self) -> Arc<PrefsService> {
        Arc::clone(&self.prefs)
    }

    #[must_use]
    pub fn quiz(&self, language: Language) -> QuizController {
        QuizController::new(self.loader.clone(), self.guard(), self.clock, language)
    }

    #[must_use]
    pub fn drag_drop(&self, language: Language) -> DragDropController {
        DragDropController::new(self.loader.clone(), self.guard(), self.clock, language)
    }

    #[must_use]
    pub fn guess_word(&self, language: Language) -> GuessWordController {
        GuessWordController::new(self.loader.clone(), self.guard(), self.clock, language)
    }

    #[must_use]
    pub fn flashcards(&self, language: Language) -> FlashcardPager {
        FlashcardPager::new(self.loader.clone(), self.guard(), language)
    }

    /// Bingo and the dictionary are public pages and never ask for a token.
    #[must_use]
    pub fn bingo(&self, language: Language) -> BingoController {
        BingoController::new(self.loader.clone(), self.clock, language)
    }

    #[must_use]
    pub fn dictionary(&self, language: Language) -> DictionaryService {
        DictionaryService::new(self.loader.clone(), language)
    }
}
