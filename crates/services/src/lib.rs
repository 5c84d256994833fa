#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod auth;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod flashcards;
pub mod games;
pub mod loader;
pub mod prefs;
pub mod view;

pub use lingo_core::Clock;

pub use api::{AuthBackend, ContentSource, HttpBackend, InMemoryBackend};
pub use app_services::AppServices;
pub use auth::{AuthGuard, AuthService, RegisterDraft};
pub use config::ApiConfig;
pub use error::{ApiError, AppServicesError, ConfigError, ControllerError};
pub use dictionary::{DictionaryEntry, DictionaryService, PendingLookup};
pub use flashcards::{Flashcard, FlashcardPager, PendingPage};
pub use games::{
    BingoController, BingoFeedback, DragBoard, DragDropController, DropFeedback, GuessFeedback,
    GuessOutcome, GuessWordController, PendingGrid, PendingLoad, PendingWord, QuizController,
};
pub use loader::{ContentLoader, GuessReply, TranslationVerdict};
pub use prefs::PrefsService;
