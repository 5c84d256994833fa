//! Remote collaborators: the content endpoints and the auth endpoints.

mod dto;
mod http;
mod memory;

use async_trait::async_trait;

use lingo_core::model::{Difficulty, Language, PageNumber, WordIndex};

use crate::error::ApiError;

pub use dto::{
    BingoWordDto, BingoWordsDto, DictionaryDto, FlashcardPageDto, GuessDto, HiddenWordDto,
    KeyboardDto, LoginDto, QuizDto, RegisterRequest, TranslationCheck, TranslationVerdictDto,
    WordPairDto,
};
pub use http::HttpBackend;
pub use memory::InMemoryBackend;

/// Content endpoints used by the game pages.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// `GET /api/quizzes/{language}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn quizzes(&self, token: &str, language: Language) -> Result<Vec<QuizDto>, ApiError>;

    /// `GET /api/dragdrops/words/{language}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn drag_words(
        &self,
        token: &str,
        language: Language,
    ) -> Result<Vec<WordPairDto>, ApiError>;

    /// `GET /api/guessWords/start?lang=&index=`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn start_guess(
        &self,
        token: &str,
        language: Language,
        index: WordIndex,
    ) -> Result<HiddenWordDto, ApiError>;

    /// `POST /api/guessWords/guess/{letter}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn guess_letter(&self, token: &str, letter: char) -> Result<GuessDto, ApiError>;

    /// `GET /api/keyboards/{language}`, unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn keyboard(&self, language: Language) -> Result<KeyboardDto, ApiError>;

    /// `GET /api/flashcards/{language}?page=`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn flashcards(
        &self,
        token: &str,
        language: Language,
        page: PageNumber,
    ) -> Result<FlashcardPageDto, ApiError>;

    /// `GET /api/bingo/words?level=&language=`, unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn bingo_words(
        &self,
        difficulty: Difficulty,
        language: Language,
    ) -> Result<BingoWordsDto, ApiError>;

    /// `POST /api/bingo/check-translation`, unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn check_translation(
        &self,
        check: &TranslationCheck,
    ) -> Result<TranslationVerdictDto, ApiError>;

    /// `GET /api/words/search?word=&language=`, unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn search_word(
        &self,
        word: &str,
        language: Language,
    ) -> Result<DictionaryDto, ApiError>;
}

/// Login and registration endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError::ServerRejected` for bad credentials.
    async fn login(&self, username: &str, password: &str) -> Result<LoginDto, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::ServerRejected` if the account cannot be created.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;
}
