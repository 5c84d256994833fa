use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use lingo_core::model::{Difficulty, Language, PageNumber, WordIndex};

use super::dto::{ErrorBody, LoginRequest};
use super::{
    AuthBackend, BingoWordsDto, ContentSource, DictionaryDto, FlashcardPageDto, GuessDto,
    HiddenWordDto, KeyboardDto, LoginDto, QuizDto, RegisterRequest, TranslationCheck,
    TranslationVerdictDto, WordPairDto,
};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// `reqwest`-backed client for the LingoBoost REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
}

impl HttpBackend {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Use a preconfigured client, e.g. with timeouts or proxy settings.
    #[must_use]
    pub fn with_client(config: ApiConfig, client: Client) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

/// Turn a non-2xx response into `ApiError::ServerRejected`, keeping the
/// server's `message` when it sent one.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = body.message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    debug!(status = status.as_u16(), %message, "request rejected");
    Err(ApiError::ServerRejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ContentSource for HttpBackend {
    async fn quizzes(&self, token: &str, language: Language) -> Result<Vec<QuizDto>, ApiError> {
        let url = self.config.endpoint(&format!("api/quizzes/{language}"));
        debug!(%url, "fetching quizzes");
        self.fetch_json(self.client.get(url).bearer_auth(token)).await
    }

    async fn drag_words(
        &self,
        token: &str,
        language: Language,
    ) -> Result<Vec<WordPairDto>, ApiError> {
        let url = self.config.endpoint(&format!("api/dragdrops/words/{language}"));
        debug!(%url, "fetching drag-and-drop words");
        self.fetch_json(self.client.get(url).bearer_auth(token)).await
    }

    async fn start_guess(
        &self,
        token: &str,
        language: Language,
        index: WordIndex,
    ) -> Result<HiddenWordDto, ApiError> {
        let url = self.config.endpoint("api/guessWords/start");
        debug!(%url, %language, %index, "starting guess-word round");
        let request = self
            .client
            .get(url)
            .query(&[("lang", language.code().to_string()), ("index", index.to_string())])
            .bearer_auth(token);
        self.fetch_json(request).await
    }

    async fn guess_letter(&self, token: &str, letter: char) -> Result<GuessDto, ApiError> {
        let url = self.config.endpoint(&format!("api/guessWords/guess/{letter}"));
        debug!(%url, "submitting letter");
        self.fetch_json(self.client.post(url).bearer_auth(token)).await
    }

    async fn keyboard(&self, language: Language) -> Result<KeyboardDto, ApiError> {
        let url = self.config.endpoint(&format!("api/keyboards/{language}"));
        debug!(%url, "fetching keyboard");
        self.fetch_json(self.client.get(url)).await
    }

    async fn flashcards(
        &self,
        token: &str,
        language: Language,
        page: PageNumber,
    ) -> Result<FlashcardPageDto, ApiError> {
        let url = self.config.endpoint(&format!("api/flashcards/{language}"));
        debug!(%url, %page, "fetching flashcards");
        let request = self
            .client
            .get(url)
            .query(&[("page", page.value())])
            .bearer_auth(token);
        self.fetch_json(request).await
    }

    async fn bingo_words(
        &self,
        difficulty: Difficulty,
        language: Language,
    ) -> Result<BingoWordsDto, ApiError> {
        let url = self.config.endpoint("api/bingo/words");
        debug!(%url, %difficulty, %language, "fetching bingo words");
        let request = self
            .client
            .get(url)
            .query(&[("level", difficulty.code()), ("language", language.code())]);
        self.fetch_json(request).await
    }

    async fn check_translation(
        &self,
        check: &TranslationCheck,
    ) -> Result<TranslationVerdictDto, ApiError> {
        let url = self.config.endpoint("api/bingo/check-translation");
        debug!(%url, word_id = %check.word_id, "checking translation");
        self.fetch_json(self.client.post(url).json(check)).await
    }

    async fn search_word(
        &self,
        word: &str,
        language: Language,
    ) -> Result<DictionaryDto, ApiError> {
        let url = self.config.endpoint("api/words/search");
        debug!(%url, %language, "searching dictionary");
        let request = self
            .client
            .get(url)
            .query(&[("word", word), ("language", language.code())]);
        self.fetch_json(request).await
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> Result<LoginDto, ApiError> {
        let url = self.config.auth_endpoint("api/auth/login");
        let request = self
            .client
            .post(url)
            .json(&LoginRequest { username, password });
        self.fetch_json(request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let url = self.config.auth_endpoint("api/auth/register");
        let response = self.client.post(url).json(request).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
