//! Single-word dictionary lookup.

use lingo_core::model::{Generation, Language, LoadError};
use lingo_core::session::{FetchGuard, LoadOutcome};
use lingo_core::validation::require_text;
use tracing::{debug, info};

use crate::error::{ApiError, ControllerError};
use crate::loader::ContentLoader;
use crate::view::DictionaryView;

pub const NO_TRANSLATION: &str = "Translation not available";
pub const EMPTY_QUERY: &str = "Please enter a word to search";
const SEARCH_FAILED: &str = "Something went wrong. Please try again.";

/// A word the server knows, with its translation if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    word: String,
    language: Language,
    translation: Option<String>,
}

impl DictionaryEntry {
    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    /// The translation, or `NO_TRANSLATION`.
    #[must_use]
    pub fn translation_label(&self) -> &str {
        self.translation.as_deref().unwrap_or(NO_TRANSLATION)
    }
}

#[derive(Debug, Clone)]
pub struct PendingLookup {
    generation: Generation,
    word: String,
    language: Language,
}

impl PendingLookup {
    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }
}

/// Dictionary page. A newer search always replaces an older one still in
/// flight.
pub struct DictionaryService {
    loader: ContentLoader,
    guard: FetchGuard,
    language: Language,
    entry: Option<DictionaryEntry>,
    message: Option<String>,
}

impl DictionaryService {
    #[must_use]
    pub fn new(loader: ContentLoader, language: Language) -> Self {
        Self {
            loader,
            guard: FetchGuard::new(),
            language,
            entry: None,
            message: None,
        }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn entry(&self) -> Option<&DictionaryEntry> {
        self.entry.as_ref()
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.guard.is_loading()
    }

    /// Start a search for `word` in `language`.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api(ValidationFailure)` for a blank word. The
    /// page then shows `EMPTY_QUERY` and nothing is sent.
    pub fn begin(
        &mut self,
        word: &str,
        language: Language,
    ) -> Result<PendingLookup, ControllerError> {
        let word = match require_text("word", word) {
            Ok(word) => word.to_string(),
            Err(err) => {
                self.entry = None;
                self.message = Some(EMPTY_QUERY.to_string());
                return Err(err.into());
            }
        };
        let generation = self.guard.supersede();
        debug!(%language, generation = generation.value(), "dictionary search requested");
        Ok(PendingLookup {
            generation,
            word,
            language,
        })
    }

    /// # Errors
    ///
    /// Returns `ApiError` as reported by the loader.
    pub async fn fetch(&self, pending: &PendingLookup) -> Result<Option<String>, ApiError> {
        self.loader.search_word(&pending.word, pending.language).await
    }

    /// Apply a finished search. Server errors show the server's message.
    pub fn complete(
        &mut self,
        pending: PendingLookup,
        result: Result<Option<String>, ApiError>,
    ) -> LoadOutcome {
        if !self.guard.settle(pending.generation) {
            debug!(language = %pending.language, "stale dictionary result discarded");
            return LoadOutcome::Discarded;
        }
        self.language = pending.language;
        match result {
            Ok(translation) => {
                info!(language = %pending.language, found = translation.is_some(), "dictionary entry shown");
                self.entry = Some(DictionaryEntry {
                    word: pending.word,
                    language: pending.language,
                    translation,
                });
                self.message = None;
                LoadOutcome::Applied { items: 1 }
            }
            Err(err) => {
                self.entry = None;
                self.message = Some(match &err {
                    ApiError::ServerRejected { message, .. } => message.clone(),
                    ApiError::NetworkFailure(_) => SEARCH_FAILED.to_string(),
                    other => other.user_message(),
                });
                LoadOutcome::Failed(LoadError::from(err))
            }
        }
    }

    /// # Errors
    ///
    /// See `begin`.
    pub async fn lookup(
        &mut self,
        word: &str,
        language: Language,
    ) -> Result<LoadOutcome, ControllerError> {
        let pending = self.begin(word, language)?;
        let result = self.fetch(&pending).await;
        Ok(self.complete(pending, result))
    }

    /// Search `word` in the current language.
    ///
    /// # Errors
    ///
    /// See `begin`.
    pub async fn search(&mut self, word: &str) -> Result<LoadOutcome, ControllerError> {
        self.lookup(word, self.language).await
    }

    /// Pick the language for later searches and clear the shown entry.
    pub fn change_language(&mut self, language: Language) {
        self.guard.abandon();
        self.language = language;
        self.entry = None;
        self.message = None;
    }

    pub fn leave(&mut self) {
        self.guard.abandon();
    }

    #[must_use]
    pub fn view(&self) -> DictionaryView {
        DictionaryView::project(
            self.language,
            self.guard.is_loading(),
            self.entry.as_ref(),
            self.message.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::api::InMemoryBackend;

    fn service(backend: InMemoryBackend) -> DictionaryService {
        DictionaryService::new(ContentLoader::new(Arc::new(backend)), Language::Fr)
    }

    #[tokio::test]
    async fn found_word_shows_translation_or_placeholder() {
        let backend = InMemoryBackend::new()
            .with_dictionary(Language::Fr, &[("maison", Some("house")), ("truc", None)]);
        let mut page = service(backend);

        assert_eq!(page.search("Maison").await.unwrap(), LoadOutcome::Applied { items: 1 });
        assert_eq!(page.entry().map(DictionaryEntry::translation_label), Some("house"));

        page.search("truc").await.unwrap();
        assert_eq!(page.view().translation.as_deref(), Some(NO_TRANSLATION));
    }

    #[tokio::test]
    async fn blank_word_is_rejected_before_any_request() {
        let backend = InMemoryBackend::new();
        let mut page = service(backend.clone());

        assert!(matches!(page.search("  ").await, Err(ControllerError::Api(_))));
        assert_eq!(page.message(), Some(EMPTY_QUERY));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn failures_show_server_message_or_generic_text() {
        let backend = InMemoryBackend::new().with_dictionary(Language::Fr, &[]);
        let mut page = service(backend.clone());

        let outcome = page.search("inconnu").await.unwrap();
        assert_eq!(outcome, LoadOutcome::Failed(LoadError::NotFound));
        assert_eq!(page.message(), Some("Word not found"));
        assert!(page.entry().is_none());

        backend.set_offline(true);
        page.search("inconnu").await.unwrap();
        assert_eq!(page.message(), Some(SEARCH_FAILED));
    }

    #[tokio::test]
    async fn older_search_is_discarded() {
        let backend = InMemoryBackend::new()
            .with_dictionary(Language::Es, &[("casa", Some("house")), ("perro", Some("dog"))]);
        let mut page = service(backend);

        let first = page.begin("casa", Language::Es).unwrap();
        let second = page.begin("perro", Language::Es).unwrap();

        let result = page.fetch(&second).await;
        assert_eq!(page.complete(second, result), LoadOutcome::Applied { items: 1 });
        let result = page.fetch(&first).await;
        assert_eq!(page.complete(first, result), LoadOutcome::Discarded);
        assert_eq!(page.entry().map(DictionaryEntry::word), Some("perro"));
        assert_eq!(page.language(), Language::Es);
    }
}
