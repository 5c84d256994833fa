//! Paged flashcard browser.

use lingo_core::model::{Generation, Language, LoadError, PageNumber, WordPair};
use lingo_core::session::{FetchGuard, LoadOutcome};
use tracing::{debug, warn};

use crate::auth::AuthGuard;
use crate::error::ControllerError;
use crate::loader::ContentLoader;
use crate::view::FlashcardsView;

/// A word pair with its flip state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pair: WordPair,
    flipped: bool,
}

impl Flashcard {
    #[must_use]
    pub fn pair(&self) -> &WordPair {
        &self.pair
    }

    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }
}

/// A page request that has not been applied yet.
#[derive(Clone)]
pub struct PendingPage {
    generation: Generation,
    language: Language,
    page: PageNumber,
    token: String,
}

impl PendingPage {
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn page(&self) -> PageNumber {
        self.page
    }
}

impl std::fmt::Debug for PendingPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPage")
            .field("generation", &self.generation)
            .field("language", &self.language)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

pub struct FlashcardPager {
    loader: ContentLoader,
    auth: AuthGuard,
    guard: FetchGuard,
    language: Language,
    page: PageNumber,
    cards: Vec<Flashcard>,
    message: Option<String>,
}

impl FlashcardPager {
    #[must_use]
    pub fn new(loader: ContentLoader, auth: AuthGuard, language: Language) -> Self {
        Self {
            loader,
            auth,
            guard: FetchGuard::new(),
            language,
            page: PageNumber::FIRST,
            cards: Vec::new(),
            message: None,
        }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn page(&self) -> PageNumber {
        self.page
    }

    #[must_use]
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.guard.is_loading()
    }

    /// Request `page` in `language`. With `supersede` any outstanding request
    /// goes stale; without it a second request is refused while one is out.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api(AuthMissing)` without a stored token and
    /// `SessionError::Busy` when refused.
    pub async fn begin(
        &mut self,
        language: Language,
        page: PageNumber,
        supersede: bool,
    ) -> Result<PendingPage, ControllerError> {
        let token = self.auth.require_token().await?;
        let generation = if supersede {
            self.guard.supersede()
        } else {
            self.guard.begin()?
        };
        Ok(PendingPage {
            generation,
            language,
            page,
            token,
        })
    }

    /// # Errors
    ///
    /// Returns the `LoadError` reported by the loader.
    pub async fn fetch(&self, pending: &PendingPage) -> Result<Vec<WordPair>, LoadError> {
        self.loader
            .flashcards(&pending.token, pending.language, pending.page)
            .await
    }

    /// Apply a fetched page. Flip state starts over for every page.
    pub fn complete(
        &mut self,
        pending: PendingPage,
        result: Result<Vec<WordPair>, LoadError>,
    ) -> LoadOutcome {
        if !self.guard.settle(pending.generation) {
            debug!(language = %pending.language, page = %pending.page, "stale flashcards discarded");
            return LoadOutcome::Discarded;
        }
        match result {
            Ok(pairs) => {
                self.language = pending.language;
                self.page = pending.page;
                self.cards = pairs
                    .into_iter()
                    .map(|pair| Flashcard {
                        pair,
                        flipped: false,
                    })
                    .collect();
                self.message = None;
                LoadOutcome::Applied {
                    items: self.cards.len(),
                }
            }
            Err(err) => {
                warn!(language = %pending.language, page = %pending.page, error = %err, "flashcards failed");
                self.message = Some(err.user_message());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// # Errors
    ///
    /// See `begin`.
    pub async fn load_current(&mut self) -> Result<LoadOutcome, ControllerError> {
        self.load(self.language, self.page, false).await
    }

    /// # Errors
    ///
    /// See `begin`.
    pub async fn next_page(&mut self) -> Result<LoadOutcome, ControllerError> {
        self.load(self.language, self.page.next(), false).await
    }

    /// Go back one page. Does nothing on the first page.
    ///
    /// # Errors
    ///
    /// See `begin`.
    pub async fn previous_page(&mut self) -> Result<Option<LoadOutcome>, ControllerError> {
        if self.page.is_first() {
            return Ok(None);
        }
        self.load(self.language, self.page.previous(), false)
            .await
            .map(Some)
    }

    /// Switch language and go back to page 1.
    ///
    /// # Errors
    ///
    /// See `begin`.
    pub async fn change_language(
        &mut self,
        language: Language,
    ) -> Result<LoadOutcome, ControllerError> {
        self.load(language, PageNumber::FIRST, true).await
    }

    /// Toggle the card at `index`. Returns its new state.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::UnknownSlot` for an index past the page.
    pub fn flip(&mut self, index: usize) -> Result<bool, ControllerError> {
        let card = self
            .cards
            .get_mut(index)
            .ok_or(ControllerError::UnknownSlot(index))?;
        card.flipped = !card.flipped;
        Ok(card.flipped)
    }

    pub fn leave(&mut self) {
        self.guard.abandon();
    }

    #[must_use]
    pub fn view(&self) -> FlashcardsView {
        FlashcardsView::project(
            self.language,
            self.page,
            self.guard.is_loading(),
            &self.cards,
            self.message.as_deref(),
        )
    }

    async fn load(
        &mut self,
        language: Language,
        page: PageNumber,
        supersede: bool,
    ) -> Result<LoadOutcome, ControllerError> {
        let pending = self.begin(language, page, supersede).await?;
        let result = self.fetch(&pending).await;
        Ok(self.complete(pending, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use storage::repository::{ClientStateRepository, InMemoryRepository, StateKey};

    use crate::api::{InMemoryBackend, WordPairDto};

    fn cards(n: usize) -> Vec<WordPairDto> {
        (1..=n)
            .map(|i| WordPairDto {
                word: format!("mot{i}"),
                translation: Some(format!("word{i}")),
            })
            .collect()
    }

    async fn pager(backend: InMemoryBackend) -> FlashcardPager {
        let state = Arc::new(InMemoryRepository::new());
        state.set(StateKey::Token, "t").await.unwrap();
        FlashcardPager::new(
            ContentLoader::new(Arc::new(backend)),
            AuthGuard::new(state),
            Language::Fr,
        )
    }

    #[tokio::test]
    async fn pages_forward_and_clamp_at_first() {
        let backend = InMemoryBackend::new().with_flashcards(Language::Fr, cards(3), 2);
        let mut pager = pager(backend).await;

        pager.load_current().await.unwrap();
        assert_eq!(pager.cards().len(), 2);
        assert_eq!(pager.previous_page().await.unwrap(), None);

        pager.next_page().await.unwrap();
        assert_eq!(pager.page().value(), 2);
        assert_eq!(pager.cards().len(), 1);

        pager.next_page().await.unwrap();
        assert_eq!(pager.view().empty_text, Some(crate::view::NO_FLASHCARDS));
    }

    #[tokio::test]
    async fn flip_toggles_and_resets_on_page_change() {
        let backend = InMemoryBackend::new().with_flashcards(Language::Fr, cards(4), 2);
        let mut pager = pager(backend).await;
        pager.load_current().await.unwrap();

        assert!(pager.flip(1).unwrap());
        assert!(pager.view().cards[1].flipped);
        assert!(matches!(pager.flip(5), Err(ControllerError::UnknownSlot(5))));

        pager.next_page().await.unwrap();
        assert!(pager.cards().iter().all(|card| !card.is_flipped()));
    }

    #[tokio::test]
    async fn stale_page_is_discarded_after_language_change() {
        let backend = InMemoryBackend::new()
            .with_flashcards(Language::Fr, cards(2), 2)
            .with_flashcards(Language::Es, cards(1), 2);
        let mut pager = pager(backend).await;

        let stale = pager.begin(Language::Fr, PageNumber::FIRST, false).await.unwrap();
        let fresh = pager.begin(Language::Es, PageNumber::FIRST, true).await.unwrap();

        let result = pager.fetch(&fresh).await;
        assert_eq!(pager.complete(fresh, result), LoadOutcome::Applied { items: 1 });

        let result = pager.fetch(&stale).await;
        assert_eq!(pager.complete(stale, result), LoadOutcome::Discarded);
        assert_eq!(pager.language(), Language::Es);
        assert_eq!(pager.cards().len(), 1);
    }
}
