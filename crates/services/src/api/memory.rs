use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use lingo_core::model::{Difficulty, Language, PageNumber, WordIndex};
use lingo_core::validation::answers_match;

use super::{
    AuthBackend, BingoWordDto, BingoWordsDto, ContentSource, DictionaryDto, FlashcardPageDto,
    GuessDto, HiddenWordDto, KeyboardDto, LoginDto, QuizDto, RegisterRequest, TranslationCheck,
    TranslationVerdictDto, WordPairDto,
};
use crate::error::ApiError;

const DEFAULT_FLASHCARDS_PER_PAGE: usize = 10;

/// In-process stand-in for the REST backend, for tests and offline play.
///
/// Mirrors the server's observable behavior: guess-word rounds are
/// stateful per backend, authenticated endpoints reject a blank token, and
/// missing entries answer 404.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

#[derive(Default)]
struct BackendState {
    quizzes: HashMap<Language, Vec<QuizDto>>,
    words: HashMap<Language, Vec<WordPairDto>>,
    guess_words: HashMap<Language, Vec<(String, String)>>,
    keyboards: HashMap<Language, Vec<String>>,
    flashcards: HashMap<Language, Vec<WordPairDto>>,
    flashcards_per_page: Option<usize>,
    bingo: HashMap<(Language, Difficulty), Vec<BingoEntry>>,
    dictionary: HashMap<Language, Vec<(String, Option<String>)>>,
    users: HashMap<String, Account>,
    round: Option<GuessRound>,
    offline: bool,
    requests: u32,
}

struct Account {
    password: String,
    role: String,
}

struct BingoEntry {
    id: String,
    word: String,
    translation: String,
}

struct GuessRound {
    word: String,
    meaning: String,
    revealed: BTreeSet<char>,
}

impl GuessRound {
    fn mask(&self) -> String {
        self.word
            .chars()
            .map(|c| {
                let known = !c.is_alphabetic() || c.to_lowercase().all(|l| self.revealed.contains(&l));
                if known { c } else { '_' }
            })
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quizzes(self, language: Language, quizzes: Vec<QuizDto>) -> Self {
        self.update(|state| {
            state.quizzes.insert(language, quizzes);
        });
        self
    }

    #[must_use]
    pub fn with_words(self, language: Language, words: Vec<WordPairDto>) -> Self {
        self.update(|state| {
            state.words.insert(language, words);
        });
        self
    }

    /// Register `(word, meaning)` entries served by index for guess-word.
    #[must_use]
    pub fn with_guess_words(self, language: Language, words: &[(&str, &str)]) -> Self {
        let words = words
            .iter()
            .map(|(word, meaning)| ((*word).to_string(), (*meaning).to_string()))
            .collect();
        self.update(|state| {
            state.guess_words.insert(language, words);
        });
        self
    }

    #[must_use]
    pub fn with_keyboard(self, language: Language, keys: &[&str]) -> Self {
        let keys = keys.iter().map(|k| (*k).to_string()).collect();
        self.update(|state| {
            state.keyboards.insert(language, keys);
        });
        self
    }

    #[must_use]
    pub fn with_flashcards(
        self,
        language: Language,
        cards: Vec<WordPairDto>,
        per_page: usize,
    ) -> Self {
        self.update(|state| {
            state.flashcards.insert(language, cards);
            state.flashcards_per_page = Some(per_page.max(1));
        });
        self
    }

    /// Register `(word, translation)` bingo entries. Ids are
    /// `{language}-{level}-{position}`.
    #[must_use]
    pub fn with_bingo_words(
        self,
        language: Language,
        difficulty: Difficulty,
        words: &[(&str, &str)],
    ) -> Self {
        let entries = words
            .iter()
            .enumerate()
            .map(|(i, (word, translation))| BingoEntry {
                id: format!("{language}-{difficulty}-{i}"),
                word: (*word).to_string(),
                translation: (*translation).to_string(),
            })
            .collect();
        self.update(|state| {
            state.bingo.insert((language, difficulty), entries);
        });
        self
    }

    /// Register dictionary entries. A `None` translation is served as a
    /// found word without a translation.
    #[must_use]
    pub fn with_dictionary(self, language: Language, entries: &[(&str, Option<&str>)]) -> Self {
        let entries = entries
            .iter()
            .map(|(word, translation)| ((*word).to_string(), translation.map(str::to_string)))
            .collect();
        self.update(|state| {
            state.dictionary.insert(language, entries);
        });
        self
    }

    #[must_use]
    pub fn with_user(self, username: &str, password: &str, role: &str) -> Self {
        let account = Account {
            password: password.to_string(),
            role: role.to_string(),
        };
        self.update(|state| {
            state.users.insert(username.to_string(), account);
        });
        self
    }

    /// Make every subsequent request fail with `ApiError::NetworkFailure`.
    pub fn set_offline(&self, offline: bool) {
        self.update(|state| state.offline = offline);
    }

    /// Number of requests received so far, including failed ones.
    #[must_use]
    pub fn request_count(&self) -> u32 {
        self.state.lock().map(|state| state.requests).unwrap_or(0)
    }

    fn update(&self, apply: impl FnOnce(&mut BackendState)) {
        if let Ok(mut state) = self.state.lock() {
            apply(&mut state);
        }
    }

    fn request(&self, token: Option<&str>) -> Result<MutexGuard<'_, BackendState>, ApiError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;
        state.requests = state.requests.saturating_add(1);
        if state.offline {
            return Err(ApiError::NetworkFailure("backend unreachable".into()));
        }
        if token.is_some_and(|t| t.trim().is_empty()) {
            return Err(rejected(401, "Unauthorized"));
        }
        Ok(state)
    }
}

fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::ServerRejected {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl ContentSource for InMemoryBackend {
    async fn quizzes(&self, token: &str, language: Language) -> Result<Vec<QuizDto>, ApiError> {
        let state = self.request(Some(token))?;
        Ok(state.quizzes.get(&language).cloned().unwrap_or_default())
    }

    async fn drag_words(
        &self,
        token: &str,
        language: Language,
    ) -> Result<Vec<WordPairDto>, ApiError> {
        let state = self.request(Some(token))?;
        Ok(state.words.get(&language).cloned().unwrap_or_default())
    }

    async fn start_guess(
        &self,
        token: &str,
        language: Language,
        index: WordIndex,
    ) -> Result<HiddenWordDto, ApiError> {
        let mut state = self.request(Some(token))?;
        let position = usize::try_from(index.value()).unwrap_or(usize::MAX);
        let (word, meaning) = state
            .guess_words
            .get(&language)
            .and_then(|words| words.get(position))
            .cloned()
            .ok_or_else(|| rejected(404, "No word found"))?;

        let round = GuessRound {
            word,
            meaning,
            revealed: BTreeSet::new(),
        };
        let dto = HiddenWordDto {
            hidden_word: round.mask(),
            meaning: round.meaning.clone(),
        };
        state.round = Some(round);
        Ok(dto)
    }

    async fn guess_letter(&self, token: &str, letter: char) -> Result<GuessDto, ApiError> {
        let mut state = self.request(Some(token))?;
        let round = state
            .round
            .as_mut()
            .ok_or_else(|| rejected(400, "Start a game first"))?;

        let lowered: Vec<char> = letter.to_lowercase().collect();
        let success = round
            .word
            .chars()
            .flat_map(char::to_lowercase)
            .any(|c| lowered.contains(&c));
        if success {
            round.revealed.extend(lowered);
        }

        Ok(GuessDto {
            hidden_word: round.mask(),
            meaning: round.meaning.clone(),
            success,
        })
    }

    async fn keyboard(&self, language: Language) -> Result<KeyboardDto, ApiError> {
        let state = self.request(None)?;
        let keyboard = state
            .keyboards
            .get(&language)
            .cloned()
            .ok_or_else(|| rejected(404, "Keyboard not found"))?;
        Ok(KeyboardDto { keyboard })
    }

    async fn flashcards(
        &self,
        token: &str,
        language: Language,
        page: PageNumber,
    ) -> Result<FlashcardPageDto, ApiError> {
        let state = self.request(Some(token))?;
        let per_page = state
            .flashcards_per_page
            .unwrap_or(DEFAULT_FLASHCARDS_PER_PAGE);
        let skip = usize::try_from(page.value() - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(per_page);
        let flashcards = state
            .flashcards
            .get(&language)
            .map(|cards| cards.iter().skip(skip).take(per_page).cloned().collect())
            .unwrap_or_default();
        Ok(FlashcardPageDto { flashcards })
    }

    async fn bingo_words(
        &self,
        difficulty: Difficulty,
        language: Language,
    ) -> Result<BingoWordsDto, ApiError> {
        let state = self.request(None)?;
        let words = state
            .bingo
            .get(&(language, difficulty))
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| BingoWordDto {
                        id: entry.id.clone(),
                        word: entry.word.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(BingoWordsDto { words })
    }

    async fn check_translation(
        &self,
        check: &TranslationCheck,
    ) -> Result<TranslationVerdictDto, ApiError> {
        let state = self.request(None)?;
        let entry = state
            .bingo
            .iter()
            .filter(|((language, _), _)| *language == check.language)
            .flat_map(|(_, entries)| entries)
            .find(|entry| entry.id == check.word_id)
            .ok_or_else(|| rejected(404, "Word not found"))?;
        Ok(TranslationVerdictDto {
            is_correct: answers_match(&entry.translation, &check.user_translation),
            correct_translation: entry.translation.clone(),
        })
    }

    async fn search_word(
        &self,
        word: &str,
        language: Language,
    ) -> Result<DictionaryDto, ApiError> {
        let state = self.request(None)?;
        let translation = state
            .dictionary
            .get(&language)
            .and_then(|entries| entries.iter().find(|(known, _)| answers_match(known, word)))
            .map(|(_, translation)| translation.clone())
            .ok_or_else(|| rejected(404, "Word not found"))?;
        Ok(DictionaryDto { translation })
    }
}

#[async_trait]
impl AuthBackend for InMemoryBackend {
    async fn login(&self, username: &str, password: &str) -> Result<LoginDto, ApiError> {
        let state = self.request(None)?;
        match state.users.get(username) {
            Some(account) if account.password == password => Ok(LoginDto {
                token: format!("local-{username}"),
                username: username.to_string(),
                role: Some(account.role.clone()),
            }),
            _ => Err(rejected(401, "Invalid username or password")),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let mut state = self.request(None)?;
        if state.users.contains_key(&request.username) {
            return Err(rejected(409, "User already exists"));
        }
        state.users.insert(
            request.username.clone(),
            Account {
                password: request.password.clone(),
                role: "user".to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guess_round_reveals_every_occurrence() {
        let backend = InMemoryBackend::new().with_guess_words(Language::Fr, &[("chat", "cat")]);
        let start = backend
            .start_guess("t", Language::Fr, WordIndex::new(0))
            .await
            .unwrap();
        assert_eq!(start.hidden_word, "_ _ _ _");

        let hit = backend.guess_letter("t", 'A').await.unwrap();
        assert!(hit.success);
        assert_eq!(hit.hidden_word, "_ _ a _");

        let miss = backend.guess_letter("t", 'z').await.unwrap();
        assert!(!miss.success);
        assert_eq!(miss.hidden_word, "_ _ a _");
    }

    #[tokio::test]
    async fn blank_token_is_unauthorized() {
        let backend = InMemoryBackend::new();
        let err = backend.quizzes(" ", Language::Fr).await.unwrap_err();
        assert!(matches!(err, ApiError::ServerRejected { status: 401, .. }));
    }

    #[tokio::test]
    async fn offline_backend_counts_requests() {
        let backend = InMemoryBackend::new();
        backend.set_offline(true);
        assert!(matches!(
            backend.keyboard(Language::De).await,
            Err(ApiError::NetworkFailure(_))
        ));
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn translation_check_is_scoped_to_the_language() {
        let backend = InMemoryBackend::new()
            .with_bingo_words(Language::Fr, Difficulty::Easy, &[("chat", "cat")])
            .with_bingo_words(Language::Es, Difficulty::Easy, &[("gato", "cat")]);
        let words = backend
            .bingo_words(Difficulty::Easy, Language::Fr)
            .await
            .unwrap();
        assert_eq!(words.words[0].id, "fr-easy-0");

        let mut check = TranslationCheck {
            word_id: "fr-easy-0".into(),
            language: Language::Fr,
            user_translation: " Cat ".into(),
        };
        assert!(backend.check_translation(&check).await.unwrap().is_correct);

        check.language = Language::Es;
        let err = backend.check_translation(&check).await.unwrap_err();
        assert!(matches!(err, ApiError::ServerRejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn flashcards_are_paged() {
        let cards = (1..=5)
            .map(|i| WordPairDto {
                word: format!("w{i}"),
                translation: Some(format!("t{i}")),
            })
            .collect();
        let backend = InMemoryBackend::new().with_flashcards(Language::Es, cards, 2);
        let third = backend
            .flashcards("t", Language::Es, PageNumber::new(3))
            .await
            .unwrap();
        assert_eq!(third.flashcards.len(), 1);
        assert_eq!(third.flashcards[0].word, "w5");
    }
}
