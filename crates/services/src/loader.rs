//! Fetches remote content and turns it into validated core items.

use std::sync::Arc;

use tracing::{debug, warn};

use lingo_core::model::{
    BingoGrid, BingoWord, Difficulty, HiddenWord, Keyboard, Language, LoadError, MaskedWord,
    PageNumber, QuizItem, WordIndex, WordPair,
};

use crate::api::{ContentSource, HiddenWordDto, TranslationCheck, WordPairDto};
use crate::error::ApiError;

/// Server verdict on one guessed letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessReply {
    pub word: HiddenWord,
    pub success: bool,
}

/// Server verdict on one bingo translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationVerdict {
    pub is_correct: bool,
    pub correct_translation: String,
}

/// Converts `ContentSource` payloads into core items and maps failures to
/// `LoadError`.
#[derive(Clone)]
pub struct ContentLoader {
    source: Arc<dyn ContentSource>,
}

impl ContentLoader {
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Quizzes for `language`. Items tagged with another language are
    /// dropped, as are malformed ones.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Empty` when nothing usable remains, otherwise the
    /// mapped transport or server error.
    pub async fn quizzes(&self, token: &str, language: Language) -> Result<Vec<QuizItem>, LoadError> {
        let dtos = self
            .source
            .quizzes(token, language)
            .await
            .map_err(|err| load_failed("quizzes", language, err))?;

        let fetched = dtos.len();
        let items: Vec<QuizItem> = dtos
            .into_iter()
            .filter(|dto| dto.language.parse::<Language>().ok() == Some(language))
            .filter_map(|dto| {
                QuizItem::new(dto.question, dto.options, dto.answer, language)
                    .map_err(|err| warn!(%language, error = %err, "skipping malformed quiz"))
                    .ok()
            })
            .collect();
        debug!(%language, fetched, kept = items.len(), "quizzes loaded");

        non_empty(items)
    }

    /// # Errors
    ///
    /// Returns `LoadError::Empty` when the server returns no usable pairs.
    pub async fn word_pairs(&self, token: &str, language: Language) -> Result<Vec<WordPair>, LoadError> {
        let dtos = self
            .source
            .drag_words(token, language)
            .await
            .map_err(|err| load_failed("drag words", language, err))?;
        non_empty(to_pairs(dtos))
    }

    /// Start a guess-word round for the word at `index`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` past the end of the word list and
    /// `LoadError::Empty` if the server sends a blank mask.
    pub async fn guess_start(
        &self,
        token: &str,
        language: Language,
        index: WordIndex,
    ) -> Result<HiddenWord, LoadError> {
        let dto = self
            .source
            .start_guess(token, language, index)
            .await
            .map_err(|err| load_failed("guess word", language, err))?;
        hidden_word(dto)
    }

    /// Submit one letter of the active round.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` as reported by the source. A blank mask in the
    /// reply is a `ServerRejected` error.
    pub async fn guess_letter(&self, token: &str, letter: char) -> Result<GuessReply, ApiError> {
        let dto = self.source.guess_letter(token, letter).await.map_err(|err| {
            warn!(%letter, error = %err, "letter guess failed");
            err
        })?;
        let word = hidden_word(HiddenWordDto {
            hidden_word: dto.hidden_word,
            meaning: dto.meaning,
        })
        .map_err(|_| ApiError::ServerRejected {
            status: 502,
            message: "Malformed guess response".to_string(),
        })?;
        Ok(GuessReply {
            word,
            success: dto.success,
        })
    }

    /// # Errors
    ///
    /// Returns `LoadError::Empty` for a keyboard without keys.
    pub async fn keyboard(&self, language: Language) -> Result<Keyboard, LoadError> {
        let dto = self
            .source
            .keyboard(language)
            .await
            .map_err(|err| load_failed("keyboard", language, err))?;
        Keyboard::new(dto.keyboard).map_err(|_| LoadError::Empty)
    }

    /// One page of flashcards. An empty page is a valid answer here.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or server error.
    pub async fn flashcards(
        &self,
        token: &str,
        language: Language,
        page: PageNumber,
    ) -> Result<Vec<WordPair>, LoadError> {
        let dto = self
            .source
            .flashcards(token, language, page)
            .await
            .map_err(|err| load_failed("flashcards", language, err))?;
        Ok(to_pairs(dto.flashcards))
    }

    /// Words for a bingo card, cut down to the largest square that fits.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Empty` when no usable word arrives.
    pub async fn bingo_grid(
        &self,
        difficulty: Difficulty,
        language: Language,
    ) -> Result<BingoGrid, LoadError> {
        let dto = self
            .source
            .bingo_words(difficulty, language)
            .await
            .map_err(|err| load_failed("bingo words", language, err))?;

        let fetched = dto.words.len();
        let words: Vec<BingoWord> = dto
            .words
            .into_iter()
            .filter_map(|dto| {
                BingoWord::new(dto.id, dto.word)
                    .map_err(|err| warn!(%language, error = %err, "skipping malformed bingo word"))
                    .ok()
            })
            .collect();
        let grid = BingoGrid::square(words).map_err(|_| LoadError::Empty)?;
        debug!(%language, %difficulty, fetched, side = grid.side(), "bingo words loaded");
        Ok(grid)
    }

    /// # Errors
    ///
    /// Returns `ApiError` as reported by the source.
    pub async fn check_translation(
        &self,
        word_id: &str,
        language: Language,
        translation: &str,
    ) -> Result<TranslationVerdict, ApiError> {
        let check = TranslationCheck {
            word_id: word_id.to_string(),
            language,
            user_translation: translation.to_string(),
        };
        let dto = self.source.check_translation(&check).await.map_err(|err| {
            warn!(%language, word_id, error = %err, "translation check failed");
            err
        })?;
        Ok(TranslationVerdict {
            is_correct: dto.is_correct,
            correct_translation: dto.correct_translation,
        })
    }

    /// Dictionary lookup. `Ok(None)` means the word exists without a
    /// translation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` as reported by the source.
    pub async fn search_word(
        &self,
        word: &str,
        language: Language,
    ) -> Result<Option<String>, ApiError> {
        let dto = self.source.search_word(word, language).await.map_err(|err| {
            warn!(%language, error = %err, "dictionary search failed");
            err
        })?;
        Ok(dto
            .translation
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()))
    }
}

fn load_failed(what: &'static str, language: Language, err: ApiError) -> LoadError {
    warn!(%language, error = %err, "failed to load {what}");
    LoadError::from(err)
}

fn to_pairs(dtos: Vec<WordPairDto>) -> Vec<WordPair> {
    dtos.into_iter()
        .filter_map(|dto| WordPair::new(dto.word, dto.translation).ok())
        .collect()
}

fn hidden_word(dto: HiddenWordDto) -> Result<HiddenWord, LoadError> {
    let mask = MaskedWord::parse(dto.hidden_word).map_err(|_| LoadError::Empty)?;
    Ok(HiddenWord::new(mask, dto.meaning))
}

fn non_empty<T>(items: Vec<T>) -> Result<Vec<T>, LoadError> {
    if items.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(items)
}
