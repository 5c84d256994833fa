use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::model::Language;

/// Label shown for a word pair whose translation is missing.
pub const DEFAULT_TRANSLATION_LABEL: &str = "No translation available";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("question text is empty")]
    EmptyQuestion,

    #[error("question has no options")]
    NoOptions,

    #[error("answer is empty")]
    EmptyAnswer,

    #[error("word is empty")]
    EmptyWord,

    #[error("keyboard has no keys")]
    EmptyKeyboard,

    #[error("word id is missing")]
    MissingId,

    #[error("bingo grid needs at least one word")]
    EmptyGrid,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    question: String,
    options: Vec<String>,
    answer: String,
    language: Language,
}

impl QuizItem {
    /// # Errors
    ///
    /// Returns `ItemError` if the question, options, or answer are empty.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
        language: Language,
    ) -> Result<Self, ItemError> {
        let question = question.into();
        let answer = answer.into();
        if question.trim().is_empty() {
            return Err(ItemError::EmptyQuestion);
        }
        let options: Vec<String> = options
            .into_iter()
            .filter(|option| !option.trim().is_empty())
            .collect();
        if options.is_empty() {
            return Err(ItemError::NoOptions);
        }
        if answer.trim().is_empty() {
            return Err(ItemError::EmptyAnswer);
        }
        Ok(Self {
            question,
            options,
            answer,
            language,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }
}

//
// ─── WORD PAIRS ────────────────────────────────────────────────────────────────
//

/// A source word and its translation, used by drag-and-drop and flashcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    word: String,
    translation: Option<String>,
}

impl WordPair {
    /// # Errors
    ///
    /// Returns `ItemError::EmptyWord` if the source word is blank.
    pub fn new(word: impl Into<String>, translation: Option<String>) -> Result<Self, ItemError> {
        let word = word.into().trim().to_string();
        if word.is_empty() {
            return Err(ItemError::EmptyWord);
        }
        let translation = translation
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self { word, translation })
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    /// Translation text, or the placeholder when the server sent none.
    #[must_use]
    pub fn translation_label(&self) -> &str {
        self.translation().unwrap_or(DEFAULT_TRANSLATION_LABEL)
    }
}

/// A window of word pairs shown together on the drag-and-drop board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPage {
    pairs: Vec<WordPair>,
}

impl WordPage {
    /// Splits `pairs` into consecutive pages of at most `per_page` entries.
    ///
    /// A `per_page` of zero is treated as one.
    #[must_use]
    pub fn paginate(pairs: Vec<WordPair>, per_page: usize) -> Vec<WordPage> {
        let per_page = per_page.max(1);
        pairs
            .chunks(per_page)
            .map(|chunk| WordPage {
                pairs: chunk.to_vec(),
            })
            .collect()
    }

    #[must_use]
    pub fn pairs(&self) -> &[WordPair] {
        &self.pairs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

//
// ─── GUESS WORD ────────────────────────────────────────────────────────────────
//

/// Server-rendered mask such as `"_ a _ _"`. Underscores mark unknown slots.
#[derive(Clone, PartialEq, Eq)]
pub struct MaskedWord(String);

impl MaskedWord {
    pub const UNKNOWN: char = '_';

    /// # Errors
    ///
    /// Returns `ItemError::EmptyWord` if the mask has no slots.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ItemError> {
        let raw = raw.into();
        if raw.chars().all(char::is_whitespace) {
            return Err(ItemError::EmptyWord);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slots of the word; `None` for letters not yet revealed.
    pub fn slots(&self) -> impl Iterator<Item = Option<char>> + '_ {
        self.0
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == Self::UNKNOWN { None } else { Some(c) })
    }

    #[must_use]
    pub fn unknown_count(&self) -> usize {
        self.slots().filter(Option::is_none).count()
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        !self.0.contains(Self::UNKNOWN)
    }

    /// Lowercased letters currently visible in the mask.
    #[must_use]
    pub fn revealed_letters(&self) -> BTreeSet<char> {
        self.slots()
            .flatten()
            .filter(|c| c.is_alphabetic())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

impl fmt::Debug for MaskedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaskedWord({:?})", self.0)
    }
}

impl fmt::Display for MaskedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The word currently being guessed, as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenWord {
    mask: MaskedWord,
    meaning: String,
}

impl HiddenWord {
    #[must_use]
    pub fn new(mask: MaskedWord, meaning: impl Into<String>) -> Self {
        Self {
            mask,
            meaning: meaning.into(),
        }
    }

    #[must_use]
    pub fn mask(&self) -> &MaskedWord {
        &self.mask
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }
}

/// Language-specific key layout for letter entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: Vec<String>,
}

impl Keyboard {
    /// # Errors
    ///
    /// Returns `ItemError::EmptyKeyboard` if no usable keys remain.
    pub fn new(keys: Vec<String>) -> Result<Self, ItemError> {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return Err(ItemError::EmptyKeyboard);
        }
        Ok(Self { keys })
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

//
// ─── BINGO ─────────────────────────────────────────────────────────────────────
//

/// A bingo word and the server id its translation is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoWord {
    id: String,
    word: String,
}

impl BingoWord {
    /// # Errors
    ///
    /// Returns `ItemError::MissingId` or `ItemError::EmptyWord` for blank fields.
    pub fn new(id: impl Into<String>, word: impl Into<String>) -> Result<Self, ItemError> {
        let id = id.into().trim().to_string();
        let word = word.into().trim().to_string();
        if id.is_empty() {
            return Err(ItemError::MissingId);
        }
        if word.is_empty() {
            return Err(ItemError::EmptyWord);
        }
        Ok(Self { id, word })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }
}

/// One grid cell with the server's last verdict on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoCell {
    word: BingoWord,
    verdict: Option<bool>,
    correct_translation: Option<String>,
}

impl BingoCell {
    #[must_use]
    pub fn word(&self) -> &BingoWord {
        &self.word
    }

    #[must_use]
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    #[must_use]
    pub fn correct_translation(&self) -> Option<&str> {
        self.correct_translation.as_deref()
    }
}

/// Square bingo board laid out row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoGrid {
    side: usize,
    cells: Vec<BingoCell>,
}

impl BingoGrid {
    /// Lays out the largest square that `words` fills. Words past it are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyGrid` when `words` is empty.
    pub fn square(words: Vec<BingoWord>) -> Result<Self, ItemError> {
        let side = words.len().isqrt();
        if side == 0 {
            return Err(ItemError::EmptyGrid);
        }
        let cells = words
            .into_iter()
            .take(side * side)
            .map(|word| BingoCell {
                word,
                verdict: None,
                correct_translation: None,
            })
            .collect();
        Ok(Self { side, cells })
    }

    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    #[must_use]
    pub fn cells(&self) -> &[BingoCell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&BingoCell> {
        self.cells.get(index)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[BingoCell]> + '_ {
        self.cells.chunks(self.side)
    }

    /// Store a verdict on the cell at `index`. Returns the previous verdict,
    /// or `None` if the index is out of range or the cell was unanswered.
    pub fn record(
        &mut self,
        index: usize,
        is_correct: bool,
        correct_translation: impl Into<String>,
    ) -> Option<bool> {
        let cell = self.cells.get_mut(index)?;
        let previous = cell.verdict;
        cell.verdict = Some(is_correct);
        cell.correct_translation = Some(correct_translation.into());
        previous
    }

    pub fn clear_verdicts(&mut self) {
        for cell in &mut self.cells {
            cell.verdict = None;
            cell.correct_translation = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(word: &str, translation: &str) -> WordPair {
        WordPair::new(word, Some(translation.to_string())).unwrap()
    }

    #[test]
    fn quiz_item_requires_question_and_options() {
        assert_eq!(
            QuizItem::new(" ", vec!["a".into()], "a", Language::Fr).unwrap_err(),
            ItemError::EmptyQuestion
        );
        assert_eq!(
            QuizItem::new("q", vec![" ".into()], "a", Language::Fr).unwrap_err(),
            ItemError::NoOptions
        );
    }

    #[test]
    fn missing_translation_uses_placeholder() {
        let pair = WordPair::new("pain", Some("  ".into())).unwrap();
        assert_eq!(pair.translation(), None);
        assert_eq!(pair.translation_label(), DEFAULT_TRANSLATION_LABEL);
    }

    #[test]
    fn paginate_keeps_order_and_remainder() {
        let pairs = vec![
            pair("a", "1"),
            pair("b", "2"),
            pair("c", "3"),
            pair("d", "4"),
            pair("e", "5"),
        ];
        let pages = WordPage::paginate(pairs, 4);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 4);
        assert_eq!(pages[1].pairs()[0].word(), "e");
    }

    #[test]
    fn mask_tracks_unknown_slots() {
        let mask = MaskedWord::parse("_ h _ t").unwrap();
        assert_eq!(mask.unknown_count(), 2);
        assert!(!mask.is_solved());
        assert_eq!(mask.revealed_letters().into_iter().collect::<String>(), "ht");

        let solved = MaskedWord::parse("C h a t").unwrap();
        assert!(solved.is_solved());
        assert!(solved.revealed_letters().contains(&'c'));
    }

    fn bingo_words(n: usize) -> Vec<BingoWord> {
        (0..n)
            .map(|i| BingoWord::new(format!("id{i}"), format!("mot{i}")).unwrap())
            .collect()
    }

    #[test]
    fn bingo_grid_keeps_the_largest_square() {
        let grid = BingoGrid::square(bingo_words(10)).unwrap();
        assert_eq!(grid.side(), 3);
        assert_eq!(grid.cells().len(), 9);
        let rows: Vec<usize> = grid.rows().map(<[BingoCell]>::len).collect();
        assert_eq!(rows, vec![3, 3, 3]);
        assert_eq!(grid.cell(4).unwrap().word().word(), "mot4");

        assert_eq!(BingoGrid::square(Vec::new()).unwrap_err(), ItemError::EmptyGrid);
    }

    #[test]
    fn bingo_record_reports_previous_verdict() {
        let mut grid = BingoGrid::square(bingo_words(4)).unwrap();
        assert_eq!(grid.record(1, false, "bread"), None);
        assert_eq!(grid.record(1, true, "bread"), Some(false));
        assert_eq!(grid.cell(1).unwrap().correct_translation(), Some("bread"));
        assert_eq!(grid.record(9, true, "x"), None);

        grid.clear_verdicts();
        assert!(grid.cells().iter().all(|cell| cell.verdict().is_none()));
    }

    #[test]
    fn bingo_word_needs_id_and_text() {
        assert_eq!(BingoWord::new(" ", "pain").unwrap_err(), ItemError::MissingId);
        assert_eq!(BingoWord::new("1", "").unwrap_err(), ItemError::EmptyWord);
    }

    #[test]
    fn blank_mask_is_rejected() {
        assert_eq!(MaskedWord::parse("   ").unwrap_err(), ItemError::EmptyWord);
    }
}
