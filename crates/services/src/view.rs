//! Render-ready projections of controller state.
//!
//! Every function here is pure: a front end calls it after each transition
//! and redraws from the result.

use chrono::{DateTime, Utc};

use lingo_core::model::{
    BingoCell, BingoGrid, Difficulty, HiddenWord, Keyboard, Language, PageNumber, QuizItem, Score,
    WordPage,
};
use lingo_core::session::{Session, SessionStatus};

use crate::dictionary::DictionaryEntry;
use crate::flashcards::Flashcard;
use crate::games::DragBoard;

/// Mask shown before any guess-word round has started.
pub const EMPTY_MASK: &str = "_ _ _ _";

/// Shown in place of an empty flashcard page.
pub const NO_FLASHCARDS: &str = "No flashcards found";

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    /// 1-based position for display.
    pub number: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub answered: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizView {
    pub language: Language,
    pub status: SessionStatus,
    pub loading: bool,
    pub question: Option<QuestionView>,
    pub score: Score,
    pub correct_label: String,
    pub incorrect_label: String,
    pub show_previous: bool,
    pub show_next: bool,
    pub completion: Option<String>,
    pub message: Option<String>,
}

impl QuizView {
    #[must_use]
    pub fn project(session: &Session<QuizItem>, message: Option<&str>) -> Self {
        let score = session.score();
        let status = session.status();
        let question = session.current().map(|item| QuestionView {
            number: session.cursor() + 1,
            total: session.len(),
            prompt: item.question().to_string(),
            options: item.options().to_vec(),
            answered: session.mark(session.cursor()),
        });
        let completion = (status == SessionStatus::Completed).then(|| {
            format!(
                "Quiz completed! Final score: {} / {}",
                score.correct,
                session.len()
            )
        });

        Self {
            language: session.language(),
            status,
            loading: session.is_loading(),
            show_previous: status == SessionStatus::InProgress && session.cursor() > 0,
            show_next: status == SessionStatus::InProgress,
            question,
            score,
            correct_label: format!("Correct: {}", score.correct),
            incorrect_label: format!("Incorrect: {}", score.incorrect),
            completion,
            message: message.map(str::to_string),
        }
    }
}

//
// ─── DRAG AND DROP ─────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardState {
    Idle,
    Matched,
    /// Wrong drop, shown until the flash expires.
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub label: String,
    pub state: CardState,
    pub draggable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragDropView {
    pub language: Language,
    pub status: SessionStatus,
    pub loading: bool,
    pub sources: Vec<CardView>,
    pub targets: Vec<CardView>,
    pub page_label: String,
    pub score: Score,
    pub correct_label: String,
    pub incorrect_label: String,
    pub show_previous: bool,
    pub show_next: bool,
    pub message: Option<String>,
}

impl DragDropView {
    #[must_use]
    pub fn project(
        session: &Session<WordPage>,
        board: Option<&DragBoard>,
        now: DateTime<Utc>,
        message: Option<&str>,
    ) -> Self {
        let score = session.score();
        let status = session.status();
        let in_progress = status == SessionStatus::InProgress;

        let (sources, targets) = match board.filter(|_| in_progress) {
            Some(board) => {
                let sources = board
                    .sources()
                    .iter()
                    .enumerate()
                    .map(|(slot, card)| CardView {
                        label: card.word.clone(),
                        state: card_state(card.matched, board.source_flashing(slot, now)),
                        draggable: !card.matched,
                    })
                    .collect();
                let targets = board
                    .targets()
                    .iter()
                    .enumerate()
                    .map(|(slot, card)| CardView {
                        label: card.label.clone(),
                        state: card_state(card.matched, board.target_flashing(slot, now)),
                        draggable: false,
                    })
                    .collect();
                (sources, targets)
            }
            None => (Vec::new(), Vec::new()),
        };

        let page_label = if in_progress {
            format!("Page {} of {}", session.cursor() + 1, session.len())
        } else {
            String::new()
        };

        Self {
            language: session.language(),
            status,
            loading: session.is_loading(),
            sources,
            targets,
            page_label,
            score,
            correct_label: format!("Correct answers: {}", score.correct),
            incorrect_label: format!("Incorrect answers: {}", score.incorrect),
            show_previous: in_progress && session.cursor() > 0,
            show_next: in_progress,
            message: message.map(str::to_string),
        }
    }
}

fn card_state(matched: bool, flashing: bool) -> CardState {
    if matched {
        CardState::Matched
    } else if flashing {
        CardState::Mismatch
    } else {
        CardState::Idle
    }
}

//
// ─── GUESS WORD ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessView {
    pub language: Language,
    pub status: SessionStatus,
    pub loading: bool,
    pub word_number: u32,
    pub mask: String,
    pub meaning: String,
    pub score_label: String,
    pub keys: Vec<String>,
    pub show_previous: bool,
    pub misses: u32,
    pub message: Option<String>,
}

impl GuessView {
    #[must_use]
    pub fn project(
        session: &Session<HiddenWord>,
        word_index: u32,
        keyboard: Option<&Keyboard>,
        misses: u32,
        message: Option<&str>,
    ) -> Self {
        let current = session.current();
        Self {
            language: session.language(),
            status: session.status(),
            loading: session.is_loading(),
            word_number: word_index.saturating_add(1),
            mask: current.map_or_else(|| EMPTY_MASK.to_string(), |w| w.mask().to_string()),
            meaning: current
                .map(|w| format!("Meaning: {}", w.meaning()))
                .unwrap_or_default(),
            score_label: format!("Score: {}", session.score().correct),
            keys: keyboard.map(|k| k.keys().to_vec()).unwrap_or_default(),
            show_previous: word_index > 0,
            misses,
            message: message.map(str::to_string),
        }
    }
}

//
// ─── FLASHCARDS ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardView {
    pub word: String,
    pub translation: String,
    pub flipped: bool,
    pub speech_locale: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardsView {
    pub language: Language,
    pub page: PageNumber,
    pub loading: bool,
    pub cards: Vec<FlashcardView>,
    pub empty_text: Option<&'static str>,
    pub show_previous: bool,
    pub message: Option<String>,
}

impl FlashcardsView {
    #[must_use]
    pub fn project(
        language: Language,
        page: PageNumber,
        loading: bool,
        cards: &[Flashcard],
        message: Option<&str>,
    ) -> Self {
        let cards: Vec<FlashcardView> = cards
            .iter()
            .map(|card| FlashcardView {
                word: card.pair().word().to_string(),
                translation: card.pair().translation_label().to_string(),
                flipped: card.is_flipped(),
                speech_locale: language.speech_locale(),
            })
            .collect();
        Self {
            language,
            page,
            loading,
            empty_text: (cards.is_empty() && !loading).then_some(NO_FLASHCARDS),
            cards,
            show_previous: !page.is_first(),
            message: message.map(str::to_string),
        }
    }
}

//
// ─── BINGO ─────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Open,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoCellView {
    pub word: String,
    pub state: CellState,
    pub correct_translation: Option<String>,
}

impl BingoCellView {
    fn project(cell: &BingoCell) -> Self {
        let state = match cell.verdict() {
            None => CellState::Open,
            Some(true) => CellState::Correct,
            Some(false) => CellState::Incorrect,
        };
        Self {
            word: cell.word().word().to_string(),
            state,
            correct_translation: cell.correct_translation().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoView {
    pub language: Language,
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub loading: bool,
    pub rows: Vec<Vec<BingoCellView>>,
    pub score_label: String,
    pub message: Option<String>,
}

impl BingoView {
    #[must_use]
    pub fn project(
        session: &Session<BingoGrid>,
        difficulty: Difficulty,
        points: u32,
        message: Option<&str>,
    ) -> Self {
        let rows: Vec<Vec<BingoCellView>> = session
            .current()
            .map(|grid| {
                grid.rows()
                    .map(|row| row.iter().map(BingoCellView::project).collect())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            language: session.language(),
            difficulty,
            status: session.status(),
            loading: session.is_loading(),
            rows,
            score_label: format!("Score: {points}"),
            message: message.map(str::to_string),
        }
    }
}

//
// ─── DICTIONARY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryView {
    pub language: Language,
    pub loading: bool,
    pub word: Option<String>,
    pub translation: Option<String>,
    pub error: Option<String>,
}

impl DictionaryView {
    #[must_use]
    pub fn project(
        language: Language,
        loading: bool,
        entry: Option<&DictionaryEntry>,
        message: Option<&str>,
    ) -> Self {
        Self {
            language,
            loading,
            word: entry.map(|e| e.word().to_string()),
            translation: entry.map(|e| e.translation_label().to_string()),
            error: message.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lingo_core::session::ResetPolicy;
    use lingo_core::time::fixed_now;

    fn quiz_session() -> Session<QuizItem> {
        let mut session = Session::new(Language::Fr);
        let ticket = session.begin_load(Language::Fr).unwrap();
        let item = QuizItem::new(
            "chat means?",
            vec!["cat".into(), "dog".into()],
            "cat",
            Language::Fr,
        )
        .unwrap();
        session.finish_load(ticket, Ok(vec![item]), ResetPolicy::Fresh, fixed_now());
        session
    }

    #[test]
    fn quiz_view_labels_and_completion() {
        let mut session = quiz_session();
        session.judge("cat", true).unwrap();

        let view = QuizView::project(&session, None);
        assert_eq!(view.correct_label, "Correct: 1");
        assert_eq!(view.incorrect_label, "Incorrect: 0");
        assert!(!view.show_previous);
        assert_eq!(view.question.as_ref().unwrap().answered, Some(true));

        session.advance(fixed_now()).unwrap();
        let view = QuizView::project(&session, None);
        assert!(view.question.is_none());
        assert_eq!(
            view.completion.as_deref(),
            Some("Quiz completed! Final score: 1 / 1")
        );
    }

    #[test]
    fn guess_view_defaults_before_start() {
        let session: Session<HiddenWord> = Session::new(Language::Es);
        let view = GuessView::project(&session, 0, None, 0, None);
        assert_eq!(view.mask, EMPTY_MASK);
        assert_eq!(view.score_label, "Score: 0");
        assert!(!view.show_previous);
    }

    #[test]
    fn bingo_view_lays_cells_out_in_rows() {
        use lingo_core::model::BingoWord;

        let words = (0..4)
            .map(|i| BingoWord::new(format!("id{i}"), format!("mot{i}")).unwrap())
            .collect();
        let mut grid = BingoGrid::square(words).unwrap();
        grid.record(3, false, "word3");

        let mut session = Session::new(Language::It);
        let ticket = session.begin_load(Language::It).unwrap();
        session.finish_load(ticket, Ok(vec![grid]), ResetPolicy::Fresh, fixed_now());

        let view = BingoView::project(&session, Difficulty::Hard, 20, None);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[1][1].state, CellState::Incorrect);
        assert_eq!(view.rows[1][1].correct_translation.as_deref(), Some("word3"));
        assert_eq!(view.rows[0][0].state, CellState::Open);
        assert_eq!(view.score_label, "Score: 20");
    }

    #[test]
    fn empty_flashcard_page_shows_placeholder() {
        let view = FlashcardsView::project(Language::Fr, PageNumber::FIRST, false, &[], None);
        assert_eq!(view.empty_text, Some(NO_FLASHCARDS));
        assert!(!view.show_previous);
    }
}
