mod difficulty;
mod ids;
mod item;
mod language;
mod load;
mod prefs;
mod score;

pub use difficulty::{Difficulty, DifficultyError};
pub use ids::{Generation, PageNumber, WordIndex};
pub use item::{
    BingoCell, BingoGrid, BingoWord, DEFAULT_TRANSLATION_LABEL, HiddenWord, ItemError, Keyboard,
    MaskedWord, QuizItem, WordPage, WordPair,
};
pub use language::{Language, LanguageError};
pub use load::LoadError;
pub use prefs::{AuthIdentity, DEFAULT_ROLE, Theme};
pub use score::{Attempt, Score};
