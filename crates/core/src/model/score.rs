use serde::{Deserialize, Serialize};

/// Running tally of judged answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub incorrect: u32,
}

impl Score {
    pub fn record(&mut self, is_correct: bool) {
        if is_correct {
            self.correct = self.correct.saturating_add(1);
        } else {
            self.incorrect = self.incorrect.saturating_add(1);
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }
}

/// Outcome of judging one response. Consumed right away to drive feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub item_index: usize,
    pub response: String,
    pub is_correct: bool,
    /// False when the item had already been scored and this response was ignored.
    pub counted: bool,
}
