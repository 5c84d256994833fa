use thiserror::Error;

/// Why a content load did not produce a usable batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),

    #[error("content not found")]
    NotFound,

    #[error("no content available")]
    Empty,

    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl LoadError {
    /// Short text suitable for showing to the player.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Network(_) => "Error loading content. Please try again.".to_string(),
            LoadError::NotFound => "Nothing found for this selection.".to_string(),
            LoadError::Empty => "No content available.".to_string(),
            LoadError::Rejected { message, .. } => message.clone(),
        }
    }
}
