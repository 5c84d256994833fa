//! Per-page game controllers.
//!
//! Each controller owns one `Session` and splits every remote load into
//! `begin_*` (guard + ticket), `fetch` (the request, `&self` only) and
//! `complete_load` (apply or discard). The one-shot `start` and
//! `change_language` helpers chain the three; tests and async front ends can
//! interleave them to exercise stale responses.

mod bingo;
mod dragdrop;
mod guess;
mod quiz;

use tracing::{debug, info, warn};

use lingo_core::model::Language;
use lingo_core::session::{LoadOutcome, LoadTicket, Session};

use crate::auth::AuthGuard;
use crate::error::ControllerError;

pub use bingo::{BINGO_POINTS, BingoController, BingoFeedback, PendingGrid};
pub use dragdrop::{
    DragBoard, DragDropController, DropFeedback, MISMATCH_REVERT_MS, MismatchFlash, PageMatches,
    SourceCard, TargetCard, WORDS_PER_PAGE,
};
pub use guess::{GuessFeedback, GuessOutcome, GuessWordController, PendingWord};
pub use quiz::QuizController;

/// A load that has been granted a ticket but not yet applied.
#[derive(Clone)]
pub struct PendingLoad {
    ticket: LoadTicket,
    token: String,
}

impl PendingLoad {
    #[must_use]
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.ticket.language()
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// Check the token, then take a ticket. A language change supersedes any
/// outstanding load; anything else is refused while one is in flight.
async fn begin_load<I>(
    session: &mut Session<I>,
    auth: &AuthGuard,
    language: Language,
    supersede: bool,
) -> Result<PendingLoad, ControllerError> {
    let token = auth.require_token().await?;
    let ticket = if supersede {
        session.supersede_load(language)
    } else {
        session.begin_load(language)?
    };
    debug!(
        %language,
        generation = ticket.generation().value(),
        supersede,
        "load requested"
    );
    Ok(PendingLoad { ticket, token })
}

fn log_outcome(game: &'static str, ticket: LoadTicket, outcome: &LoadOutcome) {
    let language = ticket.language();
    let generation = ticket.generation().value();
    match outcome {
        LoadOutcome::Applied { items } => {
            info!(game, %language, generation, items, "content loaded");
        }
        LoadOutcome::Failed(err) => {
            warn!(game, %language, generation, error = %err, "content load failed");
        }
        LoadOutcome::Discarded => {
            debug!(game, %language, generation, "stale response discarded");
        }
    }
}
