use std::fmt;

use party_types::{GameState, GameType, PlayerId};
use thiserror::Error;

/// Player actions a session can refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Advance,
    SubmitWord,
    SubmitVote,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Action::Advance => "advance",
            Action::SubmitWord => "submit a word",
            Action::SubmitVote => "vote",
        };
        f.write_str(verb)
    }
}

/// Reasons an action left the session untouched. None of them are fatal:
/// the server logs them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while the group is in {state}")]
    InvalidTransition { action: Action, state: GameState },

    #[error("vote target {index} is not a player in this group")]
    InvalidTarget { index: i64 },

    #[error("player {0} is not in this group")]
    PlayerNotFound(PlayerId),

    #[error("{game_type} does not accept that input")]
    InputNotAccepted { game_type: GameType },

    #[error("{game_type} has reached its limit of {limit} submissions")]
    CapacityReached { game_type: GameType, limit: usize },
}
