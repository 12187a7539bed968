use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{PlayerId, SessionStateSnapshot};

/// Messages sent by browser clients, framed as `{"action": ..., "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "data", rename_all = "kebab-case")]
#[ts(export)]
pub enum ClientMessage {
    Join {
        #[serde(default)]
        name: String,
        group: String,
    },
    Advance,
    SubmitWord {
        #[serde(default)]
        text: String,
    },
    // Signed so that negative indices reach the session and are rejected there
    SubmitVote { target_index: i64 },
    Leave,
    Ping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "data", rename_all = "kebab-case")]
#[ts(export)]
pub enum ServerMessage {
    Joined { player_id: PlayerId, group: String },
    StateUpdate { state: SessionStateSnapshot },
    Left,
    Pong,
    Error { message: String },
}
