use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub type PlayerId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// Identity handed out by the fronting auth proxy, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserInfo {
    pub authenticated: bool,
    pub name: Option<String>,
}

impl UserInfo {
    pub fn from_remote_user(header: Option<&str>) -> Self {
        let name = header
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Self {
            authenticated: name.is_some(),
            name,
        }
    }
}
