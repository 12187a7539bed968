use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

use crate::user::PlayerView;
use crate::PlayerId;

/// The seven mini-games a group cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum GameType {
    FirstToFind,
    BlankestBlank,
    MadLibs,
    YouLaughYouLose,
    Charades,
    Imitations,
    ClaudesGame,
}

impl GameType {
    pub const ALL: [GameType; 7] = [
        GameType::FirstToFind,
        GameType::BlankestBlank,
        GameType::MadLibs,
        GameType::YouLaughYouLose,
        GameType::Charades,
        GameType::Imitations,
        GameType::ClaudesGame,
    ];

    /// Wire identifier, identical to the serde representation.
    pub fn id(&self) -> &'static str {
        match self {
            GameType::FirstToFind => "firsttofind",
            GameType::BlankestBlank => "blankestblank",
            GameType::MadLibs => "madlibs",
            GameType::YouLaughYouLose => "youlaughyoulose",
            GameType::Charades => "charades",
            GameType::Imitations => "imitations",
            GameType::ClaudesGame => "claudesgame",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GameType::FirstToFind => "First to Find",
            GameType::BlankestBlank => "Find the Blankest Blank",
            GameType::MadLibs => "Mad Libs",
            GameType::YouLaughYouLose => "You Laugh You Lose",
            GameType::Charades => "Charades",
            GameType::Imitations => "Imitations",
            GameType::ClaudesGame => "Claude's Game",
        }
    }

    /// Rounds of these types have no machine-checkable answer: a timer runs
    /// out and the group votes for the winner.
    pub fn is_vote_judged(&self) -> bool {
        matches!(
            self,
            GameType::FirstToFind | GameType::BlankestBlank | GameType::YouLaughYouLose
        )
    }

    /// Games with an actor need someone left over to guess.
    pub fn min_players(&self) -> usize {
        match self {
            GameType::Charades | GameType::Imitations => 2,
            _ => 1,
        }
    }

    /// Title shown to the acting player in games with a secret prompt.
    pub fn actor_title(&self, secret: &str) -> Option<String> {
        match self {
            GameType::Charades => Some(format!("Act out: {}!", secret)),
            GameType::Imitations => Some(format!("Imitate {}!", secret)),
            _ => None,
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game type '{0}'")]
pub struct UnknownGameType(pub String);

impl FromStr for GameType {
    type Err = UnknownGameType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        GameType::ALL
            .into_iter()
            .find(|game_type| game_type.id() == wanted)
            .ok_or_else(|| UnknownGameType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum GameState {
    #[default]
    Lobby,
    Instructions,
    Playing,
    Voting,
    Finished,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Lobby => "lobby",
            GameState::Instructions => "instructions",
            GameState::Playing => "playing",
            GameState::Voting => "voting",
            GameState::Finished => "finished",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoteOption {
    pub index: u32,
    pub player_id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoteProgress {
    pub cast: u32,
    pub eligible: u32,
    pub voted_players: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WordProgress {
    pub collected: u32,
    pub total: u32,
    pub next_word_type: Option<String>,
}

/// Everything a client needs to render the current state of its group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionStateSnapshot {
    pub group: String,
    pub round: u64,
    pub game_type: Option<GameType>,
    pub game_state: GameState,
    pub game_title: String,
    pub game_instructions: String,
    pub round_instructions: String,
    pub players: Vec<PlayerView>,
    pub needs_input: bool,
    pub prompt: Option<String>,
    pub time_remaining: Option<u64>,
    pub vote_options: Vec<VoteOption>,
    pub vote_progress: Option<VoteProgress>,
    pub word_progress: Option<WordProgress>,
    pub result: Option<String>,
    pub winners: Vec<String>,
    pub youtube_video_id: Option<String>,
    pub actor: Option<PlayerId>,
    pub secret: Option<String>,
}

impl SessionStateSnapshot {
    /// Copy of the snapshot with the actor's secret removed.
    pub fn redacted(&self) -> Self {
        Self {
            secret: None,
            ..self.clone()
        }
    }

    /// Create the version of the snapshot a specific player should see.
    /// Only the actor keeps the secret; their title is replaced by it.
    pub fn personalized_for(&self, viewer: PlayerId) -> Self {
        let (Some(actor), Some(secret), Some(game_type)) =
            (self.actor, self.secret.as_deref(), self.game_type)
        else {
            return self.redacted();
        };

        if actor != viewer || self.game_state != GameState::Playing {
            return self.redacted();
        }

        let mut personal = self.clone();
        if let Some(title) = game_type.actor_title(secret) {
            personal.game_title = title;
        }
        personal.game_instructions = String::new();
        personal.round_instructions = String::new();
        personal.needs_input = false;
        personal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn playing_snapshot(actor: PlayerId) -> SessionStateSnapshot {
        SessionStateSnapshot {
            group: "den".to_string(),
            round: 1,
            game_type: Some(GameType::Charades),
            game_state: GameState::Playing,
            game_title: "Guess what's being acted out!".to_string(),
            game_instructions: "Enter your answer:".to_string(),
            round_instructions: String::new(),
            players: Vec::new(),
            needs_input: true,
            prompt: None,
            time_remaining: None,
            vote_options: Vec::new(),
            vote_progress: None,
            word_progress: None,
            result: None,
            winners: Vec::new(),
            youtube_video_id: None,
            actor: Some(actor),
            secret: Some("sailing".to_string()),
        }
    }

    #[test]
    fn test_game_type_ids_round_trip_through_from_str() {
        for game_type in GameType::ALL {
            assert_eq!(game_type.id().parse::<GameType>().unwrap(), game_type);
        }
        assert_eq!(" MadLibs ".parse::<GameType>().unwrap(), GameType::MadLibs);
        assert_eq!(
            "bingo".parse::<GameType>().unwrap_err().to_string(),
            "unknown game type 'bingo'"
        );
    }

    #[test]
    fn test_game_type_serializes_as_id() {
        let json = serde_json::to_string(&GameType::ClaudesGame).unwrap();
        assert_eq!(json, "\"claudesgame\"");
        let json = serde_json::to_string(&GameState::Voting).unwrap();
        assert_eq!(json, "\"voting\"");
    }

    #[test]
    fn test_only_actor_sees_secret() {
        let actor = Uuid::new_v4();
        let guesser = Uuid::new_v4();
        let snapshot = playing_snapshot(actor);

        let for_actor = snapshot.personalized_for(actor);
        assert_eq!(for_actor.game_title, "Act out: sailing!");
        assert_eq!(for_actor.secret.as_deref(), Some("sailing"));
        assert!(!for_actor.needs_input);

        let for_guesser = snapshot.personalized_for(guesser);
        assert_eq!(for_guesser.secret, None);
        assert_eq!(for_guesser.game_title, "Guess what's being acted out!");
        assert!(for_guesser.needs_input);
    }

    #[test]
    fn test_secret_is_stripped_outside_playing() {
        let actor = Uuid::new_v4();
        let mut snapshot = playing_snapshot(actor);
        snapshot.game_state = GameState::Finished;

        assert_eq!(snapshot.personalized_for(actor).secret, None);
    }
}
