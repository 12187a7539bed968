//! The seven mini-games. Each round holds one `GameRound`; shared lifecycle
//! (phases, timers, voting, scores) lives in the session, the games only
//! supply prompts, judge input and describe their result.

mod blankest_blank;
mod charades;
mod claudes_game;
mod first_to_find;
mod imitations;
mod madlibs;
mod you_laugh_you_lose;

pub use blankest_blank::BlankestBlank;
pub use charades::Charades;
pub use claudes_game::ClaudesGame;
pub use first_to_find::FirstToFind;
pub use imitations::Imitations;
pub use madlibs::{MadLibs, Template, TemplateSegment};
pub use you_laugh_you_lose::YouLaughYouLose;

use party_types::{GameType, PlayerId, SessionStateSnapshot};
use rand::Rng;

use crate::{RoundSettings, SessionError};

/// Points a player earns for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Award {
    Nothing,
    Participation,
    Win,
}

impl Award {
    pub fn points(&self, settings: &RoundSettings) -> u32 {
        match self {
            Award::Nothing => 0,
            Award::Participation => settings.word_points,
            Award::Win => settings.win_points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Nothing visible changed (a wrong guess, a repeated answer).
    Ignored,
    Accepted { award: Award },
    /// The input ended the playing phase.
    Completed {
        award: Award,
        winner: Option<PlayerId>,
    },
}

pub trait MiniGame {
    fn game_type(&self) -> GameType;

    /// Headline shown while the group reads the instructions.
    fn title(&self) -> String {
        self.game_type().display_name().to_string()
    }

    fn instructions(&self) -> String;

    /// Prompt shown to everyone while playing.
    fn prompt(&self) -> String;

    fn needs_input(&self) -> bool {
        false
    }

    fn on_player_input(
        &mut self,
        _player: PlayerId,
        _input: &str,
    ) -> Result<InputOutcome, SessionError> {
        Err(SessionError::InputNotAccepted {
            game_type: self.game_type(),
        })
    }

    /// Players end the playing phase themselves with an advance.
    fn finishes_on_advance(&self) -> bool {
        false
    }

    /// One player is picked to perform the secret.
    fn wants_actor(&self) -> bool {
        false
    }

    fn secret(&self) -> Option<String> {
        None
    }

    fn voting_prompt(&self) -> String {
        "Vote for the winner!".to_string()
    }

    fn result(&self) -> String;

    /// Add game specific fields to a snapshot.
    fn annotate(&self, _snapshot: &mut SessionStateSnapshot) {}
}

/// Draw one entry from a fixed, non-empty pool.
pub(crate) fn pick<R: Rng>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool[rng.gen_range(0..pool.len())]
}

#[derive(Debug, Clone)]
pub enum GameRound {
    FirstToFind(FirstToFind),
    BlankestBlank(BlankestBlank),
    MadLibs(MadLibs),
    YouLaughYouLose(YouLaughYouLose),
    Charades(Charades),
    Imitations(Imitations),
    ClaudesGame(ClaudesGame),
}

impl GameRound {
    pub fn new<R: Rng>(game_type: GameType, rng: &mut R, settings: &RoundSettings) -> Self {
        match game_type {
            GameType::FirstToFind => GameRound::FirstToFind(FirstToFind::random(rng)),
            GameType::BlankestBlank => GameRound::BlankestBlank(BlankestBlank::random(rng)),
            GameType::MadLibs => {
                GameRound::MadLibs(MadLibs::random(rng, settings.madlibs_submission_cap))
            }
            GameType::YouLaughYouLose => {
                GameRound::YouLaughYouLose(YouLaughYouLose::random(rng))
            }
            GameType::Charades => GameRound::Charades(Charades::random(rng)),
            GameType::Imitations => GameRound::Imitations(Imitations::random(rng)),
            GameType::ClaudesGame => GameRound::ClaudesGame(ClaudesGame::random(rng)),
        }
    }

    pub fn as_game(&self) -> &dyn MiniGame {
        match self {
            GameRound::FirstToFind(game) => game,
            GameRound::BlankestBlank(game) => game,
            GameRound::MadLibs(game) => game,
            GameRound::YouLaughYouLose(game) => game,
            GameRound::Charades(game) => game,
            GameRound::Imitations(game) => game,
            GameRound::ClaudesGame(game) => game,
        }
    }

    pub fn as_game_mut(&mut self) -> &mut dyn MiniGame {
        match self {
            GameRound::FirstToFind(game) => game,
            GameRound::BlankestBlank(game) => game,
            GameRound::MadLibs(game) => game,
            GameRound::YouLaughYouLose(game) => game,
            GameRound::Charades(game) => game,
            GameRound::Imitations(game) => game,
            GameRound::ClaudesGame(game) => game,
        }
    }

    pub fn game_type(&self) -> GameType {
        self.as_game().game_type()
    }
}
