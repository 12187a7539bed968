use std::time::Duration;

use party_types::GameType;

pub const DEFAULT_ROUND_SECONDS: u64 = 30;
pub const DEFAULT_VOTE_SECONDS: u64 = 30;
pub const DEFAULT_WIN_POINTS: u32 = 3;
pub const DEFAULT_WORD_POINTS: u32 = 1;
pub const DEFAULT_MADLIBS_SUBMISSION_CAP: usize = 20;
pub const DEFAULT_RECENT_GAME_WINDOW: usize = 2;

/// Tunables shared by every round of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSettings {
    /// Length of the playing phase for timed games.
    pub round_duration: Duration,
    pub vote_duration: Duration,
    /// Points for winning a vote or guessing an imitation.
    pub win_points: u32,
    /// Points for each accepted Mad Libs word.
    pub word_points: u32,
    pub madlibs_submission_cap: usize,
    /// How many of the most recent game types are excluded from selection.
    pub recent_window: usize,
    pub enabled_games: Vec<GameType>,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(DEFAULT_ROUND_SECONDS),
            vote_duration: Duration::from_secs(DEFAULT_VOTE_SECONDS),
            win_points: DEFAULT_WIN_POINTS,
            word_points: DEFAULT_WORD_POINTS,
            madlibs_submission_cap: DEFAULT_MADLIBS_SUBMISSION_CAP,
            recent_window: DEFAULT_RECENT_GAME_WINDOW,
            enabled_games: GameType::ALL.to_vec(),
        }
    }
}

impl RoundSettings {
    /// Restrict selection to the given games. An empty list means all games.
    pub fn with_games(mut self, games: &[GameType]) -> Self {
        self.enabled_games = if games.is_empty() {
            GameType::ALL.to_vec()
        } else {
            games.to_vec()
        };
        self
    }

    pub(crate) fn game_pool(&self) -> &[GameType] {
        if self.enabled_games.is_empty() {
            &GameType::ALL[..]
        } else {
            self.enabled_games.as_slice()
        }
    }
}
