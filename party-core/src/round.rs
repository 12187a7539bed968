use std::time::{Duration, Instant};

use party_types::{GameState, GameType, PlayerId};

use crate::games::{GameRound, MiniGame};
use crate::{Ballot, Countdown};

/// One play of a single mini-game, from instructions to finished.
#[derive(Debug, Clone)]
pub struct Round {
    pub id: u64,
    pub game: GameRound,
    phase: GameState,
    timer: Option<Countdown>,
    pub ballot: Ballot,
    pub actor: Option<PlayerId>,
    winners: Vec<PlayerId>,
}

impl Round {
    pub fn new(id: u64, game: GameRound) -> Self {
        Self {
            id,
            game,
            phase: GameState::Instructions,
            timer: None,
            ballot: Ballot::new(),
            actor: None,
            winners: Vec::new(),
        }
    }

    pub fn game_type(&self) -> GameType {
        self.game.game_type()
    }

    pub fn game(&self) -> &dyn MiniGame {
        self.game.as_game()
    }

    pub fn phase(&self) -> GameState {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != GameState::Finished
    }

    pub fn winners(&self) -> &[PlayerId] {
        &self.winners
    }

    /// Vote-judged games run against the clock while playing.
    pub fn is_timed(&self) -> bool {
        self.game_type().is_vote_judged()
    }

    /// Move into the playing phase. Returns the deadline when the round is
    /// timed.
    pub fn start_playing(
        &mut self,
        now: Instant,
        round_duration: Duration,
        actor: Option<PlayerId>,
    ) -> Option<Instant> {
        self.phase = GameState::Playing;
        self.actor = actor;
        if self.is_timed() {
            let countdown = Countdown::start(now, round_duration);
            let deadline = countdown.deadline();
            self.timer = Some(countdown);
            Some(deadline)
        } else {
            self.timer = None;
            None
        }
    }

    /// Move into voting. The voting window is measured from `from`, the
    /// moment playing ended, not from when the expiry was noticed.
    pub fn open_voting(&mut self, from: Instant, vote_duration: Duration) -> Instant {
        let countdown = Countdown::start(from, vote_duration);
        let deadline = countdown.deadline();
        self.phase = GameState::Voting;
        self.timer = Some(countdown);
        self.ballot = Ballot::new();
        deadline
    }

    pub fn finish(&mut self, winners: Vec<PlayerId>) {
        self.phase = GameState::Finished;
        self.timer = None;
        self.actor = None;
        self.winners = winners;
    }

    /// Fires the current phase's timer if its deadline has passed. Returns
    /// the deadline that fired, at most once per timer.
    pub fn fire_timer(&mut self, now: Instant) -> Option<Instant> {
        let timer = self.timer.as_mut()?;
        if timer.fire(now) {
            Some(timer.deadline())
        } else {
            None
        }
    }

    pub fn time_remaining(&self, now: Instant) -> Option<u64> {
        match self.phase {
            GameState::Playing | GameState::Voting => {
                self.timer.as_ref().map(|timer| timer.remaining_secs(now))
            }
            _ => None,
        }
    }
}
