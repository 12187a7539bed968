use std::time::Instant;

use party_types::{GameType, PlayerId};

use crate::SessionError;

/// Something that changed inside a group session. Any event means the
/// group's snapshot is stale and must be re-broadcast.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PlayerJoined {
        player_id: PlayerId,
        name: String,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    RoundStarted {
        round: u64,
        game_type: GameType,
    },
    PlayingStarted {
        round: u64,
        actor: Option<PlayerId>,
    },
    /// A deadline the server must schedule a check for.
    TimerArmed {
        round: u64,
        deadline: Instant,
    },
    VotingOpened {
        round: u64,
    },
    WordAccepted {
        round: u64,
        player_id: PlayerId,
    },
    GuessMatched {
        round: u64,
        player_id: PlayerId,
        identity: String,
    },
    VoteCast {
        round: u64,
        voter: PlayerId,
        target: PlayerId,
    },
    PointsAwarded {
        player_id: PlayerId,
        points: u32,
        total: u32,
    },
    RoundFinished {
        round: u64,
        winners: Vec<PlayerId>,
    },
}

impl SessionEvent {
    pub fn round(&self) -> Option<u64> {
        match self {
            SessionEvent::RoundStarted { round, .. }
            | SessionEvent::PlayingStarted { round, .. }
            | SessionEvent::TimerArmed { round, .. }
            | SessionEvent::VotingOpened { round }
            | SessionEvent::WordAccepted { round, .. }
            | SessionEvent::GuessMatched { round, .. }
            | SessionEvent::VoteCast { round, .. }
            | SessionEvent::RoundFinished { round, .. } => Some(*round),
            SessionEvent::PlayerJoined { .. }
            | SessionEvent::PlayerLeft { .. }
            | SessionEvent::PointsAwarded { .. } => None,
        }
    }
}

/// Result of applying one action to a session.
///
/// Timer expiries noticed while handling the action are reported in `events`
/// even when the action itself is rejected.
#[derive(Debug, Default)]
pub struct Outcome {
    pub events: Vec<SessionEvent>,
    pub rejection: Option<SessionError>,
}

impl Outcome {
    pub fn new(events: Vec<SessionEvent>, result: Result<(), SessionError>) -> Self {
        Self {
            events,
            rejection: result.err(),
        }
    }

    pub fn changed(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }

    pub fn deadlines(&self) -> impl Iterator<Item = (u64, Instant)> + '_ {
        self.events.iter().filter_map(|event| match event {
            SessionEvent::TimerArmed { round, deadline } => Some((*round, *deadline)),
            _ => None,
        })
    }

    pub fn into_result(self) -> Result<Vec<SessionEvent>, SessionError> {
        match self.rejection {
            Some(err) => Err(err),
            None => Ok(self.events),
        }
    }
}
