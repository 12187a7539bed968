#![allow(dead_code)]

use party_core::games::{GameRound, MadLibs};
use party_core::{GameState, GameType, GroupSession, PlayerId, RoundSettings};
use std::time::{Duration, Instant};

pub const ROUND: Duration = Duration::from_secs(30);

/// Creates a seeded session that only ever picks `game_type`
pub fn create_session(game_type: GameType) -> GroupSession {
    GroupSession::with_seed(
        "test-group",
        RoundSettings::default().with_games(&[game_type]),
        2024,
    )
}

/// Creates a session over every game type
pub fn create_open_session(seed: u64) -> GroupSession {
    GroupSession::with_seed("test-group", RoundSettings::default(), seed)
}

/// Joins `names` in order and returns their ids
pub fn join_players(session: &mut GroupSession, names: &[&str]) -> Vec<PlayerId> {
    names.iter().map(|name| session.join(name).0).collect()
}

/// Advances from the lobby through instructions into playing
pub fn start_playing(session: &mut GroupSession, player: PlayerId, now: Instant) {
    session.advance(player, now).into_result().expect("lobby advance");
    assert_eq!(session.state(), GameState::Instructions);
    session.advance(player, now).into_result().expect("instructions advance");
    assert_eq!(session.state(), GameState::Playing);
}

/// Plays a timed round until voting opens
pub fn start_voting(session: &mut GroupSession, player: PlayerId, now: Instant) -> Instant {
    start_playing(session, player, now);
    let expired = now + ROUND;
    session.poll_timers(expired);
    assert_eq!(session.state(), GameState::Voting);
    expired
}

pub fn madlibs(session: &GroupSession) -> &MadLibs {
    match session.round().map(|round| &round.game) {
        Some(GameRound::MadLibs(game)) => game,
        other => panic!("expected a Mad Libs round, got {:?}", other),
    }
}

pub fn score_of(session: &GroupSession, player: PlayerId) -> u32 {
    session.player(player).map(|player| player.score).unwrap_or(0)
}

/// Feeds answers until a round that waits on typed input is over
pub fn play_out_answers(session: &mut GroupSession, players: &[PlayerId], now: Instant) {
    for _ in 0..40 {
        let waiting = session.state() == GameState::Playing
            && matches!(
                session.game_type(),
                Some(GameType::MadLibs) | Some(GameType::Imitations)
            );
        if !waiting {
            return;
        }
        for player in players {
            let _ = session.submit_word(*player, "Barack Obama", now);
        }
    }
}
