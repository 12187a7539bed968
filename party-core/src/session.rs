use std::collections::VecDeque;
use std::time::Instant;

use party_types::{
    GameState, GameType, PlayerId, PlayerView, SessionStateSnapshot, VoteOption, VoteProgress,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use uuid::Uuid;

use crate::games::{Award, GameRound, InputOutcome};
use crate::{Action, Outcome, Round, RoundSettings, SessionError, SessionEvent};

/// Name given to players who join without one.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Free-text input beyond this many characters is cut off.
pub const MAX_INPUT_CHARS: usize = 280;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// Shared state of one named group: the roster, scores and the current
/// round. All mutation goes through `&mut self`, so callers serialize
/// access per group.
#[derive(Debug)]
pub struct GroupSession {
    name: String,
    players: Vec<Player>,
    round: Option<Round>,
    round_counter: u64,
    recent: VecDeque<GameType>,
    settings: RoundSettings,
    rng: StdRng,
}

impl GroupSession {
    pub fn new(name: impl Into<String>, settings: RoundSettings) -> Self {
        Self::with_rng(name, settings, StdRng::from_entropy())
    }

    /// Session with deterministic game, prompt and actor selection.
    pub fn with_seed(name: impl Into<String>, settings: RoundSettings, seed: u64) -> Self {
        Self::with_rng(name, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(name: impl Into<String>, settings: RoundSettings, rng: StdRng) -> Self {
        Self {
            name: name.into(),
            players: Vec::new(),
            round: None,
            round_counter: 0,
            recent: VecDeque::new(),
            settings,
            rng,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn round_id(&self) -> u64 {
        self.round_counter
    }

    pub fn state(&self) -> GameState {
        self.round
            .as_ref()
            .map(Round::phase)
            .unwrap_or(GameState::Lobby)
    }

    pub fn game_type(&self) -> Option<GameType> {
        self.round.as_ref().map(Round::game_type)
    }

    fn roster(&self) -> Vec<PlayerId> {
        self.players.iter().map(|player| player.id).collect()
    }

    fn ensure_member(&self, player_id: PlayerId) -> Result<(), SessionError> {
        if self.player(player_id).is_some() {
            Ok(())
        } else {
            Err(SessionError::PlayerNotFound(player_id))
        }
    }

    pub fn join(&mut self, name: &str) -> (PlayerId, Vec<SessionEvent>) {
        let name = match name.trim() {
            "" => DEFAULT_PLAYER_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };
        let player_id = Uuid::new_v4();

        info!("Player {} ({}) joined group {}", name, player_id, self.name);
        self.players.push(Player {
            id: player_id,
            name: name.clone(),
            score: 0,
        });

        (player_id, vec![SessionEvent::PlayerJoined { player_id, name }])
    }

    /// Remove a player. Their ballot is withdrawn, which may complete an
    /// open vote among the remaining players.
    pub fn leave(&mut self, player_id: PlayerId, now: Instant) -> Outcome {
        let mut events = self.poll_timers(now);
        let result = self.remove_player(player_id, &mut events);
        Outcome::new(events, result)
    }

    fn remove_player(
        &mut self,
        player_id: PlayerId,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        let index = self
            .players
            .iter()
            .position(|player| player.id == player_id)
            .ok_or(SessionError::PlayerNotFound(player_id))?;

        let player = self.players.remove(index);
        info!("Player {} ({}) left group {}", player.name, player_id, self.name);
        events.push(SessionEvent::PlayerLeft { player_id });

        let roster = self.roster();
        let Some(round) = self.round.as_mut() else {
            return Ok(());
        };

        round.ballot.withdraw(player_id);

        let actor_gone = round.actor == Some(player_id) || roster.len() < 2;
        if round.phase() == GameState::Playing && round.actor.is_some() && actor_gone {
            round.actor = draw_actor(&mut self.rng, &roster);
            debug!("Actor changed in group {}, now {:?}", self.name, round.actor);
        }

        if round.phase() == GameState::Voting && round.ballot.is_complete(&roster) {
            self.close_voting(events);
        }

        Ok(())
    }

    pub fn advance(&mut self, player_id: PlayerId, now: Instant) -> Outcome {
        let mut events = self.poll_timers(now);
        let result = self.apply_advance(player_id, now, &mut events);
        Outcome::new(events, result)
    }

    fn apply_advance(
        &mut self,
        player_id: PlayerId,
        now: Instant,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        self.ensure_member(player_id)?;

        match self.state() {
            GameState::Lobby | GameState::Finished => {
                self.start_round(events);
                Ok(())
            }
            GameState::Instructions => {
                self.start_playing(now, events);
                Ok(())
            }
            GameState::Playing
                if self
                    .round
                    .as_ref()
                    .is_some_and(|round| round.game().finishes_on_advance()) =>
            {
                self.finish_round(Vec::new(), events);
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                action: Action::Advance,
                state,
            }),
        }
    }

    pub fn submit_word(&mut self, player_id: PlayerId, text: &str, now: Instant) -> Outcome {
        let mut events = self.poll_timers(now);
        let result = self.apply_word(player_id, text, &mut events);
        Outcome::new(events, result)
    }

    fn apply_word(
        &mut self,
        player_id: PlayerId,
        text: &str,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        self.ensure_member(player_id)?;

        let state = self.state();
        let round = match self.round.as_mut() {
            Some(round) if state == GameState::Playing => round,
            _ => {
                return Err(SessionError::InvalidTransition {
                    action: Action::SubmitWord,
                    state,
                });
            }
        };

        // The actor already knows the answer
        if round.actor == Some(player_id) {
            return Err(SessionError::InputNotAccepted {
                game_type: round.game_type(),
            });
        }

        let text: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let round_id = round.id;
        let outcome = round.game.as_game_mut().on_player_input(player_id, &text)?;

        if let GameRound::Imitations(game) = &round.game {
            if let Some(guess) = game.winning_guess().filter(|guess| guess.player == player_id) {
                events.push(SessionEvent::GuessMatched {
                    round: round_id,
                    player_id,
                    identity: guess.identity.to_string(),
                });
            }
        }

        match outcome {
            InputOutcome::Ignored => {}
            InputOutcome::Accepted { award } => {
                events.push(SessionEvent::WordAccepted {
                    round: round_id,
                    player_id,
                });
                self.award(player_id, award, events);
            }
            InputOutcome::Completed { award, winner } => {
                if !matches!(round.game, GameRound::Imitations(_)) {
                    events.push(SessionEvent::WordAccepted {
                        round: round_id,
                        player_id,
                    });
                }
                self.award(player_id, award, events);
                self.finish_round(winner.into_iter().collect(), events);
            }
        }

        Ok(())
    }

    pub fn submit_vote(&mut self, player_id: PlayerId, target_index: i64, now: Instant) -> Outcome {
        let mut events = self.poll_timers(now);
        let result = self.apply_vote(player_id, target_index, &mut events);
        Outcome::new(events, result)
    }

    fn apply_vote(
        &mut self,
        player_id: PlayerId,
        target_index: i64,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        self.ensure_member(player_id)?;

        let state = self.state();
        let roster = self.roster();
        let round = match self.round.as_mut() {
            Some(round) if state == GameState::Voting => round,
            _ => {
                return Err(SessionError::InvalidTransition {
                    action: Action::SubmitVote,
                    state,
                });
            }
        };

        let target = round.ballot.cast(player_id, target_index, &roster)?;
        events.push(SessionEvent::VoteCast {
            round: round.id,
            voter: player_id,
            target,
        });

        if round.ballot.is_complete(&roster) {
            self.close_voting(events);
        }

        Ok(())
    }

    /// Apply every timer transition that is due at `now`. Safe to call any
    /// number of times: each deadline fires once.
    pub fn poll_timers(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        loop {
            let Some(round) = self.round.as_mut() else {
                break;
            };
            let phase = round.phase();
            let Some(expired_at) = round.fire_timer(now) else {
                break;
            };

            match phase {
                GameState::Playing => {
                    let round_id = round.id;
                    let deadline = round.open_voting(expired_at, self.settings.vote_duration);
                    info!("Round {} in group {} moved to voting", round_id, self.name);
                    events.push(SessionEvent::VotingOpened { round: round_id });
                    events.push(SessionEvent::TimerArmed {
                        round: round_id,
                        deadline,
                    });
                }
                GameState::Voting => {
                    debug!("Voting window closed in group {}", self.name);
                    self.close_voting(&mut events);
                }
                _ => break,
            }
        }

        events
    }

    /// Scheduled check for a deadline armed in `round_id`. A check for a
    /// round that has since been replaced does nothing.
    pub fn handle_timer(&mut self, round_id: u64, now: Instant) -> Vec<SessionEvent> {
        let current = self
            .round
            .as_ref()
            .is_some_and(|round| round.id == round_id && round.is_active());
        if !current {
            debug!("Ignoring stale timer for round {} in group {}", round_id, self.name);
            return Vec::new();
        }
        self.poll_timers(now)
    }

    fn award(&mut self, player_id: PlayerId, award: Award, events: &mut Vec<SessionEvent>) {
        let points = award.points(&self.settings);
        if points == 0 {
            return;
        }
        if let Some(player) = self.players.iter_mut().find(|player| player.id == player_id) {
            player.score += points;
            events.push(SessionEvent::PointsAwarded {
                player_id,
                points,
                total: player.score,
            });
        }
    }

    /// Random enabled game that suits the roster size and was not played
    /// in the last few rounds.
    fn select_game_type(&mut self) -> GameType {
        let roster_size = self.players.len();
        let mut pool: Vec<GameType> = self
            .settings
            .game_pool()
            .iter()
            .copied()
            .filter(|game_type| game_type.min_players() <= roster_size)
            .collect();
        if pool.is_empty() {
            pool = self.settings.game_pool().to_vec();
        }
        let mut window = self.settings.recent_window.min(self.recent.len());

        loop {
            let excluded: Vec<GameType> = self.recent.iter().rev().take(window).copied().collect();
            let candidates: Vec<GameType> = pool
                .iter()
                .copied()
                .filter(|game_type| !excluded.contains(game_type))
                .collect();

            if !candidates.is_empty() {
                return candidates[self.rng.gen_range(0..candidates.len())];
            }
            if window == 0 {
                // Only reachable with an empty pool
                return GameType::ALL[self.rng.gen_range(0..GameType::ALL.len())];
            }
            window -= 1;
        }
    }

    fn start_round(&mut self, events: &mut Vec<SessionEvent>) {
        let game_type = self.select_game_type();
        self.recent.push_back(game_type);
        while self.recent.len() > self.settings.recent_window.max(1) {
            self.recent.pop_front();
        }

        self.round_counter += 1;
        let game = GameRound::new(game_type, &mut self.rng, &self.settings);
        self.round = Some(Round::new(self.round_counter, game));

        info!(
            "Group {} starting round {} with {}",
            self.name, self.round_counter, game_type
        );
        events.push(SessionEvent::RoundStarted {
            round: self.round_counter,
            game_type,
        });
    }

    fn start_playing(&mut self, now: Instant, events: &mut Vec<SessionEvent>) {
        let roster = self.roster();
        let round_duration = self.settings.round_duration;
        let Some(round) = self.round.as_mut() else {
            return;
        };

        let actor = if round.game().wants_actor() {
            draw_actor(&mut self.rng, &roster)
        } else {
            None
        };

        let deadline = round.start_playing(now, round_duration, actor);
        events.push(SessionEvent::PlayingStarted {
            round: round.id,
            actor,
        });
        if let Some(deadline) = deadline {
            events.push(SessionEvent::TimerArmed {
                round: round.id,
                deadline,
            });
        }
    }

    fn close_voting(&mut self, events: &mut Vec<SessionEvent>) {
        let roster = self.roster();
        let Some(round) = self.round.as_ref() else {
            return;
        };

        let tally = round.ballot.tally(&roster);
        let winners: Vec<PlayerId> = tally.winner.into_iter().collect();
        for winner in &winners {
            self.award(*winner, Award::Win, events);
        }
        self.finish_round(winners, events);
    }

    fn finish_round(&mut self, winners: Vec<PlayerId>, events: &mut Vec<SessionEvent>) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        round.finish(winners.clone());
        info!(
            "Round {} ({}) finished in group {}",
            round.id,
            round.game_type(),
            self.name
        );
        events.push(SessionEvent::RoundFinished {
            round: round.id,
            winners,
        });
    }

    /// Shared view of the group. The actor's secret is included; callers
    /// personalise or redact it before sending.
    pub fn snapshot(&self, now: Instant) -> SessionStateSnapshot {
        let players: Vec<PlayerView> = self
            .players
            .iter()
            .map(|player| PlayerView {
                id: player.id,
                name: player.name.clone(),
                score: player.score,
            })
            .collect();

        let mut snapshot = SessionStateSnapshot {
            group: self.name.clone(),
            round: self.round_counter,
            players,
            ..SessionStateSnapshot::default()
        };

        let Some(round) = self.round.as_ref() else {
            self.describe_lobby(&mut snapshot);
            return snapshot;
        };

        let game = round.game();
        snapshot.game_type = Some(round.game_type());
        snapshot.game_state = round.phase();
        snapshot.time_remaining = round.time_remaining(now);

        match round.phase() {
            GameState::Lobby => self.describe_lobby(&mut snapshot),
            GameState::Instructions => {
                snapshot.game_title = game.title();
                snapshot.game_instructions = game.instructions();
                snapshot.round_instructions = if self.players.len() > 1 {
                    "Anyone can click 'Next' when everyone is ready".to_string()
                } else {
                    "Click 'Next' when ready to play".to_string()
                };
            }
            GameState::Playing => {
                let prompt = game.prompt();
                snapshot.game_title = prompt.clone();
                snapshot.needs_input = game.needs_input();
                snapshot.game_instructions = if game.needs_input() {
                    "Enter your answer:".to_string()
                } else {
                    game.instructions()
                };
                if game.finishes_on_advance() {
                    snapshot.round_instructions = "Click 'Next' when the round is over".to_string();
                }
                snapshot.prompt = Some(prompt);
                snapshot.actor = round.actor;
                if round.actor.is_some() {
                    snapshot.secret = game.secret();
                }
                game.annotate(&mut snapshot);
            }
            GameState::Voting => {
                let roster = self.roster();
                snapshot.game_title = "Time to Vote!".to_string();
                snapshot.game_instructions = game.voting_prompt();
                snapshot.round_instructions = "Vote for the winner!".to_string();
                snapshot.vote_options = self
                    .players
                    .iter()
                    .enumerate()
                    .map(|(index, player)| VoteOption {
                        index: index as u32,
                        player_id: player.id,
                        name: player.name.clone(),
                    })
                    .collect();
                snapshot.vote_progress = Some(VoteProgress {
                    cast: round.ballot.cast_count(&roster) as u32,
                    eligible: roster.len() as u32,
                    voted_players: round.ballot.voters(&roster),
                });
                game.annotate(&mut snapshot);
            }
            GameState::Finished => {
                let result = game.result();
                let winners: Vec<String> = round
                    .winners()
                    .iter()
                    .filter_map(|id| self.player(*id))
                    .map(|player| player.name.clone())
                    .collect();

                snapshot.game_title = "Game Complete!".to_string();
                snapshot.game_instructions =
                    format!("{} finished!", round.game_type().display_name());
                snapshot.round_instructions = match winners.as_slice() {
                    [] => result.clone(),
                    [winner] => format!("{} wins! {}", winner, result),
                    many => format!("Tie! {} win! {}", many.join(", "), result),
                };
                snapshot.result = Some(result);
                snapshot.winners = winners;
                game.annotate(&mut snapshot);
            }
        }

        snapshot
    }

    fn describe_lobby(&self, snapshot: &mut SessionStateSnapshot) {
        let (title, instructions, round_instructions) = match self.players.len() {
            0 => (
                "Waiting for players to join",
                "Wait for players to join",
                "Share this URL with friends to play together!",
            ),
            1 => (
                "Ready to play!",
                "Click 'Next' to start a game",
                "Most games work solo! Or share the URL to play with friends.",
            ),
            _ => (
                "Waiting for more players",
                "Wait for more players or click 'Next' to start",
                "Ready to play?",
            ),
        };
        snapshot.game_title = title.to_string();
        snapshot.game_instructions = instructions.to_string();
        snapshot.round_instructions = round_instructions.to_string();
    }
}

/// An actor needs someone to guess, so a lone player gets none and their
/// own guesses count.
fn draw_actor(rng: &mut StdRng, roster: &[PlayerId]) -> Option<PlayerId> {
    if roster.len() < 2 {
        return None;
    }
    Some(roster[rng.gen_range(0..roster.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session_with(games: &[GameType]) -> GroupSession {
        GroupSession::with_seed("den", RoundSettings::default().with_games(games), 17)
    }

    #[test]
    fn test_blank_name_falls_back() {
        let mut session = session_with(&[]);
        let (id, events) = session.join("   ");
        assert_eq!(session.player(id).unwrap().name, DEFAULT_PLAYER_NAME);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_lobby_texts_depend_on_roster_size() {
        let mut session = session_with(&[]);
        let now = Instant::now();
        assert_eq!(session.snapshot(now).game_title, "Waiting for players to join");

        session.join("Ada");
        assert_eq!(session.snapshot(now).game_title, "Ready to play!");

        session.join("Grace");
        let snapshot = session.snapshot(now);
        assert_eq!(snapshot.game_title, "Waiting for more players");
        assert_eq!(snapshot.game_state, GameState::Lobby);
        assert_eq!(snapshot.game_type, None);
    }

    #[test]
    fn test_vote_in_wrong_state_is_rejected_without_change() {
        let mut session = session_with(&[GameType::MadLibs]);
        let now = Instant::now();
        let (ada, _) = session.join("Ada");

        let outcome = session.submit_vote(ada, 0, now);
        assert!(!outcome.changed());
        assert_eq!(
            outcome.rejection,
            Some(SessionError::InvalidTransition {
                action: Action::SubmitVote,
                state: GameState::Lobby
            })
        );
        assert_eq!(session.state(), GameState::Lobby);
    }

    #[test]
    fn test_recent_games_are_not_repeated() {
        let mut session = session_with(&[
            GameType::MadLibs,
            GameType::Charades,
            GameType::ClaudesGame,
        ]);
        session.join("Ada");
        session.join("Grace");
        let mut history = Vec::new();
        for _ in 0..30 {
            let mut events = Vec::new();
            session.start_round(&mut events);
            history.push(session.game_type().unwrap());
        }

        for window in history.windows(3) {
            assert_ne!(window[0], window[1]);
            assert_ne!(window[0], window[2]);
            assert_ne!(window[1], window[2]);
        }
    }

    #[test]
    fn test_solo_player_gets_no_acted_games() {
        let mut session = session_with(&[
            GameType::Charades,
            GameType::Imitations,
            GameType::MadLibs,
        ]);
        session.join("Ada");
        for _ in 0..10 {
            let mut events = Vec::new();
            session.start_round(&mut events);
            assert_eq!(session.game_type(), Some(GameType::MadLibs));
        }

        session.join("Grace");
        let mut seen = Vec::new();
        for _ in 0..10 {
            let mut events = Vec::new();
            session.start_round(&mut events);
            seen.extend(session.game_type());
        }
        assert!(seen.contains(&GameType::Charades));
        assert!(seen.contains(&GameType::Imitations));
    }

    #[test]
    fn test_single_game_pool_still_selects() {
        let mut session = session_with(&[GameType::Imitations]);
        for _ in 0..5 {
            let mut events = Vec::new();
            session.start_round(&mut events);
            assert_eq!(session.game_type(), Some(GameType::Imitations));
        }
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut session = session_with(&[GameType::FirstToFind]);
        let start = Instant::now();
        let (ada, _) = session.join("Ada");

        session.advance(ada, start);
        session.advance(ada, start);
        let stale_round = session.round_id();

        // Time out playing and voting, then start the next round
        let later = start + Duration::from_secs(61);
        assert!(!session.handle_timer(stale_round, later).is_empty());
        assert_eq!(session.state(), GameState::Finished);
        session.advance(ada, later);

        assert!(session.handle_timer(stale_round, later + Duration::from_secs(60)).is_empty());
        assert_eq!(session.state(), GameState::Instructions);
    }
}
