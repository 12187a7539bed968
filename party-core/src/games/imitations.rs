use party_types::{GameType, PlayerId};
use rand::Rng;
use tracing::debug;

use super::{Award, InputOutcome, MiniGame, pick};
use crate::SessionError;
use crate::matching::find_match;

pub const PERSONAS: [&str; 6] = [
    "George Washington",
    "Clint Eastwood",
    "Captain Kirk",
    "Barack Obama",
    "Morgan Freeman",
    "Donald Duck",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub player: PlayerId,
    pub identity: &'static str,
}

/// The actor imitates a persona; the first typed guess naming any persona
/// on the roster wins the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imitations {
    persona: &'static str,
    guessed: Option<Guess>,
}

impl Imitations {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::with_persona(pick(rng, &PERSONAS))
    }

    pub fn with_persona(persona: &'static str) -> Self {
        Self {
            persona,
            guessed: None,
        }
    }

    pub fn persona(&self) -> &str {
        self.persona
    }

    pub fn winning_guess(&self) -> Option<&Guess> {
        self.guessed.as_ref()
    }
}

impl MiniGame for Imitations {
    fn game_type(&self) -> GameType {
        GameType::Imitations
    }

    fn instructions(&self) -> String {
        "Imitate the person without saying their name!".to_string()
    }

    fn prompt(&self) -> String {
        "Guess who's being imitated!".to_string()
    }

    fn needs_input(&self) -> bool {
        true
    }

    fn on_player_input(
        &mut self,
        player: PlayerId,
        input: &str,
    ) -> Result<InputOutcome, SessionError> {
        if self.guessed.is_some() {
            return Err(SessionError::InputNotAccepted {
                game_type: GameType::Imitations,
            });
        }

        match find_match(input, &PERSONAS) {
            Some(identity) => {
                debug!("Guess '{}' matched {}", input, identity);
                self.guessed = Some(Guess { player, identity });
                Ok(InputOutcome::Completed {
                    award: Award::Win,
                    winner: Some(player),
                })
            }
            None => Ok(InputOutcome::Ignored),
        }
    }

    fn wants_actor(&self) -> bool {
        true
    }

    fn secret(&self) -> Option<String> {
        Some(self.persona.to_string())
    }

    fn result(&self) -> String {
        match &self.guessed {
            Some(guess) if guess.identity != self.persona => format!(
                "The person was: {} (guessed {})",
                self.persona, guess.identity
            ),
            _ => format!("The person was: {}", self.persona),
        }
    }
}
