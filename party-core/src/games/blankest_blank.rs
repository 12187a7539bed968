use party_types::GameType;
use rand::Rng;

use super::{MiniGame, pick};

pub const ADJECTIVES: [&str; 10] = [
    "oldest",
    "biggest",
    "fanciest",
    "most bizarre",
    "smallest",
    "newest",
    "trendiest",
    "weirdest",
    "pinkest",
    "best",
];

pub const NOUNS: [&str; 7] = [
    "thing",
    "food",
    "kitchen utensil",
    "costume",
    "coin",
    "book",
    "hat",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankestBlank {
    adjective: &'static str,
    noun: &'static str,
}

impl BlankestBlank {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            adjective: pick(rng, &ADJECTIVES),
            noun: pick(rng, &NOUNS),
        }
    }

    fn target(&self) -> String {
        format!("{} {}", self.adjective, self.noun)
    }
}

impl MiniGame for BlankestBlank {
    fn game_type(&self) -> GameType {
        GameType::BlankestBlank
    }

    // The challenge itself makes a better headline than the game name
    fn title(&self) -> String {
        self.prompt()
    }

    fn instructions(&self) -> String {
        format!(
            "The person who finds the {} and shows it on screen wins",
            self.target()
        )
    }

    fn prompt(&self) -> String {
        format!("Find the {}!", self.target())
    }

    fn voting_prompt(&self) -> String {
        format!("Time's up! Vote for who showed the {}", self.target())
    }

    fn result(&self) -> String {
        format!("The hunt was for the {}.", self.target())
    }
}
