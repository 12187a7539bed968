use party_types::GameType;
use rand::Rng;

use super::{MiniGame, pick};

pub const ITEMS: [&str; 7] = [
    "banana",
    "working electrical device over 50 years old",
    "blade of grass",
    "pen",
    "musical instrument",
    "ice cube",
    "compact disc",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstToFind {
    item: &'static str,
}

impl FirstToFind {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            item: pick(rng, &ITEMS),
        }
    }

    pub fn item(&self) -> &str {
        self.item
    }
}

impl MiniGame for FirstToFind {
    fn game_type(&self) -> GameType {
        GameType::FirstToFind
    }

    fn instructions(&self) -> String {
        "The first person to find the object and show it on screen wins".to_string()
    }

    fn prompt(&self) -> String {
        format!("First to show a {} wins!", self.item)
    }

    fn voting_prompt(&self) -> String {
        format!("Time's up! Vote for who showed a {} first", self.item)
    }

    fn result(&self) -> String {
        format!("Everyone was hunting for a {}.", self.item)
    }
}
