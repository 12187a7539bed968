use party_types::GameType;
use rand::Rng;

use super::{MiniGame, pick};

pub const TOPICS: [&str; 10] = [
    "Titanic",
    "Star Wars",
    "treadmill",
    "sailing",
    "flying a drone",
    "sleeping in a hammock",
    "Superman",
    "cooking pasta",
    "riding a bicycle",
    "swimming",
];

/// One player silently acts out a topic; the group ends the round with an
/// advance once someone has shouted out the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charades {
    topic: &'static str,
}

impl Charades {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            topic: pick(rng, &TOPICS),
        }
    }

    pub fn topic(&self) -> &str {
        self.topic
    }
}

impl MiniGame for Charades {
    fn game_type(&self) -> GameType {
        GameType::Charades
    }

    fn instructions(&self) -> String {
        "One player will act out a topic without speaking. Guess it out loud!".to_string()
    }

    fn prompt(&self) -> String {
        "Guess what's being acted out!".to_string()
    }

    fn finishes_on_advance(&self) -> bool {
        true
    }

    fn wants_actor(&self) -> bool {
        true
    }

    fn secret(&self) -> Option<String> {
        Some(self.topic.to_string())
    }

    fn result(&self) -> String {
        format!("The topic was: {}", self.topic)
    }
}
