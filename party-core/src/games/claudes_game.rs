use party_types::{GameType, PlayerId};
use rand::Rng;

use super::{Award, InputOutcome, MiniGame};
use crate::SessionError;

pub const WORDS: [&str; 10] = [
    "banana",
    "spaceship",
    "umbrella",
    "dinosaur",
    "piano",
    "volcano",
    "penguin",
    "telescope",
    "sandcastle",
    "lightning",
];

/// Players invent a link between two unrelated words. Nothing is scored;
/// the group reads the answers and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudesGame {
    words: (&'static str, &'static str),
    answers: Vec<(PlayerId, String)>,
}

impl ClaudesGame {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let first = rng.gen_range(0..WORDS.len());
        let mut second = rng.gen_range(0..WORDS.len() - 1);
        if second >= first {
            second += 1;
        }
        Self::with_words(WORDS[first], WORDS[second])
    }

    pub fn with_words(first: &'static str, second: &'static str) -> Self {
        Self {
            words: (first, second),
            answers: Vec::new(),
        }
    }

    pub fn words(&self) -> (&str, &str) {
        self.words
    }

    pub fn answers(&self) -> &[(PlayerId, String)] {
        &self.answers
    }
}

impl MiniGame for ClaudesGame {
    fn game_type(&self) -> GameType {
        GameType::ClaudesGame
    }

    fn instructions(&self) -> String {
        "Connect two words creatively!".to_string()
    }

    fn prompt(&self) -> String {
        format!("How are {} and {} connected?", self.words.0, self.words.1)
    }

    fn needs_input(&self) -> bool {
        true
    }

    fn on_player_input(
        &mut self,
        player: PlayerId,
        input: &str,
    ) -> Result<InputOutcome, SessionError> {
        if self.answers.iter().any(|(author, _)| *author == player) {
            return Ok(InputOutcome::Ignored);
        }
        self.answers.push((player, input.to_string()));
        Ok(InputOutcome::Accepted {
            award: Award::Nothing,
        })
    }

    fn finishes_on_advance(&self) -> bool {
        true
    }

    fn result(&self) -> String {
        let mut result = format!(
            "Connections between {} and {}:",
            self.words.0, self.words.1
        );
        if self.answers.is_empty() {
            result.push_str("\n(no answers)");
        }
        for (_, answer) in &self.answers {
            result.push_str("\n- ");
            result.push_str(answer);
        }
        result
    }
}
