use party_types::{GameType, SessionStateSnapshot};
use rand::Rng;

use super::{MiniGame, pick};

/// Opaque video references resolved by the client's embed player.
pub const VIDEO_IDS: [&str; 8] = [
    "XCPj4JPbKtA",
    "nFAK8Vj62WM",
    "0H25ve3qts4",
    "Q9zvgcOrTtw",
    "Veg63B8ofnQ",
    "tjiouAv0-Gk",
    "oaTxUeZWC4M",
    "BKInDainD5M",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YouLaughYouLose {
    video_id: &'static str,
}

impl YouLaughYouLose {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            video_id: pick(rng, &VIDEO_IDS),
        }
    }

    pub fn video_id(&self) -> &str {
        self.video_id
    }
}

impl MiniGame for YouLaughYouLose {
    fn game_type(&self) -> GameType {
        GameType::YouLaughYouLose
    }

    fn instructions(&self) -> String {
        "Last person to keep a straight face wins!".to_string()
    }

    fn prompt(&self) -> String {
        "Watch and don't laugh!".to_string()
    }

    fn voting_prompt(&self) -> String {
        "Vote for the person who didn't laugh!".to_string()
    }

    fn result(&self) -> String {
        "Who kept the straightest face?".to_string()
    }

    fn annotate(&self, snapshot: &mut SessionStateSnapshot) {
        snapshot.youtube_video_id = Some(self.video_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_video_ids_look_like_references() {
        for id in VIDEO_IDS {
            assert!(id.len() > 5);
        }

        let mut rng = StdRng::seed_from_u64(9);
        let game = YouLaughYouLose::random(&mut rng);
        assert!(VIDEO_IDS.contains(&game.video_id()));
        assert!(game.instructions().contains("straight face"));
    }
}
