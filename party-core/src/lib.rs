pub mod error;
pub mod events;
pub mod games;
pub mod matching;
pub mod round;
pub mod session;
pub mod settings;
pub mod timer;
pub mod voting;

// Re-export main components
pub use error::*;
pub use events::*;
pub use games::{Award, GameRound, InputOutcome, MiniGame};
pub use round::*;
pub use session::*;
pub use settings::*;
pub use timer::*;
pub use voting::*;

pub use party_types::{GameState, GameType, PlayerId, SessionStateSnapshot};
