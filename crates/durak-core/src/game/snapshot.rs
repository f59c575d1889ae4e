use super::session::GameSession;
use crate::model::player::PlayerPosition;
use serde::{Deserialize, Serialize};
use std::array;

/// Serializable summary of a session: enough to log a game and to replay its
/// deal from the seed. Bout progress is not captured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub seed: u64,
    pub bouts_completed: u32,
    pub attacker: PlayerPosition,
    pub defender: PlayerPosition,
    pub trump: String,
    pub hand_sizes: [usize; 4],
    pub stock_size: usize,
    pub discard_size: usize,
}

impl GameSnapshot {
    pub fn capture(session: &GameSession) -> Self {
        let hand_sizes = array::from_fn(|index| {
            let seat = PlayerPosition::from_index(index).expect("seat index in range");
            session.hand(seat).len()
        });
        GameSnapshot {
            seed: session.seed(),
            bouts_completed: session.bouts_completed(),
            attacker: session.attacker(),
            defender: session.defender(),
            trump: session.trump().to_string(),
            hand_sizes,
            stock_size: session.stock_size(),
            discard_size: session.discard_size(),
        }
    }

    /// Rebuilds the deal this snapshot came from. Only the deal: bouts
    /// played since are not replayed.
    pub fn replay_deal(&self) -> GameSession {
        GameSession::with_seed(self.seed)
    }

    pub fn to_json(session: &GameSession) -> serde_json::Result<String> {
        let snapshot = Self::capture(session);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
