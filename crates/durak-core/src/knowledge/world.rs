use crate::model::player::PlayerPosition;
use core::fmt;

/// One hypothesis about where a card currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum World {
    /// Hidden in this player's hand.
    Holder(PlayerPosition),
    /// In no hand: face down in the stock, face up on the table, in the
    /// discard pile, or fixed under the stock as the trump indicator.
    Absent,
}

impl World {
    pub const ALL: [World; 5] = [
        World::Holder(PlayerPosition::North),
        World::Holder(PlayerPosition::East),
        World::Holder(PlayerPosition::South),
        World::Holder(PlayerPosition::West),
        World::Absent,
    ];

    pub const fn holder(self) -> Option<PlayerPosition> {
        match self {
            World::Holder(seat) => Some(seat),
            World::Absent => None,
        }
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            World::Holder(seat) => write!(f, "held by {seat}"),
            World::Absent => f.write_str("in no hand"),
        }
    }
}
