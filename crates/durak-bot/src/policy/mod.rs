mod heuristic;
mod scripted;

pub use heuristic::HeuristicPolicy;
pub use scripted::ScriptedPolicy;

use durak_core::knowledge::KnowledgeStore;
use durak_core::model::bout::Bout;
use durak_core::model::card::Card;
use durak_core::model::hand::Hand;
use durak_core::model::player::PlayerPosition;

/// Read-only view handed to policies for one decision. The knowledge store
/// is shared and never writable from here; the session updates it between
/// decisions.
pub struct PolicyContext<'a> {
    pub seat: PlayerPosition,
    pub hand: &'a Hand,
    pub bout: &'a Bout,
    pub attacker: PlayerPosition,
    pub defender: PlayerPosition,
    pub knowledge: &'a KnowledgeStore,
    pub trump: Card,
    pub defender_cards: usize,
    pub stock_size: usize,
    pub discard_size: usize,
}

/// Unified interface for deciding plays, polymorphic over heuristic bots and
/// scripted test doubles.
pub trait Policy: Send {
    /// Choose the next attacking card, or withdraw (`None`) to end the bout.
    fn choose_attack(&mut self, ctx: &PolicyContext) -> Option<Card>;

    /// Choose a card covering `attack`, or give up (`None`) and take the
    /// table.
    fn choose_defense(&mut self, ctx: &PolicyContext, attack: Card) -> Option<Card>;
}
