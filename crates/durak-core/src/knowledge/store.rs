use super::frame::{KripkeFrame, Relation};
use super::world::World;
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::PlayerPosition;
use core::fmt;
use std::collections::{BTreeSet, HashMap};

/// Session-scoped map from card identity to its epistemic frame.
///
/// The game session owns the store and is the only writer; players consume
/// it read-only through the query methods. Its lifetime matches one game:
/// built at the deal, revised on every public event, cleared at teardown.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    frames: HashMap<Card, KripkeFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeError {
    UninitializedCard(Card),
    AlreadyInitialized,
}

impl fmt::Display for KnowledgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnowledgeError::UninitializedCard(card) => {
                write!(f, "no epistemic frame exists for {card}")
            }
            KnowledgeError::AlreadyInitialized => {
                write!(f, "frames already exist; the store tracks one deal at a time")
            }
        }
    }
}

impl std::error::Error for KnowledgeError {}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self {
            frames: HashMap::new(),
        }
    }

    /// Builds one frame per card from the deal. The trump indicator is
    /// public from the start; every other card begins at total ignorance,
    /// anchored at its true location (a hand, or the stock).
    pub fn initialize_all(
        &mut self,
        cards: &[Card],
        indicator: Card,
        hands: &[Hand; 4],
    ) -> Result<(), KnowledgeError> {
        if !self.frames.is_empty() {
            return Err(KnowledgeError::AlreadyInitialized);
        }
        for &card in cards {
            let frame = if card == indicator {
                KripkeFrame::public()
            } else {
                KripkeFrame::total_ignorance(location_at_deal(card, hands))
            };
            self.frames.insert(card, frame);
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Every card the store tracks.
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.frames.keys().copied()
    }

    pub fn frame(&self, card: Card) -> Option<&KripkeFrame> {
        self.frames.get(&card)
    }

    /// Reveal entry point: `card` just moved from `revealing_player`'s hand
    /// to the table, face up. Every other seat rules out the hands it can no
    /// longer be hidden in; the revealer held the card and needs no update.
    /// Replaying the same reveal is a no-op.
    pub fn on_card_revealed(
        &mut self,
        card: Card,
        revealing_player: PlayerPosition,
    ) -> Result<(), KnowledgeError> {
        let frame = self
            .frames
            .get_mut(&card)
            .ok_or(KnowledgeError::UninitializedCard(card))?;
        frame.relocate(World::Absent);
        for seat in PlayerPosition::LOOP {
            if seat != revealing_player {
                frame.reveal_to(seat);
            }
        }
        Ok(())
    }

    /// A failed defender picks `card` up from the table in full view: its
    /// new location is public, and every other seat's relation shrinks to
    /// match. The taker sees their own hand and needs no update.
    pub fn on_card_taken(
        &mut self,
        card: Card,
        taker: PlayerPosition,
    ) -> Result<(), KnowledgeError> {
        let frame = self
            .frames
            .get_mut(&card)
            .ok_or(KnowledgeError::UninitializedCard(card))?;
        frame.relocate(World::Holder(taker));
        for seat in PlayerPosition::LOOP {
            if seat != taker {
                frame.reveal_to(seat);
            }
        }
        Ok(())
    }

    /// Locations `observer` cannot rule out for `card`.
    pub fn possible_holders(
        &self,
        card: Card,
        observer: PlayerPosition,
    ) -> Result<BTreeSet<World>, KnowledgeError> {
        self.frames
            .get(&card)
            .map(|frame| frame.possible_worlds(observer))
            .ok_or(KnowledgeError::UninitializedCard(card))
    }

    /// The relation over `card`'s worlds that is common knowledge among all
    /// four seats. Computed on demand; never stored.
    pub fn common_knowledge(&self, card: Card) -> Result<Relation, KnowledgeError> {
        self.frames
            .get(&card)
            .map(KripkeFrame::common_knowledge)
            .ok_or(KnowledgeError::UninitializedCard(card))
    }

    /// Clears every frame. All-or-nothing: the store never discards a single
    /// card's frame on its own.
    pub fn reset(&mut self) {
        self.frames.clear();
    }
}

fn location_at_deal(card: Card, hands: &[Hand; 4]) -> World {
    for seat in PlayerPosition::LOOP {
        if hands[seat.index()].contains(card) {
            return World::Holder(seat);
        }
    }
    World::Absent
}

#[cfg(test)]
mod tests {
    use super::{KnowledgeError, KnowledgeStore};
    use crate::knowledge::world::World;
    use crate::model::card::Card;
    use crate::model::hand::Hand;
    use crate::model::player::PlayerPosition;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use std::array;

    fn seven_of_spades() -> Card {
        Card::new(Rank::Seven, Suit::Spades, false)
    }

    fn queen_of_hearts() -> Card {
        Card::new(Rank::Queen, Suit::Hearts, true)
    }

    /// One card dealt to North, plus the indicator; everything else stocked.
    fn dealt_store() -> KnowledgeStore {
        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        hands[PlayerPosition::North.index()].add(seven_of_spades());

        let cards = [
            seven_of_spades(),
            queen_of_hearts(),
            Card::new(Rank::Ace, Suit::Hearts, true),
        ];
        let mut store = KnowledgeStore::new();
        store
            .initialize_all(&cards, queen_of_hearts(), &hands)
            .unwrap();
        store
    }

    #[test]
    fn deal_leaves_observers_totally_ignorant() {
        let store = dealt_store();
        let possible = store
            .possible_holders(seven_of_spades(), PlayerPosition::East)
            .unwrap();
        for seat in PlayerPosition::LOOP {
            assert!(possible.contains(&World::Holder(seat)));
        }
        assert!(possible.contains(&World::Absent));
    }

    #[test]
    fn deal_gives_every_seat_the_same_full_relation() {
        let store = dealt_store();
        let frame = store.frame(seven_of_spades()).unwrap();
        let north = frame.relation(PlayerPosition::North);
        assert_eq!(north.len(), frame.worlds().len() * frame.worlds().len());
        for seat in PlayerPosition::LOOP {
            assert_eq!(frame.relation(seat), north);
        }
    }

    #[test]
    fn indicator_is_public_from_the_deal() {
        let store = dealt_store();
        for seat in PlayerPosition::LOOP {
            let possible = store.possible_holders(queen_of_hearts(), seat).unwrap();
            assert!(possible.is_empty());
        }
        let frame = store.frame(queen_of_hearts()).unwrap();
        assert!(frame.worlds().is_empty());
        for seat in PlayerPosition::LOOP {
            assert!(frame.relation(seat).is_empty());
        }
    }

    #[test]
    fn reveal_collapses_every_observer_but_not_the_revealer() {
        let mut store = dealt_store();
        store
            .on_card_revealed(seven_of_spades(), PlayerPosition::North)
            .unwrap();

        for seat in [
            PlayerPosition::East,
            PlayerPosition::South,
            PlayerPosition::West,
        ] {
            let possible = store.possible_holders(seven_of_spades(), seat).unwrap();
            assert_eq!(possible.into_iter().collect::<Vec<_>>(), vec![World::Absent]);
        }

        // The revealer's relation was left alone: their certainty was
        // first-hand all along and is not modelled as an announcement.
        let frame = store.frame(seven_of_spades()).unwrap();
        assert_eq!(
            frame.relation(PlayerPosition::North).len(),
            frame.worlds().len() * frame.worlds().len()
        );
    }

    #[test]
    fn reveal_shrinks_relations_monotonically() {
        let mut store = dealt_store();
        let before = store
            .frame(seven_of_spades())
            .unwrap()
            .relation(PlayerPosition::East)
            .clone();

        store
            .on_card_revealed(seven_of_spades(), PlayerPosition::North)
            .unwrap();

        let after = store
            .frame(seven_of_spades())
            .unwrap()
            .relation(PlayerPosition::East);
        assert!(after.is_subset(&before));
    }

    #[test]
    fn replayed_reveal_is_a_noop() {
        let mut store = dealt_store();
        store
            .on_card_revealed(seven_of_spades(), PlayerPosition::North)
            .unwrap();
        let first = store.frame(seven_of_spades()).unwrap().clone();

        store
            .on_card_revealed(seven_of_spades(), PlayerPosition::North)
            .unwrap();
        assert_eq!(store.frame(seven_of_spades()).unwrap(), &first);
    }

    #[test]
    fn taken_card_becomes_a_publicly_known_holding() {
        let mut store = dealt_store();
        store
            .on_card_revealed(seven_of_spades(), PlayerPosition::North)
            .unwrap();
        store
            .on_card_taken(seven_of_spades(), PlayerPosition::East)
            .unwrap();

        for seat in [PlayerPosition::South, PlayerPosition::West] {
            let possible = store.possible_holders(seven_of_spades(), seat).unwrap();
            assert_eq!(
                possible.into_iter().collect::<Vec<_>>(),
                vec![World::Holder(PlayerPosition::East)]
            );
        }
    }

    #[test]
    fn replaying_a_taken_card_that_attacks_again_stays_consistent() {
        let mut store = dealt_store();
        store
            .on_card_revealed(seven_of_spades(), PlayerPosition::North)
            .unwrap();
        store
            .on_card_taken(seven_of_spades(), PlayerPosition::East)
            .unwrap();
        store
            .on_card_revealed(seven_of_spades(), PlayerPosition::East)
            .unwrap();

        let possible = store
            .possible_holders(seven_of_spades(), PlayerPosition::West)
            .unwrap();
        assert_eq!(possible.into_iter().collect::<Vec<_>>(), vec![World::Absent]);
    }

    #[test]
    fn common_knowledge_is_a_subset_of_every_relation() {
        let mut store = dealt_store();
        store
            .on_card_revealed(seven_of_spades(), PlayerPosition::North)
            .unwrap();

        let common = store.common_knowledge(seven_of_spades()).unwrap();
        let frame = store.frame(seven_of_spades()).unwrap();
        for seat in PlayerPosition::LOOP {
            assert!(common.is_subset(frame.relation(seat)));
        }
    }

    #[test]
    fn unknown_card_is_rejected_before_anything_changes() {
        let mut store = dealt_store();
        let stranger = Card::new(Rank::Six, Suit::Clubs, false);
        let snapshot = store.clone();

        let err = store
            .on_card_revealed(stranger, PlayerPosition::North)
            .unwrap_err();
        assert_eq!(err, KnowledgeError::UninitializedCard(stranger));
        assert_eq!(
            store.frame(seven_of_spades()),
            snapshot.frame(seven_of_spades())
        );

        assert!(store.possible_holders(stranger, PlayerPosition::East).is_err());
        assert!(store.common_knowledge(stranger).is_err());
    }

    #[test]
    fn initializing_twice_is_rejected() {
        let mut store = dealt_store();
        let hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        let err = store
            .initialize_all(&[seven_of_spades()], queen_of_hearts(), &hands)
            .unwrap_err();
        assert_eq!(err, KnowledgeError::AlreadyInitialized);
    }

    #[test]
    fn reset_clears_every_frame() {
        let mut store = dealt_store();
        assert!(store.is_initialized());
        store.reset();
        assert!(!store.is_initialized());
        assert!(store.frame(seven_of_spades()).is_none());
        assert_eq!(store.cards().count(), 0);
    }
}
