use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::rank::Rank;
use std::fmt;

/// One attack/defence exchange between two seats. Attacks land uncovered and
/// must be answered (covered or given up on) before the next attack; every
/// follow-up attack must match a rank already on the table.
#[derive(Debug, Clone)]
pub struct Bout {
    attacker: PlayerPosition,
    defender: PlayerPosition,
    pairs: Vec<BoutPair>,
}

#[derive(Debug, Clone, Copy)]
pub struct BoutPair {
    pub attack: Card,
    pub defense: Option<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoutError {
    AttackPending(Card),
    NothingToCover,
    CannotBeat { attack: Card, defense: Card },
    RankNotOnTable(Rank),
}

impl fmt::Display for BoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoutError::AttackPending(card) => {
                write!(f, "attack {card} is still waiting for an answer")
            }
            BoutError::NothingToCover => write!(f, "no uncovered attack on the table"),
            BoutError::CannotBeat { attack, defense } => {
                write!(f, "{defense} does not beat {attack}")
            }
            BoutError::RankNotOnTable(rank) => {
                write!(f, "no card of rank {rank} is on the table yet")
            }
        }
    }
}

impl std::error::Error for BoutError {}

impl Bout {
    pub fn new(attacker: PlayerPosition, defender: PlayerPosition) -> Self {
        Self {
            attacker,
            defender,
            pairs: Vec::new(),
        }
    }

    pub fn attacker(&self) -> PlayerPosition {
        self.attacker
    }

    pub fn defender(&self) -> PlayerPosition {
        self.defender
    }

    pub fn pairs(&self) -> &[BoutPair] {
        &self.pairs
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// The attack the defender still has to answer, if any.
    pub fn pending_attack(&self) -> Option<Card> {
        self.pairs
            .last()
            .filter(|pair| pair.defense.is_none())
            .map(|pair| pair.attack)
    }

    pub fn is_fully_covered(&self) -> bool {
        self.pairs.iter().all(|pair| pair.defense.is_some())
    }

    pub fn rank_on_table(&self, rank: Rank) -> bool {
        self.pairs.iter().any(|pair| {
            pair.attack.rank == rank || pair.defense.is_some_and(|card| card.rank == rank)
        })
    }

    /// Every card on the table, in play order.
    pub fn cards(&self) -> Vec<Card> {
        let mut cards = Vec::with_capacity(self.pairs.len() * 2);
        for pair in &self.pairs {
            cards.push(pair.attack);
            if let Some(defense) = pair.defense {
                cards.push(defense);
            }
        }
        cards
    }

    pub fn push_attack(&mut self, card: Card) -> Result<(), BoutError> {
        if let Some(pending) = self.pending_attack() {
            return Err(BoutError::AttackPending(pending));
        }
        if !self.pairs.is_empty() && !self.rank_on_table(card.rank) {
            return Err(BoutError::RankNotOnTable(card.rank));
        }
        self.pairs.push(BoutPair {
            attack: card,
            defense: None,
        });
        Ok(())
    }

    pub fn cover(&mut self, card: Card) -> Result<(), BoutError> {
        let Some(attack) = self.pending_attack() else {
            return Err(BoutError::NothingToCover);
        };
        if !card.beats(attack) {
            return Err(BoutError::CannotBeat {
                attack,
                defense: card,
            });
        }
        let pair = self.pairs.last_mut().expect("pending attack implies a pair");
        pair.defense = Some(card);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Bout, BoutError};
    use crate::model::card::Card;
    use crate::model::player::PlayerPosition;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn bout() -> Bout {
        Bout::new(PlayerPosition::North, PlayerPosition::East)
    }

    #[test]
    fn first_attack_may_be_any_card() {
        let mut bout = bout();
        let card = Card::new(Rank::King, Suit::Spades, false);
        bout.push_attack(card).unwrap();
        assert_eq!(bout.pending_attack(), Some(card));
        assert!(!bout.is_fully_covered());
    }

    #[test]
    fn cover_requires_a_beating_card() {
        let mut bout = bout();
        let attack = Card::new(Rank::Ten, Suit::Clubs, false);
        bout.push_attack(attack).unwrap();

        let weak = Card::new(Rank::Seven, Suit::Clubs, false);
        assert_eq!(
            bout.cover(weak),
            Err(BoutError::CannotBeat {
                attack,
                defense: weak
            })
        );

        bout.cover(Card::new(Rank::Queen, Suit::Clubs, false)).unwrap();
        assert!(bout.is_fully_covered());
        assert_eq!(bout.pending_attack(), None);
    }

    #[test]
    fn follow_up_attack_must_match_a_table_rank() {
        let mut bout = bout();
        bout.push_attack(Card::new(Rank::Ten, Suit::Clubs, false))
            .unwrap();
        bout.cover(Card::new(Rank::Queen, Suit::Clubs, false))
            .unwrap();

        let off_rank = Card::new(Rank::Nine, Suit::Spades, false);
        assert_eq!(
            bout.push_attack(off_rank),
            Err(BoutError::RankNotOnTable(Rank::Nine))
        );

        // The covering queen's rank counts as on the table too.
        bout.push_attack(Card::new(Rank::Queen, Suit::Diamonds, false))
            .unwrap();
    }

    #[test]
    fn cannot_stack_attacks_while_one_is_uncovered() {
        let mut bout = bout();
        let first = Card::new(Rank::Ten, Suit::Clubs, false);
        bout.push_attack(first).unwrap();
        assert_eq!(
            bout.push_attack(Card::new(Rank::Ten, Suit::Spades, false)),
            Err(BoutError::AttackPending(first))
        );
    }

    #[test]
    fn cover_without_attack_is_rejected() {
        let mut bout = bout();
        assert_eq!(
            bout.cover(Card::new(Rank::Ace, Suit::Clubs, false)),
            Err(BoutError::NothingToCover)
        );
    }

    #[test]
    fn cards_are_listed_in_play_order() {
        let mut bout = bout();
        let a1 = Card::new(Rank::Ten, Suit::Clubs, false);
        let d1 = Card::new(Rank::Queen, Suit::Clubs, false);
        let a2 = Card::new(Rank::Ten, Suit::Spades, false);
        bout.push_attack(a1).unwrap();
        bout.cover(d1).unwrap();
        bout.push_attack(a2).unwrap();
        assert_eq!(bout.cards(), vec![a1, d1, a2]);
        assert_eq!(bout.pair_count(), 2);
    }
}
