use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Face-down stock. Index 0 is the bottom of the pile: the face-up trump
/// indicator, which fixes the trump suit for the whole session and is never
/// drawn.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub const SIZE: usize = 36;

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut layout = Vec::with_capacity(Self::SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                layout.push((rank, suit));
            }
        }
        layout.shuffle(rng);

        // The card that lands at the bottom is turned face up and names trump.
        let trump_suit = layout[0].1;
        let cards = layout
            .into_iter()
            .map(|(rank, suit)| Card::new(rank, suit, suit == trump_suit))
            .collect();
        Self { cards }
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn indicator(&self) -> Card {
        self.cards[0]
    }

    pub fn trump_suit(&self) -> Suit {
        self.cards[0].suit
    }

    /// Draws from the top. The indicator at the bottom stays put.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.len() <= 1 {
            None
        } else {
            self.cards.pop()
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
