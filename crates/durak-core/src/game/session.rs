use crate::knowledge::KnowledgeStore;
use crate::model::bout::{Bout, BoutError};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::PlayerPosition;
use std::array;
use std::fmt;

pub const HAND_SIZE: usize = 6;

/// One full game: hands, stock, discard pile, the bout in progress, and the
/// epistemic store revised on every public event.
///
/// The session is the only writer of the store, and it writes before it
/// returns: by the time a `submit_*` call comes back, every observer's
/// relation already reflects the play, so the next decision (whoever makes
/// it) reads up-to-date knowledge.
#[derive(Debug, Clone)]
pub struct GameSession {
    seed: u64,
    hands: [Hand; 4],
    stock: Deck,
    discard: Vec<Card>,
    bout: Bout,
    knowledge: KnowledgeStore,
    bouts_completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoutOutcome {
    /// Every attack was covered; the table goes to the discard pile.
    Defended,
    /// The defender gave up; the table goes into the defender's hand.
    Taken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    GameOver,
    MustAttack,
    CardNotInHand(Card),
    DefenderOutOfCards,
    Bout(BoutError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::GameOver => write!(f, "the game has already ended"),
            PlayError::MustAttack => write!(f, "the opening attack cannot be withdrawn"),
            PlayError::CardNotInHand(card) => write!(f, "{card} is not in the player's hand"),
            PlayError::DefenderOutOfCards => {
                write!(f, "the defender has no cards left to answer with")
            }
            PlayError::Bout(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlayError {}

impl GameSession {
    /// Shuffles, deals six cards to each seat and builds the epistemic store
    /// for the whole deck, with the trump indicator public from the start.
    pub fn with_seed(seed: u64) -> Self {
        let mut stock = Deck::shuffled_with_seed(seed);
        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        for _ in 0..HAND_SIZE {
            for seat in PlayerPosition::LOOP {
                let card = stock.draw().expect("a 36 card deck covers the deal");
                hands[seat.index()].add(card);
            }
        }

        let mut cards: Vec<Card> = stock.cards().to_vec();
        for hand in &hands {
            cards.extend(hand.iter().copied());
        }

        let mut knowledge = KnowledgeStore::new();
        knowledge
            .initialize_all(&cards, stock.indicator(), &hands)
            .expect("a new store has no frames");

        Self {
            seed,
            hands,
            stock,
            discard: Vec::new(),
            bout: Bout::new(PlayerPosition::North, PlayerPosition::East),
            knowledge,
            bouts_completed: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn attacker(&self) -> PlayerPosition {
        self.bout.attacker()
    }

    pub fn defender(&self) -> PlayerPosition {
        self.bout.defender()
    }

    pub fn hand(&self, seat: PlayerPosition) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn bout(&self) -> &Bout {
        &self.bout
    }

    pub fn trump(&self) -> Card {
        self.stock.indicator()
    }

    pub fn stock_size(&self) -> usize {
        self.stock.remaining()
    }

    pub fn discard_size(&self) -> usize {
        self.discard.len()
    }

    pub fn bouts_completed(&self) -> u32 {
        self.bouts_completed
    }

    /// Read-only view for players; only the session mutates the store.
    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    /// `Some(card)` plays a new attack; `None` withdraws and resolves the
    /// bout as defended. The store is updated before the call returns.
    pub fn submit_attack(&mut self, card: Option<Card>) -> Result<Option<BoutOutcome>, PlayError> {
        if self.has_ended() {
            return Err(PlayError::GameOver);
        }
        let Some(card) = card else {
            if self.bout.pair_count() == 0 {
                return Err(PlayError::MustAttack);
            }
            if let Some(pending) = self.bout.pending_attack() {
                return Err(PlayError::Bout(BoutError::AttackPending(pending)));
            }
            return Ok(Some(self.resolve(BoutOutcome::Defended)));
        };

        let attacker = self.bout.attacker();
        if !self.hands[attacker.index()].contains(card) {
            return Err(PlayError::CardNotInHand(card));
        }
        if self.hands[self.bout.defender().index()].is_empty() {
            return Err(PlayError::DefenderOutOfCards);
        }
        self.bout.push_attack(card).map_err(PlayError::Bout)?;
        self.hands[attacker.index()].remove(card);
        self.knowledge
            .on_card_revealed(card, attacker)
            .expect("every card gets a frame at the deal");
        Ok(None)
    }

    /// `Some(card)` covers the pending attack; `None` gives up and resolves
    /// the bout as taken. The store is updated before the call returns.
    pub fn submit_defense(&mut self, card: Option<Card>) -> Result<Option<BoutOutcome>, PlayError> {
        if self.has_ended() {
            return Err(PlayError::GameOver);
        }
        let defender = self.bout.defender();
        let Some(card) = card else {
            if self.bout.pending_attack().is_none() {
                return Err(PlayError::Bout(BoutError::NothingToCover));
            }
            return Ok(Some(self.resolve(BoutOutcome::Taken)));
        };

        if !self.hands[defender.index()].contains(card) {
            return Err(PlayError::CardNotInHand(card));
        }
        self.bout.cover(card).map_err(PlayError::Bout)?;
        self.hands[defender.index()].remove(card);
        self.knowledge
            .on_card_revealed(card, defender)
            .expect("every card gets a frame at the deal");
        Ok(None)
    }

    /// The game is over once the table is clear and at most one seat still
    /// holds cards. That seat is the durak.
    pub fn has_ended(&self) -> bool {
        self.bout.pair_count() == 0 && self.active_players() <= 1
    }

    pub fn loser(&self) -> Option<PlayerPosition> {
        if !self.has_ended() {
            return None;
        }
        PlayerPosition::LOOP
            .into_iter()
            .find(|seat| !self.hands[seat.index()].is_empty())
    }

    /// Session teardown: the store is cleared all at once, never piecemeal.
    pub fn finish(&mut self) {
        self.knowledge.reset();
    }

    fn resolve(&mut self, outcome: BoutOutcome) -> BoutOutcome {
        let defender = self.bout.defender();
        let table = self.bout.cards();
        match outcome {
            BoutOutcome::Defended => self.discard.extend(table),
            BoutOutcome::Taken => {
                for card in table {
                    self.hands[defender.index()].add(card);
                    self.knowledge
                        .on_card_taken(card, defender)
                        .expect("every card gets a frame at the deal");
                }
            }
        }
        self.bouts_completed += 1;

        // Rotation: a successful defender attacks next; a failed defender
        // skips the turn and the seat after them leads instead.
        let next_attacker = match outcome {
            BoutOutcome::Defended => self.next_active_from(defender),
            BoutOutcome::Taken => self.next_active_player(defender),
        };
        let next_defender = self.next_active_player(next_attacker);
        self.bout = Bout::new(next_attacker, next_defender);
        outcome
    }

    fn active_players(&self) -> usize {
        self.hands.iter().filter(|hand| !hand.is_empty()).count()
    }

    fn next_active_from(&self, seat: PlayerPosition) -> PlayerPosition {
        if self.hands[seat.index()].is_empty() {
            self.next_active_player(seat)
        } else {
            seat
        }
    }

    fn next_active_player(&self, after: PlayerPosition) -> PlayerPosition {
        let mut seat = after.next();
        for _ in 0..3 {
            if !self.hands[seat.index()].is_empty() {
                return seat;
            }
            seat = seat.next();
        }
        after
    }
}
