use crate::policy::PolicyContext;
use durak_core::knowledge::World;
use durak_core::model::card::Card;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotDifficulty {
    /// Plays the lowest legal card and never consults the knowledge store.
    Reckless,
    /// Weighs moves by what opponents can still be holding.
    Epistemic,
}

impl Default for BotDifficulty {
    fn default() -> Self {
        Self::Epistemic
    }
}

impl BotDifficulty {
    pub fn from_env() -> Self {
        static CACHED: OnceLock<BotDifficulty> = OnceLock::new();
        *CACHED.get_or_init(|| match std::env::var("DRK_BOT_DIFFICULTY") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "reckless" => BotDifficulty::Reckless,
                "easy" => BotDifficulty::Reckless,
                "epistemic" => BotDifficulty::Epistemic,
                "normal" => BotDifficulty::Epistemic,
                _ => BotDifficulty::default(),
            },
            Err(_) => BotDifficulty::default(),
        })
    }
}

/// Cards the attacker may legally put on the table right now: anything on an
/// empty table, rank matches afterwards, and nothing once the defender is
/// out of cards.
pub fn legal_attacks(ctx: &PolicyContext<'_>) -> Vec<Card> {
    if ctx.defender_cards == 0 {
        return Vec::new();
    }
    ctx.hand
        .iter()
        .copied()
        .filter(|card| ctx.bout.pair_count() == 0 || ctx.bout.rank_on_table(card.rank))
        .collect()
}

/// Cards in hand that beat `attack`, cheapest first: plain suits before
/// trumps, low ranks before high.
pub fn legal_defenses(ctx: &PolicyContext<'_>, attack: Card) -> Vec<Card> {
    let mut beaters: Vec<Card> = ctx
        .hand
        .iter()
        .copied()
        .filter(|card| card.beats(attack))
        .collect();
    beaters.sort_by(|a, b| a.trump.cmp(&b.trump).then(a.rank.cmp(&b.rank)));
    beaters
}

/// How many cards that beat `candidate` the defender may still be holding,
/// as far as this seat can tell. Cards this seat holds itself are excluded;
/// for the rest, the card's frame says whether the defender remains a
/// possible holder.
pub fn threat_count(ctx: &PolicyContext<'_>, candidate: Card) -> usize {
    let defender = World::Holder(ctx.defender);
    ctx.knowledge
        .cards()
        .filter(|&card| card.beats(candidate))
        .filter(|&card| !ctx.hand.contains(card))
        .filter(|&card| {
            ctx.knowledge
                .possible_holders(card, ctx.seat)
                .map(|worlds| worlds.contains(&defender))
                .unwrap_or(false)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::{BotDifficulty, legal_attacks, legal_defenses, threat_count};
    use crate::policy::PolicyContext;
    use durak_core::knowledge::KnowledgeStore;
    use durak_core::model::bout::Bout;
    use durak_core::model::card::Card;
    use durak_core::model::hand::Hand;
    use durak_core::model::player::PlayerPosition;
    use durak_core::model::rank::Rank;
    use durak_core::model::suit::Suit;
    use std::array;

    fn trump(rank: Rank) -> Card {
        Card::new(rank, Suit::Hearts, true)
    }

    fn plain(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit, false)
    }

    fn store_with(cards: &[Card], hands: &[Hand; 4]) -> KnowledgeStore {
        let mut store = KnowledgeStore::new();
        let indicator = trump(Rank::Six);
        let mut all = cards.to_vec();
        all.push(indicator);
        store.initialize_all(&all, indicator, hands).unwrap();
        store
    }

    fn ctx<'a>(
        hand: &'a Hand,
        bout: &'a Bout,
        knowledge: &'a KnowledgeStore,
    ) -> PolicyContext<'a> {
        PolicyContext {
            seat: PlayerPosition::North,
            hand,
            bout,
            attacker: bout.attacker(),
            defender: bout.defender(),
            knowledge,
            trump: trump(Rank::Six),
            defender_cards: 6,
            stock_size: 13,
            discard_size: 0,
        }
    }

    #[test]
    fn difficulty_defaults_to_epistemic() {
        assert_eq!(BotDifficulty::default(), BotDifficulty::Epistemic);
    }

    #[test]
    fn any_card_may_open_but_follow_ups_need_a_table_rank() {
        let hand = Hand::with_cards(vec![
            plain(Rank::Nine, Suit::Clubs),
            plain(Rank::King, Suit::Spades),
        ]);
        let hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        let store = store_with(hand.cards(), &hands);

        let open = Bout::new(PlayerPosition::North, PlayerPosition::East);
        assert_eq!(legal_attacks(&ctx(&hand, &open, &store)).len(), 2);

        let mut going = Bout::new(PlayerPosition::North, PlayerPosition::East);
        going.push_attack(plain(Rank::King, Suit::Clubs)).unwrap();
        going.cover(plain(Rank::Ace, Suit::Clubs)).unwrap();
        let legal = legal_attacks(&ctx(&hand, &going, &store));
        assert_eq!(legal, vec![plain(Rank::King, Suit::Spades)]);
    }

    #[test]
    fn no_attacks_against_an_empty_handed_defender() {
        let hand = Hand::with_cards(vec![plain(Rank::Nine, Suit::Clubs)]);
        let hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        let store = store_with(hand.cards(), &hands);
        let bout = Bout::new(PlayerPosition::North, PlayerPosition::East);

        let mut context = ctx(&hand, &bout, &store);
        context.defender_cards = 0;
        assert!(legal_attacks(&context).is_empty());
    }

    #[test]
    fn defenses_are_sorted_cheapest_first() {
        let hand = Hand::with_cards(vec![
            trump(Rank::Seven),
            plain(Rank::Ace, Suit::Clubs),
            plain(Rank::Jack, Suit::Clubs),
        ]);
        let hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        let store = store_with(hand.cards(), &hands);
        let bout = Bout::new(PlayerPosition::East, PlayerPosition::North);

        let beaters = legal_defenses(
            &ctx(&hand, &bout, &store),
            plain(Rank::Ten, Suit::Clubs),
        );
        assert_eq!(
            beaters,
            vec![
                plain(Rank::Jack, Suit::Clubs),
                plain(Rank::Ace, Suit::Clubs),
                trump(Rank::Seven),
            ]
        );
    }

    #[test]
    fn threat_count_drops_once_beaters_are_seen_leaving_hands() {
        let candidate = plain(Rank::Ten, Suit::Clubs);
        let beater = plain(Rank::Ace, Suit::Clubs);

        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        hands[PlayerPosition::West.index()].add(beater);
        let mut store = store_with(&[candidate, beater], &hands);

        let hand = Hand::with_cards(vec![candidate]);
        let bout = Bout::new(PlayerPosition::North, PlayerPosition::East);
        let before = threat_count(&ctx(&hand, &bout, &store), candidate);
        assert!(before >= 1);

        // West plays the ace face up: North can now rule it out of East's hand.
        store.on_card_revealed(beater, PlayerPosition::West).unwrap();
        let after = threat_count(&ctx(&hand, &bout, &store), candidate);
        assert_eq!(after, before - 1);
    }
}
