use super::{Policy, PolicyContext};
use crate::bot::{BotDifficulty, legal_attacks, legal_defenses, threat_count};
use durak_core::model::card::Card;
use durak_core::model::rank::Rank;
use std::sync::OnceLock;
use tracing::{Level, event};

/// Rule-based player. `Reckless` presses the lowest legal card every time;
/// `Epistemic` weighs each candidate attack by how many of its beaters the
/// defender may still be holding, and spends trumps only when the table is
/// worth it.
pub struct HeuristicPolicy {
    difficulty: BotDifficulty,
}

impl HeuristicPolicy {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self { difficulty }
    }

    pub fn reckless() -> Self {
        Self::new(BotDifficulty::Reckless)
    }

    pub fn epistemic() -> Self {
        Self::new(BotDifficulty::Epistemic)
    }
}

impl Policy for HeuristicPolicy {
    fn choose_attack(&mut self, ctx: &PolicyContext) -> Option<Card> {
        let legal = legal_attacks(ctx);
        if legal.is_empty() {
            log_withdraw(ctx, "no_legal_attack");
            return None;
        }

        if matches!(self.difficulty, BotDifficulty::Reckless) {
            let card = lowest(&legal);
            log_attack(ctx, card, None, "reckless_lowest");
            return Some(card);
        }

        let mut scored: Vec<(Card, usize)> = legal
            .into_iter()
            .map(|card| (card, threat_count(ctx, card)))
            .collect();
        scored.sort_by(|(a, threat_a), (b, threat_b)| {
            threat_a
                .cmp(threat_b)
                .then(a.trump.cmp(&b.trump))
                .then(a.rank.cmp(&b.rank))
        });
        let (card, threat) = scored[0];

        if ctx.bout.pair_count() == 0 || worth_following_up(card, threat) {
            log_attack(ctx, card, Some(threat), "epistemic_threat");
            Some(card)
        } else {
            log_withdraw(ctx, "keeping_high_cards");
            None
        }
    }

    fn choose_defense(&mut self, ctx: &PolicyContext, attack: Card) -> Option<Card> {
        let beaters = legal_defenses(ctx, attack);
        let Some(&card) = beaters.first() else {
            log_defense(ctx, attack, None, "no_beater");
            return None;
        };

        if matches!(self.difficulty, BotDifficulty::Reckless) {
            log_defense(ctx, attack, Some(card), "reckless_cheapest");
            return Some(card);
        }

        if card.trump && !attack.trump && !worth_a_trump(ctx, attack, card) {
            // Taking one cheap attack costs less than burning a high trump.
            log_defense(ctx, attack, None, "saving_trump");
            return None;
        }

        log_defense(ctx, attack, Some(card), "cheapest_beater");
        Some(card)
    }
}

fn lowest(cards: &[Card]) -> Card {
    cards
        .iter()
        .copied()
        .min_by(|a, b| a.trump.cmp(&b.trump).then(a.rank.cmp(&b.rank)))
        .expect("caller checked the candidates are non-empty")
}

fn worth_following_up(card: Card, threat: usize) -> bool {
    !card.trump && (threat == 0 || card.rank <= Rank::Ten)
}

fn worth_a_trump(ctx: &PolicyContext, attack: Card, trump_card: Card) -> bool {
    attack.rank >= Rank::Jack || trump_card.rank <= Rank::Nine || ctx.bout.pair_count() > 1
}

fn decision_logging_enabled() -> bool {
    static CACHED: OnceLock<bool> = OnceLock::new();
    *CACHED.get_or_init(|| {
        std::env::var("DRK_BOUT_DETAILS")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false)
    })
}

fn log_attack(ctx: &PolicyContext, card: Card, threat: Option<usize>, reason: &str) {
    if !tracing::enabled!(Level::INFO) || !decision_logging_enabled() {
        return;
    }
    event!(
        target: "durak_bot::attack_decision",
        Level::INFO,
        seat = %ctx.seat,
        card = %card,
        threat = threat.map(|value| value as i64).unwrap_or(-1),
        table = ctx.bout.pair_count(),
        reason,
        "attack chosen"
    );
}

fn log_withdraw(ctx: &PolicyContext, reason: &str) {
    if !tracing::enabled!(Level::INFO) || !decision_logging_enabled() {
        return;
    }
    event!(
        target: "durak_bot::attack_decision",
        Level::INFO,
        seat = %ctx.seat,
        table = ctx.bout.pair_count(),
        reason,
        "attack withdrawn"
    );
}

fn log_defense(ctx: &PolicyContext, attack: Card, cover: Option<Card>, reason: &str) {
    if !tracing::enabled!(Level::INFO) || !decision_logging_enabled() {
        return;
    }
    match cover {
        Some(card) => event!(
            target: "durak_bot::defense_decision",
            Level::INFO,
            seat = %ctx.seat,
            attack = %attack,
            cover = %card,
            reason,
            "attack covered"
        ),
        None => event!(
            target: "durak_bot::defense_decision",
            Level::INFO,
            seat = %ctx.seat,
            attack = %attack,
            reason,
            "table taken"
        ),
    }
}
