use super::{Policy, PolicyContext};
use durak_core::model::card::Card;
use std::collections::VecDeque;

/// Test double that replays a fixed sequence of moves, attack and defence
/// alike, in the order they were queued.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    moves: VecDeque<Option<Card>>,
}

impl ScriptedPolicy {
    pub fn new(moves: impl IntoIterator<Item = Option<Card>>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }

    fn next_move(&mut self) -> Option<Card> {
        self.moves.pop_front().flatten()
    }
}

impl Policy for ScriptedPolicy {
    fn choose_attack(&mut self, _ctx: &PolicyContext) -> Option<Card> {
        self.next_move()
    }

    fn choose_defense(&mut self, _ctx: &PolicyContext, _attack: Card) -> Option<Card> {
        self.next_move()
    }
}
