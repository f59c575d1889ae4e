use super::world::World;
use crate::model::player::PlayerPosition;
use std::array;
use std::collections::BTreeSet;

/// Indistinguishability pairs for one player over a frame's worlds.
pub type Relation = BTreeSet<(World, World)>;

/// Kripke structure for a single card: the locations still conceivable for
/// it, and, per player, which of those locations the player cannot tell
/// apart given everything announced so far.
///
/// Relations only ever shrink. A public announcement removes exactly the
/// pairs the announced fact distinguishes; no operation adds a pair back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KripkeFrame {
    worlds: BTreeSet<World>,
    relations: [Relation; 4],
    actual: World,
}

impl KripkeFrame {
    /// Frame for a freshly dealt or stocked card: every seat starts with the
    /// complete relation over every location, including `Absent` (an undealt
    /// card really is in the stock, and no observer can rule that out).
    pub fn total_ignorance(actual: World) -> Self {
        let worlds: BTreeSet<World> = World::ALL.into_iter().collect();
        let full: Relation = worlds
            .iter()
            .flat_map(|&a| worlds.iter().map(move |&b| (a, b)))
            .collect();
        let frame = Self {
            worlds,
            relations: array::from_fn(|_| full.clone()),
            actual,
        };
        frame.verify();
        frame
    }

    /// Frame for the trump indicator: its location is public from the moment
    /// the deck is built, so no seat has anything left to distinguish.
    pub fn public() -> Self {
        Self {
            worlds: BTreeSet::new(),
            relations: array::from_fn(|_| Relation::new()),
            actual: World::Absent,
        }
    }

    pub fn worlds(&self) -> &BTreeSet<World> {
        &self.worlds
    }

    /// The card's true current location.
    pub fn actual(&self) -> World {
        self.actual
    }

    pub fn relation(&self, seat: PlayerPosition) -> &Relation {
        &self.relations[seat.index()]
    }

    /// Public-announcement restriction: each observer keeps exactly the
    /// pairs the announced fact does not tell apart, i.e. drops every pair
    /// where the fact holds in one world but not the other.
    pub fn announce<F>(&mut self, observers: &[PlayerPosition], fact: F)
    where
        F: Fn(World) -> bool,
    {
        for &seat in observers {
            let relation = &mut self.relations[seat.index()];
            let kept: Relation = relation
                .iter()
                .copied()
                .filter(|&(a, b)| fact(a) == fact(b))
                .collect();
            *relation = kept;
        }
        self.verify();
    }

    /// Records the card's new true location once it has become publicly
    /// visible (played face up, or taken from the table into a hand).
    pub fn relocate(&mut self, destination: World) {
        self.actual = destination;
    }

    /// Lets `observer` rule out every location the card's now-public
    /// position contradicts. Safe to repeat: once nothing distinguishes the
    /// remaining pairs, nothing more is removed.
    pub fn reveal_to(&mut self, observer: PlayerPosition) {
        let here = self.actual;
        self.announce(&[observer], |world| world == here);
    }

    /// Locations `observer` cannot rule out for the card, read straight off
    /// the relation: everything still indistinguishable from the true one.
    pub fn possible_worlds(&self, observer: PlayerPosition) -> BTreeSet<World> {
        let actual = self.actual;
        self.relations[observer.index()]
            .iter()
            .filter(|&&(a, _)| a == actual)
            .map(|&(_, b)| b)
            .collect()
    }

    /// The relation that is common knowledge among all four seats: pairs no
    /// player can tell apart, closed under multi-step "some player thinks
    /// some player thinks" reachability, anchored at the card's true
    /// location.
    pub fn common_knowledge(&self) -> Relation {
        let mut shared = self.relations[0].clone();
        for relation in &self.relations[1..] {
            shared = shared.intersection(relation).copied().collect();
        }
        let closed = transitive_closure(&shared);
        let reachable = reachable_from(&closed, self.actual);
        closed
            .into_iter()
            .filter(|(a, b)| reachable.contains(a) && reachable.contains(b))
            .collect()
    }

    // A relation referencing a world outside the frame, or missing a self
    // pair for a world it mentions, means an update produced an inconsistent
    // epistemic state. That is a bug in the caller or in this module; abort
    // rather than repair it.
    fn verify(&self) {
        for seat in PlayerPosition::LOOP {
            let relation = &self.relations[seat.index()];
            let mut domain = BTreeSet::new();
            for &(a, b) in relation {
                assert!(
                    self.worlds.contains(&a) && self.worlds.contains(&b),
                    "relation for {seat} references a world outside the frame"
                );
                domain.insert(a);
                domain.insert(b);
            }
            for &world in &domain {
                assert!(
                    relation.contains(&(world, world)),
                    "relation for {seat} lost reflexivity at world '{world}'"
                );
            }
        }
    }
}

fn transitive_closure(relation: &Relation) -> Relation {
    let mut closed = relation.clone();
    loop {
        let mut added = Vec::new();
        for &(a, b) in &closed {
            for &(c, d) in &closed {
                if b == c && !closed.contains(&(a, d)) {
                    added.push((a, d));
                }
            }
        }
        if added.is_empty() {
            return closed;
        }
        closed.extend(added);
    }
}

fn reachable_from(relation: &Relation, start: World) -> BTreeSet<World> {
    let mut seen = BTreeSet::new();
    let mut frontier = vec![start];
    while let Some(world) = frontier.pop() {
        for &(a, b) in relation {
            if a == world && seen.insert(b) {
                frontier.push(b);
            }
        }
    }
    seen
}
