//! Per-card epistemic state tracking.
//!
//! Every hidden card carries a small Kripke structure: the set of locations
//! it could still be in, and, per player, which of those locations that
//! player cannot yet tell apart. Public events (a card played face up, a
//! failed defender taking the table) announce facts that shrink each
//! observer's relation; nothing ever grows one.
//!
//! This module is composed of:
//! - `world`: the location hypotheses a frame ranges over.
//! - `frame`: the per-card Kripke structure and the announcement update.
//! - `store`: the session-scoped map from card to frame, plus the derived
//!   common-knowledge query.

mod frame;
mod store;
mod world;

pub use frame::{KripkeFrame, Relation};
pub use store::{KnowledgeError, KnowledgeStore};
pub use world::World;
