//! Value types and components shared by the store and the scheduler.

mod common;
mod components;

pub use common::{EntityId, Tick};
pub use components::{Ai, Name, Player, TimeOfNextAction};
