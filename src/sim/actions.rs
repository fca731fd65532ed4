//! Narrow interface the spawn engine and resolver use to talk to run state
//!
//! Neither component touches `GameState` fields directly. Tests drive them
//! with a recording fake instead.

use super::events::GameEvent;
use super::state::{GameStatus, LetterSet};

/// Read-only view of the run taken at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSnapshot {
    pub status: GameStatus,
    pub speed: f32,
    pub level: u32,
    pub lane_count: u32,
    pub collected_letters: LetterSet,
    pub is_level_transition: bool,
    /// Changes on every run start and menu return
    pub run_generation: u32,
}

/// Callbacks into the state owner
pub trait RunActions {
    fn snapshot(&self) -> RunSnapshot;
    fn take_damage(&mut self);
    fn collect_gem(&mut self, value: u64);
    /// False when the run refuses the letter; the entity then stays in play
    fn collect_letter(&mut self, index: u8) -> bool;
    fn open_shop(&mut self);
    /// Mirror of distance traveled this run, for presentation
    fn record_distance(&mut self, distance: f32);
    fn emit(&mut self, event: GameEvent);
}
