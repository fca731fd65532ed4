//! Outbound game events
//!
//! The core never calls into rendering or audio. Everything presentation
//! needs to react to is queued here and drained once per tick.

use glam::Vec3;

use super::entity::{EntityId, Rgb};
use super::state::GameStatus;

/// HUD element a pulse is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudTarget {
    Score,
    Energy,
    Bonus,
}

/// Sound cues for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Jump,
    DoubleJump,
    GemCollect,
    LetterCollect,
    Damage,
    EnemyFire,
}

/// Something happened that presentation may want to show
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A HUD counter changed (score, energy, bonus letters)
    Pulse { target: HudTarget },
    /// Player lost a life but the run continues
    DamageTaken { lives_left: u32, intensity: f32 },
    /// Camera shake not caused by damage (landing)
    Shake { intensity: f32 },
    ParticleBurst { pos: Vec3, color: Rgb },
    EntityConsumed { id: EntityId },
    Sound(SoundCue),
    StatusChanged { from: GameStatus, to: GameStatus },
    LevelUp { level: u32, lane_count: u32 },
    /// Transition freeze finished and the run resumed
    LevelStarted { level: u32 },
    ImmortalityChanged { active: bool },
    AttendanceRewarded,
}

/// FIFO of events waiting for presentation
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all queued events in emission order
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}
