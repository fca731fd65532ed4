//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod actions;
pub mod collision;
pub mod entity;
pub mod events;
pub mod player;
pub mod spawn;
pub mod state;
pub mod tick;

pub use actions::{RunActions, RunSnapshot};
pub use collision::{Contacts, resolve};
pub use entity::{Entity, EntityId, EntityKind, EntityStore, Rgb, palette};
pub use events::{EventQueue, GameEvent, HudTarget, SoundCue};
pub use player::{Control, Player};
pub use spawn::{Pattern, PatternStep, Spawned, Spawner, StepKind};
pub use state::{GameState, GameStatus, LetterSet, Locale};
pub use tick::{TickInput, World, tick};
