//! Bonus Runner - lane-based endless runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawn patterns, collisions, run state)
//! - `shop`: Vehicle and ability catalog
//! - `tuning`: Data-driven game balance
//! - `persistence`: Durable key-value save blob
//! - `platform`: Browser/native platform abstraction

pub mod error;
pub mod persistence;
pub mod platform;
pub mod shop;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, StorageError};
pub use persistence::{BlobStore, MemoryStore, SaveData};
pub use shop::{CarId, ShopItem};
pub use sim::{GameEvent, GameStatus, TickInput, World, tick};
pub use tuning::Tuning;

/// Game configuration constants
///
/// Hit windows and envelopes are tuning values, not derived from geometry.
pub mod consts {
    /// Upper bound on a single simulation step (seconds)
    pub const MAX_DT: f32 = 0.05;

    /// Corridor geometry
    pub const LANE_WIDTH: f32 = 2.2;
    /// Look-ahead the spawn frontier is kept filled to
    pub const SPAWN_DISTANCE: f32 = 220.0;
    /// Entities past this z (behind the player) are pruned
    pub const REMOVE_DISTANCE: f32 = 25.0;
    /// Frontier assumed when nothing is on the track
    pub const EMPTY_FRONTIER_Z: f32 = -20.0;

    /// Player jump arc
    pub const JUMP_HEIGHT: f32 = 2.5;
    pub const JUMP_DURATION: f32 = 0.6;
    /// Lateral easing rate toward the target lane
    pub const LANE_EASE_RATE: f32 = 15.0;
    /// Easing rate back to the origin outside of a run
    pub const IDLE_EASE_RATE: f32 = 5.0;

    /// Collision windows around the player
    pub const HIT_WINDOW_Z: f32 = 1.4;
    pub const HIT_WINDOW_X: f32 = 1.0;
    /// Player vertical extent used against damaging kinds
    pub const PLAYER_HEIGHT: f32 = 1.4;
    /// Collectible vertical test: |y - (player.y + offset)| < reach
    pub const COLLECT_Y_OFFSET: f32 = 0.8;
    pub const COLLECT_Y_REACH: f32 = 1.9;
    /// Portal triggers when within this longitudinal distance
    pub const PORTAL_TRIGGER_Z: f32 = 2.5;

    /// Damage envelopes (top, bottom) per kind
    pub const OBSTACLE_TOP: f32 = 1.1;
    pub const ENEMY_TOP: f32 = 2.1;
    pub const PROJECTILE_TOP: f32 = 1.5;
    pub const PROJECTILE_BOTTOM: f32 = 0.5;

    /// Enemy fire
    pub const ENEMY_FIRE_Z: f32 = -100.0;
    pub const PROJECTILE_SPEED: f32 = 45.0;

    /// Spawn heights
    pub const OBSTACLE_Y: f32 = 0.4;
    pub const PICKUP_Y: f32 = 1.2;
    pub const LETTER_Y: f32 = 1.0;
    pub const ENEMY_Y: f32 = 1.5;
    pub const PROJECTILE_Y: f32 = 1.0;

    /// Level-up housekeeping
    pub const LEVEL_UP_KEEP_Z: f32 = -80.0;
    pub const PORTAL_SPAWN_Z: f32 = -120.0;

    /// Default gem score
    pub const GEM_POINTS: u64 = 50;
    /// Letters in the bonus word
    pub const BONUS_WORD: [char; 5] = ['B', 'O', 'N', 'U', 'S'];
}

/// Lane index range for a lane count: `[-half, half]`
#[inline]
pub fn lane_half(lane_count: u32) -> i32 {
    (lane_count / 2) as i32
}

/// World x-coordinate of a lane centre
#[inline]
pub fn lane_to_x(lane: i32) -> f32 {
    lane as f32 * consts::LANE_WIDTH
}
