//! Player kinematics: lane changes and jumps driven by control events

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, SoundCue};
use crate::consts::*;
use crate::lane_to_x;

/// Discrete control events from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    MoveLeft,
    MoveRight,
    Jump,
    UseAbility,
}

/// Downward acceleration giving a jump of `JUMP_HEIGHT` over `JUMP_DURATION`
pub const GRAVITY: f32 = 8.0 * JUMP_HEIGHT / (JUMP_DURATION * JUMP_DURATION);
/// Initial upward velocity of a jump
pub const JUMP_FORCE: f32 = 4.0 * JUMP_HEIGHT / JUMP_DURATION;
/// Second jump is slightly weaker
pub const DOUBLE_JUMP_FACTOR: f32 = 0.85;
/// Shake on touchdown
pub const LANDING_SHAKE: f32 = 0.15;

/// The player's vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Target lane, within `[-half, half]`
    pub lane: i32,
    /// World position; z stays 0
    pub pos: Vec3,
    pub vel_y: f32,
    pub jumps: u8,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: 0,
            pos: Vec3::ZERO,
            vel_y: 0.0,
            jumps: 0,
        }
    }
}

impl Player {
    pub fn is_airborne(&self) -> bool {
        self.jumps > 0
    }

    /// Shift one lane, clamped to the corridor
    pub fn steer(&mut self, dir: i32, lane_count: u32) {
        let half = crate::lane_half(lane_count);
        self.lane = (self.lane + dir).clamp(-half, half);
    }

    /// Re-clamp after the corridor changes width
    pub fn clamp_lane(&mut self, lane_count: u32) {
        self.steer(0, lane_count);
    }

    /// Start a jump; a second one mid-air only with the double-jump ability
    pub fn jump(&mut self, can_double_jump: bool, events: &mut Vec<GameEvent>) -> bool {
        if self.jumps == 0 {
            self.jumps = 1;
            self.vel_y = JUMP_FORCE;
            events.push(GameEvent::Sound(SoundCue::Jump));
            true
        } else if can_double_jump && self.jumps < 2 {
            self.jumps = 2;
            self.vel_y = JUMP_FORCE * DOUBLE_JUMP_FACTOR;
            events.push(GameEvent::Sound(SoundCue::DoubleJump));
            true
        } else {
            false
        }
    }

    /// Integrate one step of an active run
    pub fn update(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        let target_x = lane_to_x(self.lane);
        self.pos.x += (target_x - self.pos.x) * (dt * LANE_EASE_RATE).min(1.0);

        if self.is_airborne() {
            self.pos.y += self.vel_y * dt;
            self.vel_y -= GRAVITY * dt;
            if self.pos.y <= 0.0 {
                self.pos.y = 0.0;
                self.vel_y = 0.0;
                self.jumps = 0;
                events.push(GameEvent::Shake {
                    intensity: LANDING_SHAKE,
                });
            }
        }
    }

    /// Ease back to the showroom spot while no run is active
    pub fn idle(&mut self, dt: f32) {
        let t = (dt * IDLE_EASE_RATE).min(1.0);
        self.pos.x += (0.0 - self.pos.x) * t;
        self.pos.y += (0.0 - self.pos.y) * t;
        self.vel_y = 0.0;
        self.jumps = 0;
        self.lane = 0;
    }

    /// Snap to the start line for a new run
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
