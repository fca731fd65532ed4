//! Per-frame simulation tick
//!
//! Core game loop: clock, controls, spawn bookkeeping, collisions, then the
//! drained event list for presentation.

use glam::Vec3;

use super::actions::RunActions;
use super::collision::resolve;
use super::entity::EntityStore;
use super::events::GameEvent;
use super::player::{Control, Player};
use super::spawn::Spawner;
use super::state::{GameState, GameStatus};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{lane_half, lane_to_x};

/// How far ahead the autopilot looks for threats
const AUTOPILOT_LOOKAHEAD: f32 = 18.0;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Control events since the previous tick, in arrival order
    pub controls: Vec<Control>,
    /// Player position from the presentation layer; built-in kinematics otherwise
    pub player_pos: Option<Vec3>,
    /// Idle/demo mode - autopilot dodges and jumps
    pub idle_mode: bool,
}

/// Everything a tick reads and writes
#[derive(Debug)]
pub struct World {
    pub state: GameState,
    pub entities: EntityStore,
    pub spawner: Spawner,
    pub player: Player,
}

impl World {
    /// Unsaved world starting at the menu
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_state(GameState::new(tuning), seed)
    }

    /// Wrap an existing state owner, e.g. one restored from storage
    pub fn with_state(state: GameState, seed: u64) -> Self {
        let spawner = Spawner::new(seed, state.tuning());
        Self {
            state,
            entities: EntityStore::new(),
            spawner,
            player: Player::default(),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }
}

/// Advance the world by `dt` seconds and return the events it produced
///
/// Deadlines run on the unclamped delta; movement uses a delta clamped to
/// `MAX_DT` so a stall cannot tunnel through a hit window.
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let raw_dt = dt.max(0.0);
    world.state.advance_clock(raw_dt);
    let dt = raw_dt.min(MAX_DT);

    let mut local_events = Vec::new();
    if world.state.status == GameStatus::Playing {
        let mut controls = if input.idle_mode {
            plan_autopilot(world)
        } else {
            Vec::new()
        };
        controls.extend_from_slice(&input.controls);
        for control in controls {
            apply_control(world, control, &mut local_events);
        }
    }
    world.player.clamp_lane(world.state.lane_count);

    let snap = world.state.snapshot();
    if world
        .spawner
        .observe(&snap, &mut world.entities, world.state.tuning())
    {
        world.player.reset();
    }

    if snap.status == GameStatus::Playing {
        if input.player_pos.is_none() {
            world.player.update(dt, &mut local_events);
        }
        let player_pos = input.player_pos.unwrap_or(world.player.pos);
        for event in local_events.drain(..) {
            world.state.emit(event);
        }

        let travel = world.spawner.advance(&snap, dt, &mut world.state);
        let contacts = resolve(&mut world.entities, player_pos, travel, dt, &mut world.state);
        if contacts.hits > 0 || contacts.portal_entered {
            log::debug!("Contacts {contacts:?} at distance {:.1}", world.spawner.distance());
        }

        let snap = world.state.snapshot();
        world
            .spawner
            .spawn(&snap, &mut world.entities, world.state.tuning());
    } else {
        world.player.idle(dt);
    }

    world.state.drain_events()
}

fn apply_control(world: &mut World, control: Control, events: &mut Vec<GameEvent>) {
    match control {
        Control::MoveLeft => world.player.steer(-1, world.state.lane_count),
        Control::MoveRight => world.player.steer(1, world.state.lane_count),
        Control::Jump => {
            world.player.jump(world.state.has_double_jump, events);
        }
        Control::UseAbility => world.state.activate_immortality(),
    }
}

/// Dodge toward the nearest clear lane, or jump when boxed in
fn plan_autopilot(world: &World) -> Vec<Control> {
    let half = lane_half(world.state.lane_count);
    let blocked = |lane: i32| {
        let x = lane_to_x(lane);
        world.entities.visible().any(|e| {
            e.kind.is_damaging()
                && (e.pos.x - x).abs() < HIT_WINDOW_X
                && e.pos.z < HIT_WINDOW_Z
                && e.pos.z > -AUTOPILOT_LOOKAHEAD
        })
    };

    let lane = world.player.lane;
    if !blocked(lane) {
        return Vec::new();
    }
    let clear = (1..=2 * half)
        .flat_map(|d| [lane - d, lane + d])
        .filter(|l| l.abs() <= half)
        .find(|&l| !blocked(l));
    match clear {
        Some(target) if target < lane => vec![Control::MoveLeft],
        Some(_) => vec![Control::MoveRight],
        None if !world.player.is_airborne() => vec![Control::Jump],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;

    fn playing_world(seed: u64) -> World {
        let mut world = World::new(seed, Tuning::default());
        assert!(world.state.start_game());
        world
    }

    #[test]
    fn test_menu_tick_spawns_nothing() {
        let mut world = World::new(1, Tuning::default());
        for _ in 0..20 {
            tick(&mut world, &TickInput::default(), 0.016);
        }
        assert!(world.entities.is_empty());
        assert_eq!(world.spawner.distance(), 0.0);
    }

    #[test]
    fn test_playing_fills_track_ahead() {
        let mut world = playing_world(3);
        for _ in 0..30 {
            tick(&mut world, &TickInput::default(), 0.016);
        }
        assert!(!world.entities.is_empty());
        assert!(world.spawner.distance() > 0.0);
        assert!(world.entities.iter().all(|e| e.pos.z < REMOVE_DISTANCE));
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut world = playing_world(3);
        let speed = world.state.speed;
        tick(&mut world, &TickInput::default(), 1.0);
        assert!((world.spawner.distance() - speed * MAX_DT).abs() < 1e-3);
        assert!((world.state.distance - speed * MAX_DT).abs() < 1e-3);
    }

    #[test]
    fn test_controls_ignored_outside_run() {
        let mut world = World::new(3, Tuning::default());
        let input = TickInput {
            controls: vec![Control::MoveRight, Control::Jump],
            ..Default::default()
        };
        let events = tick(&mut world, &input, 0.016);
        assert_eq!(world.player.lane, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_steering_and_jump_in_run() {
        let mut world = playing_world(3);
        let input = TickInput {
            controls: vec![Control::MoveRight, Control::MoveRight, Control::Jump],
            ..Default::default()
        };
        let events = tick(&mut world, &input, 0.016);
        assert_eq!(world.player.lane, 1);
        assert!(world.player.is_airborne());
        assert!(events.contains(&GameEvent::Sound(crate::sim::events::SoundCue::Jump)));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let mut a = playing_world(99);
        let mut b = playing_world(99);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..400 {
            assert_eq!(tick(&mut a, &input, 0.02), tick(&mut b, &input, 0.02));
        }
        let za: Vec<_> = a.entities.iter().map(|e| (e.kind, e.pos)).collect();
        let zb: Vec<_> = b.entities.iter().map(|e| (e.kind, e.pos)).collect();
        assert_eq!(za, zb);
    }

    #[test]
    fn test_level_up_places_portal_then_resumes() {
        let mut world = playing_world(5);
        tick(&mut world, &TickInput::default(), 0.016);
        for i in 0..5 {
            world.state.collect_letter(i);
        }
        assert!(world.state.is_level_transition);

        let events = tick(&mut world, &TickInput::default(), 0.016);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelUp { level: 2, .. })));
        assert!(
            world
                .entities
                .iter()
                .any(|e| e.kind == EntityKind::ShopPortal)
        );

        let mut resumed = false;
        for _ in 0..100 {
            let events = tick(&mut world, &TickInput::default(), 0.02);
            resumed |= events.contains(&GameEvent::LevelStarted { level: 2 });
        }
        assert!(resumed);
        assert!(!world.state.is_level_transition);
        assert!(world.state.speed > 0.0);
    }

    #[test]
    fn test_restart_resets_track() {
        let mut world = playing_world(8);
        for _ in 0..200 {
            tick(&mut world, &TickInput::default(), 0.02);
        }
        while world.state.status == GameStatus::Playing {
            world.state.take_damage();
        }
        tick(&mut world, &TickInput::default(), 0.02);
        assert!(world.state.restart_game());
        tick(&mut world, &TickInput::default(), 0.02);
        assert!(world.spawner.distance() < 5.0);
        assert!(world.entities.len() <= 2);
    }

    /// Cover some distance shielded, so the run is still on when it ends
    fn warm_up(world: &mut World) {
        world.state.has_immortality = true;
        world.state.activate_immortality();
        for _ in 0..260 {
            tick(world, &TickInput::default(), 0.02);
        }
        assert!(!world.state.is_immortality_active);
        assert_eq!(world.state.status, GameStatus::Playing);
        assert!(world.spawner.distance() > 100.0);
    }

    /// Kill the player inside a tick of a populated run
    fn die_mid_tick(world: &mut World) {
        warm_up(world);
        world.state.lives = 1;
        world.player.steer(1, world.state.lane_count);
        world.player.pos = Vec3::new(LANE_WIDTH, 0.0, 0.0);
        world
            .entities
            .spawn(EntityKind::Obstacle { color: 0 }, Vec3::new(LANE_WIDTH, 0.4, -0.5));
        let input = TickInput {
            player_pos: Some(world.player.pos),
            ..Default::default()
        };
        let events = tick(world, &input, 0.001);
        assert_eq!(world.state.status, GameStatus::GameOver);
        assert!(events.contains(&GameEvent::DamageTaken {
            lives_left: 0,
            intensity: 1.0,
        }));
    }

    #[test]
    fn test_restart_right_after_mid_tick_game_over() {
        let mut world = playing_world(8);
        die_mid_tick(&mut world);

        // the host restarts before the next tick ever sees GameOver
        assert!(world.state.restart_game());
        tick(&mut world, &TickInput::default(), 0.02);
        assert!(world.spawner.distance() < 5.0);
        assert!(world.state.distance < 5.0);
        assert!(world.entities.len() <= 2);
        assert_eq!(world.player.lane, 0);
    }

    #[test]
    fn test_menu_and_start_in_one_frame_resets_track() {
        let mut world = playing_world(12);
        warm_up(&mut world);

        world.state.return_to_menu();
        assert!(world.state.start_game());
        tick(&mut world, &TickInput::default(), 0.02);
        assert!(world.spawner.distance() < 5.0);
        assert!(world.entities.len() <= 2);
    }

    #[test]
    fn test_restart_after_victory_resets_track() {
        let mut world = playing_world(6);
        warm_up(&mut world);
        world.state.level = world.state.tuning().max_level;
        world.state.lane_count = Tuning::lane_count_for_level(world.state.level);
        for i in 0..5 {
            world.state.collect_letter(i);
        }
        assert_eq!(world.state.status, GameStatus::Victory);
        tick(&mut world, &TickInput::default(), 0.02);
        assert!(world.spawner.distance() > 100.0);
        let last_id = world.entities.iter().map(|e| e.id).max();
        assert!(last_id.is_some());

        assert!(world.state.restart_game());
        tick(&mut world, &TickInput::default(), 0.02);
        assert_eq!(world.state.status, GameStatus::Playing);
        assert_eq!(world.state.level, 10);
        assert!(world.spawner.distance() < 5.0);
        // only the first pattern of the new run is on the track
        assert!(world.entities.iter().all(|e| Some(e.id) > last_id));
        assert!(
            world
                .entities
                .iter()
                .all(|e| e.kind != EntityKind::ShopPortal)
        );
    }

    #[test]
    fn test_autopilot_run_keeps_invariants() {
        let mut world = playing_world(11);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut level = world.state.level;
        for _ in 0..3000 {
            tick(&mut world, &input, 1.0 / 60.0);
            assert!(world.state.lives <= world.state.max_lives);
            assert!(world.state.level >= level && world.state.level <= 10);
            level = world.state.level;
            if world.state.status == GameStatus::Shop {
                world.state.close_shop();
            }
        }
    }

    #[test]
    fn test_presentation_position_overrides_kinematics() {
        let mut world = playing_world(2);
        world
            .entities
            .spawn(EntityKind::Obstacle { color: 0 }, Vec3::new(LANE_WIDTH, 0.4, -0.5));
        let input = TickInput {
            player_pos: Some(Vec3::new(LANE_WIDTH, 0.0, 0.0)),
            ..Default::default()
        };
        let lives = world.state.lives;
        tick(&mut world, &input, 0.001);
        assert_eq!(world.state.lives, lives - 1);
    }
}
