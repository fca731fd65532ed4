//! Procedural spawn engine
//!
//! Keeps the track filled up to `SPAWN_DISTANCE` ahead of the player. One
//! decision per tick, in priority order: a due bonus letter, the head of
//! the pattern queue, or a fresh level-dependent pattern.

use std::collections::VecDeque;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::actions::{RunActions, RunSnapshot};
use super::entity::{EntityKind, EntityStore, Rgb, palette};
use super::state::GameStatus;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{lane_half, lane_to_x};

/// Kinds a queued pattern step can materialize as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Obstacle,
    Gem,
}

/// One pending spawn of a multi-step pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternStep {
    pub kind: StepKind,
    pub lane: i32,
    /// Distance multiplier applied to the level's base gap
    pub delay: f32,
    /// Fixed color; picked at spawn time when `None`
    pub color: Option<Rgb>,
}

impl PatternStep {
    fn new(kind: StepKind, lane: i32, delay: f32) -> Self {
        Self {
            kind,
            lane,
            delay,
            color: None,
        }
    }
}

/// Recognizable arrangements the engine can lay down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Level 1: blockers on both edges, gem in the middle
    Tunnel,
    /// Level 1: alternating blocker/gem zig-zag
    Slalom,
    /// Level 1: three gems curving across, then a blocker
    SCurve,
    /// Level 1: one obstacle in a random lane
    SingleObstacle,
    /// Level 2+: symmetric blockers closing in from the edges
    Pincer,
    /// Level 2+: three gems spread across the corridor
    Cluster,
    /// Level 2+: a full row of blockers with 1-2 gaps and a gem behind one
    Wall,
    /// Level 2+: one enemy, obstacle or gem
    SingleRandom,
}

/// What a spawn decision produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawned {
    Letter { index: u8 },
    Queued,
    Pattern(Pattern),
}

/// Spawn bookkeeping for the current run
#[derive(Debug, Clone)]
pub struct Spawner {
    distance: f32,
    next_letter_distance: f32,
    queue: VecDeque<PatternStep>,
    prev_generation: Option<u32>,
    prev_level: u32,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            distance: 0.0,
            next_letter_distance: tuning.letter_interval(1),
            queue: VecDeque::new(),
            prev_generation: None,
            prev_level: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Distance traveled this run
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn next_letter_distance(&self) -> f32 {
        self.next_letter_distance
    }

    /// Pending pattern steps, head first
    pub fn queue(&self) -> impl Iterator<Item = &PatternStep> {
        self.queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    fn reset(&mut self, store: &mut EntityStore, tuning: &Tuning) {
        store.clear();
        self.queue.clear();
        self.distance = 0.0;
        self.next_letter_distance = tuning.letter_interval(1);
    }

    /// React to run and level changes since the previous tick
    ///
    /// A new run generation (start, restart or menu return) wipes the track,
    /// however many status changes happened in between; a level-up trims far
    /// entities and places the shop portal. Returns true when the track was
    /// reset.
    pub fn observe(
        &mut self,
        snap: &RunSnapshot,
        store: &mut EntityStore,
        tuning: &Tuning,
    ) -> bool {
        let new_run = self.prev_generation != Some(snap.run_generation);
        let leveled_up =
            snap.status == GameStatus::Playing && snap.level != self.prev_level && snap.level > 1;

        if new_run {
            log::debug!(
                "Track reset for run {} ({:?})",
                snap.run_generation,
                snap.status
            );
            self.reset(store, tuning);
        } else if leveled_up {
            store.retain(|e| e.pos.z > LEVEL_UP_KEEP_Z);
            self.queue.clear();
            store.spawn(EntityKind::ShopPortal, Vec3::new(0.0, 0.0, PORTAL_SPAWN_Z));
            self.next_letter_distance =
                self.distance - SPAWN_DISTANCE + tuning.letter_interval(snap.level);
            log::debug!(
                "Level {} track prepared, next letter at {:.0}",
                snap.level,
                self.next_letter_distance
            );
        }

        self.prev_generation = Some(snap.run_generation);
        self.prev_level = snap.level;
        new_run
    }

    /// Advance distance bookkeeping; returns this tick's travel
    pub fn advance(&mut self, snap: &RunSnapshot, dt: f32, run: &mut impl RunActions) -> f32 {
        let step = snap.speed * dt;
        self.distance += step;
        run.record_distance(self.distance);
        step
    }

    /// Make at most one spawn decision for this tick
    pub fn spawn(
        &mut self,
        snap: &RunSnapshot,
        store: &mut EntityStore,
        tuning: &Tuning,
    ) -> Option<Spawned> {
        if snap.status != GameStatus::Playing || snap.is_level_transition {
            return None;
        }
        let frontier = store.frontier_z();
        if frontier <= -SPAWN_DISTANCE {
            return None;
        }
        let gap = Tuning::base_gap(snap.level);

        if self.distance >= self.next_letter_distance && !snap.collected_letters.is_full() {
            let missing: Vec<u8> = snap.collected_letters.missing().collect();
            let index = missing[self.rng.random_range(0..missing.len())];
            let lane = self.random_lane(snap.lane_count);
            store.spawn(
                EntityKind::Letter { index },
                Vec3::new(lane_to_x(lane), LETTER_Y, frontier - gap),
            );
            self.next_letter_distance += tuning.letter_interval(snap.level);
            log::debug!("Letter {} in lane {}", BONUS_WORD[index as usize], lane);
            return Some(Spawned::Letter { index });
        }

        if let Some(step) = self.queue.pop_front() {
            self.materialize(step, frontier - gap * step.delay, store);
            return Some(Spawned::Queued);
        }

        let pattern = self.choose_pattern(snap.level);
        self.place_pattern(pattern, snap, frontier, store);
        Some(Spawned::Pattern(pattern))
    }

    /// Uniform lane in `[-half, half]`
    pub fn random_lane(&mut self, lane_count: u32) -> i32 {
        let half = lane_half(lane_count);
        self.rng.random_range(-half..=half)
    }

    fn random_obstacle_color(&mut self) -> Rgb {
        palette::OBSTACLE[self.rng.random_range(0..palette::OBSTACLE.len())]
    }

    fn materialize(&mut self, step: PatternStep, z: f32, store: &mut EntityStore) {
        let x = lane_to_x(step.lane);
        match step.kind {
            StepKind::Obstacle => {
                let color = step.color.unwrap_or_else(|| self.random_obstacle_color());
                store.spawn(EntityKind::Obstacle { color }, Vec3::new(x, OBSTACLE_Y, z));
            }
            StepKind::Gem => {
                let color = step.color.unwrap_or(palette::CYAN);
                store.spawn(
                    EntityKind::Gem {
                        color,
                        points: GEM_POINTS,
                    },
                    Vec3::new(x, PICKUP_Y, z),
                );
            }
        }
    }

    /// Weighted pattern pick for a level
    pub fn choose_pattern(&mut self, level: u32) -> Pattern {
        let roll: f64 = self.rng.random();
        if level == 1 {
            match roll {
                r if r < 0.20 => Pattern::Tunnel,
                r if r < 0.45 => Pattern::Slalom,
                r if r < 0.70 => Pattern::SCurve,
                _ => Pattern::SingleObstacle,
            }
        } else {
            match roll {
                r if r < 0.20 => Pattern::Pincer,
                r if r < 0.35 => Pattern::Cluster,
                r if r < 0.75 => Pattern::Wall,
                _ => Pattern::SingleRandom,
            }
        }
    }

    /// Lay down `pattern` relative to the current frontier
    ///
    /// Immediate parts land one base gap ahead of the frontier; the rest is
    /// queued and drained one step per eligible tick.
    pub fn place_pattern(
        &mut self,
        pattern: Pattern,
        snap: &RunSnapshot,
        frontier: f32,
        store: &mut EntityStore,
    ) {
        use StepKind::{Gem, Obstacle};

        let spawn_z = frontier - Tuning::base_gap(snap.level);
        let half = lane_half(snap.lane_count);

        match pattern {
            Pattern::Tunnel => {
                for lane in [-half, half] {
                    store.spawn(
                        EntityKind::Obstacle {
                            color: palette::YELLOW,
                        },
                        Vec3::new(lane_to_x(lane), OBSTACLE_Y, spawn_z),
                    );
                }
                self.queue.push_back(PatternStep::new(Gem, 0, 0.5));
            }
            Pattern::Slalom => {
                self.queue.extend([
                    PatternStep::new(Obstacle, -1, 1.0),
                    PatternStep::new(Gem, 1, 1.5),
                    PatternStep::new(Obstacle, 1, 2.5),
                    PatternStep::new(Gem, -1, 3.0),
                ]);
            }
            Pattern::SCurve => {
                self.queue.extend([
                    PatternStep::new(Gem, -1, 0.8),
                    PatternStep::new(Gem, 0, 1.3),
                    PatternStep::new(Gem, 1, 1.8),
                    PatternStep::new(Obstacle, -1, 2.5),
                ]);
            }
            Pattern::SingleObstacle => {
                let lane = self.random_lane(snap.lane_count);
                store.spawn(
                    EntityKind::Obstacle {
                        color: palette::GREEN,
                    },
                    Vec3::new(lane_to_x(lane), OBSTACLE_Y, spawn_z),
                );
            }
            Pattern::Pincer => {
                self.queue.extend([
                    PatternStep::new(Obstacle, -half, 1.0),
                    PatternStep::new(Obstacle, half, 1.0),
                    PatternStep::new(Obstacle, -half + 1, 1.5),
                    PatternStep::new(Obstacle, half - 1, 1.5),
                ]);
            }
            Pattern::Cluster => {
                self.queue.extend([
                    PatternStep::new(Gem, half, 1.0),
                    PatternStep::new(Gem, -half, 1.2),
                    PatternStep::new(Gem, 0, 1.6),
                ]);
            }
            Pattern::Wall => {
                let gaps = self.pick_gaps(snap.lane_count);
                for lane in (-half..=half).filter(|l| !gaps.contains(l)) {
                    store.spawn(
                        EntityKind::Obstacle {
                            color: palette::YELLOW,
                        },
                        Vec3::new(lane_to_x(lane), OBSTACLE_Y, spawn_z),
                    );
                }
                self.queue.push_back(PatternStep::new(Gem, gaps[0], 2.8));
            }
            Pattern::SingleRandom => {
                let lane = self.random_lane(snap.lane_count);
                let x = lane_to_x(lane);
                let kind = if self.rng.random_bool(Tuning::enemy_chance(snap.level)) {
                    EntityKind::Enemy { has_fired: false }
                } else if self.rng.random_bool(0.7) {
                    EntityKind::Obstacle {
                        color: self.random_obstacle_color(),
                    }
                } else {
                    EntityKind::Gem {
                        color: palette::CYAN,
                        points: GEM_POINTS,
                    }
                };
                let y = match kind {
                    EntityKind::Enemy { .. } => ENEMY_Y,
                    EntityKind::Obstacle { .. } => OBSTACLE_Y,
                    _ => PICKUP_Y,
                };
                store.spawn(kind, Vec3::new(x, y, spawn_z));
            }
        }
        log::debug!("Pattern {pattern:?} at z {spawn_z:.1}, queue {}", self.queue.len());
    }

    /// Distinct safe lanes for a wall: one on narrow corridors, else two
    fn pick_gaps(&mut self, lane_count: u32) -> Vec<i32> {
        let required = if lane_count <= 3 { 1 } else { 2 };
        let mut gaps = Vec::with_capacity(required);
        while gaps.len() < required {
            let lane = self.random_lane(lane_count);
            if !gaps.contains(&lane) {
                gaps.push(lane);
            }
        }
        gaps
    }
}
