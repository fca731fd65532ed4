//! Run state, economy and the game status machine
//!
//! `GameState` is the single owner of score, lives, energy, level and the
//! shop inventory. Everything else mutates it through the actions below.
//! Timed effects (level transition, immortality) are deadlines on a sim
//! clock advanced by [`GameState::advance_clock`], never real timers.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::actions::{RunActions, RunSnapshot};
use super::events::{EventQueue, GameEvent, HudTarget};
use crate::consts::BONUS_WORD;
use crate::persistence::{BlobStore, SaveData};
use crate::shop::{CarId, ShopItem};
use crate::tuning::Tuning;

/// Top-level game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Menu,
    /// Active run (possibly mid level-transition)
    Playing,
    /// Shop overlay, entered from Menu or from a running level
    Shop,
    GameOver,
    /// Final level cleared
    Victory,
}

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Ko,
}

/// Collected bonus-letter indices (subset of 0..5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LetterSet(u8);

impl LetterSet {
    /// Number of letters in the bonus word
    pub const SIZE: u8 = BONUS_WORD.len() as u8;

    /// Add an index; false if out of range or already present
    pub fn insert(&mut self, index: u8) -> bool {
        if index >= Self::SIZE || self.contains(index) {
            return false;
        }
        self.0 |= 1 << index;
        true
    }

    pub fn contains(&self, index: u8) -> bool {
        index < Self::SIZE && self.0 & (1 << index) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == Self::SIZE as usize
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Indices still missing, ascending
    pub fn missing(&self) -> impl Iterator<Item = u8> + '_ {
        (0..Self::SIZE).filter(|i| !self.contains(*i))
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..Self::SIZE).filter(|i| self.contains(*i))
    }
}

/// Complete run + economy state
pub struct GameState {
    pub status: GameStatus,
    pub locale: Locale,
    /// Credits; doubles as the shop currency
    pub score: u64,
    pub high_score: u64,
    pub lives: u32,
    pub max_lives: u32,
    pub speed: f32,
    pub collected_letters: LetterSet,
    pub level: u32,
    pub lane_count: u32,
    pub gems_collected: u32,
    pub distance: f32,

    // Energy
    pub energy: i64,
    pub is_premium: bool,

    // Level transition
    pub is_level_transition: bool,

    // Abilities
    pub has_double_jump: bool,
    pub has_immortality: bool,
    pub is_immortality_active: bool,

    // Vehicles
    pub owned_cars: BTreeSet<CarId>,
    pub equipped_car: CarId,
    pub preview_car: Option<CarId>,

    // Attendance / tutorial
    pub show_attendance_toast: bool,
    pub has_completed_tutorial: bool,
    pub last_attendance_date: Option<String>,

    /// Bumped on every run start and menu return
    run_generation: u32,
    /// Sim clock (seconds since creation)
    clock: f32,
    transition_ends_at: Option<f32>,
    /// Speed applied when the transition ends
    resume_speed: f32,
    immortality_ends_at: Option<f32>,

    tuning: Tuning,
    events: EventQueue,
    store: Option<Box<dyn BlobStore>>,
    last_saved: Option<SaveData>,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("status", &self.status)
            .field("score", &self.score)
            .field("high_score", &self.high_score)
            .field("lives", &self.lives)
            .field("max_lives", &self.max_lives)
            .field("speed", &self.speed)
            .field("level", &self.level)
            .field("lane_count", &self.lane_count)
            .field("collected_letters", &self.collected_letters)
            .field("energy", &self.energy)
            .field("is_premium", &self.is_premium)
            .field("is_level_transition", &self.is_level_transition)
            .field("run_generation", &self.run_generation)
            .field("clock", &self.clock)
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Fresh state of a first launch, not backed by storage
    pub fn new(tuning: Tuning) -> Self {
        let save = SaveData::fresh(&tuning);
        Self::from_save(save, tuning)
    }

    /// Restore persisted fields; everything else starts at its default
    pub fn from_save(save: SaveData, tuning: Tuning) -> Self {
        Self {
            status: GameStatus::Menu,
            locale: save.locale,
            score: save.score,
            high_score: save.high_score,
            lives: save.max_lives,
            max_lives: save.max_lives,
            speed: 0.0,
            collected_letters: LetterSet::default(),
            level: 1,
            lane_count: Tuning::lane_count_for_level(1),
            gems_collected: 0,
            distance: 0.0,
            energy: save.energy,
            is_premium: save.is_premium,
            is_level_transition: false,
            has_double_jump: save.has_double_jump,
            has_immortality: save.has_immortality,
            is_immortality_active: false,
            owned_cars: save.owned_cars,
            equipped_car: save.equipped_car_id,
            preview_car: None,
            show_attendance_toast: false,
            has_completed_tutorial: save.has_completed_tutorial,
            last_attendance_date: save.last_attendance_date,
            run_generation: 0,
            clock: 0.0,
            transition_ends_at: None,
            resume_speed: 0.0,
            immortality_ends_at: None,
            tuning,
            events: EventQueue::new(),
            store: None,
            last_saved: None,
        }
    }

    /// Load from `store` and write back to it after every mutation
    pub fn with_store(store: Box<dyn BlobStore>, tuning: Tuning) -> Self {
        let save = SaveData::load_or_fresh(store.as_ref(), &tuning);
        let mut state = Self::from_save(save.clone(), tuning);
        state.last_saved = Some(save);
        state.store = Some(store);
        state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Seconds on the sim clock
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Identifies the current run; changes whenever the track must start over
    pub fn run_generation(&self) -> u32 {
        self.run_generation
    }

    /// Persisted subset of the current state
    pub fn save_data(&self) -> SaveData {
        SaveData {
            score: self.score,
            high_score: self.high_score,
            max_lives: self.max_lives,
            has_double_jump: self.has_double_jump,
            has_immortality: self.has_immortality,
            owned_cars: self.owned_cars.clone(),
            equipped_car_id: self.equipped_car,
            energy: self.energy,
            locale: self.locale,
            is_premium: self.is_premium,
            has_completed_tutorial: self.has_completed_tutorial,
            last_attendance_date: self.last_attendance_date.clone(),
        }
    }

    /// Write the save blob if any persisted field changed
    ///
    /// A failed write is logged and retried on the next mutation; the
    /// in-memory state is kept either way.
    fn persist(&mut self) {
        let data = self.save_data();
        if self.last_saved.as_ref() == Some(&data) {
            return;
        }
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match data.store(store.as_mut()) {
            Ok(()) => self.last_saved = Some(data),
            Err(e) => log::warn!("Save failed, keeping in-memory state: {e}"),
        }
    }

    /// Drain queued events in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    fn set_status(&mut self, to: GameStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        log::info!("Status {from:?} -> {to:?}");
        self.events.push(GameEvent::StatusChanged { from, to });
    }

    /// A run is underway (moving, or frozen mid level-transition)
    pub fn is_run_in_progress(&self) -> bool {
        self.speed > 0.0 || self.is_level_transition
    }

    /// Run start is blocked without energy unless premium
    pub fn can_start_run(&self) -> bool {
        self.is_premium || self.energy > 0
    }

    // === Run lifecycle ===

    /// Start a new run at level 1
    pub fn start_game(&mut self) -> bool {
        self.begin_run(1)
    }

    /// Start a new run at the current level
    pub fn restart_game(&mut self) -> bool {
        self.begin_run(self.level)
    }

    fn begin_run(&mut self, level: u32) -> bool {
        if !self.can_start_run() {
            log::info!("Run refused: no energy");
            return false;
        }
        if !self.is_premium {
            self.energy -= 1;
            self.events.push(GameEvent::Pulse {
                target: HudTarget::Energy,
            });
        }
        self.lives = self.max_lives;
        self.speed = self.tuning.level_base_speed(level);
        self.collected_letters.clear();
        self.level = level;
        self.lane_count = Tuning::lane_count_for_level(level);
        self.gems_collected = 0;
        self.distance = 0.0;
        self.is_immortality_active = false;
        self.immortality_ends_at = None;
        self.is_level_transition = false;
        self.transition_ends_at = None;
        self.preview_car = None;
        self.run_generation = self.run_generation.wrapping_add(1);
        self.set_status(GameStatus::Playing);
        self.persist();
        true
    }

    /// Abandon whatever is on screen and show the menu
    pub fn return_to_menu(&mut self) {
        self.speed = 0.0;
        self.is_level_transition = false;
        self.transition_ends_at = None;
        self.is_immortality_active = false;
        self.immortality_ends_at = None;
        self.preview_car = None;
        self.run_generation = self.run_generation.wrapping_add(1);
        self.set_status(GameStatus::Menu);
    }

    // === Damage / scoring ===

    pub fn take_damage(&mut self) {
        if self.is_immortality_active || self.status != GameStatus::Playing {
            return;
        }
        if self.lives > 1 {
            self.lives -= 1;
            self.events.push(GameEvent::DamageTaken {
                lives_left: self.lives,
                intensity: 0.5,
            });
        } else {
            self.lives = 0;
            self.events.push(GameEvent::DamageTaken {
                lives_left: 0,
                intensity: 1.0,
            });
            self.high_score = self.high_score.max(self.score);
            self.speed = 0.0;
            self.set_status(GameStatus::GameOver);
            self.persist();
        }
    }

    pub fn add_score(&mut self, amount: u64) {
        self.score += amount;
        self.persist();
    }

    pub fn collect_gem(&mut self, value: u64) {
        self.score += value;
        self.gems_collected += 1;
        self.events.push(GameEvent::Pulse {
            target: HudTarget::Score,
        });
        self.persist();
    }

    /// Collect a bonus letter; false when the pickup is refused
    ///
    /// Duplicates, bad indices and pickups during a level transition are
    /// refused, so a full word always leads to exactly one level-up.
    pub fn collect_letter(&mut self, index: u8) -> bool {
        if self.is_level_transition || !self.collected_letters.insert(index) {
            return false;
        }
        self.speed += self.tuning.base_speed * self.tuning.letter_speed_bonus;
        self.events.push(GameEvent::Pulse {
            target: HudTarget::Bonus,
        });

        if !self.collected_letters.is_full() {
            return true;
        }
        if self.level < self.tuning.max_level {
            self.advance_level();
        } else {
            self.score += self.tuning.victory_bonus;
            self.high_score = self.high_score.max(self.score);
            self.speed = 0.0;
            self.set_status(GameStatus::Victory);
            self.persist();
        }
        true
    }

    /// Move to the next level behind a short freeze
    ///
    /// Refused while a previous transition is still pending or at the cap.
    pub fn advance_level(&mut self) -> bool {
        if self.is_level_transition || self.level >= self.tuning.max_level {
            log::debug!("advance_level ignored at level {}", self.level);
            return false;
        }
        self.resume_speed = self.speed + self.tuning.base_speed * self.tuning.level_speed_bonus;
        self.is_level_transition = true;
        self.transition_ends_at = Some(self.clock + self.tuning.transition_secs);
        self.speed = 0.0;
        self.level += 1;
        self.lane_count = Tuning::lane_count_for_level(self.level);
        self.collected_letters.clear();
        log::info!("Level {} ({} lanes)", self.level, self.lane_count);
        self.events.push(GameEvent::LevelUp {
            level: self.level,
            lane_count: self.lane_count,
        });
        true
    }

    /// Advance the sim clock and fire any due deadlines
    pub fn advance_clock(&mut self, dt: f32) {
        self.clock += dt;

        if let Some(end) = self.transition_ends_at
            && self.clock >= end
        {
            self.transition_ends_at = None;
            self.is_level_transition = false;
            if matches!(self.status, GameStatus::Playing | GameStatus::Shop) {
                self.speed = self.resume_speed;
            }
            self.events.push(GameEvent::LevelStarted { level: self.level });
        }

        if let Some(end) = self.immortality_ends_at
            && self.clock >= end
        {
            self.immortality_ends_at = None;
            self.is_immortality_active = false;
            self.events
                .push(GameEvent::ImmortalityChanged { active: false });
        }
    }

    // === Shop ===

    pub fn open_shop(&mut self) {
        self.preview_car = Some(self.equipped_car);
        self.set_status(GameStatus::Shop);
    }

    pub fn close_shop(&mut self) {
        if self.status != GameStatus::Shop {
            return;
        }
        self.preview_car = None;
        let to = if self.is_run_in_progress() {
            GameStatus::Playing
        } else {
            GameStatus::Menu
        };
        self.set_status(to);
    }

    /// Buy `item` for `cost` credits
    ///
    /// Refused when credits are short or the vehicle is already owned.
    pub fn buy_item(&mut self, item: ShopItem, cost: u64) -> bool {
        if self.score < cost {
            return false;
        }
        if let ShopItem::Car(car) = item
            && self.owned_cars.contains(&car)
        {
            return false;
        }
        self.score -= cost;
        match item {
            ShopItem::Car(car) => {
                self.owned_cars.insert(car);
                self.equipped_car = car;
                self.preview_car = Some(car);
            }
            ShopItem::DoubleJump => self.has_double_jump = true,
            ShopItem::MaxLife => {
                self.max_lives += 1;
                self.lives = (self.lives + 1).min(self.max_lives);
            }
            ShopItem::Heal => self.lives = (self.lives + 1).min(self.max_lives),
            ShopItem::Immortal => self.has_immortality = true,
        }
        log::debug!("Bought {item} for {cost}");
        self.events.push(GameEvent::Pulse {
            target: HudTarget::Score,
        });
        self.persist();
        true
    }

    /// Premium unlock: credits, unlimited energy, every vehicle
    pub fn buy_premium(&mut self) {
        self.is_premium = true;
        self.score += self.tuning.premium_bonus_credits;
        self.energy = self.energy.max(self.tuning.premium_energy);
        self.owned_cars.extend(CarId::ALL);
        self.events.push(GameEvent::Pulse {
            target: HudTarget::Score,
        });
        self.persist();
    }

    pub fn watch_ad(&mut self) {
        self.energy += self.tuning.ad_reward_energy;
        self.events.push(GameEvent::Pulse {
            target: HudTarget::Energy,
        });
        self.persist();
    }

    /// Equip an owned vehicle
    pub fn equip_car(&mut self, car: CarId) -> bool {
        if !self.owned_cars.contains(&car) {
            return false;
        }
        self.equipped_car = car;
        self.preview_car = Some(car);
        self.persist();
        true
    }

    pub fn set_preview_car(&mut self, car: Option<CarId>) {
        self.preview_car = car;
    }

    // === Abilities ===

    pub fn activate_immortality(&mut self) {
        if !self.has_immortality || self.is_immortality_active {
            return;
        }
        self.is_immortality_active = true;
        self.immortality_ends_at = Some(self.clock + self.tuning.immortality_secs);
        self.events
            .push(GameEvent::ImmortalityChanged { active: true });
    }

    // === Meta ===

    /// Daily login reward, once per `today` key
    pub fn check_attendance(&mut self, today: &str) -> bool {
        if self.last_attendance_date.as_deref() == Some(today) {
            return false;
        }
        self.last_attendance_date = Some(today.to_string());
        self.score += self.tuning.attendance_credits;
        self.energy += self.tuning.attendance_energy;
        self.show_attendance_toast = true;
        self.events.push(GameEvent::AttendanceRewarded);
        self.persist();
        true
    }

    pub fn hide_attendance_toast(&mut self) {
        self.show_attendance_toast = false;
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        self.persist();
    }

    pub fn complete_tutorial(&mut self) {
        self.has_completed_tutorial = true;
        self.persist();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }
}

impl RunActions for GameState {
    fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            status: self.status,
            speed: self.speed,
            level: self.level,
            lane_count: self.lane_count,
            collected_letters: self.collected_letters,
            is_level_transition: self.is_level_transition,
            run_generation: self.run_generation,
        }
    }

    fn take_damage(&mut self) {
        GameState::take_damage(self);
    }

    fn collect_gem(&mut self, value: u64) {
        GameState::collect_gem(self, value);
    }

    fn collect_letter(&mut self, index: u8) -> bool {
        GameState::collect_letter(self, index)
    }

    fn open_shop(&mut self) {
        GameState::open_shop(self);
    }

    fn record_distance(&mut self, distance: f32) {
        self.set_distance(distance);
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
