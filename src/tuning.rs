//! Data-driven game balance
//!
//! Every economy reward and difficulty curve lives here so a balance pass
//! only touches a JSON file. Missing fields fall back to the stock values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Highest level a run can reach
pub const LEVEL_CAP: u32 = 10;

/// Balance values consumed by the state machine and spawn engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    /// Forward speed at level 1 (units/s)
    pub base_speed: f32,
    /// Speed gained per collected letter, as a fraction of base speed
    pub letter_speed_bonus: f32,
    /// Speed gained on level-up, as a fraction of base speed
    pub level_speed_bonus: f32,
    /// Per-level step used to derive a restart speed for the current level
    pub restart_speed_step: f32,

    // === Progression ===
    pub max_level: u32,
    /// Level-transition freeze (seconds)
    pub transition_secs: f32,
    /// Immortality window (seconds)
    pub immortality_secs: f32,
    /// Distance between bonus letters at level 1
    pub base_letter_interval: f32,
    /// Multiplicative growth of the letter interval per level
    pub letter_interval_growth: f32,

    // === Economy ===
    pub starting_lives: u32,
    pub starting_credits: u64,
    pub initial_energy: i64,
    pub ad_reward_energy: i64,
    pub attendance_credits: u64,
    pub attendance_energy: i64,
    pub premium_bonus_credits: u64,
    /// Energy shown to premium players (effectively unlimited)
    pub premium_energy: i64,
    pub victory_bonus: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            // Speed
            base_speed: 52.0,
            letter_speed_bonus: 0.025,
            level_speed_bonus: 0.12,
            restart_speed_step: 0.15,

            // Progression
            max_level: LEVEL_CAP,
            transition_secs: 1.5,
            immortality_secs: 5.0,
            base_letter_interval: 350.0,
            letter_interval_growth: 1.3,

            // Economy
            starting_lives: 3,
            starting_credits: 3000,
            initial_energy: 30,
            ad_reward_energy: 10,
            attendance_credits: 1000,
            attendance_energy: 10,
            premium_bonus_credits: 50_000,
            premium_energy: 999,
            victory_bonus: 20_000,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate ranges
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        fn out_of_range(field: &'static str, value: impl ToString) -> ConfigError {
            ConfigError::OutOfRange {
                field,
                value: value.to_string(),
            }
        }

        if !(1..=LEVEL_CAP).contains(&self.max_level) {
            return Err(out_of_range("max_level", self.max_level));
        }
        if self.base_speed <= 0.0 {
            return Err(out_of_range("base_speed", self.base_speed));
        }
        if self.base_letter_interval <= 0.0 {
            return Err(out_of_range("base_letter_interval", self.base_letter_interval));
        }
        if self.letter_interval_growth <= 0.0 {
            return Err(out_of_range(
                "letter_interval_growth",
                self.letter_interval_growth,
            ));
        }
        if self.transition_secs < 0.0 {
            return Err(out_of_range("transition_secs", self.transition_secs));
        }
        if self.immortality_secs < 0.0 {
            return Err(out_of_range("immortality_secs", self.immortality_secs));
        }
        if self.starting_lives == 0 {
            return Err(out_of_range("starting_lives", self.starting_lives));
        }
        Ok(())
    }

    /// Base speed a run has when (re)started at `level`
    pub fn level_base_speed(&self, level: u32) -> f32 {
        self.base_speed + (level.saturating_sub(1)) as f32 * self.base_speed * self.restart_speed_step
    }

    /// Distance between bonus letters at `level`
    pub fn letter_interval(&self, level: u32) -> f32 {
        self.base_letter_interval
            * self
                .letter_interval_growth
                .powi(level.saturating_sub(1) as i32)
    }

    /// Lane count for a level: 3, 5, 7, then 9 lanes, stepping every two levels
    pub fn lane_count_for_level(level: u32) -> u32 {
        match level {
            0..=2 => 3,
            3..=4 => 5,
            5..=6 => 7,
            _ => 9,
        }
    }

    /// Gap between consecutive spawns; shrinks as the level rises
    pub fn base_gap(level: u32) -> f32 {
        (18.0 - level as f32).max(10.0)
    }

    /// Enemy share of single random spawns
    pub fn enemy_chance(level: u32) -> f64 {
        match level {
            0..=1 => 0.0,
            2 => 0.20,
            _ => 0.35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_step_function() {
        assert_eq!(Tuning::lane_count_for_level(1), 3);
        assert_eq!(Tuning::lane_count_for_level(2), 3);
        assert_eq!(Tuning::lane_count_for_level(3), 5);
        assert_eq!(Tuning::lane_count_for_level(5), 7);
        assert_eq!(Tuning::lane_count_for_level(7), 9);
        assert_eq!(Tuning::lane_count_for_level(10), 9);
    }

    #[test]
    fn test_base_gap_shrinks_with_floor() {
        assert_eq!(Tuning::base_gap(1), 17.0);
        assert_eq!(Tuning::base_gap(5), 13.0);
        assert_eq!(Tuning::base_gap(8), 10.0);
        assert_eq!(Tuning::base_gap(10), 10.0);
    }

    #[test]
    fn test_enemy_chance_by_level() {
        assert_eq!(Tuning::enemy_chance(1), 0.0);
        assert_eq!(Tuning::enemy_chance(2), 0.20);
        assert_eq!(Tuning::enemy_chance(3), 0.35);
        assert_eq!(Tuning::enemy_chance(10), 0.35);
    }

    #[test]
    fn test_letter_interval_curve() {
        let t = Tuning::default();
        assert!((t.letter_interval(1) - 350.0).abs() < 1e-3);
        assert!((t.letter_interval(2) - 455.0).abs() < 1e-3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t = Tuning::from_json(r#"{ "initial_energy": 5 }"#).unwrap();
        assert_eq!(t.initial_energy, 5);
        assert_eq!(t.base_speed, 52.0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = Tuning::from_json(r#"{ "max_level": 11 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "max_level", .. }));
    }
}
