//! Save/load of the durable subset of run and economy state
//!
//! Features:
//! - Single named JSON record (`SAVE_KEY`)
//! - Pluggable key-value backends (memory, file, LocalStorage)
//! - Atomic file writes (tmp → save)
//!
//! Only the fields in [`SaveData`] survive a restart; status, positions and
//! other in-run transients always start from their defaults.

mod file;
mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

use crate::error::StorageError;
use crate::shop::CarId;
use crate::sim::state::Locale;
use crate::tuning::Tuning;

/// Record name of the save blob
pub const SAVE_KEY: &str = "bonus_runner_save_v4";

/// A durable key-value blob store
///
/// Writes may fail; callers log and carry on with in-memory state.
pub trait BlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError>;
}

/// Persisted fields of the run/economy state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub score: u64,
    pub high_score: u64,
    pub max_lives: u32,
    pub has_double_jump: bool,
    pub has_immortality: bool,
    pub owned_cars: BTreeSet<CarId>,
    pub equipped_car_id: CarId,
    pub energy: i64,
    pub locale: Locale,
    pub is_premium: bool,
    #[serde(default)]
    pub has_completed_tutorial: bool,
    /// Calendar-day key of the last attendance reward
    #[serde(default)]
    pub last_attendance_date: Option<String>,
}

impl SaveData {
    /// Save data of a first launch
    pub fn fresh(tuning: &Tuning) -> Self {
        Self {
            score: tuning.starting_credits,
            high_score: 0,
            max_lives: tuning.starting_lives,
            has_double_jump: false,
            has_immortality: false,
            owned_cars: BTreeSet::from([CarId::STARTER]),
            equipped_car_id: CarId::STARTER,
            energy: tuning.initial_energy,
            locale: Locale::default(),
            is_premium: false,
            has_completed_tutorial: false,
            last_attendance_date: None,
        }
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let mut data: SaveData = serde_json::from_str(json)?;
        // The starter car can never be lost, and the equipped car must be owned
        data.owned_cars.insert(CarId::STARTER);
        if !data.owned_cars.contains(&data.equipped_car_id) {
            data.equipped_car_id = CarId::STARTER;
        }
        Ok(data)
    }

    /// Read the save blob; `Ok(None)` on first launch
    pub fn load(store: &dyn BlobStore) -> Result<Option<Self>, StorageError> {
        match store.read(SAVE_KEY)? {
            Some(json) => Self::from_json(&json).map(Some),
            None => Ok(None),
        }
    }

    /// Read the save blob, falling back to a fresh save on any problem
    pub fn load_or_fresh(store: &dyn BlobStore, tuning: &Tuning) -> Self {
        match Self::load(store) {
            Ok(Some(data)) => {
                log::info!("Loaded save (high score {})", data.high_score);
                data
            }
            Ok(None) => {
                log::info!("No save found, starting fresh");
                Self::fresh(tuning)
            }
            Err(e) => {
                log::warn!("Discarding unreadable save: {e}");
                Self::fresh(tuning)
            }
        }
    }

    pub fn store(&self, store: &mut dyn BlobStore) -> Result<(), StorageError> {
        store.write(SAVE_KEY, &self.to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_store() {
        let tuning = Tuning::default();
        let mut data = SaveData::fresh(&tuning);
        data.score = 1234;
        data.high_score = 99_000;
        data.has_immortality = true;
        data.owned_cars.insert(CarId::Void);
        data.equipped_car_id = CarId::Void;
        data.locale = Locale::En;
        data.last_attendance_date = Some("day-20000".into());

        let mut store = MemoryStore::new();
        data.store(&mut store).unwrap();
        let back = SaveData::load(&store).unwrap().unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_missing_blob_is_first_launch() {
        let store = MemoryStore::new();
        assert_eq!(SaveData::load(&store).unwrap(), None);
        let data = SaveData::load_or_fresh(&store, &Tuning::default());
        assert_eq!(data.score, 3000);
        assert_eq!(data.energy, 30);
    }

    #[test]
    fn test_corrupt_blob_falls_back_to_fresh() {
        let mut store = MemoryStore::new();
        store.write(SAVE_KEY, "{ not json").unwrap();
        assert!(SaveData::load(&store).is_err());
        let data = SaveData::load_or_fresh(&store, &Tuning::default());
        assert_eq!(data, SaveData::fresh(&Tuning::default()));
    }

    #[test]
    fn test_unowned_equipped_car_is_repaired() {
        let mut data = SaveData::fresh(&Tuning::default());
        data.equipped_car_id = CarId::Aero;
        let json = data.to_json().unwrap();
        let back = SaveData::from_json(&json).unwrap();
        assert_eq!(back.equipped_car_id, CarId::STARTER);
    }
}
