//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger initialization
//! - Calendar day (attendance rewards)
//! - Default save backend

use crate::persistence::BlobStore;

/// Install the platform logger (`env_logger` natively, browser console on wasm)
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Key identifying the current calendar day
///
/// Only compared for equality, so the format differs per platform.
#[cfg(not(target_arch = "wasm32"))]
pub fn today_key() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("day-{}", secs / 86_400)
}

#[cfg(target_arch = "wasm32")]
pub fn today_key() -> String {
    String::from(js_sys::Date::new_0().to_date_string())
}

/// Save backend for this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn BlobStore> {
    Box::new(crate::persistence::FileStore::new(
        crate::persistence::FileStore::default_dir(),
    ))
}

#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn BlobStore> {
    Box::new(crate::persistence::LocalStorageStore)
}
