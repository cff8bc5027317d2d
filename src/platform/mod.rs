//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger setup
//! - Wall-clock time
//! - Default storage backend

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// LocalStorage on the web
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> crate::persistence::LocalStorageStore {
    crate::persistence::LocalStorageStore::new()
}

/// In-memory on native
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> crate::persistence::MemoryStore {
    crate::persistence::MemoryStore::new()
}
