//! Persisted viewer state: map view and filter selectors.
//!
//! Four flat string keys, read once at startup and written on every change.
//! Absent or malformed values fall back to the defaults below.

mod store;

use std::path::Path;

pub use store::{ExpiringStore, FileStore, KeyValueStore, MemoryStore};

use serde::{Deserialize, Serialize};

use crate::filter::{BrandFilter, CodeFilter, FilterState};
use crate::StoreError;

pub const MAP_CENTER_KEY: &str = "mapCenter";
pub const MAP_ZOOM_KEY: &str = "mapZoom";
pub const SELECTED_BRAND_KEY: &str = "selectedBrand";
pub const SELECTED_CODE_FILTER_KEY: &str = "selectedCodeFilter";

pub const ALL_KEYS: [&str; 4] = [
    MAP_CENTER_KEY,
    MAP_ZOOM_KEY,
    SELECTED_BRAND_KEY,
    SELECTED_CODE_FILTER_KEY,
];

/// Roughly the centre of Honshu.
pub const DEFAULT_CENTER: [f64; 2] = [136.2923, 35.3622];
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Map camera position. `center` is `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl ViewState {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.center.iter().all(|v| v.is_finite()) && self.zoom.is_finite()
    }

    /// Encoded `(key, value)` pairs: centre as a JSON array, zoom as decimal text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if the centre cannot be JSON-encoded.
    pub fn entries(&self) -> Result<[(&'static str, String); 2], StoreError> {
        Ok([
            (MAP_CENTER_KEY, serde_json::to_string(&self.center)?),
            (MAP_ZOOM_KEY, self.zoom.to_string()),
        ])
    }
}

/// Everything read back from the key/value store at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub view: ViewState,
    pub filters: FilterState,
}

fn decode_center(raw: &str) -> Option<[f64; 2]> {
    serde_json::from_str::<[f64; 2]>(raw)
        .ok()
        .filter(|c| c.iter().all(|v| v.is_finite()))
}

fn decode_zoom(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|z| z.is_finite())
}

/// Read the persisted view and filter selectors, applying defaults.
///
/// # Errors
///
/// Returns [`StoreError`] only when the backend itself fails; missing or
/// malformed values are not errors.
pub fn load_persisted(store: &impl KeyValueStore) -> Result<PersistedState, StoreError> {
    let center = match store.get(MAP_CENTER_KEY)? {
        Some(raw) => decode_center(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "ignoring malformed persisted map center");
            DEFAULT_CENTER
        }),
        None => DEFAULT_CENTER,
    };

    let zoom = match store.get(MAP_ZOOM_KEY)? {
        Some(raw) => decode_zoom(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "ignoring malformed persisted zoom");
            DEFAULT_ZOOM
        }),
        None => DEFAULT_ZOOM,
    };

    let brand = store
        .get(SELECTED_BRAND_KEY)?
        .filter(|v| !v.is_empty())
        .map_or(BrandFilter::All, |v| BrandFilter::from_selector(&v));

    let codes = store
        .get(SELECTED_CODE_FILTER_KEY)?
        .filter(|v| !v.is_empty())
        .map_or(CodeFilter::All, |v| CodeFilter::from_selector(&v));

    Ok(PersistedState {
        view: ViewState { center, zoom },
        filters: FilterState { brand, codes },
    })
}

/// Open the configured state backend: a durable file store, wrapped in an
/// expiring store when a TTL is configured.
///
/// # Errors
///
/// Returns [`StoreError`] if the state file exists but cannot be read.
pub fn open_state_store(
    path: &Path,
    ttl_days: Option<u32>,
) -> Result<Box<dyn KeyValueStore + Send>, StoreError> {
    let file = FileStore::open(path)?;
    Ok(match ttl_days {
        Some(days) => Box::new(ExpiringStore::with_ttl_days(file, days)),
        None => Box::new(file),
    })
}

/// Write one key. Used to apply `Persist` commands.
///
/// # Errors
///
/// Returns [`StoreError`] if the backend write fails.
pub fn persist_entry(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &str,
) -> Result<(), StoreError> {
    store.set(key, value)?;
    tracing::debug!(key, value, "persisted viewer state");
    Ok(())
}

/// Remove all four keys.
///
/// # Errors
///
/// Returns [`StoreError`] if the backend write fails.
pub fn clear_persisted(store: &mut impl KeyValueStore) -> Result<(), StoreError> {
    for key in ALL_KEYS {
        store.remove(key)?;
    }
    Ok(())
}
