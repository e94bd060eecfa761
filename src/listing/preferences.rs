/*!
 * Sort Preferences
 * Session-scoped sort/order defaults, read when absent and written when explicit
 */

use ahash::AHashMap;

use super::sort::{SortKey, SortOrder};

/// Preference key for the sort field
pub const SORT_KEY: &str = "sort";

/// Preference key for the sort direction
pub const ORDER_KEY: &str = "order";

/// Get/set channel for per-session string preferences
///
/// Usually cookies at an outer HTTP layer; the engine assumes nothing about
/// the transport.
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&mut self, key: &str, value: &str);
}

/// In-memory preference channel
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: AHashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn store(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Pick the sort key and order for one listing request
///
/// An explicit, recognized value is used and written back. A missing value is
/// read from the store, then falls back to `defaults`. Unrecognized values
/// (explicit or stored) degrade to `name` / `asc` and are never stored.
pub fn resolve_sort(
    prefs: &mut dyn PreferenceStore,
    sort: Option<&str>,
    order: Option<&str>,
    defaults: (SortKey, SortOrder),
) -> (SortKey, SortOrder) {
    let key = match sort.filter(|s| !s.is_empty()) {
        Some(explicit) => match SortKey::parse(explicit) {
            Some(key) => {
                prefs.store(SORT_KEY, key.as_str());
                key
            }
            None => SortKey::default(),
        },
        None => prefs
            .load(SORT_KEY)
            .map_or(defaults.0, |stored| SortKey::parse_or_default(&stored)),
    };

    let direction = match order.filter(|s| !s.is_empty()) {
        Some(explicit) => match SortOrder::parse(explicit) {
            Some(direction) => {
                prefs.store(ORDER_KEY, direction.as_str());
                direction
            }
            None => SortOrder::default(),
        },
        None => prefs
            .load(ORDER_KEY)
            .map_or(defaults.1, |stored| SortOrder::parse_or_default(&stored)),
    };

    (key, direction)
}
