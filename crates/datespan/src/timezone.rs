//! Named timezone lookup with a shared cache.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::error::{DatespanError, Result};

/// Cache of IANA timezone names resolved to [`Tz`] values.
///
/// Create one per process (or per component) and pass it by reference to
/// the functions that resolve zone names. Reads and inserts are guarded by
/// an `RwLock`, so a single cache can be shared across threads.
#[derive(Debug, Default)]
pub struct TimezoneCache {
    zones: RwLock<HashMap<String, Tz>>,
}

impl TimezoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an IANA timezone name such as `"Asia/Shanghai"`.
    ///
    /// # Errors
    ///
    /// Returns [`DatespanError::InvalidTimezone`] if the name is unknown.
    /// Failed lookups are not cached.
    pub fn resolve(&self, name: &str) -> Result<Tz> {
        if let Some(zone) = self.read().get(name) {
            trace!(timezone = name, "timezone cache hit");
            return Ok(*zone);
        }

        let zone = name
            .parse::<Tz>()
            .map_err(|_| DatespanError::InvalidTimezone(format!("'{name}'")))?;
        debug!(timezone = name, "caching timezone");
        self.write().insert(name.to_string(), zone);
        Ok(zone)
    }

    /// Number of cached zones.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    // The map holds plain `Copy` values, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Tz>> {
        self.zones.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Tz>> {
        self.zones.write().unwrap_or_else(PoisonError::into_inner)
    }
}
