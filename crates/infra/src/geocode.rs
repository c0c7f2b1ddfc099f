//! Geocoding boundary (postal address → coordinates).
//!
//! Talking to an actual maps provider is left to the host application; it
//! installs a `Geocoder` on the service when `geocode` is enabled.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use addressable_addresses::Coordinates;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(String),
}

pub trait Geocoder: Send + Sync {
    /// Resolve a single-line postal address. `Ok(None)` when nothing matched.
    fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

impl<G> Geocoder for Arc<G>
where
    G: Geocoder + ?Sized,
{
    fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        (**self).geocode(query)
    }
}

/// Lookup-table geocoder for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryGeocoder {
    entries: RwLock<HashMap<String, Coordinates>>,
}

impl InMemoryGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, query: impl Into<String>, coordinates: Coordinates) -> Self {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(query.into(), coordinates);
        }
        self
    }
}

impl Geocoder for InMemoryGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| GeocodeError::Request("lock poisoned".to_string()))?;
        Ok(entries.get(query).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_geocoder_resolves_known_queries_only() {
        let geocoder = InMemoryGeocoder::new()
            .with_entry("Main St 1, 1010 Vienna", Coordinates::new(48.2, 16.37));

        assert_eq!(
            geocoder.geocode("Main St 1, 1010 Vienna").unwrap(),
            Some(Coordinates::new(48.2, 16.37))
        );
        assert_eq!(geocoder.geocode("Nowhere").unwrap(), None);
    }
}
