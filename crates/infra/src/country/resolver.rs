use std::sync::{Arc, RwLock};

use addressable_addresses::Country;

use crate::error::StoreError;

/// Code → country lookup boundary.
pub trait CountryResolver: Send + Sync {
    /// Find the country whose alpha-2 or alpha-3 code equals `code`.
    ///
    /// `Ok(None)` means "not found" (usually an unseeded countries table).
    fn find_by_code(&self, code: &str) -> Result<Option<Country>, StoreError>;
}

impl<R> CountryResolver for Arc<R>
where
    R: CountryResolver + ?Sized,
{
    fn find_by_code(&self, code: &str) -> Result<Option<Country>, StoreError> {
        (**self).find_by_code(code)
    }
}

/// In-memory countries table for tests/dev.
///
/// Starts empty, like a freshly migrated database; seed it explicitly.
#[derive(Debug, Default)]
pub struct InMemoryCountryResolver {
    countries: RwLock<Vec<Country>>,
}

impl InMemoryCountryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_countries(countries: impl IntoIterator<Item = Country>) -> Self {
        Self {
            countries: RwLock::new(countries.into_iter().collect()),
        }
    }

    pub fn seed(&self, country: Country) -> Result<(), StoreError> {
        let mut countries = self.countries.write().map_err(|_| StoreError::poisoned())?;
        countries.push(country);
        Ok(())
    }
}

impl CountryResolver for InMemoryCountryResolver {
    /// Lowest id wins when several rows share a code.
    fn find_by_code(&self, code: &str) -> Result<Option<Country>, StoreError> {
        let countries = self.countries.read().map_err(|_| StoreError::poisoned())?;
        Ok(countries
            .iter()
            .filter(|c| c.matches_code(code))
            .min_by_key(|c| c.id)
            .cloned())
    }
}
