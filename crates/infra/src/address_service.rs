//! Address management for owner entities (application-level orchestration).
//!
//! `AddressService` gives any `AddressOwner` the address affordances: list,
//! add, update, delete, flush and the primary/billing/shipping accessors.
//!
//! ## Write Flow
//!
//! ```text
//! attributes
//!   ↓
//! 1. AttributeLoader (country lookup, normalisation, validation)
//!   ↓
//! 2. Mass-assignment filter + value coercion (AddressValues)
//!   ↓
//! 3. Geocoding (optional, failures are logged and ignored)
//!   ↓
//! 4. AddressStore write
//! ```
//!
//! Validation failures abort before step 4, so they never leave partial
//! writes. Store errors are returned unchanged.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use addressable_addresses::{
    Address, AddressSchema, AddressValues, Attributes, Coordinates, FieldValidator, RuleValidator,
};
use addressable_core::{AddressOwner, DomainError};

use crate::address_store::AddressStore;
use crate::attribute_loader::AttributeLoader;
use crate::country::CountryResolver;
use crate::error::StoreError;
use crate::geocode::Geocoder;

#[derive(Debug, Error)]
pub enum AddressServiceError {
    /// Attributes were rejected (missing/unknown country, failed rules).
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AddressServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(DomainError::FailedValidation(_)))
    }
}

/// Address operations parameterised over the store and the country lookup.
///
/// Construct one per configuration (schema) and share it; the service itself
/// holds no per-owner state.
pub struct AddressService<S, C, V = RuleValidator> {
    schema: AddressSchema,
    store: S,
    loader: AttributeLoader<C, V>,
    geocoder: Option<Box<dyn Geocoder>>,
}

impl<S, C> AddressService<S, C, RuleValidator> {
    /// Service with the default rule engine and no geocoder.
    pub fn new(schema: AddressSchema, store: S, resolver: C) -> Self {
        Self::with_validator(schema, store, resolver, RuleValidator)
    }
}

impl<S, C, V> AddressService<S, C, V> {
    pub fn with_validator(schema: AddressSchema, store: S, resolver: C, validator: V) -> Self {
        let rules = schema.validation_rules();
        Self {
            schema,
            store,
            loader: AttributeLoader::new(resolver, validator, rules),
            geocoder: None,
        }
    }

    /// Install a geocoder; it is only consulted when the schema enables geocoding.
    pub fn with_geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Some(Box::new(geocoder));
        self
    }

    pub fn schema(&self) -> &AddressSchema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S, C, V> AddressService<S, C, V>
where
    S: AddressStore,
    C: CountryResolver,
    V: FieldValidator,
{
    /// All addresses of `owner`, oldest first.
    pub fn addresses(&self, owner: &impl AddressOwner) -> Result<Vec<Address>, AddressServiceError> {
        Ok(self.store.list(&owner.owner_ref())?)
    }

    pub fn has_address(&self, owner: &impl AddressOwner) -> Result<bool, AddressServiceError> {
        Ok(self.store.count(&owner.owner_ref())? > 0)
    }

    /// Attach an address, reusing an identical existing one.
    #[instrument(skip_all, fields(owner = %owner.owner_ref()), err)]
    pub fn add_address(
        &self,
        owner: &impl AddressOwner,
        attributes: Attributes,
    ) -> Result<Address, AddressServiceError> {
        let mut values = self.normalize(attributes)?;
        if values.coordinates.is_none() {
            values.coordinates = self.geocode(&values.postal_line());
        }

        let address = self.store.update_or_create(&owner.owner_ref(), values)?;
        debug!(address_id = %address.id, "address attached");
        Ok(address)
    }

    /// Merge `attributes` onto `address` and persist it.
    ///
    /// Ownership is not checked here. On success `address` reflects the stored
    /// state; on a validation failure it is left untouched.
    #[instrument(skip_all, fields(owner = %owner.owner_ref(), address_id = %address.id), err)]
    pub fn update_address(
        &self,
        owner: &impl AddressOwner,
        address: &mut Address,
        attributes: Attributes,
    ) -> Result<bool, AddressServiceError> {
        let values = self.normalize(attributes)?;
        let explicit_coordinates = values.coordinates.is_some();

        address.fill(values, Utc::now());
        if !explicit_coordinates {
            if let Some(coordinates) = self.geocode(&address.postal_line()) {
                address.coordinates = Some(coordinates);
            }
        }

        Ok(self.store.save(address)?)
    }

    /// Delete `address` if it belongs to `owner`.
    ///
    /// Returns `Ok(false)` without touching anything when the stored record is
    /// owned by someone else or no longer exists.
    #[instrument(skip_all, fields(owner = %owner.owner_ref(), address_id = %address.id), err)]
    pub fn delete_address(
        &self,
        owner: &impl AddressOwner,
        address: &Address,
    ) -> Result<bool, AddressServiceError> {
        let owner = owner.owner_ref();
        match self.store.find(address.id)? {
            Some(stored) if stored.owner == owner => Ok(self.store.delete(address.id)?),
            Some(stored) => {
                debug!(actual_owner = %stored.owner, "refusing to delete address of another owner");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Delete every address of `owner`; returns how many were removed.
    #[instrument(skip_all, fields(owner = %owner.owner_ref()), err)]
    pub fn flush_addresses(&self, owner: &impl AddressOwner) -> Result<u64, AddressServiceError> {
        let removed = self.store.delete_all(&owner.owner_ref())?;
        debug!(removed, "addresses flushed");
        Ok(removed)
    }

    pub fn primary_address(&self, owner: &impl AddressOwner) -> Result<Option<Address>, AddressServiceError> {
        self.first_by_flag(owner, "primary")
    }

    pub fn billing_address(&self, owner: &impl AddressOwner) -> Result<Option<Address>, AddressServiceError> {
        self.first_by_flag(owner, "billing")
    }

    pub fn shipping_address(&self, owner: &impl AddressOwner) -> Result<Option<Address>, AddressServiceError> {
        self.first_by_flag(owner, "shipping")
    }

    fn first_by_flag(
        &self,
        owner: &impl AddressOwner,
        flag: &str,
    ) -> Result<Option<Address>, AddressServiceError> {
        Ok(self.store.first_by_flag(&owner.owner_ref(), flag)?)
    }

    fn normalize(&self, attributes: Attributes) -> Result<AddressValues, AddressServiceError> {
        let normalized = self.loader.load(attributes)?;

        let dropped: Vec<&String> = normalized
            .keys()
            .filter(|k| k.as_str() != "country_id" && !self.schema.is_fillable(k))
            .collect();
        if !dropped.is_empty() {
            debug!(?dropped, "ignoring attributes that are not fillable");
        }

        Ok(AddressValues::from_normalized(&self.schema, normalized)?)
    }

    fn geocode(&self, query: &str) -> Option<Coordinates> {
        if !self.schema.geocode() || query.is_empty() {
            return None;
        }
        let geocoder = self.geocoder.as_ref()?;

        match geocoder.geocode(query) {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, query, "geocoding failed; storing address without coordinates");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_not_validation_failures() {
        let err: AddressServiceError = StoreError::Storage("connection reset".to_string()).into();
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "storage error: connection reset");

        let err: AddressServiceError = DomainError::failed_validation("[Addresses] nope").into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "[Addresses] nope");
    }
}
