//! Infrastructure layer: stores, country lookup, geocoding hook, config loading
//! and the address service that composes them.

pub mod address_service;
pub mod address_store;
pub mod attribute_loader;
pub mod config;
pub mod country;
pub mod error;
pub mod geocode;


pub use address_service::{AddressService, AddressServiceError};
pub use address_store::{AddressStore, InMemoryAddressStore, PostgresAddressStore};
pub use attribute_loader::{AttributeLoader, COUNTRY_NOT_FOUND, NO_COUNTRY_GIVEN};
pub use config::load_config;
pub use country::{CountryResolver, InMemoryCountryResolver, PostgresCountryResolver};
pub use error::StoreError;
pub use geocode::{GeocodeError, Geocoder, InMemoryGeocoder};
