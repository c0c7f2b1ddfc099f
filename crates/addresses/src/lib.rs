//! Addresses domain module (addresses and contacts attached to owner entities).
//!
//! This crate contains the declarative side of the library: configuration,
//! table schema, validation rules and the record types. It is pure domain logic
//! (no IO, no storage); orchestration lives in `addressable-infra`.

pub mod address;
pub mod attributes;
pub mod config;
pub mod contact;
pub mod country;
pub mod rules;
pub mod schema;

pub use address::{Address, AddressValues, Coordinates};
pub use attributes::Attributes;
pub use config::{AddressesConfig, ContactsConfig, PackageConfig};
pub use contact::Contact;
pub use country::Country;
pub use rules::{FieldValidator, Rule, RuleSet, RuleValidator};
pub use schema::{AddressSchema, ContactSchema};
