//! `addressable-core` : building blocks shared by the address crates.
//!
//! This crate contains **pure** primitives (no storage, no IO): the error model,
//! strongly-typed identifiers and the `AddressOwner` capability.

pub mod error;
pub mod id;
pub mod owner;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{AddressId, ContactId, CountryId, OwnerId};
pub use owner::{AddressOwner, OwnerRef};
pub use value_object::ValueObject;
