//! Address persistence boundary.
//!
//! The store plays the role of the polymorphic one-to-many relation
//! (owner → addresses): create/update/delete, owner-scoped queries and
//! ordering by flag column.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryAddressStore;
pub use postgres::PostgresAddressStore;
pub use r#trait::AddressStore;
