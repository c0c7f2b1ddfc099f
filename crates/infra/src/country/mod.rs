//! Country reference lookup (ISO 3166 alpha-2 / alpha-3 → country row).

pub mod postgres;
pub mod resolver;

pub use postgres::PostgresCountryResolver;
pub use resolver::{CountryResolver, InMemoryCountryResolver};
