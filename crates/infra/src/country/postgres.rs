//! Postgres-backed country lookup against the seeded `countries` table.

use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::instrument;

use addressable_addresses::schema::is_identifier;
use addressable_addresses::Country;
use addressable_core::{CountryId, DomainError, DomainResult};

use crate::error::{block_on, map_sqlx_error, StoreError};

use super::resolver::CountryResolver;

#[derive(Debug, Clone)]
pub struct PostgresCountryResolver {
    pool: Arc<PgPool>,
    table: String,
}

impl PostgresCountryResolver {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            table: "countries".to_string(),
        }
    }

    /// Use a differently named lookup table.
    pub fn with_table(mut self, table: impl Into<String>) -> DomainResult<Self> {
        let table = table.into();
        if !is_identifier(&table) {
            return Err(DomainError::config(format!(
                "table '{table}' is not a valid identifier"
            )));
        }
        self.table = table;
        Ok(self)
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_code_async(&self, code: &str) -> Result<Option<Country>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT id::BIGINT AS id, iso_3166_2, iso_3166_3, name
            FROM {}
            WHERE UPPER(iso_3166_2) = UPPER($1) OR UPPER(iso_3166_3) = UPPER($1)
            ORDER BY id ASC
            LIMIT 1
            "#,
            self.table
        ))
        .bind(code)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_country_by_code", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let decode = |e: sqlx::Error| StoreError::Storage(format!("failed to decode country row: {e}"));
        Ok(Some(Country {
            id: CountryId(row.try_get("id").map_err(decode)?),
            iso_3166_2: row.try_get("iso_3166_2").map_err(decode)?,
            iso_3166_3: row.try_get("iso_3166_3").map_err(decode)?,
            name: row.try_get("name").map_err(decode)?,
        }))
    }
}

impl CountryResolver for PostgresCountryResolver {
    fn find_by_code(&self, code: &str) -> Result<Option<Country>, StoreError> {
        block_on("find_country_by_code", self.find_by_code_async(code))
    }
}
