//! Postgres-backed address store.
//!
//! Column lists are derived from the `AddressSchema` (flag and text columns are
//! configurable), so statements are assembled with `sqlx::QueryBuilder`. All
//! identifiers come from the schema, which only admits plain SQL identifiers;
//! every value is bound.
//!
//! ## Thread Safety
//!
//! Uses the SQLx connection pool (Arc + Send + Sync). The `AddressStore` trait
//! is synchronous, so each call runs its query on the current tokio runtime.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use addressable_addresses::schema::flag_column;
use addressable_addresses::{Address, AddressSchema, AddressValues, Attributes, Coordinates};
use addressable_core::{AddressId, CountryId, OwnerId, OwnerRef};

use crate::error::{block_on, map_sqlx_error, StoreError};

use super::r#trait::AddressStore;

#[derive(Debug, Clone)]
pub struct PostgresAddressStore {
    pool: Arc<PgPool>,
    schema: AddressSchema,
}

impl PostgresAddressStore {
    pub fn new(pool: PgPool, schema: AddressSchema) -> Self {
        Self {
            pool: Arc::new(pool),
            schema,
        }
    }

    pub fn schema(&self) -> &AddressSchema {
        &self.schema
    }

    /// Create the address table and owner index if they do not exist.
    #[instrument(skip(self), fields(table = %self.schema.table()), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(&self.schema.create_table_sql())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    fn select_prefix(&self) -> String {
        format!("SELECT * FROM {} WHERE ", self.schema.table())
    }

    fn push_owner<'a>(qb: &mut QueryBuilder<'a, Postgres>, owner: &OwnerRef) {
        qb.push("addressable_type = ")
            .push_bind(owner.owner_type.clone())
            .push(" AND addressable_id = ")
            .push_bind(*owner.owner_id.as_uuid());
    }

    #[instrument(skip(self, owner), fields(owner = %owner), err)]
    pub async fn list_async(&self, owner: &OwnerRef) -> Result<Vec<Address>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(self.select_prefix());
        Self::push_owner(&mut qb, owner);
        qb.push(" ORDER BY created_at ASC, id ASC");

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_addresses", e))?;

        rows.iter().map(|r| self.address_from_row(r)).collect()
    }

    #[instrument(skip(self, owner), fields(owner = %owner), err)]
    pub async fn count_async(&self, owner: &OwnerRef) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) AS total FROM {} WHERE ",
            self.schema.table()
        ));
        Self::push_owner(&mut qb, owner);

        let row = qb
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_addresses", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count_addresses", e))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self, id), fields(address_id = %id), err)]
    pub async fn find_async(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(self.select_prefix());
        qb.push("id = ").push_bind(*id.as_uuid());

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_address", e))?;

        row.as_ref().map(|r| self.address_from_row(r)).transpose()
    }

    #[instrument(skip(self, owner, values), fields(owner = %owner), err)]
    pub async fn update_or_create_async(
        &self,
        owner: &OwnerRef,
        values: AddressValues,
    ) -> Result<Address, StoreError> {
        if let Some(existing) = self
            .list_async(owner)
            .await?
            .into_iter()
            .find(|a| a.matches(&values))
        {
            return Ok(existing);
        }

        let address = Address::create(&self.schema, owner.clone(), values, Utc::now());
        self.insert(&address).await?;
        Ok(address)
    }

    async fn insert(&self, address: &Address) -> Result<(), StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} (id, addressable_type, addressable_id, country_id, latitude, longitude, created_at, updated_at",
            self.schema.table()
        ));
        for col in self.schema.text_columns().iter().chain(self.schema.flag_columns()) {
            qb.push(", ").push(col);
        }
        qb.push(") VALUES (");

        {
            let mut values = qb.separated(", ");
            values
                .push_bind(*address.id.as_uuid())
                .push_bind(address.owner.owner_type.clone())
                .push_bind(*address.owner.owner_id.as_uuid())
                .push_bind(address.country_id.get())
                .push_bind(address.coordinates.map(|c| c.latitude))
                .push_bind(address.coordinates.map(|c| c.longitude))
                .push_bind(address.created_at)
                .push_bind(address.updated_at);
            for col in self.schema.text_columns() {
                values.push_bind(text_value(address.get(col)));
            }
            for col in self.schema.flag_columns() {
                values.push_bind(flag_value(address, col));
            }
        }
        qb.push(")");

        qb.build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_address", e))?;
        Ok(())
    }

    #[instrument(skip(self, address), fields(address_id = %address.id), err)]
    pub async fn save_async(&self, address: &Address) -> Result<bool, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", self.schema.table()));
        {
            let mut set = qb.separated(", ");
            set.push("country_id = ")
                .push_bind_unseparated(address.country_id.get());
            set.push("latitude = ")
                .push_bind_unseparated(address.coordinates.map(|c| c.latitude));
            set.push("longitude = ")
                .push_bind_unseparated(address.coordinates.map(|c| c.longitude));
            set.push("updated_at = ")
                .push_bind_unseparated(address.updated_at);
            for col in self.schema.text_columns() {
                set.push(format!("{col} = "))
                    .push_bind_unseparated(text_value(address.get(col)));
            }
            for col in self.schema.flag_columns() {
                set.push(format!("{col} = "))
                    .push_bind_unseparated(flag_value(address, col));
            }
        }
        qb.push(" WHERE id = ").push_bind(*address.id.as_uuid());

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("save_address", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, id), fields(address_id = %id), err)]
    pub async fn delete_async(&self, id: AddressId) -> Result<bool, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.schema.table()))
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_address", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, owner), fields(owner = %owner), err)]
    pub async fn delete_all_async(&self, owner: &OwnerRef) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("DELETE FROM {} WHERE ", self.schema.table()));
        Self::push_owner(&mut qb, owner);

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("flush_addresses", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, owner), fields(owner = %owner), err)]
    pub async fn first_by_flag_async(
        &self,
        owner: &OwnerRef,
        flag: &str,
    ) -> Result<Option<Address>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(self.select_prefix());
        Self::push_owner(&mut qb, owner);
        qb.push(" ORDER BY ");
        if self.schema.has_flag(flag) {
            qb.push(flag_column(flag)).push(" DESC, ");
        }
        qb.push("updated_at DESC, id DESC LIMIT 1");

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("first_address_by_flag", e))?;

        row.as_ref().map(|r| self.address_from_row(r)).transpose()
    }

    fn address_from_row(&self, row: &PgRow) -> Result<Address, StoreError> {
        let decode = |e: sqlx::Error| {
            StoreError::Storage(format!("failed to decode address row: {e}"))
        };

        let mut columns = Attributes::new();
        for col in self.schema.text_columns() {
            let value: Option<String> = row.try_get(col.as_str()).map_err(decode)?;
            if let Some(v) = value {
                columns.insert(col.clone(), v);
            }
        }
        for col in self.schema.flag_columns() {
            let value: bool = row.try_get(col.as_str()).map_err(decode)?;
            columns.insert(col.clone(), value);
        }

        let latitude: Option<f64> = row.try_get("latitude").map_err(decode)?;
        let longitude: Option<f64> = row.try_get("longitude").map_err(decode)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(decode)?;

        Ok(Address {
            id: AddressId::from_uuid(row.try_get("id").map_err(decode)?),
            owner: OwnerRef::new(
                row.try_get::<String, _>("addressable_type").map_err(decode)?,
                OwnerId::from_uuid(row.try_get("addressable_id").map_err(decode)?),
            ),
            country_id: CountryId(row.try_get("country_id").map_err(decode)?),
            columns,
            coordinates: latitude.zip(longitude).map(|(lat, lng)| Coordinates::new(lat, lng)),
            created_at,
            updated_at,
        })
    }
}

/// Text columns are stored as-is; non-string JSON is stored in its JSON form.
fn text_value(value: Option<&JsonValue>) -> Option<String> {
    match value {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn flag_value(address: &Address, column: &str) -> bool {
    address
        .get(column)
        .and_then(JsonValue::as_bool)
        .unwrap_or(false)
}

impl AddressStore for PostgresAddressStore {
    fn list(&self, owner: &OwnerRef) -> Result<Vec<Address>, StoreError> {
        block_on("list_addresses", self.list_async(owner))
    }

    fn count(&self, owner: &OwnerRef) -> Result<u64, StoreError> {
        block_on("count_addresses", self.count_async(owner))
    }

    fn find(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        block_on("find_address", self.find_async(id))
    }

    fn update_or_create(&self, owner: &OwnerRef, values: AddressValues) -> Result<Address, StoreError> {
        block_on("update_or_create_address", self.update_or_create_async(owner, values))
    }

    fn save(&self, address: &Address) -> Result<bool, StoreError> {
        block_on("save_address", self.save_async(address))
    }

    fn delete(&self, id: AddressId) -> Result<bool, StoreError> {
        block_on("delete_address", self.delete_async(id))
    }

    fn delete_all(&self, owner: &OwnerRef) -> Result<u64, StoreError> {
        block_on("flush_addresses", self.delete_all_async(owner))
    }

    fn first_by_flag(&self, owner: &OwnerRef, flag: &str) -> Result<Option<Address>, StoreError> {
        block_on("first_address_by_flag", self.first_by_flag_async(owner, flag))
    }
}
