use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use addressable_addresses::{Address, AddressSchema, AddressValues};
use addressable_core::{AddressId, OwnerRef};

use crate::error::StoreError;

use super::r#trait::AddressStore;

/// In-memory address store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryAddressStore {
    schema: AddressSchema,
    rows: RwLock<BTreeMap<AddressId, Address>>,
}

impl InMemoryAddressStore {
    pub fn new(schema: AddressSchema) -> Self {
        Self {
            schema,
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn owned_by<'a>(
        rows: &'a BTreeMap<AddressId, Address>,
        owner: &'a OwnerRef,
    ) -> impl Iterator<Item = &'a Address> + 'a {
        rows.values().filter(move |a| &a.owner == owner)
    }
}

impl AddressStore for InMemoryAddressStore {
    fn list(&self, owner: &OwnerRef) -> Result<Vec<Address>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        let mut list: Vec<Address> = Self::owned_by(&rows, owner).cloned().collect();
        list.sort_by_key(|a| (a.created_at, a.id));
        Ok(list)
    }

    fn count(&self, owner: &OwnerRef) -> Result<u64, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(Self::owned_by(&rows, owner).count() as u64)
    }

    fn find(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    fn update_or_create(&self, owner: &OwnerRef, values: AddressValues) -> Result<Address, StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;

        if let Some(existing) = Self::owned_by(&rows, owner).find(|a| a.matches(&values)) {
            return Ok(existing.clone());
        }

        let address = Address::create(&self.schema, owner.clone(), values, Utc::now());
        rows.insert(address.id, address.clone());
        Ok(address)
    }

    fn save(&self, address: &Address) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        match rows.get_mut(&address.id) {
            Some(row) => {
                *row = address.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: AddressId) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        Ok(rows.remove(&id).is_some())
    }

    fn delete_all(&self, owner: &OwnerRef) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        let before = rows.len();
        rows.retain(|_, a| &a.owner != owner);
        Ok((before - rows.len()) as u64)
    }

    fn first_by_flag(&self, owner: &OwnerRef, flag: &str) -> Result<Option<Address>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(Self::owned_by(&rows, owner)
            .max_by_key(|a| a.rank_by_flag(flag))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addressable_addresses::{AddressesConfig, Attributes};
    use addressable_core::{CountryId, OwnerId};
    use serde_json::json;

    fn schema() -> AddressSchema {
        AddressSchema::from_config(&AddressesConfig {
            columns: vec!["label".to_string()],
            ..AddressesConfig::default()
        })
        .unwrap()
    }

    fn values(v: serde_json::Value) -> AddressValues {
        AddressValues::from_normalized(&schema(), Attributes::from_json(v).unwrap()).unwrap()
    }

    fn owner(kind: &str) -> OwnerRef {
        OwnerRef::new(kind, OwnerId::new())
    }

    #[test]
    fn update_or_create_reuses_matching_row() {
        let store = InMemoryAddressStore::new(schema());
        let user = owner("user");

        let a = store
            .update_or_create(&user, values(json!({ "country_id": 7, "label": "home" })))
            .unwrap();
        let b = store
            .update_or_create(&user, values(json!({ "country_id": 7, "label": "home" })))
            .unwrap();
        let c = store
            .update_or_create(&user, values(json!({ "country_id": 7, "label": "work" })))
            .unwrap();

        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(store.count(&user).unwrap(), 2);
    }

    #[test]
    fn owners_are_isolated_by_type_and_id() {
        let store = InMemoryAddressStore::new(schema());
        let user = owner("user");
        let company = OwnerRef::new("company", user.owner_id);

        store
            .update_or_create(&user, values(json!({ "country_id": 7 })))
            .unwrap();

        assert_eq!(store.count(&user).unwrap(), 1);
        assert_eq!(store.count(&company).unwrap(), 0);
        assert!(store.first_by_flag(&company, "primary").unwrap().is_none());
        assert_eq!(store.delete_all(&company).unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn first_by_flag_prefers_flagged_row() {
        let store = InMemoryAddressStore::new(schema());
        let user = owner("user");

        store
            .update_or_create(&user, values(json!({ "country_id": 1, "is_shipping": true })))
            .unwrap();
        store
            .update_or_create(&user, values(json!({ "country_id": 2 })))
            .unwrap();

        let shipping = store.first_by_flag(&user, "shipping").unwrap().unwrap();
        assert_eq!(shipping.country_id, CountryId(1));
    }

    #[test]
    fn save_reports_missing_rows() {
        let store = InMemoryAddressStore::new(schema());
        let user = owner("user");
        let mut a = store
            .update_or_create(&user, values(json!({ "country_id": 1 })))
            .unwrap();

        a.columns.insert("label", "home");
        assert!(store.save(&a).unwrap());
        assert_eq!(store.find(a.id).unwrap().unwrap().get("label"), Some(&json!("home")));

        assert!(store.delete(a.id).unwrap());
        assert!(!store.delete(a.id).unwrap());
        assert!(!store.save(&a).unwrap());
    }
}
