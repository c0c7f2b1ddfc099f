//! Contact record (peer of `Address` with a narrower flag set).
//!
//! Contacts are declared (type, configuration, schema) but carry no service of
//! their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use addressable_core::{ContactId, OwnerRef};

use crate::attributes::Attributes;
use crate::rules::as_boolean;
use crate::schema::{flag_column, ContactSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub owner: OwnerRef,
    /// Fillable columns and `is_<flag>` booleans.
    pub columns: Attributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// New contact for `owner`; unfillable attributes are dropped and unset
    /// flags default to `false`.
    pub fn create(
        schema: &ContactSchema,
        owner: OwnerRef,
        mut columns: Attributes,
        now: DateTime<Utc>,
    ) -> Self {
        columns.retain(|k, _| schema.is_fillable(k));
        for col in schema.flag_columns() {
            let value = columns.get(col).and_then(as_boolean).unwrap_or(false);
            columns.insert(col.clone(), value);
        }

        Self {
            id: ContactId::new(),
            owner,
            columns,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn flag(&self, flag: &str) -> bool {
        self.columns
            .get(&flag_column(flag))
            .and_then(as_boolean)
            .unwrap_or(false)
    }

    pub fn is_public(&self) -> bool {
        self.flag("public")
    }

    pub fn is_primary(&self) -> bool {
        self.flag("primary")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContactsConfig;
    use addressable_core::OwnerId;
    use serde_json::json;

    #[test]
    fn create_filters_columns_and_coerces_flags() {
        let schema = ContactSchema::from_config(&ContactsConfig::default()).unwrap();
        let columns = Attributes::from_json(json!({
            "email": "a@example.com",
            "is_primary": 1,
            "is_billing": true,
            "password": "nope",
        }))
        .unwrap();

        let c = Contact::create(&schema, OwnerRef::new("user", OwnerId::new()), columns, Utc::now());

        assert!(c.is_primary());
        assert!(!c.is_public());
        assert_eq!(c.columns.get_str("email"), Some("a@example.com"));
        assert!(!c.columns.contains_key("password"));
        // billing is not a contact flag
        assert!(!c.columns.contains_key("is_billing"));
    }
}
