//! Address record and its persistence-ready value set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use addressable_core::{AddressId, CountryId, DomainError, DomainResult, OwnerRef, ValueObject};

use crate::attributes::Attributes;
use crate::rules::{as_boolean, as_integer, as_number};
use crate::schema::{flag_column, AddressSchema, COUNTRY_ID, LATITUDE, LONGITUDE};

/// Geocoded position of an address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl ValueObject for Coordinates {}

/// Normalised, validated attributes ready to be written.
///
/// Built from the loader output: `country_id` is split out, flags are coerced
/// to booleans, `latitude`/`longitude` become `Coordinates` (only as a pair; the
/// rule set rejects a lone coordinate), and everything the schema does not
/// declare fillable is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressValues {
    pub country_id: CountryId,
    pub columns: Attributes,
    pub coordinates: Option<Coordinates>,
}

impl AddressValues {
    pub fn from_normalized(schema: &AddressSchema, mut attributes: Attributes) -> DomainResult<Self> {
        let country_id = attributes
            .remove(COUNTRY_ID)
            .as_ref()
            .and_then(as_integer)
            .map(CountryId)
            .ok_or_else(|| DomainError::failed_validation("[Addresses] No country code given."))?;

        let latitude = attributes.remove(LATITUDE).as_ref().and_then(as_number);
        let longitude = attributes.remove(LONGITUDE).as_ref().and_then(as_number);
        let coordinates = match (latitude, longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };

        let columns = attributes
            .into_iter()
            .filter(|(k, _)| schema.is_fillable(k))
            .map(|(k, v)| {
                if schema.is_flag_column(&k) {
                    let flag = as_boolean(&v).unwrap_or(false);
                    (k, JsonValue::Bool(flag))
                } else {
                    (k, v)
                }
            })
            .collect();

        Ok(Self {
            country_id,
            columns,
            coordinates,
        })
    }

    /// Single-line postal representation used as geocoding query.
    pub fn postal_line(&self) -> String {
        postal_line(&self.columns)
    }
}

/// Address attached to an owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub owner: OwnerRef,
    pub country_id: CountryId,
    /// Fillable columns and `is_<flag>` booleans.
    pub columns: Attributes,
    pub coordinates: Option<Coordinates>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// New record for `owner`; unset configured flags default to `false`.
    pub fn create(
        schema: &AddressSchema,
        owner: OwnerRef,
        values: AddressValues,
        now: DateTime<Utc>,
    ) -> Self {
        let mut columns = values.columns;
        for col in schema.flag_columns() {
            if !columns.contains_key(col) {
                columns.insert(col.clone(), false);
            }
        }

        Self {
            id: AddressId::new(),
            owner,
            country_id: values.country_id,
            columns,
            coordinates: values.coordinates,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge `values` onto this record (the fill step of an update).
    pub fn fill(&mut self, values: AddressValues, now: DateTime<Utc>) {
        self.country_id = values.country_id;
        self.columns.merge(values.columns);
        if values.coordinates.is_some() {
            self.coordinates = values.coordinates;
        }
        self.updated_at = now;
    }

    /// Whether this record equals `values` on every supplied key.
    pub fn matches(&self, values: &AddressValues) -> bool {
        self.country_id == values.country_id
            && values
                .columns
                .iter()
                .all(|(k, v)| self.columns.get(k) == Some(v))
    }

    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.columns.get(column)
    }

    /// Value of flag `flag` (without `is_` prefix); absent flags are `false`.
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

    pub fn is_billing(&self) -> bool {
        self.flag("billing")
    }

    pub fn is_shipping(&self) -> bool {
        self.flag("shipping")
    }

    /// Sort key for "best address by flag": flag, then most recently
    /// updated, then newest id.
    pub fn rank_by_flag(&self, flag: &str) -> (bool, DateTime<Utc>, AddressId) {
        (self.flag(flag), self.updated_at, self.id)
    }

    pub fn postal_line(&self) -> String {
        postal_line(&self.columns)
    }

    /// Stored-row view: columns plus `country_id` and coordinates.
    pub fn to_attributes(&self) -> Attributes {
        let mut attrs = self.columns.clone();
        attrs.insert(COUNTRY_ID, self.country_id.get());
        if let Some(c) = self.coordinates {
            attrs.insert(LATITUDE, c.latitude);
            attrs.insert(LONGITUDE, c.longitude);
        }
        attrs
    }
}

/// `street street_extra, post_code city, state` with empty parts skipped.
fn postal_line(columns: &Attributes) -> String {
    let part = |key: &str| columns.get_str(key).map(str::trim).filter(|s| !s.is_empty());

    let street = [part("street"), part("street_extra")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let locality = [part("post_code"), part("city")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    [Some(street.as_str()), Some(locality.as_str()), part("state")]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
