//! Static configuration surface (tables, flag columns, extra columns, geocoding).
//!
//! Configuration is a plain value handed to the schema/service constructors;
//! nothing here is global. `Default` reproduces the stock package settings.

use serde::{Deserialize, Serialize};

/// Top-level configuration for both record kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub addresses: AddressesConfig,
    pub contacts: ContactsConfig,
}

/// Address table settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressesConfig {
    /// Backing table.
    pub table: String,
    /// Flag names; each becomes an `is_<flag>` boolean column.
    pub flags: Vec<String>,
    /// Extra free-form columns accepted as fillable.
    pub columns: Vec<String>,
    /// Add coordinates (lon/lat) to addresses when a geocoder is installed.
    pub geocode: bool,
}

impl Default for AddressesConfig {
    fn default() -> Self {
        Self {
            table: "addresses".to_string(),
            flags: ["public", "primary", "billing", "shipping"]
                .map(String::from)
                .to_vec(),
            columns: Vec::new(),
            geocode: true,
        }
    }
}

/// Contact table settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    pub table: String,
    pub flags: Vec<String>,
    pub columns: Vec<String>,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            table: "contacts".to_string(),
            flags: ["public", "primary"].map(String::from).to_vec(),
            columns: Vec::new(),
        }
    }
}
