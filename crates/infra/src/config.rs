//! Configuration loading.
//!
//! Reads a JSON file named by `ADDRESSABLE_CONFIG` (defaults when unset), then
//! applies env overrides:
//!
//! - `ADDRESSABLE_ADDRESSES_TABLE`
//! - `ADDRESSABLE_CONTACTS_TABLE`
//! - `ADDRESSABLE_GEOCODE` (`true`/`false`/`1`/`0`)
//!
//! The result is validated by deriving both schemas, so a config that loads is
//! a config the stores can use.

use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use addressable_addresses::{AddressSchema, ContactSchema, PackageConfig};

pub const CONFIG_PATH_VAR: &str = "ADDRESSABLE_CONFIG";
pub const ADDRESSES_TABLE_VAR: &str = "ADDRESSABLE_ADDRESSES_TABLE";
pub const CONTACTS_TABLE_VAR: &str = "ADDRESSABLE_CONTACTS_TABLE";
pub const GEOCODE_VAR: &str = "ADDRESSABLE_GEOCODE";

/// Load configuration from the process environment.
pub fn load_config() -> anyhow::Result<PackageConfig> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` in place of the process environment.
pub fn load_config_with(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<PackageConfig> {
    let mut config = match lookup(CONFIG_PATH_VAR) {
        Some(path) => read_config_file(Path::new(&path))?,
        None => PackageConfig::default(),
    };

    if let Some(table) = lookup(ADDRESSES_TABLE_VAR) {
        config.addresses.table = table;
    }
    if let Some(table) = lookup(CONTACTS_TABLE_VAR) {
        config.contacts.table = table;
    }
    if let Some(raw) = lookup(GEOCODE_VAR) {
        config.addresses.geocode = parse_bool(&raw)
            .with_context(|| format!("{GEOCODE_VAR} has an invalid value"))?;
    }

    validate(&config)?;
    info!(
        addresses_table = %config.addresses.table,
        contacts_table = %config.contacts.table,
        geocode = config.addresses.geocode,
        "address configuration loaded"
    );
    Ok(config)
}

/// Parse a JSON config file; missing keys take their defaults.
pub fn read_config_file(path: &Path) -> anyhow::Result<PackageConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Derive both schemas to surface invalid identifiers early.
pub fn validate(config: &PackageConfig) -> anyhow::Result<()> {
    AddressSchema::from_config(&config.addresses).context("invalid addresses config")?;
    ContactSchema::from_config(&config.contacts).context("invalid contacts config")?;
    Ok(())
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn no_env_yields_defaults() {
        let cfg = load_config_with(env(&[])).unwrap();
        assert_eq!(cfg, PackageConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = load_config_with(env(&[
            (ADDRESSES_TABLE_VAR, "user_addresses"),
            (GEOCODE_VAR, "off"),
        ]))
        .unwrap();
        assert_eq!(cfg.addresses.table, "user_addresses");
        assert!(!cfg.addresses.geocode);
        assert_eq!(cfg.contacts.table, "contacts");
    }

    #[test]
    fn invalid_geocode_value_is_an_error() {
        assert!(load_config_with(env(&[(GEOCODE_VAR, "sometimes")])).is_err());
    }

    #[test]
    fn invalid_table_name_is_an_error() {
        assert!(load_config_with(env(&[(CONTACTS_TABLE_VAR, "contacts;--")])).is_err());
    }

    #[test]
    fn config_file_is_read_and_overridden() {
        let path = std::env::temp_dir().join(format!(
            "addressable-config-{}.json",
            uuid::Uuid::now_v7()
        ));
        std::fs::write(
            &path,
            r#"{ "addresses": { "columns": ["label"], "flags": ["primary"] } }"#,
        )
        .unwrap();

        let cfg = load_config_with(env(&[
            (CONFIG_PATH_VAR, path.to_str().unwrap()),
            (GEOCODE_VAR, "0"),
        ]))
        .unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(cfg.addresses.columns, vec!["label"]);
        assert_eq!(cfg.addresses.flags, vec!["primary"]);
        assert!(!cfg.addresses.geocode);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = load_config_with(env(&[(CONFIG_PATH_VAR, "/nonexistent/addressable.json")]))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
