//! Table schema derived from configuration.
//!
//! The schema knows which columns are flags (`is_<flag>` booleans), which are
//! fillable free-form text columns, which rules apply to them, and how the
//! backing table is declared in Postgres.

use addressable_core::{DomainError, DomainResult};

use crate::config::{AddressesConfig, ContactsConfig};
use crate::rules::{Rule, RuleSet};

/// Columns every address table carries besides the configured extras.
pub const STANDARD_ADDRESS_COLUMNS: &[&str] =
    &["street", "street_extra", "city", "state", "post_code", "note"];

/// Columns every contact table carries besides the configured extras.
pub const STANDARD_CONTACT_COLUMNS: &[&str] = &[
    "type",
    "first_name",
    "middle_name",
    "last_name",
    "company",
    "position",
    "phone",
    "mobile",
    "fax",
    "email",
    "website",
    "notes",
];

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const COUNTRY_ID: &str = "country_id";

/// Column name of a flag: `primary` → `is_primary`.
pub fn flag_column(flag: &str) -> String {
    format!("is_{flag}")
}

/// Whether `name` can be spliced into SQL as an identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn ensure_identifier(kind: &str, name: &str) -> DomainResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(DomainError::config(format!("{kind} '{name}' is not a valid identifier")))
    }
}

/// Build the (deduplicated, order-preserving) fillable column list.
fn fillable_columns(standard: &[&str], extra: &[String]) -> DomainResult<Vec<String>> {
    let mut columns: Vec<String> = standard.iter().map(|c| c.to_string()).collect();
    for c in extra {
        ensure_identifier("column", c)?;
        if !columns.contains(c) {
            columns.push(c.clone());
        }
    }
    Ok(columns)
}

fn flag_columns(flags: &[String]) -> DomainResult<Vec<String>> {
    let mut columns = Vec::with_capacity(flags.len());
    for f in flags {
        ensure_identifier("flag", f)?;
        let col = flag_column(f);
        if !columns.contains(&col) {
            columns.push(col);
        }
    }
    Ok(columns)
}

/// Resolved address table layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSchema {
    table: String,
    flag_columns: Vec<String>,
    text_columns: Vec<String>,
    extra_columns: Vec<String>,
    geocode: bool,
}

impl AddressSchema {
    /// Validate the configuration and derive the schema.
    pub fn from_config(config: &AddressesConfig) -> DomainResult<Self> {
        ensure_identifier("table", &config.table)?;

        let extra_columns = config
            .columns
            .iter()
            .filter(|c| !STANDARD_ADDRESS_COLUMNS.contains(&c.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            table: config.table.clone(),
            flag_columns: flag_columns(&config.flags)?,
            text_columns: fillable_columns(STANDARD_ADDRESS_COLUMNS, &config.columns)?,
            extra_columns,
            geocode: config.geocode,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `is_<flag>` column names, in configuration order.
    pub fn flag_columns(&self) -> &[String] {
        &self.flag_columns
    }

    /// Free-form text columns (standard + configured extras).
    pub fn text_columns(&self) -> &[String] {
        &self.text_columns
    }

    pub fn geocode(&self) -> bool {
        self.geocode
    }

    /// Whether `flag` (without the `is_` prefix) is configured.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.is_flag_column(&flag_column(flag))
    }

    pub fn is_flag_column(&self, column: &str) -> bool {
        self.flag_columns.iter().any(|c| c == column)
    }

    pub fn is_text_column(&self, column: &str) -> bool {
        self.text_columns.iter().any(|c| c == column)
    }

    /// Whether a caller attribute is accepted for mass assignment.
    pub fn is_fillable(&self, column: &str) -> bool {
        column == LATITUDE
            || column == LONGITUDE
            || self.is_flag_column(column)
            || self.is_text_column(column)
    }

    /// Rule declaration applied to normalised address attributes.
    pub fn validation_rules(&self) -> RuleSet {
        let mut rules = RuleSet::new()
            .field(COUNTRY_ID, [Rule::Required, Rule::Integer])
            .field("street", [Rule::String, Rule::Min(3), Rule::Max(60)])
            .field("street_extra", [Rule::String, Rule::Max(60)])
            .field("city", [Rule::String, Rule::Min(2), Rule::Max(60)])
            .field("state", [Rule::String, Rule::Min(2), Rule::Max(60)])
            .field(
                "post_code",
                [Rule::String, Rule::Min(3), Rule::Max(10), Rule::AlphaDash],
            )
            .field("note", [Rule::String, Rule::Max(255)])
            .field(
                LATITUDE,
                [
                    Rule::RequiredWith(LONGITUDE.to_string()),
                    Rule::Numeric,
                    Rule::Between(-90.0, 90.0),
                ],
            )
            .field(
                LONGITUDE,
                [
                    Rule::RequiredWith(LATITUDE.to_string()),
                    Rule::Numeric,
                    Rule::Between(-180.0, 180.0),
                ],
            );

        for col in &self.extra_columns {
            rules = rules.field(col.clone(), [Rule::String, Rule::Max(255)]);
        }
        for col in &self.flag_columns {
            rules = rules.field(col.clone(), [Rule::Boolean]);
        }
        rules
    }

    /// Postgres DDL for the address table and its owner index.
    pub fn create_table_sql(&self) -> String {
        let mut cols = vec![
            "id UUID PRIMARY KEY".to_string(),
            "addressable_type TEXT NOT NULL".to_string(),
            "addressable_id UUID NOT NULL".to_string(),
            "country_id BIGINT NOT NULL".to_string(),
        ];
        cols.extend(self.text_columns.iter().map(|c| format!("{c} TEXT")));
        cols.extend(
            self.flag_columns
                .iter()
                .map(|c| format!("{c} BOOLEAN NOT NULL DEFAULT FALSE")),
        );
        cols.push("latitude DOUBLE PRECISION".to_string());
        cols.push("longitude DOUBLE PRECISION".to_string());
        cols.push("created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()".to_string());
        cols.push("updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()".to_string());

        create_table(&self.table, &cols, "addressable")
    }
}

/// Resolved contact table layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSchema {
    table: String,
    flag_columns: Vec<String>,
    text_columns: Vec<String>,
}

impl ContactSchema {
    pub fn from_config(config: &ContactsConfig) -> DomainResult<Self> {
        ensure_identifier("table", &config.table)?;
        Ok(Self {
            table: config.table.clone(),
            flag_columns: flag_columns(&config.flags)?,
            text_columns: fillable_columns(STANDARD_CONTACT_COLUMNS, &config.columns)?,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn flag_columns(&self) -> &[String] {
        &self.flag_columns
    }

    pub fn text_columns(&self) -> &[String] {
        &self.text_columns
    }

    pub fn is_fillable(&self, column: &str) -> bool {
        self.flag_columns.iter().any(|c| c == column) || self.text_columns.iter().any(|c| c == column)
    }

    pub fn create_table_sql(&self) -> String {
        let mut cols = vec![
            "id UUID PRIMARY KEY".to_string(),
            "contactable_type TEXT NOT NULL".to_string(),
            "contactable_id UUID NOT NULL".to_string(),
        ];
        cols.extend(self.text_columns.iter().map(|c| format!("{c} TEXT")));
        cols.extend(
            self.flag_columns
                .iter()
                .map(|c| format!("{c} BOOLEAN NOT NULL DEFAULT FALSE")),
        );
        cols.push("created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()".to_string());
        cols.push("updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()".to_string());

        create_table(&self.table, &cols, "contactable")
    }
}

fn create_table(table: &str, cols: &[String], morph: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    {}\n);\n\
         CREATE INDEX IF NOT EXISTS {table}_{morph}_idx ON {table} ({morph}_type, {morph}_id);\n",
        cols.join(",\n    ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_with(columns: &[&str]) -> AddressSchema {
        AddressSchema::from_config(&AddressesConfig {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..AddressesConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn flags_become_prefixed_columns() {
        let schema = schema_with(&[]);
        assert_eq!(
            schema.flag_columns(),
            &["is_public", "is_primary", "is_billing", "is_shipping"]
        );
        assert!(schema.has_flag("billing"));
        assert!(!schema.has_flag("invoice"));
    }

    #[test]
    fn extra_columns_are_fillable_and_validated() {
        let schema = schema_with(&["label", "city"]);
        assert!(schema.is_fillable("label"));
        assert!(schema.is_fillable("is_primary"));
        assert!(schema.is_fillable("latitude"));
        assert!(!schema.is_fillable("country"));
        assert!(!schema.is_fillable("addressable_id"));

        // `city` is standard and must not be listed twice.
        assert_eq!(schema.text_columns().iter().filter(|c| *c == "city").count(), 1);

        let rules = schema.validation_rules();
        assert_eq!(rules.rules_for("label"), Some(&[Rule::String, Rule::Max(255)][..]));
        assert_eq!(
            rules.rules_for("city"),
            Some(&[Rule::String, Rule::Min(2), Rule::Max(60)][..])
        );
        assert_eq!(rules.rules_for("is_shipping"), Some(&[Rule::Boolean][..]));
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        let err = AddressSchema::from_config(&AddressesConfig {
            table: "addresses; DROP TABLE users".to_string(),
            ..AddressesConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));

        let err = AddressSchema::from_config(&AddressesConfig {
            flags: vec!["vip-only".to_string()],
            ..AddressesConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn address_ddl_declares_flags_and_owner_index() {
        let sql = schema_with(&["label"]).create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS addresses ("));
        assert!(sql.contains("is_billing BOOLEAN NOT NULL DEFAULT FALSE"));
        assert!(sql.contains("label TEXT"));
        assert!(sql.contains("country_id BIGINT NOT NULL"));
        assert!(sql.contains(
            "CREATE INDEX IF NOT EXISTS addresses_addressable_idx ON addresses (addressable_type, addressable_id);"
        ));
    }

    #[test]
    fn contact_schema_uses_narrow_flag_set() {
        let schema = ContactSchema::from_config(&ContactsConfig::default()).unwrap();
        assert_eq!(schema.flag_columns(), &["is_public", "is_primary"]);
        assert!(schema.is_fillable("email"));
        assert!(schema.create_table_sql().contains("contactable_type TEXT NOT NULL"));
    }
}
