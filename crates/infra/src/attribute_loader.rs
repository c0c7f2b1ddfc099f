//! Attribute loading pipeline.
//!
//! ```text
//! caller attributes { country: "US", ... }
//!   ↓
//! 1. Require `country`
//!   ↓
//! 2. Resolve the code (alpha-2 or alpha-3) through the `CountryResolver`
//!   ↓
//! 3. Replace `country` with `country_id`
//!   ↓
//! 4. Validate against the address rule declaration
//!   ↓
//! normalised attributes { country_id: 7, ... }
//! ```
//!
//! Nothing is written here; the only IO is the read-only country lookup.

use serde_json::Value as JsonValue;
use tracing::instrument;

use addressable_addresses::{Attributes, FieldValidator, RuleSet};
use addressable_core::DomainError;

use crate::address_service::AddressServiceError;
use crate::country::CountryResolver;

pub const NO_COUNTRY_GIVEN: &str = "[Addresses] No country code given.";
pub const COUNTRY_NOT_FOUND: &str =
    "[Addresses] Country not found, did you seed the countries table?";

#[derive(Debug)]
pub struct AttributeLoader<C, V> {
    resolver: C,
    validator: V,
    rules: RuleSet,
}

impl<C, V> AttributeLoader<C, V> {
    pub fn new(resolver: C, validator: V, rules: RuleSet) -> Self {
        Self {
            resolver,
            validator,
            rules,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn into_parts(self) -> (C, V, RuleSet) {
        (self.resolver, self.validator, self.rules)
    }
}

impl<C, V> AttributeLoader<C, V>
where
    C: CountryResolver,
    V: FieldValidator,
{
    /// Turn caller attributes into persistence-ready ones.
    ///
    /// Fails with `FailedValidation` when the country is missing or unknown,
    /// or when any rule fails (all messages joined into one). Resolver errors
    /// propagate as store errors.
    #[instrument(skip_all, err)]
    pub fn load(&self, mut attributes: Attributes) -> Result<Attributes, AddressServiceError> {
        let code = match attributes.get_present("country") {
            Some(JsonValue::String(code)) => Some(code.clone()),
            Some(_) => None,
            None => return Err(DomainError::failed_validation(NO_COUNTRY_GIVEN).into()),
        };

        let country = match code {
            Some(code) => self.resolver.find_by_code(&code)?,
            None => None,
        }
        .ok_or_else(|| DomainError::failed_validation(COUNTRY_NOT_FOUND))?;

        attributes.remove("country");
        attributes.insert("country_id", country.id.get());

        let failures = self.validator.validate(&attributes, &self.rules);
        if !failures.is_empty() {
            return Err(DomainError::failed_validation(format!(
                "[Addresses] {}",
                failures.join(" ")
            ))
            .into());
        }

        Ok(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addressable_addresses::{AddressSchema, AddressesConfig, Country, RuleValidator};
    use proptest::prelude::*;
    use serde_json::json;

    use crate::country::InMemoryCountryResolver;

    fn loader() -> AttributeLoader<InMemoryCountryResolver, RuleValidator> {
        let schema = AddressSchema::from_config(&AddressesConfig {
            columns: vec!["label".to_string()],
            ..AddressesConfig::default()
        })
        .unwrap();
        let resolver = InMemoryCountryResolver::with_countries([
            Country::new(7, "US", "USA", "United States"),
            Country::new(40, "AT", "AUT", "Austria"),
        ]);
        AttributeLoader::new(resolver, RuleValidator, schema.validation_rules())
    }

    fn attrs(v: JsonValue) -> Attributes {
        Attributes::from_json(v).unwrap()
    }

    fn validation_message(err: AddressServiceError) -> String {
        match err {
            AddressServiceError::Validation(DomainError::FailedValidation(msg)) => msg,
            other => panic!("expected FailedValidation, got {other:?}"),
        }
    }

    #[test]
    fn replaces_country_with_country_id() {
        let out = loader()
            .load(attrs(json!({ "country": "US", "label": "home" })))
            .unwrap();
        assert_eq!(out, attrs(json!({ "country_id": 7, "label": "home" })));
    }

    #[test]
    fn accepts_alpha3_codes() {
        let out = loader().load(attrs(json!({ "country": "AUT" }))).unwrap();
        assert_eq!(out.get("country_id"), Some(&json!(40)));
    }

    #[test]
    fn missing_country_is_rejected() {
        let err = loader().load(attrs(json!({ "label": "home" }))).unwrap_err();
        assert_eq!(validation_message(err), NO_COUNTRY_GIVEN);

        let err = loader().load(attrs(json!({ "country": null }))).unwrap_err();
        assert_eq!(validation_message(err), NO_COUNTRY_GIVEN);
    }

    #[test]
    fn unknown_country_is_rejected() {
        let err = loader().load(attrs(json!({ "country": "ZZ" }))).unwrap_err();
        assert_eq!(
            validation_message(err),
            "[Addresses] Country not found, did you seed the countries table?"
        );

        let err = loader().load(attrs(json!({ "country": 840 }))).unwrap_err();
        assert_eq!(validation_message(err), COUNTRY_NOT_FOUND);
    }

    #[test]
    fn field_failures_are_joined_into_one_message() {
        let err = loader()
            .load(attrs(json!({ "country": "AT", "post_code": "1", "is_primary": "maybe" })))
            .unwrap_err();
        assert_eq!(
            validation_message(err),
            "[Addresses] The is primary field must be true or false. \
             The post code must be at least 3 characters."
        );
    }

    struct FailingResolver;

    impl CountryResolver for FailingResolver {
        fn find_by_code(&self, _code: &str) -> Result<Option<Country>, crate::error::StoreError> {
            Err(crate::error::StoreError::Storage("connection refused".to_string()))
        }
    }

    #[test]
    fn resolver_errors_propagate_unwrapped() {
        let loader = AttributeLoader::new(FailingResolver, RuleValidator, RuleSet::new());
        let err = loader.load(attrs(json!({ "country": "US" }))).unwrap_err();
        assert!(matches!(
            err,
            AddressServiceError::Store(crate::error::StoreError::Storage(_))
        ));
    }

    proptest! {
        /// Property: successful loads never carry the human-facing `country` key.
        #[test]
        fn output_never_contains_country(label in "[a-z]{1,20}", code in prop::sample::select(vec!["US", "USA", "AT", "AUT"])) {
            let out = loader().load(attrs(json!({ "country": code, "label": label }))).unwrap();
            prop_assert!(!out.contains_key("country"));
            prop_assert!(out.contains_key("country_id"));
        }

        /// Property: codes outside the seeded set are always rejected.
        #[test]
        fn unseeded_codes_are_rejected(code in "[A-Z]{2,3}") {
            prop_assume!(!["US", "USA", "AT", "AUT"].contains(&code.as_str()));
            let err = loader().load(attrs(json!({ "country": code }))).unwrap_err();
            prop_assert_eq!(validation_message(err), COUNTRY_NOT_FOUND);
        }
    }
}
