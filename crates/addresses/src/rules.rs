//! Field-level validation rules and the default rule engine.
//!
//! A `RuleSet` maps a field name to the rules it must satisfy. A
//! `FieldValidator` checks an attribute set against a rule set and returns the
//! human-readable failures; an empty list means the attributes are valid.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::attributes::Attributes;

/// A single constraint on a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Field must be present and non-null (empty strings fail too).
    Required,
    /// Field must be present whenever the named field is.
    RequiredWith(String),
    String,
    Integer,
    Numeric,
    /// `true`/`false`, `0`/`1` or their string forms.
    Boolean,
    /// Minimum length in characters.
    Min(usize),
    /// Maximum length in characters.
    Max(usize),
    /// Letters, digits, dashes and underscores only.
    AlphaDash,
    /// Numeric value within an inclusive range.
    Between(f64, f64),
}

/// Rules keyed by field name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet(BTreeMap<String, Vec<Rule>>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces any rules already declared for `field`.
    pub fn field(mut self, field: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.0.insert(field.into(), rules.into_iter().collect());
        self
    }

    pub fn rules_for(&self, field: &str) -> Option<&[Rule]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Rule>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validation engine boundary.
pub trait FieldValidator: Send + Sync {
    /// Check `attributes` against `rules`; returns every failure message.
    fn validate(&self, attributes: &Attributes, rules: &RuleSet) -> Vec<String>;
}

impl<V: FieldValidator + ?Sized> FieldValidator for std::sync::Arc<V> {
    fn validate(&self, attributes: &Attributes, rules: &RuleSet) -> Vec<String> {
        (**self).validate(attributes, rules)
    }
}

/// Default rule engine.
///
/// Fields are checked in name order, rules in declaration order. Only
/// `Required` applies to absent or null fields. Once a type rule fails, the
/// remaining rules of that field are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl FieldValidator for RuleValidator {
    fn validate(&self, attributes: &Attributes, rules: &RuleSet) -> Vec<String> {
        let mut failures = Vec::new();

        for (field, field_rules) in rules.iter() {
            let label = field.replace('_', " ");
            let value = attributes.get_present(field);

            for rule in field_rules {
                let Some(value) = value else {
                    match rule {
                        Rule::Required => {
                            failures.push(format!("The {label} field is required."));
                            break;
                        }
                        Rule::RequiredWith(other) if attributes.get_present(other).is_some() => {
                            let other = other.replace('_', " ");
                            failures.push(format!(
                                "The {label} field is required when {other} is present."
                            ));
                            break;
                        }
                        _ => continue,
                    }
                };

                match check(rule, value, &label) {
                    Outcome::Pass => {}
                    Outcome::Fail(msg) => failures.push(msg),
                    Outcome::Stop(msg) => {
                        failures.push(msg);
                        break;
                    }
                }
            }
        }

        failures
    }
}

enum Outcome {
    Pass,
    Fail(String),
    Stop(String),
}

fn check(rule: &Rule, value: &JsonValue, label: &str) -> Outcome {
    match rule {
        Rule::Required => match value {
            JsonValue::String(s) if s.trim().is_empty() => {
                Outcome::Stop(format!("The {label} field is required."))
            }
            _ => Outcome::Pass,
        },
        Rule::RequiredWith(_) => Outcome::Pass,
        Rule::String => {
            if value.is_string() {
                Outcome::Pass
            } else {
                Outcome::Stop(format!("The {label} must be a string."))
            }
        }
        Rule::Integer => {
            if as_integer(value).is_some() {
                Outcome::Pass
            } else {
                Outcome::Stop(format!("The {label} must be an integer."))
            }
        }
        Rule::Numeric => {
            if as_number(value).is_some() {
                Outcome::Pass
            } else {
                Outcome::Stop(format!("The {label} must be a number."))
            }
        }
        Rule::Boolean => {
            if as_boolean(value).is_some() {
                Outcome::Pass
            } else {
                Outcome::Stop(format!("The {label} field must be true or false."))
            }
        }
        Rule::Min(n) => match value.as_str() {
            Some(s) if s.chars().count() < *n => {
                Outcome::Fail(format!("The {label} must be at least {n} characters."))
            }
            _ => Outcome::Pass,
        },
        Rule::Max(n) => match value.as_str() {
            Some(s) if s.chars().count() > *n => Outcome::Fail(format!(
                "The {label} may not be greater than {n} characters."
            )),
            _ => Outcome::Pass,
        },
        Rule::AlphaDash => match value.as_str() {
            Some(s) if !s.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') => {
                Outcome::Fail(format!(
                    "The {label} may only contain letters, numbers, dashes and underscores."
                ))
            }
            _ => Outcome::Pass,
        },
        Rule::Between(min, max) => match as_number(value) {
            Some(n) if n >= *min && n <= *max => Outcome::Pass,
            _ => Outcome::Fail(format!("The {label} must be between {min} and {max}.")),
        },
    }
}

/// Integer view of a JSON value (numbers or digit strings).
pub fn as_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric view of a JSON value (numbers or numeric strings).
pub fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean view of a JSON value (`true`/`false`, `0`/`1`, `"0"`/`"1"`, `"true"`/`"false"`).
pub fn as_boolean(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        JsonValue::String(s) => match s.as_str() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn attrs(value: JsonValue) -> Attributes {
        Attributes::from_json(value).unwrap()
    }

    #[test]
    fn required_field_missing_fails() {
        let rules = RuleSet::new().field("country_id", [Rule::Required, Rule::Integer]);
        let failures = RuleValidator.validate(&attrs(json!({})), &rules);
        assert_eq!(failures, vec!["The country id field is required."]);
    }

    #[test]
    fn optional_rules_are_skipped_for_absent_fields() {
        let rules = RuleSet::new().field("street", [Rule::String, Rule::Min(3)]);
        assert!(RuleValidator.validate(&attrs(json!({})), &rules).is_empty());
        assert!(RuleValidator
            .validate(&attrs(json!({ "street": null })), &rules)
            .is_empty());
    }

    #[test]
    fn type_failure_stops_remaining_rules_for_that_field() {
        let rules = RuleSet::new().field("city", [Rule::String, Rule::Min(2), Rule::Max(60)]);
        let failures = RuleValidator.validate(&attrs(json!({ "city": 12 })), &rules);
        assert_eq!(failures, vec!["The city must be a string."]);
    }

    #[test]
    fn all_failures_across_fields_are_collected() {
        let rules = RuleSet::new()
            .field("post_code", [Rule::String, Rule::Min(3), Rule::AlphaDash])
            .field("is_billing", [Rule::Boolean]);
        let failures = RuleValidator.validate(
            &attrs(json!({ "post_code": "1 ", "is_billing": "yes" })),
            &rules,
        );
        assert_eq!(
            failures,
            vec![
                "The is billing field must be true or false.",
                "The post code must be at least 3 characters.",
                "The post code may only contain letters, numbers, dashes and underscores.",
            ]
        );
    }

    #[test]
    fn between_checks_numeric_range() {
        let rules = RuleSet::new().field("latitude", [Rule::Numeric, Rule::Between(-90.0, 90.0)]);
        assert!(RuleValidator
            .validate(&attrs(json!({ "latitude": 48.2 })), &rules)
            .is_empty());
        assert_eq!(
            RuleValidator.validate(&attrs(json!({ "latitude": 91 })), &rules),
            vec!["The latitude must be between -90 and 90."]
        );
    }

    #[test]
    fn required_with_applies_only_when_the_other_field_is_present() {
        let rules = RuleSet::new()
            .field("latitude", [Rule::RequiredWith("longitude".to_string()), Rule::Numeric])
            .field("longitude", [Rule::RequiredWith("latitude".to_string()), Rule::Numeric]);

        assert!(RuleValidator.validate(&attrs(json!({})), &rules).is_empty());
        assert!(RuleValidator
            .validate(&attrs(json!({ "latitude": 48.2, "longitude": 16.37 })), &rules)
            .is_empty());
        assert_eq!(
            RuleValidator.validate(&attrs(json!({ "latitude": 48.2 })), &rules),
            vec!["The longitude field is required when latitude is present."]
        );
        assert_eq!(
            RuleValidator.validate(&attrs(json!({ "longitude": null, "latitude": "x" })), &rules),
            vec![
                "The latitude must be a number.",
                "The longitude field is required when latitude is present.",
            ]
        );
    }

    #[test]
    fn boolean_accepts_common_encodings() {
        for v in [json!(true), json!(false), json!(0), json!(1), json!("0"), json!("1")] {
            assert!(as_boolean(&v).is_some(), "{v} should be boolean");
        }
        assert!(as_boolean(&json!(2)).is_none());
        assert!(as_boolean(&json!("yes")).is_none());
    }

    proptest! {
        /// Property: strings within [min, max] never produce length failures.
        #[test]
        fn strings_within_bounds_pass_length_rules(s in "[a-z]{3,60}") {
            let rules = RuleSet::new().field("street", [Rule::String, Rule::Min(3), Rule::Max(60)]);
            let failures = RuleValidator.validate(&attrs(json!({ "street": s })), &rules);
            prop_assert!(failures.is_empty());
        }

        /// Property: any integer is accepted by the integer rule, as number or string.
        #[test]
        fn integers_pass_integer_rule(n in any::<i64>()) {
            let rules = RuleSet::new().field("country_id", [Rule::Required, Rule::Integer]);
            let as_number = attrs(json!({ "country_id": n }));
            let as_string = attrs(json!({ "country_id": n.to_string() }));
            prop_assert!(RuleValidator.validate(&as_number, &rules).is_empty());
            prop_assert!(RuleValidator.validate(&as_string, &rules).is_empty());
        }
    }
}
