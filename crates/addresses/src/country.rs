//! Country reference rows (ISO 3166 lookup table).

use serde::{Deserialize, Serialize};

use addressable_core::CountryId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    /// ISO 3166-1 alpha-2 code, e.g. `AT`.
    pub iso_3166_2: String,
    /// ISO 3166-1 alpha-3 code, e.g. `AUT`.
    pub iso_3166_3: String,
    pub name: String,
}

impl Country {
    pub fn new(
        id: impl Into<CountryId>,
        iso_3166_2: impl Into<String>,
        iso_3166_3: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            iso_3166_2: iso_3166_2.into(),
            iso_3166_3: iso_3166_3.into(),
            name: name.into(),
        }
    }

    /// Whether `code` is this country's alpha-2 or alpha-3 code (ASCII case-insensitive).
    pub fn matches_code(&self, code: &str) -> bool {
        self.iso_3166_2.eq_ignore_ascii_case(code) || self.iso_3166_3.eq_ignore_ascii_case(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_alpha2_or_alpha3() {
        let at = Country::new(40, "AT", "AUT", "Austria");
        assert!(at.matches_code("AT"));
        assert!(at.matches_code("AUT"));
        assert!(at.matches_code("aut"));
        assert!(!at.matches_code("AU"));
        assert!(!at.matches_code(""));
    }
}
