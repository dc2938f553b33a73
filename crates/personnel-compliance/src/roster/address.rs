use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Postal code and city, stored together in the `postadresse` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    pub postal_code: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Die Postleitzahl ist falsch eingetragen.")]
    PostalCode { code: String },
    #[error("Der Ort ist falsch eingetragen.")]
    City { city: String },
}

/// Split `raw` on whitespace runs: the first token is the postal code, the
/// rest is the city.
///
/// A code is accepted with exactly five characters or exactly one; lengths
/// two to four and anything over five are rejected. The one-character case
/// is kept as the dashboard has always accepted it. Cities need at least two
/// characters.
pub fn parse_address(raw: &str) -> Result<PostalAddress, AddressError> {
    let mut tokens = raw.split_whitespace();
    let postal_code = tokens.next().unwrap_or_default().to_string();
    let city = tokens.collect::<Vec<_>>().join(" ");

    let code_len = postal_code.chars().count();
    if (code_len < 5 && code_len > 1) || code_len > 5 {
        return Err(AddressError::PostalCode { code: postal_code });
    }

    if city.chars().count() < 2 {
        return Err(AddressError::City { city });
    }

    Ok(PostalAddress { postal_code, city })
}

impl fmt::Display for PostalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.postal_code, self.city)
    }
}

impl Serialize for PostalAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PostalAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_address(&raw).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn deserialize_optional_address<'de, D>(
    deserializer: D,
) -> Result<Option<PostalAddress>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_address(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_code_and_city() {
        let address = parse_address("12345 Berlin").expect("valid address");
        assert_eq!(address.postal_code, "12345");
        assert_eq!(address.city, "Berlin");
    }

    #[test]
    fn collapses_whitespace_inside_city() {
        let address = parse_address("  70173   Stuttgart \t Mitte ").expect("valid address");
        assert_eq!(address.city, "Stuttgart Mitte");
        assert_eq!(address.to_string(), "70173 Stuttgart Mitte");
    }

    #[test]
    fn rejects_codes_between_one_and_five_characters() {
        for raw in ["12 Berlin", "123 Berlin", "1234 Berlin"] {
            assert!(
                matches!(parse_address(raw), Err(AddressError::PostalCode { .. })),
                "{raw}"
            );
        }
    }

    #[test]
    fn rejects_codes_longer_than_five_characters() {
        assert_eq!(
            parse_address("123456 Berlin"),
            Err(AddressError::PostalCode {
                code: "123456".to_string()
            })
        );
    }

    #[test]
    fn accepts_single_character_code() {
        let address = parse_address("A Berlin").expect("single character code passes");
        assert_eq!(address.postal_code, "A");
    }

    #[test]
    fn rejects_short_city() {
        assert_eq!(
            parse_address("12345 B"),
            Err(AddressError::City {
                city: "B".to_string()
            })
        );
        assert!(matches!(
            parse_address("A B"),
            Err(AddressError::City { .. })
        ));
        assert!(matches!(
            parse_address("12345"),
            Err(AddressError::City { .. })
        ));
    }

    #[test]
    fn counts_umlauts_as_single_characters() {
        let address = parse_address("12345 Öd").expect("two character city");
        assert_eq!(address.city, "Öd");
    }
}
