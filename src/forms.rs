//! Helpers for deserializing HTML form data.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, de};

/// Deserializes an optional form field, treating the empty string as `None`.
///
/// HTML selects and inputs submit an empty string rather than omitting the
/// field, which serde would otherwise reject for non-string types.
pub(crate) fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Option::<String>::deserialize(deserializer)?;

    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod empty_string_as_none_tests {
    use serde::Deserialize;

    use super::empty_string_as_none;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestForm {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        parent_id: Option<i64>,
    }

    #[test]
    fn empty_string_becomes_none() {
        let form: TestForm = serde_urlencoded::from_str("parent_id=").unwrap();

        assert_eq!(form, TestForm { parent_id: None });
    }

    #[test]
    fn missing_field_becomes_none() {
        let form: TestForm = serde_urlencoded::from_str("").unwrap();

        assert_eq!(form, TestForm { parent_id: None });
    }

    #[test]
    fn number_is_parsed() {
        let form: TestForm = serde_urlencoded::from_str("parent_id=42").unwrap();

        assert_eq!(form, TestForm { parent_id: Some(42) });
    }
}
