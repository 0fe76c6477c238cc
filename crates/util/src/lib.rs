use serde::de::{Deserialize, Deserializer};

mod tags;
mod text;

pub use self::{
    tags::{Tags, TagsError, normalize_tags, parse_tags},
    text::{escape_html, slugify, text_to_html},
};

/// Deserialize a field which may be explicitly set to `null`.
///
/// Use together with `#[serde(default)]` on an `Option<Option<T>>` to tell
/// apart a missing field (`None`) from a `null` one (`Some(None)`).
pub fn de_optional_null<'de, T, D>(de: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(de).map(Some)
}

/// Return `None` for `None` and for empty strings.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Update {
        #[serde(default, deserialize_with = "de_optional_null")]
        summary: Option<Option<String>>,
    }

    #[test]
    fn optional_null_distinguishes_missing_from_null() {
        let missing: Update = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.summary, None);

        let null: Update = serde_json::from_str(r#"{"summary":null}"#).unwrap();
        assert_eq!(null.summary, Some(None));

        let set: Update = serde_json::from_str(r#"{"summary":"x"}"#).unwrap();
        assert_eq!(set.summary, Some(Some("x".to_string())));
    }

    #[test]
    fn empty_strings_are_absent() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("x")), Some("x"));
    }
}
