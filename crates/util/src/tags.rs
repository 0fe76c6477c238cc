use failure::Fail;
use folio_macros::From;
use serde::{Deserialize, Serialize};

/// Tags as submitted by an author: either a list, or a single string holding
/// a JSON array or comma-separated values.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Text(String),
}

impl Tags {
    /// Parse and normalize these tags.
    pub fn normalize(&self) -> Result<Vec<String>, TagsError> {
        match self {
            Tags::List(list) => Ok(normalize_tags(list)),
            Tags::Text(text) => parse_tags(text),
        }
    }
}

impl Default for Tags {
    fn default() -> Self {
        Tags::List(Vec::new())
    }
}

/// Parse a list of tags from either a JSON array of strings or
/// a comma-separated string.
pub fn parse_tags(input: &str) -> Result<Vec<String>, TagsError> {
    let input = input.trim();

    if input.starts_with('[') {
        let list: Vec<String> = serde_json::from_str(input)?;
        Ok(normalize_tags(&list))
    } else {
        Ok(normalize_tags(input.split(',')))
    }
}

/// Trim and lowercase tags, dropping empty ones and duplicates.
///
/// Order of first occurrences is preserved.
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();

    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();

        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }

    out
}

#[derive(Debug, Fail, From)]
pub enum TagsError {
    #[fail(display = "Tags are not a valid JSON list of strings: {}", _0)]
    Json(#[cause] #[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated() {
        assert_eq!(parse_tags(" Rust, web ,,RUST, Cloud ").unwrap(),
            vec!["rust", "web", "cloud"]);
    }

    #[test]
    fn json_array() {
        assert_eq!(parse_tags(r#"["DevOps", " ai ", ""]"#).unwrap(),
            vec!["devops", "ai"]);
    }

    #[test]
    fn invalid_json() {
        assert!(parse_tags(r#"["unterminated"#).is_err());
        assert!(parse_tags("[1, 2]").is_err());
    }

    #[test]
    fn empty_input() {
        assert!(parse_tags("").unwrap().is_empty());
        assert!(parse_tags("  ").unwrap().is_empty());
    }

    #[test]
    fn tags_either_form() {
        let list: Tags = serde_json::from_str(r#"["A", "b"]"#).unwrap();
        assert_eq!(list.normalize().unwrap(), vec!["a", "b"]);

        let text: Tags = serde_json::from_str(r#""a, B""#).unwrap();
        assert_eq!(text.normalize().unwrap(), vec!["a", "b"]);
    }
}
