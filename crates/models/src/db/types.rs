use diesel_derive_enum::DbEnum;
use failure::Fail;
use serde::{Deserialize, Serialize};

use std::{fmt, str::FromStr};

/// Publication status shared by pages, sections and entries.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[PgType = "content_status"]
#[DieselType = "Content_status"]
#[serde(rename_all = "kebab-case")]
pub enum ContentStatus {
    /// Visible only to editors.
    Draft,
    /// Visible on the public site.
    Published,
}

impl ContentStatus {
    pub fn is_published(self) -> bool {
        self == ContentStatus::Published
    }
}

impl Default for ContentStatus {
    fn default() -> Self {
        ContentStatus::Draft
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
        })
    }
}

/// How the value of a content field should be edited.
///
/// This is only a hint for editing interfaces, it has no effect on what can
/// be stored in a field.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[PgType = "field_type"]
#[DieselType = "Field_type"]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Url,
}

impl FieldType {
    /// Should this field be edited with a multi-line input?
    pub fn is_multiline(self) -> bool {
        self == FieldType::Textarea
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Url => "url",
        })
    }
}

/// Kind of a long-form content entry.
#[derive(Clone, Copy, DbEnum, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[PgType = "entry_kind"]
#[DieselType = "Entry_kind"]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    /// A blog post.
    Blog,
    /// A case study of a past engagement.
    CaseStudy,
    /// A job posting.
    Job,
    /// A description of an offered service.
    Service,
    /// A support article.
    Support,
}

impl EntryKind {
    pub const ALL: [EntryKind; 5] = [
        EntryKind::Blog,
        EntryKind::CaseStudy,
        EntryKind::Job,
        EntryKind::Service,
        EntryKind::Support,
    ];

    /// Path segment under which entries of this kind are listed on the public
    /// site.
    pub fn listing(self) -> &'static str {
        match self {
            EntryKind::Blog => "blog",
            EntryKind::CaseStudy => "case-studies",
            EntryKind::Job => "careers",
            EntryKind::Service => "services",
            EntryKind::Support => "support",
        }
    }

    /// Find kind of entries listed under a path segment.
    pub fn from_listing(listing: &str) -> Option<EntryKind> {
        EntryKind::ALL.iter().cloned().find(|kind| kind.listing() == listing)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match *self {
            EntryKind::Blog => "blog",
            EntryKind::CaseStudy => "case-study",
            EntryKind::Job => "job",
            EntryKind::Service => "service",
            EntryKind::Support => "support",
        })
    }
}

impl FromStr for EntryKind {
    type Err = UnknownEntryKind;

    fn from_str(v: &str) -> Result<EntryKind, UnknownEntryKind> {
        EntryKind::ALL.iter()
            .cloned()
            .find(|kind| kind.to_string() == v)
            .ok_or_else(|| UnknownEntryKind(v.to_string()))
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Unknown entry kind: {}", _0)]
pub struct UnknownEntryKind(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kind_names() {
        for kind in EntryKind::ALL.iter().cloned() {
            assert_eq!(kind.to_string().parse::<EntryKind>().unwrap(), kind);
            assert_eq!(EntryKind::from_listing(kind.listing()), Some(kind));
        }

        assert!("case_study".parse::<EntryKind>().is_err());
        assert_eq!(EntryKind::from_listing("nope"), None);
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&EntryKind::CaseStudy).unwrap();
        assert_eq!(json, r#""case-study""#);

        let status: ContentStatus = serde_json::from_str(r#""published""#).unwrap();
        assert!(status.is_published());

        let ty: FieldType = serde_json::from_str(r#""textarea""#).unwrap();
        assert!(ty.is_multiline());
        assert!(!FieldType::Url.is_multiline());
    }
}
