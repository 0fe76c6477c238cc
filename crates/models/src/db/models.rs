use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    schema::*,
    types::{ContentStatus, EntryKind, FieldType},
};

#[derive(Clone, Debug, Identifiable, Queryable, Serialize)]
pub struct Page {
    pub id: i32,
    /// Path under which this page is served, e.g. `/about`. Routes are
    /// globally unique.
    pub route: String,
    pub page_title: String,
    pub meta_description: String,
    pub status: ContentStatus,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "pages"]
pub struct NewPage<'a> {
    pub route: &'a str,
    pub page_title: &'a str,
    pub meta_description: &'a str,
    pub status: ContentStatus,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable, Serialize)]
#[belongs_to(Page, foreign_key = "page_id")]
#[table_name = "page_sections"]
pub struct Section {
    pub id: i32,
    pub page_id: i32,
    /// Name of this section, unique within its page.
    pub section_key: String,
    /// Free-form label describing how this section is presented.
    pub section_type: String,
    pub display_order: i32,
    /// Only published sections are visible on the public site, regardless of
    /// their page's status.
    pub status: ContentStatus,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "page_sections"]
pub struct NewSection<'a> {
    pub page_id: i32,
    pub section_key: &'a str,
    pub section_type: &'a str,
    pub display_order: i32,
    pub status: ContentStatus,
}

#[derive(Associations, Clone, Debug, Identifiable, Queryable, Serialize)]
#[belongs_to(Section, foreign_key = "section_id")]
#[table_name = "content_fields"]
pub struct Field {
    pub id: i32,
    pub section_id: i32,
    /// Name of this field, unique within its section.
    pub field_key: String,
    pub field_value: Option<String>,
    pub field_type: FieldType,
    pub display_order: i32,
}

#[derive(Clone, Copy, Debug, Insertable)]
#[table_name = "content_fields"]
pub struct NewField<'a> {
    pub section_id: i32,
    pub field_key: &'a str,
    pub field_value: Option<&'a str>,
    pub field_type: FieldType,
    pub display_order: i32,
}

#[derive(Clone, Debug, Identifiable, Queryable, Serialize)]
#[table_name = "entries"]
pub struct Entry {
    pub id: i32,
    pub kind: EntryKind,
    /// URL-safe name of this entry, unique among entries of the same kind.
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    /// Body as authored, in plain text.
    pub body: String,
    /// Body rendered as HTML.
    pub html: String,
    pub tags: Vec<String>,
    pub status: ContentStatus,
    pub created: DateTime<Utc>,
    /// Time this entry was first published.
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Insertable)]
#[table_name = "entries"]
pub struct NewEntry {
    pub kind: EntryKind,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub html: String,
    pub tags: Vec<String>,
    pub status: ContentStatus,
    pub created: DateTime<Utc>,
}

/// Changes to an entry. Fields left as `None` are not changed.
#[derive(AsChangeset, Clone, Debug, Default)]
#[table_name = "entries"]
pub struct EntryChange {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<Option<String>>,
    pub body: Option<String>,
    pub html: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl EntryChange {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.title.is_none()
            && self.summary.is_none()
            && self.body.is_none()
            && self.html.is_none()
            && self.tags.is_none()
    }
}
