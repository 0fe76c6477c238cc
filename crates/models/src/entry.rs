//! Long-form content entries: blog posts, case studies, job postings, etc.

use chrono::Utc;
use failure::Fail;
use folio_error::ApiError;
use folio_macros::From;
use folio_util::{Tags, TagsError, de_optional_null, slugify, text_to_html};
use log::debug;
use serde::Deserialize;
use std::cmp::Reverse;

use crate::{
    db::{
        models::{Entry, EntryChange, NewEntry},
        types::{ContentStatus, EntryKind},
    },
    store::{EntryStore, StoreError},
};

/// Data for a new entry.
#[derive(Clone, Debug, Deserialize)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub title: String,
    /// Slug to use instead of one derived from the title.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub body: String,
    #[serde(default)]
    pub tags: Tags,
}

/// Changes to an existing entry. Fields left out are not changed.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EntryUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "de_optional_null")]
    pub summary: Option<Option<String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(ApiError, Debug, Fail, From)]
pub enum EntryError {
    #[fail(display = "No such entry")]
    #[api(code = "entry:not-found", status = "NOT_FOUND")]
    NotFound,
    #[fail(display = "Title must not be empty")]
    #[api(code = "entry:title:empty", status = "BAD_REQUEST")]
    EmptyTitle,
    #[fail(display = "{}", _0)]
    #[api(code = "entry:tags:invalid", status = "BAD_REQUEST")]
    InvalidTags(#[cause] #[from] TagsError),
    #[fail(display = "Slug {} is already used by another entry", _0)]
    #[api(code = "entry:slug:exists", status = "CONFLICT")]
    SlugTaken(String),
    #[fail(display = "{}", _0)]
    Store(#[cause] #[from] StoreError),
}

/// Create a new draft entry.
///
/// Unless a slug is given it is derived from the title, with a numeric
/// suffix added if another entry of the same kind already uses it.
pub fn create_entry<S>(store: &S, draft: &EntryDraft) -> Result<Entry, EntryError>
where
    S: EntryStore + ?Sized,
{
    let title = draft.title.trim();

    if title.is_empty() {
        return Err(EntryError::EmptyTitle);
    }

    let slug = match draft.slug {
        Some(ref slug) => {
            let slug = slugify(slug);
            if store.slug_taken(draft.kind, &slug, None)? {
                return Err(EntryError::SlugTaken(slug));
            }
            slug
        }
        None => unique_slug(store, draft.kind, &slugify(title), None)?,
    };

    let entry = store.insert_entry(&NewEntry {
        kind: draft.kind,
        slug,
        title: title.to_string(),
        summary: draft.summary.clone().filter(|s| !s.trim().is_empty()),
        body: draft.body.clone(),
        html: text_to_html(&draft.body),
        tags: draft.tags.normalize()?,
        status: ContentStatus::Draft,
        created: Utc::now(),
    })?;

    debug!("Created {} entry {} ({})", entry.kind, entry.slug, entry.id);

    Ok(entry)
}

/// Find a slug based on `base` not used by any other entry of `kind`.
fn unique_slug<S>(store: &S, kind: EntryKind, base: &str, except: Option<i32>)
-> Result<String, StoreError>
where
    S: EntryStore + ?Sized,
{
    if !store.slug_taken(kind, base, except)? {
        return Ok(base.to_string());
    }

    let mut n = 2;

    loop {
        let slug = format!("{}-{}", base, n);

        if !store.slug_taken(kind, &slug, except)? {
            return Ok(slug);
        }

        n += 1;
    }
}

/// Change an entry.
///
/// The slug is only changed when a new one is given explicitly. HTML is
/// regenerated whenever the body changes.
pub fn update_entry<S>(store: &S, id: i32, update: &EntryUpdate)
-> Result<Entry, EntryError>
where
    S: EntryStore + ?Sized,
{
    let entry = store.entry_by_id(id)?.ok_or(EntryError::NotFound)?;

    let title = match update.title {
        Some(ref title) if title.trim().is_empty() => return Err(EntryError::EmptyTitle),
        Some(ref title) => Some(title.trim().to_string()),
        None => None,
    };

    let slug = match update.slug {
        Some(ref slug) => {
            let slug = slugify(slug);
            if slug != entry.slug && store.slug_taken(entry.kind, &slug, Some(id))? {
                return Err(EntryError::SlugTaken(slug));
            }
            Some(slug)
        }
        None => None,
    };

    let tags = match update.tags {
        Some(ref tags) => Some(tags.normalize()?),
        None => None,
    };

    let change = EntryChange {
        slug,
        title,
        summary: update.summary.clone()
            .map(|s| s.filter(|s| !s.trim().is_empty())),
        body: update.body.clone(),
        html: update.body.as_ref().map(|body| text_to_html(body)),
        tags,
    };

    store.update_entry(id, &change)?.ok_or(EntryError::NotFound)
}

/// Publish an entry.
///
/// Publishing an already published entry changes nothing.
pub fn publish_entry<S>(store: &S, id: i32) -> Result<Entry, EntryError>
where
    S: EntryStore + ?Sized,
{
    store.publish_entry(id, Utc::now())?.ok_or(EntryError::NotFound)
}

pub fn delete_entry<S>(store: &S, id: i32) -> Result<(), EntryError>
where
    S: EntryStore + ?Sized,
{
    if store.delete_entry(id)? {
        Ok(())
    } else {
        Err(EntryError::NotFound)
    }
}

/// List entries, newest first.
///
/// Entries are ordered by publication time, falling back to creation time
/// for entries which were never published.
pub fn list_entries<S>(store: &S, kind: Option<EntryKind>, include_drafts: bool)
-> Result<Vec<Entry>, StoreError>
where
    S: EntryStore + ?Sized,
{
    let mut entries = store.entries(kind, include_drafts)?;
    entries.sort_by_key(|e| Reverse((e.published_at.unwrap_or(e.created), e.created)));
    Ok(entries)
}

pub fn entry_by_slug<S>(store: &S, kind: EntryKind, slug: &str, include_drafts: bool)
-> Result<Option<Entry>, StoreError>
where
    S: EntryStore + ?Sized,
{
    store.entry_by_slug(kind, slug, include_drafts)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::store::MemoryStore;
    use super::*;

    fn draft(kind: EntryKind, title: &str) -> EntryDraft {
        EntryDraft {
            kind,
            title: title.to_string(),
            slug: None,
            summary: None,
            body: "First paragraph.\n\nSecond one.".to_string(),
            tags: Tags::Text("Rust, Web, rust".to_string()),
        }
    }

    #[test]
    fn new_entries_are_drafts() {
        let store = MemoryStore::new();
        let entry = create_entry(&store, &draft(EntryKind::Blog, "Hello, World!"))
            .unwrap();

        assert_eq!(entry.slug, "hello-world");
        assert_eq!(entry.status, ContentStatus::Draft);
        assert_eq!(entry.tags, ["rust", "web"]);
        assert_eq!(entry.html, "<p>First paragraph.</p>\n<p>Second one.</p>\n");
        assert!(entry.published_at.is_none());

        assert!(entry_by_slug(&store, EntryKind::Blog, "hello-world", false)
            .unwrap().is_none());
    }

    #[test]
    fn colliding_slugs_get_suffixes() {
        let store = MemoryStore::new();

        let a = create_entry(&store, &draft(EntryKind::Blog, "Launch")).unwrap();
        let b = create_entry(&store, &draft(EntryKind::Blog, "Launch")).unwrap();
        let c = create_entry(&store, &draft(EntryKind::Blog, "Launch!")).unwrap();
        let other = create_entry(&store, &draft(EntryKind::Job, "Launch")).unwrap();

        assert_eq!(a.slug, "launch");
        assert_eq!(b.slug, "launch-2");
        assert_eq!(c.slug, "launch-3");
        assert_eq!(other.slug, "launch");
    }

    #[test]
    fn explicit_slug_must_be_free() {
        let store = MemoryStore::new();
        create_entry(&store, &draft(EntryKind::Service, "Consulting")).unwrap();

        let mut second = draft(EntryKind::Service, "Something else");
        second.slug = Some("Consulting".to_string());

        match create_entry(&store, &second) {
            Err(EntryError::SlugTaken(ref slug)) if slug == "consulting" => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_title_is_rejected() {
        let store = MemoryStore::new();

        match create_entry(&store, &draft(EntryKind::Blog, "   ")) {
            Err(EntryError::EmptyTitle) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn invalid_tags_are_rejected() {
        let store = MemoryStore::new();
        let mut entry = draft(EntryKind::Blog, "Tags");
        entry.tags = Tags::Text("[1, 2".to_string());

        match create_entry(&store, &entry) {
            Err(EntryError::InvalidTags(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn update_keeps_slug_and_renders_body() {
        let store = MemoryStore::new();
        let entry = create_entry(&store, &draft(EntryKind::Blog, "Original")).unwrap();

        let updated = update_entry(&store, entry.id, &EntryUpdate {
            title: Some("Renamed".to_string()),
            body: Some("# Intro\n- one\n- two".to_string()),
            summary: Some(Some("Short".to_string())),
            ..EntryUpdate::default()
        }).unwrap();

        assert_eq!(updated.slug, "original");
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.summary.as_ref().map(String::as_str), Some("Short"));
        assert!(updated.html.contains("<h2>Intro</h2>"));
        assert!(updated.html.contains("<li>one</li>"));
        assert_eq!(updated.tags, entry.tags);

        let cleared = update_entry(&store, entry.id, &EntryUpdate {
            summary: Some(None),
            ..EntryUpdate::default()
        }).unwrap();
        assert_eq!(cleared.summary, None);
        assert_eq!(cleared.title, "Renamed");
    }

    #[test]
    fn update_to_taken_slug() {
        let store = MemoryStore::new();
        create_entry(&store, &draft(EntryKind::Blog, "First")).unwrap();
        let second = create_entry(&store, &draft(EntryKind::Blog, "Second")).unwrap();

        match update_entry(&store, second.id, &EntryUpdate {
            slug: Some("first".to_string()),
            ..EntryUpdate::default()
        }) {
            Err(EntryError::SlugTaken(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }

        // Keeping its own slug is fine.
        update_entry(&store, second.id, &EntryUpdate {
            slug: Some("second".to_string()),
            ..EntryUpdate::default()
        }).unwrap();
    }

    #[test]
    fn publish_sets_time_once() {
        let store = MemoryStore::new();
        let entry = create_entry(&store, &draft(EntryKind::Support, "Reset password"))
            .unwrap();

        let first = publish_entry(&store, entry.id).unwrap();
        let second = publish_entry(&store, entry.id).unwrap();

        assert!(first.status.is_published());
        assert!(first.published_at.is_some());
        assert_eq!(first.published_at, second.published_at);

        let found = entry_by_slug(&store, EntryKind::Support, "reset-password", false)
            .unwrap().unwrap();
        assert_eq!(found.id, entry.id);
    }

    #[test]
    fn missing_entries() {
        let store = MemoryStore::new();

        match publish_entry(&store, 7) {
            Err(EntryError::NotFound) => (),
            other => panic!("unexpected result: {:?}", other),
        }

        match delete_entry(&store, 7) {
            Err(EntryError::NotFound) => (),
            other => panic!("unexpected result: {:?}", other),
        }

        match update_entry(&store, 7, &EntryUpdate::default()) {
            Err(EntryError::NotFound) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn listing_filters_kind_and_drafts() {
        let store = MemoryStore::new();
        let post = create_entry(&store, &draft(EntryKind::Blog, "Post")).unwrap();
        create_entry(&store, &draft(EntryKind::Blog, "Unpublished")).unwrap();
        create_entry(&store, &draft(EntryKind::Job, "Engineer")).unwrap();
        publish_entry(&store, post.id).unwrap();

        let public = list_entries(&store, Some(EntryKind::Blog), false).unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, post.id);

        assert_eq!(list_entries(&store, Some(EntryKind::Blog), true).unwrap().len(), 2);
        assert_eq!(list_entries(&store, None, true).unwrap().len(), 3);

        delete_entry(&store, post.id).unwrap();
        assert!(list_entries(&store, Some(EntryKind::Blog), false).unwrap().is_empty());
    }

    #[test]
    fn listing_is_newest_first() {
        let store = MemoryStore::new();
        let old = create_entry(&store, &draft(EntryKind::Blog, "Old")).unwrap();
        let new = create_entry(&store, &draft(EntryKind::Blog, "New")).unwrap();
        let unpublished = create_entry(&store, &draft(EntryKind::Blog, "Draft"))
            .unwrap();
        let middle = create_entry(&store, &draft(EntryKind::Blog, "Middle"))
            .unwrap();

        // Publication time decides, not creation order.
        store.publish_entry(middle.id, Utc.ymd(2020, 2, 1).and_hms(12, 0, 0)).unwrap();
        store.publish_entry(new.id, Utc.ymd(2020, 3, 1).and_hms(12, 0, 0)).unwrap();
        store.publish_entry(old.id, Utc.ymd(2020, 1, 1).and_hms(12, 0, 0)).unwrap();

        let ids = |entries: Vec<Entry>| entries.into_iter()
            .map(|e| e.id)
            .collect::<Vec<_>>();

        assert_eq!(ids(list_entries(&store, None, false).unwrap()),
            [new.id, middle.id, old.id]);

        // A draft falls back to its creation time, which is later than all
        // of the above.
        assert_eq!(ids(list_entries(&store, None, true).unwrap()),
            [unpublished.id, new.id, middle.id, old.id]);
    }
}
