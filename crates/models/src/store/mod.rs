//! Access to the backing content store.
//!
//! The store is split into two traits, one per table family, each method of
//! which maps to a single statement against the store (scaffolding a page
//! being the only exception). Multi-step operations are built on top of them
//! in [`crate::content`] and [`crate::entry`].

use chrono::{DateTime, Utc};
use diesel::result::Error as DbError;
use failure::Fail;
use folio_error::ApiError;
use folio_macros::From;
use std::sync::Arc;

use crate::{
    content::{PageScaffold, PageWithSections},
    db::{
        models::{Entry, EntryChange, Field, NewEntry, Page, Section},
        types::{ContentStatus, EntryKind},
    },
};

mod memory;
mod pg;

pub use self::{memory::MemoryStore, pg::PgStore};

/// Pages, their sections, and sections' content fields.
pub trait ContentStore: Send + Sync {
    /// Find a page by its route.
    ///
    /// Unless `include_drafts` is set only a published page matches.
    fn page_by_route(&self, route: &str, include_drafts: bool)
    -> Result<Option<Page>, StoreError>;

    /// Find a page by its ID, regardless of its status.
    fn page_by_id(&self, id: i32) -> Result<Option<Page>, StoreError>;

    /// Get all pages, ordered by route.
    fn all_pages(&self) -> Result<Vec<Page>, StoreError>;

    /// Get sections of a page, in display order.
    ///
    /// Unless `include_drafts` is set only published sections are returned.
    fn sections_of(&self, page: i32, include_drafts: bool)
    -> Result<Vec<Section>, StoreError>;

    /// Get fields of a section, in display order.
    fn fields_of(&self, section: i32) -> Result<Vec<Field>, StoreError>;

    /// Set value of the field `key` in a section.
    ///
    /// Returns `false` if there is no such field.
    fn write_field(&self, section: i32, key: &str, value: &str)
    -> Result<bool, StoreError>;

    /// Change status of a page.
    ///
    /// Returns `false` if there is no such page.
    fn set_page_status(&self, page: i32, status: ContentStatus)
    -> Result<bool, StoreError>;

    /// Change status of all sections of a page, returning how many sections
    /// there were.
    fn set_section_statuses(&self, page: i32, status: ContentStatus)
    -> Result<usize, StoreError>;

    /// Create a new draft page together with its sections and fields.
    fn create_page(&self, scaffold: &PageScaffold)
    -> Result<PageWithSections, StoreError>;

    /// Delete a page, its sections, and their fields.
    ///
    /// Returns `false` if there is no such page.
    fn delete_page(&self, page: i32) -> Result<bool, StoreError>;
}

/// Long-form content entries.
pub trait EntryStore: Send + Sync {
    /// Get entries, newest first.
    ///
    /// Unless `include_drafts` is set only published entries are returned.
    fn entries(&self, kind: Option<EntryKind>, include_drafts: bool)
    -> Result<Vec<Entry>, StoreError>;

    fn entry_by_id(&self, id: i32) -> Result<Option<Entry>, StoreError>;

    fn entry_by_slug(&self, kind: EntryKind, slug: &str, include_drafts: bool)
    -> Result<Option<Entry>, StoreError>;

    /// Is `slug` used by an entry of `kind` other than `except`?
    fn slug_taken(&self, kind: EntryKind, slug: &str, except: Option<i32>)
    -> Result<bool, StoreError>;

    fn insert_entry(&self, entry: &NewEntry) -> Result<Entry, StoreError>;

    /// Apply changes to an entry, returning `None` if there is no such entry.
    fn update_entry(&self, id: i32, change: &EntryChange)
    -> Result<Option<Entry>, StoreError>;

    /// Mark an entry as published.
    ///
    /// `at` is recorded as the publication time only if the entry has never
    /// been published before.
    fn publish_entry(&self, id: i32, at: DateTime<Utc>)
    -> Result<Option<Entry>, StoreError>;

    /// Returns `false` if there is no such entry.
    fn delete_entry(&self, id: i32) -> Result<bool, StoreError>;
}

/// Complete content store.
pub trait Store: ContentStore + EntryStore {}

impl<T: ContentStore + EntryStore> Store for T {}

/// Store handle shared between request handlers.
pub type SharedStore = Arc<dyn Store>;

#[derive(ApiError, Debug, Fail, From)]
pub enum StoreError {
    /// Database error.
    #[fail(display = "Database error: {}", _0)]
    #[api(internal)]
    Database(#[cause] #[from] DbError),
    /// Could not obtain a connection from the pool.
    #[fail(display = "Cannot obtain a database connection: {}", _0)]
    #[api(internal)]
    Pool(#[cause] #[from] r2d2::Error),
    /// A record with the same unique key already exists.
    #[fail(display = "Duplicate {}", _0)]
    #[api(code = "store:duplicate", status = "CONFLICT")]
    Duplicate(&'static str),
    /// Store could not be reached.
    #[fail(display = "Store unavailable: {}", _0)]
    #[api(internal)]
    Unavailable(String),
}
