#[macro_use] extern crate diesel;

#[cfg(not(debug_assertions))]
#[macro_use]
extern crate diesel_migrations;

pub mod content;
pub mod db;
pub mod editor;
pub mod entry;
pub mod store;

pub use folio_util::Tags;

pub use self::{
    content::{
        FieldUpdate,
        FieldUpdateReport,
        PageScaffold,
        PageWithSections,
        PublishOutcome,
        SectionWithFields,
    },
    db::{
        models::{Entry, Field, Page, Section},
        types::{ContentStatus, EntryKind, FieldType},
    },
    editor::{Editor, EditorError, EditorState},
    entry::{EntryDraft, EntryError, EntryUpdate},
    store::{ContentStore, EntryStore, MemoryStore, PgStore, SharedStore, Store, StoreError},
};
