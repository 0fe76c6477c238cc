use chrono::{DateTime, Utc};
use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use crate::{
    content::{PageScaffold, PageWithSections, SectionWithFields},
    db::{
        models::{Entry, EntryChange, Field, NewEntry, Page, Section},
        types::{ContentStatus, EntryKind},
    },
};
use super::{ContentStore, EntryStore, StoreError};

/// Content store kept entirely in memory.
///
/// Besides being a store on its own, it can be told to fail selected
/// operations, which makes it possible to observe how callers handle
/// partial failures.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
    faults: Mutex<Faults>,
}

#[derive(Default)]
struct Data {
    pages: Vec<Page>,
    sections: Vec<Section>,
    fields: Vec<Field>,
    entries: Vec<Entry>,
    next_id: i32,
    write_attempts: Vec<String>,
    section_lookups: usize,
}

#[derive(Default)]
struct Faults {
    field_writes: HashSet<String>,
    field_lookups: HashSet<i32>,
    page_lookup: bool,
    page_publish: bool,
    section_lookup: bool,
    section_publish: bool,
}

impl Data {
    fn id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn data(&self) -> MutexGuard<Data> {
        self.data.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn faults(&self) -> MutexGuard<Faults> {
        self.faults.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Make writes to fields named `key` fail.
    pub fn fail_field_write(&self, key: &str) {
        self.faults().field_writes.insert(key.to_string());
    }

    /// Make looking up fields of `section` fail.
    pub fn fail_field_lookup(&self, section: i32) {
        self.faults().field_lookups.insert(section);
    }

    /// Make looking up pages fail.
    pub fn fail_page_lookup(&self, fail: bool) {
        self.faults().page_lookup = fail;
    }

    /// Make changing status of a page fail.
    pub fn fail_page_publish(&self, fail: bool) {
        self.faults().page_publish = fail;
    }

    /// Make looking up sections of a page fail.
    pub fn fail_section_lookup(&self, fail: bool) {
        self.faults().section_lookup = fail;
    }

    /// Make changing status of sections fail.
    pub fn fail_section_publish(&self, fail: bool) {
        self.faults().section_publish = fail;
    }

    pub fn clear_faults(&self) {
        *self.faults() = Faults::default();
    }

    /// Keys of all fields for which a write was attempted, in order.
    pub fn write_attempts(&self) -> Vec<String> {
        self.data().write_attempts.clone()
    }

    /// How many times were sections looked up.
    pub fn section_lookups(&self) -> usize {
        self.data().section_lookups
    }

    /// Change status of a single section.
    pub fn set_section_status(&self, section: i32, status: ContentStatus) -> bool {
        let mut data = self.data();

        match data.sections.iter_mut().find(|s| s.id == section) {
            Some(section) => {
                section.status = status;
                true
            }
            None => false,
        }
    }
}

fn fault(what: &str) -> StoreError {
    StoreError::Unavailable(format!("injected failure: {}", what))
}

impl ContentStore for MemoryStore {
    fn page_by_route(&self, route: &str, include_drafts: bool)
    -> Result<Option<Page>, StoreError> {
        if self.faults().page_lookup {
            return Err(fault("page lookup"));
        }

        Ok(self.data().pages.iter()
            .find(|p| p.route == route
                && (include_drafts || p.status.is_published()))
            .cloned())
    }

    fn page_by_id(&self, id: i32) -> Result<Option<Page>, StoreError> {
        if self.faults().page_lookup {
            return Err(fault("page lookup"));
        }

        Ok(self.data().pages.iter().find(|p| p.id == id).cloned())
    }

    fn all_pages(&self) -> Result<Vec<Page>, StoreError> {
        if self.faults().page_lookup {
            return Err(fault("page lookup"));
        }

        let mut pages = self.data().pages.clone();
        pages.sort_by(|a, b| a.route.cmp(&b.route));
        Ok(pages)
    }

    fn sections_of(&self, page: i32, include_drafts: bool)
    -> Result<Vec<Section>, StoreError> {
        let mut data = self.data();
        data.section_lookups += 1;

        if self.faults().section_lookup {
            return Err(fault("section lookup"));
        }

        let mut sections = data.sections.iter()
            .filter(|s| s.page_id == page
                && (include_drafts || s.status.is_published()))
            .cloned()
            .collect::<Vec<_>>();
        sections.sort_by_key(|s| (s.display_order, s.id));
        Ok(sections)
    }

    fn fields_of(&self, section: i32) -> Result<Vec<Field>, StoreError> {
        if self.faults().field_lookups.contains(&section) {
            return Err(fault("field lookup"));
        }

        let mut fields = self.data().fields.iter()
            .filter(|f| f.section_id == section)
            .cloned()
            .collect::<Vec<_>>();
        fields.sort_by_key(|f| (f.display_order, f.id));
        Ok(fields)
    }

    fn write_field(&self, section: i32, key: &str, value: &str)
    -> Result<bool, StoreError> {
        let mut data = self.data();
        data.write_attempts.push(key.to_string());

        if self.faults().field_writes.contains(key) {
            return Err(fault("field write"));
        }

        match data.fields.iter_mut()
            .find(|f| f.section_id == section && f.field_key == key)
        {
            Some(field) => {
                field.field_value = Some(value.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_page_status(&self, page: i32, status: ContentStatus)
    -> Result<bool, StoreError> {
        if self.faults().page_publish {
            return Err(fault("page status"));
        }

        match self.data().pages.iter_mut().find(|p| p.id == page) {
            Some(page) => {
                page.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_section_statuses(&self, page: i32, status: ContentStatus)
    -> Result<usize, StoreError> {
        if self.faults().section_publish {
            return Err(fault("section status"));
        }

        let mut count = 0;

        for section in self.data().sections.iter_mut().filter(|s| s.page_id == page) {
            section.status = status;
            count += 1;
        }

        Ok(count)
    }

    fn create_page(&self, scaffold: &PageScaffold)
    -> Result<PageWithSections, StoreError> {
        let mut data = self.data();

        if data.pages.iter().any(|p| p.route == scaffold.route) {
            return Err(StoreError::Duplicate("route"));
        }

        let page = Page {
            id: data.id(),
            route: scaffold.route.clone(),
            page_title: scaffold.page_title.clone(),
            meta_description: scaffold.meta_description.clone(),
            status: ContentStatus::Draft,
        };
        data.pages.push(page.clone());

        let mut sections = Vec::with_capacity(scaffold.sections.len());

        for (order, s) in scaffold.sections.iter().enumerate() {
            let section = Section {
                id: data.id(),
                page_id: page.id,
                section_key: s.section_key.clone(),
                section_type: s.section_type.clone(),
                display_order: order as i32,
                status: ContentStatus::Draft,
            };
            data.sections.push(section.clone());

            let mut fields = Vec::with_capacity(s.fields.len());

            for (order, f) in s.fields.iter().enumerate() {
                let field = Field {
                    id: data.id(),
                    section_id: section.id,
                    field_key: f.field_key.clone(),
                    field_value: f.field_value.clone(),
                    field_type: f.field_type,
                    display_order: order as i32,
                };
                data.fields.push(field.clone());
                fields.push(field);
            }

            sections.push(SectionWithFields { section, fields });
        }

        Ok(PageWithSections { page, sections })
    }

    fn delete_page(&self, page: i32) -> Result<bool, StoreError> {
        let mut data = self.data();
        let before = data.pages.len();
        data.pages.retain(|p| p.id != page);

        if data.pages.len() == before {
            return Ok(false);
        }

        let sections = data.sections.iter()
            .filter(|s| s.page_id == page)
            .map(|s| s.id)
            .collect::<HashSet<_>>();
        data.sections.retain(|s| s.page_id != page);
        data.fields.retain(|f| !sections.contains(&f.section_id));

        Ok(true)
    }
}

impl EntryStore for MemoryStore {
    fn entries(&self, kind: Option<EntryKind>, include_drafts: bool)
    -> Result<Vec<Entry>, StoreError> {
        let mut entries = self.data().entries.iter()
            .filter(|e| kind.map_or(true, |kind| e.kind == kind))
            .filter(|e| include_drafts || e.status.is_published())
            .cloned()
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    fn entry_by_id(&self, id: i32) -> Result<Option<Entry>, StoreError> {
        Ok(self.data().entries.iter().find(|e| e.id == id).cloned())
    }

    fn entry_by_slug(&self, kind: EntryKind, slug: &str, include_drafts: bool)
    -> Result<Option<Entry>, StoreError> {
        Ok(self.data().entries.iter()
            .find(|e| e.kind == kind && e.slug == slug
                && (include_drafts || e.status.is_published()))
            .cloned())
    }

    fn slug_taken(&self, kind: EntryKind, slug: &str, except: Option<i32>)
    -> Result<bool, StoreError> {
        Ok(self.data().entries.iter()
            .any(|e| e.kind == kind && e.slug == slug && Some(e.id) != except))
    }

    fn insert_entry(&self, entry: &NewEntry) -> Result<Entry, StoreError> {
        let mut data = self.data();

        if data.entries.iter().any(|e| e.kind == entry.kind && e.slug == entry.slug) {
            return Err(StoreError::Duplicate("slug"));
        }

        let entry = Entry {
            id: data.id(),
            kind: entry.kind,
            slug: entry.slug.clone(),
            title: entry.title.clone(),
            summary: entry.summary.clone(),
            body: entry.body.clone(),
            html: entry.html.clone(),
            tags: entry.tags.clone(),
            status: entry.status,
            created: entry.created,
            published_at: None,
        };
        data.entries.push(entry.clone());

        Ok(entry)
    }

    fn update_entry(&self, id: i32, change: &EntryChange)
    -> Result<Option<Entry>, StoreError> {
        let mut data = self.data();

        let kind = match data.entries.iter().find(|e| e.id == id) {
            Some(entry) => entry.kind,
            None => return Ok(None),
        };

        if let Some(ref slug) = change.slug {
            if data.entries.iter().any(|e| e.id != id && e.kind == kind && &e.slug == slug) {
                return Err(StoreError::Duplicate("slug"));
            }
        }

        let entry = match data.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if let Some(ref slug) = change.slug {
            entry.slug = slug.clone();
        }
        if let Some(ref title) = change.title {
            entry.title = title.clone();
        }
        if let Some(ref summary) = change.summary {
            entry.summary = summary.clone();
        }
        if let Some(ref body) = change.body {
            entry.body = body.clone();
        }
        if let Some(ref html) = change.html {
            entry.html = html.clone();
        }
        if let Some(ref tags) = change.tags {
            entry.tags = tags.clone();
        }

        Ok(Some(entry.clone()))
    }

    fn publish_entry(&self, id: i32, at: DateTime<Utc>)
    -> Result<Option<Entry>, StoreError> {
        let mut data = self.data();

        Ok(data.entries.iter_mut().find(|e| e.id == id).map(|entry| {
            entry.status = ContentStatus::Published;
            entry.published_at.get_or_insert(at);
            entry.clone()
        }))
    }

    fn delete_entry(&self, id: i32) -> Result<bool, StoreError> {
        let mut data = self.data();
        let before = data.entries.len();
        data.entries.retain(|e| e.id != id);
        Ok(data.entries.len() != before)
    }
}
