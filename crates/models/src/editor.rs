//! Editing session for a single page.

use failure::Fail;
use folio_error::ApiError;
use folio_macros::From;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    content::{
        self,
        FieldUpdate,
        FieldUpdateReport,
        PageWithSections,
        PublishError,
        PublishOutcome,
    },
    db::types::ContentStatus,
    store::{ContentStore, StoreError},
};

/// State of an editing session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditorState {
    /// No page was loaded yet, or loading failed.
    Unloaded,
    /// Page is loaded and has no unsaved changes.
    Loaded,
    /// There are unsaved changes.
    Editing,
    /// Changes to a section were saved.
    Saved,
    /// Page was published.
    Published,
}

/// An editing session, holding a working copy of a page.
///
/// Edits are kept in memory until their section is explicitly saved. Saving
/// one section never affects unsaved edits in other sections.
pub struct Editor<'s, S: ?Sized> {
    store: &'s S,
    page: Option<PageWithSections>,
    /// Unsaved values, by section ID and field key.
    edits: BTreeMap<i32, BTreeMap<String, String>>,
    state: EditorState,
}

#[derive(ApiError, Debug, Fail, From)]
pub enum EditorError {
    #[fail(display = "No page is loaded")]
    #[api(code = "editor:not-loaded", status = "BAD_REQUEST")]
    NotLoaded,
    #[fail(display = "No such page: {}", _0)]
    #[api(code = "page:not-found", status = "NOT_FOUND")]
    PageNotFound(String),
    #[fail(display = "No such section: {}", _0)]
    #[api(code = "section:not-found", status = "NOT_FOUND")]
    SectionNotFound(i32),
    #[fail(display = "No field {} in section {}", _1, _0)]
    #[api(code = "field:not-found", status = "NOT_FOUND")]
    FieldNotFound(i32, String),
    #[fail(display = "Error saving changes")]
    #[api(code = "section:save:failed", status = "INTERNAL_SERVER_ERROR")]
    SaveFailed(FieldUpdateReport),
    #[fail(display = "{}", _0)]
    Publish(#[cause] #[from] PublishError),
    #[fail(display = "{}", _0)]
    Store(#[cause] #[from] StoreError),
}

impl<'s, S> Editor<'s, S>
where
    S: ContentStore + ?Sized,
{
    pub fn new(store: &'s S) -> Self {
        Editor {
            store,
            page: None,
            edits: BTreeMap::new(),
            state: EditorState::Unloaded,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Working copy of the page, without unsaved edits applied.
    pub fn page(&self) -> Option<&PageWithSections> {
        self.page.as_ref()
    }

    /// Load a page, including its draft sections.
    ///
    /// Any unsaved edits are discarded.
    pub fn load(&mut self, route: &str) -> Result<&PageWithSections, EditorError> {
        self.edits.clear();
        self.page = None;
        self.state = EditorState::Unloaded;

        let page = content::get_page_with_sections(self.store, route, true)?
            .ok_or_else(|| EditorError::PageNotFound(route.to_string()))?;

        debug!("Loaded page {} for editing", route);

        self.state = EditorState::Loaded;
        Ok(self.page.get_or_insert(page))
    }

    /// Change value of a field. The change is not saved.
    pub fn set_field(&mut self, section: i32, key: &str, value: &str)
    -> Result<(), EditorError> {
        let page = self.page.as_ref().ok_or(EditorError::NotLoaded)?;
        let section_data = page.section_by_id(section)
            .ok_or(EditorError::SectionNotFound(section))?;

        if section_data.field(key).is_none() {
            return Err(EditorError::FieldNotFound(section, key.to_string()));
        }

        self.edits.entry(section)
            .or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self.state = EditorState::Editing;

        Ok(())
    }

    /// Current value of a field, including unsaved changes.
    pub fn field_value(&self, section: i32, key: &str) -> Option<&str> {
        if let Some(value) = self.edits.get(&section).and_then(|e| e.get(key)) {
            return Some(value);
        }

        self.page.as_ref()?
            .section_by_id(section)?
            .field(key)?
            .field_value
            .as_ref()
            .map(String::as_str)
    }

    /// Are there any unsaved changes?
    pub fn is_dirty(&self) -> bool {
        self.edits.values().any(|e| !e.is_empty())
    }

    /// IDs of sections with unsaved changes.
    pub fn dirty_sections(&self) -> BTreeSet<i32> {
        self.edits.iter()
            .filter(|(_, e)| !e.is_empty())
            .map(|(&id, _)| id)
            .collect()
    }

    /// Save changes made to fields of a single section.
    ///
    /// Only changed fields are written. If writing any of them fails, values
    /// written before it stay saved and the rest remain as unsaved edits.
    pub fn save_section(&mut self, section: i32)
    -> Result<FieldUpdateReport, EditorError> {
        let page = self.page.as_mut().ok_or(EditorError::NotLoaded)?;
        let section_data = page.section_by_id_mut(section)
            .ok_or(EditorError::SectionNotFound(section))?;

        let updates = self.edits.get(&section)
            .map(|edits| edits.iter()
                .map(|(key, value)| FieldUpdate::new(key.as_str(), value.as_str()))
                .collect::<Vec<_>>())
            .unwrap_or_default();

        let report = content::update_field_values(self.store, section, &updates);

        for key in &report.written {
            let value = self.edits.get_mut(&section)
                .and_then(|edits| edits.remove(key));

            if let (Some(field), Some(value)) = (section_data.field_mut(key), value) {
                field.field_value = Some(value);
            }
        }

        if !report.is_success() {
            return Err(EditorError::SaveFailed(report));
        }

        self.edits.remove(&section);
        self.state = if self.is_dirty() {
            EditorState::Editing
        } else {
            EditorState::Saved
        };

        Ok(report)
    }

    /// Publish the page and all its sections.
    ///
    /// Unsaved edits are not published, and are discarded when the page is
    /// reloaded after publishing. On failure the session is left unchanged.
    pub fn publish(&mut self) -> Result<usize, EditorError> {
        let (id, route) = match self.page {
            Some(ref page) => (page.page.id, page.page.route.clone()),
            None => return Err(EditorError::NotLoaded),
        };

        let sections = match content::publish_page(self.store, id)? {
            PublishOutcome::Published { sections } => sections,
            PublishOutcome::SectionsPending { error } =>
                return Err(EditorError::Store(error)),
        };

        match content::get_page_with_sections(self.store, &route, true) {
            Ok(Some(page)) => {
                self.page = Some(page);
                self.edits.clear();
            }
            result => {
                if let Err(err) = result {
                    warn!("Could not reload page {} after publishing: {}",
                        route, err);
                }

                if let Some(ref mut page) = self.page {
                    page.page.status = ContentStatus::Published;
                    for section in &mut page.sections {
                        section.section.status = ContentStatus::Published;
                    }
                }
            }
        }

        self.state = EditorState::Published;
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        content::{FieldScaffold, PageScaffold, SectionScaffold},
        db::types::FieldType,
        store::MemoryStore,
    };
    use super::*;

    fn seed(store: &MemoryStore) -> (i32, i32) {
        let page = store.create_page(&PageScaffold {
            route: "/about".to_string(),
            page_title: "About".to_string(),
            meta_description: String::new(),
            sections: vec![
                SectionScaffold {
                    section_key: "hero".to_string(),
                    section_type: "hero".to_string(),
                    fields: vec![
                        FieldScaffold {
                            field_key: "heading".to_string(),
                            field_value: Some("Old".to_string()),
                            field_type: FieldType::Text,
                        },
                        FieldScaffold {
                            field_key: "subheading".to_string(),
                            field_value: Some("Sub".to_string()),
                            field_type: FieldType::Textarea,
                        },
                    ],
                },
                SectionScaffold {
                    section_key: "story".to_string(),
                    section_type: "text".to_string(),
                    fields: vec![
                        FieldScaffold {
                            field_key: "body".to_string(),
                            field_value: None,
                            field_type: FieldType::Textarea,
                        },
                    ],
                },
            ],
        }).unwrap();

        (page.sections[0].section.id, page.sections[1].section.id)
    }

    #[test]
    fn edit_save_publish() {
        let store = MemoryStore::new();
        let (hero, _) = seed(&store);
        let mut editor = Editor::new(&store);

        editor.load("/about").unwrap();
        assert_eq!(editor.state(), EditorState::Loaded);

        editor.set_field(hero, "heading", "New").unwrap();
        assert_eq!(editor.state(), EditorState::Editing);
        assert_eq!(editor.field_value(hero, "heading"), Some("New"));

        let report = editor.save_section(hero).unwrap();
        assert_eq!(report.written, ["heading"]);
        assert_eq!(editor.state(), EditorState::Saved);
        assert!(!editor.is_dirty());

        assert_eq!(editor.publish().unwrap(), 2);
        assert_eq!(editor.state(), EditorState::Published);

        let public = content::get_page_content(&store, "/about", false).unwrap();
        assert_eq!(public.field_value("hero", "heading"), Some("New"));
        assert_eq!(public.sections.len(), 2);
    }

    #[test]
    fn unsaved_edits_are_not_written() {
        let store = MemoryStore::new();
        let (hero, _) = seed(&store);
        let mut editor = Editor::new(&store);

        editor.load("/about").unwrap();
        editor.set_field(hero, "heading", "New").unwrap();

        assert!(store.write_attempts().is_empty());

        let stored = content::get_fields(&store, hero).unwrap();
        assert_eq!(stored[0].field_value.as_ref().map(String::as_str), Some("Old"));
    }

    #[test]
    fn save_writes_only_changed_fields_of_one_section() {
        let store = MemoryStore::new();
        let (hero, story) = seed(&store);
        let mut editor = Editor::new(&store);

        editor.load("/about").unwrap();
        editor.set_field(hero, "heading", "New").unwrap();
        editor.set_field(story, "body", "Once upon a time").unwrap();

        editor.save_section(hero).unwrap();

        assert_eq!(store.write_attempts(), ["heading"]);
        assert_eq!(editor.state(), EditorState::Editing);
        assert_eq!(editor.dirty_sections().into_iter().collect::<Vec<_>>(), [story]);
        assert_eq!(editor.field_value(story, "body"), Some("Once upon a time"));
    }

    #[test]
    fn failed_save_keeps_remaining_edits() {
        let store = MemoryStore::new();
        let (hero, _) = seed(&store);
        let mut editor = Editor::new(&store);
        store.fail_field_write("subheading");

        editor.load("/about").unwrap();
        editor.set_field(hero, "heading", "New").unwrap();
        editor.set_field(hero, "subheading", "New sub").unwrap();

        match editor.save_section(hero) {
            Err(EditorError::SaveFailed(report)) => {
                assert_eq!(report.written, ["heading"]);
                assert_eq!(report.failed.unwrap().field_key, "subheading");
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.written)),
        }

        assert_eq!(editor.state(), EditorState::Editing);
        assert_eq!(editor.field_value(hero, "subheading"), Some("New sub"));
        assert_eq!(editor.field_value(hero, "heading"), Some("New"));
        assert!(editor.is_dirty());
    }

    #[test]
    fn failed_publish_leaves_state() {
        let store = MemoryStore::new();
        seed(&store);
        let mut editor = Editor::new(&store);
        store.fail_page_publish(true);

        editor.load("/about").unwrap();

        assert!(editor.publish().is_err());
        assert_eq!(editor.state(), EditorState::Loaded);
        assert!(!editor.page().unwrap().page.status.is_published());
    }

    #[test]
    fn pending_sections_leave_session() {
        let store = MemoryStore::new();
        let (hero, _) = seed(&store);
        let mut editor = Editor::new(&store);
        store.fail_section_publish(true);

        editor.load("/about").unwrap();
        editor.set_field(hero, "heading", "New").unwrap();

        match editor.publish() {
            Err(EditorError::Store(StoreError::Unavailable(_))) => (),
            other => panic!("unexpected result: {:?}", other),
        }

        assert_eq!(editor.state(), EditorState::Editing);
        assert_eq!(editor.field_value(hero, "heading"), Some("New"));
        let page = editor.page().unwrap();
        assert!(!page.page.status.is_published());
        assert!(page.sections.iter().all(|s| !s.section.status.is_published()));

        // The page went out, its sections did not.
        assert!(content::get_page(&store, "/about", false).unwrap().is_some());
        assert!(content::get_sections(&store, page.page.id, false).unwrap().is_empty());

        store.clear_faults();
        assert_eq!(editor.publish().unwrap(), 2);
        assert_eq!(editor.state(), EditorState::Published);
    }

    #[test]
    fn publish_errors_read_once() {
        let err = EditorError::from(PublishError::Store(
            StoreError::Unavailable("down".to_string())));
        let message = err.to_string();

        assert!(message.starts_with("Error publishing page: "));
        assert_eq!(message.matches("Error publishing page").count(), 1);
    }

    #[test]
    fn reload_discards_edits() {
        let store = MemoryStore::new();
        let (hero, _) = seed(&store);
        let mut editor = Editor::new(&store);

        editor.load("/about").unwrap();
        editor.set_field(hero, "heading", "New").unwrap();
        editor.load("/about").unwrap();

        assert!(!editor.is_dirty());
        assert_eq!(editor.field_value(hero, "heading"), Some("Old"));
    }

    #[test]
    fn editing_requires_a_page() {
        let store = MemoryStore::new();
        let mut editor = Editor::new(&store);

        match editor.load("/missing") {
            Err(EditorError::PageNotFound(_)) => (),
            other => panic!("unexpected result: {:?}", other.map(|p| p.page.id)),
        }

        match editor.set_field(1, "heading", "x") {
            Err(EditorError::NotLoaded) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
