//! Pages composed of sections of content fields, and the operations which
//! read and publish them.

use failure::Fail;
use folio_error::ApiError;
use folio_macros::From;
use folio_util::non_empty;
use log::{error, warn};
use serde::{Deserialize, Serialize, Serializer};
use std::{collections::HashSet, fmt};

use crate::{
    db::{
        models::{Field, Page, Section},
        types::{ContentStatus, FieldType},
    },
    store::{ContentStore, StoreError},
};

/// A page together with its sections.
#[derive(Clone, Debug, Serialize)]
pub struct PageWithSections {
    #[serde(flatten)]
    pub page: Page,
    pub sections: Vec<SectionWithFields>,
}

/// A section together with its fields.
#[derive(Clone, Debug, Serialize)]
pub struct SectionWithFields {
    #[serde(flatten)]
    pub section: Section,
    pub fields: Vec<Field>,
}

impl PageWithSections {
    /// Find a section by its key.
    pub fn section(&self, key: &str) -> Option<&SectionWithFields> {
        self.sections.iter().find(|s| s.section.section_key == key)
    }

    /// Find a section by its ID.
    pub fn section_by_id(&self, id: i32) -> Option<&SectionWithFields> {
        self.sections.iter().find(|s| s.section.id == id)
    }

    pub(crate) fn section_by_id_mut(&mut self, id: i32)
    -> Option<&mut SectionWithFields> {
        self.sections.iter_mut().find(|s| s.section.id == id)
    }

    /// Value of a field in a section, with the same semantics as
    /// [`field_value`].
    pub fn field_value(&self, section: &str, key: &str) -> Option<&str> {
        field_value(self.section(section), key)
    }
}

impl SectionWithFields {
    /// Find a field by its key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.field_key == key)
    }

    pub(crate) fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.field_key == key)
    }
}

/// Value of a field for display.
///
/// Missing sections, missing fields, null values and empty values are all
/// treated as absent, so that callers can substitute their own default.
pub fn field_value<'a>(section: Option<&'a SectionWithFields>, key: &str)
-> Option<&'a str> {
    section
        .and_then(|section| section.field(key))
        .and_then(|field| non_empty(field.field_value.as_ref().map(String::as_str)))
}

/// Find a page by its route.
///
/// Unless `include_drafts` is set, a draft page is never returned.
pub fn get_page<S>(store: &S, route: &str, include_drafts: bool)
-> Result<Option<Page>, StoreError>
where
    S: ContentStore + ?Sized,
{
    store.page_by_route(route, include_drafts)
}

/// Get a page's sections in display order.
///
/// Unless `include_drafts` is set, draft sections are left out.
pub fn get_sections<S>(store: &S, page: i32, include_drafts: bool)
-> Result<Vec<Section>, StoreError>
where
    S: ContentStore + ?Sized,
{
    store.sections_of(page, include_drafts)
}

/// Get a section's fields in display order.
pub fn get_fields<S>(store: &S, section: i32) -> Result<Vec<Field>, StoreError>
where
    S: ContentStore + ?Sized,
{
    store.fields_of(section)
}

/// Load a page together with its sections and their fields.
///
/// Only failure to look up the page itself is reported as an error. If
/// sections can't be loaded the page is returned without any; if fields of
/// a section can't be loaded that section is returned without any.
pub fn get_page_with_sections<S>(store: &S, route: &str, include_drafts: bool)
-> Result<Option<PageWithSections>, StoreError>
where
    S: ContentStore + ?Sized,
{
    let page = match get_page(store, route, include_drafts)? {
        Some(page) => page,
        None => return Ok(None),
    };

    Ok(Some(load_tree(store, page, include_drafts)))
}

/// Load sections and fields of an already loaded page.
fn load_tree<S>(store: &S, page: Page, include_drafts: bool) -> PageWithSections
where
    S: ContentStore + ?Sized,
{
    let sections = match get_sections(store, page.id, include_drafts) {
        Ok(sections) => sections,
        Err(err) => {
            warn!("Could not load sections of page {}: {}", page.route, err);
            Vec::new()
        }
    };

    let sections = sections.into_iter()
        .map(|section| {
            let fields = get_fields(store, section.id).unwrap_or_else(|err| {
                warn!("Could not load fields of section {} ({}): {}",
                    section.section_key, section.id, err);
                Vec::new()
            });

            SectionWithFields { section, fields }
        })
        .collect();

    PageWithSections { page, sections }
}

/// Load content for rendering a page.
///
/// Store errors are logged and treated the same as a missing page.
pub fn get_page_content<S>(store: &S, route: &str, include_drafts: bool)
-> Option<PageWithSections>
where
    S: ContentStore + ?Sized,
{
    match get_page_with_sections(store, route, include_drafts) {
        Ok(page) => page,
        Err(err) => {
            error!("Could not load content of page {}: {}", route, err);
            None
        }
    }
}

/// New value for a single field.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldUpdate {
    pub field_key: String,
    pub field_value: String,
}

impl FieldUpdate {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        FieldUpdate {
            field_key: key.into(),
            field_value: value.into(),
        }
    }
}

/// Result of [`update_field_values`].
#[derive(Debug, Default, Serialize)]
pub struct FieldUpdateReport {
    /// Keys of fields which were written, in order.
    pub written: Vec<String>,
    /// The write which failed, if any.
    pub failed: Option<FailedWrite>,
    /// Keys of fields which were not attempted because of an earlier failure.
    pub skipped: Vec<String>,
}

impl FieldUpdateReport {
    /// Were all writes successful?
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct FailedWrite {
    pub field_key: String,
    #[serde(serialize_with = "ser_display")]
    pub error: WriteError,
}

#[derive(Debug, Fail)]
pub enum WriteError {
    /// There is no field with this key in the section.
    #[fail(display = "No such field")]
    NoSuchField,
    #[fail(display = "{}", _0)]
    Store(#[cause] StoreError),
}

/// Write new values of fields in a section.
///
/// Each update is a separate write, performed in order. Writing stops at the
/// first failure: values written before it stay written, and remaining
/// updates are not attempted.
pub fn update_field_values<S>(store: &S, section: i32, updates: &[FieldUpdate])
-> FieldUpdateReport
where
    S: ContentStore + ?Sized,
{
    let mut report = FieldUpdateReport::default();
    let mut updates = updates.iter();

    for update in updates.by_ref() {
        let error = match store.write_field(
            section, &update.field_key, &update.field_value,
        ) {
            Ok(true) => {
                report.written.push(update.field_key.clone());
                continue;
            }
            Ok(false) => WriteError::NoSuchField,
            Err(err) => WriteError::Store(err),
        };

        error!("Could not write field {} of section {}: {}",
            update.field_key, section, error);

        report.failed = Some(FailedWrite {
            field_key: update.field_key.clone(),
            error,
        });
        break;
    }

    report.skipped = updates.map(|u| u.field_key.clone()).collect();
    report
}

/// Result of a successful [`publish_page`].
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum PublishOutcome {
    /// Page and all its sections are now published.
    Published {
        sections: usize,
    },
    /// Page is now published, but its sections could not be updated. Use
    /// [`publish_sections`] to retry.
    SectionsPending {
        #[serde(serialize_with = "ser_display")]
        error: StoreError,
    },
}

impl PublishOutcome {
    pub fn is_complete(&self) -> bool {
        match self {
            PublishOutcome::Published { .. } => true,
            PublishOutcome::SectionsPending { .. } => false,
        }
    }
}

#[derive(ApiError, Debug, Fail, From)]
pub enum PublishError {
    #[fail(display = "No such page")]
    #[api(code = "page:not-found", status = "NOT_FOUND")]
    NotFound,
    #[fail(display = "Error publishing page: {}", _0)]
    Store(#[cause] #[from] StoreError),
}

/// Publish a page and all its sections.
///
/// The page is updated first; if that fails nothing else is changed. If
/// the page was updated but its sections couldn't be, the page stays
/// published and [`PublishOutcome::SectionsPending`] is returned.
pub fn publish_page<S>(store: &S, page: i32) -> Result<PublishOutcome, PublishError>
where
    S: ContentStore + ?Sized,
{
    if !store.set_page_status(page, ContentStatus::Published)? {
        return Err(PublishError::NotFound);
    }

    match publish_sections(store, page) {
        Ok(sections) => Ok(PublishOutcome::Published { sections }),
        Err(error) => {
            warn!("Page {} was published but its sections were not: {}",
                page, error);
            Ok(PublishOutcome::SectionsPending { error })
        }
    }
}

/// Publish all sections of a page, without changing the page itself.
pub fn publish_sections<S>(store: &S, page: i32) -> Result<usize, StoreError>
where
    S: ContentStore + ?Sized,
{
    store.set_section_statuses(page, ContentStatus::Published)
}

/// Description of a new page, as used for seeding and creating pages.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PageScaffold {
    pub route: String,
    pub page_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub sections: Vec<SectionScaffold>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SectionScaffold {
    pub section_key: String,
    pub section_type: String,
    #[serde(default)]
    pub fields: Vec<FieldScaffold>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldScaffold {
    pub field_key: String,
    #[serde(default)]
    pub field_value: Option<String>,
    #[serde(default)]
    pub field_type: FieldType,
}

impl PageScaffold {
    /// Check that this scaffold describes a valid page.
    pub fn validate(&self) -> Result<(), ScaffoldError> {
        if !self.route.starts_with('/') {
            return Err(ScaffoldError::BadRoute(self.route.clone()));
        }

        let mut sections = HashSet::new();

        for section in &self.sections {
            if !sections.insert(section.section_key.as_str()) {
                return Err(ScaffoldError::DuplicateSection(
                    section.section_key.clone()));
            }

            let mut fields = HashSet::new();

            for field in &section.fields {
                if !fields.insert(field.field_key.as_str()) {
                    return Err(ScaffoldError::DuplicateField(
                        section.section_key.clone(), field.field_key.clone()));
                }
            }
        }

        Ok(())
    }
}

#[derive(ApiError, Debug, Fail, From)]
pub enum ScaffoldError {
    #[fail(display = "Route must start with a slash: {}", _0)]
    #[api(code = "page:route:invalid", status = "BAD_REQUEST")]
    BadRoute(String),
    #[fail(display = "Section {} is defined more than once", _0)]
    #[api(code = "page:section:duplicate", status = "BAD_REQUEST")]
    DuplicateSection(String),
    #[fail(display = "Field {} in section {} is defined more than once", _1, _0)]
    #[api(code = "page:field:duplicate", status = "BAD_REQUEST")]
    DuplicateField(String, String),
    #[fail(display = "{}", _0)]
    Store(#[cause] #[from] StoreError),
}

/// Create a new draft page from a scaffold.
///
/// Sections and fields are given display order according to their position
/// in the scaffold.
pub fn create_page<S>(store: &S, scaffold: &PageScaffold)
-> Result<PageWithSections, ScaffoldError>
where
    S: ContentStore + ?Sized,
{
    scaffold.validate()?;
    Ok(store.create_page(scaffold)?)
}

fn ser_display<T, S>(value: &T, ser: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    ser.collect_str(value)
}
