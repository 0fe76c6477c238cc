use chrono::{DateTime, Utc};
use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DbError},
};

use crate::{
    content::{PageScaffold, PageWithSections, SectionWithFields},
    db::{
        Pool,
        PooledConnection,
        models::*,
        schema::{content_fields, entries, page_sections, pages},
        types::{ContentStatus, EntryKind},
    },
};
use super::{ContentStore, EntryStore, StoreError};

/// Content store backed by a PostgreSQL database.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> PgStore {
        PgStore { pool }
    }

    fn conn(&self) -> Result<PooledConnection, StoreError> {
        Ok(self.pool.get()?)
    }
}

/// Map a unique constraint violation to [`StoreError::Duplicate`].
fn unique(what: &'static str) -> impl Fn(DbError) -> StoreError {
    move |err| match err {
        DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) =>
            StoreError::Duplicate(what),
        _ => StoreError::Database(err),
    }
}

impl ContentStore for PgStore {
    fn page_by_route(&self, route: &str, include_drafts: bool)
    -> Result<Option<Page>, StoreError> {
        let db = self.conn()?;
        let mut query = pages::table
            .filter(pages::route.eq(route))
            .into_boxed();

        if !include_drafts {
            query = query.filter(pages::status.eq(ContentStatus::Published));
        }

        Ok(query.get_result::<Page>(&*db).optional()?)
    }

    fn page_by_id(&self, id: i32) -> Result<Option<Page>, StoreError> {
        let db = self.conn()?;

        Ok(pages::table
            .find(id)
            .get_result::<Page>(&*db)
            .optional()?)
    }

    fn all_pages(&self) -> Result<Vec<Page>, StoreError> {
        let db = self.conn()?;

        Ok(pages::table
            .order_by(pages::route.asc())
            .get_results::<Page>(&*db)?)
    }

    fn sections_of(&self, page: i32, include_drafts: bool)
    -> Result<Vec<Section>, StoreError> {
        let db = self.conn()?;
        let mut query = page_sections::table
            .filter(page_sections::page_id.eq(page))
            .into_boxed();

        if !include_drafts {
            query = query.filter(page_sections::status.eq(ContentStatus::Published));
        }

        Ok(query
            .order_by((page_sections::display_order.asc(), page_sections::id.asc()))
            .get_results::<Section>(&*db)?)
    }

    fn fields_of(&self, section: i32) -> Result<Vec<Field>, StoreError> {
        let db = self.conn()?;

        Ok(content_fields::table
            .filter(content_fields::section_id.eq(section))
            .order_by((content_fields::display_order.asc(), content_fields::id.asc()))
            .get_results::<Field>(&*db)?)
    }

    fn write_field(&self, section: i32, key: &str, value: &str)
    -> Result<bool, StoreError> {
        let db = self.conn()?;

        let updated = diesel::update(content_fields::table
            .filter(content_fields::section_id.eq(section)
                .and(content_fields::field_key.eq(key))))
            .set(content_fields::field_value.eq(Some(value)))
            .execute(&*db)?;

        Ok(updated > 0)
    }

    fn set_page_status(&self, page: i32, status: ContentStatus)
    -> Result<bool, StoreError> {
        let db = self.conn()?;

        let updated = diesel::update(pages::table.find(page))
            .set(pages::status.eq(status))
            .execute(&*db)?;

        Ok(updated > 0)
    }

    fn set_section_statuses(&self, page: i32, status: ContentStatus)
    -> Result<usize, StoreError> {
        let db = self.conn()?;

        Ok(diesel::update(page_sections::table
            .filter(page_sections::page_id.eq(page)))
            .set(page_sections::status.eq(status))
            .execute(&*db)?)
    }

    fn create_page(&self, scaffold: &PageScaffold)
    -> Result<PageWithSections, StoreError> {
        let db = self.conn()?;

        db.transaction::<_, StoreError, _>(|| {
            let page = diesel::insert_into(pages::table)
                .values(&NewPage {
                    route: &scaffold.route,
                    page_title: &scaffold.page_title,
                    meta_description: &scaffold.meta_description,
                    status: ContentStatus::Draft,
                })
                .get_result::<Page>(&*db)
                .map_err(unique("route"))?;

            let mut sections = Vec::with_capacity(scaffold.sections.len());

            for (order, s) in scaffold.sections.iter().enumerate() {
                let section = diesel::insert_into(page_sections::table)
                    .values(&NewSection {
                        page_id: page.id,
                        section_key: &s.section_key,
                        section_type: &s.section_type,
                        display_order: order as i32,
                        status: ContentStatus::Draft,
                    })
                    .get_result::<Section>(&*db)
                    .map_err(unique("section"))?;

                let fields = s.fields.iter()
                    .enumerate()
                    .map(|(order, f)| NewField {
                        section_id: section.id,
                        field_key: &f.field_key,
                        field_value: f.field_value.as_ref().map(String::as_str),
                        field_type: f.field_type,
                        display_order: order as i32,
                    })
                    .collect::<Vec<_>>();

                let fields = if fields.is_empty() {
                    Vec::new()
                } else {
                    diesel::insert_into(content_fields::table)
                        .values(&fields)
                        .get_results::<Field>(&*db)
                        .map_err(unique("field"))?
                };

                sections.push(SectionWithFields { section, fields });
            }

            Ok(PageWithSections { page, sections })
        })
    }

    fn delete_page(&self, page: i32) -> Result<bool, StoreError> {
        let db = self.conn()?;

        // Sections and fields are removed by cascading foreign keys.
        let deleted = diesel::delete(pages::table.find(page)).execute(&*db)?;

        Ok(deleted > 0)
    }
}

impl EntryStore for PgStore {
    fn entries(&self, kind: Option<EntryKind>, include_drafts: bool)
    -> Result<Vec<Entry>, StoreError> {
        let db = self.conn()?;
        let mut query = entries::table.into_boxed();

        if let Some(kind) = kind {
            query = query.filter(entries::kind.eq(kind));
        }

        if !include_drafts {
            query = query.filter(entries::status.eq(ContentStatus::Published));
        }

        Ok(query
            .order_by((entries::created.desc(), entries::id.desc()))
            .get_results::<Entry>(&*db)?)
    }

    fn entry_by_id(&self, id: i32) -> Result<Option<Entry>, StoreError> {
        let db = self.conn()?;

        Ok(entries::table
            .find(id)
            .get_result::<Entry>(&*db)
            .optional()?)
    }

    fn entry_by_slug(&self, kind: EntryKind, slug: &str, include_drafts: bool)
    -> Result<Option<Entry>, StoreError> {
        let db = self.conn()?;
        let mut query = entries::table
            .filter(entries::kind.eq(kind).and(entries::slug.eq(slug)))
            .into_boxed();

        if !include_drafts {
            query = query.filter(entries::status.eq(ContentStatus::Published));
        }

        Ok(query.get_result::<Entry>(&*db).optional()?)
    }

    fn slug_taken(&self, kind: EntryKind, slug: &str, except: Option<i32>)
    -> Result<bool, StoreError> {
        let db = self.conn()?;
        let mut query = entries::table
            .select(entries::id)
            .filter(entries::kind.eq(kind).and(entries::slug.eq(slug)))
            .into_boxed();

        if let Some(id) = except {
            query = query.filter(entries::id.ne(id));
        }

        Ok(query.first::<i32>(&*db).optional()?.is_some())
    }

    fn insert_entry(&self, entry: &NewEntry) -> Result<Entry, StoreError> {
        let db = self.conn()?;

        diesel::insert_into(entries::table)
            .values(entry)
            .get_result::<Entry>(&*db)
            .map_err(unique("slug"))
    }

    fn update_entry(&self, id: i32, change: &EntryChange)
    -> Result<Option<Entry>, StoreError> {
        if change.is_empty() {
            return self.entry_by_id(id);
        }

        let db = self.conn()?;

        diesel::update(entries::table.find(id))
            .set(change)
            .get_result::<Entry>(&*db)
            .optional()
            .map_err(unique("slug"))
    }

    fn publish_entry(&self, id: i32, at: DateTime<Utc>)
    -> Result<Option<Entry>, StoreError> {
        let db = self.conn()?;

        db.transaction::<_, StoreError, _>(|| {
            let entry = match entries::table
                .find(id)
                .for_update()
                .get_result::<Entry>(&*db)
                .optional()?
            {
                Some(entry) => entry,
                None => return Ok(None),
            };

            Ok(Some(diesel::update(&entry)
                .set((
                    entries::status.eq(ContentStatus::Published),
                    entries::published_at.eq(entry.published_at.unwrap_or(at)),
                ))
                .get_result::<Entry>(&*db)?))
        })
    }

    fn delete_entry(&self, id: i32) -> Result<bool, StoreError> {
        let db = self.conn()?;
        let deleted = diesel::delete(entries::table.find(id)).execute(&*db)?;

        Ok(deleted > 0)
    }
}
