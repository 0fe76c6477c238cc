use actix_web::{
    HttpRequest,
    HttpResponse,
    web::{self, Json, Path, Query, ServiceConfig},
};
use folio_models::{
    Entry,
    EntryDraft,
    EntryError,
    EntryKind,
    EntryStore,
    EntryUpdate,
    entry,
};
use folio_web::{Created, FormOrJson, Store};
use log::info;
use serde::Deserialize;

use crate::Result;

/// Configure routes.
pub fn configure(app: &mut ServiceConfig) {
    app
        .service(web::resource("/entries")
            .route(web::get().to(list_entries))
            .route(web::post().to(create_entry))
        )
        .service(web::resource("/entries/{id}")
            .route(web::get().to(get_entry))
            .route(web::put().to(update_entry))
            .route(web::delete().to(delete_entry))
        )
        .service(web::resource("/entries/{id}/publish")
            .route(web::post().to(publish_entry))
        )
    ;
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    kind: Option<EntryKind>,
    #[serde(default)]
    drafts: bool,
}

/// List entries, newest first.
///
/// ## Method
///
/// ```text
/// GET /entries?kind=:kind&drafts=:bool
/// ```
fn list_entries(store: Store, query: Query<ListQuery>) -> Result<Json<Vec<Entry>>> {
    Ok(Json(entry::list_entries(&*store, query.kind, query.drafts)?))
}

/// Create a new draft entry.
///
/// ## Method
///
/// ```text
/// POST /entries
/// Content-Type: application/json
///
/// {
///     "kind": string,
///     "title": string,
///     "slug"?: string,
///     "summary"?: string,
///     "body": string,
///     "tags"?: [string] | string,
/// }
/// ```
fn create_entry(req: HttpRequest, store: Store, data: FormOrJson<EntryDraft>)
-> Result<Created<Entry>> {
    let entry = entry::create_entry(&*store, &data)?;

    info!("Created {} entry {} ({})", entry.kind, entry.slug, entry.id);

    let location = format!("{}/api/v1/entries/{}",
        req.app_config().host(), entry.id);

    Ok(Created(location, entry))
}

/// Get an entry by its ID.
///
/// ## Method
///
/// ```text
/// GET /entries/:id
/// ```
fn get_entry(store: Store, id: Path<i32>) -> Result<Json<Entry>> {
    store.entry_by_id(*id)?
        .map(Json)
        .ok_or_else(|| EntryError::NotFound.into())
}

/// Update an entry.
///
/// ## Method
///
/// ```text
/// PUT /entries/:id
/// Content-Type: application/json
///
/// {
///     "title"?: string,
///     "slug"?: string,
///     "summary"?: string | null,
///     "body"?: string,
///     "tags"?: [string] | string,
/// }
/// ```
fn update_entry(store: Store, id: Path<i32>, data: Json<EntryUpdate>)
-> Result<Json<Entry>> {
    Ok(Json(entry::update_entry(&*store, *id, &data)?))
}

/// Delete an entry.
///
/// ## Method
///
/// ```text
/// DELETE /entries/:id
/// ```
fn delete_entry(store: Store, id: Path<i32>) -> Result<HttpResponse> {
    entry::delete_entry(&*store, *id)?;

    info!("Deleted entry {}", *id);

    Ok(HttpResponse::NoContent().finish())
}

/// Publish an entry.
///
/// ## Method
///
/// ```text
/// POST /entries/:id/publish
/// ```
fn publish_entry(store: Store, id: Path<i32>) -> Result<Json<Entry>> {
    Ok(Json(entry::publish_entry(&*store, *id)?))
}
