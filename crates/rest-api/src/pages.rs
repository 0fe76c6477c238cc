use actix_web::{
    HttpRequest,
    HttpResponse,
    http::StatusCode,
    web::{self, Json, Path, Query, ServiceConfig},
};
use folio_error::ApiError;
use folio_models::{
    ContentStore,
    Page,
    PageScaffold,
    PageWithSections,
    PublishOutcome,
    content,
};
use folio_web::{Created, Store, WithStatus};
use failure::Fail;
use log::info;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::Result;

/// Configure routes.
pub fn configure(app: &mut ServiceConfig) {
    app
        .service(web::resource("/pages")
            .route(web::get().to(list_pages))
            .route(web::post().to(create_page))
        )
        .service(web::resource("/pages/content")
            .route(web::get().to(get_page_content))
        )
        .service(web::resource("/pages/{id}")
            .route(web::delete().to(delete_page))
        )
        .service(web::resource("/pages/{id}/publish")
            .route(web::post().to(publish_page))
        )
        .service(web::resource("/pages/{id}/publish/sections")
            .route(web::post().to(publish_sections))
        )
    ;
}

#[derive(ApiError, Debug, Fail)]
#[api(code = "page:not-found", status = "NOT_FOUND")]
#[fail(display = "No such page")]
pub struct PageNotFound;

/// List all pages, including drafts.
///
/// ## Method
///
/// ```text
/// GET /pages
/// ```
fn list_pages(store: Store) -> Result<Json<Vec<Page>>> {
    Ok(Json(store.all_pages()?))
}

/// Create a new draft page together with its sections and fields.
///
/// ## Method
///
/// ```text
/// POST /pages
/// Content-Type: application/json
/// ```
fn create_page(req: HttpRequest, store: Store, data: Json<PageScaffold>)
-> Result<Created<PageWithSections>> {
    let page = content::create_page(&*store, &data)?;

    info!("Created page {} ({})", page.page.route, page.page.id);

    let location = content_location(req.app_config().host(), &page.page.route);

    Ok(Created(location, page))
}

/// URL at which content of the page at `route` can be retrieved.
fn content_location(host: &str, route: &str) -> String {
    let route = form_urlencoded::byte_serialize(route.as_bytes()).collect::<String>();
    format!("{}/api/v1/pages/content?route={}", host, route)
}

#[derive(Deserialize)]
struct ContentQuery {
    route: String,
    #[serde(default)]
    drafts: bool,
}

/// Get a page together with its sections and their fields.
///
/// ## Method
///
/// ```text
/// GET /pages/content?route=:route&drafts=:bool
/// ```
fn get_page_content(store: Store, query: Query<ContentQuery>)
-> Result<Json<PageWithSections>> {
    content::get_page_with_sections(&*store, &query.route, query.drafts)?
        .map(Json)
        .ok_or_else(|| PageNotFound.into())
}

/// Delete a page with all its sections and fields.
///
/// ## Method
///
/// ```text
/// DELETE /pages/:id
/// ```
fn delete_page(store: Store, id: Path<i32>) -> Result<HttpResponse> {
    if !store.delete_page(*id)? {
        return Err(PageNotFound.into());
    }

    info!("Deleted page {}", *id);

    Ok(HttpResponse::NoContent().finish())
}

/// Publish a page and all its sections.
///
/// Responds with 500 and `"result": "sections-pending"` if the page was
/// published but its sections were not.
///
/// ## Method
///
/// ```text
/// POST /pages/:id/publish
/// ```
fn publish_page(store: Store, id: Path<i32>) -> Result<WithStatus<PublishOutcome>> {
    let outcome = content::publish_page(&*store, *id)?;

    let status = if outcome.is_complete() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok(WithStatus(status, outcome))
}

#[derive(Serialize)]
struct PublishedSections {
    sections: usize,
}

/// Publish all sections of a page, without changing the page itself.
///
/// ## Method
///
/// ```text
/// POST /pages/:id/publish/sections
/// ```
fn publish_sections(store: Store, id: Path<i32>) -> Result<Json<PublishedSections>> {
    if store.page_by_id(*id)?.is_none() {
        return Err(PageNotFound.into());
    }

    let sections = content::publish_sections(&*store, *id)?;

    Ok(Json(PublishedSections { sections }))
}
