use actix_web::{
    http::StatusCode,
    web::{self, Json, Path, ServiceConfig},
};
use folio_models::{FieldUpdate, FieldUpdateReport, content};
use folio_web::{Store, WithStatus};
use serde::Serialize;

use crate::Result;

/// Configure routes.
pub fn configure(app: &mut ServiceConfig) {
    app
        .service(web::resource("/sections/{id}/fields")
            .route(web::put().to(update_fields))
        )
    ;
}

#[derive(Serialize)]
struct SaveResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<&'static str>,
    #[serde(flatten)]
    report: FieldUpdateReport,
}

/// Save new values of fields in a section.
///
/// Fields are written one at a time, in order, stopping at the first
/// failure. The response always describes which fields were written.
///
/// ## Method
///
/// ```text
/// PUT /sections/:id/fields
/// Content-Type: application/json
///
/// [{ "field_key": string, "field_value": string }]
/// ```
fn update_fields(store: Store, id: Path<i32>, data: Json<Vec<FieldUpdate>>)
-> Result<WithStatus<SaveResponse>> {
    let report = content::update_field_values(&*store, *id, &data);

    Ok(if report.is_success() {
        WithStatus(StatusCode::OK, SaveResponse {
            error: None,
            raw: None,
            report,
        })
    } else {
        WithStatus(StatusCode::INTERNAL_SERVER_ERROR, SaveResponse {
            error: Some("section:save:failed"),
            raw: Some("Error saving changes"),
            report,
        })
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test::TestRequest};
    use folio_models::{
        ContentStore,
        PageScaffold,
        content::{FieldScaffold, SectionScaffold},
    };
    use serde_json::json;

    use crate::test_util::{json, request, store};

    fn seed(store: &dyn ContentStore) -> i32 {
        let page = store.create_page(&PageScaffold {
            route: "/contact".to_string(),
            page_title: "Contact".to_string(),
            meta_description: String::new(),
            sections: vec![SectionScaffold {
                section_key: "hero".to_string(),
                section_type: "hero".to_string(),
                fields: ["heading", "subheading", "email"].iter()
                    .map(|key| FieldScaffold {
                        field_key: key.to_string(),
                        field_value: None,
                        field_type: Default::default(),
                    })
                    .collect(),
            }],
        }).unwrap();

        page.sections[0].section.id
    }

    #[test]
    fn fields_are_saved() {
        let (memory, shared) = store();
        let section = seed(&*memory);

        let (status, report) = request(&shared, json(
            TestRequest::put().uri(&format!("/api/v1/sections/{}/fields", section)),
            &json!([
                { "field_key": "heading", "field_value": "Talk to us" },
                { "field_key": "email", "field_value": "" },
            ])));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["written"], json!(["heading", "email"]));
        assert!(report["failed"].is_null());
        assert!(report.get("error").is_none());

        let fields = memory.fields_of(section).unwrap();
        assert_eq!(fields[0].field_value.as_ref().map(String::as_str),
            Some("Talk to us"));
        assert_eq!(fields[2].field_value.as_ref().map(String::as_str), Some(""));
    }

    #[test]
    fn failed_save_reports_progress() {
        let (memory, shared) = store();
        let section = seed(&*memory);
        memory.fail_field_write("subheading");

        let (status, report) = request(&shared, json(
            TestRequest::put().uri(&format!("/api/v1/sections/{}/fields", section)),
            &json!([
                { "field_key": "heading", "field_value": "One" },
                { "field_key": "subheading", "field_value": "Two" },
                { "field_key": "email", "field_value": "Three" },
            ])));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(report["raw"], "Error saving changes");
        assert_eq!(report["written"], json!(["heading"]));
        assert_eq!(report["failed"]["field_key"], "subheading");
        assert_eq!(report["skipped"], json!(["email"]));

        let fields = memory.fields_of(section).unwrap();
        assert_eq!(fields[0].field_value.as_ref().map(String::as_str), Some("One"));
        assert_eq!(fields[2].field_value, None);
    }
}
