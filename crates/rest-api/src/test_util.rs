use actix_web::{
    App,
    http::{StatusCode, header::CONTENT_TYPE},
    test::{self, TestRequest},
};
use folio_models::{MemoryStore, SharedStore};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Create a shared in-memory store together with a handle to its
/// concrete type, for seeding and fault injection.
pub fn store() -> (Arc<MemoryStore>, SharedStore) {
    let store = Arc::new(MemoryStore::new());
    let shared: SharedStore = store.clone();
    (store, shared)
}

/// Perform a single request against the API and return response status and
/// its body parsed as JSON (`Value::Null` for empty bodies).
pub fn request(store: &SharedStore, req: TestRequest) -> (StatusCode, Value) {
    let mut app = test::init_service(App::new()
        .data(store.clone())
        .configure(crate::configure));

    let rsp = test::call_service(&mut app, req.to_request());
    let status = rsp.status();
    let body = test::read_body(rsp);

    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };

    (status, value)
}

/// Build a request with a JSON body.
pub fn json<T: Serialize>(req: TestRequest, body: &T) -> TestRequest {
    req.header(CONTENT_TYPE, "application/json")
        .set_payload(serde_json::to_string(body).unwrap())
}
