use actix_web::{
    Error,
    HttpRequest,
    HttpResponse,
    Responder,
    http::{StatusCode, header::LOCATION},
};
use serde::Serialize;

/// Build a 201 Created response with a JSON body.
///
/// The `Location` header is defined by the first field, and the body by
/// the second.
pub struct Created<T>(pub String, pub T);

impl<T: Serialize> Responder for Created<T> {
    type Error = Error;
    type Future = Result<HttpResponse, Error>;

    fn respond_to(self, _: &HttpRequest) -> Self::Future {
        let Created(location, body) = self;

        Ok(HttpResponse::Created()
            .header(LOCATION, location)
            .json(body))
    }
}

/// A JSON response with a status code other than 200.
pub struct WithStatus<T>(pub StatusCode, pub T);

impl<T: Serialize> Responder for WithStatus<T> {
    type Error = Error;
    type Future = Result<HttpResponse, Error>;

    fn respond_to(self, _: &HttpRequest) -> Self::Future {
        let WithStatus(status, body) = self;

        Ok(HttpResponse::build(status).json(body))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde_json::json;

    use super::*;

    #[test]
    fn created_sets_location() {
        let req = TestRequest::default().to_http_request();
        let rsp = Created("/api/v1/entries/3".to_string(), json!({ "id": 3 }))
            .respond_to(&req)
            .unwrap();

        assert_eq!(rsp.status(), StatusCode::CREATED);
        assert_eq!(rsp.headers().get(LOCATION).unwrap(), "/api/v1/entries/3");
    }

    #[test]
    fn with_status_overrides_status() {
        let req = TestRequest::default().to_http_request();
        let rsp = WithStatus(StatusCode::INTERNAL_SERVER_ERROR, json!([]))
            .respond_to(&req)
            .unwrap();

        assert_eq!(rsp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
