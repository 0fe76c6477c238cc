//! Errors as seen by HTTP clients.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use failure::Fail;
use log::error;
use serde::Serialize;
use std::borrow::Cow;

pub use folio_macros::ApiError;

/// An error which can be reported to an API client.
pub trait ApiError: Fail {
    /// HTTP status of the response.
    fn status(&self) -> StatusCode;

    /// Code identifying this error to clients, e.g. `entry:not-found`.
    ///
    /// Errors without a code are internal: clients only learn that the
    /// request failed, and the details are logged.
    fn code(&self) -> Option<Cow<str>>;
}

impl Fail for Box<dyn ApiError> {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn cause(&self) -> Option<&dyn Fail> {
        (**self).cause()
    }

    fn backtrace(&self) -> Option<&failure::Backtrace> {
        (**self).backtrace()
    }
}

/// Error returned from request handlers.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{}", _0)]
    Api(#[cause] Box<dyn ApiError>),
    /// Template could not be rendered. [`tera::Error`] is neither `Send` nor
    /// `Sync`, so only its message is kept.
    #[fail(display = "Cannot render template: {}", _0)]
    Template(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Api(err) => err.status(),
            Error::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing code, if this error has one.
    pub fn code(&self) -> Option<Cow<str>> {
        match self {
            Error::Api(err) => err.code(),
            Error::Template(_) => None,
        }
    }
}

impl<T: ApiError> From<T> for Error {
    fn from(error: T) -> Error {
        Error::Api(Box::new(error))
    }
}

impl From<tera::Error> for Error {
    fn from(err: tera::Error) -> Self {
        let message = err.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ");

        Error::Template(message)
    }
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        match self.code() {
            Some(code) => HttpResponse::build(self.status()).json(ErrorResponse {
                error: code,
                raw: self.to_string(),
            }),
            None => {
                error!("{}", self);

                for cause in (self as &dyn Fail).iter_causes() {
                    error!("Caused by: {}", cause);
                }

                HttpResponse::new(self.status())
            }
        }
    }

    fn render_response(&self) -> HttpResponse {
        self.error_response()
    }
}

/// Body of a response describing an error.
#[derive(Debug, Serialize)]
pub struct ErrorResponse<'s> {
    pub error: Cow<'s, str>,
    /// Human-readable description.
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(ApiError, Debug, Fail)]
    enum TestError {
        #[fail(display = "Nothing here")]
        #[api(code = "test:not-found", status = "NOT_FOUND")]
        NotFound,
        #[fail(display = "Broken")]
        #[api(internal)]
        Broken,
    }

    #[test]
    fn codes_and_statuses() {
        let err = Error::from(TestError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code().as_ref().map(|c| &**c), Some("test:not-found"));

        let err = Error::from(TestError::Broken);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.code().is_none());

        let err = Error::Template("oops".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn responses() {
        let rsp = Error::from(TestError::NotFound).error_response();
        assert_eq!(rsp.status(), StatusCode::NOT_FOUND);

        let rsp = Error::from(TestError::Broken).error_response();
        assert_eq!(rsp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
