use actix_web::{
    Either,
    FromRequest,
    HttpMessage,
    HttpRequest,
    dev::Payload,
    error::ErrorUnsupportedMediaType,
    web::{Form, FormConfig, Json, JsonConfig},
};
use folio_error::{ApiError, Error};
use folio_models::{SharedStore, store};
use failure::Fail;
use futures::future::{self, Future, FutureResult};
use std::ops::Deref;

/// Extract the content store for a request.
///
/// The store must have been registered with `App::data` as a
/// [`SharedStore`].
#[derive(Clone)]
pub struct Store(SharedStore);

impl Store {
    /// Obtain the shared store handle.
    pub fn into_inner(self) -> SharedStore {
        self.0
    }
}

impl FromRequest for Store {
    type Error = Error;
    type Future = FutureResult<Store, Error>;
    type Config = ();

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.app_data::<SharedStore>() {
            Some(data) => {
                let store: &SharedStore = &*data;
                future::ok(Store(store.clone()))
            }
            None => future::err(StoreMissing.into()),
        }
    }
}

impl Deref for Store {
    type Target = dyn store::Store;

    fn deref(&self) -> &(dyn store::Store + 'static) {
        &*self.0
    }
}

/// Error returned by [`Store`]'s implementation of [`FromRequest`] when
/// the content store has not been configured.
#[derive(ApiError, Debug, Fail)]
#[api(internal)]
#[fail(display = "content store needs to be set for Store extraction to work")]
pub struct StoreMissing;

/// Extract a value from the request's body as either form data
/// (`application/x-www-form-urlencoded`), or as JSON.
pub struct FormOrJson<T>(Either<Form<T>, Json<T>>);

impl<T> FormOrJson<T> {
    /// Obtain actual value.
    pub fn into_inner(self) -> T {
        match self.0 {
            Either::A(a) => a.into_inner(),
            Either::B(b) => b.into_inner(),
        }
    }
}

impl<T> Deref for FormOrJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.0 {
            Either::A(ref a) => &*a,
            Either::B(ref b) => &*b,
        }
    }
}

#[derive(Clone, Default)]
pub struct FormOrJsonConfig {
    pub form: FormConfig,
    pub json: JsonConfig,
}

impl<T> FromRequest for FormOrJson<T>
where
    T: serde::de::DeserializeOwned + 'static,
{
    type Error = actix_web::Error;
    type Future = Box<dyn Future<Item = Self, Error = actix_web::Error>>;
    type Config = FormOrJsonConfig;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mime = match req.mime_type() {
            Ok(mime) => mime,
            Err(err) => return Box::new(future::err(err.into())),
        };

        let is_json = mime.map_or(false, |mime| {
            mime.subtype() == "json" || mime.suffix().map_or(false, |s| s == "json")
        });

        if is_json {
            Box::new(Json::from_request(req, payload).map(Either::B).map(FormOrJson))
        } else if req.content_type().eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            Box::new(Form::from_request(req, payload).map(Either::A).map(FormOrJson))
        } else {
            Box::new(future::err(ErrorUnsupportedMediaType(
                "Body should be application/x-www-form-urlencoded or JSON")))
        }
    }
}
