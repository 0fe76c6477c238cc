mod extractors;
mod responders;

pub use self::{
    extractors::{FormOrJson, FormOrJsonConfig, Store, StoreMissing},
    responders::{Created, WithStatus},
};
