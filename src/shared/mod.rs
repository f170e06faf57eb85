// Pure building blocks shared by every layer: no I/O lives here
pub mod domain;
pub mod error;
pub mod id_generator;
pub mod schema;
pub mod validators;

pub use domain::*;
pub use error::*;
pub use id_generator::*;
pub use schema::*;
pub use validators::*;
