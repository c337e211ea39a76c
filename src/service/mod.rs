//! CatalogService and payload validation.

mod catalog;
pub mod validation;
pub use catalog::CatalogService;
pub use validation::{expect_object, ProductChanges};
