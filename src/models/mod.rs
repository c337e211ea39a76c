//! Catalog and account records as they cross the API boundary.

mod category;
mod price;
mod product;
mod user;

pub use category::{Category, NewCategory};
pub use price::{Price, PriceError, DECIMAL_PLACES, MAX_DIGITS};
pub use product::{NewProduct, Product, ProductCategory};
pub use user::{AuthToken, User};
