//! Product data model
//!
//! - `ProductRecord`: one extracted product, the unit of output
//! - `Availability`: normalized stock status

mod availability;
mod record;

pub use availability::Availability;
pub use record::ProductRecord;
