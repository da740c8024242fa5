pub mod calculations;
pub mod models;

pub use calculations::{IncomeTaxError, TaxAssessment, TaxCalculator};
pub use models::*;
