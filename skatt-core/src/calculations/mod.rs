//! Tax calculation for the Norwegian personal income tax schedule.

pub mod income_tax;

pub use income_tax::{IncomeTaxError, TaxAssessment, TaxCalculator};
