use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Fixed rates and thresholds used alongside the bracket schedule.
///
/// Immutable once constructed; a calculator takes these by value and never
/// mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConstants {
    /// Flat rate applied to income net of `minimum_deduction_cap` once
    /// income clears the first bracket threshold.
    pub base_tax_rate: Decimal,

    /// Upper bound of the minimum standard deduction ("minstefradrag").
    pub minimum_deduction_cap: Decimal,

    /// National insurance contribution ("trygdeavgift") rate.
    pub national_insurance_rate: Decimal,

    /// Income floor above which the national insurance contribution
    /// applies to the full income.
    pub national_insurance_floor: Decimal,

    /// Rate of the hidden bracket tax (not part of the composed total).
    pub hidden_bracket_rate: Decimal,

    /// Income level at which the hidden bracket tax stops growing.
    pub hidden_bracket_threshold: Decimal,
}

impl TaxConstants {
    /// Standard rates and thresholds. Amounts are NOK.
    pub fn standard() -> Self {
        Self {
            base_tax_rate: dec!(0.22),
            minimum_deduction_cap: dec!(104450),
            national_insurance_rate: dec!(0.078),
            national_insurance_floor: dec!(69650),
            hidden_bracket_rate: dec!(0.10),
            hidden_bracket_threshold: dec!(70000),
        }
    }
}
