use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One step of the progressive bracket schedule ("trinnskatt").
///
/// The marginal `rate` applies to the slice of income above `threshold`,
/// up to the next bracket's threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: Decimal,
    pub rate: Decimal,
}

impl TaxBracket {
    /// Returns the standard five-step schedule, ordered by ascending
    /// threshold. Amounts are NOK.
    ///
    /// Built fresh on each call; callers hold the list and inject it into
    /// a calculator, so alternate schedules can be substituted in tests.
    pub fn standard_schedule() -> Vec<TaxBracket> {
        vec![
            TaxBracket {
                threshold: dec!(208050),
                rate: dec!(0.017),
            },
            TaxBracket {
                threshold: dec!(292850),
                rate: dec!(0.04),
            },
            TaxBracket {
                threshold: dec!(670000),
                rate: dec!(0.136),
            },
            TaxBracket {
                threshold: dec!(937900),
                rate: dec!(0.166),
            },
            TaxBracket {
                threshold: dec!(1350000),
                rate: dec!(0.176),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn standard_schedule_has_five_brackets() {
        let schedule = TaxBracket::standard_schedule();

        assert_eq!(schedule.len(), 5);
    }

    #[test]
    fn standard_schedule_thresholds_strictly_increase() {
        let schedule = TaxBracket::standard_schedule();

        for pair in schedule.windows(2) {
            assert!(pair[0].threshold < pair[1].threshold);
        }
    }
}
