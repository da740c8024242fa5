//! Progressive income tax calculation for the Norwegian tax schedule.
//!
//! The total tax owed for an annual gross income is the sum of three
//! components, each computed independently from the same gross income:
//!
//! | Component | Description |
//! |-----------|-------------|
//! | Bracket tax ("trinnskatt") | Marginal rates over a five-step threshold schedule |
//! | Base tax | Flat rate on income net of a fixed deduction, once income clears the first bracket threshold |
//! | National insurance ("trygdeavgift") | Flat rate on the full income once it exceeds a floor |
//!
//! Two further computations are exposed for composability but are
//! deliberately NOT part of the composed total: the minimum standard
//! deduction and the hidden bracket tax. See
//! [`TaxCalculator::income_tax`] for the exclusion.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use skatt_core::{TaxBracket, TaxCalculator, TaxConstants};
//!
//! let brackets = TaxBracket::standard_schedule();
//! let calculator = TaxCalculator::new(&brackets, TaxConstants::standard()).unwrap();
//!
//! let assessment = calculator.calculate(dec!(500000)).unwrap();
//!
//! assert_eq!(assessment.bracket_tax, dec!(9727.60));
//! assert_eq!(assessment.base_tax, dec!(87021.00));
//! assert_eq!(assessment.national_insurance, dec!(39000.00));
//! assert_eq!(assessment.total_tax, dec!(135748.60));
//! assert_eq!(assessment.effective_rate, Some(dec!(27.14972)));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

use crate::models::{TaxBracket, TaxConstants};

/// Errors that can occur when building a calculator or assessing an income.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IncomeTaxError {
    /// Income is negative, or zero where an effective rate was requested.
    #[error("invalid income {0}")]
    InvalidIncome(Decimal),

    /// No tax brackets were provided.
    #[error("no tax brackets provided")]
    NoTaxBrackets,

    /// Bracket thresholds must be strictly increasing.
    #[error("bracket threshold {threshold} does not exceed previous threshold {previous}")]
    UnsortedBrackets {
        previous: Decimal,
        threshold: Decimal,
    },

    /// A bracket threshold must be non-negative.
    #[error("bracket threshold must be non-negative, got {0}")]
    NegativeThreshold(Decimal),

    /// A marginal rate must be between 0 and 1.
    #[error("marginal rate must be between 0 and 1, got {0}")]
    InvalidBracketRate(Decimal),

    /// The base tax rate must be between 0 and 1.
    #[error("base tax rate must be between 0 and 1, got {0}")]
    InvalidBaseTaxRate(Decimal),

    /// The national insurance rate must be between 0 and 1.
    #[error("national insurance rate must be between 0 and 1, got {0}")]
    InvalidNationalInsuranceRate(Decimal),

    /// The hidden bracket rate must be between 0 and 1.
    #[error("hidden bracket rate must be between 0 and 1, got {0}")]
    InvalidHiddenBracketRate(Decimal),

    /// The minimum deduction cap must be non-negative.
    #[error("minimum deduction cap must be non-negative, got {0}")]
    NegativeDeductionCap(Decimal),

    /// The national insurance floor must be non-negative.
    #[error("national insurance floor must be non-negative, got {0}")]
    NegativeInsuranceFloor(Decimal),

    /// The hidden bracket threshold must be non-negative.
    #[error("hidden bracket threshold must be non-negative, got {0}")]
    NegativeHiddenThreshold(Decimal),
}

/// Complete tax breakdown for a single income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAssessment {
    /// Annual gross income the assessment was computed for.
    pub income: Decimal,

    /// Progressive bracket tax component.
    pub bracket_tax: Decimal,

    /// Flat base tax component on income net of the fixed deduction.
    pub base_tax: Decimal,

    /// National insurance contribution component.
    pub national_insurance: Decimal,

    /// Sum of the three components above.
    pub total_tax: Decimal,

    /// Total tax as a percentage of income; `None` when income is zero,
    /// where the percentage is undefined.
    pub effective_rate: Option<Decimal>,
}

/// Calculator for the progressive income tax schedule.
///
/// Borrows an ordered bracket list and a set of constants, both validated
/// once at construction. Every method takes `&self` and touches no shared
/// state, so a calculator can be used concurrently from any number of
/// threads.
#[derive(Debug, Clone)]
pub struct TaxCalculator<'a> {
    brackets: &'a [TaxBracket],
    constants: TaxConstants,
}

impl<'a> TaxCalculator<'a> {
    /// Creates a calculator over the given schedule.
    ///
    /// # Errors
    ///
    /// Returns [`IncomeTaxError`] if:
    /// - the bracket list is empty
    /// - thresholds are not strictly increasing, or a threshold is negative
    /// - any rate (bracket or constant) is outside `[0, 1]`
    /// - any constant amount is negative
    ///
    /// # Example
    ///
    /// ```
    /// use skatt_core::{TaxBracket, TaxCalculator, TaxConstants};
    ///
    /// let brackets = TaxBracket::standard_schedule();
    /// let calculator = TaxCalculator::new(&brackets, TaxConstants::standard());
    ///
    /// assert!(calculator.is_ok());
    /// ```
    pub fn new(
        brackets: &'a [TaxBracket],
        constants: TaxConstants,
    ) -> Result<Self, IncomeTaxError> {
        validate_schedule(brackets)?;
        validate_constants(&constants)?;
        Ok(Self {
            brackets,
            constants,
        })
    }

    /// Assesses an income and returns the full component breakdown.
    ///
    /// This is the main entry point. `effective_rate` is `None` for an
    /// income of exactly zero; use [`TaxCalculator::effective_tax`] when a
    /// missing rate should be an error instead.
    ///
    /// # Errors
    ///
    /// Returns [`IncomeTaxError::InvalidIncome`] if `income` is negative.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use skatt_core::{TaxBracket, TaxCalculator, TaxConstants};
    ///
    /// let brackets = TaxBracket::standard_schedule();
    /// let calculator = TaxCalculator::new(&brackets, TaxConstants::standard()).unwrap();
    ///
    /// let assessment = calculator.calculate(dec!(300000)).unwrap();
    ///
    /// assert_eq!(assessment.total_tax, dec!(68148.60));
    /// assert_eq!(assessment.effective_rate, Some(dec!(22.7162)));
    /// ```
    pub fn calculate(
        &self,
        income: Decimal,
    ) -> Result<TaxAssessment, IncomeTaxError> {
        if income < Decimal::ZERO {
            return Err(IncomeTaxError::InvalidIncome(income));
        }

        let bracket_tax = self.bracket_tax(income);
        let base_tax = self.base_tax(income);
        let national_insurance = self.national_insurance(income);
        let total_tax = bracket_tax + base_tax + national_insurance;

        let effective_rate = if income.is_zero() {
            None
        } else {
            Some(total_tax / income * Decimal::ONE_HUNDRED)
        };

        Ok(TaxAssessment {
            income,
            bracket_tax,
            base_tax,
            national_insurance,
            total_tax,
            effective_rate,
        })
    }

    /// Total income tax: bracket tax + base tax + national insurance.
    ///
    /// The hidden bracket tax and the minimum standard deduction are NOT
    /// part of this sum. The exclusion is intentional, not an oversight:
    /// wiring either one in is a tax-policy change, and every assessed
    /// total shifts with it.
    ///
    /// An income of zero is valid and owes zero tax.
    ///
    /// # Errors
    ///
    /// Returns [`IncomeTaxError::InvalidIncome`] if `income` is negative.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use skatt_core::{TaxBracket, TaxCalculator, TaxConstants};
    ///
    /// let brackets = TaxBracket::standard_schedule();
    /// let calculator = TaxCalculator::new(&brackets, TaxConstants::standard()).unwrap();
    ///
    /// assert_eq!(calculator.income_tax(dec!(500000)), Ok(dec!(135748.60)));
    /// ```
    pub fn income_tax(
        &self,
        income: Decimal,
    ) -> Result<Decimal, IncomeTaxError> {
        if income < Decimal::ZERO {
            return Err(IncomeTaxError::InvalidIncome(income));
        }

        Ok(self.bracket_tax(income) + self.base_tax(income) + self.national_insurance(income))
    }

    /// Total tax as a percentage of gross income.
    ///
    /// # Errors
    ///
    /// Returns [`IncomeTaxError::InvalidIncome`] if `income` is zero or
    /// negative. The rate is undefined at zero and must never come back
    /// as infinity or NaN.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use skatt_core::{IncomeTaxError, TaxBracket, TaxCalculator, TaxConstants};
    ///
    /// let brackets = TaxBracket::standard_schedule();
    /// let calculator = TaxCalculator::new(&brackets, TaxConstants::standard()).unwrap();
    ///
    /// assert_eq!(calculator.effective_tax(dec!(500000)), Ok(dec!(27.14972)));
    /// assert_eq!(
    ///     calculator.effective_tax(dec!(0)),
    ///     Err(IncomeTaxError::InvalidIncome(dec!(0)))
    /// );
    /// ```
    pub fn effective_tax(
        &self,
        income: Decimal,
    ) -> Result<Decimal, IncomeTaxError> {
        if income <= Decimal::ZERO {
            return Err(IncomeTaxError::InvalidIncome(income));
        }

        let total = self.income_tax(income)?;
        Ok(total / income * Decimal::ONE_HUNDRED)
    }

    /// Marginal tax contributed by the progressive bracket schedule.
    ///
    /// Brackets are visited in ascending threshold order, pairwise. Each
    /// bracket the income fills completely contributes the full span to the
    /// next threshold at the bracket's rate; the first bracket the income
    /// does not fill contributes a partial span and ends the traversal.
    /// No income slice is ever counted by two brackets.
    ///
    /// Incomes at or below the first threshold contribute nothing: the
    /// partial span is clamped at zero rather than going negative.
    ///
    /// Because traversal is pairwise, the final bracket's rate is never
    /// applied: incomes at or above the final threshold are capped at the
    /// sum of the completed spans.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use skatt_core::{TaxBracket, TaxCalculator, TaxConstants};
    ///
    /// let brackets = TaxBracket::standard_schedule();
    /// let calculator = TaxCalculator::new(&brackets, TaxConstants::standard()).unwrap();
    ///
    /// // (292850 - 208050) × 0.017 + (500000 - 292850) × 0.04
    /// assert_eq!(calculator.bracket_tax(dec!(500000)), dec!(9727.60));
    /// ```
    pub fn bracket_tax(
        &self,
        income: Decimal,
    ) -> Decimal {
        let mut tax = Decimal::ZERO;

        for (cur, next) in self.brackets.iter().zip(self.brackets.iter().skip(1)) {
            if income > cur.threshold && income >= next.threshold {
                tax += (next.threshold - cur.threshold) * cur.rate;
                trace!(
                    threshold = %cur.threshold,
                    rate = %cur.rate,
                    running_tax = %tax,
                    "bracket filled"
                );
            } else {
                let span = income - cur.threshold;
                if span < Decimal::ZERO {
                    warn!(
                        income = %income,
                        threshold = %cur.threshold,
                        "income below first bracket threshold; no bracket tax"
                    );
                }
                tax += span.max(Decimal::ZERO) * cur.rate;
                trace!(
                    threshold = %cur.threshold,
                    rate = %cur.rate,
                    running_tax = %tax,
                    "bracket partially filled"
                );
                break;
            }
        }

        tax
    }

    /// Flat-rate tax on income net of the fixed deduction cap.
    ///
    /// Applies only once income reaches the first bracket threshold. The
    /// amount subtracted is always the constant cap, never the
    /// income-scaled value from
    /// [`TaxCalculator::minimum_standard_deduction`]; the two are
    /// independent.
    pub fn base_tax(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income < self.first_threshold() {
            return Decimal::ZERO;
        }

        (income - self.constants.minimum_deduction_cap) * self.constants.base_tax_rate
    }

    /// National insurance contribution on the full income.
    ///
    /// A step function: zero at or below the floor, then the flat rate
    /// times the ENTIRE income, not just the excess over the floor.
    pub fn national_insurance(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income > self.constants.national_insurance_floor {
            self.constants.national_insurance_rate * income
        } else {
            Decimal::ZERO
        }
    }

    /// Income-scaled standard deduction, capped at the fixed maximum.
    ///
    /// Standalone computation: nothing in the composed total uses it, and
    /// [`TaxCalculator::base_tax`] subtracts the cap directly instead of
    /// this value.
    pub fn minimum_standard_deduction(
        &self,
        income: Decimal,
    ) -> Decimal {
        (income * dec!(0.46)).min(self.constants.minimum_deduction_cap)
    }

    /// Flat tax on income up to the hidden bracket threshold, capped at
    /// `threshold × rate` above it.
    ///
    /// Standalone computation, excluded from
    /// [`TaxCalculator::income_tax`].
    pub fn hidden_bracket_tax(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.constants.hidden_bracket_threshold {
            income * self.constants.hidden_bracket_rate
        } else {
            self.constants.hidden_bracket_threshold * self.constants.hidden_bracket_rate
        }
    }

    fn first_threshold(&self) -> Decimal {
        // The schedule is validated non-empty at construction.
        self.brackets
            .first()
            .map(|bracket| bracket.threshold)
            .unwrap_or_default()
    }
}

fn validate_schedule(brackets: &[TaxBracket]) -> Result<(), IncomeTaxError> {
    if brackets.is_empty() {
        return Err(IncomeTaxError::NoTaxBrackets);
    }

    let mut previous: Option<Decimal> = None;
    for bracket in brackets {
        if bracket.threshold < Decimal::ZERO {
            return Err(IncomeTaxError::NegativeThreshold(bracket.threshold));
        }
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(IncomeTaxError::InvalidBracketRate(bracket.rate));
        }
        if let Some(previous) = previous {
            if bracket.threshold <= previous {
                return Err(IncomeTaxError::UnsortedBrackets {
                    previous,
                    threshold: bracket.threshold,
                });
            }
        }
        previous = Some(bracket.threshold);
    }

    Ok(())
}

fn validate_constants(constants: &TaxConstants) -> Result<(), IncomeTaxError> {
    if constants.base_tax_rate < Decimal::ZERO || constants.base_tax_rate > Decimal::ONE {
        return Err(IncomeTaxError::InvalidBaseTaxRate(constants.base_tax_rate));
    }
    if constants.national_insurance_rate < Decimal::ZERO
        || constants.national_insurance_rate > Decimal::ONE
    {
        return Err(IncomeTaxError::InvalidNationalInsuranceRate(
            constants.national_insurance_rate,
        ));
    }
    if constants.hidden_bracket_rate < Decimal::ZERO || constants.hidden_bracket_rate > Decimal::ONE
    {
        return Err(IncomeTaxError::InvalidHiddenBracketRate(
            constants.hidden_bracket_rate,
        ));
    }
    if constants.minimum_deduction_cap < Decimal::ZERO {
        return Err(IncomeTaxError::NegativeDeductionCap(
            constants.minimum_deduction_cap,
        ));
    }
    if constants.national_insurance_floor < Decimal::ZERO {
        return Err(IncomeTaxError::NegativeInsuranceFloor(
            constants.national_insurance_floor,
        ));
    }
    if constants.hidden_bracket_threshold < Decimal::ZERO {
        return Err(IncomeTaxError::NegativeHiddenThreshold(
            constants.hidden_bracket_threshold,
        ));
    }
    Ok(())
}
