use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use skatt_core::{TaxBracket, TaxCalculator, TaxConstants};
use tracing_subscriber::EnvFilter;

/// Assess Norwegian personal income tax for an annual gross income.
///
/// Computes the bracket tax, base tax and national insurance contribution
/// over the standard schedule and prints the breakdown together with the
/// effective tax rate. Set RUST_LOG=trace to see the bracket traversal.
#[derive(Parser, Debug)]
#[command(name = "skatt")]
#[command(version, about, long_about = None)]
struct Args {
    /// Annual gross income in NOK (e.g. 500000 or 500000.50)
    #[arg(allow_negative_numbers = true)]
    income: Decimal,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let brackets = TaxBracket::standard_schedule();
    let calculator = TaxCalculator::new(&brackets, TaxConstants::standard())
        .context("standard tax schedule is invalid")?;

    let assessment = calculator
        .calculate(args.income)
        .with_context(|| format!("cannot assess income {}", args.income))?;

    println!("Gross income:       {} kr", assessment.income);
    println!("Bracket tax:        {} kr", assessment.bracket_tax);
    println!("Base tax:           {} kr", assessment.base_tax);
    println!("National insurance: {} kr", assessment.national_insurance);
    println!("Total tax:          {} kr", assessment.total_tax);
    if let Some(rate) = assessment.effective_rate {
        println!("Effective tax rate: {rate}%");
    }

    Ok(())
}
