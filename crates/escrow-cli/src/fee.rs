//! # Fee Subcommand
//!
//! Prints the split a release would produce for an amount under a given
//! fee rate (default 5/100).

use anyhow::{Context, Result};
use clap::Args;
use escrow_core::{FeeRate, FeeSplit};
use serde::Serialize;

/// Arguments for the `escrow fee` subcommand.
#[derive(Args, Debug)]
pub struct FeeArgs {
    /// Escrow amount in the smallest unit.
    #[arg(value_name = "AMOUNT")]
    pub amount: u64,

    /// Fee rate numerator.
    #[arg(long, default_value_t = 5)]
    pub numerator: u64,

    /// Fee rate denominator.
    #[arg(long, default_value_t = 100)]
    pub denominator: u64,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Result of a fee preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeReport {
    pub amount: u64,
    pub rate: String,
    pub fee: u64,
    pub payment: u64,
}

/// Compute the preview without printing it.
pub fn fee_report(args: &FeeArgs) -> Result<FeeReport> {
    let rate = FeeRate::new(args.numerator, args.denominator).context("invalid fee rate")?;
    let FeeSplit { fee, payment } = rate.split(args.amount);
    Ok(FeeReport {
        amount: args.amount,
        rate: rate.to_string(),
        fee,
        payment,
    })
}

/// Execute the fee subcommand. Returns exit code 0.
pub fn run_fee(args: &FeeArgs) -> Result<u8> {
    let report = fee_report(args)?;
    tracing::debug!(amount = report.amount, fee = report.fee, "fee preview");
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("amount:  {}", report.amount);
        println!("rate:    {}", report.rate);
        println!("fee:     {}", report.fee);
        println!("payment: {}", report.payment);
    }
    Ok(0)
}
