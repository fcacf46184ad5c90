//! Receipt
//!
//! Terminal rendering of a [`StackResult`]: a table of ledger steps, the codes
//! that were turned away, and a subtotal / total / savings summary.

use std::io;

use rust_decimal::Decimal;
use smallvec::{SmallVec, smallvec};
use tabled::{
    Table,
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    rejections::RejectedCoupon,
    stack::{StackFailure, StackOutcome, StackResult},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable view over a resolved stack.
#[derive(Debug, Clone, Copy)]
pub struct StackReceipt<'a> {
    result: &'a StackResult,
}

impl<'a> StackReceipt<'a> {
    /// Wrap a stack result for printing.
    pub fn new(result: &'a StackResult) -> Self {
        Self { result }
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        match self.result {
            StackResult::Applied(outcome) => write_outcome(&mut out, outcome),
            StackResult::Failed(failure) => write_failure(&mut out, failure),
        }
    }
}

fn write_outcome(out: &mut impl io::Write, outcome: &StackOutcome) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();
    let mut color_ops: SmallVec<[(usize, usize, Color); 8]> = smallvec![];

    builder.push_record(["", "Coupon", "Percent Off", "Discount", "Running Total"]);

    for (idx, step) in outcome.applied().iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            step.code.to_string(),
            format!("{}%", step.percent_off),
            format!("-{}", format_cents(step.discount_cents)),
            format_cents(step.running_total_after_cents),
        ]);

        color_ops.push((idx + 1, 4, Color::FG_GREEN));
    }

    let mut table = builder.build();
    table.modify(Columns::new(2..5), Alignment::right());

    write_table(out, table, color_ops)?;
    write_rejections(out, outcome.rejected())?;
    write_summary(out, outcome)
}

fn write_failure(out: &mut impl io::Write, failure: &StackFailure) -> Result<(), ReceiptError> {
    writeln!(out, "\n \x1b[1mNo coupon applied:\x1b[0m {}", failure.reason())
        .map_err(|_err| ReceiptError::IO)?;

    write_rejections(out, failure.rejected())?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

fn write_rejections(
    out: &mut impl io::Write,
    rejected: &[RejectedCoupon],
) -> Result<(), ReceiptError> {
    if rejected.is_empty() {
        return Ok(());
    }

    let mut builder = Builder::default();
    let mut color_ops: SmallVec<[(usize, usize, Color); 8]> = smallvec![];

    builder.push_record(["Rejected", "Reason"]);

    for (idx, rejection) in rejected.iter().enumerate() {
        builder.push_record([rejection.code.to_string(), rejection.reason.to_string()]);

        color_ops.push((idx + 1, 1, Color::FG_BRIGHT_BLACK));
    }

    write_table(out, builder.build(), color_ops)
}

fn write_table(
    out: &mut impl io::Write,
    mut table: Table,
    color_ops: SmallVec<[(usize, usize, Color); 8]>,
) -> Result<(), ReceiptError> {
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, outcome: &StackOutcome) -> Result<(), ReceiptError> {
    let savings_points = (outcome.savings_percent() * Decimal::ONE_HUNDRED).round_dp(2);

    let mut builder = Builder::default();

    builder.push_record([
        "Subtotal:".to_string(),
        format_cents(outcome.subtotal_cents()),
    ]);
    builder.push_record(["Total:".to_string(), format_cents(outcome.final_cents())]);
    builder.push_record([
        "Savings:".to_string(),
        format!(
            "({savings_points:.2}%) {}",
            format_cents(outcome.total_discount_cents())
        ),
    ]);

    let mut table = builder.build();

    table.with(Style::blank()).with(Alignment::right());
    table.modify(Rows::one(1), Color::BOLD);

    writeln!(out, "{table}\n").map_err(|_err| ReceiptError::IO)
}

/// Formats cents as a decimal amount, e.g. `7200` as `72.00`.
fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();

    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
