//! # Household Cash-Flow Projection
//!
//! A library for turning a household's recurring, seasonal and amortizing
//! financial facts into a month-by-month cash-flow forecast.
//!
//! ## Core Concepts
//!
//! - **Month Key**: A calendar month (`YYYY-MM`). Recurrence works on the month of year,
//!   amortization and card installments on the full key
//! - **Net Salary**: Base income plus recurring components and seasonal events, minus
//!   active payroll deductions, with an explainable breakdown per month
//! - **Card Invoices**: Installment purchases spread over consecutive invoices, assigned
//!   to a billing cycle by the card's closing day
//! - **Projection**: A rolling window starting at a caller-supplied anchor month. The
//!   engine never reads the clock, so identical inputs give identical output
//!
//! ## Example
//!
//! ```rust,ignore
//! use household_cashflow_projection::*;
//! use rust_decimal_macros::dec;
//!
//! let inputs = ProjectionInputs {
//!     base_incomes: vec![BaseIncome {
//!         amount: dec!(3000),
//!         effective_from_month: parse_month_key("2025-01").unwrap(),
//!     }],
//!     fixed_expenses: vec![FixedExpense {
//!         name: "Rent".to_string(),
//!         amount: dec!(1200),
//!         is_active: true,
//!         category: "housing".to_string(),
//!     }],
//!     ..Default::default()
//! };
//!
//! let projection = project(&inputs, parse_month_key("2025-07").unwrap()).unwrap();
//! assert_eq!(projection.months.len(), 12);
//! ```

pub mod amortization;
pub mod card;
pub mod engine;
pub mod error;
pub mod recurrence;
pub mod salary;
pub mod schema;
pub mod utils;

pub use amortization::{end_month, is_active_in_month, remaining_installments};
pub use card::{charge_for_month, invoice_month_for_purchase, invoice_total, register_purchase};
pub use engine::ProjectionBuilder;
pub use error::{ProjectionError, Result, ValidationKind};
pub use recurrence::resolve_months;
pub use salary::{compose_net_salary, current_base_income};
pub use schema::*;
pub use utils::*;

use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

pub struct ProjectionProcessor;

impl ProjectionProcessor {
    /// Validates the snapshot, then builds the projection for `anchor`.
    pub fn process(
        inputs: &ProjectionInputs,
        config: &ProjectionConfig,
        anchor: MonthKey,
    ) -> Result<Projection> {
        validate_config(config)?;
        validate_inputs(inputs, config)?;

        info!(
            "Projecting {} months of cash flow from {}",
            config.window_months, anchor
        );
        debug!(
            "Snapshot contains {} components, {} seasonal events, {} deductions, {} fixed expenses, {} variable expenses and {} card transactions",
            inputs.components.len(),
            inputs.seasonal_events.len(),
            inputs.deductions.len(),
            inputs.fixed_expenses.len(),
            inputs.variable_expenses.len(),
            inputs.card_transactions.len()
        );

        let builder = ProjectionBuilder::new(config.clone());
        Ok(builder.build(inputs, anchor))
    }
}

/// Projects the default 12-month window with flat income.
pub fn project(inputs: &ProjectionInputs, anchor: MonthKey) -> Result<Projection> {
    ProjectionProcessor::process(inputs, &ProjectionConfig::default(), anchor)
}

pub fn project_with_config(
    inputs: &ProjectionInputs,
    config: &ProjectionConfig,
    anchor: MonthKey,
) -> Result<Projection> {
    ProjectionProcessor::process(inputs, config, anchor)
}

pub fn validate_config(config: &ProjectionConfig) -> Result<()> {
    if config.window_months == 0 {
        return Err(ProjectionError::validation(
            ValidationKind::InvalidConfig,
            "window_months",
            "The projection window needs at least one month",
        ));
    }
    if config.window_months > MAX_WINDOW_MONTHS {
        return Err(ProjectionError::validation(
            ValidationKind::InvalidConfig,
            "window_months",
            format!(
                "Window of {} months exceeds the maximum of {}",
                config.window_months, MAX_WINDOW_MONTHS
            ),
        ));
    }
    if config.trailing_months == 0 {
        return Err(ProjectionError::validation(
            ValidationKind::InvalidConfig,
            "trailing_months",
            "The variable expense average needs at least one month",
        ));
    }
    if config.trailing_months > MAX_TRAILING_MONTHS {
        return Err(ProjectionError::validation(
            ValidationKind::InvalidConfig,
            "trailing_months",
            format!(
                "Trailing window of {} months exceeds the maximum of {}",
                config.trailing_months, MAX_TRAILING_MONTHS
            ),
        ));
    }
    if config.income_history_records == 0 {
        return Err(ProjectionError::validation(
            ValidationKind::InvalidConfig,
            "income_history_records",
            "The income average needs at least one record",
        ));
    }
    if config.warning_ratio < Decimal::ZERO || config.warning_ratio > Decimal::ONE {
        return Err(ProjectionError::validation(
            ValidationKind::InvalidConfig,
            "warning_ratio",
            format!(
                "Warning ratio {} must be between 0 and 1",
                config.warning_ratio
            ),
        ));
    }
    Ok(())
}

/// Rejects snapshots the engine should never see.
///
/// Month keys are already checked when they are parsed, so this covers
/// amounts, installment counts and month-of-year lists.
pub fn validate_inputs(inputs: &ProjectionInputs, config: &ProjectionConfig) -> Result<()> {
    for base in &inputs.base_incomes {
        ensure_non_negative(base.amount, &format!("base income {}", base.effective_from_month))?;
    }

    for record in &inputs.income_records {
        ensure_non_negative(record.amount, &format!("income record {}", record.date))?;
    }

    for component in &inputs.components {
        ensure_non_negative(component.amount, &component.name)?;
        if let Some(months) = &component.explicit_months {
            ensure_months_of_year(months, &component.name)?;
        }
        let has_months = component
            .explicit_months
            .as_ref()
            .is_some_and(|m| !m.is_empty());
        if config.strict_validation && component.recurrence == Recurrence::Custom && !has_months {
            return Err(ProjectionError::validation(
                ValidationKind::EmptyCustomRecurrence,
                component.name.clone(),
                "Custom recurrence lists no months",
            ));
        }
    }

    for event in &inputs.seasonal_events {
        ensure_non_negative(event.amount, &event.name)?;
        if event.months.is_empty() {
            return Err(ProjectionError::validation(
                ValidationKind::EmptySeasonalMonths,
                event.name.clone(),
                "Seasonal event lists no months",
            ));
        }
        ensure_months_of_year(&event.months, &event.name)?;
    }

    for deduction in &inputs.deductions {
        ensure_non_negative(deduction.monthly_amount, &deduction.description)?;
        if deduction.installments_already_paid > deduction.total_installments {
            return Err(ProjectionError::validation(
                ValidationKind::InstallmentsExceedTotal,
                deduction.description.clone(),
                format!(
                    "{} installments paid out of {}",
                    deduction.installments_already_paid, deduction.total_installments
                ),
            ));
        }
    }

    for expense in &inputs.fixed_expenses {
        ensure_non_negative(expense.amount, &expense.name)?;
    }

    for expense in &inputs.variable_expenses {
        ensure_non_negative(
            expense.amount,
            &format!("{} expense on {}", expense.category, expense.date),
        )?;
    }

    for (idx, transaction) in inputs.card_transactions.iter().enumerate() {
        let subject = transaction
            .description
            .clone()
            .unwrap_or_else(|| format!("card transaction #{}", idx));
        ensure_non_negative(transaction.total_amount, &subject)?;
        if transaction.installment_count == 0 {
            return Err(ProjectionError::validation(
                ValidationKind::ZeroInstallments,
                subject,
                "A purchase needs at least one installment",
            ));
        }
    }

    Ok(())
}

fn ensure_non_negative(amount: Decimal, subject: &str) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(ProjectionError::validation(
            ValidationKind::NegativeAmount,
            subject,
            format!("Amount {} is negative", amount),
        ));
    }
    Ok(())
}

fn ensure_months_of_year(months: &BTreeSet<u32>, subject: &str) -> Result<()> {
    if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
        return Err(ProjectionError::validation(
            ValidationKind::MonthOutOfRange,
            subject,
            format!("Month {} is not between 1 and 12", bad),
        ));
    }
    Ok(())
}
