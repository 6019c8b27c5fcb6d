use crate::amortization::is_active_in_month;
use crate::recurrence::applies_in;
use crate::schema::{
    BaseIncome, BreakdownLine, EntryKind, IncomeComponent, LineSource, SalaryBreakdown,
    SalaryDeduction, SeasonalEvent,
};
use crate::utils::{round_currency, MonthKey};
use log::debug;
use rust_decimal::Decimal;

pub const BASE_SALARY_LINE: &str = "Base Salary";

/// The base income in effect for `as_of`: the latest positive entry whose
/// effective month is not after it.
pub fn current_base_income(history: &[BaseIncome], as_of: MonthKey) -> Option<&BaseIncome> {
    history
        .iter()
        .filter(|entry| entry.amount > Decimal::ZERO && entry.effective_from_month <= as_of)
        .max_by_key(|entry| entry.effective_from_month)
}

/// Net take-home pay for `target`, with one breakdown line per contribution.
///
/// Recurring components and seasonal events match on the month of year;
/// deductions match on the full month key. Negative amounts are skipped.
pub fn compose_net_salary(
    base: Decimal,
    components: &[IncomeComponent],
    events: &[SeasonalEvent],
    deductions: &[SalaryDeduction],
    target: MonthKey,
) -> SalaryBreakdown {
    let month_of_year = target.month_of_year();
    let mut credits = Decimal::ZERO;
    let mut debits = Decimal::ZERO;
    let mut seasonal_bonuses = Decimal::ZERO;
    let mut deductions_amount = Decimal::ZERO;

    let mut breakdown = vec![BreakdownLine {
        name: BASE_SALARY_LINE.to_string(),
        amount: base,
        kind: EntryKind::Credit,
        source: LineSource::Base,
    }];

    for component in components {
        if component.amount < Decimal::ZERO {
            debug!("Skipping component '{}' with negative amount", component.name);
            continue;
        }
        if !applies_in(component, month_of_year) {
            continue;
        }
        match component.kind {
            EntryKind::Credit => credits += component.amount,
            EntryKind::Debit => debits += component.amount,
        }
        breakdown.push(BreakdownLine {
            name: component.name.clone(),
            amount: component.amount,
            kind: component.kind,
            source: LineSource::Component,
        });
    }

    for event in events {
        if event.amount < Decimal::ZERO {
            debug!("Skipping seasonal event '{}' with negative amount", event.name);
            continue;
        }
        if !event.months.contains(&month_of_year) {
            continue;
        }
        seasonal_bonuses += event.amount;
        breakdown.push(BreakdownLine {
            name: event.name.clone(),
            amount: event.amount,
            kind: EntryKind::Credit,
            source: LineSource::Seasonal,
        });
    }

    for deduction in deductions {
        if deduction.monthly_amount < Decimal::ZERO {
            debug!(
                "Skipping deduction '{}' with negative amount",
                deduction.description
            );
            continue;
        }
        if !is_active_in_month(deduction, target) {
            continue;
        }
        deductions_amount += deduction.monthly_amount;
        breakdown.push(BreakdownLine {
            name: deduction.description.clone(),
            amount: deduction.monthly_amount,
            kind: EntryKind::Debit,
            source: LineSource::Deduction,
        });
    }

    let net_amount =
        round_currency(base + credits - debits + seasonal_bonuses - deductions_amount);

    SalaryBreakdown {
        month: target,
        net_amount,
        credits,
        debits,
        seasonal_bonuses,
        deductions_amount,
        breakdown,
    }
}
