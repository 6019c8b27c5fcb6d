use crate::schema::SalaryDeduction;
use crate::utils::{add_months, elapsed_months, round_currency, MonthKey};
use rust_decimal::Decimal;

/// Installments still to be charged. Negative when the paid count is
/// larger than the total.
pub fn remaining_installments(deduction: &SalaryDeduction) -> i64 {
    deduction.total_installments as i64 - deduction.installments_already_paid as i64
}

/// Whether the deduction is charged in `target`.
///
/// The window starts at `start_month` and spans the remaining installments,
/// so a fully paid deduction is never active.
pub fn is_active_in_month(deduction: &SalaryDeduction, target: MonthKey) -> bool {
    if target < deduction.start_month {
        return false;
    }
    let elapsed = elapsed_months(deduction.start_month, target) as i64;
    elapsed < remaining_installments(deduction)
}

/// Last active month. Precedes `start_month` when nothing remains.
pub fn end_month(deduction: &SalaryDeduction) -> MonthKey {
    let remaining = remaining_installments(deduction);
    let offset = (remaining - 1).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    add_months(deduction.start_month, offset)
}

/// 1-based installment number charged in `target`, counting the ones paid
/// before `start_month`.
pub fn installment_number(deduction: &SalaryDeduction, target: MonthKey) -> Option<u32> {
    if !is_active_in_month(deduction, target) {
        return None;
    }
    let elapsed = elapsed_months(deduction.start_month, target) as u32;
    Some(deduction.installments_already_paid + elapsed + 1)
}

/// Amount still owed once the installment of `target` has been charged.
pub fn outstanding_after(deduction: &SalaryDeduction, target: MonthKey) -> Decimal {
    let remaining = remaining_installments(deduction);
    if remaining <= 0 {
        return Decimal::ZERO;
    }
    let charged = if target < deduction.start_month {
        0
    } else {
        (elapsed_months(deduction.start_month, target) as i64 + 1).min(remaining)
    };
    round_currency(deduction.monthly_amount * Decimal::from(remaining - charged))
}
