use crate::error::{ProjectionError, Result, ValidationKind};
use crate::schema::{CardTransaction, CreditCard};
use crate::utils::{add_months, elapsed_months, truncate_currency, MonthKey};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Invoice month a purchase lands on.
///
/// Purchases on or before the closing day belong to the invoice of the
/// purchase month; later purchases roll into the next month's invoice. A
/// closing day past the end of the month closes on its last day.
pub fn invoice_month_for_purchase(purchase_date: NaiveDate, closing_day: u32) -> MonthKey {
    let purchase_month = MonthKey::from_date(purchase_date);
    let effective_closing = closing_day.min(purchase_month.days());
    if purchase_date.day() <= effective_closing {
        purchase_month
    } else {
        purchase_month.next()
    }
}

/// Charge of one transaction on the invoice of `target`.
///
/// Each installment is the total divided evenly and truncated to cents; the
/// last installment takes the remainder so the installments sum to the total
/// exactly.
pub fn charge_for_month(transaction: &CardTransaction, target: MonthKey) -> Decimal {
    let count = transaction.installment_count;
    if count == 0 {
        return Decimal::ZERO;
    }

    let offset = elapsed_months(transaction.first_invoice_month, target);
    if offset < 0 || offset as u32 >= count {
        return Decimal::ZERO;
    }

    let installment = truncate_currency(transaction.total_amount / Decimal::from(count));
    if offset as u32 == count - 1 {
        transaction.total_amount - installment * Decimal::from(count - 1)
    } else {
        installment
    }
}

/// Every (invoice month, charge) pair of a transaction, in order.
pub fn installment_schedule(transaction: &CardTransaction) -> Vec<(MonthKey, Decimal)> {
    (0..transaction.installment_count)
        .map(|i| {
            let month = add_months(transaction.first_invoice_month, i as i32);
            (month, charge_for_month(transaction, month))
        })
        .collect()
}

/// Last invoice month carrying an installment.
pub fn last_invoice_month(transaction: &CardTransaction) -> Option<MonthKey> {
    match transaction.installment_count {
        0 => None,
        n => Some(add_months(transaction.first_invoice_month, n as i32 - 1)),
    }
}

/// Total invoice for `target` over all transactions.
pub fn invoice_total(transactions: &[CardTransaction], target: MonthKey) -> Decimal {
    transactions
        .iter()
        .map(|t| charge_for_month(t, target))
        .sum()
}

/// Builds the transaction for a new card purchase, assigning its first
/// invoice month from the card's closing day.
pub fn register_purchase(
    card: &CreditCard,
    purchase_date: NaiveDate,
    total_amount: Decimal,
    installment_count: u32,
    description: Option<String>,
) -> Result<CardTransaction> {
    validate_card(card)?;

    if installment_count == 0 {
        return Err(ProjectionError::validation(
            ValidationKind::ZeroInstallments,
            card.name.clone(),
            "A purchase needs at least one installment",
        ));
    }
    if total_amount < Decimal::ZERO {
        return Err(ProjectionError::validation(
            ValidationKind::NegativeAmount,
            card.name.clone(),
            format!("Purchase total {} is negative", total_amount),
        ));
    }

    Ok(CardTransaction {
        description,
        total_amount,
        installment_count,
        first_invoice_month: invoice_month_for_purchase(purchase_date, card.closing_day),
    })
}

pub fn validate_card(card: &CreditCard) -> Result<()> {
    let days = [
        ("closing", card.closing_day, ValidationKind::InvalidClosingDay),
        ("due", card.due_day, ValidationKind::InvalidDueDay),
    ];
    for (label, day, kind) in days {
        if !(1..=31).contains(&day) {
            return Err(ProjectionError::validation(
                kind,
                card.name.clone(),
                format!("Invalid {} day {}: must be between 1 and 31", label, day),
            ));
        }
    }
    Ok(())
}
