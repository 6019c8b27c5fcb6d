use crate::card::invoice_total;
use crate::salary::{compose_net_salary, current_base_income};
use crate::schema::*;
use crate::utils::{add_months, months_in_window, round_currency, MonthKey};
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Builds the rolling month-by-month forecast from one input snapshot.
///
/// The builder holds only configuration. Every call to [`ProjectionBuilder::build`]
/// reads the snapshot and the anchor month it is given and nothing else, so
/// the same arguments always give the same projection.
pub struct ProjectionBuilder {
    config: ProjectionConfig,
}

impl ProjectionBuilder {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn build(&self, inputs: &ProjectionInputs, anchor: MonthKey) -> Projection {
        let monthly_income = self.monthly_income(inputs, anchor);
        let base_amount = current_base_income(&inputs.base_incomes, anchor).map(|b| b.amount);
        let total_fixed = total_fixed_expenses(&inputs.fixed_expenses);
        let avg_variable = self.average_variable_expenses(&inputs.variable_expenses, anchor);

        debug!(
            "Anchor {}: income {}, fixed {}, average variable {}",
            anchor, monthly_income, total_fixed, avg_variable
        );

        let mut running = inputs.piggy_bank.current_balance;
        let window = self.config.window_months.min(MAX_WINDOW_MONTHS);
        let mut months = Vec::with_capacity(window as usize);

        for month in months_in_window(anchor, window) {
            let income = self.income_for_month(inputs, anchor, month, monthly_income);
            let card_invoice = invoice_total(&inputs.card_transactions, month);
            let variable =
                variable_actuals(&inputs.variable_expenses, month).unwrap_or(avg_variable);
            let total_expenses = total_fixed + variable + card_invoice;
            let balance = income - total_expenses;
            running += balance;

            months.push(MonthlyProjection {
                month_key: month,
                income,
                fixed_expenses: total_fixed,
                variable_expenses: variable,
                card_invoice,
                total_expenses,
                balance,
                cumulative_balance: running,
                status: self.classify(balance, income),
            });
        }

        let summary = ProjectionSummary {
            first_month_balance: months.first().map(|m| m.balance).unwrap_or(Decimal::ZERO),
            total_fixed_expenses: total_fixed,
            average_variable_expenses: avg_variable,
            monthly_income,
            base_amount,
            piggy_bank_balance: inputs.piggy_bank.current_balance,
            fixed_expenses_by_category: fixed_expenses_by_category(&inputs.fixed_expenses),
            lowest_balance_month: months.iter().min_by_key(|m| m.balance).map(|m| m.month_key),
            danger_months: months
                .iter()
                .filter(|m| m.status == HealthStatus::Danger)
                .count(),
        };

        Projection {
            anchor,
            months,
            summary,
        }
    }

    /// The income figure evaluated once per projection.
    ///
    /// Falls back in order: actual income received in the anchor month, the
    /// base income in effect, the average of the most recent income records,
    /// zero.
    pub fn monthly_income(&self, inputs: &ProjectionInputs, anchor: MonthKey) -> Decimal {
        if let Some(actual) = income_actuals(&inputs.income_records, anchor) {
            debug!("Income for {} taken from actual records", anchor);
            return actual;
        }

        if let Some(base) = current_base_income(&inputs.base_incomes, anchor) {
            debug!("Income for {} taken from base income", anchor);
            return base.amount;
        }

        let mut history: Vec<&IncomeRecord> = inputs.income_records.iter().collect();
        if history.is_empty() {
            debug!("No income data for {}, projecting zero income", anchor);
            return Decimal::ZERO;
        }
        history.sort_by(|a, b| b.date.cmp(&a.date));
        let recent: Vec<&IncomeRecord> = history
            .into_iter()
            .take(self.config.income_history_records.max(1))
            .collect();
        let sum: Decimal = recent.iter().map(|r| r.amount).sum();
        debug!(
            "Income for {} averaged over {} recent records",
            anchor,
            recent.len()
        );
        round_currency(sum / Decimal::from(recent.len()))
    }

    /// Average monthly variable spending over the complete months before the anchor.
    pub fn average_variable_expenses(
        &self,
        expenses: &[VariableExpense],
        anchor: MonthKey,
    ) -> Decimal {
        let trailing = self.config.trailing_months.min(MAX_TRAILING_MONTHS);
        if trailing == 0 {
            return Decimal::ZERO;
        }
        let window_start = add_months(anchor, -(trailing as i32));
        let sum: Decimal = expenses
            .iter()
            .filter(|e| {
                let month = MonthKey::from_date(e.date);
                month >= window_start && month < anchor
            })
            .map(|e| e.amount)
            .sum();
        round_currency(sum / Decimal::from(trailing))
    }

    fn income_for_month(
        &self,
        inputs: &ProjectionInputs,
        anchor: MonthKey,
        month: MonthKey,
        flat_income: Decimal,
    ) -> Decimal {
        match self.config.income_mode {
            IncomeMode::Flat => flat_income,
            IncomeMode::Composed => {
                if month == anchor && income_actuals(&inputs.income_records, anchor).is_some() {
                    return flat_income;
                }
                self.salary_breakdown(inputs, month)
                    .map(|breakdown| breakdown.net_amount)
                    .unwrap_or(flat_income)
            }
        }
    }

    /// Salary breakdown for one month using the base income in effect then.
    pub fn salary_breakdown(
        &self,
        inputs: &ProjectionInputs,
        month: MonthKey,
    ) -> Option<SalaryBreakdown> {
        current_base_income(&inputs.base_incomes, month).map(|base| {
            compose_net_salary(
                base.amount,
                &inputs.components,
                &inputs.seasonal_events,
                &inputs.deductions,
                month,
            )
        })
    }

    pub fn classify(&self, balance: Decimal, income: Decimal) -> HealthStatus {
        if balance < Decimal::ZERO {
            HealthStatus::Danger
        } else if balance < income * self.config.warning_ratio {
            HealthStatus::Warning
        } else {
            HealthStatus::Positive
        }
    }
}

impl Default for ProjectionBuilder {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}

pub fn total_fixed_expenses(expenses: &[FixedExpense]) -> Decimal {
    expenses
        .iter()
        .filter(|e| e.is_active)
        .map(|e| e.amount)
        .sum()
}

pub fn fixed_expenses_by_category(expenses: &[FixedExpense]) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for expense in expenses.iter().filter(|e| e.is_active) {
        *totals.entry(expense.category.clone()).or_insert(Decimal::ZERO) += expense.amount;
    }
    totals
}

/// Sum of variable expenses dated in `month`, or `None` when there are none.
pub fn variable_actuals(expenses: &[VariableExpense], month: MonthKey) -> Option<Decimal> {
    sum_in_month(expenses.iter().map(|e| (e.date, e.amount)), month)
}

/// Sum of income received in `month`, or `None` when nothing was recorded.
pub fn income_actuals(records: &[IncomeRecord], month: MonthKey) -> Option<Decimal> {
    sum_in_month(records.iter().map(|r| (r.date, r.amount)), month)
}

fn sum_in_month(
    entries: impl Iterator<Item = (chrono::NaiveDate, Decimal)>,
    month: MonthKey,
) -> Option<Decimal> {
    entries
        .filter(|(date, _)| month.contains(*date))
        .map(|(_, amount)| amount)
        .reduce(|acc, amount| acc + amount)
}
