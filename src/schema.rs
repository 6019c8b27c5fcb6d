use crate::error::Result;
use crate::utils::MonthKey;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[schemars(description = "Adds to take-home pay (benefits, allowances)")]
    Credit,
    #[schemars(description = "Subtracts from take-home pay (withholding, contributions)")]
    Debit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[schemars(description = "Applies in every month of the year")]
    Monthly,
    #[schemars(description = "Applies in January, April, July and October unless explicit months are given")]
    Quarterly,
    #[schemars(description = "Applies in December unless explicit months are given")]
    Annual,
    #[schemars(description = "Applies only in the explicitly listed months")]
    Custom,
}

/// A base salary entry. The history is append-only; the latest positive
/// entry in effect is the current one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BaseIncome {
    #[schemars(description = "Gross base amount per month")]
    pub amount: Decimal,

    #[schemars(description = "First month (YYYY-MM) this base amount applies to")]
    pub effective_from_month: MonthKey,
}

/// An actual, dated income receipt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct IncomeRecord {
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct IncomeComponent {
    pub name: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub recurrence: Recurrence,

    #[serde(default)]
    #[schemars(
        description = "Months of the year (1-12). Required for custom recurrence; overrides the defaults for quarterly and annual; ignored for monthly."
    )]
    pub explicit_months: Option<BTreeSet<u32>>,
}

/// A credit that comes back every year in the same months (bonuses, vacation pay).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SeasonalEvent {
    pub name: String,
    pub amount: Decimal,
    #[schemars(description = "Months of the year (1-12) the event pays out in. Must not be empty.")]
    pub months: BTreeSet<u32>,
}

/// An amortizing payroll deduction such as a payroll loan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SalaryDeduction {
    pub description: String,
    pub monthly_amount: Decimal,
    pub total_installments: u32,

    #[serde(default)]
    pub installments_already_paid: u32,

    #[schemars(description = "Month (YYYY-MM) the first remaining installment is charged")]
    pub start_month: MonthKey,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FixedExpense {
    pub name: String,
    pub amount: Decimal,

    #[serde(default = "default_active")]
    #[schemars(description = "Inactive expenses are kept but do not count towards projections")]
    pub is_active: bool,

    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct VariableExpense {
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CreditCard {
    pub name: String,

    #[schemars(
        description = "Day of month the invoice closes (1-31). Days past the end of a short month close on its last day."
    )]
    pub closing_day: u32,

    pub due_day: u32,
}

/// A card purchase spread evenly over consecutive invoices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CardTransaction {
    #[serde(default)]
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub installment_count: u32,
    #[schemars(description = "Invoice month (YYYY-MM) carrying the first installment")]
    pub first_invoice_month: MonthKey,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PiggyBank {
    pub current_balance: Decimal,
}

/// Everything the engine reads, as one immutable snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ProjectionInputs {
    #[serde(default)]
    pub base_incomes: Vec<BaseIncome>,
    #[serde(default)]
    pub income_records: Vec<IncomeRecord>,
    #[serde(default)]
    pub components: Vec<IncomeComponent>,
    #[serde(default)]
    pub seasonal_events: Vec<SeasonalEvent>,
    #[serde(default)]
    pub deductions: Vec<SalaryDeduction>,
    #[serde(default)]
    pub fixed_expenses: Vec<FixedExpense>,
    #[serde(default)]
    pub variable_expenses: Vec<VariableExpense>,
    #[serde(default)]
    pub card_transactions: Vec<CardTransaction>,
    #[serde(default)]
    pub piggy_bank: PiggyBank,
}

impl ProjectionInputs {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ProjectionInputs)
    }

    pub fn json_schema_string() -> Result<String> {
        let schema = Self::generate_json_schema();
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IncomeMode {
    /// One income figure repeated across the whole window.
    Flat,
    /// Net salary composed separately for every projected month.
    Composed,
}

/// Longest projection window `validate_config` accepts: ten years.
pub const MAX_WINDOW_MONTHS: u32 = 120;
/// Longest trailing window for the variable expense average.
pub const MAX_TRAILING_MONTHS: u32 = 120;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct ProjectionConfig {
    pub window_months: u32,
    pub trailing_months: u32,
    pub income_history_records: usize,
    #[schemars(description = "Balances below this share of income are flagged as a warning")]
    pub warning_ratio: Decimal,
    pub income_mode: IncomeMode,
    #[schemars(description = "Reject custom recurrences that list no months")]
    pub strict_validation: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            window_months: 12,
            trailing_months: 3,
            income_history_records: 3,
            warning_ratio: dec!(0.10),
            income_mode: IncomeMode::Flat,
            strict_validation: false,
        }
    }
}

impl ProjectionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Positive,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LineSource {
    Base,
    Component,
    Seasonal,
    Deduction,
}

/// One named, signed contribution to a month's net salary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BreakdownLine {
    pub name: String,
    pub amount: Decimal,
    pub kind: EntryKind,
    pub source: LineSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SalaryBreakdown {
    pub month: MonthKey,
    pub net_amount: Decimal,
    pub credits: Decimal,
    pub debits: Decimal,
    pub seasonal_bonuses: Decimal,
    pub deductions_amount: Decimal,
    pub breakdown: Vec<BreakdownLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MonthlyProjection {
    pub month_key: MonthKey,
    pub income: Decimal,
    pub fixed_expenses: Decimal,
    pub variable_expenses: Decimal,
    pub card_invoice: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    /// Piggy-bank balance plus every monthly balance up to this one.
    pub cumulative_balance: Decimal,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ProjectionSummary {
    pub first_month_balance: Decimal,
    pub total_fixed_expenses: Decimal,
    pub average_variable_expenses: Decimal,
    pub monthly_income: Decimal,
    pub base_amount: Option<Decimal>,
    pub piggy_bank_balance: Decimal,
    pub fixed_expenses_by_category: BTreeMap<String, Decimal>,
    pub lowest_balance_month: Option<MonthKey>,
    pub danger_months: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Projection {
    pub anchor: MonthKey,
    pub months: Vec<MonthlyProjection>,
    pub summary: ProjectionSummary,
}
