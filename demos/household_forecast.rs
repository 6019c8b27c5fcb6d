use household_cashflow_projection::card::installment_schedule;
use household_cashflow_projection::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("📊 Household Cash-Flow Forecast Demo\n");

    let anchor = parse_month_key("2025-10")?;

    let card = CreditCard {
        name: "Household card".to_string(),
        closing_day: 20,
        due_day: 28,
    };
    let tv = register_purchase(
        &card,
        NaiveDate::from_ymd_opt(2025, 10, 22).ok_or("invalid date")?,
        dec!(2400),
        6,
        Some("Television".to_string()),
    )?;

    println!("🧾 Television installments:");
    for (month, charge) in installment_schedule(&tv) {
        println!("    {} → {}", month, charge);
    }

    let inputs = ProjectionInputs {
        base_incomes: vec![BaseIncome {
            amount: dec!(4800),
            effective_from_month: parse_month_key("2025-01")?,
        }],
        components: vec![IncomeComponent {
            name: "Health plan".to_string(),
            kind: EntryKind::Debit,
            amount: dec!(180),
            recurrence: Recurrence::Monthly,
            explicit_months: None,
        }],
        seasonal_events: vec![SeasonalEvent {
            name: "Year-end bonus".to_string(),
            amount: dec!(4800),
            months: BTreeSet::from([12]),
        }],
        deductions: vec![SalaryDeduction {
            description: "Payroll loan".to_string(),
            monthly_amount: dec!(350),
            total_installments: 12,
            installments_already_paid: 7,
            start_month: anchor,
        }],
        fixed_expenses: vec![
            FixedExpense {
                name: "Rent".to_string(),
                amount: dec!(1900),
                is_active: true,
                category: "housing".to_string(),
            },
            FixedExpense {
                name: "Streaming".to_string(),
                amount: dec!(45),
                is_active: true,
                category: "leisure".to_string(),
            },
        ],
        variable_expenses: vec![VariableExpense {
            amount: dec!(2100),
            date: NaiveDate::from_ymd_opt(2025, 9, 15).ok_or("invalid date")?,
            category: "groceries".to_string(),
            description: None,
        }],
        card_transactions: vec![tv],
        piggy_bank: PiggyBank {
            current_balance: dec!(6500),
        },
        ..Default::default()
    };

    let config = ProjectionConfig {
        income_mode: IncomeMode::Composed,
        ..Default::default()
    };
    let projection = project_with_config(&inputs, &config, anchor)?;

    println!("\n📅 Projection from {}:", projection.anchor);
    println!(
        "    {:<8} {:>10} {:>10} {:>10} {:>12}  status",
        "month", "income", "expenses", "balance", "cumulative"
    );
    for month in &projection.months {
        println!(
            "    {:<8} {:>10} {:>10} {:>10} {:>12}  {:?}",
            month.month_key,
            month.income,
            month.total_expenses,
            month.balance,
            month.cumulative_balance,
            month.status
        );
    }

    let summary = &projection.summary;
    println!("\n📋 Summary:");
    println!("    Monthly income:     {}", summary.monthly_income);
    println!("    Fixed expenses:     {}", summary.total_fixed_expenses);
    println!("    Average variable:   {}", summary.average_variable_expenses);
    println!("    Piggy bank:         {}", summary.piggy_bank_balance);
    println!("    Months in danger:   {}", summary.danger_months);
    if let Some(month) = summary.lowest_balance_month {
        println!("    Tightest month:     {}", month);
    }

    Ok(())
}
