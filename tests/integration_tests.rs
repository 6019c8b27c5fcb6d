use chrono::NaiveDate;
use household_cashflow_projection::card::installment_schedule;
use household_cashflow_projection::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

fn key(s: &str) -> MonthKey {
    parse_month_key(s).unwrap()
}

fn export_to_csv(projection: &Projection) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for month in &projection.months {
        writer.serialize(month)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

const HOUSEHOLD_SNAPSHOT: &str = r#"{
    "base_incomes": [
        { "amount": "5200.00", "effective_from_month": "2024-03" },
        { "amount": "5600.00", "effective_from_month": "2025-03" }
    ],
    "income_records": [
        { "amount": "5480.00", "date": "2025-08-05", "description": "Salary" },
        { "amount": "5480.00", "date": "2025-09-05", "description": "Salary" }
    ],
    "components": [
        { "name": "Meal allowance", "kind": "credit", "amount": "480.00", "recurrence": "monthly" },
        { "name": "Health plan", "kind": "debit", "amount": "220.00", "recurrence": "monthly" },
        { "name": "Quarterly profit share", "kind": "credit", "amount": "900.00", "recurrence": "quarterly" }
    ],
    "seasonal_events": [
        { "name": "Thirteenth salary", "amount": "5600.00", "months": [12] },
        { "name": "Vacation bonus", "amount": "1860.00", "months": [1] }
    ],
    "deductions": [
        {
            "description": "Car loan",
            "monthly_amount": "640.00",
            "total_installments": 24,
            "installments_already_paid": 20,
            "start_month": "2025-10"
        }
    ],
    "fixed_expenses": [
        { "name": "Rent", "amount": "2100.00", "is_active": true, "category": "housing" },
        { "name": "Internet", "amount": "120.00", "is_active": true, "category": "utilities" },
        { "name": "Old gym", "amount": "150.00", "is_active": false, "category": "health" }
    ],
    "variable_expenses": [
        { "amount": "800.00", "date": "2025-07-14", "category": "groceries" },
        { "amount": "650.00", "date": "2025-08-10", "category": "groceries" },
        { "amount": "250.00", "date": "2025-08-22", "category": "leisure" },
        { "amount": "900.00", "date": "2025-09-03", "category": "groceries" },
        { "amount": "310.00", "date": "2025-10-02", "category": "groceries" }
    ],
    "card_transactions": [
        { "description": "Fridge", "total_amount": "3000.00", "installment_count": 10, "first_invoice_month": "2025-08" },
        { "description": "Flights", "total_amount": "1000.00", "installment_count": 3, "first_invoice_month": "2025-11" }
    ],
    "piggy_bank": { "current_balance": "12000.00" }
}"#;

#[test]
fn test_household_snapshot_from_json() -> anyhow::Result<()> {
    let inputs = ProjectionInputs::from_json_str(HOUSEHOLD_SNAPSHOT)?;
    let projection = project(&inputs, key("2025-10"))?;

    assert_eq!(projection.months.len(), 12);
    assert_eq!(projection.months[0].month_key, key("2025-10"));
    assert_eq!(projection.months[11].month_key, key("2026-09"));

    let summary = &projection.summary;
    assert_eq!(summary.monthly_income, dec!(5600));
    assert_eq!(summary.base_amount, Some(dec!(5600)));
    assert_eq!(summary.total_fixed_expenses, dec!(2220));
    assert_eq!(summary.average_variable_expenses, dec!(866.67));
    assert_eq!(summary.piggy_bank_balance, dec!(12000));
    assert_eq!(summary.fixed_expenses_by_category.len(), 2);

    let october = &projection.months[0];
    assert_eq!(october.variable_expenses, dec!(310));
    assert_eq!(october.card_invoice, dec!(300));
    assert_eq!(october.total_expenses, dec!(2830));
    assert_eq!(october.balance, dec!(2770));
    assert_eq!(october.cumulative_balance, dec!(14770));

    let november = &projection.months[1];
    assert_eq!(november.card_invoice, dec!(633.33));
    assert_eq!(november.variable_expenses, dec!(866.67));

    let january = &projection.months[3];
    assert_eq!(january.card_invoice, dec!(633.34));

    for month in &projection.months {
        assert_eq!(month.income, dec!(5600));
        assert_eq!(month.status, HealthStatus::Positive);
    }
    Ok(())
}

#[test]
fn test_household_snapshot_composed_income() -> anyhow::Result<()> {
    let inputs = ProjectionInputs::from_json_str(HOUSEHOLD_SNAPSHOT)?;
    let config = ProjectionConfig::from_json_str(r#"{ "income_mode": "composed" }"#)?;
    let projection = project_with_config(&inputs, &config, key("2025-10"))?;

    let income: Vec<Decimal> = projection.months.iter().map(|m| m.income).collect();

    // Oct: base + meal - health + profit share - loan
    assert_eq!(income[0], dec!(6120));
    // Nov: loan still active, no profit share
    assert_eq!(income[1], dec!(5220));
    // Dec: thirteenth salary
    assert_eq!(income[2], dec!(10820));
    // Jan: last loan installment, profit share and vacation bonus
    assert_eq!(income[3], dec!(7980));
    // Feb: loan finished
    assert_eq!(income[4], dec!(5860));
    Ok(())
}

#[test]
fn test_projection_is_idempotent() -> anyhow::Result<()> {
    let inputs = ProjectionInputs::from_json_str(HOUSEHOLD_SNAPSHOT)?;
    let first = serde_json::to_string(&project(&inputs, key("2025-10"))?)?;
    let second = serde_json::to_string(&project(&inputs, key("2025-10"))?)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_csv_export_keeps_field_names() -> anyhow::Result<()> {
    let inputs = ProjectionInputs::from_json_str(HOUSEHOLD_SNAPSHOT)?;
    let projection = project(&inputs, key("2025-10"))?;
    let csv = export_to_csv(&projection)?;

    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("month_key,income,fixed_expenses,variable_expenses,card_invoice,total_expenses,balance,cumulative_balance,status")
    );
    let first_row = lines.next().unwrap_or_default();
    assert!(first_row.starts_with("2025-10,"));
    assert!(first_row.ends_with(",positive"));
    assert_eq!(csv.lines().count(), 13);
    Ok(())
}

#[test]
fn test_brand_new_account_projects_twelve_empty_months() -> anyhow::Result<()> {
    let inputs = ProjectionInputs::from_json_str("{}")?;
    let projection = project(&inputs, key("2026-01"))?;
    assert_eq!(projection.months.len(), 12);
    assert!(projection.months.iter().all(|m| m.balance == Decimal::ZERO));
    assert_eq!(projection.summary.first_month_balance, Decimal::ZERO);
    Ok(())
}

#[test]
fn test_malformed_month_key_is_rejected_on_load() {
    let json = r#"{ "card_transactions": [
        { "total_amount": "10", "installment_count": 1, "first_invoice_month": "2025-13" }
    ] }"#;
    let err = ProjectionInputs::from_json_str(json).unwrap_err();
    assert!(matches!(err, ProjectionError::SerializationError(_)));
}

#[test]
fn test_net_salary_example() {
    let components = vec![
        IncomeComponent {
            name: "Transport".to_string(),
            kind: EntryKind::Credit,
            amount: dec!(500),
            recurrence: Recurrence::Monthly,
            explicit_months: None,
        },
        IncomeComponent {
            name: "Union dues".to_string(),
            kind: EntryKind::Debit,
            amount: dec!(200),
            recurrence: Recurrence::Custom,
            explicit_months: Some(BTreeSet::from([6])),
        },
    ];
    let june = compose_net_salary(dec!(5000), &components, &[], &[], key("2025-06"));
    let july = compose_net_salary(dec!(5000), &components, &[], &[], key("2025-07"));
    assert_eq!(june.net_amount, dec!(5300));
    assert_eq!(july.net_amount, dec!(5500));
}

#[test]
fn test_installment_conservation_across_purchases() {
    let mut total_charged = Decimal::ZERO;
    let mut total_bought = Decimal::ZERO;
    for count in 1..=24u32 {
        let transaction = CardTransaction {
            description: None,
            total_amount: Decimal::new(100_000 + count as i64 * 37, 2),
            installment_count: count,
            first_invoice_month: key("2025-01"),
        };
        let schedule = installment_schedule(&transaction);
        assert_eq!(schedule.len(), count as usize);
        let sum: Decimal = schedule.iter().map(|(_, c)| *c).sum();
        assert_eq!(sum, transaction.total_amount);
        total_charged += sum;
        total_bought += transaction.total_amount;
    }
    assert_eq!(total_charged, total_bought);
}

#[test]
fn test_register_purchase_then_project() -> anyhow::Result<()> {
    let card = CreditCard {
        name: "Household card".to_string(),
        closing_day: 25,
        due_day: 5,
    };
    let on_closing =
        register_purchase(&card, NaiveDate::from_ymd_opt(2025, 4, 25).unwrap(), dec!(600), 2, None)?;
    let after_closing =
        register_purchase(&card, NaiveDate::from_ymd_opt(2025, 4, 26).unwrap(), dec!(90), 1, None)?;
    assert_eq!(on_closing.first_invoice_month, key("2025-04"));
    assert_eq!(after_closing.first_invoice_month, key("2025-05"));

    let inputs = ProjectionInputs {
        card_transactions: vec![on_closing, after_closing],
        ..Default::default()
    };
    let projection = project(&inputs, key("2025-04"))?;
    assert_eq!(projection.months[0].card_invoice, dec!(300));
    assert_eq!(projection.months[1].card_invoice, dec!(390));
    assert_eq!(projection.months[2].card_invoice, Decimal::ZERO);
    assert_eq!(projection.months[0].status, HealthStatus::Danger);
    assert_eq!(projection.summary.danger_months, 2);
    assert_eq!(projection.summary.lowest_balance_month, Some(key("2025-05")));
    Ok(())
}
