use crate::schema::{IncomeComponent, Recurrence};
use std::collections::BTreeSet;

const QUARTERLY_DEFAULT: [u32; 4] = [1, 4, 7, 10];
const ANNUAL_DEFAULT: [u32; 1] = [12];

/// Months of the year (1-12) a recurrence class applies to.
///
/// `explicit_months` overrides the quarterly and annual defaults, is the
/// whole answer for `Custom`, and is ignored for `Monthly`. A custom
/// recurrence without months resolves to the empty set.
pub fn resolve_months(
    recurrence: Recurrence,
    explicit_months: Option<&BTreeSet<u32>>,
) -> BTreeSet<u32> {
    match recurrence {
        Recurrence::Monthly => (1..=12).collect(),
        Recurrence::Quarterly => explicit_or(explicit_months, &QUARTERLY_DEFAULT),
        Recurrence::Annual => explicit_or(explicit_months, &ANNUAL_DEFAULT),
        Recurrence::Custom => explicit_months.cloned().unwrap_or_default(),
    }
}

fn explicit_or(explicit_months: Option<&BTreeSet<u32>>, default: &[u32]) -> BTreeSet<u32> {
    match explicit_months {
        Some(months) if !months.is_empty() => months.clone(),
        _ => default.iter().copied().collect(),
    }
}

pub fn component_months(component: &IncomeComponent) -> BTreeSet<u32> {
    resolve_months(component.recurrence, component.explicit_months.as_ref())
}

pub fn applies_in(component: &IncomeComponent, month_of_year: u32) -> bool {
    component_months(component).contains(&month_of_year)
}
