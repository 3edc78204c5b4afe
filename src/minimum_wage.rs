//! Fines expressed in daily minimum-wage units (SMDLV).

use crate::formatters::format_currency;
use serde::Serialize;

/// Monthly minimum wage the unit is derived from.
pub const MINIMUM_WAGE: u64 = 143_500;

/// Units used when a calculation is requested without a category.
pub const DEFAULT_UNITS: u32 = 2;

/// Value of one daily unit: the monthly wage over 30 days, rounded.
pub const fn daily_unit() -> u64 {
    (MINIMUM_WAGE + 15) / 30
}

/// A fine category and the number of daily units it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FineCategory {
    pub id: u32,
    pub name: &'static str,
    pub units: u32,
}

pub const FINE_CATEGORIES: [FineCategory; 4] = [
    FineCategory { id: 1, name: "Fine Type 1", units: 2 },
    FineCategory { id: 2, name: "Fine Type 2", units: 4 },
    FineCategory { id: 3, name: "Fine Type 3", units: 3 },
    FineCategory { id: 4, name: "Fine Type 4", units: 16 },
];

pub fn category(id: u32) -> Option<FineCategory> {
    FINE_CATEGORIES.iter().copied().find(|c| c.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FineCalculation {
    pub units: u32,
    pub unit_value: u64,
    pub total: u64,
    pub wage_text: String,
    pub unit_formula_text: String,
    pub unit_value_text: String,
    pub total_text: String,
}

/// Fine amount for `units` daily units, [`DEFAULT_UNITS`] when `None`.
pub fn calculate(units: Option<u32>) -> FineCalculation {
    let units = units.unwrap_or(DEFAULT_UNITS);
    let unit_value = daily_unit();
    let total = unit_value * u64::from(units);
    let wage_text = format_currency(Some(MINIMUM_WAGE as f64));

    FineCalculation {
        units,
        unit_value,
        total,
        unit_formula_text: format!("{}/30", wage_text),
        wage_text,
        unit_value_text: format_currency(Some(unit_value as f64)),
        total_text: format_currency(Some(total as f64)),
    }
}
