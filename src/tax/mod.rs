//! Australian resident income tax
//!
//! Free functions below use the resident 2024-25 table. Build a
//! [`TaxCalculator`] directly to evaluate a different table.

mod brackets;
mod calculator;

pub use brackets::{
    check_bracket_table, find_bracket, TaxBracket, RESIDENT_TAX_BRACKETS, TAX_FREE_THRESHOLD,
};
pub use calculator::{
    TaxCalculationResult, TaxCalculator, CGT_DISCOUNT_INCLUSION, COMPANY_TAX_RATE,
    MEDICARE_LEVY_RATE,
};

use crate::error::PlanningResult;
use crate::inputs::FinancialInputs;

pub fn calculate_income_tax(taxable_income: f64) -> PlanningResult<f64> {
    TaxCalculator::resident().income_tax(taxable_income)
}

pub fn calculate_medicare_levy(taxable_income: f64) -> f64 {
    TaxCalculator::resident().medicare_levy(taxable_income)
}

pub fn get_marginal_tax_rate(taxable_income: f64) -> f64 {
    TaxCalculator::resident().marginal_rate(taxable_income)
}

pub fn get_effective_tax_rate(taxable_income: f64) -> PlanningResult<f64> {
    TaxCalculator::resident().effective_rate(taxable_income)
}

pub fn calculate_total_tax(taxable_income: f64) -> PlanningResult<TaxCalculationResult> {
    TaxCalculator::resident().total_tax(taxable_income)
}

pub fn calculate_tax_for_inputs(inputs: &FinancialInputs) -> PlanningResult<TaxCalculationResult> {
    TaxCalculator::resident().tax_for_inputs(inputs)
}
