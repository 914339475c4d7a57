//! Income tax, Medicare levy and rate queries over a bracket table

use log::trace;
use serde::{Deserialize, Serialize};

use super::brackets::{check_bracket_table, find_bracket, TaxBracket, RESIDENT_TAX_BRACKETS};
use crate::error::{PlanningError, PlanningResult};
use crate::inputs::FinancialInputs;
use crate::rounding::{round_rate, round_to_cents};

/// Flat Medicare levy (no low-income phase-in)
pub const MEDICARE_LEVY_RATE: f64 = 0.02;

/// Corporate rate used to gross up franked dividends
pub const COMPANY_TAX_RATE: f64 = 0.30;

/// Share of a discount capital gain that is assessable
pub const CGT_DISCOUNT_INCLUSION: f64 = 0.5;

/// Tax breakdown for one income year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationResult {
    pub taxable_income: f64,
    pub income_tax: f64,
    pub medicare_levy: f64,
    pub total_tax: f64,
    pub net_income: f64,
    pub marginal_tax_rate: f64,
    pub average_tax_rate: f64,
    pub franked_credits: f64,
    pub total_deductions: f64,
}

/// Tax calculator over an immutable bracket table
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator {
    brackets: &'static [TaxBracket],
    medicare_levy_rate: f64,
}

impl Default for TaxCalculator {
    fn default() -> Self {
        Self::resident()
    }
}

fn check_income(taxable_income: f64) -> PlanningResult<()> {
    if !taxable_income.is_finite() || taxable_income < 0.0 {
        return Err(PlanningError::invalid(format!(
            "taxable income must be non-negative (got {taxable_income})"
        )));
    }
    Ok(())
}

impl TaxCalculator {
    /// Resident rates with the standard 2% levy
    pub const fn resident() -> Self {
        Self {
            brackets: RESIDENT_TAX_BRACKETS,
            medicare_levy_rate: MEDICARE_LEVY_RATE,
        }
    }

    /// Calculator over a custom table, e.g. a different income year
    pub fn with_brackets(
        brackets: &'static [TaxBracket],
        medicare_levy_rate: f64,
    ) -> PlanningResult<Self> {
        check_bracket_table(brackets)?;
        if !(0.0..=1.0).contains(&medicare_levy_rate) {
            return Err(PlanningError::invalid(format!(
                "medicare levy rate {medicare_levy_rate} outside [0, 1]"
            )));
        }
        Ok(Self {
            brackets,
            medicare_levy_rate,
        })
    }

    pub fn brackets(&self) -> &'static [TaxBracket] {
        self.brackets
    }

    /// Progressive income tax, rounded to cents
    pub fn income_tax(&self, taxable_income: f64) -> PlanningResult<f64> {
        check_income(taxable_income)?;
        let income = round_to_cents(taxable_income);
        let bracket = find_bracket(self.brackets, income);
        Ok(round_to_cents(bracket.tax_on(income)))
    }

    /// Flat levy on non-negative income; zero otherwise
    pub fn medicare_levy(&self, taxable_income: f64) -> f64 {
        if taxable_income.is_finite() && taxable_income >= 0.0 {
            round_to_cents(round_to_cents(taxable_income) * self.medicare_levy_rate)
        } else {
            0.0
        }
    }

    /// Rate applied to the next dollar earned (levy excluded)
    pub fn marginal_rate(&self, taxable_income: f64) -> f64 {
        let income = if taxable_income.is_finite() {
            round_to_cents(taxable_income.max(0.0))
        } else {
            0.0
        };
        find_bracket(self.brackets, income).rate
    }

    /// Total tax (income tax plus levy) divided by taxable income
    pub fn effective_rate(&self, taxable_income: f64) -> PlanningResult<f64> {
        Ok(self.total_tax(taxable_income)?.average_tax_rate)
    }

    /// Income tax plus levy for a taxable income
    pub fn total_tax(&self, taxable_income: f64) -> PlanningResult<TaxCalculationResult> {
        check_income(taxable_income)?;
        let income = round_to_cents(taxable_income);

        let income_tax = self.income_tax(income)?;
        let medicare_levy = self.medicare_levy(income);
        let total_tax = round_to_cents(income_tax + medicare_levy);

        Ok(TaxCalculationResult {
            taxable_income: income,
            income_tax,
            medicare_levy,
            total_tax,
            net_income: round_to_cents(income - total_tax),
            marginal_tax_rate: round_rate(self.marginal_rate(income)),
            average_tax_rate: average_rate(total_tax, income),
            franked_credits: 0.0,
            total_deductions: 0.0,
        })
    }

    /// Current-year tax from a client's full income picture
    ///
    /// Assessable income grosses up franked dividends, includes half of
    /// capital gains (12-month discount) and the net result of investment
    /// properties (losses offset other income). Deductions reduce it and the
    /// result is floored at zero. Franking credits offset the tax bill and can
    /// produce a refund, i.e. a negative `total_tax`. `net_income` is cash
    /// received after property costs, less `total_tax`.
    pub fn tax_for_inputs(&self, inputs: &FinancialInputs) -> PlanningResult<TaxCalculationResult> {
        let franking_credits =
            inputs.franked_dividends * COMPANY_TAX_RATE / (1.0 - COMPANY_TAX_RATE);
        let property_result: f64 = inputs
            .investment_properties
            .iter()
            .map(|p| p.annual_cash_flow())
            .sum();

        let assessable = inputs.annual_income
            + inputs.rental_income
            + property_result
            + inputs.dividends
            + inputs.franked_dividends
            + franking_credits
            + inputs.capital_gains * CGT_DISCOUNT_INCLUSION
            + inputs.other_income;
        let deductions = inputs.deductions.total();
        let taxable_income = round_to_cents((assessable - deductions).max(0.0));

        let income_tax = self.income_tax(taxable_income)?;
        let medicare_levy = self.medicare_levy(taxable_income);
        let total_tax = round_to_cents(income_tax + medicare_levy - franking_credits);

        let cash_income = inputs.annual_income
            + inputs.rental_income
            + property_result
            + inputs.dividends
            + inputs.franked_dividends
            + inputs.capital_gains
            + inputs.other_income;

        trace!(
            "assessable {:.2}, deductions {:.2}, taxable {:.2}, total tax {:.2}",
            assessable,
            deductions,
            taxable_income,
            total_tax
        );

        Ok(TaxCalculationResult {
            taxable_income,
            income_tax,
            medicare_levy,
            total_tax,
            net_income: round_to_cents(cash_income - total_tax),
            marginal_tax_rate: round_rate(self.marginal_rate(taxable_income)),
            average_tax_rate: average_rate(total_tax, taxable_income),
            franked_credits: round_to_cents(franking_credits),
            total_deductions: round_to_cents(deductions),
        })
    }
}

fn average_rate(total_tax: f64, taxable_income: f64) -> f64 {
    if taxable_income > 0.0 {
        round_rate((total_tax / taxable_income).max(0.0))
    } else {
        0.0
    }
}
