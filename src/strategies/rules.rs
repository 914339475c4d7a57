//! Individual tax optimisation rules
//!
//! Each rule sees the client context and the current-year tax result and
//! either proposes one strategy or nothing. Rules are independent of each
//! other and of their position in [`RULES`].

use super::{Difficulty, OptimizationStrategy, StrategyCategory, StrategyContext};
use crate::rounding::round_to_cents;
use crate::tax::{TaxCalculationResult, CGT_DISCOUNT_INCLUSION};

pub type Rule = fn(&StrategyContext, &TaxCalculationResult) -> Option<OptimizationStrategy>;

/// Evaluation order; output is re-sorted by saving afterwards
pub const RULES: [Rule; 7] = [
    charitable_donations,
    concessional_super,
    existing_negative_gearing,
    new_investment_property,
    medicare_levy_surcharge,
    work_related_expenses,
    capital_gains_timing,
];

// Donations
pub const DONATION_TARGET_RATIO: f64 = 0.01;
pub const DONATION_TARGET_CAP: f64 = 10_000.0;

// Super
pub const CONCESSIONAL_CAP: f64 = 27_500.0;
pub const SUPER_GUARANTEE_RATE: f64 = 0.115;
pub const SUPER_CONTRIBUTIONS_TAX: f64 = 0.15;

// Hypothetical geared purchase
pub const NEW_PROPERTY_INCOME_GATE: f64 = 120_000.0;
pub const NEW_PROPERTY_VALUE: f64 = 600_000.0;
pub const NEW_PROPERTY_LVR: f64 = 0.8;
pub const NEW_PROPERTY_RATE: f64 = 0.06;
pub const NEW_PROPERTY_YIELD: f64 = 0.04;
pub const NEW_PROPERTY_EXPENSE_RATIO: f64 = 0.01;

// Medicare levy surcharge tiers (singles)
pub const MLS_THRESHOLD: f64 = 90_000.0;
pub const MLS_TIER_2: f64 = 105_000.0;
pub const MLS_TIER_3: f64 = 140_000.0;

// Work-related expenses
pub const WORK_EXPENSE_TARGET_RATIO: f64 = 0.02;
pub const WORK_EXPENSE_TARGET_CAP: f64 = 3_000.0;

fn strategy(
    title: &str,
    description: String,
    potential_saving: f64,
    difficulty: Difficulty,
    category: StrategyCategory,
) -> Option<OptimizationStrategy> {
    if potential_saving.is_finite() && round_to_cents(potential_saving) > 0.0 {
        Some(OptimizationStrategy::new(
            title,
            description,
            potential_saving,
            difficulty,
            category,
        ))
    } else {
        None
    }
}

pub fn charitable_donations(
    ctx: &StrategyContext,
    tax: &TaxCalculationResult,
) -> Option<OptimizationStrategy> {
    let target = (tax.taxable_income * DONATION_TARGET_RATIO).min(DONATION_TARGET_CAP);
    let headroom = target - ctx.charitable_donations;
    if headroom <= 0.0 {
        return None;
    }
    strategy(
        "Increase charitable donations",
        format!(
            "Donating a further ${headroom:.0} to registered charities is fully deductible at your {:.0}% marginal rate.",
            tax.marginal_tax_rate * 100.0
        ),
        headroom * tax.marginal_tax_rate,
        Difficulty::Easy,
        StrategyCategory::Deductions,
    )
}

pub fn concessional_super(
    ctx: &StrategyContext,
    tax: &TaxCalculationResult,
) -> Option<OptimizationStrategy> {
    if tax.marginal_tax_rate <= SUPER_CONTRIBUTIONS_TAX {
        return None;
    }
    let employer = ctx.salary * SUPER_GUARANTEE_RATE;
    let headroom = CONCESSIONAL_CAP - employer - ctx.concessional_contributions;
    if headroom <= 0.0 {
        return None;
    }
    strategy(
        "Salary sacrifice into super",
        format!(
            "${headroom:.0} of the concessional cap is unused. Contributions are taxed at 15% instead of your marginal rate."
        ),
        headroom * (tax.marginal_tax_rate - SUPER_CONTRIBUTIONS_TAX),
        Difficulty::Easy,
        StrategyCategory::Super,
    )
}

pub fn existing_negative_gearing(
    ctx: &StrategyContext,
    tax: &TaxCalculationResult,
) -> Option<OptimizationStrategy> {
    if ctx.property_losses <= 0.0 {
        return None;
    }
    strategy(
        "Claim negative gearing on existing property",
        format!(
            "Rental losses of ${:.0} offset other income. Keep records of interest and holding costs.",
            ctx.property_losses
        ),
        ctx.property_losses * tax.marginal_tax_rate,
        Difficulty::Medium,
        StrategyCategory::Investments,
    )
}

pub fn new_investment_property(
    _ctx: &StrategyContext,
    tax: &TaxCalculationResult,
) -> Option<OptimizationStrategy> {
    if tax.taxable_income <= NEW_PROPERTY_INCOME_GATE {
        return None;
    }
    let interest = NEW_PROPERTY_VALUE * NEW_PROPERTY_LVR * NEW_PROPERTY_RATE;
    let rent = NEW_PROPERTY_VALUE * NEW_PROPERTY_YIELD;
    let expenses = NEW_PROPERTY_VALUE * NEW_PROPERTY_EXPENSE_RATIO;
    let loss = interest + expenses - rent;
    strategy(
        "Buy a negatively geared investment property",
        format!(
            "A ${NEW_PROPERTY_VALUE:.0} property at {:.0}% LVR would run a ${loss:.0} annual loss deductible against salary.",
            NEW_PROPERTY_LVR * 100.0
        ),
        loss * tax.marginal_tax_rate,
        Difficulty::Hard,
        StrategyCategory::Investments,
    )
}

/// Surcharge rate for a single without private hospital cover
pub fn medicare_levy_surcharge_rate(taxable_income: f64) -> f64 {
    if taxable_income > MLS_TIER_3 {
        0.015
    } else if taxable_income > MLS_TIER_2 {
        0.0125
    } else if taxable_income > MLS_THRESHOLD {
        0.01
    } else {
        0.0
    }
}

pub fn medicare_levy_surcharge(
    ctx: &StrategyContext,
    tax: &TaxCalculationResult,
) -> Option<OptimizationStrategy> {
    if ctx.has_private_health_insurance {
        return None;
    }
    let rate = medicare_levy_surcharge_rate(tax.taxable_income);
    strategy(
        "Take out private hospital cover",
        format!(
            "Without hospital cover you pay a {:.2}% Medicare levy surcharge on taxable income.",
            rate * 100.0
        ),
        tax.taxable_income * rate,
        Difficulty::Easy,
        StrategyCategory::Other,
    )
}

pub fn work_related_expenses(
    ctx: &StrategyContext,
    tax: &TaxCalculationResult,
) -> Option<OptimizationStrategy> {
    let target = (ctx.salary * WORK_EXPENSE_TARGET_RATIO).min(WORK_EXPENSE_TARGET_CAP);
    let headroom = target - ctx.work_related_expenses;
    if headroom <= 0.0 {
        return None;
    }
    strategy(
        "Claim work-related expenses",
        format!(
            "Typical claims for your salary are about ${target:.0}. Review tools, travel, home office and training costs."
        ),
        headroom * tax.marginal_tax_rate,
        Difficulty::Easy,
        StrategyCategory::Deductions,
    )
}

pub fn capital_gains_timing(
    ctx: &StrategyContext,
    tax: &TaxCalculationResult,
) -> Option<OptimizationStrategy> {
    if ctx.capital_gains <= 0.0 {
        return None;
    }
    strategy(
        "Hold assets 12 months before selling",
        format!(
            "Gains of ${:.0} on assets held over 12 months qualify for the 50% CGT discount.",
            ctx.capital_gains
        ),
        ctx.capital_gains * CGT_DISCOUNT_INCLUSION * tax.marginal_tax_rate,
        Difficulty::Medium,
        StrategyCategory::Timing,
    )
}
