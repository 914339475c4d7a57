//! Tax optimisation strategy generator
//!
//! Runs a fixed list of independent rules against a client's current-year
//! tax position and ranks what they propose by estimated annual saving.

pub mod rules;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::inputs::FinancialInputs;
use crate::rounding::round_to_cents;
use crate::tax::TaxCalculationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyCategory {
    Deductions,
    Super,
    Investments,
    Timing,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationStrategy {
    pub strategy: String,
    pub description: String,
    /// Estimated annual tax saving, in dollars
    pub potential_saving: f64,
    pub difficulty: Difficulty,
    pub category: StrategyCategory,
}

impl OptimizationStrategy {
    pub fn new(
        strategy: impl Into<String>,
        description: impl Into<String>,
        potential_saving: f64,
        difficulty: Difficulty,
        category: StrategyCategory,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            description: description.into(),
            potential_saving: round_to_cents(potential_saving),
            difficulty,
            category,
        }
    }
}

/// The parts of a client's position the rules look at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyContext {
    pub salary: f64,
    pub concessional_contributions: f64,
    pub charitable_donations: f64,
    pub work_related_expenses: f64,
    pub has_private_health_insurance: bool,
    /// Sum of losses across negatively geared properties, as a positive amount
    pub property_losses: f64,
    pub capital_gains: f64,
}

impl StrategyContext {
    pub fn from_inputs(inputs: &FinancialInputs) -> Self {
        let property_losses = inputs
            .investment_properties
            .iter()
            .map(|p| (-p.annual_cash_flow()).max(0.0))
            .sum();

        Self {
            salary: inputs.annual_income,
            concessional_contributions: inputs.deductions.concessional_contributions,
            charitable_donations: inputs.deductions.charitable_donations,
            work_related_expenses: inputs.deductions.work_related_expenses,
            has_private_health_insurance: inputs.deductions.has_private_health_insurance,
            property_losses,
            capital_gains: inputs.capital_gains,
        }
    }
}

/// Evaluate every rule and rank the results by saving, highest first
///
/// Ties keep rule order.
pub fn generate_optimization_strategies(
    ctx: &StrategyContext,
    tax: &TaxCalculationResult,
) -> Vec<OptimizationStrategy> {
    let mut strategies: Vec<OptimizationStrategy> =
        rules::RULES.iter().filter_map(|rule| rule(ctx, tax)).collect();

    strategies.sort_by(|a, b| b.potential_saving.total_cmp(&a.potential_saving));

    debug!(
        "{} strategies at taxable income {:.2}",
        strategies.len(),
        tax.taxable_income
    );
    strategies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::sample_inputs;
    use crate::tax::{calculate_tax_for_inputs, calculate_total_tax};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_context_from_inputs() {
        let ctx = StrategyContext::from_inputs(&sample_inputs());
        assert_eq!(ctx.salary, 120_000.0);
        assert_abs_diff_eq!(ctx.property_losses, 6_650.0, epsilon = 1e-9);
        assert!(!ctx.has_private_health_insurance);
    }

    #[test]
    fn test_sample_client_ranking() {
        let inputs = sample_inputs();
        let tax = calculate_tax_for_inputs(&inputs).unwrap();
        // 120,000 - 6,650 + 2,000 + 3,500 + 1,500 franking credits
        assert_abs_diff_eq!(tax.taxable_income, 120_350.0, epsilon = 1e-6);

        let strategies = generate_optimization_strategies(&StrategyContext::from_inputs(&inputs), &tax);
        let savings: Vec<f64> = strategies.iter().map(|s| s.potential_saving).collect();

        assert_eq!(strategies.len(), 6);
        assert_abs_diff_eq!(savings[0], 3_240.0, epsilon = 0.01);
        assert_abs_diff_eq!(savings[1], 2_055.0, epsilon = 0.01);
        assert_abs_diff_eq!(savings[2], 1_995.0, epsilon = 0.01);
        assert_abs_diff_eq!(savings[3], 1_504.38, epsilon = 0.01);
        assert_abs_diff_eq!(savings[4], 720.0, epsilon = 0.01);
        assert_abs_diff_eq!(savings[5], 361.05, epsilon = 0.01);
        assert_eq!(strategies[0].category, StrategyCategory::Investments);
        assert_eq!(strategies[5].category, StrategyCategory::Deductions);
    }

    #[test]
    fn test_low_income_has_few_strategies() {
        let ctx = StrategyContext {
            salary: 15_000.0,
            ..Default::default()
        };
        let tax = calculate_total_tax(15_000.0).unwrap();
        // Zero marginal rate: nothing saves tax
        assert!(generate_optimization_strategies(&ctx, &tax).is_empty());
    }

    #[test]
    fn test_ties_keep_rule_order() {
        // Donation headroom 500 and work expense headroom 500 at the same rate
        let ctx = StrategyContext {
            salary: 50_000.0,
            charitable_donations: 0.0,
            work_related_expenses: 500.0,
            has_private_health_insurance: true,
            ..Default::default()
        };
        let tax = calculate_total_tax(50_000.0).unwrap();
        let strategies = generate_optimization_strategies(&ctx, &tax);
        let donation = strategies
            .iter()
            .position(|s| s.strategy == "Increase charitable donations")
            .unwrap();
        let work = strategies
            .iter()
            .position(|s| s.strategy == "Claim work-related expenses")
            .unwrap();

        assert_eq!(strategies[donation].potential_saving, strategies[work].potential_saving);
        assert!(donation < work);
    }

    #[test]
    fn test_serializes_enum_names() {
        let s = OptimizationStrategy::new("x", "y", 1.234, Difficulty::Medium, StrategyCategory::Timing);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["difficulty"], "Medium");
        assert_eq!(json["category"], "Timing");
        assert_eq!(json["potentialSaving"], 1.23);
    }

    proptest! {
        #[test]
        fn prop_sorted_descending(
            salary in 0.0f64..400_000.0,
            extra in 0.0f64..100_000.0,
            donations in 0.0f64..5_000.0,
            losses in 0.0f64..40_000.0,
            gains in 0.0f64..100_000.0,
            covered in any::<bool>(),
        ) {
            let ctx = StrategyContext {
                salary,
                charitable_donations: donations,
                property_losses: losses,
                capital_gains: gains,
                has_private_health_insurance: covered,
                ..Default::default()
            };
            let tax = calculate_total_tax(salary + extra).unwrap();
            let strategies = generate_optimization_strategies(&ctx, &tax);

            prop_assert!(strategies.len() <= rules::RULES.len());
            for pair in strategies.windows(2) {
                prop_assert!(pair[0].potential_saving >= pair[1].potential_saving);
            }
            prop_assert!(strategies.iter().all(|s| s.potential_saving > 0.0));
        }
    }
}
