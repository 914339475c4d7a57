//! Year-by-year output structures for projections

use serde::{Deserialize, Serialize};

use super::state::{Phase, ProjectionState};
use crate::rounding::round_to_cents;

/// Cash flows of a single projection year, before rounding
#[derive(Debug, Clone, Copy, Default)]
pub struct YearFlows {
    pub gross_income: f64,
    pub tax: f64,
    pub living_expenses: f64,
    pub property_expenses: f64,
    pub loan_repayments: f64,
    pub super_contributions: f64,
    pub retirement_withdrawals: f64,
    pub net_cash_flow: f64,
    pub unfunded_shortfall: f64,
}

/// One row of projection output, frozen once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    // Timing
    pub year: u32,
    pub age: u32,
    pub phase: Phase,

    // Balances at year end
    pub super_balance: f64,
    pub property_balance: f64,
    pub shares_balance: f64,
    pub savings_balance: f64,
    pub other_balance: f64,
    pub investment_property_value: f64,
    pub liability_balance: f64,

    // Flows during the year
    pub gross_income: f64,
    pub tax: f64,
    pub living_expenses: f64,
    pub property_expenses: f64,
    pub loan_repayments: f64,
    pub super_contributions: f64,
    pub retirement_withdrawals: f64,
    pub net_cash_flow: f64,
    pub unfunded_shortfall: f64,

    // Summary
    pub net_worth: f64,
}

impl YearSnapshot {
    /// Freeze the state and flows of a year into reported (cent-rounded) figures
    pub fn capture(state: &ProjectionState, flows: &YearFlows) -> Self {
        Self {
            year: state.year,
            age: state.age,
            phase: state.phase,
            super_balance: round_to_cents(state.balances.super_balance),
            property_balance: round_to_cents(state.balances.property),
            shares_balance: round_to_cents(state.balances.shares),
            savings_balance: round_to_cents(state.balances.savings),
            other_balance: round_to_cents(state.balances.other),
            investment_property_value: round_to_cents(state.property_value()),
            liability_balance: round_to_cents(state.liability_balance()),
            gross_income: round_to_cents(flows.gross_income),
            tax: round_to_cents(flows.tax),
            living_expenses: round_to_cents(flows.living_expenses),
            property_expenses: round_to_cents(flows.property_expenses),
            loan_repayments: round_to_cents(flows.loan_repayments),
            super_contributions: round_to_cents(flows.super_contributions),
            retirement_withdrawals: round_to_cents(flows.retirement_withdrawals),
            net_cash_flow: round_to_cents(flows.net_cash_flow),
            unfunded_shortfall: round_to_cents(flows.unfunded_shortfall),
            net_worth: round_to_cents(state.net_worth()),
        }
    }
}

/// Whether projected retirement income covers projected expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionStatus {
    Surplus,
    Deficit,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub combined_networth_at_retirement: f64,
    pub projected_annual_passive_income: f64,
    pub monthly_surplus_deficit: f64,
    pub years_to_retirement: u32,
    pub status: ProjectionStatus,
    pub year_by_year: Vec<YearSnapshot>,
}

impl ProjectionResult {
    pub fn is_deficit(&self) -> bool {
        self.status == ProjectionStatus::Deficit
    }

    /// Snapshot taken in the retirement year
    pub fn retirement_snapshot(&self) -> Option<&YearSnapshot> {
        self.year_by_year.get(self.years_to_retirement as usize)
    }

    /// Last snapshot, at retirement or at the horizon when projected beyond it
    pub fn final_snapshot(&self) -> Option<&YearSnapshot> {
        self.year_by_year.last()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let accumulation = self
            .year_by_year
            .iter()
            .filter(|s| s.phase == Phase::Accumulation && s.year > 0);

        let mut total_tax = 0.0;
        let mut total_saved = 0.0;
        let mut total_shortfall = 0.0;
        for s in accumulation {
            total_tax += s.tax;
            total_saved += s.net_cash_flow.max(0.0);
            total_shortfall += s.unfunded_shortfall;
        }

        let peak_net_worth = self
            .year_by_year
            .iter()
            .map(|s| s.net_worth)
            .fold(f64::NEG_INFINITY, f64::max);

        ProjectionSummary {
            total_years: self.year_by_year.len().saturating_sub(1) as u32,
            total_tax_to_retirement: round_to_cents(total_tax),
            total_saved_to_retirement: round_to_cents(total_saved),
            total_shortfall_to_retirement: round_to_cents(total_shortfall),
            peak_net_worth: if peak_net_worth.is_finite() { peak_net_worth } else { 0.0 },
            final_net_worth: self.final_snapshot().map(|s| s.net_worth).unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_tax_to_retirement: f64,
    pub total_saved_to_retirement: f64,
    pub total_shortfall_to_retirement: f64,
    pub peak_net_worth: f64,
    pub final_net_worth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::sample_inputs;

    #[test]
    fn test_capture_rounds_to_cents() {
        let state = ProjectionState::from_inputs(&sample_inputs()).unwrap();
        let flows = YearFlows {
            gross_income: 1_234.5678,
            unfunded_shortfall: 0.004,
            ..Default::default()
        };
        let snapshot = YearSnapshot::capture(&state, &flows);

        assert_eq!(snapshot.year, 0);
        assert_eq!(snapshot.age, 45);
        assert_eq!(snapshot.gross_income, 1_234.57);
        assert_eq!(snapshot.unfunded_shortfall, 0.0);
        assert_eq!(snapshot.investment_property_value, 650_000.0);
        assert_eq!(snapshot.liability_balance, 850_000.0);
        assert_eq!(snapshot.net_worth, 1_050_000.0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ProjectionStatus::Deficit).unwrap();
        assert_eq!(json, "\"deficit\"");
    }

    #[test]
    fn test_empty_result_summary() {
        let result = ProjectionResult {
            combined_networth_at_retirement: 0.0,
            projected_annual_passive_income: 0.0,
            monthly_surplus_deficit: 0.0,
            years_to_retirement: 0,
            status: ProjectionStatus::Surplus,
            year_by_year: Vec::new(),
        };
        let summary = result.summary();

        assert!(result.retirement_snapshot().is_none());
        assert_eq!(summary.total_years, 0);
        assert_eq!(summary.peak_net_worth, 0.0);
        assert_eq!(summary.final_net_worth, 0.0);
    }
}
