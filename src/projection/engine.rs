//! Core projection engine for yearly retirement projections

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::cashflows::{ProjectionResult, ProjectionStatus, YearFlows, YearSnapshot};
use super::state::{Phase, ProjectionState};
use crate::assumptions::GrowthAssumptions;
use crate::error::{PlanningError, PlanningResult};
use crate::inputs::{AssetType, FinancialInputs};
use crate::rounding::round_to_cents;
use crate::tax::{TaxCalculator, COMPANY_TAX_RATE};

/// Employer superannuation guarantee, 2024-25
pub const DEFAULT_SUPER_GUARANTEE_RATE: f64 = 0.115;

/// Tax on concessional contributions inside the fund
pub const DEFAULT_CONTRIBUTIONS_TAX_RATE: f64 = 0.15;

/// Order in which assets cover a working-year cash shortfall
const DEFICIT_FUNDING_ORDER: [AssetType; 3] = [AssetType::Savings, AssetType::Shares, AssetType::Other];

/// In retirement super is also available to cover a shortfall
const DRAWDOWN_FUNDING_ORDER: [AssetType; 4] = [
    AssetType::Savings,
    AssetType::Shares,
    AssetType::Other,
    AssetType::Super,
];

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionConfig {
    /// Continue into retirement up to this age. `None` stops at retirement.
    pub horizon_age: Option<u32>,

    /// Employer contributions as a share of salary
    pub super_guarantee_rate: f64,

    /// Tax deducted from employer contributions on entry to the fund
    pub contributions_tax_rate: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_age: None,
            super_guarantee_rate: DEFAULT_SUPER_GUARANTEE_RATE,
            contributions_tax_rate: DEFAULT_CONTRIBUTIONS_TAX_RATE,
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    tax: TaxCalculator,
    config: ProjectionConfig,
}

/// Run a projection to retirement with the default configuration
pub fn calculate_financial_projections(inputs: &FinancialInputs) -> PlanningResult<ProjectionResult> {
    ProjectionEngine::default().project(inputs)
}

impl ProjectionEngine {
    /// Create a new projection engine with the given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            tax: TaxCalculator::resident(),
            config,
        }
    }

    pub fn with_tax_calculator(tax: TaxCalculator, config: ProjectionConfig) -> Self {
        Self { tax, config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    fn check_config(&self, inputs: &FinancialInputs) -> PlanningResult<()> {
        if let Some(horizon) = self.config.horizon_age {
            if horizon < inputs.retirement_age {
                return Err(PlanningError::invalid(format!(
                    "horizon age {horizon} precedes retirement age {}",
                    inputs.retirement_age
                )));
            }
        }
        for (label, rate) in [
            ("super guarantee rate", self.config.super_guarantee_rate),
            ("contributions tax rate", self.config.contributions_tax_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PlanningError::invalid(format!("{label} {rate} outside [0, 1]")));
            }
        }
        Ok(())
    }

    /// Run the yearly simulation for one client
    pub fn project(&self, inputs: &FinancialInputs) -> PlanningResult<ProjectionResult> {
        inputs.check()?;
        self.check_config(inputs)?;

        let assumptions = &inputs.assumptions;
        let years_to_retirement = inputs.years_to_retirement();
        let horizon = self
            .config
            .horizon_age
            .unwrap_or(inputs.retirement_age)
            .max(inputs.retirement_age);

        debug!(
            "projecting age {} to {} (retiring at {})",
            inputs.current_age, horizon, inputs.retirement_age
        );

        let mut state = ProjectionState::from_inputs(inputs)?;
        let mut year_by_year = Vec::with_capacity((horizon - inputs.current_age + 1) as usize);
        year_by_year.push(YearSnapshot::capture(&state, &YearFlows::default()));

        let mut at_retirement = None;

        while state.age < horizon {
            state.advance_year();
            if state.age > inputs.retirement_age {
                state.phase = Phase::Drawdown;
            }

            let flows = match state.phase {
                Phase::Accumulation => self.accumulation_year(&mut state, assumptions)?,
                Phase::Drawdown => self.drawdown_year(&mut state, assumptions)?,
            };
            trace!(
                "age {}: net cash flow {:.2}, net worth {:.2}",
                state.age,
                flows.net_cash_flow,
                state.net_worth()
            );
            year_by_year.push(YearSnapshot::capture(&state, &flows));

            if state.age == inputs.retirement_age {
                at_retirement = Some(RetirementPosition::from_state(&state, assumptions));
            }
        }

        let position = at_retirement.ok_or_else(|| {
            PlanningError::invalid("projection never reached retirement age")
        })?;

        // No retirement income at all is a deficit even with nothing to spend
        let status = if position.monthly_surplus_deficit < 0.0 || position.passive_income <= 0.0 {
            ProjectionStatus::Deficit
        } else {
            ProjectionStatus::Surplus
        };

        Ok(ProjectionResult {
            combined_networth_at_retirement: round_to_cents(position.net_worth),
            projected_annual_passive_income: round_to_cents(position.passive_income),
            monthly_surplus_deficit: round_to_cents(position.monthly_surplus_deficit),
            years_to_retirement,
            status,
            year_by_year,
        })
    }

    /// Grow balances, property, rents and costs that move the same way in every phase
    fn grow(&self, state: &mut ProjectionState, assumptions: &GrowthAssumptions) {
        for asset_type in AssetType::ALL {
            *state.balances.get_mut(asset_type) *= 1.0 + assumptions.growth_rate_for(asset_type);
        }

        let inflation = assumptions.inflation();
        let rent_growth = assumptions.rent_growth();
        for property in &mut state.properties {
            property.value *= 1.0 + assumptions.property_growth();
            property.annual_rent *= 1.0 + rent_growth;
            property.annual_expenses *= 1.0 + inflation;
        }

        state.rental_income *= 1.0 + rent_growth;
        state.dividends *= 1.0 + inflation;
        state.franked_dividends *= 1.0 + inflation;
        state.living_expenses *= 1.0 + inflation;
    }

    /// Make a year of repayments on every loan
    fn service_loans(&self, state: &mut ProjectionState) -> PlanningResult<LoanTotals> {
        let mut totals = LoanTotals::default();
        for loan in &mut state.loans {
            totals.repayments += loan.advance_year()?.repayment;
        }
        for property in &mut state.properties {
            let year = property.loan.advance_year()?;
            totals.repayments += year.repayment;
            totals.property_interest += year.interest;
        }
        Ok(totals)
    }

    /// Income tax plus levy on investment and rental income, less franking credits
    fn tax_payable(&self, taxable_income: f64, franking_credits: f64) -> PlanningResult<f64> {
        let result = self.tax.total_tax(taxable_income.max(0.0))?;
        Ok(result.total_tax - franking_credits)
    }

    fn accumulation_year(
        &self,
        state: &mut ProjectionState,
        assumptions: &GrowthAssumptions,
    ) -> PlanningResult<YearFlows> {
        let salary_growth = assumptions.salary_growth();
        state.salary *= 1.0 + salary_growth;
        state.other_income *= 1.0 + salary_growth;
        self.grow(state, assumptions);

        let loans = self.service_loans(state)?;
        let property_rent: f64 = state.properties.iter().map(|p| p.annual_rent).sum();
        let property_expenses: f64 = state.properties.iter().map(|p| p.annual_expenses).sum();
        let franking_credits = franking_credits(state.franked_dividends);

        let taxable_income = state.salary
            + state.other_income
            + state.rental_income
            + (property_rent - property_expenses - loans.property_interest)
            + state.dividends
            + state.franked_dividends
            + franking_credits;
        let tax = self.tax_payable(taxable_income, franking_credits)?;

        let gross_income = state.salary
            + state.other_income
            + state.rental_income
            + property_rent
            + state.dividends
            + state.franked_dividends;
        let net_cash_flow =
            gross_income - tax - state.living_expenses - property_expenses - loans.repayments;

        let super_contributions = state.salary
            * self.config.super_guarantee_rate
            * (1.0 - self.config.contributions_tax_rate);
        state.balances.super_balance += super_contributions;

        let unfunded_shortfall = settle(state, net_cash_flow, &DEFICIT_FUNDING_ORDER);

        Ok(YearFlows {
            gross_income,
            tax,
            living_expenses: state.living_expenses,
            property_expenses,
            loan_repayments: loans.repayments,
            super_contributions,
            retirement_withdrawals: 0.0,
            net_cash_flow,
            unfunded_shortfall,
        })
    }

    fn drawdown_year(
        &self,
        state: &mut ProjectionState,
        assumptions: &GrowthAssumptions,
    ) -> PlanningResult<YearFlows> {
        state.salary = 0.0;
        state.other_income = 0.0;
        self.grow(state, assumptions);

        // Withdraw pro rata from investable liquid assets
        let liquid = state.balances.liquid_total();
        let withdrawals = assumptions.withdrawal() * liquid;
        if liquid > 0.0 {
            for asset_type in [AssetType::Super, AssetType::Shares, AssetType::Savings, AssetType::Other] {
                let balance = state.balances.get_mut(asset_type);
                *balance -= withdrawals * (*balance / liquid);
            }
        }

        let loans = self.service_loans(state)?;
        let property_rent: f64 = state.properties.iter().map(|p| p.annual_rent).sum();
        let property_expenses: f64 = state.properties.iter().map(|p| p.annual_expenses).sum();
        let franking_credits = franking_credits(state.franked_dividends);

        // Retirement withdrawals after 60 are tax free
        let taxable_income = state.rental_income
            + (property_rent - property_expenses - loans.property_interest)
            + state.dividends
            + state.franked_dividends
            + franking_credits;
        let tax = self.tax_payable(taxable_income, franking_credits)?;

        let gross_income = withdrawals
            + state.rental_income
            + property_rent
            + state.dividends
            + state.franked_dividends;
        let net_cash_flow =
            gross_income - tax - state.living_expenses - property_expenses - loans.repayments;

        let unfunded_shortfall = settle(state, net_cash_flow, &DRAWDOWN_FUNDING_ORDER);

        Ok(YearFlows {
            gross_income,
            tax,
            living_expenses: state.living_expenses,
            property_expenses,
            loan_repayments: loans.repayments,
            super_contributions: 0.0,
            retirement_withdrawals: withdrawals,
            net_cash_flow,
            unfunded_shortfall,
        })
    }
}

#[derive(Debug, Default)]
struct LoanTotals {
    repayments: f64,
    property_interest: f64,
}

/// Retirement sufficiency figures, full precision
#[derive(Debug)]
struct RetirementPosition {
    net_worth: f64,
    passive_income: f64,
    monthly_surplus_deficit: f64,
}

impl RetirementPosition {
    fn from_state(state: &ProjectionState, assumptions: &GrowthAssumptions) -> Self {
        let passive_income = assumptions.withdrawal() * state.investable_net_worth();
        let monthly_expenses = state.living_expenses / 12.0;
        Self {
            net_worth: state.net_worth(),
            passive_income,
            monthly_surplus_deficit: passive_income / 12.0 - monthly_expenses,
        }
    }
}

fn franking_credits(franked_dividends: f64) -> f64 {
    franked_dividends * COMPANY_TAX_RATE / (1.0 - COMPANY_TAX_RATE)
}

/// Bank a surplus into savings or fund a deficit from assets.
/// Returns the part of a deficit no asset could cover.
fn settle(state: &mut ProjectionState, net_cash_flow: f64, funding_order: &[AssetType]) -> f64 {
    if net_cash_flow >= 0.0 {
        state.balances.savings += net_cash_flow;
        0.0
    } else {
        state.balances.draw_down(-net_cash_flow, funding_order)
    }
}
