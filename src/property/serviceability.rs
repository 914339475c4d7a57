//! Two-pass borrowing capacity for an investment property funded from retirement surplus

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PlanningError, PlanningResult};
use crate::loans::calculate_max_borrowing_capacity;
use crate::projection::ProjectionResult;
use crate::rounding::{round_rate, round_to_cents};

/// Share of current income that must stay available for living costs in retirement
pub const INCOME_RESERVE_RATIO: f64 = 0.70;

/// Share of expected rent a lender counts towards repayments
pub const RENT_SHADING: f64 = 0.75;

/// Retirement sufficiency figures the serviceability check needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementMetrics {
    pub is_deficit: bool,
    pub projected_annual_passive_income: f64,
    pub current_annual_income: f64,
    pub monthly_surplus_deficit: f64,
}

impl RetirementMetrics {
    pub fn from_projection(projection: &ProjectionResult, current_annual_income: f64) -> Self {
        Self {
            is_deficit: projection.is_deficit(),
            projected_annual_passive_income: projection.projected_annual_passive_income,
            current_annual_income,
            monthly_surplus_deficit: projection.monthly_surplus_deficit,
        }
    }
}

/// Lending parameters, all expressed as decimal fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceabilityParams {
    pub interest_rate: f64,
    pub loan_term_years: f64,
    pub max_lvr: f64,
    pub rental_yield: f64,
    pub expense_ratio: f64,
}

impl Default for ServiceabilityParams {
    fn default() -> Self {
        Self {
            interest_rate: 0.06,
            loan_term_years: 30.0,
            max_lvr: 0.8,
            rental_yield: 0.04,
            expense_ratio: 0.02,
        }
    }
}

impl ServiceabilityParams {
    fn validate(&self) -> PlanningResult<()> {
        let fractions = [
            ("interest rate", self.interest_rate),
            ("rental yield", self.rental_yield),
            ("expense ratio", self.expense_ratio),
        ];
        for (label, value) in fractions {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanningError::invalid(format!(
                    "{label} must be non-negative (got {value})"
                )));
            }
        }
        if !(self.max_lvr > 0.0 && self.max_lvr <= 1.0) {
            return Err(PlanningError::invalid(format!(
                "max LVR must be in (0, 1] (got {})",
                self.max_lvr
            )));
        }
        if !self.loan_term_years.is_finite() || self.loan_term_years <= 0.0 {
            return Err(PlanningError::invalid(format!(
                "loan term must be positive (got {})",
                self.loan_term_years
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceabilityResult {
    pub max_property_value: f64,
    pub max_loan_amount: f64,
    pub max_monthly_payment: f64,
    /// Monthly retirement surplus above the income reserve
    pub surplus_income: f64,
    pub loan_to_value_ratio: f64,
    pub monthly_rental_income: f64,
    pub total_monthly_expenses: f64,
    pub is_viable: bool,
    pub reason: Option<String>,
}

impl ServiceabilityResult {
    fn not_viable(reason: &str) -> Self {
        Self {
            max_property_value: 0.0,
            max_loan_amount: 0.0,
            max_monthly_payment: 0.0,
            surplus_income: 0.0,
            loan_to_value_ratio: 0.0,
            monthly_rental_income: 0.0,
            total_monthly_expenses: 0.0,
            is_viable: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// One sizing pass: the loan a monthly payment supports and the property it buys
struct Sizing {
    loan: f64,
    value: f64,
    monthly_rent: f64,
    monthly_expenses: f64,
}

fn size_property(monthly_payment: f64, params: &ServiceabilityParams) -> PlanningResult<Sizing> {
    let loan = calculate_max_borrowing_capacity(
        monthly_payment,
        params.interest_rate * 100.0,
        params.loan_term_years,
    )?;
    let value = loan / params.max_lvr;
    Ok(Sizing {
        loan,
        value,
        monthly_rent: value * params.rental_yield / 12.0,
        monthly_expenses: value * params.expense_ratio / 12.0,
    })
}

/// Largest investment property the retirement surplus can carry
///
/// The first pass sizes a loan from the surplus alone. The second adds 75% of
/// the rent that first property would earn and sizes again. There is no
/// iteration beyond the second pass.
pub fn calculate_property_serviceability(
    metrics: &RetirementMetrics,
    params: &ServiceabilityParams,
) -> PlanningResult<ServiceabilityResult> {
    params.validate()?;
    // A deficit is never viable, whatever the income figures say
    if metrics.is_deficit {
        return Ok(ServiceabilityResult::not_viable(
            "Projected retirement income does not cover expenses",
        ));
    }
    for (label, value) in [
        ("projected passive income", metrics.projected_annual_passive_income),
        ("current annual income", metrics.current_annual_income),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(PlanningError::invalid(format!(
                "{label} must be non-negative (got {value})"
            )));
        }
    }

    let reserve = metrics.current_annual_income * INCOME_RESERVE_RATIO;
    let annual_surplus = (metrics.projected_annual_passive_income - reserve).max(0.0);
    let monthly_surplus = annual_surplus / 12.0;
    if monthly_surplus <= 0.0 {
        return Ok(ServiceabilityResult::not_viable(
            "No surplus income above 70% of current income",
        ));
    }

    let first = size_property(monthly_surplus, params)?;
    let payment_capacity = monthly_surplus + RENT_SHADING * first.monthly_rent;
    let last = size_property(payment_capacity, params)?;

    debug!(
        "serviceability: surplus {:.2}/month, pass 1 value {:.2}, pass 2 value {:.2}",
        monthly_surplus, first.value, last.value
    );

    Ok(ServiceabilityResult {
        max_property_value: round_to_cents(last.value),
        max_loan_amount: round_to_cents(last.loan),
        max_monthly_payment: round_to_cents(payment_capacity),
        surplus_income: round_to_cents(monthly_surplus),
        loan_to_value_ratio: round_rate(params.max_lvr),
        monthly_rental_income: round_to_cents(last.monthly_rent),
        total_monthly_expenses: round_to_cents(last.monthly_expenses),
        is_viable: true,
        reason: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn metrics(passive: f64, income: f64) -> RetirementMetrics {
        RetirementMetrics {
            is_deficit: false,
            projected_annual_passive_income: passive,
            current_annual_income: income,
            monthly_surplus_deficit: 1_000.0,
        }
    }

    fn interest_free() -> ServiceabilityParams {
        ServiceabilityParams {
            interest_rate: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_pass_sizing_interest_free() {
        // Surplus 30,000 a year = 2,500 a month over 360 repayments
        let result =
            calculate_property_serviceability(&metrics(100_000.0, 100_000.0), &interest_free())
                .unwrap();

        assert!(result.is_viable);
        assert!(result.reason.is_none());
        assert_abs_diff_eq!(result.surplus_income, 2_500.0, epsilon = 1e-9);
        // Pass 1: loan 900,000, value 1,125,000, rent 3,750 a month
        assert_abs_diff_eq!(result.max_monthly_payment, 5_312.5, epsilon = 1e-9);
        assert_abs_diff_eq!(result.max_loan_amount, 1_912_500.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.max_property_value, 2_390_625.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.monthly_rental_income, 7_968.75, epsilon = 1e-6);
        assert_abs_diff_eq!(result.total_monthly_expenses, 3_984.38, epsilon = 0.01);
        assert_eq!(result.loan_to_value_ratio, 0.8);
    }

    #[test]
    fn test_default_params_at_six_percent() {
        let result = calculate_property_serviceability(
            &metrics(100_000.0, 100_000.0),
            &ServiceabilityParams::default(),
        )
        .unwrap();

        // Monthly P&I on 300,000 at 6% over 30 years is 1,798.65
        let factor = 300_000.0 / 1_798.651_6;
        let first_value = 2_500.0 * factor / 0.8;
        let capacity = 2_500.0 + 0.75 * first_value * 0.04 / 12.0;

        assert_abs_diff_eq!(result.max_monthly_payment, capacity, epsilon = 0.05);
        assert_abs_diff_eq!(result.max_property_value, capacity * factor / 0.8, epsilon = 20.0);
        assert_abs_diff_eq!(
            result.max_loan_amount,
            result.max_property_value * 0.8,
            epsilon = 0.02
        );
    }

    #[test]
    fn test_deficit_is_not_viable() {
        let mut m = metrics(500_000.0, 50_000.0);
        m.is_deficit = true;
        let result = calculate_property_serviceability(&m, &ServiceabilityParams::default()).unwrap();

        assert!(!result.is_viable);
        assert!(result.reason.is_some());
        assert_eq!(result.max_property_value, 0.0);
        assert_eq!(result.max_monthly_payment, 0.0);
    }

    #[test]
    fn test_deficit_short_circuits_income_checks() {
        for (passive, income) in [(-1.0, 50_000.0), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
            let mut m = metrics(passive, income);
            m.is_deficit = true;
            let result =
                calculate_property_serviceability(&m, &ServiceabilityParams::default()).unwrap();
            assert!(!result.is_viable);
            assert_eq!(result.max_property_value, 0.0);
        }
    }

    #[test]
    fn test_no_surplus_above_reserve() {
        // 70% of 100,000 exceeds the 60,000 passive income
        let result = calculate_property_serviceability(
            &metrics(60_000.0, 100_000.0),
            &ServiceabilityParams::default(),
        )
        .unwrap();

        assert!(!result.is_viable);
        assert_eq!(result.max_property_value, 0.0);
        assert_eq!(result.surplus_income, 0.0);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let m = metrics(100_000.0, 50_000.0);
        let bad_lvr = ServiceabilityParams {
            max_lvr: 0.0,
            ..Default::default()
        };
        let bad_term = ServiceabilityParams {
            loan_term_years: 0.0,
            ..Default::default()
        };
        assert!(calculate_property_serviceability(&m, &bad_lvr).is_err());
        assert!(calculate_property_serviceability(&m, &bad_term).is_err());
        assert!(calculate_property_serviceability(&metrics(-1.0, 0.0), &Default::default()).is_err());
    }

    #[test]
    fn test_metrics_from_projection() {
        use crate::projection::{ProjectionResult, ProjectionStatus};

        let projection = ProjectionResult {
            combined_networth_at_retirement: 1_000_000.0,
            projected_annual_passive_income: 40_000.0,
            monthly_surplus_deficit: -250.0,
            years_to_retirement: 20,
            status: ProjectionStatus::Deficit,
            year_by_year: Vec::new(),
        };
        let m = RetirementMetrics::from_projection(&projection, 90_000.0);

        assert!(m.is_deficit);
        assert_eq!(m.projected_annual_passive_income, 40_000.0);
        assert_eq!(m.current_annual_income, 90_000.0);
        assert_eq!(m.monthly_surplus_deficit, -250.0);
    }

    proptest! {
        #[test]
        fn prop_deficit_never_viable(
            passive in 0.0f64..1_000_000.0,
            income in 0.0f64..500_000.0,
        ) {
            let mut m = metrics(passive, income);
            m.is_deficit = true;
            let result = calculate_property_serviceability(&m, &ServiceabilityParams::default()).unwrap();
            prop_assert!(!result.is_viable);
            prop_assert_eq!(result.max_property_value, 0.0);
        }

        #[test]
        fn prop_more_surplus_buys_more_property(
            income in 0.0f64..200_000.0,
            extra in 1_000.0f64..100_000.0,
        ) {
            let params = ServiceabilityParams::default();
            let base = income * INCOME_RESERVE_RATIO + 1_000.0;
            let low = calculate_property_serviceability(&metrics(base, income), &params).unwrap();
            let high = calculate_property_serviceability(&metrics(base + extra, income), &params).unwrap();
            prop_assert!(low.is_viable && high.is_viable);
            prop_assert!(high.max_property_value > low.max_property_value);
        }
    }
}
