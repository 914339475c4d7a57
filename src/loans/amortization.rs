//! Amortizing-annuity loan math
//!
//! Shared by liability run-off in projections and by property serviceability.
//! Rates are annual percentages (6.0 = 6% p.a.); terms are in years.

use serde::{Deserialize, Serialize};

use crate::error::{PlanningError, PlanningResult};
use crate::rounding::{pct_to_rate, round_to_cents};

/// Balances below this are treated as fully repaid
const PAID_OUT_EPSILON: f64 = 1e-6;

/// Longest loan term accepted, in years
pub const MAX_TERM_YEARS: f64 = 100.0;

/// How often repayments fall due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RepaymentFrequency {
    #[serde(rename = "W", alias = "Weekly", alias = "weekly")]
    Weekly,
    #[serde(rename = "F", alias = "Fortnightly", alias = "fortnightly")]
    Fortnightly,
    #[default]
    #[serde(rename = "M", alias = "Monthly", alias = "monthly")]
    Monthly,
}

impl RepaymentFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            RepaymentFrequency::Weekly => 52,
            RepaymentFrequency::Fortnightly => 26,
            RepaymentFrequency::Monthly => 12,
        }
    }

    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "w" | "weekly" => Some(RepaymentFrequency::Weekly),
            "f" | "fortnightly" => Some(RepaymentFrequency::Fortnightly),
            "m" | "monthly" => Some(RepaymentFrequency::Monthly),
            _ => None,
        }
    }
}

/// One period of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationPeriod {
    /// Period number (1-indexed)
    pub period: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    /// Balance after this period's payment
    pub balance: f64,
}

/// Schedule totals rolled up per loan year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    /// Loan year (1-indexed)
    pub year: u32,
    pub payments: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

fn check_term(term_years: f64, frequency: RepaymentFrequency) -> PlanningResult<u32> {
    if !term_years.is_finite() || term_years <= 0.0 {
        return Err(PlanningError::invalid(format!(
            "loan term must be positive (got {term_years})"
        )));
    }
    if term_years > MAX_TERM_YEARS {
        return Err(PlanningError::invalid(format!(
            "loan term of {term_years} years exceeds {MAX_TERM_YEARS} years"
        )));
    }
    // At most 5,200 periods, so the integer conversions below cannot overflow
    let periods = (term_years * frequency.periods_per_year() as f64).round();
    if periods < 1.0 {
        return Err(PlanningError::invalid(format!(
            "loan term of {term_years} years is shorter than one repayment period"
        )));
    }
    Ok(periods as u32)
}

fn check_rate(annual_rate_pct: f64) -> PlanningResult<()> {
    if !annual_rate_pct.is_finite() || annual_rate_pct < 0.0 {
        return Err(PlanningError::invalid(format!(
            "interest rate must be non-negative (got {annual_rate_pct})"
        )));
    }
    Ok(())
}

fn check_non_negative(label: &str, value: f64) -> PlanningResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlanningError::invalid(format!(
            "{label} must be non-negative (got {value})"
        )));
    }
    Ok(())
}

fn periodic_rate(annual_rate_pct: f64, frequency: RepaymentFrequency) -> f64 {
    pct_to_rate(annual_rate_pct) / frequency.periods_per_year() as f64
}

/// Level periodic repayment that retires `principal` over the term
///
/// payment = P·r / (1 − (1 + r)^−n), or P / n when the rate is zero.
pub fn calculate_loan_payment(
    principal: f64,
    annual_rate_pct: f64,
    term_years: f64,
    frequency: RepaymentFrequency,
) -> PlanningResult<f64> {
    check_non_negative("principal", principal)?;
    check_rate(annual_rate_pct)?;
    let n = check_term(term_years, frequency)?;

    let r = periodic_rate(annual_rate_pct, frequency);
    if r == 0.0 {
        return Ok(principal / n as f64);
    }

    Ok(principal * r / (1.0 - (1.0 + r).powi(-(n as i32))))
}

/// Largest principal a monthly repayment of `max_periodic_payment` can service
pub fn calculate_max_borrowing_capacity(
    max_periodic_payment: f64,
    annual_rate_pct: f64,
    term_years: f64,
) -> PlanningResult<f64> {
    calculate_max_borrowing_capacity_for(
        max_periodic_payment,
        annual_rate_pct,
        term_years,
        RepaymentFrequency::Monthly,
    )
}

/// Inverse of [`calculate_loan_payment`] for any repayment frequency
pub fn calculate_max_borrowing_capacity_for(
    max_periodic_payment: f64,
    annual_rate_pct: f64,
    term_years: f64,
    frequency: RepaymentFrequency,
) -> PlanningResult<f64> {
    check_non_negative("payment", max_periodic_payment)?;
    check_rate(annual_rate_pct)?;
    let n = check_term(term_years, frequency)?;

    let r = periodic_rate(annual_rate_pct, frequency);
    if r == 0.0 {
        return Ok(max_periodic_payment * n as f64);
    }

    Ok(max_periodic_payment * (1.0 - (1.0 + r).powi(-(n as i32))) / r)
}

/// Outstanding balance after `periods_paid` scheduled repayments
pub fn calculate_remaining_balance(
    principal: f64,
    annual_rate_pct: f64,
    term_years: f64,
    frequency: RepaymentFrequency,
    periods_paid: u32,
) -> PlanningResult<f64> {
    let payment = calculate_loan_payment(principal, annual_rate_pct, term_years, frequency)?;
    let n = check_term(term_years, frequency)?;
    if periods_paid >= n {
        return Ok(0.0);
    }

    let r = periodic_rate(annual_rate_pct, frequency);
    let k = periods_paid as f64;
    let balance = if r == 0.0 {
        principal - payment * k
    } else {
        let growth = (1.0 + r).powi(periods_paid as i32);
        principal * growth - payment * (growth - 1.0) / r
    };

    Ok(if balance < PAID_OUT_EPSILON { 0.0 } else { balance })
}

/// Full period-by-period schedule; the final payment clears any rounding residue
pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    term_years: f64,
    frequency: RepaymentFrequency,
) -> PlanningResult<Vec<AmortizationPeriod>> {
    let payment = calculate_loan_payment(principal, annual_rate_pct, term_years, frequency)?;
    let n = check_term(term_years, frequency)?;
    let r = periodic_rate(annual_rate_pct, frequency);

    let mut schedule = Vec::with_capacity(n as usize);
    let mut balance = principal;

    for period in 1..=n {
        let interest = balance * r;
        let mut principal_paid = payment - interest;
        let mut this_payment = payment;
        if period == n || principal_paid > balance {
            principal_paid = balance;
            this_payment = balance + interest;
        }
        balance -= principal_paid;
        if balance < PAID_OUT_EPSILON {
            balance = 0.0;
        }

        schedule.push(AmortizationPeriod {
            period,
            payment: round_to_cents(this_payment),
            interest: round_to_cents(interest),
            principal: round_to_cents(principal_paid),
            balance: round_to_cents(balance),
        });
    }

    Ok(schedule)
}

/// Roll a schedule up into loan years
pub fn summarize_by_year(
    schedule: &[AmortizationPeriod],
    frequency: RepaymentFrequency,
) -> Vec<AmortizationYear> {
    let per_year = frequency.periods_per_year() as usize;

    schedule
        .chunks(per_year)
        .enumerate()
        .map(|(i, chunk)| AmortizationYear {
            year: i as u32 + 1,
            payments: round_to_cents(chunk.iter().map(|p| p.payment).sum()),
            interest: round_to_cents(chunk.iter().map(|p| p.interest).sum()),
            principal: round_to_cents(chunk.iter().map(|p| p.principal).sum()),
            closing_balance: chunk.last().map(|p| p.balance).unwrap_or(0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_mortgage_payment() {
        // $300k over 30 years at 6% p.a. monthly
        let payment =
            calculate_loan_payment(300_000.0, 6.0, 30.0, RepaymentFrequency::Monthly).unwrap();
        assert_abs_diff_eq!(payment, 1798.65, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_payment() {
        let payment =
            calculate_loan_payment(120_000.0, 0.0, 10.0, RepaymentFrequency::Monthly).unwrap();
        assert_abs_diff_eq!(payment, 1000.0, epsilon = 1e-9);

        let weekly =
            calculate_loan_payment(52_000.0, 0.0, 1.0, RepaymentFrequency::Weekly).unwrap();
        assert_abs_diff_eq!(weekly, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_term_bounds() {
        let weekly = RepaymentFrequency::Weekly;
        assert!(calculate_loan_payment(100_000.0, 6.0, 1e9, weekly).is_err());
        assert!(calculate_max_borrowing_capacity_for(1_000.0, 6.0, 1e9, weekly).is_err());
        assert!(calculate_remaining_balance(100_000.0, 6.0, 1e9, weekly, 10).is_err());

        let longest = calculate_loan_payment(100_000.0, 6.0, MAX_TERM_YEARS, weekly).unwrap();
        assert!(longest > 0.0);
        assert!(longest < calculate_loan_payment(100_000.0, 6.0, 30.0, weekly).unwrap());
    }

    #[test]
    fn test_more_frequent_payments_are_smaller() {
        let monthly =
            calculate_loan_payment(500_000.0, 6.0, 25.0, RepaymentFrequency::Monthly).unwrap();
        let fortnightly =
            calculate_loan_payment(500_000.0, 6.0, 25.0, RepaymentFrequency::Fortnightly).unwrap();
        let weekly =
            calculate_loan_payment(500_000.0, 6.0, 25.0, RepaymentFrequency::Weekly).unwrap();

        assert!(fortnightly < monthly);
        assert!(weekly < fortnightly);
        // Annual outlay is close but not identical
        assert!((weekly * 52.0 - monthly * 12.0).abs() < monthly);
    }

    #[test]
    fn test_borrowing_capacity_inverts_payment() {
        let payment =
            calculate_loan_payment(640_000.0, 6.5, 30.0, RepaymentFrequency::Monthly).unwrap();
        let capacity = calculate_max_borrowing_capacity(payment, 6.5, 30.0).unwrap();
        assert_abs_diff_eq!(capacity, 640_000.0, epsilon = 1e-6);

        let zero_rate = calculate_max_borrowing_capacity(1_000.0, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(zero_rate, 120_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_remaining_balance() {
        let f = RepaymentFrequency::Monthly;
        assert_abs_diff_eq!(
            calculate_remaining_balance(300_000.0, 6.0, 30.0, f, 0).unwrap(),
            300_000.0,
            epsilon = 1e-6
        );
        assert_eq!(calculate_remaining_balance(300_000.0, 6.0, 30.0, f, 360).unwrap(), 0.0);
        assert_eq!(calculate_remaining_balance(300_000.0, 6.0, 30.0, f, 400).unwrap(), 0.0);

        let after_ten_years = calculate_remaining_balance(300_000.0, 6.0, 30.0, f, 120).unwrap();
        // Early repayments are mostly interest
        assert!(after_ten_years > 240_000.0 && after_ten_years < 260_000.0);

        let zero_rate = calculate_remaining_balance(120_000.0, 0.0, 10.0, f, 60).unwrap();
        assert_abs_diff_eq!(zero_rate, 60_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_schedule_matches_closed_form() {
        let f = RepaymentFrequency::Monthly;
        let schedule = amortization_schedule(300_000.0, 6.0, 30.0, f).unwrap();

        assert_eq!(schedule.len(), 360);
        assert_eq!(schedule.last().unwrap().balance, 0.0);

        let closed_form = calculate_remaining_balance(300_000.0, 6.0, 30.0, f, 120).unwrap();
        assert_abs_diff_eq!(schedule[119].balance, closed_form, epsilon = 0.01);

        let principal_repaid: f64 = schedule.iter().map(|p| p.principal).sum();
        assert_abs_diff_eq!(principal_repaid, 300_000.0, epsilon = 1.0);

        let years = summarize_by_year(&schedule, f);
        assert_eq!(years.len(), 30);
        assert_eq!(years[29].closing_balance, 0.0);
        assert!(years[0].interest > years[29].interest);
    }

    #[test]
    fn test_invalid_inputs() {
        let f = RepaymentFrequency::Monthly;
        assert!(calculate_loan_payment(-1.0, 6.0, 30.0, f).is_err());
        assert!(calculate_loan_payment(1_000.0, 6.0, 0.0, f).is_err());
        assert!(calculate_loan_payment(1_000.0, 6.0, -5.0, f).is_err());
        assert!(calculate_loan_payment(1_000.0, -1.0, 5.0, f).is_err());
        assert!(calculate_max_borrowing_capacity(-100.0, 6.0, 30.0).is_err());
        assert!(calculate_max_borrowing_capacity(100.0, 6.0, 0.0).is_err());
    }

    #[test]
    fn test_frequency_codes() {
        let f: RepaymentFrequency = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(f, RepaymentFrequency::Fortnightly);
        let w: RepaymentFrequency = serde_json::from_str("\"Weekly\"").unwrap();
        assert_eq!(w, RepaymentFrequency::Weekly);
        assert_eq!(serde_json::to_string(&RepaymentFrequency::Monthly).unwrap(), "\"M\"");
        assert_eq!(RepaymentFrequency::parse_label("m"), Some(RepaymentFrequency::Monthly));
    }
}
