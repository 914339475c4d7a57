//! Mutable state carried from one projection year to the next

use crate::error::PlanningResult;
use crate::inputs::{AssetType, FinancialInputs, InvestmentProperty, Liability, LiabilityType};
use crate::loans::{calculate_loan_payment, calculate_remaining_balance, RepaymentFrequency};

/// Balance per asset class
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssetBalances {
    pub super_balance: f64,
    /// Owner-occupied home
    pub property: f64,
    pub shares: f64,
    pub savings: f64,
    pub other: f64,
}

impl AssetBalances {
    pub fn from_inputs(inputs: &FinancialInputs) -> Self {
        let mut balances = Self::default();
        for asset in &inputs.assets {
            *balances.get_mut(asset.asset_type) += asset.value;
        }
        balances
    }

    pub fn get(&self, asset_type: AssetType) -> f64 {
        match asset_type {
            AssetType::Super => self.super_balance,
            AssetType::Property => self.property,
            AssetType::Shares => self.shares,
            AssetType::Savings => self.savings,
            AssetType::Other => self.other,
        }
    }

    pub fn get_mut(&mut self, asset_type: AssetType) -> &mut f64 {
        match asset_type {
            AssetType::Super => &mut self.super_balance,
            AssetType::Property => &mut self.property,
            AssetType::Shares => &mut self.shares,
            AssetType::Savings => &mut self.savings,
            AssetType::Other => &mut self.other,
        }
    }

    pub fn total(&self) -> f64 {
        AssetType::ALL.iter().map(|&t| self.get(t)).sum()
    }

    /// Everything except the owner-occupied home
    pub fn liquid_total(&self) -> f64 {
        self.super_balance + self.shares + self.savings + self.other
    }

    /// Draw `amount` from the given classes in order, never below zero.
    /// Returns the part that could not be funded.
    pub fn draw_down(&mut self, amount: f64, order: &[AssetType]) -> f64 {
        let mut remaining = amount;
        for &asset_type in order {
            if remaining <= 0.0 {
                break;
            }
            let balance = self.get_mut(asset_type);
            let taken = remaining.min(balance.max(0.0));
            *balance -= taken;
            remaining -= taken;
        }
        remaining.max(0.0)
    }
}

/// Repayment split for one loan year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoanYear {
    pub repayment: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

/// An amortizing loan run off on its original schedule
#[derive(Debug, Clone)]
pub struct LoanState {
    pub label: String,
    pub liability_type: LiabilityType,
    principal: f64,
    annual_rate_pct: f64,
    term_years: f64,
    frequency: RepaymentFrequency,
    payment: f64,
    total_periods: u32,
    periods_paid: u32,
    pub balance: f64,
}

impl LoanState {
    pub fn new(
        label: impl Into<String>,
        liability_type: LiabilityType,
        principal: f64,
        annual_rate_pct: f64,
        term_years: f64,
        frequency: RepaymentFrequency,
    ) -> PlanningResult<Self> {
        let periods_per_year = frequency.periods_per_year() as f64;
        // A loan due within the next period is cleared in one repayment
        let term_years = if principal > 0.0 && term_years > 0.0 && term_years * periods_per_year < 0.5 {
            1.0 / periods_per_year
        } else {
            term_years
        };

        let (payment, total_periods) = if principal > 0.0 {
            let payment = calculate_loan_payment(principal, annual_rate_pct, term_years, frequency)?;
            let periods = (term_years * periods_per_year).round() as u32;
            (payment, periods)
        } else {
            (0.0, 0)
        };

        Ok(Self {
            label: label.into(),
            liability_type,
            principal,
            annual_rate_pct,
            term_years,
            frequency,
            payment,
            total_periods,
            periods_paid: 0,
            balance: principal.max(0.0),
        })
    }

    pub fn from_liability(liability: &Liability) -> PlanningResult<Self> {
        Self::new(
            liability.lender.clone(),
            liability.liability_type,
            liability.balance_owing,
            liability.interest_rate,
            liability.term_remaining,
            liability.frequency,
        )
    }

    /// Investment property loans are treated as monthly P&I over the loan term
    pub fn from_property(property: &InvestmentProperty) -> PlanningResult<Self> {
        Self::new(
            property.address.clone(),
            LiabilityType::InvestmentLoan,
            property.loan_amount,
            property.interest_rate,
            property.loan_term,
            RepaymentFrequency::Monthly,
        )
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0 || self.periods_paid >= self.total_periods
    }

    /// Make one year of scheduled repayments
    pub fn advance_year(&mut self) -> PlanningResult<LoanYear> {
        if self.is_paid_off() {
            self.balance = 0.0;
            return Ok(LoanYear::default());
        }

        let opening = self.balance;
        let periods = self
            .frequency
            .periods_per_year()
            .min(self.total_periods - self.periods_paid);
        self.periods_paid += periods;
        self.balance = calculate_remaining_balance(
            self.principal,
            self.annual_rate_pct,
            self.term_years,
            self.frequency,
            self.periods_paid,
        )?;

        let repayment = self.payment * periods as f64;
        let interest = (repayment - (opening - self.balance)).max(0.0);

        Ok(LoanYear {
            repayment,
            interest,
            closing_balance: self.balance,
        })
    }
}

/// An investment property with its rent, running costs and loan
#[derive(Debug, Clone)]
pub struct PropertyState {
    pub value: f64,
    pub annual_rent: f64,
    pub annual_expenses: f64,
    pub loan: LoanState,
}

impl PropertyState {
    pub fn from_property(property: &InvestmentProperty) -> PlanningResult<Self> {
        Ok(Self {
            value: property.current_value,
            annual_rent: property.annual_rent(),
            annual_expenses: property.annual_expenses,
            loan: LoanState::from_property(property)?,
        })
    }
}

/// Whether the client is still working or drawing on savings
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Accumulation,
    Drawdown,
}

/// Full-precision state of the client's finances at the end of a year
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Years elapsed since the start of the projection
    pub year: u32,
    pub age: u32,
    pub phase: Phase,
    pub balances: AssetBalances,
    pub salary: f64,
    pub other_income: f64,
    /// Rental income not tied to a modelled property
    pub rental_income: f64,
    pub dividends: f64,
    pub franked_dividends: f64,
    pub living_expenses: f64,
    pub loans: Vec<LoanState>,
    pub properties: Vec<PropertyState>,
}

impl ProjectionState {
    /// Opening position at the client's current age
    pub fn from_inputs(inputs: &FinancialInputs) -> PlanningResult<Self> {
        let loans = inputs
            .liabilities
            .iter()
            .map(LoanState::from_liability)
            .collect::<PlanningResult<Vec<_>>>()?;
        let properties = inputs
            .investment_properties
            .iter()
            .map(PropertyState::from_property)
            .collect::<PlanningResult<Vec<_>>>()?;

        Ok(Self {
            year: 0,
            age: inputs.current_age,
            phase: Phase::Accumulation,
            balances: AssetBalances::from_inputs(inputs),
            salary: inputs.annual_income,
            other_income: inputs.other_income,
            rental_income: inputs.rental_income,
            dividends: inputs.dividends,
            franked_dividends: inputs.franked_dividends,
            living_expenses: inputs.monthly_expenses * 12.0,
            loans,
            properties,
        })
    }

    /// Advance to the next year
    pub fn advance_year(&mut self) {
        self.year += 1;
        self.age += 1;
    }

    pub fn property_value(&self) -> f64 {
        self.properties.iter().map(|p| p.value).sum()
    }

    pub fn liability_balance(&self) -> f64 {
        let personal: f64 = self.loans.iter().map(|l| l.balance).sum();
        let property: f64 = self.properties.iter().map(|p| p.loan.balance).sum();
        personal + property
    }

    pub fn net_worth(&self) -> f64 {
        self.balances.total() + self.property_value() - self.liability_balance()
    }

    /// Home value less loans secured against it
    pub fn owner_occupied_equity(&self) -> f64 {
        let home_loans: f64 = self
            .loans
            .iter()
            .filter(|l| l.liability_type == LiabilityType::HomeLoan)
            .map(|l| l.balance)
            .sum();
        self.balances.property - home_loans
    }

    /// Net worth that can fund retirement income, floored at zero
    pub fn investable_net_worth(&self) -> f64 {
        (self.net_worth() - self.owner_occupied_equity()).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::sample_inputs;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_balances_from_inputs() {
        let balances = AssetBalances::from_inputs(&sample_inputs());
        assert_eq!(balances.super_balance, 250_000.0);
        assert_eq!(balances.property, 900_000.0);
        assert_eq!(balances.total(), 1_250_000.0);
        assert_eq!(balances.liquid_total(), 350_000.0);
    }

    #[test]
    fn test_draw_down_order_and_floor() {
        let mut balances = AssetBalances {
            savings: 1_000.0,
            shares: 500.0,
            ..Default::default()
        };
        let order = [AssetType::Savings, AssetType::Shares, AssetType::Other];

        let unfunded = balances.draw_down(1_200.0, &order);
        assert_eq!(unfunded, 0.0);
        assert_eq!(balances.savings, 0.0);
        assert_eq!(balances.shares, 300.0);

        let unfunded = balances.draw_down(1_000.0, &order);
        assert_eq!(unfunded, 700.0);
        assert_eq!(balances.shares, 0.0);
    }

    #[test]
    fn test_loan_runs_off_on_schedule() {
        let mut loan = LoanState::new(
            "Car",
            LiabilityType::PersonalLoan,
            12_000.0,
            0.0,
            2.0,
            RepaymentFrequency::Monthly,
        )
        .unwrap();

        let first = loan.advance_year().unwrap();
        assert_abs_diff_eq!(first.repayment, 6_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.closing_balance, 6_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(first.interest, 0.0, epsilon = 1e-6);

        loan.advance_year().unwrap();
        assert!(loan.is_paid_off());
        assert_eq!(loan.advance_year().unwrap(), LoanYear::default());
    }

    #[test]
    fn test_loan_interest_split() {
        let mut loan = LoanState::new(
            "Bank",
            LiabilityType::HomeLoan,
            300_000.0,
            6.0,
            30.0,
            RepaymentFrequency::Monthly,
        )
        .unwrap();
        let year = loan.advance_year().unwrap();

        // About $17.9k interest in the first year of a 6% 30-year loan
        assert!(year.interest > 17_000.0 && year.interest < 18_000.0);
        assert_abs_diff_eq!(
            year.repayment - year.interest,
            300_000.0 - year.closing_balance,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_zero_balance_loan_is_inert() {
        let mut loan = LoanState::new(
            "Closed",
            LiabilityType::CreditCard,
            0.0,
            20.0,
            0.0,
            RepaymentFrequency::Monthly,
        )
        .unwrap();
        assert!(loan.is_paid_off());
        assert_eq!(loan.advance_year().unwrap().repayment, 0.0);
    }

    #[test]
    fn test_loan_due_within_a_period_clears_in_one_repayment() {
        // Nine days left on a card balance
        let mut loan = LoanState::new(
            "Card",
            LiabilityType::CreditCard,
            500.0,
            20.0,
            0.025,
            RepaymentFrequency::Monthly,
        )
        .unwrap();
        assert!(!loan.is_paid_off());

        let year = loan.advance_year().unwrap();
        assert_abs_diff_eq!(year.repayment, 500.0 * (1.0 + 0.20 / 12.0), epsilon = 1e-6);
        assert_abs_diff_eq!(year.interest, 500.0 * 0.20 / 12.0, epsilon = 1e-6);
        assert_abs_diff_eq!(year.closing_balance, 0.0, epsilon = 1e-6);
        assert!(loan.is_paid_off());
    }

    #[test]
    fn test_investable_excludes_home_equity() {
        let state = ProjectionState::from_inputs(&sample_inputs()).unwrap();

        // Home 900k less 400k home loan
        assert_abs_diff_eq!(state.owner_occupied_equity(), 500_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.net_worth(), 1_050_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.investable_net_worth(), 550_000.0, epsilon = 1e-9);
    }
}
