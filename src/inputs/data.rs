//! Canonical input schema consumed by every calculator

use serde::{Deserialize, Serialize};

use crate::assumptions::GrowthAssumptions;
use crate::error::{check_amount, ValidationError};
use crate::loans::{RepaymentFrequency, MAX_TERM_YEARS};
use crate::rounding::pct_to_rate;

/// Asset class, which decides the growth rate applied in projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Super,
    /// Owner-occupied home. Investment properties are modelled separately.
    Property,
    Shares,
    Savings,
    Other,
}

impl AssetType {
    pub const ALL: [AssetType; 5] = [
        AssetType::Super,
        AssetType::Property,
        AssetType::Shares,
        AssetType::Savings,
        AssetType::Other,
    ];

    /// Parse the loose labels advisors type into client records
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "super" | "superannuation" | "smsf" => Some(AssetType::Super),
            "property" | "home" | "residence" | "real estate" => Some(AssetType::Property),
            "shares" | "equities" | "stocks" | "etf" | "managed funds" => Some(AssetType::Shares),
            "savings" | "cash" | "bank" | "term deposit" | "offset" => Some(AssetType::Savings),
            "other" => Some(AssetType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

impl Asset {
    pub fn new(name: impl Into<String>, value: f64, asset_type: AssetType) -> Self {
        Self {
            name: name.into(),
            value,
            asset_type,
        }
    }
}

/// Kind of debt, used to separate owner-occupied equity from investable wealth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiabilityType {
    HomeLoan,
    InvestmentLoan,
    PersonalLoan,
    CreditCard,
    Other,
}

impl LiabilityType {
    pub fn parse_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label.contains("home") || label.contains("mortgage") || label.contains("owner") {
            LiabilityType::HomeLoan
        } else if label.contains("invest") {
            LiabilityType::InvestmentLoan
        } else if label.contains("credit") || label.contains("card") {
            LiabilityType::CreditCard
        } else if label.contains("personal") || label.contains("car") || label.contains("vehicle") {
            LiabilityType::PersonalLoan
        } else {
            LiabilityType::Other
        }
    }
}

fn check_term_length(name: &str, term: f64) -> Result<(), ValidationError> {
    if term > MAX_TERM_YEARS {
        return Err(ValidationError::TermTooLong {
            name: name.to_string(),
            term,
            max: MAX_TERM_YEARS,
        });
    }
    Ok(())
}

/// An amortizing debt held by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liability {
    pub lender: String,
    /// Free-text product label, e.g. "Variable" or "Fixed 3yr"
    pub loan_type: String,
    pub liability_type: LiabilityType,
    pub balance_owing: f64,
    /// Contracted repayment per period, informational only
    pub repayment_amount: f64,
    pub frequency: RepaymentFrequency,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    /// Original term in years
    pub loan_term: f64,
    /// Remaining term in years
    pub term_remaining: f64,
}

impl Liability {
    fn validate(&self) -> Result<(), ValidationError> {
        let prefix = format!("liability '{}'", self.lender);
        check_amount(&format!("{prefix} balanceOwing"), self.balance_owing)?;
        check_amount(&format!("{prefix} repaymentAmount"), self.repayment_amount)?;
        check_amount(&format!("{prefix} interestRate"), self.interest_rate)?;
        check_amount(&format!("{prefix} loanTerm"), self.loan_term)?;
        check_amount(&format!("{prefix} termRemaining"), self.term_remaining)?;

        check_term_length(&self.lender, self.loan_term)?;
        if self.term_remaining > self.loan_term {
            return Err(ValidationError::TermExceedsLoanTerm {
                lender: self.lender.clone(),
                term_remaining: self.term_remaining,
                loan_term: self.loan_term,
            });
        }
        if self.balance_owing > 0.0 && self.term_remaining <= 0.0 {
            return Err(ValidationError::MissingTerm {
                name: self.lender.clone(),
            });
        }
        Ok(())
    }
}

/// A geared investment property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentProperty {
    pub address: String,
    pub purchase_price: f64,
    pub current_value: f64,
    pub loan_amount: f64,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    /// Loan term in years
    pub loan_term: f64,
    pub weekly_rent: f64,
    pub annual_expenses: f64,
}

impl InvestmentProperty {
    pub fn annual_rent(&self) -> f64 {
        self.weekly_rent * 52.0
    }

    /// First-year interest on the current loan balance
    pub fn annual_interest(&self) -> f64 {
        self.loan_amount * pct_to_rate(self.interest_rate)
    }

    /// Rent less expenses and interest; negative means the property is negatively geared
    pub fn annual_cash_flow(&self) -> f64 {
        self.annual_rent() - self.annual_expenses - self.annual_interest()
    }

    pub fn equity(&self) -> f64 {
        self.current_value - self.loan_amount
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let prefix = format!("property '{}'", self.address);
        check_amount(&format!("{prefix} purchasePrice"), self.purchase_price)?;
        check_amount(&format!("{prefix} currentValue"), self.current_value)?;
        check_amount(&format!("{prefix} loanAmount"), self.loan_amount)?;
        check_amount(&format!("{prefix} interestRate"), self.interest_rate)?;
        check_amount(&format!("{prefix} loanTerm"), self.loan_term)?;
        check_amount(&format!("{prefix} weeklyRent"), self.weekly_rent)?;
        check_amount(&format!("{prefix} annualExpenses"), self.annual_expenses)?;

        check_term_length(&self.address, self.loan_term)?;
        if self.loan_amount > 0.0 && self.loan_term <= 0.0 {
            return Err(ValidationError::MissingTerm {
                name: self.address.clone(),
            });
        }
        Ok(())
    }
}

/// Current-year deductions and cover, used by the tax calculation and strategy rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeductionProfile {
    /// Salary-sacrifice and personal deductible super contributions
    pub concessional_contributions: f64,
    pub charitable_donations: f64,
    pub work_related_expenses: f64,
    pub other_deductions: f64,
    pub has_private_health_insurance: bool,
}

impl DeductionProfile {
    /// Deductions that reduce assessable income
    pub fn total(&self) -> f64 {
        self.concessional_contributions
            + self.charitable_donations
            + self.work_related_expenses
            + self.other_deductions
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_amount("concessionalContributions", self.concessional_contributions)?;
        check_amount("charitableDonations", self.charitable_donations)?;
        check_amount("workRelatedExpenses", self.work_related_expenses)?;
        check_amount("otherDeductions", self.other_deductions)?;
        Ok(())
    }
}

/// Immutable snapshot of a client's position, validated once at the boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInputs {
    pub annual_income: f64,
    pub rental_income: f64,
    pub dividends: f64,
    pub franked_dividends: f64,
    pub capital_gains: f64,
    pub other_income: f64,
    pub monthly_expenses: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub liabilities: Vec<Liability>,
    #[serde(default)]
    pub investment_properties: Vec<InvestmentProperty>,
    #[serde(default)]
    pub assumptions: GrowthAssumptions,
    #[serde(default)]
    pub deductions: DeductionProfile,
}

impl FinancialInputs {
    /// Check every invariant, returning the inputs unchanged when they hold
    pub fn validate(self) -> Result<Self, ValidationError> {
        self.check()?;
        Ok(self)
    }

    /// Check every invariant without taking ownership
    pub fn check(&self) -> Result<(), ValidationError> {
        check_amount("annualIncome", self.annual_income)?;
        check_amount("rentalIncome", self.rental_income)?;
        check_amount("dividends", self.dividends)?;
        check_amount("frankedDividends", self.franked_dividends)?;
        check_amount("capitalGains", self.capital_gains)?;
        check_amount("otherIncome", self.other_income)?;
        check_amount("monthlyExpenses", self.monthly_expenses)?;

        if self.retirement_age <= self.current_age {
            return Err(ValidationError::AgeOrdering {
                current_age: self.current_age,
                retirement_age: self.retirement_age,
            });
        }

        for asset in &self.assets {
            check_amount(&format!("asset '{}' value", asset.name), asset.value)?;
        }
        for liability in &self.liabilities {
            liability.validate()?;
        }
        for property in &self.investment_properties {
            property.validate()?;
        }
        self.assumptions.validate()?;
        self.deductions.validate()?;

        Ok(())
    }

    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    /// Sum of asset values of one class
    pub fn asset_total(&self, asset_type: AssetType) -> f64 {
        self.assets
            .iter()
            .filter(|a| a.asset_type == asset_type)
            .map(|a| a.value)
            .sum()
    }

    /// All assets including investment property values
    pub fn total_assets(&self) -> f64 {
        let listed: f64 = self.assets.iter().map(|a| a.value).sum();
        let properties: f64 = self.investment_properties.iter().map(|p| p.current_value).sum();
        listed + properties
    }

    /// All debts including investment property loans
    pub fn total_liabilities(&self) -> f64 {
        let listed: f64 = self.liabilities.iter().map(|l| l.balance_owing).sum();
        let loans: f64 = self.investment_properties.iter().map(|p| p.loan_amount).sum();
        listed + loans
    }

    pub fn net_worth(&self) -> f64 {
        self.total_assets() - self.total_liabilities()
    }

    /// Listed rental income plus rent from modelled investment properties
    pub fn total_rental_income(&self) -> f64 {
        self.rental_income
            + self
                .investment_properties
                .iter()
                .map(|p| p.annual_rent())
                .sum::<f64>()
    }

    /// Cash income received this year before tax
    pub fn gross_cash_income(&self) -> f64 {
        self.annual_income
            + self.total_rental_income()
            + self.dividends
            + self.franked_dividends
            + self.capital_gains
            + self.other_income
    }
}
