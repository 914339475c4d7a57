//! Raw client records and their conversion into validated `FinancialInputs`
//!
//! Client records arrive from the dashboard with loosely typed, often missing
//! fields. They are validated here once; the calculators only ever see
//! `FinancialInputs`.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::data::{
    Asset, AssetType, DeductionProfile, FinancialInputs, InvestmentProperty, Liability,
    LiabilityType,
};
use crate::assumptions::GrowthAssumptions;
use crate::error::ValidationError;
use crate::loans::RepaymentFrequency;

/// Retirement age used when a record does not specify one (Age Pension age)
pub const DEFAULT_RETIREMENT_AGE: u32 = 67;

/// A client as stored by the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientRecord {
    pub id: Option<String>,
    pub name: Option<String>,

    /// Explicit age; takes precedence over date of birth
    pub current_age: Option<u32>,
    pub date_of_birth: Option<NaiveDate>,
    /// Date the age is measured at when derived from date of birth
    pub valuation_date: Option<NaiveDate>,
    pub retirement_age: Option<u32>,

    pub annual_income: Option<f64>,
    pub rental_income: Option<f64>,
    pub dividends: Option<f64>,
    pub franked_dividends: Option<f64>,
    pub capital_gains: Option<f64>,
    pub other_income: Option<f64>,
    pub monthly_expenses: Option<f64>,

    pub assets: Vec<ClientAsset>,
    pub liabilities: Vec<ClientLiability>,
    pub investment_properties: Vec<InvestmentProperty>,

    pub concessional_contributions: Option<f64>,
    pub charitable_donations: Option<f64>,
    pub work_related_expenses: Option<f64>,
    pub other_deductions: Option<f64>,
    pub private_health_insurance: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientAsset {
    pub name: Option<String>,
    pub value: Option<f64>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientLiability {
    pub lender: Option<String>,
    pub loan_type: Option<String>,
    pub liability_type: Option<String>,
    pub balance_owing: Option<f64>,
    pub repayment_amount: Option<f64>,
    pub frequency: Option<String>,
    pub interest_rate: Option<f64>,
    pub loan_term: Option<f64>,
    pub term_remaining: Option<f64>,
}

impl ClientRecord {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("unnamed client")
    }

    /// Age from the explicit field, else from date of birth at the valuation date
    pub fn resolve_current_age(&self) -> Result<u32, ValidationError> {
        if let Some(age) = self.current_age {
            return Ok(age);
        }
        match (self.date_of_birth, self.valuation_date) {
            (Some(dob), Some(as_of)) => {
                as_of.years_since(dob).ok_or_else(|| ValidationError::InvalidDate {
                    field: "dateOfBirth".to_string(),
                    reason: format!("{dob} is after the valuation date {as_of}"),
                })
            }
            (Some(_), None) => Err(ValidationError::MissingField("valuationDate".to_string())),
            _ => Err(ValidationError::MissingField("currentAge".to_string())),
        }
    }
}

fn amount(field: &str, value: Option<f64>) -> f64 {
    match value {
        Some(v) => v,
        None => {
            debug!("{} missing, treating as 0", field);
            0.0
        }
    }
}

fn convert_asset(index: usize, asset: &ClientAsset) -> Asset {
    let name = asset
        .name
        .clone()
        .unwrap_or_else(|| format!("Asset {}", index + 1));
    let asset_type = match asset.asset_type.as_deref() {
        Some(label) => AssetType::parse_label(label).unwrap_or_else(|| {
            warn!("asset '{}' has unrecognised type '{}', using Other", name, label);
            AssetType::Other
        }),
        None => {
            warn!("asset '{}' has no type, using Other", name);
            AssetType::Other
        }
    };
    let value = amount(&format!("asset '{name}' value"), asset.value);

    Asset {
        name,
        value,
        asset_type,
    }
}

fn convert_liability(index: usize, liability: &ClientLiability) -> Liability {
    let lender = liability
        .lender
        .clone()
        .unwrap_or_else(|| format!("Liability {}", index + 1));
    let frequency = match liability.frequency.as_deref() {
        Some(label) => RepaymentFrequency::parse_label(label).unwrap_or_else(|| {
            warn!("liability '{}' has unrecognised frequency '{}', using monthly", lender, label);
            RepaymentFrequency::Monthly
        }),
        None => RepaymentFrequency::Monthly,
    };
    let liability_type = liability
        .liability_type
        .as_deref()
        .or(liability.loan_type.as_deref())
        .map(LiabilityType::parse_label)
        .unwrap_or(LiabilityType::Other);
    let loan_term = amount("loanTerm", liability.loan_term);
    // Missing remaining term means a fresh loan
    let term_remaining = liability.term_remaining.unwrap_or(loan_term);

    Liability {
        loan_type: liability.loan_type.clone().unwrap_or_default(),
        liability_type,
        balance_owing: amount("balanceOwing", liability.balance_owing),
        repayment_amount: amount("repaymentAmount", liability.repayment_amount),
        frequency,
        interest_rate: amount("interestRate", liability.interest_rate),
        loan_term,
        term_remaining,
        lender,
    }
}

/// Normalize a client record into validated engine inputs
pub fn convert_client_to_inputs(
    client: &ClientRecord,
    assumptions: &GrowthAssumptions,
) -> Result<FinancialInputs, ValidationError> {
    let current_age = client.resolve_current_age()?;
    let retirement_age = client.retirement_age.unwrap_or_else(|| {
        warn!(
            "{} has no retirement age, assuming {}",
            client.display_name(),
            DEFAULT_RETIREMENT_AGE
        );
        DEFAULT_RETIREMENT_AGE
    });

    let inputs = FinancialInputs {
        annual_income: amount("annualIncome", client.annual_income),
        rental_income: amount("rentalIncome", client.rental_income),
        dividends: amount("dividends", client.dividends),
        franked_dividends: amount("frankedDividends", client.franked_dividends),
        capital_gains: amount("capitalGains", client.capital_gains),
        other_income: amount("otherIncome", client.other_income),
        monthly_expenses: amount("monthlyExpenses", client.monthly_expenses),
        current_age,
        retirement_age,
        assets: client
            .assets
            .iter()
            .enumerate()
            .map(|(i, a)| convert_asset(i, a))
            .collect(),
        liabilities: client
            .liabilities
            .iter()
            .enumerate()
            .map(|(i, l)| convert_liability(i, l))
            .collect(),
        investment_properties: client.investment_properties.clone(),
        assumptions: *assumptions,
        deductions: DeductionProfile {
            concessional_contributions: amount(
                "concessionalContributions",
                client.concessional_contributions,
            ),
            charitable_donations: amount("charitableDonations", client.charitable_donations),
            work_related_expenses: amount("workRelatedExpenses", client.work_related_expenses),
            other_deductions: amount("otherDeductions", client.other_deductions),
            has_private_health_insurance: client.private_health_insurance.unwrap_or(false),
        },
    };

    inputs.validate()
}
