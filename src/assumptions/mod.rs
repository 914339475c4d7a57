//! Growth assumptions used by the projection engine

pub mod loader;

pub use loader::{load_growth_assumptions, AssumptionsError};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ValidationError;
use crate::inputs::AssetType;
use crate::rounding::pct_to_rate;

/// Percentage-per-annum growth and withdrawal assumptions
///
/// All fields are expressed in percent (7.0 = 7% p.a.).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrowthAssumptions {
    pub inflation_rate: f64,
    pub salary_growth_rate: f64,
    pub super_return: f64,
    pub share_return: f64,
    pub property_growth_rate: f64,
    pub rent_growth_rate: f64,
    /// Share of investable net worth drawn each year in retirement
    pub withdrawal_rate: f64,
    /// Return on cash savings
    pub savings_rate: f64,
}

impl Default for GrowthAssumptions {
    fn default() -> Self {
        Self {
            inflation_rate: 2.5,
            salary_growth_rate: 3.0,
            super_return: 7.0,
            share_return: 7.0,
            property_growth_rate: 5.0,
            rent_growth_rate: 3.0,
            withdrawal_rate: 4.0,
            savings_rate: 3.0,
        }
    }
}

impl GrowthAssumptions {
    /// All-zero assumptions (no growth, no withdrawals)
    pub fn flat() -> Self {
        Self {
            inflation_rate: 0.0,
            salary_growth_rate: 0.0,
            super_return: 0.0,
            share_return: 0.0,
            property_growth_rate: 0.0,
            rent_growth_rate: 0.0,
            withdrawal_rate: 0.0,
            savings_rate: 0.0,
        }
    }

    /// Load assumptions from the default CSV location
    pub fn from_csv() -> Result<Self, AssumptionsError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from a CSV file in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, AssumptionsError> {
        load_growth_assumptions(path)
    }

    /// Annual growth rate (decimal) applied to an asset class
    pub fn growth_rate_for(&self, asset_type: AssetType) -> f64 {
        let pct = match asset_type {
            AssetType::Super => self.super_return,
            AssetType::Property => self.property_growth_rate,
            AssetType::Shares => self.share_return,
            AssetType::Savings => self.savings_rate,
            // Neutral default: keep pace with inflation
            AssetType::Other => self.inflation_rate,
        };
        pct_to_rate(pct)
    }

    pub fn inflation(&self) -> f64 {
        pct_to_rate(self.inflation_rate)
    }

    pub fn salary_growth(&self) -> f64 {
        pct_to_rate(self.salary_growth_rate)
    }

    pub fn rent_growth(&self) -> f64 {
        pct_to_rate(self.rent_growth_rate)
    }

    pub fn property_growth(&self) -> f64 {
        pct_to_rate(self.property_growth_rate)
    }

    pub fn withdrawal(&self) -> f64 {
        pct_to_rate(self.withdrawal_rate)
    }

    /// Rates may be negative (deflation, falling markets) but must be finite.
    /// A negative withdrawal rate is meaningless.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("inflationRate", self.inflation_rate),
            ("salaryGrowthRate", self.salary_growth_rate),
            ("superReturn", self.super_return),
            ("shareReturn", self.share_return),
            ("propertyGrowthRate", self.property_growth_rate),
            ("rentGrowthRate", self.rent_growth_rate),
            ("withdrawalRate", self.withdrawal_rate),
            ("savingsRate", self.savings_rate),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite {
                    field: field.to_string(),
                });
            }
        }
        if self.withdrawal_rate < 0.0 {
            return Err(ValidationError::NegativeAmount {
                field: "withdrawalRate".to_string(),
                value: self.withdrawal_rate,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_growth_rate_by_asset_type() {
        let a = GrowthAssumptions::default();

        assert_abs_diff_eq!(a.growth_rate_for(AssetType::Super), 0.07, epsilon = 1e-12);
        assert_abs_diff_eq!(a.growth_rate_for(AssetType::Property), 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(a.growth_rate_for(AssetType::Savings), 0.03, epsilon = 1e-12);
        // Other tracks inflation
        assert_abs_diff_eq!(a.growth_rate_for(AssetType::Other), 0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_negative_withdrawal() {
        let a = GrowthAssumptions {
            withdrawal_rate: -1.0,
            ..GrowthAssumptions::default()
        };
        assert!(a.validate().is_err());

        let deflation = GrowthAssumptions {
            inflation_rate: -0.5,
            ..GrowthAssumptions::default()
        };
        assert!(deflation.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let a: GrowthAssumptions = serde_json::from_str(r#"{"superReturn": 6.5}"#).unwrap();
        assert_eq!(a.super_return, 6.5);
        assert_eq!(a.inflation_rate, 2.5);
    }
}
