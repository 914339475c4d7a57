//! CSV-based assumption loader
//!
//! Loads growth assumptions from `growth_assumptions.csv` in data/assumptions/.
//! The file holds `key,value` rows; keys not present keep their defaults.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::GrowthAssumptions;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// File name inside the assumptions directory
pub const GROWTH_ASSUMPTIONS_FILE: &str = "growth_assumptions.csv";

#[derive(Debug, Error)]
pub enum AssumptionsError {
    #[error("failed to read assumptions: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed assumptions CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown assumption key '{0}'")]
    UnknownKey(String),

    #[error("assumption '{key}' has non-numeric value '{value}'")]
    Parse { key: String, value: String },

    #[error("invalid assumptions: {0}")]
    Invalid(#[from] crate::error::ValidationError),
}

/// Load growth assumptions from `<path>/growth_assumptions.csv`
pub fn load_growth_assumptions(path: &Path) -> Result<GrowthAssumptions, AssumptionsError> {
    let file = File::open(path.join(GROWTH_ASSUMPTIONS_FILE))?;
    load_growth_assumptions_from_reader(file)
}

/// Load growth assumptions from any reader producing `key,value` CSV
pub fn load_growth_assumptions_from_reader<R: Read>(
    reader: R,
) -> Result<GrowthAssumptions, AssumptionsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut assumptions = GrowthAssumptions::default();

    for result in reader.records() {
        let record = result?;
        let key = record.get(0).unwrap_or_default();
        let raw = record.get(1).unwrap_or_default();
        let value: f64 = raw.parse().map_err(|_| AssumptionsError::Parse {
            key: key.to_string(),
            value: raw.to_string(),
        })?;

        let slot = match normalize_key(key).as_str() {
            "inflationrate" | "inflation" => &mut assumptions.inflation_rate,
            "salarygrowthrate" | "salarygrowth" => &mut assumptions.salary_growth_rate,
            "superreturn" => &mut assumptions.super_return,
            "sharereturn" => &mut assumptions.share_return,
            "propertygrowthrate" | "propertygrowth" => &mut assumptions.property_growth_rate,
            "rentgrowthrate" | "rentgrowth" => &mut assumptions.rent_growth_rate,
            "withdrawalrate" => &mut assumptions.withdrawal_rate,
            "savingsrate" => &mut assumptions.savings_rate,
            _ => return Err(AssumptionsError::UnknownKey(key.to_string())),
        };
        *slot = value;
    }

    assumptions.validate()?;
    log::debug!("loaded growth assumptions: {:?}", assumptions);

    Ok(assumptions)
}

/// Accept camelCase, snake_case and spaced spellings of the same key
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_overrides_defaults() {
        let data = "key,value\nsuper_return,6.5\nInflation Rate,3\nwithdrawalRate,5\n";
        let a = load_growth_assumptions_from_reader(data.as_bytes()).unwrap();

        assert_eq!(a.super_return, 6.5);
        assert_eq!(a.inflation_rate, 3.0);
        assert_eq!(a.withdrawal_rate, 5.0);
        // Untouched keys keep defaults
        assert_eq!(a.share_return, GrowthAssumptions::default().share_return);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let data = "key,value\nlottery_odds,0.1\n";
        let err = load_growth_assumptions_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, AssumptionsError::UnknownKey(k) if k == "lottery_odds"));
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let data = "key,value\nsuper_return,high\n";
        let err = load_growth_assumptions_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, AssumptionsError::Parse { .. }));
    }

    #[test]
    fn test_default_file_loads() {
        let a = GrowthAssumptions::from_csv_path(Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/assumptions"
        )))
        .unwrap();
        assert!(a.validate().is_ok());
    }
}
