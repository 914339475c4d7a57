//! Progressive income-tax bracket tables

use serde::{Deserialize, Serialize};

use crate::error::{PlanningError, PlanningResult};

/// A contiguous income range taxed at one marginal rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    /// Lower bound (exclusive, except for the first bracket)
    pub min: f64,
    /// Upper bound (inclusive); `None` for the open-ended top bracket
    pub max: Option<f64>,
    pub rate: f64,
    /// Tax payable on income of exactly `min`
    pub base_tax_at_min: f64,
}

impl TaxBracket {
    pub fn contains(&self, income: f64) -> bool {
        income >= self.min && self.max.map_or(true, |max| income <= max)
    }

    /// Tax on `income` using this bracket's formula
    pub fn tax_on(&self, income: f64) -> f64 {
        self.base_tax_at_min + (income - self.min) * self.rate
    }
}

/// Australian resident rates, 2024-25 income year
pub static RESIDENT_TAX_BRACKETS: &[TaxBracket] = &[
    TaxBracket { min: 0.0, max: Some(18_200.0), rate: 0.0, base_tax_at_min: 0.0 },
    TaxBracket { min: 18_200.0, max: Some(45_000.0), rate: 0.16, base_tax_at_min: 0.0 },
    TaxBracket { min: 45_000.0, max: Some(135_000.0), rate: 0.30, base_tax_at_min: 4_288.0 },
    TaxBracket { min: 135_000.0, max: Some(190_000.0), rate: 0.37, base_tax_at_min: 31_288.0 },
    TaxBracket { min: 190_000.0, max: None, rate: 0.45, base_tax_at_min: 51_638.0 },
];

/// Tax-free threshold of the resident table
pub const TAX_FREE_THRESHOLD: f64 = 18_200.0;

/// Bracket containing `income`. A boundary income belongs to the lower bracket.
///
/// Tables are checked by [`check_bracket_table`], so the open-ended bracket
/// always matches as a last resort.
pub fn find_bracket(table: &[TaxBracket], income: f64) -> &TaxBracket {
    table
        .iter()
        .find(|b| b.max.map_or(true, |max| income <= max))
        .unwrap_or(&table[table.len() - 1])
}

/// Brackets must start at zero, be contiguous and ascending, chain their base
/// tax continuously, and end with exactly one open-ended bracket.
pub fn check_bracket_table(table: &[TaxBracket]) -> PlanningResult<()> {
    let first = table
        .first()
        .ok_or_else(|| PlanningError::invalid("tax bracket table is empty"))?;
    if first.min != 0.0 {
        return Err(PlanningError::invalid("first tax bracket must start at 0"));
    }

    for (i, bracket) in table.iter().enumerate() {
        if !(0.0..=1.0).contains(&bracket.rate) {
            return Err(PlanningError::invalid(format!(
                "bracket {i} has rate {} outside [0, 1]",
                bracket.rate
            )));
        }
        let is_last = i + 1 == table.len();
        match (bracket.max, is_last) {
            (None, true) => {}
            (None, false) => {
                return Err(PlanningError::invalid(format!(
                    "bracket {i} is open-ended but is not the highest bracket"
                )))
            }
            (Some(_), true) => {
                return Err(PlanningError::invalid("highest tax bracket must be open-ended"))
            }
            (Some(max), false) => {
                let next = &table[i + 1];
                if max <= bracket.min {
                    return Err(PlanningError::invalid(format!("bracket {i} is empty")));
                }
                if next.min != max {
                    return Err(PlanningError::invalid(format!(
                        "bracket {} does not start where bracket {i} ends",
                        i + 1
                    )));
                }
                if (bracket.tax_on(max) - next.base_tax_at_min).abs() > 0.01 {
                    return Err(PlanningError::invalid(format!(
                        "base tax of bracket {} is discontinuous",
                        i + 1
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resident_table_is_well_formed() {
        check_bracket_table(RESIDENT_TAX_BRACKETS).unwrap();
    }

    #[test]
    fn test_boundary_belongs_to_lower_bracket() {
        let b = find_bracket(RESIDENT_TAX_BRACKETS, 45_000.0);
        assert_eq!(b.rate, 0.16);

        let b = find_bracket(RESIDENT_TAX_BRACKETS, 45_000.01);
        assert_eq!(b.rate, 0.30);

        let b = find_bracket(RESIDENT_TAX_BRACKETS, 18_200.0);
        assert_eq!(b.rate, 0.0);
    }

    #[test]
    fn test_top_bracket_matches_everything_above() {
        let b = find_bracket(RESIDENT_TAX_BRACKETS, 10_000_000.0);
        assert_eq!(b.rate, 0.45);
        assert!(b.max.is_none());
        assert!(b.contains(10_000_000.0));
    }

    #[test]
    fn test_malformed_tables_rejected() {
        let gap = [
            TaxBracket { min: 0.0, max: Some(10_000.0), rate: 0.0, base_tax_at_min: 0.0 },
            TaxBracket { min: 12_000.0, max: None, rate: 0.2, base_tax_at_min: 0.0 },
        ];
        assert!(check_bracket_table(&gap).is_err());

        let no_open_end = [TaxBracket { min: 0.0, max: Some(10_000.0), rate: 0.1, base_tax_at_min: 0.0 }];
        assert!(check_bracket_table(&no_open_end).is_err());

        let jump = [
            TaxBracket { min: 0.0, max: Some(10_000.0), rate: 0.1, base_tax_at_min: 0.0 },
            TaxBracket { min: 10_000.0, max: None, rate: 0.2, base_tax_at_min: 5_000.0 },
        ];
        assert!(check_bracket_table(&jump).is_err());

        assert!(check_bracket_table(&[]).is_err());
    }
}
