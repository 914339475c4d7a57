//! Year-by-year retirement projection to (and optionally past) retirement

mod state;
mod engine;
mod cashflows;

pub use state::{AssetBalances, LoanState, LoanYear, Phase, PropertyState, ProjectionState};
pub use engine::{
    calculate_financial_projections, ProjectionConfig, ProjectionEngine,
    DEFAULT_CONTRIBUTIONS_TAX_RATE, DEFAULT_SUPER_GUARANTEE_RATE,
};
pub use cashflows::{ProjectionResult, ProjectionStatus, ProjectionSummary, YearFlows, YearSnapshot};
