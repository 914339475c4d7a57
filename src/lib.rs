//! Retirement Planner - calculation engine for Australian household financial plans
//!
//! This library provides:
//! - Resident income tax, Medicare levy and comprehensive current-year tax
//! - Loan repayments, borrowing capacity and amortization schedules
//! - Year-by-year retirement projections with negative gearing and loan run-off
//! - Investment property serviceability from retirement surplus
//! - Ranked tax optimisation strategies

pub mod rounding;
pub mod error;
pub mod assumptions;
pub mod inputs;
pub mod tax;
pub mod loans;
pub mod projection;
pub mod property;
pub mod strategies;
pub mod summary;

// Re-export commonly used types
pub use error::{PlanningError, PlanningResult, ValidationError};
pub use assumptions::GrowthAssumptions;
pub use inputs::{convert_client_to_inputs, ClientRecord, FinancialInputs};
pub use tax::{calculate_total_tax, TaxCalculationResult, TaxCalculator};
pub use projection::{calculate_financial_projections, ProjectionEngine, ProjectionResult};
pub use property::{calculate_property_serviceability, ServiceabilityResult};
pub use strategies::{generate_optimization_strategies, OptimizationStrategy};
pub use summary::{compute_summary_from_client, Planner, SummaryView};
