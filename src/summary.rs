//! Client summary: every calculator run once against a single client
//!
//! A [`Planner`] holds assumptions and configuration loaded once, then
//! produces summaries for many clients without re-reading CSV files.

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::assumptions::{AssumptionsError, GrowthAssumptions};
use crate::error::PlanningResult;
use crate::inputs::{convert_client_to_inputs, ClientRecord};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use crate::property::{
    calculate_property_serviceability, RetirementMetrics, ServiceabilityParams, ServiceabilityResult,
};
use crate::rounding::round_to_cents;
use crate::strategies::{generate_optimization_strategies, OptimizationStrategy, StrategyContext};
use crate::tax::{TaxCalculationResult, TaxCalculator};

/// Where the projection in a summary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionSource {
    /// Previously saved with the client and returned as-is
    Stored,
    Computed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub client_name: String,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub current_net_worth: f64,
    pub tax: TaxCalculationResult,
    pub projection: ProjectionResult,
    pub projection_source: ProjectionSource,
    pub serviceability: ServiceabilityResult,
    pub strategies: Vec<OptimizationStrategy>,
    pub total_potential_saving: f64,
}

/// Pre-loaded planner for summarising many clients
#[derive(Debug, Clone, Default)]
pub struct Planner {
    assumptions: GrowthAssumptions,
    projection: ProjectionConfig,
    serviceability: ServiceabilityParams,
    tax: TaxCalculator,
}

impl Planner {
    /// Planner with default in-memory assumptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Load assumptions from the bundled CSV
    pub fn from_csv() -> Result<Self, AssumptionsError> {
        Ok(Self::with_assumptions(GrowthAssumptions::from_csv()?))
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, AssumptionsError> {
        Ok(Self::with_assumptions(GrowthAssumptions::from_csv_path(path)?))
    }

    pub fn with_assumptions(assumptions: GrowthAssumptions) -> Self {
        Self {
            assumptions,
            ..Self::default()
        }
    }

    pub fn with_projection_config(mut self, config: ProjectionConfig) -> Self {
        self.projection = config;
        self
    }

    pub fn with_serviceability_params(mut self, params: ServiceabilityParams) -> Self {
        self.serviceability = params;
        self
    }

    pub fn assumptions(&self) -> &GrowthAssumptions {
        &self.assumptions
    }

    /// Build the summary for one client
    ///
    /// A stored projection is used verbatim; nothing is recomputed for it.
    pub fn summarize(
        &self,
        client: &ClientRecord,
        stored: Option<&ProjectionResult>,
    ) -> PlanningResult<SummaryView> {
        let inputs = convert_client_to_inputs(client, &self.assumptions)?;

        let (projection, projection_source) = match stored {
            Some(projection) => (projection.clone(), ProjectionSource::Stored),
            None => {
                let engine = ProjectionEngine::with_tax_calculator(self.tax, self.projection.clone());
                (engine.project(&inputs)?, ProjectionSource::Computed)
            }
        };
        debug!(
            "{}: {:?} projection, status {:?}",
            client.display_name(),
            projection_source,
            projection.status
        );

        let tax = self.tax.tax_for_inputs(&inputs)?;
        let metrics = RetirementMetrics::from_projection(&projection, inputs.annual_income);
        let serviceability = calculate_property_serviceability(&metrics, &self.serviceability)?;
        let strategies =
            generate_optimization_strategies(&StrategyContext::from_inputs(&inputs), &tax);
        let total_potential_saving = round_to_cents(strategies.iter().map(|s| s.potential_saving).sum());

        Ok(SummaryView {
            client_name: client.display_name().to_string(),
            total_assets: round_to_cents(inputs.total_assets()),
            total_liabilities: round_to_cents(inputs.total_liabilities()),
            current_net_worth: round_to_cents(inputs.net_worth()),
            tax,
            projection,
            projection_source,
            serviceability,
            strategies,
            total_potential_saving,
        })
    }
}

/// Summarise a client with the given assumptions and default configuration
pub fn compute_summary_from_client(
    client: &ClientRecord,
    assumptions: &GrowthAssumptions,
    stored: Option<&ProjectionResult>,
) -> PlanningResult<SummaryView> {
    Planner::with_assumptions(*assumptions).summarize(client, stored)
}
