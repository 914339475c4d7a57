//! Investment property serviceability

mod serviceability;

pub use serviceability::{
    calculate_property_serviceability, RetirementMetrics, ServiceabilityParams,
    ServiceabilityResult, INCOME_RESERVE_RATIO, RENT_SHADING,
};
