//! Client input schema, boundary conversion and file loading

mod data;
mod client;
pub mod loader;

pub use data::{
    Asset, AssetType, DeductionProfile, FinancialInputs, InvestmentProperty, Liability,
    LiabilityType,
};
pub use client::{
    convert_client_to_inputs, ClientAsset, ClientLiability, ClientRecord, DEFAULT_RETIREMENT_AGE,
};
pub use loader::{load_client, load_clients, load_clients_from_dir, parse_clients, ClientLoadError};

#[cfg(test)]
pub(crate) use client::tests::sample_client;
#[cfg(test)]
pub(crate) use data::tests::sample_inputs;
