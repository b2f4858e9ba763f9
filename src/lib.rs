pub mod api;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::{BundleflowError, SettlementError};
pub use crate::core::services::BundleflowService;
pub use crate::core::settlement::SettlementOrchestrator;

#[cfg(test)]
mod tests;
