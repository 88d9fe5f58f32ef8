//! Shared types for the promotional-pricing engine
//!
//! Common types used by the engine and its callers: campaign models,
//! order snapshot types, evaluation results, and domain errors.

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use error::{PricingError, PricingResult};
pub use serde::{Deserialize, Serialize};
