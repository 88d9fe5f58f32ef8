//! Promotional pricing evaluation engine
//!
//! Evaluates coupons, discounts and promotions against an immutable order
//! snapshot and produces an itemized discount result. Evaluation is pure;
//! redemptions are recorded separately through the usage ledger once an
//! order finalizes.
//!
//! # Module structure
//!
//! ```text
//! promo-engine/src/
//! ├── engine.rs      # evaluation orchestrator
//! ├── matcher.rs     # restriction checks and line eligibility
//! ├── calculator.rs  # per-kind discount amounts
//! ├── stacking.rs    # combination and priority resolution
//! ├── ledger.rs      # commit-time usage recording
//! ├── store/         # persistence trait + in-memory implementation
//! ├── codegen.rs     # redemption code allocation
//! └── money.rs       # decimal conversion helpers
//! ```

pub mod calculator;
pub mod codegen;
pub mod engine;
pub mod ledger;
pub mod matcher;
pub mod money;
pub mod stacking;
pub mod store;

// Re-export the public surface
pub use engine::PromoEngine;
pub use ledger::{UsageError, UsageLedger};
pub use store::{CampaignStore, MemoryCampaignStore, StoreError, StoreResult};

// Re-export unified error types from shared
pub use shared::{PricingError, PricingResult};
