//! Order-side types: snapshot input and evaluation output

pub mod applied;
pub mod snapshot;

pub use applied::{AppliedCampaign, CodeRejection, DiscountResult};
pub use snapshot::{OrderLine, OrderSnapshot};
