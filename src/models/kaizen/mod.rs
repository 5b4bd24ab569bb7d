pub mod award;
pub mod filter;
pub mod number;
pub mod status;
mod queries;
mod types;

pub use award::{AwardAssignment, AwardPolicy, AwardState, AwardTier};
pub use filter::{CostBand, KaizenFilter, KaizenFilterParams};
pub use queries::*;
pub use status::{AggregateStatus, ApprovalState, Decision, Review, ReviewRole, ReviewStatus, ReviewTrack};
pub use types::*;
