//! Distribution summaries for generated datasets.

pub mod errors;
pub mod report;
pub mod summary;

pub use errors::EvalError;
pub use report::render_summary;
pub use summary::{
    AttributeSummary, BucketRange, BucketSummary, DistributionSummary, ranges_from_spec,
    summarize, summarize_plan,
};
