pub mod filter;
pub mod stats;

pub use filter::{CompositeWeights, ExpenseThresholds, FilterConfig, FundFilterEngine};
