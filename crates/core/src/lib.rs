pub mod config;
pub mod domain;
pub mod error;
pub mod funds;
pub mod portfolio;
pub mod risk;

pub use config::{EngineConfig, Settings};
pub use domain::contract::{FieldWarning, ProfileInput};
pub use domain::fund::{FundCategory, FundRecord, FundUniverse, ScoredFund};
pub use domain::recommendation::{AdvisoryReport, PortfolioRecommendation, RiskCategory};
pub use error::{ConfigError, ProfileError};
pub use portfolio::{Advisor, PortfolioAllocator};
