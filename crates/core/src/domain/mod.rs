pub mod contract;
pub mod fund;
pub mod profile;
pub mod recommendation;
