pub mod advisor;
pub mod allocator;

pub use advisor::Advisor;
pub use allocator::PortfolioAllocator;
