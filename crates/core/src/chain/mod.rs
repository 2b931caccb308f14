pub mod builder;
pub mod filter_chain;
pub mod metrics;

pub use builder::*;
pub use filter_chain::*;
pub use metrics::*;
