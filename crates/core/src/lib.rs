pub mod chain;
pub mod config;
pub mod error;
pub mod events;
pub mod filters;

pub use chain::{ChainBuilder, FilterChain, StageStats};
pub use config::{ChainConfig, DurationConfig, ThroughputConfig};
pub use error::{
    CoercionError, ComputationContext, ComputationFault, ConfigError, DeriveError, FieldError,
    PathError,
};
pub use events::{Event, FieldPath, Numeric, parse_timestamp};
pub use filters::{
    Derivation, DurationCalculator, DurationMode, Filter, Outcome, ThroughputCalculator,
};
