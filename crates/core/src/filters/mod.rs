pub mod duration;
pub mod filter;
pub mod throughput;

pub use duration::*;
pub use filter::*;
pub use throughput::*;

pub const START_TIME_FIELD: &str = "flow-lifecycle.start-time";
pub const END_TIME_FIELD: &str = "flow-lifecycle.end-time";
pub const DURATION_FIELD: &str = "flow-lifecycle.duration";
pub const RECEIVED_FIELD: &str = "usage.received";
pub const SENT_FIELD: &str = "usage.sent";
pub const THROUGHPUT_FIELD: &str = "flow-lifecycle.throughput";
pub const TOTAL_BYTES_FIELD: &str = "flow-lifecycle.total_bytes";
