use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::events::FieldPath;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,

    #[error("field path {path:?} has an empty segment")]
    EmptySegment { path: String },

    #[error("field path {path:?} has unbalanced brackets")]
    Unbalanced { path: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("cannot write {path}: {parent} is not an object")]
    NotAnObject { path: String, parent: String },
}

impl FieldError {
    pub(crate) fn not_an_object(path: &FieldPath, depth: usize) -> Self {
        FieldError::NotAnObject {
            path: path.to_string(),
            parent: path.prefix(depth),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("field {path} is missing")]
    Missing { path: String },

    #[error("field {path} is a {found}, expected a {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field {path} value {value:?} is not a valid {expected}")]
    Unparseable {
        path: String,
        value: String,
        expected: &'static str,
    },
}

/// Raw throughput inputs, kept as read for the warning payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputationContext {
    pub duration: Option<Value>,
    pub received: Option<Value>,
    pub sent: Option<Value>,
}

fn render(raw: &Option<Value>) -> String {
    raw.as_ref()
        .map_or_else(|| "absent".to_string(), Value::to_string)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationFault {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("byte counter {path} is negative: {value}")]
    NegativeCounter { path: String, value: f64 },

    #[error("throughput is not finite: {usage_bytes} bytes over {duration}s")]
    NonFinite { usage_bytes: f64, duration: f64 },

    #[error("total bytes overflow: {received} + {sent}")]
    Overflow { received: Value, sent: Value },
}

/// Why a filter left an event unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeriveError {
    #[error("error parsing start and end time: {0}")]
    Parse(#[source] CoercionError),

    #[error("end time {end} precedes start time {start}")]
    InvalidInterval {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    #[error("error calculating throughput: {fault}")]
    Computation {
        context: ComputationContext,
        #[source]
        fault: ComputationFault,
    },

    #[error("error writing derived field: {0}")]
    Write(#[from] FieldError),
}

impl DeriveError {
    /// False for outcomes the filter expects in normal traffic, such as an
    /// interval that ends before it starts.
    pub fn is_failure(&self) -> bool {
        !matches!(self, DeriveError::InvalidInterval { .. })
    }

    /// Emits the log line for this failure at its severity.
    pub fn report(&self, stage: &'static str, event_id: Uuid) {
        match self {
            DeriveError::Parse(source) => {
                debug!(stage, %event_id, error = %source, "Error parsing start and end time");
            }
            DeriveError::InvalidInterval { start, end } => {
                trace!(stage, %event_id, %start, %end, "End time precedes start time");
            }
            DeriveError::Computation { context, fault } => {
                warn!(
                    stage,
                    %event_id,
                    duration = %render(&context.duration),
                    received = %render(&context.received),
                    sent = %render(&context.sent),
                    error = %fault,
                    "Error calculating throughput"
                );
            }
            DeriveError::Write(source) => {
                warn!(stage, %event_id, error = %source, "Error writing derived field");
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config enables no filters")]
    NoFilters,
}
