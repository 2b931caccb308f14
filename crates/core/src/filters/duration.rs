use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::DeriveError,
    events::{Event, FieldPath},
    filters::{DURATION_FIELD, Derivation, END_TIME_FIELD, Filter, START_TIME_FIELD},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationMode {
    /// Seconds rounded to millisecond precision.
    #[default]
    Fractional,
    /// Whole seconds, truncated.
    Integer,
}

impl DurationMode {
    pub fn seconds(self, elapsed: TimeDelta) -> Value {
        match self {
            DurationMode::Fractional => {
                let seconds = elapsed
                    .num_nanoseconds()
                    .map(|ns| ns as f64 / 1e9)
                    .unwrap_or_else(|| elapsed.num_milliseconds() as f64 / 1e3);
                Value::from((seconds * 1e3).round() / 1e3)
            }
            DurationMode::Integer => Value::from(elapsed.num_seconds()),
        }
    }
}

/// Writes the elapsed time between the flow's start and end timestamps.
#[derive(Debug, Clone)]
pub struct DurationCalculator {
    mode: DurationMode,
    start_field: FieldPath,
    end_field: FieldPath,
    output_field: FieldPath,
}

impl DurationCalculator {
    pub const ID: &'static str = "flow.duration";

    pub fn new(mode: DurationMode) -> Self {
        Self {
            mode,
            start_field: FieldPath::literal(START_TIME_FIELD),
            end_field: FieldPath::literal(END_TIME_FIELD),
            output_field: FieldPath::literal(DURATION_FIELD),
        }
    }

    pub fn with_fields(
        mode: DurationMode,
        start_field: FieldPath,
        end_field: FieldPath,
        output_field: FieldPath,
    ) -> Self {
        Self {
            mode,
            start_field,
            end_field,
            output_field,
        }
    }

    pub fn mode(&self) -> DurationMode {
        self.mode
    }
}

impl Default for DurationCalculator {
    fn default() -> Self {
        Self::new(DurationMode::default())
    }
}

impl Filter for DurationCalculator {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn inputs(&self) -> Vec<FieldPath> {
        vec![self.start_field.clone(), self.end_field.clone()]
    }

    fn outputs(&self) -> Vec<FieldPath> {
        vec![self.output_field.clone()]
    }

    fn derive(&self, event: &Event) -> Result<Derivation, DeriveError> {
        let start = event
            .timestamp(&self.start_field)
            .map_err(DeriveError::Parse)?;
        let end = event
            .timestamp(&self.end_field)
            .map_err(DeriveError::Parse)?;

        if end < start {
            return Err(DeriveError::InvalidInterval { start, end });
        }

        let elapsed = end.signed_duration_since(start);
        Ok(Derivation::Enrich(vec![(
            self.output_field.clone(),
            self.mode.seconds(elapsed),
        )]))
    }
}
