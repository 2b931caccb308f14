use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    chain::{ChainBuilder, FilterChain},
    error::ConfigError,
    events::FieldPath,
    filters::{
        DURATION_FIELD, DurationCalculator, DurationMode, END_TIME_FIELD, RECEIVED_FIELD,
        SENT_FIELD, START_TIME_FIELD, THROUGHPUT_FIELD, TOTAL_BYTES_FIELD, ThroughputCalculator,
    },
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    pub duration: DurationConfig,
    pub throughput: ThroughputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DurationConfig {
    pub enabled: bool,
    pub mode: DurationMode,
    pub start_field: FieldPath,
    pub end_field: FieldPath,
    pub output_field: FieldPath,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: DurationMode::Fractional,
            start_field: FieldPath::literal(START_TIME_FIELD),
            end_field: FieldPath::literal(END_TIME_FIELD),
            output_field: FieldPath::literal(DURATION_FIELD),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThroughputConfig {
    pub enabled: bool,
    pub include_total_bytes: bool,
    pub duration_field: FieldPath,
    pub received_field: FieldPath,
    pub sent_field: FieldPath,
    pub throughput_field: FieldPath,
    pub total_bytes_field: FieldPath,
}

impl Default for ThroughputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_total_bytes: true,
            duration_field: FieldPath::literal(DURATION_FIELD),
            received_field: FieldPath::literal(RECEIVED_FIELD),
            sent_field: FieldPath::literal(SENT_FIELD),
            throughput_field: FieldPath::literal(THROUGHPUT_FIELD),
            total_bytes_field: FieldPath::literal(TOTAL_BYTES_FIELD),
        }
    }
}

impl ChainConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults".
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Builds the chain in the fixed order duration, throughput.
    pub fn build_chain(&self) -> anyhow::Result<FilterChain> {
        if !self.duration.enabled && !self.throughput.enabled {
            return Err(ConfigError::NoFilters.into());
        }

        let mut builder = ChainBuilder::new();
        if self.duration.enabled {
            let d = &self.duration;
            builder = builder.stage(DurationCalculator::with_fields(
                d.mode,
                d.start_field.clone(),
                d.end_field.clone(),
                d.output_field.clone(),
            ));
        }
        if self.throughput.enabled {
            let t = &self.throughput;
            builder = builder.stage(
                ThroughputCalculator::new(t.include_total_bytes)
                    .with_inputs(
                        t.duration_field.clone(),
                        t.received_field.clone(),
                        t.sent_field.clone(),
                    )
                    .with_outputs(t.throughput_field.clone(), t.total_bytes_field.clone()),
            );
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(ChainConfig::from_yaml_str("").unwrap(), ChainConfig::default());
        assert_eq!(
            ChainConfig::from_yaml_str("duration: {}\n").unwrap(),
            ChainConfig::default()
        );
    }

    #[test]
    fn parses_overrides() {
        let config = ChainConfig::from_yaml_str(
            r#"
duration:
  mode: integer
throughput:
  include_total_bytes: false
  duration_field: "[duration]"
"#,
        )
        .unwrap();

        assert_eq!(config.duration.mode, DurationMode::Integer);
        assert!(!config.throughput.include_total_bytes);
        assert_eq!(config.throughput.duration_field, FieldPath::literal("duration"));
        assert_eq!(
            config.throughput.sent_field,
            FieldPath::literal(SENT_FIELD)
        );
    }

    #[test]
    fn rejects_unknown_keys_and_bad_paths() {
        assert!(matches!(
            ChainConfig::from_yaml_str("durtion: {}\n"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            ChainConfig::from_yaml_str("throughput:\n  sent_field: \"usage..sent\"\n"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            ChainConfig::from_yaml_str("duration:\n  mode: hours\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn builds_enabled_stages_in_order() {
        let chain = ChainConfig::default().build_chain().unwrap();
        assert_eq!(
            chain.stage_ids(),
            vec![DurationCalculator::ID, ThroughputCalculator::ID]
        );

        let mut config = ChainConfig::default();
        config.duration.enabled = false;
        assert_eq!(
            config.build_chain().unwrap().stage_ids(),
            vec![ThroughputCalculator::ID]
        );

        config.throughput.enabled = false;
        assert!(config.build_chain().is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ChainConfig::from_path("/nonexistent/flowcalc.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
