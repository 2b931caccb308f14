use serde_json::Value;

use crate::{
    error::{ComputationContext, ComputationFault, DeriveError},
    events::{Event, FieldPath, Numeric},
    filters::{
        DURATION_FIELD, Derivation, Filter, RECEIVED_FIELD, SENT_FIELD, THROUGHPUT_FIELD,
        TOTAL_BYTES_FIELD,
    },
};

/// Writes `max(received, sent) / duration`, and optionally `received + sent`.
#[derive(Debug, Clone)]
pub struct ThroughputCalculator {
    include_total_bytes: bool,
    duration_field: FieldPath,
    received_field: FieldPath,
    sent_field: FieldPath,
    throughput_field: FieldPath,
    total_bytes_field: FieldPath,
}

impl ThroughputCalculator {
    pub const ID: &'static str = "flow.throughput";

    pub fn new(include_total_bytes: bool) -> Self {
        Self {
            include_total_bytes,
            duration_field: FieldPath::literal(DURATION_FIELD),
            received_field: FieldPath::literal(RECEIVED_FIELD),
            sent_field: FieldPath::literal(SENT_FIELD),
            throughput_field: FieldPath::literal(THROUGHPUT_FIELD),
            total_bytes_field: FieldPath::literal(TOTAL_BYTES_FIELD),
        }
    }

    pub fn with_inputs(
        mut self,
        duration_field: FieldPath,
        received_field: FieldPath,
        sent_field: FieldPath,
    ) -> Self {
        self.duration_field = duration_field;
        self.received_field = received_field;
        self.sent_field = sent_field;
        self
    }

    pub fn with_outputs(mut self, throughput_field: FieldPath, total_bytes_field: FieldPath) -> Self {
        self.throughput_field = throughput_field;
        self.total_bytes_field = total_bytes_field;
        self
    }

    pub fn includes_total_bytes(&self) -> bool {
        self.include_total_bytes
    }

    fn counter(path: &FieldPath, raw: Option<&Value>) -> Result<Numeric, ComputationFault> {
        let value = Numeric::coerce(path, raw)?;
        if value.is_negative() {
            return Err(ComputationFault::NegativeCounter {
                path: path.to_string(),
                value: value.as_f64(),
            });
        }
        Ok(value)
    }

    fn compute(&self, context: &ComputationContext) -> Result<Derivation, ComputationFault> {
        let duration = Numeric::coerce(&self.duration_field, context.duration.as_ref())?;
        if !duration.is_positive() {
            return Ok(Derivation::Skip);
        }

        let received = Self::counter(&self.received_field, context.received.as_ref())?;
        let sent = Self::counter(&self.sent_field, context.sent.as_ref())?;

        let usage_bytes = received.max(sent).as_f64();
        let throughput = usage_bytes / duration.as_f64();
        if !throughput.is_finite() {
            return Err(ComputationFault::NonFinite {
                usage_bytes,
                duration: duration.as_f64(),
            });
        }

        let mut assignments = vec![(self.throughput_field.clone(), Value::from(throughput))];
        if self.include_total_bytes {
            assignments.push((self.total_bytes_field.clone(), total_bytes(received, sent)?));
        }
        Ok(Derivation::Enrich(assignments))
    }
}

fn total_bytes(received: Numeric, sent: Numeric) -> Result<Value, ComputationFault> {
    let overflow = || ComputationFault::Overflow {
        received: received.into(),
        sent: sent.into(),
    };

    let total = match (received.integer(), sent.integer()) {
        (Some(a), Some(b)) => Numeric::from_integer(a + b).ok_or_else(overflow)?,
        _ => Numeric::Float(received.as_f64() + sent.as_f64()),
    };
    if !total.as_f64().is_finite() {
        return Err(overflow());
    }
    Ok(total.into())
}

impl Default for ThroughputCalculator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Filter for ThroughputCalculator {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn inputs(&self) -> Vec<FieldPath> {
        vec![
            self.duration_field.clone(),
            self.received_field.clone(),
            self.sent_field.clone(),
        ]
    }

    fn outputs(&self) -> Vec<FieldPath> {
        let mut outputs = vec![self.throughput_field.clone()];
        if self.include_total_bytes {
            outputs.push(self.total_bytes_field.clone());
        }
        outputs
    }

    fn derive(&self, event: &Event) -> Result<Derivation, DeriveError> {
        let context = ComputationContext {
            duration: event.get(&self.duration_field).cloned(),
            received: event.get(&self.received_field).cloned(),
            sent: event.get(&self.sent_field).cloned(),
        };

        self.compute(&context)
            .map_err(|fault| DeriveError::Computation { context, fault })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{error::CoercionError, filters::Outcome};

    fn flow(duration: Value, received: Value, sent: Value) -> Event {
        Event::from_value(json!({
            "flow-lifecycle": { "duration": duration },
            "usage": { "received": received, "sent": sent }
        }))
        .unwrap()
    }

    fn field<'a>(event: &'a Event, path: &'static str) -> Option<&'a Value> {
        event.get(&FieldPath::literal(path))
    }

    #[test]
    fn uses_dominant_counter() {
        let calc = ThroughputCalculator::new(false);

        let event = calc
            .process(flow(json!(4), json!(1000), json!(200)))
            .into_event();

        assert_eq!(field(&event, THROUGHPUT_FIELD), Some(&json!(250.0)));
        assert_eq!(field(&event, TOTAL_BYTES_FIELD), None);
    }

    #[test]
    fn total_bytes_stays_integral_for_integer_counters() {
        let calc = ThroughputCalculator::new(true);

        let event = calc
            .process(flow(json!(2), json!(3), json!(4)))
            .into_event();
        assert_eq!(field(&event, TOTAL_BYTES_FIELD), Some(&json!(7)));

        let event = calc
            .process(flow(json!(2), json!(3.5), json!(4)))
            .into_event();
        assert_eq!(field(&event, TOTAL_BYTES_FIELD), Some(&json!(7.5)));
    }

    #[test]
    fn non_positive_duration_is_silent() {
        let calc = ThroughputCalculator::default();

        for duration in [json!(0), json!(0.0), json!(-3)] {
            let input = flow(duration, json!(100), json!(400));
            let outcome = calc.process(input.clone());
            assert_eq!(outcome, Outcome::Unchanged { event: input, error: None });
        }
    }

    #[test]
    fn failures_keep_raw_context() {
        let calc = ThroughputCalculator::default();
        let input = flow(json!(2.5), json!("lots"), json!(400));

        let outcome = calc.process(input.clone());

        let Some(DeriveError::Computation { context, fault }) = outcome.error() else {
            panic!("expected a computation failure, got {outcome:?}");
        };
        assert_eq!(context.duration, Some(json!(2.5)));
        assert_eq!(context.received, Some(json!("lots")));
        assert_eq!(context.sent, Some(json!(400)));
        assert!(matches!(
            fault,
            ComputationFault::Coercion(CoercionError::WrongType { .. })
        ));
        assert_eq!(outcome.into_event(), input);
    }

    #[test]
    fn missing_duration_is_a_failure() {
        let calc = ThroughputCalculator::default();
        let input = Event::from_value(json!({ "usage": { "received": 1, "sent": 2 } })).unwrap();

        let outcome = calc.process(input.clone());

        assert!(matches!(
            outcome.error(),
            Some(DeriveError::Computation {
                fault: ComputationFault::Coercion(CoercionError::Missing { .. }),
                ..
            })
        ));
        assert_eq!(outcome.into_event(), input);
    }

    #[test]
    fn rejects_negative_counters() {
        let calc = ThroughputCalculator::default();

        let outcome = calc.process(flow(json!(1), json!(-5), json!(10)));

        assert!(matches!(
            outcome.error(),
            Some(DeriveError::Computation {
                fault: ComputationFault::NegativeCounter { .. },
                ..
            })
        ));
    }

    #[test]
    fn rejects_overflowing_results() {
        let calc = ThroughputCalculator::default();

        let outcome = calc.process(flow(json!(1e-300), json!(1e300), json!(1)));
        assert!(matches!(
            outcome.error(),
            Some(DeriveError::Computation {
                fault: ComputationFault::NonFinite { .. },
                ..
            })
        ));

        let outcome = calc.process(flow(json!(1), json!(u64::MAX), json!(1)));
        assert!(matches!(
            outcome.error(),
            Some(DeriveError::Computation {
                fault: ComputationFault::Overflow { .. },
                ..
            })
        ));
        assert!(!outcome.event().contains(&FieldPath::literal(THROUGHPUT_FIELD)));
    }

    #[test]
    fn total_bytes_stays_exact_above_i64_range() {
        let calc = ThroughputCalculator::default();

        let outcome = calc.process(flow(json!(1), json!(i64::MAX), json!(1)));
        assert!(outcome.is_enriched());
        assert_eq!(
            field(outcome.event(), TOTAL_BYTES_FIELD),
            Some(&json!(i64::MAX as u64 + 1))
        );

        let outcome = calc.process(flow(json!(1), json!(u64::MAX - 10), json!(5)));
        assert_eq!(
            field(outcome.event(), TOTAL_BYTES_FIELD),
            Some(&json!(u64::MAX - 5))
        );

        let outcome = calc.process(flow(json!(1), json!(u64::MAX), json!(u64::MAX)));
        assert!(matches!(
            outcome.error(),
            Some(DeriveError::Computation {
                fault: ComputationFault::Overflow { .. },
                ..
            })
        ));
    }

    #[test]
    fn unwritable_output_leaves_event_untouched() {
        let calc = ThroughputCalculator::default().with_outputs(
            FieldPath::literal("stats.throughput"),
            FieldPath::literal("usage.sent.total"),
        );
        let input = Event::from_value(json!({
            "flow-lifecycle": { "duration": 1 },
            "usage": { "received": 1, "sent": 2 }
        }))
        .unwrap();

        let outcome = calc.process(input.clone());

        assert!(matches!(outcome.error(), Some(DeriveError::Write(_))));
        assert_eq!(outcome.into_event(), input);
    }

    #[test]
    fn reads_configured_inputs() {
        let calc = ThroughputCalculator::new(false).with_inputs(
            FieldPath::literal("duration"),
            FieldPath::literal("rx"),
            FieldPath::literal("tx"),
        );
        let input = Event::from_value(json!({ "duration": 0.5, "rx": 10, "tx": 20 })).unwrap();

        let event = calc.process(input).into_event();

        assert_eq!(field(&event, THROUGHPUT_FIELD), Some(&json!(40.0)));
        assert_eq!(calc.inputs()[0], FieldPath::literal("duration"));
    }
}
