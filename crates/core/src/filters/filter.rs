use crate::{
    error::DeriveError,
    events::{Assignment, Event, FieldPath},
};

/// What a filter decided to do with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Derivation {
    Enrich(Vec<Assignment>),
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Enriched(Event),
    Unchanged {
        event: Event,
        error: Option<DeriveError>,
    },
}

impl Outcome {
    pub fn event(&self) -> &Event {
        match self {
            Outcome::Enriched(event) | Outcome::Unchanged { event, .. } => event,
        }
    }

    pub fn into_event(self) -> Event {
        match self {
            Outcome::Enriched(event) | Outcome::Unchanged { event, .. } => event,
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, Outcome::Enriched(_))
    }

    pub fn error(&self) -> Option<&DeriveError> {
        match self {
            Outcome::Unchanged { error, .. } => error.as_ref(),
            Outcome::Enriched(_) => None,
        }
    }
}

/// A per-event enrichment step.
///
/// Implementors only provide [`Filter::derive`]; the provided methods turn
/// every failure into a logged pass-through so callers always get the event
/// back.
pub trait Filter: Send + Sync {
    fn id(&self) -> &'static str;

    /// Fields read by [`Filter::derive`].
    fn inputs(&self) -> Vec<FieldPath>;

    /// Fields written on enrichment.
    fn outputs(&self) -> Vec<FieldPath>;

    fn derive(&self, event: &Event) -> Result<Derivation, DeriveError>;

    fn process(&self, mut event: Event) -> Outcome {
        let result = match self.derive(&event) {
            Ok(Derivation::Skip) => Ok(false),
            Ok(Derivation::Enrich(assignments)) => event
                .apply(assignments)
                .map(|()| true)
                .map_err(DeriveError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(true) => Outcome::Enriched(event),
            Ok(false) => Outcome::Unchanged { event, error: None },
            Err(error) => {
                error.report(self.id(), event.id());
                Outcome::Unchanged {
                    event,
                    error: Some(error),
                }
            }
        }
    }

    /// Pipeline entry point: zero or more events out per event in.
    fn filter(&self, event: Event) -> Vec<Event> {
        vec![self.process(event).into_event()]
    }
}
