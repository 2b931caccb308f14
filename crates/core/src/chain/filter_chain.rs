use crate::{
    chain::{StageMetrics, StageStats},
    events::Event,
    filters::Filter,
};

pub struct Stage {
    filter: Box<dyn Filter>,
    metrics: StageMetrics,
}

impl Stage {
    pub fn new(filter: Box<dyn Filter>) -> Self {
        Self {
            filter,
            metrics: StageMetrics::new(),
        }
    }

    fn run(&self, event: Event) -> Vec<Event> {
        let outcome = self.filter.process(event);
        self.metrics.record(&outcome);
        vec![outcome.into_event()]
    }
}

/// Ordered, validated sequence of filters. Build with [`crate::ChainBuilder`].
pub struct FilterChain {
    stages: Vec<Stage>,
}

impl FilterChain {
    pub(crate) fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Feeds `event` through every stage in order.
    pub fn process(&self, event: Event) -> Vec<Event> {
        let mut events = vec![event];
        for stage in &self.stages {
            events = events.into_iter().flat_map(|e| stage.run(e)).collect();
        }
        events
    }

    pub fn stage_ids(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.filter.id()).collect()
    }

    pub fn stats(&self) -> Vec<StageStats> {
        self.stages
            .iter()
            .map(|s| s.metrics.snapshot(s.filter.id()))
            .collect()
    }
}
