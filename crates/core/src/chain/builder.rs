use std::collections::HashSet;

use anyhow::Result;

use crate::{
    chain::{FilterChain, Stage},
    filters::Filter,
};

fn validate(stages: &[Box<dyn Filter>]) -> Result<()> {
    anyhow::ensure!(!stages.is_empty(), "filter chain has no stages");

    let mut seen: HashSet<&'static str> = HashSet::new();
    for s in stages {
        if s.id().trim().is_empty() {
            anyhow::bail!("empty stage id");
        }
        if !seen.insert(s.id()) {
            anyhow::bail!("duplicate stage id={}", s.id());
        }
    }

    // A stage may only read what earlier stages (or the source) produced.
    for (i, s) in stages.iter().enumerate() {
        for input in s.inputs() {
            if let Some(later) = stages[i + 1..]
                .iter()
                .find(|later| later.outputs().contains(&input))
            {
                anyhow::bail!(
                    "stage id={} reads field={} which is written by later stage id={}",
                    s.id(),
                    input,
                    later.id()
                );
            }
        }
    }
    Ok(())
}

#[derive(Default)]
pub struct ChainBuilder {
    stages: Vec<Box<dyn Filter>>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stage(mut self, filter: impl Filter + 'static) -> Self {
        self.stages.push(Box::new(filter));
        self
    }

    pub fn boxed_stage(mut self, filter: Box<dyn Filter>) -> Self {
        self.stages.push(filter);
        self
    }

    pub fn build(self) -> Result<FilterChain> {
        validate(&self.stages)?;

        let stages = self.stages.into_iter().map(Stage::new).collect();
        Ok(FilterChain::new(stages))
    }
}
