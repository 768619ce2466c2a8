use std::collections::BTreeMap;

use crate::context::EvalContext;
use crate::error::{MetricError, Result};
use crate::metric::Metric;
use crate::privacy::{AttributeDisclosure, MedianDcr};

/// Constructor binding an evaluation context to a boxed metric instance.
pub type MetricCtor = fn(EvalContext) -> Box<dyn Metric>;

/// Runtime metric selection keyed by the metric's stable name.
pub struct MetricRegistry {
    ctors: BTreeMap<&'static str, MetricCtor>,
}

impl MetricRegistry {
    /// Registry with the built-in privacy metrics.
    pub fn new() -> Self {
        let mut registry = Self {
            ctors: BTreeMap::new(),
        };
        registry.register(AttributeDisclosure::NAME, |ctx| {
            Box::new(AttributeDisclosure::new(ctx))
        });
        registry.register(MedianDcr::NAME, |ctx| Box::new(MedianDcr::new(ctx)));
        registry
    }

    pub fn register(&mut self, name: &'static str, ctor: MetricCtor) {
        self.ctors.insert(name, ctor);
    }

    /// Instantiate a metric by name, binding it to the given context.
    pub fn create(&self, name: &str, ctx: EvalContext) -> Result<Box<dyn Metric>> {
        let ctor = self
            .ctors
            .get(name)
            .ok_or_else(|| MetricError::UnknownMetric(name.to_string()))?;
        Ok(ctor(ctx))
    }

    /// Registered metric names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.ctors.keys().copied().collect()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}
