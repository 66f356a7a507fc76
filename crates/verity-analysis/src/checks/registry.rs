//! RuleCatalog: rule id → option schema and factory.

use verity_core::errors::ConfigError;

use crate::engine::{OptionSpec, Rule, RuleOptions};

/// Builds a fresh rule instance from resolved options.
pub type RuleFactory = fn(&RuleOptions) -> Box<dyn Rule>;

/// Static description of one rule the runner can instantiate.
#[derive(Clone, Copy)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub options: &'static [OptionSpec],
    pub factory: RuleFactory,
}

impl RuleDescriptor {
    pub fn new(id: &'static str, factory: RuleFactory) -> Self {
        Self {
            id,
            options: &[],
            factory,
        }
    }

    pub fn with_options(mut self, options: &'static [OptionSpec]) -> Self {
        self.options = options;
        self
    }

    /// Resolve `table` against this rule's schema and build an instance.
    pub fn instantiate(&self, table: &toml::Table) -> Result<Box<dyn Rule>, ConfigError> {
        let options = RuleOptions::resolve(self.id, self.options, table)?;
        Ok((self.factory)(&options))
    }
}

impl std::fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("id", &self.id)
            .field("options", &self.options)
            .finish()
    }
}

/// Read-only after construction; shared by every worker of a run.
#[derive(Debug, Default, Clone)]
pub struct RuleCatalog {
    descriptors: Vec<RuleDescriptor>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. A second registration of the same id replaces the first.
    pub fn register(&mut self, descriptor: RuleDescriptor) {
        match self.descriptors.iter_mut().find(|d| d.id == descriptor.id) {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn get(&self, id: &str) -> Option<&RuleDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|d| d.id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
