//! Factory table: the startup-time registration point that turns a manifest's
//! `kind` + `settings` into live capabilities.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::BoxError;
use crate::module::ModuleParts;

/// Builds the init hook and executable for every manifest naming this factory.
pub trait ModuleFactory<C>: Send + Sync {
    fn build(&self, settings: &Value) -> Result<ModuleParts<C>, BoxError>;
}

impl<C, F> ModuleFactory<C> for F
where
    F: Fn(&Value) -> Result<ModuleParts<C>, BoxError> + Send + Sync,
{
    fn build(&self, settings: &Value) -> Result<ModuleParts<C>, BoxError> {
        self(settings)
    }
}

pub struct FactoryTable<C> {
    factories: HashMap<String, Box<dyn ModuleFactory<C>>>,
}

impl<C: 'static> FactoryTable<C> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register `factory` under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: ModuleFactory<C> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Closure form of [`register`](Self::register).
    pub fn register_fn<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Result<ModuleParts<C>, BoxError> + Send + Sync + 'static,
    {
        self.register(name, factory);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ModuleFactory<C>> {
        self.factories.get(name).map(|f| f.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<C: 'static> Default for FactoryTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
