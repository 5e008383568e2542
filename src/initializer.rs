//! One-time initialization of catalog entries.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::error::{RegistryError, Result};

/// Tracks which identifiers have completed initialization.
#[derive(Debug, Default)]
pub struct Initializer {
    initialized: HashSet<String>,
}

impl Initializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self, identifier: &str) -> bool {
        self.initialized.contains(identifier)
    }

    pub fn initialized_count(&self) -> usize {
        self.initialized.len()
    }

    /// Walk `catalog` in order and run each pending init hook with `ctx`.
    ///
    /// Returns how many hooks ran. The first failing hook aborts the pass;
    /// modules initialized before it stay initialized and the failing one is
    /// not marked, so it is retried by the next pass.
    pub fn run<C>(
        &mut self,
        catalog: &Catalog<C>,
        ctx: &C,
        hookless_counts_as_initialized: bool,
        log: &dyn Fn(&str),
    ) -> Result<usize> {
        let mut invoked = 0;

        for entry in catalog.iter() {
            let id = &entry.identifier;
            if self.initialized.contains(id) {
                log(&format!(
                    "[WARNING]: Module '{}' is already initialized, skipping",
                    id
                ));
                continue;
            }

            match entry.init_hook() {
                Some(hook) => {
                    log(&format!("Initializing '{}'...", id));
                    hook.init(ctx).map_err(|source| RegistryError::InitHook {
                        identifier: id.clone(),
                        source,
                    })?;
                    invoked += 1;
                    self.initialized.insert(id.clone());
                }
                None if hookless_counts_as_initialized => {
                    self.initialized.insert(id.clone());
                }
                None => {}
            }
        }

        Ok(invoked)
    }
}
