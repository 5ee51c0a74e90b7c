//! Engine module loading.
//!
//! Engines are external modules; the core only ever holds them as
//! `Arc<dyn EngineFactory>`. The registry maps stable handles to factories so
//! an embedding application can select an engine by name at submission time
//! without the core knowing how the module was produced.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use engine_interface::EngineFactory;

#[derive(Default)]
pub struct EngineRegistry {
    factories: Mutex<HashMap<String, Arc<dyn EngineFactory>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        EngineRegistry::default()
    }

    /// Register a factory under a handle. Re-registering a handle replaces
    /// the previous factory.
    pub fn register(&self, handle: impl Into<String>, factory: Arc<dyn EngineFactory>) {
        let mut factories = self.factories.lock().unwrap_or_else(|e| e.into_inner());
        factories.insert(handle.into(), factory);
    }

    /// Resolve a handle to its factory.
    pub fn resolve(&self, handle: &str) -> anyhow::Result<Arc<dyn EngineFactory>> {
        let factories = self.factories.lock().unwrap_or_else(|e| e.into_inner());
        factories
            .get(handle)
            .cloned()
            .with_context(|| format!("no engine registered under handle {handle:?}"))
    }

    /// Registered handles, sorted.
    pub fn handles(&self) -> Vec<String> {
        let factories = self.factories.lock().unwrap_or_else(|e| e.into_inner());
        let mut handles: Vec<String> = factories.keys().cloned().collect();
        handles.sort_unstable();
        handles
    }
}
