//! Named service modules that manifests can refer to.

use std::collections::BTreeMap;

use crate::service::module::ServiceModule;

/// Registry of service modules compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    modules: BTreeMap<String, ServiceModule>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, module: ServiceModule) -> &mut Self {
        self.modules.insert(name.into(), module);
        self
    }

    pub fn get(&self, name: &str) -> Option<ServiceModule> {
        self.modules.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}
