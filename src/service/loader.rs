//! Service reference resolution.
//!
//! # Responsibilities
//! - Turn an ordered list of [`ServiceRef`]s into [`LoadedService`]s
//! - Read manifests for path references and look up their module
//! - Run every `load` hook, in order, before any `init`
//!
//! # Design Decisions
//! - Input order is kept: it decides init order and which service
//!   declares the configuration
//! - Resolution errors name the reference that caused them

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::loader::load_manifest;
use crate::error::BootstrapError;
use crate::service::module::{LoadedService, ServiceModule};
use crate::service::registry::ServiceRegistry;

/// A reference to a service, as given on the command line or in code.
#[derive(Debug, Clone)]
pub enum ServiceRef {
    /// Path to a service manifest, relative to the loader's base directory.
    Path(PathBuf),
    /// An already-built module, used as-is.
    Loaded(ServiceModule),
}

impl From<&str> for ServiceRef {
    fn from(path: &str) -> Self {
        ServiceRef::Path(PathBuf::from(path))
    }
}

impl From<String> for ServiceRef {
    fn from(path: String) -> Self {
        ServiceRef::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for ServiceRef {
    fn from(path: PathBuf) -> Self {
        ServiceRef::Path(path)
    }
}

impl From<ServiceModule> for ServiceRef {
    fn from(module: ServiceModule) -> Self {
        ServiceRef::Loaded(module)
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceRef::Path(path) => write!(f, "{}", path.display()),
            ServiceRef::Loaded(module) => write!(f, "{:?}", module),
        }
    }
}

/// Resolves service references against a registry.
#[derive(Debug, Clone, Default)]
pub struct ServiceLoader {
    registry: ServiceRegistry,
    base_dir: Option<PathBuf>,
}

impl ServiceLoader {
    pub fn new(registry: ServiceRegistry) -> Self {
        Self {
            registry,
            base_dir: None,
        }
    }

    /// Resolve relative paths against `dir` instead of the working directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Resolve every reference, keeping input order.
    pub fn resolve(&self, refs: Vec<ServiceRef>) -> Result<Vec<LoadedService>, BootstrapError> {
        if refs.is_empty() {
            return Err(BootstrapError::Usage);
        }

        refs.into_iter()
            .enumerate()
            .map(|(index, reference)| self.resolve_one(index, reference))
            .collect()
    }

    fn resolve_one(&self, index: usize, reference: ServiceRef) -> Result<LoadedService, BootstrapError> {
        match reference {
            ServiceRef::Loaded(module) => {
                let name = match &module {
                    ServiceModule::Function(_) => format!("service #{}", index + 1),
                    ServiceModule::Object(service) => service.name().to_string(),
                };
                let declared = module.declared();
                Ok(LoadedService::new(name, module, declared))
            }
            ServiceRef::Path(path) => self.resolve_path(&path),
        }
    }

    fn resolve_path(&self, path: &Path) -> Result<LoadedService, BootstrapError> {
        let reference = path.display().to_string();
        let full_path = self.absolute(path)?;

        tracing::info!(path = %full_path.display(), "Loading service");

        let manifest = load_manifest(&full_path)
            .map_err(|e| BootstrapError::configuration(&reference, e.to_string()))?;

        let module_name = manifest.service.ok_or_else(|| {
            BootstrapError::configuration(
                &reference,
                "manifest has no initializer (missing `service` key)",
            )
        })?;

        let module = self.registry.get(&module_name).ok_or_else(|| {
            let known: Vec<&str> = self.registry.names().collect();
            BootstrapError::configuration(
                &reference,
                format!(
                    "unknown service module `{}` (known: {})",
                    module_name,
                    known.join(", ")
                ),
            )
        })?;

        let declared = module.declared().overlay(manifest.declared);
        Ok(LoadedService::new(reference, module, declared))
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf, BootstrapError> {
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        let base = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| {
                BootstrapError::configuration(
                    path.display().to_string(),
                    format!("cannot determine working directory: {}", e),
                )
            })?,
        };
        Ok(base.join(path))
    }
}

/// Run every service's `load` hook sequentially, in order.
pub async fn run_load_hooks(services: &[LoadedService]) -> Result<(), BootstrapError> {
    for service in services.iter().filter(|s| s.has_load_hook()) {
        tracing::info!(service = %service.name(), "Loading service data");
        service.load().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PortValue;
    use crate::config::DeclaredConfig;
    use crate::error::BoxError;
    use crate::http::App;
    use crate::service::module::{RuntimeContext, Service};
    use async_trait::async_trait;
    use std::fs;

    struct Declares;

    #[async_trait]
    impl Service for Declares {
        async fn init(&self, _app: App, _ctx: RuntimeContext) -> Result<(), BoxError> {
            Ok(())
        }

        fn declared(&self) -> DeclaredConfig {
            DeclaredConfig {
                port: Some(7000u16.into()),
                hostname: Some("localhost".into()),
                ..Default::default()
            }
        }

        fn name(&self) -> &str {
            "declares"
        }
    }

    fn loader(dir: &Path) -> ServiceLoader {
        let mut registry = ServiceRegistry::new();
        registry.register("declares", ServiceModule::object(Declares));
        ServiceLoader::new(registry).with_base_dir(dir)
    }

    fn config_reason(err: BootstrapError) -> (String, String) {
        match err {
            BootstrapError::Configuration { reference, reason } => (reference, reason),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_is_usage_error() {
        let err = ServiceLoader::default().resolve(Vec::new()).unwrap_err();
        assert!(matches!(err, BootstrapError::Usage));
    }

    #[test]
    fn test_manifest_overrides_module_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("svc.toml"), "service = \"declares\"\nPORT = \"9999\"\n").unwrap();

        let services = loader(dir.path()).resolve(vec!["svc.toml".into()]).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name(), "svc.toml");
        assert_eq!(services[0].declared().port, Some(PortValue::Text("9999".into())));
        assert_eq!(services[0].declared().hostname.as_deref(), Some("localhost"));
    }

    #[test]
    fn test_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.toml"), "service = \"declares\"").unwrap();
        let function = ServiceModule::function(|_app: App, _ctx: RuntimeContext| async {
            Ok::<_, BoxError>(())
        });

        let services = loader(dir.path())
            .resolve(vec![function.into(), "a.toml".into(), ServiceModule::object(Declares).into()])
            .unwrap();

        let names: Vec<_> = services.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["service #1", "a.toml", "declares"]);
    }

    #[test]
    fn test_missing_service_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bare.toml"), "PORT = 1234").unwrap();

        let (reference, reason) = config_reason(loader(dir.path()).resolve(vec!["bare.toml".into()]).unwrap_err());
        assert_eq!(reference, "bare.toml");
        assert!(reason.contains("initializer"));
    }

    #[test]
    fn test_unknown_module() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.toml"), "service = \"nope\"").unwrap();

        let (reference, reason) = config_reason(loader(dir.path()).resolve(vec!["x.toml".into()]).unwrap_err());
        assert_eq!(reference, "x.toml");
        assert!(reason.contains("nope"));
        assert!(reason.contains("declares"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (reference, _) = config_reason(loader(dir.path()).resolve(vec!["missing.toml".into()]).unwrap_err());
        assert_eq!(reference, "missing.toml");
    }
}
