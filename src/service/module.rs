//! Service shapes and their normalised, loaded form.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::config::DeclaredConfig;
use crate::error::{BootstrapError, BoxError, HookPhase};
use crate::http::{App, ServerHandle};

/// What a service's initializer gets besides the app.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Handle to the shared listener.
    pub server: ServerHandle,
    pub port: u16,
    /// Empty when bound to all interfaces.
    pub hostname: String,
}

/// A service with an initializer, an optional pre-init hook and declared
/// configuration.
#[async_trait]
pub trait Service: Send + Sync {
    /// Mount routes and middleware onto the shared app.
    async fn init(&self, app: App, ctx: RuntimeContext) -> Result<(), BoxError>;

    /// Warm caches or load data. Runs before any service's `init`.
    async fn load(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Configuration this service declares. Only the first service's
    /// declarations are used.
    fn declared(&self) -> DeclaredConfig {
        DeclaredConfig::default()
    }

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// An initializer function.
pub type InitFn =
    Arc<dyn Fn(App, RuntimeContext) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// A service module: either a bare initializer or a full service object.
#[derive(Clone)]
pub enum ServiceModule {
    Function(InitFn),
    Object(Arc<dyn Service>),
}

impl ServiceModule {
    /// Wrap an async initializer function.
    pub fn function<F, Fut>(f: F) -> Self
    where
        F: Fn(App, RuntimeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        ServiceModule::Function(Arc::new(move |app: App, ctx: RuntimeContext| {
            f(app, ctx).boxed()
        }))
    }

    /// Wrap a service object.
    pub fn object<S: Service + 'static>(service: S) -> Self {
        ServiceModule::Object(Arc::new(service))
    }

    pub fn declared(&self) -> DeclaredConfig {
        match self {
            ServiceModule::Function(_) => DeclaredConfig::default(),
            ServiceModule::Object(service) => service.declared(),
        }
    }
}

impl fmt::Debug for ServiceModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceModule::Function(_) => f.write_str("ServiceModule::Function"),
            ServiceModule::Object(service) => write!(f, "ServiceModule::Object({})", service.name()),
        }
    }
}

/// A resolved service, ready to be loaded and initialised.
#[derive(Debug, Clone)]
pub struct LoadedService {
    name: String,
    module: ServiceModule,
    declared: DeclaredConfig,
}

impl LoadedService {
    pub fn new(name: impl Into<String>, module: ServiceModule, declared: DeclaredConfig) -> Self {
        Self {
            name: name.into(),
            module,
            declared,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &ServiceModule {
        &self.module
    }

    pub fn declared(&self) -> &DeclaredConfig {
        &self.declared
    }

    /// Whether the module has a pre-init hook.
    pub fn has_load_hook(&self) -> bool {
        matches!(self.module, ServiceModule::Object(_))
    }

    /// Run the pre-init hook, if any.
    pub async fn load(&self) -> Result<(), BootstrapError> {
        match &self.module {
            ServiceModule::Function(_) => Ok(()),
            ServiceModule::Object(service) => service
                .load()
                .await
                .map_err(|source| self.hook_error(HookPhase::Load, source)),
        }
    }

    /// Run the initializer.
    pub async fn init(&self, app: App, ctx: RuntimeContext) -> Result<(), BootstrapError> {
        let result = match &self.module {
            ServiceModule::Function(init) => init(app, ctx).await,
            ServiceModule::Object(service) => service.init(app, ctx).await,
        };
        result.map_err(|source| self.hook_error(HookPhase::Init, source))
    }

    fn hook_error(&self, phase: HookPhase, source: BoxError) -> BootstrapError {
        BootstrapError::ServiceInit {
            service: self.name.clone(),
            phase,
            source,
        }
    }
}
