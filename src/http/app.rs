//! The shared HTTP application services mount into.
//!
//! Axum applies a layer only to routes that already exist on a router. Services
//! expect the opposite: middleware mounted by an earlier service wraps routes
//! mounted by later services. `App` records mounts in order and folds them
//! from last to first, so each layer wraps everything mounted after it.
//!
//! Mounts are replayable: [`App::build`] can assemble the router any number of
//! times, which lets bootstrap check the route table after every service.

use std::any::Any;
use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::{MethodRouter, Route};
use axum::Router;
use tower::{Layer, Service};

type Mount = Arc<dyn Fn(Router) -> Router + Send + Sync>;

/// Handle to the shared application.
///
/// Cloning is cheap; all clones mount into the same application.
#[derive(Clone, Default)]
pub struct App {
    mounts: Arc<Mutex<Vec<Mount>>>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a route.
    pub fn route(&self, path: &str, method_router: MethodRouter) -> &Self {
        let path = path.to_string();
        self.push(move |router| router.route(&path, method_router.clone()))
    }

    /// Mount all routes of `other`.
    pub fn merge(&self, other: Router) -> &Self {
        self.push(move |router| router.merge(other.clone()))
    }

    /// Mount `other` under a path prefix.
    pub fn nest(&self, path: &str, other: Router) -> &Self {
        let path = path.to_string();
        self.push(move |router| router.nest(&path, other.clone()))
    }

    /// Mount a middleware layer wrapping every route mounted after it.
    pub fn layer<L>(&self, layer: L) -> &Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.push(move |router| router.layer(layer.clone()))
    }

    /// Number of mounts recorded so far.
    pub fn mount_count(&self) -> usize {
        self.lock().len()
    }

    /// Build the router from every mount recorded so far.
    ///
    /// Axum rejects overlapping or malformed routes by panicking; that panic
    /// is caught and its message returned instead.
    pub fn build(&self) -> Result<Router, String> {
        let mounts = self.lock().clone();
        panic::catch_unwind(AssertUnwindSafe(|| fold(&mounts))).map_err(panic_message)
    }

    /// Take every recorded mount and build the router.
    ///
    /// Leaves the application empty. Panics on conflicting routes, see
    /// [`App::build`] for the checked form.
    pub fn into_router(self) -> Router {
        let mounts = std::mem::take(&mut *self.lock());
        fold(&mounts)
    }

    fn push(&self, mount: impl Fn(Router) -> Router + Send + Sync + 'static) -> &Self {
        self.lock().push(Arc::new(mount));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Mount>> {
        // A poisoned lock only means a mount panicked; the list is still valid.
        self.mounts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn fold(mounts: &[Mount]) -> Router {
    mounts
        .iter()
        .rev()
        .fold(Router::new(), |router, mount| mount(router))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "invalid route table".to_string()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("mounts", &self.mount_count())
            .finish()
    }
}
