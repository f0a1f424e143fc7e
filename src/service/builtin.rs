//! Service modules shipped with the `service-host` binary.
//!
//! - `health`: `GET /health` with status, version and uptime
//! - `echo`: `GET /echo` describing the request as the server saw it

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::Request;
use axum::routing::get;
use axum::Json;
use serde::Serialize;

use crate::error::BoxError;
use crate::http::{App, ClientAddr};
use crate::service::module::{RuntimeContext, Service, ServiceModule};
use crate::service::registry::ServiceRegistry;

/// Registry with every built-in module.
pub fn registry() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry
        .register("health", ServiceModule::object(HealthService::default()))
        .register("echo", ServiceModule::function(echo_init));
    registry
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Liveness endpoint. Records its start time in `load`.
#[derive(Debug, Default)]
pub struct HealthService {
    started: Arc<OnceLock<Instant>>,
}

#[async_trait]
impl Service for HealthService {
    async fn load(&self) -> Result<(), BoxError> {
        self.started.get_or_init(Instant::now);
        Ok(())
    }

    async fn init(&self, app: App, _ctx: RuntimeContext) -> Result<(), BoxError> {
        let started = self.started.clone();
        app.route(
            "/health",
            get(move || async move {
                let uptime_secs = started.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
                Json(HealthStatus {
                    status: "ok",
                    version: env!("CARGO_PKG_VERSION"),
                    uptime_secs,
                })
            }),
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "health"
    }
}

#[derive(Serialize)]
pub struct EchoResponse {
    pub method: String,
    pub path: String,
    pub client: Option<String>,
    pub request_id: Option<String>,
    pub port: u16,
}

async fn echo_init(app: App, ctx: RuntimeContext) -> Result<(), BoxError> {
    let port = ctx.port;
    app.route(
        "/echo",
        get(move |req: Request| async move {
            Json(EchoResponse {
                method: req.method().to_string(),
                path: req.uri().path().to_string(),
                client: req.extensions().get::<ClientAddr>().map(|c| c.0.to_string()),
                request_id: req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from),
                port,
            })
        }),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ServerHandle;
    use axum::body::Body;
    use tower::ServiceExt;

    #[test]
    fn test_registry_names() {
        let names: Vec<_> = registry().names().map(String::from).collect();
        assert_eq!(names, ["echo", "health"]);
    }

    #[tokio::test]
    async fn test_health_route() {
        let service = HealthService::default();
        service.load().await.unwrap();

        let app = App::new();
        let ctx = RuntimeContext {
            server: ServerHandle::new(),
            port: 8100,
            hostname: "127.0.0.1".into(),
        };
        service.init(app.clone(), ctx).await.unwrap();

        let response = app
            .into_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
