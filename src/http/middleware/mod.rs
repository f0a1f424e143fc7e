//! Middleware installed on the shared application before any service runs.
//!
//! # Order (outermost first)
//! ```text
//! request id → trace → propagate request id
//!     → client address (trust proxy) → strip ETag
//!     → hardening headers → CORS
//!     → service middleware and routes, in mount order
//! ```

pub mod cors;
pub mod hardening;
pub mod proxy;

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::RuntimeConfig;
use crate::error::BootstrapError;
use crate::http::app::App;

pub use proxy::ClientAddr;

/// Mount the base middleware stack onto `app`.
pub fn install_base(app: &App, config: &RuntimeConfig) -> Result<(), BootstrapError> {
    app.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
    app.layer(TraceLayer::new_for_http());
    app.layer(PropagateRequestIdLayer::x_request_id());

    app.layer(axum::middleware::from_fn(proxy::resolve_client_addr));
    app.layer(axum::middleware::map_response(proxy::strip_etag));

    hardening::install_hardening(app, &config.hardening);

    let cors = cors::build_cors_layer(&config.cors)
        .map_err(|reason| BootstrapError::configuration("CORS", reason))?;
    app.layer(cors);

    Ok(())
}
