//! Response hardening headers.
//!
//! Each enabled protection is mounted as its own layer. Headers are only set
//! when the handler did not set them, so a service can still choose its own
//! caching policy for a route.

use axum::http::header::{self, HeaderName};
use axum::http::HeaderValue;
use axum::response::Response;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::schema::{FrameOptions, HardeningOptions};
use crate::http::app::App;

const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");

/// Mount the hardening layers selected by `options` onto `app`.
pub fn install_hardening(app: &App, options: &HardeningOptions) {
    if options.hide_powered_by {
        app.layer(axum::middleware::map_response(strip_powered_by));
    }

    for (name, value) in hardening_headers(options) {
        app.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }

    tracing::debug!(
        hsts = options.hsts,
        no_cache = options.no_cache,
        "Hardening installed"
    );
}

/// Headers added to every response for the given options.
pub fn hardening_headers(options: &HardeningOptions) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = Vec::new();

    if options.dns_prefetch_control {
        headers.push((
            HeaderName::from_static("x-dns-prefetch-control"),
            HeaderValue::from_static("off"),
        ));
    }

    if let Some(frame) = options.frame_options {
        let value = match frame {
            FrameOptions::Deny => "DENY",
            FrameOptions::Sameorigin => "SAMEORIGIN",
        };
        headers.push((header::X_FRAME_OPTIONS, HeaderValue::from_static(value)));
    }

    if options.hsts {
        let value = format!("max-age={}; includeSubDomains", options.hsts_max_age_secs);
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.push((header::STRICT_TRANSPORT_SECURITY, value));
        }
    }

    if options.ie_no_open {
        headers.push((
            HeaderName::from_static("x-download-options"),
            HeaderValue::from_static("noopen"),
        ));
    }

    if options.no_sniff {
        headers.push((
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));
    }

    if options.xss_filter {
        headers.push((
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ));
    }

    if options.no_cache {
        headers.push((
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
        ));
        headers.push((header::PRAGMA, HeaderValue::from_static("no-cache")));
        headers.push((header::EXPIRES, HeaderValue::from_static("0")));
        headers.push((
            HeaderName::from_static("surrogate-control"),
            HeaderValue::from_static("no-store"),
        ));
    }

    headers
}

async fn strip_powered_by(mut response: Response) -> Response {
    response.headers_mut().remove(X_POWERED_BY);
    response
}
