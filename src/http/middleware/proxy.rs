//! Behaviour for running behind a reverse proxy.
//!
//! - The client address is taken from the leftmost `X-Forwarded-For` entry,
//!   falling back to the peer address of the connection
//! - Entity tags are stripped from responses so caches revalidate by time only

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

/// Header carrying the original client address.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolved client address, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub IpAddr);

/// Middleware inserting [`ClientAddr`] into request extensions.
pub async fn resolve_client_addr(mut req: Request, next: Next) -> Response {
    let forwarded = req
        .headers()
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(first_forwarded);

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = forwarded.or(peer) {
        req.extensions_mut().insert(ClientAddr(ip));
    }

    next.run(req).await
}

/// Response mapper removing the `ETag` header.
pub async fn strip_etag(mut response: Response) -> Response {
    response.headers_mut().remove(header::ETAG);
    response
}

fn first_forwarded(value: &str) -> Option<IpAddr> {
    value.split(',').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::app::App;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let app = App::new();
        app.layer(axum::middleware::from_fn(resolve_client_addr));
        app.layer(axum::middleware::map_response(strip_etag));
        app.route(
            "/ip",
            get(|req: Request| async move {
                let client = req
                    .extensions()
                    .get::<ClientAddr>()
                    .map(|c| c.0.to_string())
                    .unwrap_or_default();
                ([(header::ETAG, "\"abc\"")], client)
            }),
        );
        app.into_router()
    }

    #[test]
    fn test_first_forwarded() {
        assert_eq!(
            first_forwarded("203.0.113.7, 10.0.0.1"),
            Some("203.0.113.7".parse().unwrap())
        );
        assert_eq!(first_forwarded("unknown"), None);
    }

    #[tokio::test]
    async fn test_forwarded_for_wins() {
        let mut req = Request::builder()
            .uri("/ip")
            .header(X_FORWARDED_FOR, "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("10.0.0.1:5000".parse().unwrap()));

        let response = app().oneshot(req).await.unwrap();
        assert!(response.headers().get(header::ETAG).is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"203.0.113.7");
    }

    #[tokio::test]
    async fn test_falls_back_to_peer() {
        let mut req = Request::builder().uri("/ip").body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("192.0.2.1:5000".parse().unwrap()));

        let response = app().oneshot(req).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"192.0.2.1");
    }
}
