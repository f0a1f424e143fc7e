//! Cross-origin resource sharing.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer, ExposeHeaders};

use crate::config::schema::CorsOptions;

/// Build a CORS layer from options.
///
/// Returns a description of the first invalid setting instead of a layer.
/// Combinations the layer would reject at request time are refused here.
pub fn build_cors_layer(options: &CorsOptions) -> Result<CorsLayer, String> {
    let mut layer = CorsLayer::new();

    layer = match &options.origin {
        None => {
            if options.credentials {
                return Err("credentials cannot be allowed for any origin".to_string());
            }
            layer.allow_origin(Any)
        }
        Some(origins) => {
            let origins = origins
                .iter()
                .map(|origin| {
                    if origin == "*" {
                        return Err("use no origin list to allow any origin".to_string());
                    }
                    HeaderValue::from_str(origin).map_err(|_| format!("invalid origin {:?}", origin))
                })
                .collect::<Result<Vec<_>, _>>()?;
            layer.allow_origin(AllowOrigin::list(origins))
        }
    };

    let methods = options
        .methods
        .iter()
        .map(|m| {
            Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| format!("invalid method {:?}", m))
        })
        .collect::<Result<Vec<_>, _>>()?;
    layer = layer.allow_methods(AllowMethods::list(methods));

    layer = match &options.allowed_headers {
        None => layer.allow_headers(AllowHeaders::mirror_request()),
        Some(names) => layer.allow_headers(AllowHeaders::list(parse_header_names(names)?)),
    };

    if !options.exposed_headers.is_empty() {
        layer = layer.expose_headers(ExposeHeaders::list(parse_header_names(
            &options.exposed_headers,
        )?));
    }

    if options.credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(secs) = options.max_age_secs {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Ok(layer)
}

fn parse_header_names(names: &[String]) -> Result<Vec<HeaderName>, String> {
    names
        .iter()
        .map(|name| {
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| format!("invalid header {:?}", name))
        })
        .collect()
}
