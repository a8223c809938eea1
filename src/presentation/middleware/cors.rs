use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

/// Any origin when the list is empty. Credentials are only allowed for an
/// explicit list, since browsers refuse them with a wildcard origin.
pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    if allowed_origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
        .allow_credentials(true))
}
