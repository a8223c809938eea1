use crate::infrastructure::config::AppConfig;
use crate::infrastructure::state::AppState;
use crate::presentation::handlers;
use crate::presentation::middleware::{cors::cors_layer, rate_limit::rate_limit_layer};
use crate::presentation::openapi::ApiDoc;
use crate::presentation::routes;
use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// HTTP-level settings the router needs
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit_per_minute: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            cors_allowed_origins: Vec::new(),
            rate_limit_per_minute: 60,
        }
    }
}

impl From<&AppConfig> for HttpSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            cors_allowed_origins: config.cors_allowed_origins.clone(),
            rate_limit_per_minute: config.rate_limit_per_minute,
        }
    }
}

/// Build the application router. The `/api/v1` routes are rate limited per IP.
pub fn app(state: AppState, settings: &HttpSettings) -> anyhow::Result<Router> {
    let api = Router::new()
        .nest("/auth", routes::auth::routes())
        .nest("/email-verification", routes::email_verification::routes())
        .nest("/password-recovery", routes::password_recovery::routes())
        .layer(rate_limit_layer(settings.rate_limit_per_minute)?);

    Ok(Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api)
        .layer(cors_layer(&settings.cors_allowed_origins)?)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
