use crate::infrastructure::state::AppState;
use crate::presentation::handlers::{auth, mobile_auth};
use axum::{
    Router,
    routing::{get, post},
};

/// Auth routes, cookie-based and mobile
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh_token))
        .route("/logout", post(auth::logout))
        .route("/logout-all", post(auth::logout_all))
        .route("/signup", post(auth::signup))
        .route("/me", get(auth::me))
        .route("/mobile/oauth2/google", post(mobile_auth::google_login))
        .route("/mobile/refresh", post(mobile_auth::refresh))
}
