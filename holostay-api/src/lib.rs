use axum::{
    http::{HeaderName, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod state;
pub mod middleware;
pub mod rooms;
pub mod bookings;
pub mod checkout;
pub mod webhooks;
pub mod profile;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static(holostay_checkout::signature::SIGNATURE_HEADER),
        ]);

    // Routes that only make sense for a signed-in user
    let private = Router::new()
        .merge(bookings::routes())
        .merge(profile::routes())
        .route_layer(axum::middleware::from_fn(middleware::require_identity_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(rooms::routes())
        .merge(checkout::routes())
        .merge(webhooks::routes())
        .merge(private)
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::identity_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
