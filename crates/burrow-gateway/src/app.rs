use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_url_handler, delete_url_handler, health_handler, list_urls_handler,
    mapping_analytics_handler, owner_analytics_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/v1/urls", post(create_url_handler).get(list_urls_handler))
            .route("/v1/urls/{short_code}", axum::routing::delete(delete_url_handler))
            .route(
                "/v1/urls/{short_code}/analytics",
                get(mapping_analytics_handler),
            )
            .route("/v1/analytics", get(owner_analytics_handler))
            .route("/{short_code}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
