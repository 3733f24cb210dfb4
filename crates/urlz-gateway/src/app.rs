use crate::handlers::{
    create_url_handler, delete_url_handler, health_handler, redirect_handler, update_url_handler,
};
use crate::middleware::require_internal_secret;
use crate::state::AppState;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Builds the full HTTP surface.
///
/// Every route except `/health` sits under the configured base path. The
/// mutating routes additionally require the internal secret.
pub fn router(state: AppState) -> Router {
    let internal_only = middleware::from_fn_with_state(state.clone(), require_internal_secret);
    let config = state.config();

    Router::new()
        .route("/health", get(health_handler))
        .route(
            &config.collection_route(),
            post(create_url_handler).route_layer(internal_only.clone()),
        )
        .route(
            &config.item_route(),
            get(redirect_handler).merge(
                put(update_url_handler)
                    .delete(delete_url_handler)
                    .route_layer(internal_only),
            ),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
