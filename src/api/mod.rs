mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Countries
        .route("/countries", get(handlers::list_countries))
        .route("/countries", post(handlers::create_country))
        .route("/countries/{id}", get(handlers::get_country))
        .route("/countries/{id}", put(handlers::update_country))
        .route("/countries/{id}", delete(handlers::delete_country))
        .route("/countries/{id}/holders", get(handlers::get_holders))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}
