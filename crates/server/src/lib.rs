use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod deployment;
pub mod error;
pub mod routes;

use deployment::Deployment;

pub fn app(deployment: Deployment) -> Router {
    Router::new()
        .nest("/api", routes::router(&deployment))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(deployment)
}
