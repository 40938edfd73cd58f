//! Routes for the tool directory.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::tool::{CategoryCount, Tool};
use services::services::tool_catalog::ToolQuery;
use tracing::debug;

use crate::deployment::Deployment;

/// GET /api/tools?type=&sector=&group=
pub async fn list_tools(
    State(deployment): State<Deployment>,
    Query(query): Query<ToolQuery>,
) -> ResponseJson<Vec<Tool>> {
    debug!(?query, "Listing tools");
    ResponseJson(deployment.tools().filter(&query))
}

/// GET /api/categories
pub async fn list_categories(State(deployment): State<Deployment>) -> ResponseJson<Vec<CategoryCount>> {
    ResponseJson(deployment.tools().category_counts())
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/categories", get(list_categories))
}
