use axum::Router;

use crate::deployment::Deployment;

pub mod blog;
pub mod chat;
pub mod forms;
pub mod newsletter;
pub mod tools;

/// Every `/api` route.
pub fn router(deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .merge(tools::router(deployment))
        .merge(newsletter::router(deployment))
        .merge(forms::router(deployment))
        .merge(blog::router(deployment))
        .merge(chat::router(deployment))
}
