use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::blog_post::BlogPost;

use crate::deployment::Deployment;

/// GET /api/blog-posts
pub async fn latest_posts(State(deployment): State<Deployment>) -> ResponseJson<Vec<BlogPost>> {
    ResponseJson(deployment.blog().latest_posts().await)
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new().route("/blog-posts", get(latest_posts))
}
