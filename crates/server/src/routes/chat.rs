//! The fan-data chat endpoint.

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json as ResponseJson,
    routing::post,
};
use serde::{Deserialize, Serialize};
use services::services::fan_insights;
use tracing::info;
use ts_rs::TS;

use crate::{deployment::Deployment, error::ApiError};

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct ChatRequest {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ChatResponse {
    pub answer: String,
}

/// POST /api/chat
pub async fn ask(
    State(deployment): State<Deployment>,
    payload: Result<ResponseJson<ChatRequest>, JsonRejection>,
) -> Result<ResponseJson<ChatResponse>, ApiError> {
    let ResponseJson(request) = payload.map_err(|rejection| ApiError::Query(rejection.body_text()))?;
    info!(query = ?request.query, "Query received");

    let records = deployment.fan_data().records().await?;
    let query = request
        .query
        .ok_or_else(|| ApiError::Query("query must be a string".to_string()))?;

    let answer = fan_insights::answer(&query, &records);
    Ok(ResponseJson(ChatResponse { answer }))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new().route("/chat", post(ask))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use axum::http::StatusCode;
    use serde_json::json;
    use services::services::{
        fan_data::{FanDataset, FanRecord},
        fan_insights::HELP_TEXT,
    };

    use crate::test_support::{post_json, test_app, test_app_with_fan_data};

    fn fan(community: &str, merchant: &str) -> FanRecord {
        FanRecord {
            community: Some(community.to_string()),
            primary_merchant: Some(merchant.to_string()),
            primary_spend: Some(10.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn answers_league_questions() {
        let app = test_app(vec![], vec![fan("NBA", "netflix"), fan("WNBA", "hulu"), fan("NFL", "espn_plus")]).await;

        let (status, body) = post_json(app, "/api/chat", json!({ "query": "How many WNBA fans are there?" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "answer": "There are 1 WNBA fans in the dataset, representing 33.3% of all fans." })
        );
    }

    #[tokio::test]
    async fn unmatched_question_gets_help_text() {
        let app = test_app(vec![], vec![fan("NBA", "netflix")]).await;

        let (status, body) = post_json(app, "/api/chat", json!({ "query": "hello there" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], HELP_TEXT);
    }

    #[tokio::test]
    async fn missing_query_is_a_server_error() {
        let app = test_app(vec![], vec![fan("NBA", "netflix")]).await;

        let (status, body) = post_json(app, "/api/chat", json!({})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "Failed to process your query: query must be a string" })
        );
    }

    #[tokio::test]
    async fn missing_csv_is_not_found() {
        let app = test_app_with_fan_data(FanDataset::new("/nonexistent/fans.csv")).await;

        let (status, body) = post_json(app, "/api/chat", json!({ "query": "hello" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "CSV file not found at: /nonexistent/fans.csv" }));
    }

    #[tokio::test]
    async fn malformed_csv_fails_to_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"COMMUNITY,\xff\xfe\nNBA,netflix\n").unwrap();
        let app = test_app_with_fan_data(FanDataset::new(file.path())).await;

        let (status, body) = post_json(app, "/api/chat", json!({ "query": "hello" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to load data file: ")
        );
    }
}
