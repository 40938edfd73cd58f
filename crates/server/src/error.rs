use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::subscriber::SubscriberList;
use serde::Serialize;
use services::services::{
    fan_data::FanDataError,
    forms::FormKind,
    newsletter::NewsletterError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{list} signup failed: {source}")]
    Signup {
        list: SubscriberList,
        #[source]
        source: NewsletterError,
    },
    #[error("unreadable {list} signup body: {reason}")]
    SignupBody { list: SubscriberList, reason: String },
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("unreadable {form} body: {reason}")]
    FormBody { form: FormKind, reason: String },
    #[error(transparent)]
    FanData(#[from] FanDataError),
    #[error("failed to process query: {0}")]
    Query(String),
}

impl ApiError {
    pub fn signup(list: SubscriberList, source: NewsletterError) -> Self {
        ApiError::Signup { list, source }
    }
}

/// Bare `{ error, details? }` body used by the footer signup and chat.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

fn signup_rejected(list: SubscriberList) -> Response {
    match list {
        SubscriberList::Website => {
            (StatusCode::BAD_REQUEST, Json(ErrorBody::new("Invalid email address"))).into_response()
        }
        SubscriberList::Newsletter => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failure("Please provide a valid email address")),
        )
            .into_response(),
        SubscriberList::Toolcurator => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error("Email is required"))).into_response()
        }
    }
}

fn signup_failed(list: SubscriberList, reason: String) -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    match list {
        SubscriberList::Website => (
            status,
            Json(ErrorBody {
                error: "Failed to subscribe".to_string(),
                details: Some("Please try again later".to_string()),
            }),
        )
            .into_response(),
        SubscriberList::Newsletter => (
            status,
            Json(ApiResponse::failure("Oops! Something went wrong. Try again later.")),
        )
            .into_response(),
        SubscriberList::Toolcurator => (status, Json(ApiResponse::error(reason))).into_response(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Signup {
                list,
                source: NewsletterError::InvalidEmail | NewsletterError::MissingEmail,
            } => signup_rejected(list),
            ApiError::Signup {
                list,
                source: NewsletterError::Database(e),
            } => {
                error!(%list, error = %e, "Subscription error");
                signup_failed(list, e.to_string())
            }
            ApiError::SignupBody { list, reason } => {
                error!(%list, %reason, "Subscription error");
                signup_failed(list, reason)
            }
            ApiError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::failure(format!(
                    "Missing required fields: {}",
                    fields.join(", ")
                ))),
            )
                .into_response(),
            ApiError::FormBody { form, reason } => {
                error!(%form, %reason, "Error processing form");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::failure(form.error_message())),
                )
                    .into_response()
            }
            ApiError::FanData(e @ FanDataError::NotFound(_)) => {
                error!(error = %e, "Fan data unavailable");
                (StatusCode::NOT_FOUND, Json(ErrorBody::new(e.to_string()))).into_response()
            }
            ApiError::FanData(e) => {
                error!(error = %e, "Error loading or parsing fan data");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(format!("Failed to load data file: {e}"))),
                )
                    .into_response()
            }
            ApiError::Query(reason) => {
                error!(%reason, "Error answering fan query");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(format!("Failed to process your query: {reason}"))),
                )
                    .into_response()
            }
        }
    }
}
