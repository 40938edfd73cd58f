//! Routes for the three newsletter signup flows.

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::post,
};
use db::models::subscriber::SubscriberList;
use serde::{Deserialize, Serialize};
use services::services::newsletter::SignupOutcome;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{deployment::Deployment, error::ApiError};

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct SubscribeRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct SubscribedEmail {
    pub email: String,
}

fn signup_request(
    list: SubscriberList,
    payload: Result<ResponseJson<SubscribeRequest>, JsonRejection>,
) -> Result<SubscribeRequest, ApiError> {
    payload
        .map(|ResponseJson(request)| request)
        .map_err(|rejection| ApiError::SignupBody {
            list,
            reason: rejection.body_text(),
        })
}

/// POST /api/subscribe
pub async fn subscribe(
    State(deployment): State<Deployment>,
    payload: Result<ResponseJson<SubscribeRequest>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse>, ApiError> {
    let list = SubscriberList::Website;
    let request = signup_request(list, payload)?;

    let outcome = deployment
        .newsletter()
        .subscribe(request.email.as_deref())
        .await
        .map_err(|e| ApiError::signup(list, e))?;

    Ok(ResponseJson(match outcome {
        SignupOutcome::Subscribed => ApiResponse::success("Thank you for subscribing to our newsletter!"),
        SignupOutcome::AlreadySubscribed => {
            ApiResponse::failure("This email is already subscribed to our newsletter")
        }
    }))
}

/// POST /api/newsletter
///
/// Duplicates get the same reply as new signups.
pub async fn join_newsletter(
    State(deployment): State<Deployment>,
    payload: Result<ResponseJson<SubscribeRequest>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse>, ApiError> {
    let list = SubscriberList::Newsletter;
    let request = signup_request(list, payload)?;

    deployment
        .newsletter()
        .join(request.email.as_deref())
        .await
        .map_err(|e| ApiError::signup(list, e))?;

    Ok(ResponseJson(ApiResponse::success("Thanks! You are on the list ✨")))
}

/// POST /api/subscribe-redis
pub async fn subscribe_toolcurator(
    State(deployment): State<Deployment>,
    payload: Result<ResponseJson<SubscribeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let list = SubscriberList::Toolcurator;
    let request = signup_request(list, payload)?;

    let outcome = deployment
        .newsletter()
        .subscribe_toolcurator(request.email.as_deref())
        .await
        .map_err(|e| ApiError::signup(list, e))?;

    Ok(match (outcome, request.email) {
        (SignupOutcome::Subscribed, Some(email)) => ResponseJson(
            ApiResponse::success("Thank you for subscribing!").with_data(SubscribedEmail { email }),
        )
        .into_response(),
        _ => ResponseJson(ApiResponse::failure("Email already subscribed")).into_response(),
    })
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/newsletter", post(join_newsletter))
        .route("/subscribe-redis", post(subscribe_toolcurator))
}
