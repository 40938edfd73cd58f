//! Routes for tool submissions and advertising requests.

use axum::{
    Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::post,
};
use serde::Serialize;
use serde_json::{Map, Value};
use services::services::forms::FormKind;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{deployment::Deployment, error::ApiError};

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub submission_id: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisingReceipt {
    pub request_id: String,
}

fn read_form(
    form: FormKind,
    payload: Result<ResponseJson<Value>, JsonRejection>,
) -> Result<Map<String, Value>, ApiError> {
    match payload {
        Ok(ResponseJson(Value::Object(fields))) => Ok(fields),
        // Valid JSON that is not an object carries no fields, so every
        // required field is reported missing.
        Ok(ResponseJson(_)) => Ok(Map::new()),
        Err(rejection) => Err(ApiError::FormBody {
            form,
            reason: rejection.body_text(),
        }),
    }
}

/// POST /api/submit
pub async fn submit_tool(
    payload: Result<ResponseJson<Value>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<SubmissionReceipt>>), ApiError> {
    let form = FormKind::ToolSubmission;
    let fields = read_form(form, payload)?;
    let receipt = form.accept(&fields).map_err(ApiError::MissingFields)?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(form.accepted_message()).with_data(SubmissionReceipt {
            submission_id: receipt.reference,
        })),
    ))
}

/// POST /api/advertise
pub async fn request_advertising(
    payload: Result<ResponseJson<Value>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<AdvertisingReceipt>>), ApiError> {
    let form = FormKind::AdvertisingRequest;
    let fields = read_form(form, payload)?;
    let receipt = form.accept(&fields).map_err(ApiError::MissingFields)?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(form.accepted_message()).with_data(AdvertisingReceipt {
            request_id: receipt.reference,
        })),
    ))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/submit", post(submit_tool))
        .route("/advertise", post(request_advertising))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{post_json, post_raw, test_app};

    #[tokio::test]
    async fn accepts_complete_submission() {
        let app = test_app(vec![], vec![]).await;

        let (status, body) = post_json(
            app,
            "/api/submit",
            json!({
                "toolName": "Claude",
                "websiteUrl": "https://claude.ai",
                "description": "A helpful assistant",
                "shortDescription": "Assistant",
                "category": "Foundational AI",
                "pricingModel": "Freemium",
                "submitterName": "Ada",
                "submitterEmail": "ada@example.com"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["message"],
            "Tool submitted successfully! Our team will review it shortly."
        );
        assert!(body["submissionId"].as_str().unwrap().starts_with("SUB-"));
    }

    #[tokio::test]
    async fn lists_missing_fields_in_order() {
        let app = test_app(vec![], vec![]).await;

        let (status, body) = post_json(
            app,
            "/api/advertise",
            json!({ "companyName": "Acme", "email": "", "budget": 0, "website": "https://acme.test" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Missing required fields: contactName, email, toolDescription, budget, timeframe"
            })
        );
    }

    #[tokio::test]
    async fn accepts_complete_advertising_request() {
        let app = test_app(vec![], vec![]).await;

        let (status, body) = post_json(
            app,
            "/api/advertise",
            json!({
                "companyName": "Acme",
                "contactName": "Wile",
                "email": "wile@acme.test",
                "website": "https://acme.test",
                "toolDescription": "Rockets",
                "budget": "$5k",
                "timeframe": "Q3"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body["message"],
            "Advertising request received! Our team will contact you shortly."
        );
        assert!(body["requestId"].as_str().unwrap().starts_with("ADV-"));
    }

    #[tokio::test]
    async fn non_object_body_reports_every_field_missing() {
        let app = test_app(vec![], vec![]).await;

        let (status, body) = post_json(app.clone(), "/api/submit", json!([])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Missing required fields: toolName, websiteUrl, description, shortDescription, category, pricingModel, submitterName, submitterEmail"
            })
        );

        let (status, body) = post_json(app, "/api/advertise", json!("Acme")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Missing required fields: companyName, contactName, email, website, toolDescription, budget, timeframe"
        );
    }

    #[tokio::test]
    async fn unreadable_body_is_a_server_error() {
        let app = test_app(vec![], vec![]).await;

        let (status, body) = post_raw(app, "/api/submit", "toolName=Claude").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "success": false, "message": "An error occurred while processing your submission." })
        );
    }
}
