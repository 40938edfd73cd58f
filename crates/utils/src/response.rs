use serde::Serialize;

/// JSON envelope shared by the form and signup endpoints.
///
/// Serialises to `{ "success": bool, "message"?: string, "error"?: string, ...data }`,
/// where the fields of `data` are flattened into the top-level object.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T = ()> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    data: Option<T>,
}

impl ApiResponse<()> {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            data: None,
        }
    }

    /// A handled failure, reported through `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            error: None,
            data: None,
        }
    }

    /// A failure reported through `error`.
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            data: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn with_data<U>(self, data: U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            message: self.message,
            error: self.error,
            data: Some(data),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Receipt {
        submission_id: String,
    }

    #[test]
    fn success_omits_error_field() {
        let value = serde_json::to_value(ApiResponse::success("ok")).unwrap();
        assert_eq!(value, json!({ "success": true, "message": "ok" }));
    }

    #[test]
    fn error_omits_message_field() {
        let value = serde_json::to_value(ApiResponse::error("Email is required")).unwrap();
        assert_eq!(value, json!({ "success": false, "error": "Email is required" }));
    }

    #[test]
    fn data_is_flattened() {
        let response = ApiResponse::success("Tool submitted").with_data(Receipt {
            submission_id: "SUB-1".to_string(),
        });
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(
            value,
            json!({ "success": true, "message": "Tool submitted", "submissionId": "SUB-1" })
        );
    }
}
