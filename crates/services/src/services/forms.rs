//! Tool submission and advertising request intake.
//!
//! Neither form is persisted; a valid form is logged and acknowledged with a
//! time-based reference.

use chrono::Utc;
use serde_json::{Map, Value};
use strum_macros::{Display, EnumString};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FormKind {
    ToolSubmission,
    AdvertisingRequest,
}

impl FormKind {
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            FormKind::ToolSubmission => &[
                "toolName",
                "websiteUrl",
                "description",
                "shortDescription",
                "category",
                "pricingModel",
                "submitterName",
                "submitterEmail",
            ],
            FormKind::AdvertisingRequest => &[
                "companyName",
                "contactName",
                "email",
                "website",
                "toolDescription",
                "budget",
                "timeframe",
            ],
        }
    }

    pub fn accepted_message(self) -> &'static str {
        match self {
            FormKind::ToolSubmission => "Tool submitted successfully! Our team will review it shortly.",
            FormKind::AdvertisingRequest => {
                "Advertising request received! Our team will contact you shortly."
            }
        }
    }

    /// Shown when the form could not be processed at all.
    pub fn error_message(self) -> &'static str {
        match self {
            FormKind::ToolSubmission => "An error occurred while processing your submission.",
            FormKind::AdvertisingRequest => "An error occurred while processing your request.",
        }
    }

    fn reference_prefix(self) -> &'static str {
        match self {
            FormKind::ToolSubmission => "SUB",
            FormKind::AdvertisingRequest => "ADV",
        }
    }

    /// Required fields that are absent or falsy, in declaration order.
    pub fn missing_fields(self, form: &Map<String, Value>) -> Vec<&'static str> {
        self.required_fields()
            .iter()
            .copied()
            .filter(|field| form.get(*field).is_none_or(is_falsy))
            .collect()
    }

    /// Validate a form and hand back its reference on success.
    pub fn accept(self, form: &Map<String, Value>) -> Result<FormReceipt, Vec<&'static str>> {
        let missing = self.missing_fields(form);
        if !missing.is_empty() {
            return Err(missing);
        }

        let receipt = FormReceipt::issue(self);
        info!(form = %self, reference = %receipt.reference, fields = form.len(), "Form received");
        Ok(receipt)
    }
}

/// Null, `false`, zero and the empty string count as not provided.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|n| n == 0.0 || n.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormReceipt {
    pub kind: FormKind,
    pub reference: String,
}

impl FormReceipt {
    fn issue(kind: FormKind) -> Self {
        Self {
            kind,
            reference: format!("{}-{}", kind.reference_prefix(), Utc::now().timestamp_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn complete_submission_is_accepted() {
        let submission = form(json!({
            "toolName": "Claude",
            "websiteUrl": "https://claude.ai",
            "description": "Assistant",
            "shortDescription": "AI assistant",
            "category": "Foundational AI",
            "pricingModel": "Freemium",
            "submitterName": "Ada",
            "submitterEmail": "ada@example.com",
            "extra": "ignored"
        }));

        let receipt = FormKind::ToolSubmission.accept(&submission).unwrap();
        assert!(receipt.reference.starts_with("SUB-"));
        assert!(receipt.reference[4..].parse::<i64>().is_ok());
    }

    #[test]
    fn falsy_values_count_as_missing() {
        let request = form(json!({
            "companyName": "Acme",
            "contactName": "",
            "email": null,
            "website": "https://acme.test",
            "toolDescription": false,
            "budget": 0,
        }));

        assert_eq!(
            FormKind::AdvertisingRequest.missing_fields(&request),
            vec!["contactName", "email", "toolDescription", "budget", "timeframe"]
        );
    }

    #[test]
    fn non_empty_values_of_any_type_are_present() {
        let request = form(json!({
            "companyName": "Acme",
            "contactName": "Wile",
            "email": "wile@acme.test",
            "website": "https://acme.test",
            "toolDescription": ["rockets"],
            "budget": 5000,
            "timeframe": true,
        }));

        let receipt = FormKind::AdvertisingRequest.accept(&request).unwrap();
        assert_eq!(receipt.kind, FormKind::AdvertisingRequest);
        assert!(receipt.reference.starts_with("ADV-"));
    }

    #[test]
    fn empty_form_reports_every_field() {
        let missing = FormKind::ToolSubmission.accept(&Map::new()).unwrap_err();
        assert_eq!(missing, FormKind::ToolSubmission.required_fields());
    }
}
