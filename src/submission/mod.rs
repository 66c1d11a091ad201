//! Verification endpoint client
//!
//! One POST per submission, image as multipart form data, no retry. Every
//! failure is mapped to a [`SubmissionError`] whose display text is the
//! message shown to the user.

pub mod http;

pub use http::HttpSubmitter;

use crate::errors::SubmissionError;
use crate::types::{Frame, OcrFields, Verdict, VerificationResult};
use async_trait::async_trait;
use serde::Deserialize;

#[async_trait]
pub trait Submitter: Send + Sync {
    /// Send `frame` once and interpret the reply.
    async fn submit(&self, frame: &Frame) -> Result<VerificationResult, SubmissionError>;
}

const FALLBACK_REJECTION: &str = "Could not process the image";

#[derive(Debug, Deserialize)]
struct SuccessBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<OcrFields>,
    #[serde(rename = "verificationStatus", default)]
    verification_status: Option<Verdict>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// Map an HTTP status and body to the submission outcome.
///
/// `reason` is the status line's reason phrase, used when an error body
/// carries no message of its own.
pub fn interpret_response(
    status: u16,
    reason: Option<&str>,
    body: &str,
) -> Result<VerificationResult, SubmissionError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| non_empty(b.error))
            .unwrap_or_else(|| match reason {
                Some(reason) => format!("Server error: {}", reason),
                None => format!("Server error: HTTP {}", status),
            });
        return Err(SubmissionError::Http { status, message });
    }

    let parsed: SuccessBody =
        serde_json::from_str(body).map_err(|e| SubmissionError::Malformed(e.to_string()))?;

    if !parsed.success {
        return Err(SubmissionError::Rejected(
            non_empty(parsed.error).unwrap_or_else(|| FALLBACK_REJECTION.to_string()),
        ));
    }

    let verdict = parsed.verification_status.ok_or_else(|| {
        SubmissionError::Malformed("missing verificationStatus".to_string())
    })?;

    Ok(VerificationResult {
        fields: parsed.data.unwrap_or_default(),
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_pass() {
        let body = r#"{
            "success": true,
            "data": {"identification_number": "1101700203451", "name_en": "Somchai Jaidee"},
            "verificationStatus": "pass"
        }"#;
        let result = interpret_response(200, Some("OK"), body).unwrap();
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.fields.identification_number.as_deref(), Some("1101700203451"));
        assert_eq!(result.fields.name_th, None);
    }

    #[test]
    fn test_success_fail_verdict_keeps_fields() {
        let body = r#"{"success": true, "data": {"raw_text": "blurred"}, "verificationStatus": "fail"}"#;
        let result = interpret_response(200, Some("OK"), body).unwrap();
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.fields.raw_text.as_deref(), Some("blurred"));
    }

    #[test]
    fn test_http_error_prefers_body_message() {
        let result = interpret_response(422, Some("Unprocessable Entity"), r#"{"error": "No card detected"}"#);
        assert_eq!(
            result,
            Err(SubmissionError::Http {
                status: 422,
                message: "No card detected".to_string()
            })
        );
    }

    #[test]
    fn test_http_error_falls_back_to_reason() {
        let result = interpret_response(500, Some("Internal Server Error"), "<html>oops</html>");
        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "Server error: Internal Server Error");

        let result = interpret_response(599, None, "");
        assert_eq!(result.unwrap_err().to_string(), "Server error: HTTP 599");
    }

    #[test]
    fn test_rejected_payload() {
        let result = interpret_response(200, Some("OK"), r#"{"success": false, "error": "Unsupported file"}"#);
        assert_eq!(result, Err(SubmissionError::Rejected("Unsupported file".to_string())));

        let result = interpret_response(200, Some("OK"), r#"{"success": false}"#);
        assert_eq!(result, Err(SubmissionError::Rejected(FALLBACK_REJECTION.to_string())));
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            interpret_response(200, Some("OK"), "not json"),
            Err(SubmissionError::Malformed(_))
        ));
        assert!(matches!(
            interpret_response(200, Some("OK"), r#"{"success": true, "data": {}}"#),
            Err(SubmissionError::Malformed(_))
        ));
        assert!(matches!(
            interpret_response(200, Some("OK"), r#"{"success": true, "verificationStatus": "maybe"}"#),
            Err(SubmissionError::Malformed(_))
        ));
    }
}
