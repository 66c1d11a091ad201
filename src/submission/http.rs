use super::{interpret_response, Submitter};
use crate::config::SubmissionConfig;
use crate::errors::SubmissionError;
use crate::types::{Frame, VerificationResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

/// Posts frames to the OCR/verification endpoint with reqwest.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
    field_name: String,
    file_stem: String,
}

impl HttpSubmitter {
    pub fn new(config: &SubmissionConfig) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SubmissionError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            field_name: config.field_name.clone(),
            file_stem: config.file_stem.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form_for(&self, frame: &Frame) -> Result<Form, SubmissionError> {
        let part = Part::stream_with_length(frame.data.clone(), frame.size_bytes() as u64)
            .file_name(format!("{}.{}", self.file_stem, frame.extension()))
            .mime_str(&frame.mime_type)
            .map_err(|e| SubmissionError::InvalidRequest(e.to_string()))?;

        Ok(Form::new().part(self.field_name.clone(), part))
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, frame: &Frame) -> Result<VerificationResult, SubmissionError> {
        let form = self.form_for(frame)?;
        log::info!(
            "Submitting {} bytes ({}) to {}",
            frame.size_bytes(),
            frame.mime_type,
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let outcome = interpret_response(status.as_u16(), status.canonical_reason(), &body);
        match &outcome {
            Ok(result) => log::info!("Verification finished: {:?}", result.verdict),
            Err(e) => log::warn!("Verification failed ({}): {}", status, e),
        }
        outcome
    }
}
