use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn, excerpt};
use reqwest::multipart::{Form, Part};

use crate::{AnalysisReply, FailureKind, SubmissionRequest, SubmitError};

pub const DEFAULT_ENDPOINT: &str = "https://openci-server.brilliantly.ai/heavy";

#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            // Analysis runs server-side before the reply is written.
            request_timeout: Duration::from_secs(300),
        }
    }
}

#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, request: SubmissionRequest) -> Result<AnalysisReply, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    settings: SubmitSettings,
    client: reqwest::Client,
}

impl ReqwestSubmitter {
    pub fn new(settings: SubmitSettings) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SubmitError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &SubmitSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl Submitter for ReqwestSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> Result<AnalysisReply, SubmitError> {
        let url = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| SubmitError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        engine_info!(
            "POST {} file={} bytes={} model={}",
            url,
            request.file_name,
            request.file_bytes.len(),
            request.model
        );
        let form = build_form(request)?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        engine_debug!("Reply body {} bytes", body.len());
        serde_json::from_slice(&body).map_err(|err| {
            engine_warn!(
                "Unparseable reply: {}",
                excerpt(&String::from_utf8_lossy(&body), 200)
            );
            SubmitError::new(FailureKind::MalformedReply, err.to_string())
        })
    }
}

fn build_form(request: SubmissionRequest) -> Result<Form, SubmitError> {
    let file = Part::bytes(request.file_bytes.to_vec())
        .file_name(request.file_name)
        .mime_str("text/csv")
        .map_err(|err| SubmitError::new(FailureKind::Network, err.to_string()))?;

    Ok(Form::new()
        .part("file", file)
        .text("columnData", request.column_data)
        .text("messages", request.messages)
        .text("model", request.model)
        .text("allowLogging", request.allow_logging.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::new(FailureKind::Timeout, err.to_string());
    }
    SubmitError::new(FailureKind::Network, err.to_string())
}
