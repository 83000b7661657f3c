use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::types::{
    AnalysisParams, MarkovRequest, MarkovResult, MetropolisRequest, MetropolisResult,
    SweepParams, SweepPoint, TopicAnalysis,
};

const ANALYZE_TOPICS: &str = "api/topics/analyze";
const SWEEP_TOPICS: &str = "api/topics/sweep";
const GENERATE_MARKOV: &str = "api/markov/generate";
const RUN_METROPOLIS: &str = "api/metropolis/run";

/// A document picked by the user, read fully into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    fn part(&self) -> Part {
        Part::bytes(self.bytes.clone()).file_name(self.file_name.clone())
    }
}

/// Thin HTTP client for the numeric service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NumericClient {
    base_url: String,
    http: reqwest::Client,
}

impl NumericClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn analyze_topics(
        &self,
        upload: &Upload,
        params: &AnalysisParams,
    ) -> Result<TopicAnalysis, ApiError> {
        let form = multipart_form(upload, params.form_fields());
        let url = self.endpoint(ANALYZE_TOPICS);
        debug!(%url, k = params.k, "posting topic analysis");
        let response = self.http.post(&url).multipart(form).send().await?;
        finish(&url, response).await
    }

    pub async fn sweep_topics(
        &self,
        upload: &Upload,
        params: &SweepParams,
    ) -> Result<Vec<SweepPoint>, ApiError> {
        let form = multipart_form(upload, params.form_fields());
        let url = self.endpoint(SWEEP_TOPICS);
        debug!(%url, start = params.start, "posting topic sweep");
        let response = self.http.post(&url).multipart(form).send().await?;
        finish(&url, response).await
    }

    pub async fn generate_markov(
        &self,
        request: &MarkovRequest,
    ) -> Result<MarkovResult, ApiError> {
        let url = self.endpoint(GENERATE_MARKOV);
        debug!(%url, words = request.word_count, "posting markov generation");
        let response = self.http.post(&url).json(request).send().await?;
        finish(&url, response).await
    }

    pub async fn run_metropolis(
        &self,
        request: &MetropolisRequest,
    ) -> Result<MetropolisResult, ApiError> {
        let url = self.endpoint(RUN_METROPOLIS);
        debug!(
            %url,
            distribution = request.distribution.kind(),
            iterations = request.iterations,
            "posting metropolis run"
        );
        let response = self.http.post(&url).json(request).send().await?;
        finish(&url, response).await
    }
}

fn multipart_form(upload: &Upload, fields: Vec<(&'static str, String)>) -> Form {
    fields
        .into_iter()
        .fold(Form::new().part("file", upload.part()), |form, (name, value)| {
            form.text(name, value)
        })
}

async fn finish<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        warn!(%url, status = status.as_u16(), "service returned non-success status");
        return Err(status_failure(status.as_u16(), &body));
    }
    decode_reply(&body)
}

/// A non-success reply that still carries an `error` message is reported as
/// that message; anything else keeps the bare status.
pub(crate) fn status_failure(status: u16, body: &str) -> ApiError {
    match decode_reply::<serde_json::Value>(body) {
        Err(err @ ApiError::Service(_)) => err,
        _ => ApiError::Status(status),
    }
}

/// Decode a service body. Any object carrying a non-null `error` field is a
/// semantic failure regardless of what else it contains.
pub(crate) fn decode_reply<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    match value.get("error") {
        None | Some(serde_json::Value::Null) => Ok(serde_json::from_value(value)?),
        Some(serde_json::Value::String(message)) => Err(ApiError::Service(message.clone())),
        Some(other) => Err(ApiError::Service(other.to_string())),
    }
}
