//! Gemini REST client.
//!
//! One `generateContent` call per attempt, inline base64 image parts,
//! JSON response mime type requested so the validator receives a bare
//! JSON document rather than prose.

use std::time::Duration;

use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Config;

use super::{sanitize_error_body, InferenceRequest, ModelProvider, ProviderError};

/// Connect timeout for model calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout. Vision calls with five inline images are
/// slow; the transport-level timeout is the run's only cancellation path.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<ContentEntry>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct ContentEntry {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
enum RequestPart {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inlineData", rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiClient {
    http: Client,
    api_key: SecretString,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    /// Assembles the wire body: system instructions, the context block,
    /// then the ordered image parts, as a single user turn.
    fn body(&self, request: &InferenceRequest) -> GenerateContentBody {
        let mut parts = Vec::with_capacity(request.image_parts.len() + 2);
        parts.push(RequestPart::Text(request.system_instruction.clone()));
        parts.push(RequestPart::Text(request.context_block.clone()));
        for image in &request.image_parts {
            parts.push(RequestPart::InlineData {
                mime_type: image.media_type.clone(),
                data: image.data_base64.clone(),
            });
        }

        GenerateContentBody {
            contents: vec![ContentEntry { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }
}

#[async_trait::async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(&self, request: &InferenceRequest) -> Result<String, ProviderError> {
        debug!(
            "calling {} with {} image part(s)",
            self.model,
            request.image_parts.len()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: sanitize_error_body(&body),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(text)
    }

    fn model_version(&self) -> &str {
        &self.model
    }
}
