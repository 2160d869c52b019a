//! HTTP client for the Responses API of Azure OpenAI / OpenAI.

use crate::error::ClassifyError;
use crate::verdict::{extract_braced_span, parse_verdict_object};
use crate::{truncate_for_log, Classifier};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::env;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_API_VERSION: &str = "2025-03-01-preview";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "computer-use-preview";

/// Where requests go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionEndpoint {
    /// `{endpoint}/openai/responses?api-version={api_version}`
    Azure {
        endpoint: String,
        api_version: String,
    },
    /// `{base_url}/responses`
    OpenAi { base_url: String },
}

/// How requests authenticate
#[derive(Clone, PartialEq, Eq)]
pub enum VisionAuth {
    /// Azure resource key, sent as the `api-key` header
    AzureApiKey(String),
    /// Azure AD token or OpenAI key, sent as `Authorization: Bearer`
    Bearer(String),
}

impl std::fmt::Debug for VisionAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisionAuth::AzureApiKey(_) => write!(f, "AzureApiKey(***)"),
            VisionAuth::Bearer(_) => write!(f, "Bearer(***)"),
        }
    }
}

/// Vision client settings
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub endpoint: VisionEndpoint,
    pub auth: VisionAuth,
    pub model: String,
    /// Screen size advertised to the computer-use tool
    pub display_width: u32,
    pub display_height: u32,
    pub environment: String,
    pub timeout: Duration,
}

impl VisionConfig {
    /// Read settings from the process environment.
    ///
    /// Azure is used when `AZURE_OPENAI_ENDPOINT` is set, otherwise OpenAI
    /// when `OPENAI_API_KEY` is set.
    pub fn from_env() -> Result<Self, ClassifyError> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Same as [`VisionConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClassifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (endpoint, auth) = if let Some(endpoint) = lookup("AZURE_OPENAI_ENDPOINT") {
            let auth = if let Some(key) = lookup("AZURE_OPENAI_API_KEY") {
                VisionAuth::AzureApiKey(key)
            } else if let Some(token) = lookup("AZURE_OPENAI_AD_TOKEN") {
                VisionAuth::Bearer(token)
            } else {
                return Err(ClassifyError::Config(
                    "AZURE_OPENAI_ENDPOINT is set but neither AZURE_OPENAI_API_KEY nor AZURE_OPENAI_AD_TOKEN is"
                        .to_string(),
                ));
            };
            let api_version = lookup("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
            (
                VisionEndpoint::Azure {
                    endpoint,
                    api_version,
                },
                auth,
            )
        } else if let Some(key) = lookup("OPENAI_API_KEY") {
            let base_url =
                lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
            (VisionEndpoint::OpenAi { base_url }, VisionAuth::Bearer(key))
        } else {
            return Err(ClassifyError::Config(
                "no vision credentials: set AZURE_OPENAI_ENDPOINT (+ key or AD token) or OPENAI_API_KEY"
                    .to_string(),
            ));
        };

        let parse_dim = |key: &str, default: u32| -> Result<u32, ClassifyError> {
            match lookup(key) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ClassifyError::Config(format!("{key} must be a number, got '{raw}'"))
                }),
                None => Ok(default),
            }
        };

        Ok(Self {
            endpoint,
            auth,
            model: lookup("COPILOT_DRIVER_VISION_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            display_width: parse_dim("COPILOT_DRIVER_DISPLAY_WIDTH", 1920)?,
            display_height: parse_dim("COPILOT_DRIVER_DISPLAY_HEIGHT", 1080)?,
            environment: "windows".to_string(),
            timeout: Duration::from_secs(300),
        })
    }

    pub fn responses_url(&self) -> String {
        match &self.endpoint {
            VisionEndpoint::Azure {
                endpoint,
                api_version,
            } => format!(
                "{}/openai/responses?api-version={}",
                endpoint.trim_end_matches('/'),
                api_version
            ),
            VisionEndpoint::OpenAi { base_url } => {
                format!("{}/responses", base_url.trim_end_matches('/'))
            }
        }
    }
}

/// Build the Responses API payload for one frame.
pub fn build_request_body(config: &VisionConfig, prompt: &str, base64_png: &str) -> Value {
    json!({
        "model": config.model,
        "tools": [{
            "type": "computer_use_preview",
            "display_width": config.display_width,
            "display_height": config.display_height,
            "environment": config.environment,
        }],
        "input": [{
            "type": "message",
            "role": "user",
            "content": [
                { "type": "input_text", "text": prompt },
                { "type": "input_image", "image_url": format!("data:image/png;base64,{base64_png}") },
            ],
        }],
        "truncation": "auto",
    })
}

/// The parts of a Responses API body that carry text
#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Option<Vec<ResponseOutputItem>>,
}

#[derive(Debug, Deserialize)]
struct ResponseOutputItem {
    #[serde(default)]
    content: Option<Vec<ResponseContentPart>>,
}

#[derive(Debug, Deserialize)]
struct ResponseContentPart {
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesBody {
    fn into_text(self) -> Option<String> {
        if self.output_text.is_some() {
            return self.output_text;
        }
        self.output?
            .into_iter()
            .flat_map(|item| item.content.unwrap_or_default())
            .find_map(|part| part.text)
    }
}

/// Pull the first text block out of a Responses API body.
pub fn extract_output_text(body: &Value) -> Option<String> {
    ResponsesBody::deserialize(body).ok()?.into_text()
}

/// Classifier backed by a remote multimodal model
pub struct VisionClient {
    config: VisionConfig,
    http: reqwest::Client,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, ClassifyError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Send one frame and return the model's text answer.
    ///
    /// When the body has no text block, the raw body is reduced to its
    /// `{...}` span so the verdict parser still has a chance.
    pub async fn request_text(
        &self,
        base64_png: &str,
        prompt: &str,
    ) -> Result<String, ClassifyError> {
        let url = self.config.responses_url();
        info!(
            "[vision] Calling {} (model: {}, image: {} bytes base64)",
            url,
            self.config.model,
            base64_png.len()
        );

        let payload = build_request_body(&self.config, prompt, base64_png);
        let request = self.http.post(&url).json(&payload);
        let request = match &self.config.auth {
            VisionAuth::AzureApiKey(key) => request.header("api-key", key),
            VisionAuth::Bearer(token) => request.bearer_auth(token),
        };

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!("[vision] Backend error: {} - {}", status, truncate_for_log(&text, 500));
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&text, 500).to_string(),
            });
        }

        let response_text = resp.text().await?;
        debug!("[vision] Backend response: {}", truncate_for_log(&response_text, 500));

        let extracted = serde_json::from_str::<ResponsesBody>(&response_text)
            .ok()
            .and_then(ResponsesBody::into_text);

        Ok(match extracted {
            Some(text) => text,
            None => extract_braced_span(&response_text)
                .unwrap_or(&response_text)
                .to_string(),
        })
    }
}

#[async_trait]
impl Classifier for VisionClient {
    async fn classify(
        &self,
        base64_png: &str,
        prompt: &str,
    ) -> Result<Map<String, Value>, ClassifyError> {
        let text = self.request_text(base64_png, prompt).await?;
        info!("[vision] Model text: {}", truncate_for_log(&text, 200));
        parse_verdict_object(&text)
    }
}
