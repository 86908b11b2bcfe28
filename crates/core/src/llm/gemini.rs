use crate::config::Settings;
use crate::domain::analysis::ConsultantAnalysis;
use crate::domain::financial::FinancialInput;
use crate::llm::error::AnalysisError;
use crate::llm::{json, prompt};
use crate::llm::{AnalysisClient, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    /// Builds the client even without a key; `analyze` then fails with a
    /// configuration error before touching the network.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout_secs = settings.gemini_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key: settings.gemini_api_key.clone(),
            base_url: settings
                .gemini_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: settings
                .gemini_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: settings.gemini_temperature.unwrap_or(DEFAULT_TEMPERATURE),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(input: &FinancialInput, temperature: f32) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt::build_prompt(input),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: "application/json",
                response_schema: prompt::response_schema(),
            },
        }
    }

    async fn generate_content(
        &self,
        api_key: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AnalysisError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|e| {
            AnalysisError::configuration(Provider::Gemini, format!("invalid API key header: {e}"))
        })?;
        headers.insert("x-goog-api-key", key);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(req)
            .send()
            .await
            .map_err(|e| {
                let stage = if e.is_timeout() { "timeout" } else { "send" };
                AnalysisError::service(Provider::Gemini, stage, format!("{e:#}"))
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            AnalysisError::service(Provider::Gemini, "read_body", format!("{e:#}"))
        })?;
        if !status.is_success() {
            return Err(
                AnalysisError::service(Provider::Gemini, "http", format!("status={status}"))
                    .with_raw_output(text),
            );
        }

        serde_json::from_str::<GenerateContentResponse>(&text).map_err(|e| {
            AnalysisError::service(
                Provider::Gemini,
                "decode_envelope",
                format!("failed to decode generateContent response: {e}"),
            )
            .with_raw_output(text)
        })
    }

    fn response_text(res: GenerateContentResponse) -> Result<String, AnalysisError> {
        if let Some(err) = res.error {
            return Err(AnalysisError::service(
                Provider::Gemini,
                "api_error",
                err.message,
            ));
        }

        if let Some(reason) = res.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AnalysisError::service(
                Provider::Gemini,
                "blocked",
                format!("prompt blocked: {reason}"),
            ));
        }

        let candidate = res
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::service(Provider::Gemini, "candidates", "no candidates"))?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                tracing::warn!(finish_reason = reason, "Gemini finished without STOP");
            }
        }

        let mut out = String::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(text) = part.text {
                out.push_str(&text);
            }
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl AnalysisClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn analyze(&self, input: &FinancialInput) -> Result<ConsultantAnalysis, AnalysisError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AnalysisError::configuration(
                Provider::Gemini,
                "GEMINI_API_KEY is required",
            ));
        };

        let req = Self::request(input, self.temperature);
        tracing::info!(
            model = %self.model,
            company = %input.company_name,
            industry = %input.industry,
            "requesting Gemini analysis"
        );

        let res = self.generate_content(api_key, &req).await?;
        let text = Self::response_text(res)?;

        json::parse_analysis(&text).map_err(|e| {
            AnalysisError::parse(Provider::Gemini, "parse", format!("{e:#}")).with_raw_output(text)
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    message: String,
}
