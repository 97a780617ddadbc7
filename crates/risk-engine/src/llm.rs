//! OpenAI-compatible chat-completions delegate

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{ClauseType, Language, RiskLabel};
use tracing::debug;

use crate::delegate::{
    Classification, ClassificationDelegate, ClassificationRequest, DelegateError,
};
use crate::patterns::truncate_chars;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Longest clause excerpt sent to the model, in characters
const MAX_CLAUSE_CHARS: usize = 2000;
/// Used when the model omits a confidence
const DEFAULT_CONFIDENCE: f64 = 0.7;
const MAX_LIST_ITEMS: usize = 5;

const SYSTEM_PROMPT: &str = "You are a helpful legal assistant for Indian SMEs. \
Provide clear, practical advice in simple English. Always return valid JSON.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// `None` unless OPENAI_API_KEY is set and non-empty
    ///
    /// Optional overrides: CONTRACT_LLM_MODEL, CONTRACT_LLM_ENDPOINT,
    /// CONTRACT_LLM_TIMEOUT_MS (unparseable values keep the default).
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty())?;
        let mut config = Self::new(api_key.trim());

        if let Some(model) = lookup("CONTRACT_LLM_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(endpoint) = lookup("CONTRACT_LLM_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(ms) = lookup("CONTRACT_LLM_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()) {
            config.timeout = Duration::from_millis(ms);
        }

        Some(config)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// The JSON object the prompt asks the model for
#[derive(Deserialize)]
struct RawReply {
    severity: String,
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    plain_language_explanation: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    clause_type: Option<String>,
    #[serde(default)]
    suggested_alternative: Option<String>,
    #[serde(default)]
    potential_risks: Vec<String>,
    #[serde(default)]
    negotiation_tips: Vec<String>,
}

pub struct LlmDelegate {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmDelegate {
    pub fn new(config: LlmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ClassificationDelegate for LlmDelegate {
    fn name(&self) -> &str {
        "llm"
    }

    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, DelegateError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(request),
                },
            ],
            temperature: 0.1,
            max_tokens: 800,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = format!("API returned {}: {}", status, truncate_chars(&detail, 200));
            return Err(if status.as_u16() == 429 || status.is_server_error() {
                DelegateError::Transient(message)
            } else {
                DelegateError::Permanent(message)
            });
        }

        // A failed body read is transient; a body that does not decode is permanent
        let bytes = response.bytes().await.map_err(|e| {
            DelegateError::Transient(format!("failed reading completion body: {}", e))
        })?;
        let chat: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| DelegateError::Permanent(format!("invalid completion body: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DelegateError::Permanent("completion had no content".to_string()))?;

        debug!(model = %self.config.model, chars = content.len(), "received classification reply");
        parse_reply(&content)
    }
}

fn map_transport_error(e: reqwest::Error) -> DelegateError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        DelegateError::Transient(format!("HTTP error: {}", e))
    } else {
        DelegateError::Permanent(format!("HTTP error: {}", e))
    }
}

fn build_prompt(request: &ClassificationRequest) -> String {
    let excerpt = if request.text.chars().count() > MAX_CLAUSE_CHARS {
        format!("{}...[truncated]", truncate_chars(&request.text, MAX_CLAUSE_CHARS))
    } else {
        request.text.clone()
    };

    let language_note = match request.language {
        Language::Hindi => " The clause is written in Hindi; answer in English.",
        _ => "",
    };

    format!(
        "As a legal advisor for Indian SMEs, assess the risk this contract clause poses to the SME.{}\n\n\
         \"{}\"\n\n\
         Reply with ONLY a JSON object in this exact format:\n\
         {{\n\
         \x20   \"severity\": \"High/Medium/Low\",\n\
         \x20   \"rationale\": \"One or two sentences in plain business English\",\n\
         \x20   \"confidence\": 0.0,\n\
         \x20   \"clause_type\": \"Indemnity/Termination/Jurisdiction/Arbitration/Confidentiality/Payment/IP Rights/Warranty/Liability/Force Majeure/General\",\n\
         \x20   \"suggested_alternative\": \"SME-friendly alternative wording\",\n\
         \x20   \"potential_risks\": [\"Risk 1\", \"Risk 2\"],\n\
         \x20   \"negotiation_tips\": [\"Tip 1\", \"Tip 2\"]\n\
         }}",
        language_note, excerpt
    )
}

/// Parse the first `{` .. last `}` of a model reply
fn parse_reply(content: &str) -> Result<Classification, DelegateError> {
    let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
        return Err(DelegateError::Permanent(
            "reply contained no JSON object".to_string(),
        ));
    };
    if end < start {
        return Err(DelegateError::Permanent(
            "reply contained no JSON object".to_string(),
        ));
    }

    let raw: RawReply = serde_json::from_str(&content[start..=end])
        .map_err(|e| DelegateError::Permanent(format!("unparseable reply: {}", e)))?;

    let label = RiskLabel::parse_lenient(&raw.severity).ok_or_else(|| {
        DelegateError::Permanent(format!("unrecognised severity '{}'", raw.severity))
    })?;

    let rationale = raw
        .rationale
        .or(raw.plain_language_explanation)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| format!("{} risk", raw.severity.trim()));

    let mut classification = Classification::new(
        label,
        rationale,
        raw.confidence.unwrap_or(DEFAULT_CONFIDENCE),
    );
    if let Some(clause_type) = raw.clause_type.as_deref().and_then(ClauseType::parse) {
        classification = classification.with_clause_type(clause_type);
    }
    if let Some(alternative) = raw
        .suggested_alternative
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
    {
        classification = classification.with_alternative(alternative);
    }

    Ok(classification
        .with_risks(clean_list(raw.potential_risks))
        .with_tips(clean_list(raw.negotiation_tips)))
}

/// Trimmed, non-empty entries, at most [`MAX_LIST_ITEMS`]
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}
