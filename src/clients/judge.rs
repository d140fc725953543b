use crate::config::JudgeConfig;
use crate::models::judgment::JudgeVerdict;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Instructions sent with every judgment request. The judge must answer with
/// bare JSON matching `JudgeVerdict`.
const JUDGE_SYSTEM_PROMPT: &str = r#"You are an expert film criticism analyst. Your task is to judge the quality and authenticity of user movie reviews to help filter out review bombing, spam, and low-effort content.

Analyze the given review text and respond STRICTLY with a valid JSON object containing only these three fields:
1. "is_authentic": A boolean. false if the review seems like spam, trolling, review bombing, is completely off-topic, or is a very low-effort rant (e.g., "This movie sucks!").
2. "quality_score": A float between 0.1 (lowest quality) and 1.0 (highest quality). Base this on thoughtfulness, use of detail, coherence, and originality. A one-word rant scores 0.1. A well-reasoned paragraph scores 0.9-1.0.
3. "reasoning": A very brief one-sentence explanation for your judgments.

Be strict. The goal is to create a more accurate aggregate score by downweighting unhelpful reviews."#;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("judge API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("judge returned an unusable payload: {0}")]
    Payload(String),
}

/// Seam for the external text-judgment service. The orchestrator only sees
/// this trait, so tests substitute a scripted judge.
#[async_trait]
pub trait ReviewJudge: Send + Sync {
    async fn judge(&self, review_text: &str) -> Result<JudgeVerdict, JudgeError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completions judge endpoint.
#[derive(Clone)]
pub struct JudgeClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl JudgeClient {
    pub fn from_config(config: &JudgeConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            anyhow::anyhow!(
                "judge API key not found; set the {} environment variable",
                config.api_key_env
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ReviewJudge for JudgeClient {
    async fn judge(&self, review_text: &str) -> Result<JudgeVerdict, JudgeError> {
        let user_message = format!("REVIEW TEXT: {review_text}");
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: JUDGE_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Api { status, body });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::Payload(e.to_string()))?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| JudgeError::Payload("response carried no choices".to_string()))?;

        serde_json::from_str(content)
            .map_err(|e| JudgeError::Payload(format!("verdict JSON did not parse: {e}")))
    }
}
