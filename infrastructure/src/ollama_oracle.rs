use crate::config::LlmConfig;
use async_trait::async_trait;
use domain::error::CollaboratorError;
use domain::ports::{EntityOracle, OracleEntities, PortResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::types::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You extract entities from messages sent to a bookstore assistant. \
Reply with a single JSON object and nothing else: {\"title\": string or null, \"city\": string or null}. \
Use null when the message does not name a book title or a city.";

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    format: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Message,
}

/// Entity oracle backed by a local Ollama chat model.
#[derive(Clone)]
pub struct OllamaOracle {
    client: Arc<Client>,
    base_url: String,
    model: String,
}

impl OllamaOracle {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    async fn chat(&self, text: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            stream: false,
            format: "json",
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("Ollama API error ({status}): {body}"));
        }
        let chat: ChatResponse = serde_json::from_str(&body)?;
        Ok(chat.message.content)
    }
}

/// Last balanced JSON object or array in model output that may carry prose
/// or code fences around it.
pub fn extract_last_json(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') || trimmed.starts_with('[') && trimmed.ends_with(']') {
        return Some(trimmed);
    }

    let bytes = trimmed.as_bytes();
    let mut depth = 0usize;
    let mut start = None;
    let mut last = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match b {
            b'\\' if in_string => escape_next = true,
            b'"' => in_string = !in_string,
            b'{' | b'[' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' | b']' if !in_string && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    last = start.map(|s| &trimmed[s..=i]);
                }
            }
            _ => {}
        }
    }
    last
}

/// Parse the model's reply into entities. Blank strings count as absent.
pub fn parse_entities(reply: &str) -> Option<OracleEntities> {
    let json = extract_last_json(reply)?;
    let mut entities: OracleEntities = serde_json::from_str(json).ok()?;
    entities.title = entities.title.filter(|t| !t.trim().is_empty());
    entities.city = entities.city.filter(|c| !c.trim().is_empty());
    Some(entities)
}

#[async_trait]
impl EntityOracle for OllamaOracle {
    async fn extract_entities(&self, text: &str) -> PortResult<OracleEntities> {
        let reply = self
            .chat(text)
            .await
            .map_err(|err| CollaboratorError::Oracle(format!("{err:#}")))?;
        debug!(reply = %reply, "oracle reply");
        parse_entities(&reply).ok_or_else(|| CollaboratorError::Oracle("reply was not an entity object".into()))
    }
}
