//! Conversational assistant backed by hosted or local language models.
//!
//! The assistant asks a model to answer diagram requests with a JSON
//! [`DiagramSpec`]. When the answer contains one, it is rendered and the
//! reply points at the saved file.

use std::{fmt, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use log::{debug, info, warn};
use serde::Serialize;

use cloudgram::{Renderer, spec::DiagramSpec};

use crate::{config::ProviderSettings, error::ServerError, run_blocking};

const SYSTEM_PROMPT: &str = r#"You are a cloud architecture assistant who designs diagrams.
When given a natural language description, output a JSON specification that describes:
- "title": the title of the diagram.
- "nodes": each with "id", "type" and "label". Supported types: EC2, RDS, ALB, ELB, APIGateway, SQS, CloudWatch.
- "edges": each with "from" (a node id) and "to" (a list of node ids).
- "clusters" (optional): each with "label" and "members" (node ids). A node belongs to at most one cluster.

If the description mentions clusters (text in single quotes, e.g. 'Web Tier' or 'Microservices'),
group the related nodes accordingly.

Always output the full JSON specification without additional text.
If the message is not a diagram request, answer it briefly in plain text."#;

/// What the assistant said, and the diagram it rendered if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    text: String,
    image_path: Option<PathBuf>,
}

impl AssistantReply {
    pub fn new(text: impl Into<String>, image_path: Option<PathBuf>) -> Self {
        Self {
            text: text.into(),
            image_path,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image_path(&self) -> Option<&PathBuf> {
        self.image_path.as_ref()
    }
}

/// Something that answers chat messages.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn reply(&self, message: &str) -> Result<AssistantReply, ServerError>;
}

/// Assistant that tries each configured provider in order.
pub struct LlmAssistant {
    providers: Vec<ProviderSettings>,
    renderer: Arc<Renderer>,
}

impl LlmAssistant {
    /// Creates an assistant trying `providers` in order.
    pub fn new(providers: Vec<ProviderSettings>, renderer: Arc<Renderer>) -> Self {
        Self {
            providers,
            renderer,
        }
    }

    async fn ask(&self, provider: &ProviderSettings, message: &str) -> Result<String, String> {
        let backend = map_backend(provider.provider())?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(provider.model())
            .system(SYSTEM_PROMPT);

        if let Some(api_key) = provider.api_key() {
            builder = builder.api_key(api_key);
        }
        if let Some(temperature) = provider.temperature() {
            builder = builder.temperature(temperature);
        }

        let llm = builder.build().map_err(|e| format!("build LLM: {e}"))?;

        let messages = vec![ChatMessage::user().content(message).build()];

        let response = llm.chat(&messages).await.map_err(|e| format!("chat: {e}"))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err("LLM returned empty text".to_string()),
            None => Err("LLM returned no text".to_string()),
        }
    }
}

impl fmt::Debug for LlmAssistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers: Vec<&str> = self.providers.iter().map(|p| p.provider()).collect();
        f.debug_struct("LlmAssistant")
            .field("providers", &providers)
            .finish()
    }
}

#[async_trait]
impl Assistant for LlmAssistant {
    async fn reply(&self, message: &str) -> Result<AssistantReply, ServerError> {
        let mut last_error = String::from("no provider configured");

        for provider in &self.providers {
            match self.ask(provider, message).await {
                Ok(text) => {
                    info!(provider = provider.provider(), model = provider.model(); "Assistant answered");
                    return render_reply(Arc::clone(&self.renderer), text).await;
                }
                Err(err) => {
                    warn!(
                        provider = provider.provider(),
                        model = provider.model(),
                        err:% = err;
                        "Assistant provider failed, trying next"
                    );
                    last_error = format!("{}: {err}", provider.provider());
                }
            }
        }

        Err(ServerError::Assistant(last_error))
    }
}

/// Renders the diagram contained in a model answer, if there is one.
///
/// # Errors
///
/// Returns an error if a valid specification was found but could not be
/// rendered.
pub async fn render_reply(
    renderer: Arc<Renderer>,
    text: String,
) -> Result<AssistantReply, ServerError> {
    let Some(spec) = spec_from_reply(&text) else {
        return Ok(AssistantReply::new(text, None));
    };

    let path = run_blocking(move || renderer.render(&spec)).await?;
    Ok(AssistantReply::new(
        format!("Diagram saved to {}", path.display()),
        Some(path),
    ))
}

/// Extracts a valid diagram specification from a model answer.
pub fn spec_from_reply(text: &str) -> Option<DiagramSpec> {
    let json = extract_json_object(text)?;

    let spec: DiagramSpec = match serde_json::from_str(json) {
        Ok(spec) => spec,
        Err(err) => {
            debug!(err:% = err; "Answer contains no diagram specification");
            return None;
        }
    };

    match spec.validate() {
        Ok(()) => Some(spec),
        Err(err) => {
            debug!(err:% = err; "Answer contains an invalid diagram specification");
            None
        }
    }
}

/// Extract the JSON object substring from raw LLM output.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

fn map_backend(provider: &str) -> Result<LLMBackend, String> {
    match provider.to_ascii_lowercase().as_str() {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(format!("unknown provider: {other}")),
    }
}
