//! Ollama LLM Gateway implementation

use crate::ollama::error::{OllamaError, Result};
use crate::ollama::protocol::{ChatOptions, ChatPayload, ChatResponse, LineBuffer};
use async_trait::async_trait;
use futures::StreamExt;
use kubex_application::{ChatRequest, GatewayError, LlmGateway, StreamHandle};
use kubex_domain::{Message, StreamEvent};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen3:4b";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout of the `/api/tags` reachability check
const CONNECTION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Buffered stream events between the reader task and the consumer
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Messages replayed when a request asks for history
type History = Arc<Mutex<Vec<Message>>>;

/// LLM Gateway implementation for an Ollama server
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    history: History,
}

impl OllamaGateway {
    /// Create a gateway with the default temperature and timeout
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_settings(base_url, model, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT)
    }

    pub fn with_settings(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();

        info!(base_url = %base_url, model = %model, "OllamaGateway initialized");

        Ok(Self {
            client,
            base_url,
            model,
            temperature,
            history: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the server answers `/api/tags`
    pub async fn test_connection(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).timeout(CONNECTION_CHECK_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Ollama connection check failed");
                false
            }
        }
    }

    /// Messages currently kept for history-enabled requests
    pub fn history(&self) -> Vec<Message> {
        lock(&self.history).clone()
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// The request's own system prompt, then the shared user/assistant
    /// turns (if requested), then the user prompt.
    fn prepare_messages(&self, request: &ChatRequest) -> Vec<Message> {
        let mut messages: Vec<Message> = request
            .system_prompt
            .iter()
            .map(|system| Message::system(system.clone()))
            .collect();

        if request.use_history {
            let history = lock(&self.history);
            messages.extend(history.iter().filter(|m| !m.is_system()).cloned());
        }

        messages.push(Message::user(request.user_prompt.clone()));
        messages
    }

    async fn post_chat(&self, messages: &[Message], stream: bool) -> Result<reqwest::Response> {
        let payload = ChatPayload {
            model: &self.model,
            messages,
            stream,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let response = self.client.post(self.chat_url()).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OllamaError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<String> {
        let messages = self.prepare_messages(request);
        debug!(messages = messages.len(), history = request.use_history, "Sending chat request");

        let response: ChatResponse = self.post_chat(&messages, false).await?.json().await?;
        if let Some(error) = response.error {
            return Err(OllamaError::Api(error));
        }
        let content = response
            .message
            .map(|m| m.content)
            .ok_or(OllamaError::EmptyResponse)?;

        if request.use_history {
            record_exchange(&self.history, request, &content);
        }
        Ok(content)
    }
}

fn lock(history: &History) -> std::sync::MutexGuard<'_, Vec<Message>> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Only the conversation is shared; system prompts stay per request.
fn record_exchange(history: &History, request: &ChatRequest, reply: &str) {
    let mut history = lock(history);
    history.push(Message::user(request.user_prompt.clone()));
    history.push(Message::assistant(reply));
}

/// Forward NDJSON lines as stream events until `done`, the end of the body,
/// or the consumer going away.
async fn pump_stream(
    response: reqwest::Response,
    tx: mpsc::Sender<StreamEvent>,
    history: Option<(History, ChatRequest)>,
) {
    let mut body = response.bytes_stream();
    let mut lines = LineBuffer::new();
    let mut full = String::new();

    'read: loop {
        let (batch, ended) = match body.next().await {
            Some(Ok(bytes)) => (lines.push(&bytes), false),
            Some(Err(e)) => {
                warn!(error = %e, "Ollama stream failed");
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
            None => (lines.finish().into_iter().collect(), true),
        };

        for line in batch {
            let parsed: ChatResponse = match serde_json::from_str(&line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, line = %line, "Failed to decode stream line");
                    continue;
                }
            };
            if let Some(error) = parsed.error {
                let _ = tx.send(StreamEvent::Error(error)).await;
                return;
            }
            let chunk = parsed.content();
            if !chunk.is_empty() {
                full.push_str(chunk);
                if tx.send(StreamEvent::Delta(chunk.to_string())).await.is_err() {
                    debug!("Stream consumer dropped");
                    return;
                }
            }
            if parsed.done {
                break 'read;
            }
        }

        if ended {
            break;
        }
    }

    if let Some((history, request)) = history {
        record_exchange(&history, &request, &full);
    }
    let _ = tx.send(StreamEvent::Completed(full)).await;
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    async fn chat(&self, request: &ChatRequest) -> std::result::Result<String, GatewayError> {
        self.send_chat(request).await.map_err(GatewayError::from)
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> std::result::Result<StreamHandle, GatewayError> {
        let messages = self.prepare_messages(request);
        let response = self.post_chat(&messages, true).await?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let history = request
            .use_history
            .then(|| (self.history.clone(), request.clone()));
        tokio::spawn(pump_stream(response, tx, history));

        Ok(StreamHandle::new(rx))
    }

    async fn clear_history(&self) {
        lock(&self.history).clear();
        debug!("Ollama chat history cleared");
    }
}
