//! Scripted ports shared by the use-case tests.

use crate::ports::llm_gateway::{ChatRequest, GatewayError, LlmGateway, StreamHandle};
use crate::ports::operation::{OperationError, OperationHandler};
use async_trait::async_trait;
use kubex_domain::{StreamEvent, ToolDefinition};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// Replays queued replies: `chat` pops from one queue, `chat_stream` from
/// another. Every request is recorded.
pub struct ScriptedGateway {
    chat_replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    stream_replies: Mutex<VecDeque<Result<Vec<String>, GatewayError>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
    pub stream_requests: Mutex<Vec<ChatRequest>>,
    pub history_clears: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            chat_replies: Mutex::new(VecDeque::new()),
            stream_replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            stream_requests: Mutex::new(Vec::new()),
            history_clears: AtomicUsize::new(0),
        }
    }

    pub fn chat_reply(self, reply: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
        self
    }

    pub fn chat_error(self, error: GatewayError) -> Self {
        self.chat_replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn stream_reply(self, chunks: &[&str]) -> Self {
        self.stream_replies
            .lock()
            .unwrap()
            .push_back(Ok(chunks.iter().map(|c| c.to_string()).collect()));
        self
    }

    pub fn stream_error(self, error: GatewayError) -> Self {
        self.stream_replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn chat_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_stream_prompt(&self) -> Option<String> {
        self.stream_requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.user_prompt.clone())
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn chat(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Other("No more responses".to_string())))
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<StreamHandle, GatewayError> {
        self.stream_requests.lock().unwrap().push(request.clone());
        let chunks = self
            .stream_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec!["summary".to_string()]))?;

        let (tx, rx) = mpsc::channel(chunks.len() + 1);
        let full: String = chunks.concat();
        for chunk in chunks {
            let _ = tx.send(StreamEvent::Delta(chunk)).await;
        }
        let _ = tx.send(StreamEvent::Completed(full)).await;
        Ok(StreamHandle::new(rx))
    }

    async fn clear_history(&self) {
        self.history_clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records every call and answers with a fixed result
pub struct RecordingOperation {
    result: Result<Value, OperationError>,
    pub calls: Mutex<Vec<Map<String, Value>>>,
}

impl RecordingOperation {
    pub fn ok(payload: Value) -> Self {
        Self {
            result: Ok(payload),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: OperationError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_params(&self) -> Option<Map<String, Value>> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl OperationHandler for RecordingOperation {
    async fn call(
        &self,
        _tool: &ToolDefinition,
        params: &Map<String, Value>,
    ) -> Result<Value, OperationError> {
        self.calls.lock().unwrap().push(params.clone());
        self.result.clone()
    }
}
