//! Turn replies.
//!
//! A turn ends in exactly one [`TurnReply`]: streamed prose, a structured
//! request for missing parameters, or a plain failure message.
//!
//! [`ReplyStream`] is the pull-based text sequence behind streamed prose.
//! It has a single consumer, only moves forward, and cannot be cancelled.
//! Completion hooks (memory updates, audit logging) run once, after the last
//! chunk has been pulled; a caller that drops the stream half-way records
//! nothing.

use crate::ports::llm_gateway::StreamHandle;
use futures::Stream;
use kubex_domain::{ParameterRequest, StreamEvent};
use std::collections::VecDeque;

/// Prefix of the chunk substituted for a failed model stream
pub const STREAM_ERROR_PREFIX: &str = "Stream error";

/// Runs with the full reply text once the stream is drained
pub type CompletionHook = Box<dyn FnOnce(&str) + Send>;

enum ReplySource {
    Ready(VecDeque<String>),
    Model(StreamHandle),
}

/// Lazy sequence of reply chunks
pub struct ReplyStream {
    source: ReplySource,
    collected: String,
    hooks: Vec<CompletionHook>,
    finished: bool,
}

impl ReplyStream {
    /// A reply that is already known, delivered as one chunk
    pub fn once(text: impl Into<String>) -> Self {
        Self::from_chunks([text.into()])
    }

    pub fn from_chunks(chunks: impl IntoIterator<Item = String>) -> Self {
        Self::with_source(ReplySource::Ready(chunks.into_iter().collect()))
    }

    /// A reply produced incrementally by the model
    pub fn from_handle(handle: StreamHandle) -> Self {
        Self::with_source(ReplySource::Model(handle))
    }

    /// The literal chunk used when a model stream cannot be produced
    pub fn stream_error(message: impl std::fmt::Display) -> Self {
        Self::once(format!("{}: {}", STREAM_ERROR_PREFIX, message))
    }

    fn with_source(source: ReplySource) -> Self {
        Self {
            source,
            collected: String::new(),
            hooks: Vec::new(),
            finished: false,
        }
    }

    /// Register a hook run with the full text after the last chunk
    pub fn on_complete(mut self, hook: impl FnOnce(&str) + Send + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Pull the next chunk; `None` once the reply is complete
    pub async fn next_chunk(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }

        let chunk = match &mut self.source {
            ReplySource::Ready(chunks) => chunks.pop_front(),
            ReplySource::Model(handle) => loop {
                match handle.recv().await {
                    Some(StreamEvent::Delta(delta)) if delta.is_empty() => continue,
                    Some(StreamEvent::Delta(delta)) => break Some(delta),
                    // Completed carries the whole text; only emit it if no
                    // delta arrived (non-streaming fallback).
                    Some(StreamEvent::Completed(full)) => {
                        if self.collected.is_empty() && !full.is_empty() {
                            self.collected.push_str(&full);
                            self.finish();
                            return Some(full);
                        }
                        break None;
                    }
                    Some(StreamEvent::Error(message)) => {
                        let chunk = format!("{}: {}", STREAM_ERROR_PREFIX, message);
                        self.collected.push_str(&chunk);
                        self.finish();
                        return Some(chunk);
                    }
                    None => break None,
                }
            },
        };

        match chunk {
            Some(chunk) => {
                self.collected.push_str(&chunk);
                Some(chunk)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        let hooks = std::mem::take(&mut self.hooks);
        for hook in hooks {
            hook(&self.collected);
        }
    }

    /// Drain the stream and return the full text
    pub async fn collect_text(mut self) -> String {
        while self.next_chunk().await.is_some() {}
        self.collected
    }

    /// Text pulled so far
    pub fn collected(&self) -> &str {
        &self.collected
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Adapt into a `futures::Stream` of chunks
    pub fn into_stream(self) -> impl Stream<Item = String> + Send {
        futures::stream::unfold(self, |mut reply| async move {
            reply.next_chunk().await.map(|chunk| (chunk, reply))
        })
    }
}

impl std::fmt::Debug for ReplyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyStream")
            .field("collected", &self.collected)
            .field("finished", &self.finished)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Why a turn produced a plain failure message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The model named an operation the agent does not have
    UnknownOperation,
    /// The router could not map the message to an agent
    UnrecognizedCategory,
    /// A finalize arrived with no engaged agent
    NoActiveAgent,
}

impl FailureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::UnknownOperation => "unknown_operation",
            FailureKind::UnrecognizedCategory => "unrecognized_category",
            FailureKind::NoActiveAgent => "no_active_agent",
        }
    }
}

/// Outcome of one conversational turn
#[derive(Debug)]
pub enum TurnReply {
    /// Prose to render incrementally
    Streamed(ReplyStream),
    /// The operation needs more values; render as a form
    NeedsParameters(ParameterRequest),
    /// A failure explained in one message
    Failed { kind: FailureKind, message: String },
}

impl TurnReply {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        TurnReply::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn needs_parameters(&self) -> Option<&ParameterRequest> {
        match self {
            TurnReply::NeedsParameters(request) => Some(request),
            _ => None,
        }
    }

    /// Drain to text; a parameter request yields `None`
    pub async fn into_text(self) -> Option<String> {
        match self {
            TurnReply::Streamed(stream) => Some(stream.collect_text().await),
            TurnReply::Failed { message, .. } => Some(message),
            TurnReply::NeedsParameters(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnOnce(&str) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |text: &str| sink.lock().unwrap().push(text.to_string()))
    }

    #[tokio::test]
    async fn test_hook_runs_only_after_full_drain() {
        let (seen, hook) = recorder();
        let mut stream = ReplyStream::from_chunks(["a".to_string(), "b".to_string()]).on_complete(hook);

        assert_eq!(stream.next_chunk().await.as_deref(), Some("a"));
        assert_eq!(stream.next_chunk().await.as_deref(), Some("b"));
        assert!(seen.lock().unwrap().is_empty());

        assert_eq!(stream.next_chunk().await, None);
        assert_eq!(*seen.lock().unwrap(), vec!["ab".to_string()]);

        // Further pulls neither yield nor re-run hooks
        assert_eq!(stream.next_chunk().await, None);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_stream_records_nothing() {
        let (seen, hook) = recorder();
        let mut stream = ReplyStream::from_chunks(["a".to_string(), "b".to_string()]).on_complete(hook);
        stream.next_chunk().await;
        drop(stream);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_stream_deltas() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("Hel".to_string())).await.unwrap();
        tx.send(StreamEvent::Delta("".to_string())).await.unwrap();
        tx.send(StreamEvent::Delta("lo".to_string())).await.unwrap();
        tx.send(StreamEvent::Completed("Hello".to_string())).await.unwrap();
        drop(tx);

        let (seen, hook) = recorder();
        let stream = ReplyStream::from_handle(StreamHandle::new(rx)).on_complete(hook);
        let chunks: Vec<String> = stream.into_stream().collect().await;

        assert_eq!(chunks, vec!["Hel", "lo"]);
        assert_eq!(*seen.lock().unwrap(), vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_completed_without_deltas_is_emitted() {
        let (tx, rx) = mpsc::channel(1);
        tx.send(StreamEvent::Completed("whole".to_string())).await.unwrap();
        let text = ReplyStream::from_handle(StreamHandle::new(rx)).collect_text().await;
        assert_eq!(text, "whole");
    }

    #[tokio::test]
    async fn test_error_event_becomes_literal_chunk() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(StreamEvent::Delta("partial ".to_string())).await.unwrap();
        tx.send(StreamEvent::Error("connection reset".to_string())).await.unwrap();

        let text = ReplyStream::from_handle(StreamHandle::new(rx)).collect_text().await;
        assert_eq!(text, "partial Stream error: connection reset");
    }

    #[tokio::test]
    async fn test_stream_error_reply() {
        let text = ReplyStream::stream_error("unreachable").collect_text().await;
        assert_eq!(text, "Stream error: unreachable");
    }

    #[tokio::test]
    async fn test_turn_reply_into_text() {
        let failed = TurnReply::failed(FailureKind::UnknownOperation, "no such tool");
        assert_eq!(failed.into_text().await.as_deref(), Some("no such tool"));
        assert_eq!(FailureKind::UnrecognizedCategory.as_str(), "unrecognized_category");
    }
}
