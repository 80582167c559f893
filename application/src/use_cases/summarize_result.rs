//! Summarization service: explains an operation result in natural language.
//!
//! A single streamed pass with no retries. If the stream cannot be opened the
//! reply is one literal error chunk instead.

use crate::ports::llm_gateway::{ChatRequest, LlmGateway};
use crate::use_cases::reply::ReplyStream;
use kubex_domain::{OperationResult, PromptTemplate, util::truncate_str};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct SummarizationService {
    gateway: Arc<dyn LlmGateway>,
    use_history: bool,
}

impl SummarizationService {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            use_history: false,
        }
    }

    pub fn with_history(mut self, use_history: bool) -> Self {
        self.use_history = use_history;
        self
    }

    pub async fn summarize(
        &self,
        result: &OperationResult,
        originating_request: &str,
        domain_label: &str,
    ) -> ReplyStream {
        info!(
            domain = domain_label,
            success = result.is_success(),
            request = truncate_str(originating_request, 50),
            "Summarizing operation result"
        );

        let prompt = PromptTemplate::summary_prompt(&result.to_value(), originating_request);
        let request = ChatRequest::new(prompt).with_history(self.use_history);

        match self.gateway.chat_stream(&request).await {
            Ok(handle) => ReplyStream::from_handle(handle),
            Err(e) => {
                warn!(domain = domain_label, error = %e, "Summary stream failed to start");
                ReplyStream::stream_error(e)
            }
        }
    }
}
