//! Domain agent: the per-domain dialogue state machine.
//!
//! An agent is either idle or awaiting parameters for exactly one paused
//! operation (its [`ToolContext`]). Each turn asks the tool-selection
//! service for a decision, injects contextual values, checks for missing
//! parameters and then either pauses or executes and summarizes.

use crate::config::EngineParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::operation::OperationTable;
use crate::use_cases::reply::{FailureKind, ReplyStream, TurnReply};
use crate::use_cases::select_tool::{ToolSelectionInput, ToolSelectionService};
use crate::use_cases::summarize_result::SummarizationService;
use kubex_domain::agent::{inject_contextual, missing_parameters};
use kubex_domain::util::truncate_str;
use kubex_domain::{
    AgentProfile, AgentState, CLARIFICATION_RESPONSE, ConversationMemory, ConversationTurn,
    OperationResult, ParameterRequest, ToolContext, ToolRegistry,
};
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Shared handle to a memory that completion hooks append to
pub(crate) type SharedMemory = Arc<Mutex<ConversationMemory>>;

pub(crate) fn lock_memory(memory: &SharedMemory) -> MutexGuard<'_, ConversationMemory> {
    memory.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct DomainAgent {
    profile: AgentProfile,
    registry: ToolRegistry,
    operations: OperationTable,
    selector: ToolSelectionService,
    summarizer: SummarizationService,
    memory: SharedMemory,
    tool_context: Option<ToolContext>,
    params: EngineParams,
    logger: Arc<dyn ConversationLogger>,
}

impl DomainAgent {
    pub fn new(
        profile: AgentProfile,
        operations: OperationTable,
        gateway: Arc<dyn LlmGateway>,
        params: EngineParams,
    ) -> Self {
        let registry = profile.build_registry(None);
        let selector = ToolSelectionService::new(gateway.clone()).with_history(params.share_history);
        let summarizer = SummarizationService::new(gateway).with_history(params.share_history);
        Self {
            profile,
            registry,
            operations,
            selector,
            summarizer,
            memory: Arc::new(Mutex::new(ConversationMemory::new(params.agent_capacity))),
            tool_context: None,
            params,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn key(&self) -> &str {
        &self.profile.key
    }

    pub fn label(&self) -> &str {
        &self.profile.label
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn state(&self) -> AgentState {
        if self.tool_context.is_some() {
            AgentState::AwaitingParameters
        } else {
            AgentState::Idle
        }
    }

    pub fn is_awaiting_parameters(&self) -> bool {
        self.state() == AgentState::AwaitingParameters
    }

    pub fn tool_context(&self) -> Option<&ToolContext> {
        self.tool_context.as_ref()
    }

    /// Snapshot of the local memory, oldest first
    pub fn memory_turns(&self) -> Vec<ConversationTurn> {
        lock_memory(&self.memory).turns().cloned().collect()
    }

    pub fn memory_len(&self) -> usize {
        lock_memory(&self.memory).len()
    }

    /// Handle one user message
    pub async fn process_request(&mut self, text: &str, contextual: &Map<String, Value>) -> TurnReply {
        info!(agent = %self.profile.key, request = truncate_str(text, 80), "Processing request");

        let summary = self.memory_summary();
        let decision = self
            .selector
            .select(ToolSelectionInput {
                user_text: text,
                domain_label: &self.profile.label,
                registry: &self.registry,
                conversation_summary: &summary,
                tool_context: self.tool_context.as_ref(),
            })
            .await;

        self.logger.log(ConversationEvent::new(
            "tool_decision",
            json!({
                "agent": self.profile.key,
                "state": self.state().as_str(),
                "decision": decision.to_value(),
            }),
        ));

        if decision.is_chat() {
            let response = decision.response().unwrap_or(CLARIFICATION_RESPONSE).to_string();
            self.tool_context = None;
            let memory = self.memory.clone();
            let user = text.to_string();
            let origin = self.profile.label.clone();
            return TurnReply::Streamed(ReplyStream::once(response).on_complete(move |full| {
                lock_memory(&memory).append(user, full, origin);
            }));
        }

        let Some(tool) = self.registry.get_resolved(&decision.operation_name).cloned() else {
            warn!(
                agent = %self.profile.key,
                operation = %decision.operation_name,
                "Model selected an unknown operation"
            );
            self.tool_context = None;
            return TurnReply::failed(
                FailureKind::UnknownOperation,
                format!(
                    "Unknown operation: '{}' is not available in the {} domain.",
                    decision.operation_name, self.profile.label
                ),
            );
        };

        let mut parameters = decision.parameters;
        if let Some(ctx) = self.tool_context.as_ref().filter(|c| c.operation_name == tool.name) {
            for (key, value) in &ctx.extracted_parameters {
                parameters.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        parameters.remove("response");

        inject_contextual(&tool, &mut parameters, contextual);
        let missing = missing_parameters(&tool, &parameters);

        if !missing.is_empty() {
            debug!(operation = %tool.name, missing = ?missing, "Pausing for parameters");
            let request = ParameterRequest::new(&tool, missing.clone(), parameters.clone());
            self.tool_context = Some(ToolContext::new(tool.name.clone(), missing, parameters, text));
            self.logger.log(ConversationEvent::new(
                "parameters_requested",
                json!({
                    "agent": self.profile.key,
                    "operation": request.operation_name,
                    "missing": request.missing_parameter_names,
                }),
            ));
            return TurnReply::NeedsParameters(request);
        }

        self.tool_context = None;
        TurnReply::Streamed(self.execute(&tool.name, parameters, text).await)
    }

    /// Run a paused operation with the values a form collected.
    ///
    /// Collected values win over extracted ones. The request that started
    /// the collection is taken from the cleared context.
    pub async fn finalize(
        &mut self,
        operation_name: &str,
        extracted: Map<String, Value>,
        collected: Map<String, Value>,
        contextual: &Map<String, Value>,
    ) -> ReplyStream {
        let originating_request = self
            .tool_context
            .take()
            .map(|ctx| ctx.originating_request)
            .unwrap_or_else(|| operation_name.to_string());

        let mut merged = extracted;
        merged.extend(collected);

        if let Some(tool) = self.registry.get_resolved(operation_name) {
            inject_contextual(tool, &mut merged, contextual);
        }

        self.execute(operation_name, merged, &originating_request).await
    }

    /// Execute an operation and stream its summary.
    ///
    /// Neither a missing handler nor a failing call escapes as an error; both
    /// become a failure result that is summarized like any other.
    async fn execute(
        &self,
        operation_name: &str,
        parameters: Map<String, Value>,
        originating_request: &str,
    ) -> ReplyStream {
        let result = self.invoke(operation_name, &parameters).await;

        self.logger.log(ConversationEvent::new(
            "operation_executed",
            json!({
                "agent": self.profile.key,
                "operation": operation_name,
                "parameters": parameters,
                "success": result.is_success(),
            }),
        ));

        let memory = self.memory.clone();
        let user = originating_request.to_string();
        let origin = self.profile.label.clone();
        self.summarizer
            .summarize(&result, originating_request, &self.profile.label)
            .await
            .on_complete(move |full| {
                lock_memory(&memory).append(user, full, origin);
            })
    }

    /// Call the bound handler directly, without a model round trip
    pub async fn invoke(&self, operation_name: &str, parameters: &Map<String, Value>) -> OperationResult {
        let canonical = self
            .registry
            .resolve(operation_name)
            .unwrap_or(operation_name)
            .to_string();

        let (Some(tool), Some(handler)) = (
            self.registry.get_tool(&canonical),
            self.operations.get(&canonical),
        ) else {
            warn!(agent = %self.profile.key, operation = %canonical, "No handler bound");
            return OperationResult::not_implemented(&canonical);
        };

        info!(agent = %self.profile.key, operation = %canonical, "Executing operation");
        match handler.call(tool, parameters).await {
            Ok(payload) => OperationResult::success(payload),
            Err(e) => {
                warn!(operation = %canonical, error = %e, "Operation failed");
                OperationResult::failure(e.to_string())
            }
        }
    }

    /// Rebuild the registry for a newly bound cluster
    pub fn rebuild_registry(&mut self, cluster_id: Option<&str>) {
        self.registry = self.profile.build_registry(cluster_id);
    }

    /// Copy turns from the router's memory, skipping ones already present
    pub fn sync_memory<'a>(&self, turns: impl IntoIterator<Item = &'a ConversationTurn>) {
        let mut memory = lock_memory(&self.memory);
        for turn in turns {
            let known = memory.turns().any(|t| {
                t.user_message == turn.user_message && t.assistant_message == turn.assistant_message
            });
            if !known {
                memory.append(
                    turn.user_message.clone(),
                    turn.assistant_message.clone(),
                    turn.origin.clone(),
                );
            }
        }
    }

    /// Drop the pending operation and the local memory
    pub fn reset(&mut self) {
        self.tool_context = None;
        lock_memory(&self.memory).clear();
    }

    /// Drop the pending operation only
    pub fn soft_reset(&mut self) {
        self.tool_context = None;
    }

    fn memory_summary(&self) -> String {
        lock_memory(&self.memory).summary(self.params.summary_turns, self.params.summary_chars)
    }
}

impl std::fmt::Debug for DomainAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainAgent")
            .field("key", &self.profile.key)
            .field("state", &self.state())
            .field("tools", &self.registry.len())
            .field("operations", &self.operations.len())
            .finish()
    }
}
