//! Router: top-level dispatch across domain agents.
//!
//! One router is one conversation. It owns the domain agents, the global
//! conversation memory and the active cluster binding, and decides per
//! message whether to keep talking to the current agent, answer directly,
//! or hand over to another agent.

use crate::config::EngineParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::operation::OperationTable;
use crate::use_cases::domain_agent::{DomainAgent, SharedMemory, lock_memory};
use crate::use_cases::reply::{FailureKind, ReplyStream, TurnReply};
use crate::use_cases::select_agent::AgentSelectionService;
use kubex_domain::catalog::CLUSTER_AGENT;
use kubex_domain::conversation::EMPTY_HISTORY;
use kubex_domain::util::truncate_str;
use kubex_domain::{
    ActiveClusterBinding, AgentProfile, ConversationMemory, ConversationTurn, DomainError,
    FollowUpPolicy, KeywordFollowUp, OperationResult, ToolContext, contextual_parameters,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Memory origin of direct router answers
pub const CHAT_ORIGIN: &str = "Chat";
/// Memory origin of routing failures
pub const ERROR_ORIGIN: &str = "Error";

/// Answer used when a chat decision carries no response text
pub const DEFAULT_CHAT_RESPONSE: &str =
    "I'm a Kubernetes assistant and can only help with that topic. How can I help you?";

/// Message returned when a form is submitted with no agent engaged
pub const NO_ACTIVE_AGENT_MESSAGE: &str = "No active agent found. The operation was cancelled.";

/// Snapshot of the router's state, for status displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterStatus {
    pub active_agent: Option<String>,
    pub awaiting_parameters: bool,
    pub tool_context: Option<ToolContext>,
    pub global_memory_len: usize,
    /// Remembered turns not answered by plain chat
    pub agent_turns: usize,
    pub active_cluster: Option<ActiveClusterBinding>,
}

pub struct Router {
    agents: Vec<DomainAgent>,
    current_agent: Option<usize>,
    memory: SharedMemory,
    binding: Option<ActiveClusterBinding>,
    follow_up: Box<dyn FollowUpPolicy>,
    selector: AgentSelectionService,
    gateway: Arc<dyn LlmGateway>,
    params: EngineParams,
    logger: Arc<dyn ConversationLogger>,
}

impl Router {
    pub fn new(gateway: Arc<dyn LlmGateway>, agents: Vec<DomainAgent>, params: EngineParams) -> Self {
        Self {
            agents,
            current_agent: None,
            memory: Arc::new(Mutex::new(ConversationMemory::new(params.global_capacity))),
            binding: None,
            follow_up: Box::new(KeywordFollowUp::default()),
            selector: AgentSelectionService::new(gateway.clone()).with_history(params.share_history),
            gateway,
            params,
            logger: Arc::new(NoConversationLogger),
        }
    }

    /// Build one agent per profile, each bound to its operation table
    pub fn from_profiles(
        gateway: Arc<dyn LlmGateway>,
        profiles: impl IntoIterator<Item = (AgentProfile, OperationTable)>,
        params: EngineParams,
    ) -> Self {
        let agents = profiles
            .into_iter()
            .map(|(profile, operations)| {
                DomainAgent::new(profile, operations, gateway.clone(), params.clone())
            })
            .collect();
        Self::new(gateway, agents, params)
    }

    pub fn with_follow_up_policy(mut self, policy: Box<dyn FollowUpPolicy>) -> Self {
        self.follow_up = policy;
        self
    }

    /// Route conversation events to `logger`, for the router and every agent
    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.agents = std::mem::take(&mut self.agents)
            .into_iter()
            .map(|agent| agent.with_logger(logger.clone()))
            .collect();
        self.logger = logger;
        self
    }

    // ==================== Turns ====================

    /// Handle one user message
    pub async fn route(&mut self, text: &str) -> TurnReply {
        info!(request = truncate_str(text, 80), "Routing request");
        let contextual = self.contextual_parameters();

        if let Some(index) = self.current_agent {
            if self.agents[index].is_awaiting_parameters() {
                debug!(agent = %self.agents[index].key(), "Agent awaits parameters, skipping routing");
                return self.delegate(index, text, &contextual).await;
            }
            if self.params.sticky_follow_ups && self.follow_up.is_follow_up(text) {
                debug!(agent = %self.agents[index].key(), "Follow-up detected, staying with agent");
                return self.delegate(index, text, &contextual).await;
            }
        }

        let summary = self.memory_summary();
        let profiles: Vec<AgentProfile> = self.agents.iter().map(|a| a.profile().clone()).collect();
        let decision = self.selector.select(text, &profiles, &summary).await;

        info!(agent = ?decision.agent, reasoning = %decision.reasoning, "Routing decision");
        self.logger.log(ConversationEvent::new(
            "route_decision",
            json!({
                "agent": decision.agent,
                "reasoning": decision.reasoning,
            }),
        ));

        if decision.is_chat() {
            let response = decision
                .response
                .unwrap_or_else(|| DEFAULT_CHAT_RESPONSE.to_string());
            return TurnReply::Streamed(self.remember(ReplyStream::once(response), text, CHAT_ORIGIN));
        }

        let selected = decision.agent.as_deref().and_then(|key| self.agent_index(key));
        match selected {
            Some(index) => {
                self.current_agent = Some(index);
                let turns: Vec<ConversationTurn> = lock_memory(&self.memory)
                    .recent(self.params.sync_turns)
                    .cloned()
                    .collect();
                self.agents[index].sync_memory(&turns);
                self.delegate(index, text, &contextual).await
            }
            None => {
                let name = decision.agent.unwrap_or_else(|| "unknown".to_string());
                warn!(agent = %name, "Unrecognized routing category");
                self.current_agent = None;
                let message = format!(
                    "'{}' category was not recognized. Please name a valid category such as {}.",
                    name,
                    self.available_categories().join(", ")
                );
                lock_memory(&self.memory).append(text, message.clone(), ERROR_ORIGIN);
                TurnReply::failed(FailureKind::UnrecognizedCategory, message)
            }
        }
    }

    /// Complete the current agent's paused operation with collected values
    pub async fn finalize_request(
        &mut self,
        operation_name: &str,
        extracted: Map<String, Value>,
        collected: Map<String, Value>,
    ) -> TurnReply {
        let Some(index) = self.current_agent else {
            warn!(operation = %operation_name, "Finalize requested with no active agent");
            lock_memory(&self.memory).append("Tool finalization", NO_ACTIVE_AGENT_MESSAGE, ERROR_ORIGIN);
            return TurnReply::failed(FailureKind::NoActiveAgent, NO_ACTIVE_AGENT_MESSAGE);
        };

        let contextual = self.contextual_parameters();
        let agent = &mut self.agents[index];
        let request = agent
            .tool_context()
            .map(|ctx| ctx.originating_request.clone())
            .unwrap_or_else(|| operation_name.to_string());
        let label = agent.label().to_string();

        let stream = agent
            .finalize(operation_name, extracted, collected, &contextual)
            .await;
        TurnReply::Streamed(self.remember(stream, &request, &label))
    }

    async fn delegate(&mut self, index: usize, text: &str, contextual: &Map<String, Value>) -> TurnReply {
        let agent = &mut self.agents[index];
        let label = agent.label().to_string();
        match agent.process_request(text, contextual).await {
            TurnReply::Streamed(stream) => TurnReply::Streamed(self.remember(stream, text, &label)),
            other => other,
        }
    }

    /// Append the drained reply to global memory
    fn remember(&self, stream: ReplyStream, user: &str, origin: &str) -> ReplyStream {
        let memory = self.memory.clone();
        let logger = self.logger.clone();
        let user = user.to_string();
        let origin = origin.to_string();
        stream.on_complete(move |full| {
            logger.log(ConversationEvent::new(
                "turn_completed",
                json!({
                    "origin": origin,
                    "request": user,
                    "reply_chars": full.chars().count(),
                }),
            ));
            lock_memory(&memory).append(user, full, origin);
        })
    }

    // ==================== Resets ====================

    /// Forget everything: agent state, global memory and model-side history
    pub async fn reset_all(&mut self) {
        for agent in &mut self.agents {
            agent.reset();
        }
        self.current_agent = None;
        lock_memory(&self.memory).clear();
        self.gateway.clear_history().await;
        self.logger.log(ConversationEvent::new("reset", json!({"kind": "full"})));
        info!("All agent contexts and global memory cleared");
    }

    /// Abandon in-flight parameter collection, keeping all memory
    pub fn soft_reset(&mut self) {
        for agent in &mut self.agents {
            agent.soft_reset();
        }
        self.logger.log(ConversationEvent::new("reset", json!({"kind": "soft"})));
        info!("Soft reset: pending operations cleared, memory kept");
    }

    // ==================== Cluster binding ====================

    pub fn set_active_cluster(&mut self, cluster_id: impl Into<String>, cluster_name: Option<String>) {
        let binding = ActiveClusterBinding::new(cluster_id, cluster_name);
        info!(cluster_id = %binding.cluster_id, name = %binding.display_name(), "Active cluster set");
        for agent in &mut self.agents {
            agent.rebuild_registry(Some(&binding.cluster_id));
        }
        self.binding = Some(binding);
    }

    pub fn clear_active_cluster(&mut self) {
        for agent in &mut self.agents {
            agent.rebuild_registry(None);
        }
        self.binding = None;
    }

    pub fn active_cluster(&self) -> Option<&ActiveClusterBinding> {
        self.binding.as_ref()
    }

    /// Values available for contextual injection
    pub fn contextual_parameters(&self) -> Map<String, Value> {
        contextual_parameters(self.binding.as_ref())
    }

    // ==================== Queries ====================

    pub fn status(&self) -> RouterStatus {
        let current = self.current();
        let memory = lock_memory(&self.memory);
        RouterStatus {
            active_agent: current.map(|a| a.key().to_string()),
            awaiting_parameters: current.is_some_and(|a| a.is_awaiting_parameters()),
            tool_context: current.and_then(|a| a.tool_context().cloned()),
            global_memory_len: memory.len(),
            agent_turns: memory.turns().filter(|t| t.origin != CHAT_ORIGIN).count(),
            active_cluster: self.binding.clone(),
        }
    }

    pub fn available_categories(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.key()).collect()
    }

    pub fn current(&self) -> Option<&DomainAgent> {
        self.current_agent.map(|i| &self.agents[i])
    }

    pub fn agent(&self, key: &str) -> Option<&DomainAgent> {
        self.agent_index(key).map(|i| &self.agents[i])
    }

    pub fn global_turns(&self) -> Vec<ConversationTurn> {
        lock_memory(&self.memory).turns().cloned().collect()
    }

    /// Human-readable overview of the global memory
    pub fn conversation_summary(&self) -> String {
        let memory = lock_memory(&self.memory);
        if memory.is_empty() {
            return EMPTY_HISTORY.to_string();
        }
        format!(
            "{} interactions so far.\n\nRecent interactions:\n{}",
            memory.len(),
            memory.summary(self.params.summary_turns, self.params.summary_chars)
        )
    }

    // ==================== Direct operations ====================

    /// Run an agent's operation without any model call
    pub async fn invoke_operation(
        &self,
        agent_key: &str,
        operation_name: &str,
        mut parameters: Map<String, Value>,
    ) -> OperationResult {
        let Some(agent) = self.agent(agent_key) else {
            return OperationResult::failure(DomainError::UnknownAgent(agent_key.to_string()).to_string());
        };
        if let Some(tool) = agent.registry().get_resolved(operation_name) {
            kubex_domain::agent::inject_contextual(tool, &mut parameters, &self.contextual_parameters());
        }
        agent.invoke(operation_name, &parameters).await
    }

    /// Registered clusters, fetched directly for selection menus
    pub async fn list_clusters(&self) -> Vec<Value> {
        match self.invoke_operation(CLUSTER_AGENT, "list_clusters", Map::new()).await {
            OperationResult::Success(payload) => cluster_records(payload),
            OperationResult::Failure(message) => {
                warn!(error = %message, "Could not fetch cluster list");
                Vec::new()
            }
        }
    }

    fn agent_index(&self, key: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.key() == key)
    }

    fn memory_summary(&self) -> String {
        lock_memory(&self.memory).summary(self.params.summary_turns, self.params.summary_chars)
    }
}

/// Accepts `{clusters: {records: [...]}}`, `{clusters: [...]}` or a bare list
fn cluster_records(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("clusters") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(mut clusters)) => match clusters.remove("records") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("agents", &self.agents)
            .field("current_agent", &self.current_agent)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}
