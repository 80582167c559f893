//! Prompt templates for routing and result summarization

use crate::agent::AgentProfile;
use serde_json::Value;

/// Templates used by the router and the summarization step
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for choosing a domain agent (or plain chat)
    pub fn routing_system(agents: &[AgentProfile], context_summary: &str) -> String {
        let agents_text = agents
            .iter()
            .map(|a| format!("- {}: {} - {}", a.key, a.label, a.description))
            .collect::<Vec<_>>()
            .join("\n");

        let context_info = if context_summary.is_empty() {
            String::new()
        } else {
            format!("\n### RECENT CONVERSATION ###\n{}\n", context_summary)
        };

        format!(
            r#"### ROLE ###
You are the triage specialist of KUBEX, a Kubernetes management platform.
Analyze the user's request and decide which area of expertise (agent) should handle it.

### AGENTS ###
{agents_text}
{context_info}
### DECISION PROCESS ###
1. **Intent:** What does the user want (list, create, delete, inspect, general chat, ...)?
2. **Resource:** Which resource is at the center of the request (cluster, namespace, deployment, repository, ...)?
3. **Context:** Use the recent conversation to tell whether the user continues a previous step.

### OUTPUT FORMAT ###
Return **ONLY** a JSON object in the following format. Do not add any other text.

```json
{{
  "agent": "agent_key | chat",
  "reasoning": "Short reason for the decision.",
  "response": "If agent is 'chat', the conversational reply for the user."
}}
```"#
        )
    }

    /// Prompt asking the model to explain an operation result
    pub fn summary_prompt(result: &Value, originating_request: &str) -> String {
        let json_data =
            serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());

        format!(
            r#"### TASK ###
You receive technical JSON returned by a Kubernetes management API. Present the outcome to the user.
You are a friendly, proactive interpreter who makes technical information simple.

### INSTRUCTIONS ###
1. **Keep the context:** Answer with the user's original request in mind.
2. **Success:** If the operation succeeded (`status: success`), summarize the result. If a list is empty, say so explicitly.
3. **Error:** If the operation failed (`status: error` or an `error` field), explain the error in plain language, guess the likely cause and suggest a next step.

### DATA ###
**ORIGINAL USER REQUEST:** {originating_request}

**TECHNICAL JSON TO PROCESS:**
{json_data}

### OUTPUT ###
Write a fluent, natural-language answer following the instructions above."#
        )
    }
}
