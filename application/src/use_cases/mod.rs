//! Use cases
//!
//! Application-level operations that orchestrate domain logic: the three
//! model-backed services, the domain agent state machine and the router.

pub mod domain_agent;
pub mod reply;
pub mod router;
pub mod select_agent;
pub mod select_tool;
pub mod summarize_result;

#[cfg(test)]
pub(crate) mod test_support;
