//! The routing agent for cvagent.
//!
//! A question is answered in one pass:
//!
//! 1. **Resolve** the subjects it mentions ([`SubjectResolver`])
//! 2. **Retrieve** each subject's context ([`ContextAggregator`])
//! 3. **Generate** a single model response with the context and the last
//!    few turns ([`ConversationMemory`])
//!
//! [`RoutingAgent`] ties the steps together.

pub mod aggregator;
pub mod conversation;
pub mod resolver;
pub mod routing_agent;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use aggregator::{AggregatedContext, ContextAggregator, ContextBlock};
pub use conversation::{ConversationMemory, ConversationTurn};
pub use resolver::{SubjectResolver, normalize};
pub use routing_agent::{ATTRIBUTION_INSTRUCTION, RoutingAgent, RoutingResult, final_prompt};
