// ABOUTME: Per-run conversation state: ordered history, step counter, and step budget.
// ABOUTME: Enforces the tool-result correlation invariant as messages are appended.

use std::collections::HashSet;

use crate::agent::message::Message;
use crate::error::ProtocolViolation;

/// State owned by a single run. Created fresh per user message, never shared.
#[derive(Debug, Clone)]
pub struct RunState {
    messages: Vec<Message>,
    steps: u32,
    max_steps: u32,
    model_calls: u32,
}

impl RunState {
    pub fn new(max_steps: u32) -> Self {
        Self {
            messages: Vec::new(),
            steps: 0,
            max_steps,
            model_calls: 0,
        }
    }

    /// Seed a run with the system instruction and the user's message.
    pub fn seeded(max_steps: u32, system_prompt: &str, user_message: &str) -> Self {
        let mut state = Self::new(max_steps);
        state.messages.push(Message::system(system_prompt));
        state.messages.push(Message::user(user_message));
        state
    }

    /// Append a message, rejecting tool results that do not answer a pending
    /// request of the immediately preceding assistant message.
    pub fn push(&mut self, message: Message) -> Result<(), ProtocolViolation> {
        match &message {
            Message::Tool { tool_call_id, .. } => self.check_tool_result(tool_call_id)?,
            Message::Assistant { tool_calls, .. } => {
                let mut seen = HashSet::new();
                for call in tool_calls {
                    if !seen.insert(call.id.as_str()) {
                        return Err(ProtocolViolation::DuplicateCallId(call.id.clone()));
                    }
                }
            }
            _ => {}
        }
        self.messages.push(message);
        Ok(())
    }

    fn check_tool_result(&self, id: &str) -> Result<(), ProtocolViolation> {
        let mut answered = HashSet::new();
        for msg in self.messages.iter().rev() {
            match msg {
                Message::Tool { tool_call_id, .. } => {
                    answered.insert(tool_call_id.as_str());
                }
                Message::Assistant { tool_calls, .. } => {
                    if !tool_calls.iter().any(|c| c.id == id) {
                        break;
                    }
                    if answered.contains(id) {
                        return Err(ProtocolViolation::DuplicateToolResult(id.to_string()));
                    }
                    return Ok(());
                }
                _ => break,
            }
        }
        Err(ProtocolViolation::UnmatchedToolResult(id.to_string()))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Completed model-call/tool-dispatch cycles.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn model_calls(&self) -> u32 {
        self.model_calls
    }

    /// True once no further model call may be issued.
    pub fn budget_exhausted(&self) -> bool {
        self.steps >= self.max_steps
    }

    pub fn record_model_call(&mut self) {
        self.model_calls += 1;
    }

    pub fn complete_step(&mut self) {
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::{ToolArguments, ToolInvocationRequest};

    fn call(id: &str) -> ToolInvocationRequest {
        ToolInvocationRequest::new(id, "query_graph", ToolArguments::new())
    }

    fn assistant_with(ids: &[&str]) -> Message {
        Message::Assistant {
            content: String::new(),
            tool_calls: ids.iter().map(|id| call(id)).collect(),
        }
    }

    #[test]
    fn seeded_state_has_system_then_user() {
        let state = RunState::seeded(10, "sys", "hello");
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[0].role(), "system");
        assert_eq!(state.messages()[1].content(), "hello");
        assert_eq!(state.steps(), 0);
        assert!(!state.budget_exhausted());
    }

    #[test]
    fn tool_result_matching_preceding_request_is_accepted() {
        let mut state = RunState::seeded(10, "sys", "q");
        state.push(assistant_with(&["a", "b"])).unwrap();
        state.push(Message::tool_result("a", "1")).unwrap();
        state.push(Message::tool_result("b", "2")).unwrap();
        assert_eq!(state.messages().len(), 5);
    }

    #[test]
    fn tool_result_without_request_is_rejected() {
        let mut state = RunState::seeded(10, "sys", "q");
        let err = state.push(Message::tool_result("ghost", "x")).unwrap_err();
        assert_eq!(err, ProtocolViolation::UnmatchedToolResult("ghost".into()));
        assert_eq!(state.messages().len(), 2);
    }

    #[test]
    fn tool_result_for_older_turn_is_rejected() {
        let mut state = RunState::seeded(10, "sys", "q");
        state.push(assistant_with(&["a"])).unwrap();
        state.push(Message::tool_result("a", "1")).unwrap();
        state.push(assistant_with(&["b"])).unwrap();
        let err = state.push(Message::tool_result("a", "again")).unwrap_err();
        assert_eq!(err, ProtocolViolation::UnmatchedToolResult("a".into()));
    }

    #[test]
    fn second_result_for_same_call_is_rejected() {
        let mut state = RunState::seeded(10, "sys", "q");
        state.push(assistant_with(&["a"])).unwrap();
        state.push(Message::tool_result("a", "1")).unwrap();
        let err = state.push(Message::tool_result("a", "2")).unwrap_err();
        assert_eq!(err, ProtocolViolation::DuplicateToolResult("a".into()));
    }

    #[test]
    fn duplicate_call_ids_in_one_turn_are_rejected() {
        let mut state = RunState::seeded(10, "sys", "q");
        let err = state.push(assistant_with(&["a", "a"])).unwrap_err();
        assert_eq!(err, ProtocolViolation::DuplicateCallId("a".into()));
    }

    #[test]
    fn budget_exhausts_after_max_steps() {
        let mut state = RunState::new(2);
        state.complete_step();
        assert!(!state.budget_exhausted());
        state.complete_step();
        assert!(state.budget_exhausted());
    }

    #[test]
    fn zero_budget_is_exhausted_immediately() {
        assert!(RunState::new(0).budget_exhausted());
    }
}
