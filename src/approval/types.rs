// ABOUTME: Core types for per-tool safety gating.
// ABOUTME: GateOutcome is what a tool's pre-execution check hands back to the registry.

/// The outcome of a tool's pre-execution check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Tool call may run.
    Allow,
    /// Tool call is refused; `reason` is returned to the model as the tool result.
    Deny { reason: String },
}

impl GateOutcome {
    pub fn deny(reason: impl Into<String>) -> Self {
        GateOutcome::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GateOutcome::Allow)
    }
}
