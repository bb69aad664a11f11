// ABOUTME: Per-tool safety gating for model-requested tool calls.
// ABOUTME: Query analysis flags write clauses; tools turn that into a gate outcome.

pub mod analysis;
pub mod types;

pub use analysis::*;
pub use types::*;
