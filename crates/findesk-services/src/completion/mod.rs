//! Completion: moving a workflow file out of the inbox into one or two
//! companies' permanent document stores.

mod engine;
mod plan;

pub use engine::{CompletionEngine, CompletionOutcome, DecisionPrompt, DECISION_OPTIONS};
pub use plan::{reference_date, required_decision, year_month, DecisionReason, Destination};
