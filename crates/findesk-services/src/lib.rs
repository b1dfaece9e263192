//! Findesk Services Library
//!
//! The reconciliation core: matching workflow files to financial records and
//! completing them into company document archives.

pub mod completion;
pub mod lifecycle;
pub mod matcher;

pub use completion::{
    CompletionEngine, CompletionOutcome, DecisionPrompt, DecisionReason, DECISION_OPTIONS,
};
pub use lifecycle::FileLifecycleService;
pub use matcher::RecordMatcher;
