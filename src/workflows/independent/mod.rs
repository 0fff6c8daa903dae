//! Independent-work requests: the conflict-check battery, the firm policy
//! resolver, and the submission/decision orchestration.

pub(crate) mod conflict;
pub mod domain;
pub mod memory;
pub(crate) mod policy;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use conflict::{
    run_checks, scope_similarity, CommissionLadder, ConflictConfig, ConflictContext,
    ConflictSnapshot, EngagementSummary,
};
pub use domain::{
    ApprovedConditions, ConflictFinding, ConflictLevel, ConflictReport, IndependentRequestId,
    IndependentWorkRequest, IndependentWorkStatus, IndependentWorkView, Recommendation,
    ReportedFinding,
};
pub use memory::MemoryIndependentStore;
pub use policy::{PolicyDecision, PolicyOutcome, PolicyResolver, PolicyViolation};
pub use repository::IndependentWorkRepository;
pub use router::independent_work_router;
pub use service::{
    Decision, DecisionAction, IndependentWorkError, IndependentWorkService,
    IndependentWorkSubmission, SubmissionOutcome,
};
