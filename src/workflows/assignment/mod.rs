//! Hybrid assignment engine: eligibility filtering, weighted scoring, and the
//! orchestration that commits auto or manual assignments against the store.

pub mod config;
pub mod domain;
pub(crate) mod eligibility;
pub mod memory;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::{AssignmentConfig, BusinessHours, ScoringWeights};
pub use domain::{
    AssignmentMethod, AssignmentState, CaFirm, CaId, CandidateSnapshot, ClientId, FirmId,
    FirmMembership, IndependentWorkPolicy, MemberRole, ProfessionalProfile, RequestId,
    RequestStatus, ServiceHistory, ServiceRequest, ServiceType, UserId, VerificationStatus,
};
pub use eligibility::{filter_candidates, EligibilityReport, IneligibilityCause};
pub use memory::{MemoryAssignmentStore, MemoryNotifier};
pub use repository::{
    AssignmentCommit, AssignmentEvent, AssignmentRepository, AssignmentView, Notice,
    NotificationKind, Notifier, NotifyError, Recipient, RepositoryError,
};
pub use router::assignment_router;
pub use scoring::{CandidateScore, ScoreBreakdown, ScoreFactor, ScoringEngine};
pub use service::{
    AssignmentError, AssignmentOutcome, AssignmentService, ManualReason, RecommendationReport,
};
