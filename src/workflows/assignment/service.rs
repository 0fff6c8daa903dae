use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::AssignmentConfig;
use super::domain::{
    AssignmentMethod, AssignmentState, CaId, FirmId, MemberRole, RequestId, ServiceRequest, UserId,
    VerificationStatus,
};
use super::eligibility::{filter_candidates, IneligibilityCause};
use super::repository::{
    AssignmentCommit, AssignmentEvent, AssignmentRepository, Notice, NotificationKind, Notifier,
    Recipient, RepositoryError,
};
use super::scoring::{CandidateScore, ScoringEngine};

/// Why auto-assignment deferred to a firm administrator. Surfaced to admins
/// as structured data; `summary` renders the advisory text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManualReason {
    AutoAssignmentDisabled,
    NoEligibleCandidates {
        excluded: Vec<(CaId, IneligibilityCause)>,
    },
    BestScoreBelowThreshold {
        best_score: u8,
        threshold: u8,
    },
}

impl ManualReason {
    pub fn summary(&self) -> String {
        match self {
            ManualReason::AutoAssignmentDisabled => {
                "auto-assignment is disabled for this firm".to_string()
            }
            ManualReason::NoEligibleCandidates { excluded } => {
                if excluded.is_empty() {
                    "no members on the active roster".to_string()
                } else {
                    let causes: Vec<String> = excluded
                        .iter()
                        .map(|(ca, cause)| format!("{}: {}", ca.0, cause.summary()))
                        .collect();
                    format!("no eligible candidates ({})", causes.join("; "))
                }
            }
            ManualReason::BestScoreBelowThreshold {
                best_score,
                threshold,
            } => format!("best candidate scored {best_score}, below threshold {threshold}"),
        }
    }
}

/// Result of an auto-assignment attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Auto {
        request: ServiceRequest,
        winner: CandidateScore,
        /// Runner-up candidates retained for admin visibility even on success.
        alternatives: Vec<CandidateScore>,
    },
    ManualRequired {
        reasons: Vec<ManualReason>,
    },
}

/// Ranked candidate listing for a request, with the members that were
/// filtered out and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub candidates: Vec<CandidateScore>,
    pub excluded: Vec<(CaId, IneligibilityCause)>,
}

/// Error raised by the assignment orchestrator. Scoring itself never fails;
/// domain errors originate from the precondition checks here.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("request is no longer unassigned")]
    AlreadyAssigned,
    #[error("caller does not hold the admin role in the target firm")]
    Forbidden,
    #[error("professional is not eligible: {}", .0.summary())]
    NotEligible(IneligibilityCause),
    #[error("professional's specializations do not cover the requested service type")]
    SpecializationMismatch,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("request does not target a firm")]
    NoTargetFirm,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Orchestrator for the assignment facet of service requests. All mutations
/// go through the repository's atomic commit points; notifications are
/// dispatched after commit and never fail the assignment.
pub struct AssignmentService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    engine: ScoringEngine,
}

impl<R, N> AssignmentService<R, N>
where
    R: AssignmentRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, config: AssignmentConfig) -> Self {
        Self {
            repository,
            notifier,
            engine: ScoringEngine::new(config),
        }
    }

    fn config(&self) -> &AssignmentConfig {
        self.engine.config()
    }

    /// Run eligibility filtering and scoring over the firm roster and either
    /// commit the top candidate or park the request for manual assignment.
    pub fn auto_assign(&self, request_id: &RequestId) -> Result<AssignmentOutcome, AssignmentError> {
        let request = self
            .repository
            .service_request(request_id)?
            .ok_or(AssignmentError::NotFound("service request"))?;

        if request.assignment_state != AssignmentState::Unassigned {
            return Err(AssignmentError::AlreadyAssigned);
        }

        let firm_id = request
            .firm_id
            .clone()
            .ok_or(AssignmentError::NoTargetFirm)?;
        let firm = self
            .repository
            .firm(&firm_id)?
            .ok_or(AssignmentError::NotFound("firm"))?;

        if !firm.auto_assignment_enabled {
            return self.defer_to_manual(&request, &firm_id, ManualReason::AutoAssignmentDisabled);
        }

        let roster = self.repository.roster(&firm_id)?;
        let report = filter_candidates(&request, roster, self.config(), false);
        if report.eligible.is_empty() {
            return self.defer_to_manual(
                &request,
                &firm_id,
                ManualReason::NoEligibleCandidates {
                    excluded: report.excluded,
                },
            );
        }

        let ranked = self.engine.rank(&request, &report.eligible);
        let winner = ranked[0].clone();
        let threshold = self.config().min_auto_assign_score;
        if winner.score < threshold {
            return self.defer_to_manual(
                &request,
                &firm_id,
                ManualReason::BestScoreBelowThreshold {
                    best_score: winner.score,
                    threshold,
                },
            );
        }

        let commit = AssignmentCommit {
            ca_id: winner.ca_id.clone(),
            method: AssignmentMethod::Auto,
            assigned_by: None,
            score: Some(winner.score),
            reason: None,
        };
        let updated = self
            .repository
            .assign_if_unassigned(request_id, &commit)?
            .ok_or(AssignmentError::AlreadyAssigned)?;

        self.repository.record_event(AssignmentEvent {
            request_id: request_id.clone(),
            ca_id: winner.ca_id.clone(),
            method: AssignmentMethod::Auto,
            actor: None,
            reason: None,
            previous_ca: None,
            at: Utc::now(),
        })?;

        info!(
            request = %request_id.0,
            ca = %winner.ca_id.0,
            score = winner.score,
            "auto-assigned service request"
        );
        self.notify_assignment(&updated, &winner.ca_id);

        let alternatives: Vec<CandidateScore> = ranked
            .into_iter()
            .filter(|candidate| candidate.ca_id != winner.ca_id)
            .take(self.config().alternative_limit)
            .collect();

        Ok(AssignmentOutcome::Auto {
            request: updated,
            winner,
            alternatives,
        })
    }

    /// Direct assignment by a firm administrator. Bypasses scoring but still
    /// validates verification, active membership, and (unless overridden)
    /// specialization.
    pub fn manual_assign(
        &self,
        request_id: &RequestId,
        ca_id: &CaId,
        actor: &UserId,
        reason: Option<String>,
        override_specialization: bool,
    ) -> Result<ServiceRequest, AssignmentError> {
        let request = self
            .repository
            .service_request(request_id)?
            .ok_or(AssignmentError::NotFound("service request"))?;

        if request.assignment_state.is_assigned() {
            return Err(AssignmentError::AlreadyAssigned);
        }

        let firm_id = request
            .firm_id
            .clone()
            .ok_or(AssignmentError::NoTargetFirm)?;
        self.require_admin(&firm_id, actor)?;
        self.validate_target(&request, &firm_id, ca_id, override_specialization)?;

        let commit = AssignmentCommit {
            ca_id: ca_id.clone(),
            method: AssignmentMethod::Manual,
            assigned_by: Some(actor.clone()),
            score: None,
            reason: reason.clone(),
        };
        let updated = self
            .repository
            .assign_if_unassigned(request_id, &commit)?
            .ok_or(AssignmentError::AlreadyAssigned)?;

        self.repository.record_event(AssignmentEvent {
            request_id: request_id.clone(),
            ca_id: ca_id.clone(),
            method: AssignmentMethod::Manual,
            actor: Some(actor.clone()),
            reason,
            previous_ca: None,
            at: Utc::now(),
        })?;

        info!(request = %request_id.0, ca = %ca_id.0, "manually assigned service request");
        self.notify_assignment(&updated, ca_id);
        Ok(updated)
    }

    /// Reassign an already-assigned request. The only path allowed to replace
    /// an existing assignment; the original auto-assignment score survives as
    /// audit metadata.
    pub fn override_assignment(
        &self,
        request_id: &RequestId,
        new_ca_id: &CaId,
        actor: &UserId,
        reason: Option<String>,
    ) -> Result<ServiceRequest, AssignmentError> {
        let request = self
            .repository
            .service_request(request_id)?
            .ok_or(AssignmentError::NotFound("service request"))?;

        let firm_id = request
            .firm_id
            .clone()
            .ok_or(AssignmentError::NoTargetFirm)?;
        self.require_admin(&firm_id, actor)?;
        self.validate_target(&request, &firm_id, new_ca_id, false)?;

        let previous_ca = request.ca_id.clone();
        let commit = AssignmentCommit {
            ca_id: new_ca_id.clone(),
            method: AssignmentMethod::Manual,
            assigned_by: Some(actor.clone()),
            score: None,
            reason: reason.clone(),
        };
        let updated = self.repository.reassign(request_id, &commit)?;

        self.repository.record_event(AssignmentEvent {
            request_id: request_id.clone(),
            ca_id: new_ca_id.clone(),
            method: AssignmentMethod::Manual,
            actor: Some(actor.clone()),
            reason,
            previous_ca,
            at: Utc::now(),
        })?;

        info!(request = %request_id.0, ca = %new_ca_id.0, "overrode service request assignment");
        self.notify_assignment(&updated, new_ca_id);
        Ok(updated)
    }

    /// Ranked candidate list with score breakdowns for admin review. Pure
    /// read; deterministic over a fixed snapshot.
    pub fn recommendations(
        &self,
        request_id: &RequestId,
        limit: usize,
    ) -> Result<RecommendationReport, AssignmentError> {
        let request = self
            .repository
            .service_request(request_id)?
            .ok_or(AssignmentError::NotFound("service request"))?;
        let firm_id = request
            .firm_id
            .clone()
            .ok_or(AssignmentError::NoTargetFirm)?;

        let roster = self.repository.roster(&firm_id)?;
        let report = filter_candidates(&request, roster, self.config(), false);
        let mut candidates = self.engine.rank(&request, &report.eligible);
        candidates.truncate(limit);

        Ok(RecommendationReport {
            candidates,
            excluded: report.excluded,
        })
    }

    fn require_admin(&self, firm_id: &FirmId, actor: &UserId) -> Result<(), AssignmentError> {
        match self.repository.actor_role(firm_id, actor)? {
            Some(MemberRole::Admin) => Ok(()),
            _ => Err(AssignmentError::Forbidden),
        }
    }

    fn validate_target(
        &self,
        request: &ServiceRequest,
        firm_id: &FirmId,
        ca_id: &CaId,
        override_specialization: bool,
    ) -> Result<(), AssignmentError> {
        let candidate = self
            .repository
            .candidate(firm_id, ca_id)?
            .ok_or(AssignmentError::NotFound("professional"))?;

        if candidate.profile.verification != VerificationStatus::Verified {
            return Err(AssignmentError::NotEligible(IneligibilityCause::NotVerified));
        }
        if !candidate.membership.is_active {
            return Err(AssignmentError::NotEligible(
                IneligibilityCause::InactiveMembership,
            ));
        }
        if !override_specialization && !candidate.profile.covers(request.service_type) {
            return Err(AssignmentError::SpecializationMismatch);
        }
        Ok(())
    }

    fn defer_to_manual(
        &self,
        request: &ServiceRequest,
        firm_id: &FirmId,
        reason: ManualReason,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        self.repository.mark_pending_manual(&request.id)?;

        let mut details = BTreeMap::new();
        details.insert("request_id".to_string(), request.id.0.clone());
        details.insert("reason".to_string(), reason.summary());
        self.dispatch(Notice {
            recipient: Recipient::FirmAdmin(firm_id.clone()),
            kind: NotificationKind::ManualAssignmentRequired,
            details,
        });

        info!(request = %request.id.0, reason = %reason.summary(), "deferred to manual assignment");
        Ok(AssignmentOutcome::ManualRequired {
            reasons: vec![reason],
        })
    }

    fn notify_assignment(&self, request: &ServiceRequest, ca_id: &CaId) {
        let mut details = BTreeMap::new();
        details.insert("request_id".to_string(), request.id.0.clone());
        details.insert("ca_id".to_string(), ca_id.0.clone());
        details.insert(
            "service_type".to_string(),
            request.service_type.label().to_string(),
        );

        self.dispatch(Notice {
            recipient: Recipient::Client(request.client_id.clone()),
            kind: NotificationKind::RequestAssignedClient,
            details: details.clone(),
        });
        self.dispatch(Notice {
            recipient: Recipient::Professional(ca_id.clone()),
            kind: NotificationKind::RequestAssignedProfessional,
            details,
        });
    }

    /// Best-effort dispatch. A slow or failing notifier never rolls back or
    /// fails the assignment that triggered it.
    fn dispatch(&self, notice: Notice) {
        if let Err(err) = self.notifier.notify(notice) {
            warn!(error = %err, "notification dispatch failed");
        }
    }
}
