use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::workflows::assignment::domain::{CaId, ClientId, FirmId, ServiceType, UserId};
use crate::workflows::assignment::repository::{
    Notice, NotificationKind, Notifier, Recipient, RepositoryError,
};

use super::conflict::{ConflictConfig, ConflictContext};
use super::domain::{
    ApprovedConditions, ConflictReport, IndependentRequestId, IndependentWorkRequest,
    IndependentWorkStatus,
};
use super::policy::{PolicyOutcome, PolicyResolver, PolicyViolation};
use super::repository::IndependentWorkRepository;
use crate::workflows::assignment::MemberRole;

/// Inbound payload for a new independent-work request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndependentWorkSubmission {
    pub ca_id: CaId,
    pub firm_id: FirmId,
    pub client_id: ClientId,
    pub service_type: ServiceType,
    pub description: String,
    pub estimated_hours: u16,
    pub estimated_revenue: f64,
}

/// Stored request plus the conflict report produced on submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub request: IndependentWorkRequest,
    pub report: ConflictReport,
}

/// Firm-admin decision payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Decision {
    #[serde(flatten)]
    pub action: DecisionAction,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DecisionAction {
    Approve {
        #[serde(default)]
        commission_percent: Option<f32>,
        #[serde(default)]
        weekends_only: bool,
        #[serde(default)]
        after_hours_only: bool,
        #[serde(default)]
        max_hours_week: Option<u16>,
        #[serde(default)]
        valid_until: Option<NaiveDate>,
    },
    Reject,
}

/// Error raised by the independent-work service. Conflict detection itself
/// never fails; it always produces a report.
#[derive(Debug, thiserror::Error)]
pub enum IndependentWorkError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error("caller does not hold the admin role in the firm")]
    Forbidden,
    #[error("professional has no active membership in the firm")]
    NotEligible,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("request has already been decided")]
    AlreadyDecided,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> IndependentRequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    IndependentRequestId(format!("iwr-{id:06}"))
}

/// Service composing the policy resolver, conflict detector, and store for
/// independent-work requests.
pub struct IndependentWorkService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    resolver: PolicyResolver,
}

impl<R, N> IndependentWorkService<R, N>
where
    R: IndependentWorkRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, config: ConflictConfig) -> Self {
        Self {
            repository,
            notifier,
            resolver: PolicyResolver::new(config),
        }
    }

    /// Submit a request: policy preflight, conflict battery, then persist the
    /// resolved status. A forbidding policy fails before any conflict data is
    /// fetched, so the error path carries no report.
    pub fn submit(
        &self,
        submission: IndependentWorkSubmission,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, IndependentWorkError> {
        let firm = self
            .repository
            .firm(&submission.firm_id)?
            .ok_or(IndependentWorkError::NotFound("firm"))?;
        self.repository
            .active_membership(&submission.firm_id, &submission.ca_id)?
            .ok_or(IndependentWorkError::NotEligible)?;

        self.resolver.preflight(&firm, submission.estimated_hours)?;

        let snapshot = self.repository.conflict_snapshot(
            &submission.firm_id,
            &submission.ca_id,
            &submission.client_id,
            submission.service_type,
        )?;
        let decision = self.resolver.evaluate(ConflictContext {
            now,
            firm,
            service_type: submission.service_type,
            description: submission.description.clone(),
            estimated_hours: submission.estimated_hours,
            snapshot,
            strict_client_history: false,
        });

        let report = decision.report;
        let (status, commission_percent, approved_conditions) = match decision.outcome {
            PolicyOutcome::AutoApproved { commission_percent } => (
                IndependentWorkStatus::Approved,
                commission_percent,
                Some(ApprovedConditions {
                    commission_percent,
                    weekends_only: false,
                    after_hours_only: false,
                    max_hours_week: None,
                    valid_until: None,
                }),
            ),
            PolicyOutcome::AutoRejected => (
                IndependentWorkStatus::Rejected,
                report.suggested_commission_percent,
                None,
            ),
            PolicyOutcome::PendingApproval => (
                IndependentWorkStatus::PendingApproval,
                report.suggested_commission_percent,
                None,
            ),
        };

        let request = IndependentWorkRequest {
            id: next_request_id(),
            ca_id: submission.ca_id.clone(),
            firm_id: submission.firm_id.clone(),
            client_id: submission.client_id.clone(),
            service_type: submission.service_type,
            description: submission.description,
            estimated_hours: submission.estimated_hours,
            estimated_revenue: submission.estimated_revenue,
            status,
            conflict_level: report.level,
            findings: report.findings.clone(),
            commission_percent,
            approved_conditions,
            decided_by: None,
            decision_reason: None,
            submitted_at: now,
        };
        let stored = self.repository.insert(request)?;

        info!(
            request = %stored.id.0,
            ca = %stored.ca_id.0,
            level = stored.conflict_level.label(),
            status = stored.status.label(),
            "independent work request submitted"
        );

        self.notify_professional(&stored);
        if stored.status == IndependentWorkStatus::PendingApproval {
            self.notify_firm_admin(&stored);
        }

        Ok(SubmissionOutcome {
            request: stored,
            report,
        })
    }

    /// Firm-admin approval or rejection of a pending request.
    pub fn decide(
        &self,
        request_id: &IndependentRequestId,
        actor: &UserId,
        decision: Decision,
    ) -> Result<IndependentWorkRequest, IndependentWorkError> {
        let mut request = self
            .repository
            .fetch(request_id)?
            .ok_or(IndependentWorkError::NotFound("independent work request"))?;

        if request.status != IndependentWorkStatus::PendingApproval {
            return Err(IndependentWorkError::AlreadyDecided);
        }

        let firm = self
            .repository
            .firm(&request.firm_id)?
            .ok_or(IndependentWorkError::NotFound("firm"))?;
        match self.repository.actor_role(&request.firm_id, actor)? {
            Some(MemberRole::Admin) => {}
            _ => return Err(IndependentWorkError::Forbidden),
        }

        match decision.action {
            DecisionAction::Approve {
                commission_percent,
                weekends_only,
                after_hours_only,
                max_hours_week,
                valid_until,
            } => {
                let commission =
                    firm.clamp_commission(commission_percent.unwrap_or(request.commission_percent));
                request.status = IndependentWorkStatus::Approved;
                request.commission_percent = commission;
                request.approved_conditions = Some(ApprovedConditions {
                    commission_percent: commission,
                    weekends_only,
                    after_hours_only,
                    max_hours_week,
                    valid_until,
                });
            }
            DecisionAction::Reject => {
                request.status = IndependentWorkStatus::Rejected;
            }
        }
        request.decided_by = Some(actor.clone());
        request.decision_reason = decision.reason;

        self.repository.update(request.clone())?;

        info!(
            request = %request.id.0,
            status = request.status.label(),
            "independent work request decided"
        );
        self.notify_professional(&request);

        Ok(request)
    }

    pub fn get(
        &self,
        request_id: &IndependentRequestId,
    ) -> Result<IndependentWorkRequest, IndependentWorkError> {
        self.repository
            .fetch(request_id)?
            .ok_or(IndependentWorkError::NotFound("independent work request"))
    }

    fn notify_professional(&self, request: &IndependentWorkRequest) {
        let mut details = BTreeMap::new();
        details.insert("request_id".to_string(), request.id.0.clone());
        details.insert("status".to_string(), request.status.label().to_string());
        details.insert(
            "conflict_level".to_string(),
            request.conflict_level.label().to_string(),
        );
        self.dispatch(Notice {
            recipient: Recipient::Professional(request.ca_id.clone()),
            kind: NotificationKind::IndependentWorkDecision,
            details,
        });
    }

    fn notify_firm_admin(&self, request: &IndependentWorkRequest) {
        let mut details = BTreeMap::new();
        details.insert("request_id".to_string(), request.id.0.clone());
        details.insert("ca_id".to_string(), request.ca_id.0.clone());
        details.insert(
            "conflict_level".to_string(),
            request.conflict_level.label().to_string(),
        );
        self.dispatch(Notice {
            recipient: Recipient::FirmAdmin(request.firm_id.clone()),
            kind: NotificationKind::ManualAssignmentRequired,
            details,
        });
    }

    fn dispatch(&self, notice: Notice) {
        if let Err(err) = self.notifier.notify(notice) {
            warn!(error = %err, "notification dispatch failed");
        }
    }
}
