use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AssignmentMethod, AssignmentState, CaId, CaFirm, CandidateSnapshot, ClientId, FirmId,
    MemberRole, RequestId, ServiceRequest, UserId,
};

/// Fields written when an assignment commits. The store applies these
/// together with the state transition in a single atomic update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentCommit {
    pub ca_id: CaId,
    pub method: AssignmentMethod,
    pub assigned_by: Option<UserId>,
    pub score: Option<u8>,
    pub reason: Option<String>,
}

/// Append-only audit record of an assignment decision. Overrides create a new
/// event rather than mutating history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEvent {
    pub request_id: RequestId,
    pub ca_id: CaId,
    pub method: AssignmentMethod,
    pub actor: Option<UserId>,
    pub reason: Option<String>,
    pub previous_ca: Option<CaId>,
    pub at: DateTime<Utc>,
}

/// Storage abstraction over the relational store. Reads within one assignment
/// decision are expected to come from a consistent snapshot;
/// `assign_if_unassigned` is the single atomic commit point.
pub trait AssignmentRepository: Send + Sync {
    fn service_request(&self, id: &RequestId) -> Result<Option<ServiceRequest>, RepositoryError>;

    fn firm(&self, id: &FirmId) -> Result<Option<CaFirm>, RepositoryError>;

    /// Active roster of a firm with the supporting data scoring needs.
    fn roster(&self, firm_id: &FirmId) -> Result<Vec<CandidateSnapshot>, RepositoryError>;

    /// Snapshot for one member of the firm, active or not.
    fn candidate(
        &self,
        firm_id: &FirmId,
        ca_id: &CaId,
    ) -> Result<Option<CandidateSnapshot>, RepositoryError>;

    /// Role the acting user holds in the firm, if any.
    fn actor_role(
        &self,
        firm_id: &FirmId,
        actor: &UserId,
    ) -> Result<Option<MemberRole>, RepositoryError>;

    /// Atomic conditional assignment. Returns `Ok(None)` when the request is
    /// no longer in an assignable state, so a losing concurrent attempt never
    /// overwrites the winner.
    fn assign_if_unassigned(
        &self,
        id: &RequestId,
        commit: &AssignmentCommit,
    ) -> Result<Option<ServiceRequest>, RepositoryError>;

    /// Unconditional reassignment used only by the override path. Preserves
    /// `auto_assignment_score` as historical metadata.
    fn reassign(
        &self,
        id: &RequestId,
        commit: &AssignmentCommit,
    ) -> Result<ServiceRequest, RepositoryError>;

    /// Park the request for a firm administrator to assign by hand.
    fn mark_pending_manual(&self, id: &RequestId) -> Result<(), RepositoryError>;

    fn record_event(&self, event: AssignmentEvent) -> Result<(), RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Who a notification is addressed to. Delivery resolution (admin fan-out,
/// channel choice) belongs to the notifier implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    Client(ClientId),
    Professional(CaId),
    FirmAdmin(FirmId),
}

/// Template the notifier should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RequestAssignedClient,
    RequestAssignedProfessional,
    ManualAssignmentRequired,
    IndependentWorkDecision,
}

/// Outbound notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub details: BTreeMap<String, String>,
}

/// Fire-and-forget notification hook. Failures are logged by callers and must
/// never fail the assignment that triggered them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of a request's assignment facet for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub request_id: RequestId,
    pub assignment_state: &'static str,
    pub assignment_method: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<CaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_assignment_score: Option<u8>,
}

impl AssignmentView {
    pub fn from_request(request: &ServiceRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            assignment_state: request.assignment_state.label(),
            assignment_method: request.assignment_method.map(AssignmentMethod::label),
            assigned_to: request.ca_id.clone(),
            auto_assignment_score: request.auto_assignment_score,
        }
    }
}

impl ServiceRequest {
    pub fn assignment_view(&self) -> AssignmentView {
        AssignmentView::from_request(self)
    }
}

impl AssignmentState {
    /// States from which a fresh (non-override) assignment may commit.
    pub fn accepts(self, method: AssignmentMethod) -> bool {
        match method {
            AssignmentMethod::Auto => self == AssignmentState::Unassigned,
            AssignmentMethod::Manual | AssignmentMethod::ClientSpecified => matches!(
                self,
                AssignmentState::Unassigned | AssignmentState::PendingManual
            ),
        }
    }
}
