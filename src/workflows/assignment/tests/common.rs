use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::assignment::config::AssignmentConfig;
use crate::workflows::assignment::domain::{
    AssignmentState, CaFirm, CaId, CandidateSnapshot, ClientId, FirmId, FirmMembership,
    IndependentWorkPolicy, MemberRole, ProfessionalProfile, RequestId, RequestStatus,
    ServiceHistory, ServiceRequest, ServiceType, UserId, VerificationStatus,
};
use crate::workflows::assignment::memory::{MemoryAssignmentStore, MemoryNotifier};
use crate::workflows::assignment::repository::{
    AssignmentCommit, AssignmentEvent, AssignmentRepository, Notice, Notifier, NotifyError,
    RepositoryError,
};
use crate::workflows::assignment::{assignment_router, AssignmentService};

pub(super) fn firm() -> CaFirm {
    CaFirm {
        id: FirmId("firm-1".to_string()),
        name: "Meridian & Associates".to_string(),
        auto_assignment_enabled: true,
        allow_independent_work: true,
        independent_work_policy: IndependentWorkPolicy::LimitedWithApproval,
        default_commission_percent: 10.0,
        min_commission_percent: 5.0,
        max_commission_percent: 30.0,
        client_cooldown_days: 90,
        restrict_current_clients: true,
        restrict_past_clients: true,
        restrict_industry_overlap: false,
        auto_approve_non_conflict: false,
        max_independent_hours_week: 20,
    }
}

pub(super) fn manual_only_firm() -> CaFirm {
    CaFirm {
        auto_assignment_enabled: false,
        ..firm()
    }
}

/// 2025-03-10 is a Monday; 11:00 is inside the default business hours.
pub(super) fn weekday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap()
}

/// 2025-03-08 is a Saturday.
pub(super) fn weekend_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 8, 11, 0, 0).unwrap()
}

pub(super) fn tax_request() -> ServiceRequest {
    ServiceRequest {
        id: RequestId("req-1".to_string()),
        client_id: ClientId("client-1".to_string()),
        firm_id: Some(FirmId("firm-1".to_string())),
        ca_id: None,
        service_type: ServiceType::TaxFiling,
        status: RequestStatus::Pending,
        assignment_state: AssignmentState::Unassigned,
        assignment_method: None,
        assigned_by: None,
        auto_assignment_score: None,
        requested_at: weekday_morning(),
        description: "Annual tax filing for a retail partnership".to_string(),
    }
}

pub(super) fn candidate(
    ca: &str,
    specializations: Vec<ServiceType>,
    booked_slots: u16,
    active_assignments: u16,
    history: ServiceHistory,
) -> CandidateSnapshot {
    CandidateSnapshot {
        profile: ProfessionalProfile {
            ca_id: CaId(ca.to_string()),
            display_name: ca.to_string(),
            verification: VerificationStatus::Verified,
            specializations,
        },
        membership: FirmMembership {
            firm_id: FirmId("firm-1".to_string()),
            ca_id: CaId(ca.to_string()),
            role: MemberRole::Senior,
            is_active: true,
            can_work_independently: true,
            commission_percent: 10.0,
        },
        booked_slots,
        total_slots: 40,
        active_assignments,
        history,
    }
}

/// Availability 0.9, primary specialization, no active load, no track record
/// with this client: weighted 0.91 and the variety bonus lifts it to 96.
pub(super) fn top_candidate() -> CandidateSnapshot {
    candidate(
        "ca-priya",
        vec![ServiceType::TaxFiling, ServiceType::GstCompliance],
        4,
        0,
        ServiceHistory::none(),
    )
}

/// Availability 0.3, secondary specialization, three active assignments:
/// weighted exactly 0.50, no variety bonus.
pub(super) fn runner_up() -> CandidateSnapshot {
    candidate(
        "ca-vikram",
        vec![ServiceType::Audit, ServiceType::TaxFiling],
        28,
        3,
        ServiceHistory {
            completed_same_type: 0,
            average_rating: 0.0,
            served_client_before: true,
        },
    )
}

pub(super) fn build_service() -> (
    AssignmentService<MemoryAssignmentStore, MemoryNotifier>,
    Arc<MemoryAssignmentStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(MemoryAssignmentStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service =
        AssignmentService::new(store.clone(), notifier.clone(), AssignmentConfig::default());
    (service, store, notifier)
}

/// Firm, unassigned request, and the two scenario candidates pre-seeded.
pub(super) fn seeded_service() -> (
    AssignmentService<MemoryAssignmentStore, MemoryNotifier>,
    Arc<MemoryAssignmentStore>,
    Arc<MemoryNotifier>,
) {
    let (service, store, notifier) = build_service();
    store.insert_firm(firm());
    store.insert_request(tax_request());
    store.insert_candidate(FirmId("firm-1".to_string()), top_candidate());
    store.insert_candidate(FirmId("firm-1".to_string()), runner_up());
    (service, store, notifier)
}

pub(super) fn admin() -> UserId {
    UserId("admin-1".to_string())
}

pub(super) fn grant_admin(store: &MemoryAssignmentStore) {
    store.insert_role(FirmId("firm-1".to_string()), admin(), MemberRole::Admin);
}

pub(super) struct UnavailableRepository;

impl AssignmentRepository for UnavailableRepository {
    fn service_request(&self, _id: &RequestId) -> Result<Option<ServiceRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn firm(&self, _id: &FirmId) -> Result<Option<CaFirm>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn roster(&self, _firm_id: &FirmId) -> Result<Vec<CandidateSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn candidate(
        &self,
        _firm_id: &FirmId,
        _ca_id: &CaId,
    ) -> Result<Option<CandidateSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn actor_role(
        &self,
        _firm_id: &FirmId,
        _actor: &UserId,
    ) -> Result<Option<MemberRole>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn assign_if_unassigned(
        &self,
        _id: &RequestId,
        _commit: &AssignmentCommit,
    ) -> Result<Option<ServiceRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn reassign(
        &self,
        _id: &RequestId,
        _commit: &AssignmentCommit,
    ) -> Result<ServiceRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn mark_pending_manual(&self, _id: &RequestId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_event(&self, _event: AssignmentEvent) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _notice: Notice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp unreachable".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assignment_router_with_service(
    service: AssignmentService<MemoryAssignmentStore, MemoryNotifier>,
) -> axum::Router {
    assignment_router(Arc::new(service))
}
