use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::assignment::domain::{
    CaFirm, CaId, ClientId, FirmId, FirmMembership, IndependentWorkPolicy, MemberRole,
    ServiceType, UserId,
};
use crate::workflows::assignment::memory::MemoryNotifier;
use crate::workflows::independent::conflict::{
    ConflictConfig, ConflictContext, ConflictSnapshot, EngagementSummary,
};
use crate::workflows::independent::memory::MemoryIndependentStore;
use crate::workflows::independent::service::{IndependentWorkService, IndependentWorkSubmission};
use crate::workflows::independent::independent_work_router;

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

pub(super) fn firm_with_policy(policy: IndependentWorkPolicy) -> CaFirm {
    CaFirm {
        independent_work_policy: policy,
        ..firm()
    }
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap()
}

pub(super) fn context(firm: CaFirm, snapshot: ConflictSnapshot) -> ConflictContext {
    ConflictContext {
        now: now(),
        firm,
        service_type: ServiceType::GstCompliance,
        description: "Monthly GST filing support".to_string(),
        estimated_hours: 10,
        snapshot,
        strict_client_history: false,
    }
}

/// Scenario behind the cooldown tests: the firm's engagement with the client
/// completed 40 days ago against a 90-day cooldown.
pub(super) fn cooldown_snapshot() -> ConflictSnapshot {
    ConflictSnapshot {
        last_completed_engagement: Some(now() - Duration::days(40)),
        ..ConflictSnapshot::default()
    }
}

pub(super) fn engagement(days_ago: i64, description: &str) -> EngagementSummary {
    EngagementSummary {
        completed_at: now() - Duration::days(days_ago),
        description: description.to_string(),
    }
}

pub(super) fn submission() -> IndependentWorkSubmission {
    IndependentWorkSubmission {
        ca_id: CaId("ca-priya".to_string()),
        firm_id: FirmId("firm-1".to_string()),
        client_id: ClientId("client-1".to_string()),
        service_type: ServiceType::GstCompliance,
        description: "Monthly GST filing support".to_string(),
        estimated_hours: 10,
        estimated_revenue: 45_000.0,
    }
}

pub(super) fn membership() -> FirmMembership {
    FirmMembership {
        firm_id: FirmId("firm-1".to_string()),
        ca_id: CaId("ca-priya".to_string()),
        role: MemberRole::Senior,
        is_active: true,
        can_work_independently: true,
        commission_percent: 10.0,
    }
}

pub(super) fn admin() -> UserId {
    UserId("admin-1".to_string())
}

pub(super) fn build_service() -> (
    IndependentWorkService<MemoryIndependentStore, MemoryNotifier>,
    Arc<MemoryIndependentStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(MemoryIndependentStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service =
        IndependentWorkService::new(store.clone(), notifier.clone(), ConflictConfig::default());
    (service, store, notifier)
}

/// Firm, membership, and admin role pre-seeded; the conflict snapshot defaults
/// to empty unless a test inserts one.
pub(super) fn seeded_service() -> (
    IndependentWorkService<MemoryIndependentStore, MemoryNotifier>,
    Arc<MemoryIndependentStore>,
    Arc<MemoryNotifier>,
) {
    seeded_service_with_firm(firm())
}

pub(super) fn seeded_service_with_firm(
    firm: CaFirm,
) -> (
    IndependentWorkService<MemoryIndependentStore, MemoryNotifier>,
    Arc<MemoryIndependentStore>,
    Arc<MemoryNotifier>,
) {
    let (service, store, notifier) = build_service();
    store.insert_firm(firm);
    store.insert_membership(membership());
    store.insert_role(FirmId("firm-1".to_string()), admin(), MemberRole::Admin);
    (service, store, notifier)
}

pub(super) fn insert_snapshot(store: &MemoryIndependentStore, snapshot: ConflictSnapshot) {
    store.insert_snapshot(
        FirmId("firm-1".to_string()),
        CaId("ca-priya".to_string()),
        ClientId("client-1".to_string()),
        snapshot,
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn independent_router_with_service(
    service: IndependentWorkService<MemoryIndependentStore, MemoryNotifier>,
) -> axum::Router {
    independent_work_router(Arc::new(service))
}
