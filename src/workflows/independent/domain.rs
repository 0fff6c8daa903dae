use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::assignment::domain::{CaId, ClientId, FirmId, ServiceType, UserId};

/// Identifier wrapper for independent-work requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndependentRequestId(pub String);

/// Lifecycle of an independent-work request. Terminal on rejection or
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndependentWorkStatus {
    PendingApproval,
    Approved,
    Rejected,
    Completed,
}

impl IndependentWorkStatus {
    pub const fn label(self) -> &'static str {
        match self {
            IndependentWorkStatus::PendingApproval => "pending_approval",
            IndependentWorkStatus::Approved => "approved",
            IndependentWorkStatus::Rejected => "rejected",
            IndependentWorkStatus::Completed => "completed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            IndependentWorkStatus::Rejected | IndependentWorkStatus::Completed
        )
    }
}

/// Severity classification of a detected conflict. Variant order defines the
/// severity ordering; the overall level of a report is the maximum found,
/// never an average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictLevel {
    NoConflict,
    LowRisk,
    MediumRisk,
    HighRisk,
    Critical,
}

impl ConflictLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ConflictLevel::NoConflict => "no_conflict",
            ConflictLevel::LowRisk => "low_risk",
            ConflictLevel::MediumRisk => "medium_risk",
            ConflictLevel::HighRisk => "high_risk",
            ConflictLevel::Critical => "critical",
        }
    }
}

/// Recommendation tag derived from a conflict level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    AutoApprove,
    ReviewCarefully,
    LikelyReject,
    AutoReject,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::AutoApprove => "auto_approve",
            Recommendation::ReviewCarefully => "review_carefully",
            Recommendation::LikelyReject => "likely_reject",
            Recommendation::AutoReject => "auto_reject",
        }
    }
}

/// One finding produced by a conflict check. Structured so callers can assert
/// on data; `summary` renders the advisory text shown to admins and
/// professionals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictFinding {
    ActiveClient {
        active_requests: u32,
    },
    CooldownWindow {
        days_since_completion: i64,
        cooldown_days: i64,
        days_remaining: i64,
    },
    /// Strict-policy variant: any historical relationship at all, regardless
    /// of the cooldown window.
    PastClientRelationship {
        days_since_completion: i64,
    },
    ServiceTypeOverlap {
        service_type: ServiceType,
    },
    IndustryOverlap {
        industry: String,
        firm_clients: u32,
    },
    Workload {
        firm_active: u32,
        independent_active: u32,
    },
    GeographicProximity {
        city: String,
        firm_clients: u32,
    },
    ScopeOverlap {
        similarity: f32,
    },
}

impl ConflictFinding {
    pub fn summary(&self) -> String {
        match self {
            ConflictFinding::ActiveClient { active_requests } => format!(
                "client has {active_requests} active request(s) with the firm"
            ),
            ConflictFinding::CooldownWindow {
                days_since_completion,
                cooldown_days,
                days_remaining,
            } => format!(
                "client engagement completed {days_since_completion} days ago; \
                 {days_remaining} days remaining in the {cooldown_days}-day cooldown"
            ),
            ConflictFinding::PastClientRelationship {
                days_since_completion,
            } => format!(
                "firm served this client {days_since_completion} days ago and restricts past clients"
            ),
            ConflictFinding::ServiceTypeOverlap { service_type } => format!(
                "another member is actively handling {} for this client",
                service_type.label()
            ),
            ConflictFinding::IndustryOverlap {
                industry,
                firm_clients,
            } => format!(
                "firm has {firm_clients} active client(s) in the {industry} industry"
            ),
            ConflictFinding::Workload {
                firm_active,
                independent_active,
            } => format!(
                "professional already carries {firm_active} firm and {independent_active} independent engagements"
            ),
            ConflictFinding::GeographicProximity { city, firm_clients } => format!(
                "firm has {firm_clients} active client(s) in {city}; overlap may be visible"
            ),
            ConflictFinding::ScopeOverlap { similarity } => format!(
                "declared scope is {:.0}% similar to a recent firm engagement with this client",
                similarity * 100.0
            ),
        }
    }

    /// Action an admin should take on this specific finding.
    pub const fn recommended_action(&self) -> Recommendation {
        match self {
            ConflictFinding::ActiveClient { .. } | ConflictFinding::ServiceTypeOverlap { .. } => {
                Recommendation::AutoReject
            }
            ConflictFinding::CooldownWindow { .. }
            | ConflictFinding::PastClientRelationship { .. }
            | ConflictFinding::ScopeOverlap { .. } => Recommendation::LikelyReject,
            ConflictFinding::IndustryOverlap { .. }
            | ConflictFinding::Workload { .. }
            | ConflictFinding::GeographicProximity { .. } => Recommendation::ReviewCarefully,
        }
    }
}

/// A finding together with the severity the detector attached to it. Severity
/// tiers for some checks depend on configured thresholds, so it is fixed at
/// detection time rather than derived from the finding data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedFinding {
    pub severity: ConflictLevel,
    pub finding: ConflictFinding,
}

impl ReportedFinding {
    pub fn summary(&self) -> String {
        self.finding.summary()
    }

    pub fn recommended_action(&self) -> Recommendation {
        self.finding.recommended_action()
    }
}

/// Full conflict report for a submission: every check runs regardless of
/// earlier findings so the report is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub level: ConflictLevel,
    pub findings: Vec<ReportedFinding>,
    pub recommendation: Recommendation,
    /// Clamped to the firm's commission bounds.
    pub suggested_commission_percent: f32,
}

impl ConflictReport {
    pub fn summaries(&self) -> Vec<String> {
        self.findings.iter().map(ReportedFinding::summary).collect()
    }
}

/// Conditions attached to an approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedConditions {
    pub commission_percent: f32,
    #[serde(default)]
    pub weekends_only: bool,
    #[serde(default)]
    pub after_hours_only: bool,
    #[serde(default)]
    pub max_hours_week: Option<u16>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
}

/// A professional's ask to serve a client outside firm channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndependentWorkRequest {
    pub id: IndependentRequestId,
    pub ca_id: CaId,
    pub firm_id: FirmId,
    pub client_id: ClientId,
    pub service_type: ServiceType,
    pub description: String,
    pub estimated_hours: u16,
    pub estimated_revenue: f64,
    pub status: IndependentWorkStatus,
    pub conflict_level: ConflictLevel,
    pub findings: Vec<ReportedFinding>,
    pub commission_percent: f32,
    pub approved_conditions: Option<ApprovedConditions>,
    pub decided_by: Option<UserId>,
    pub decision_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Sanitized representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct IndependentWorkView {
    pub request_id: IndependentRequestId,
    pub status: &'static str,
    pub conflict_level: &'static str,
    pub commission_percent: f32,
    pub findings: Vec<String>,
}

impl IndependentWorkRequest {
    pub fn view(&self) -> IndependentWorkView {
        IndependentWorkView {
            request_id: self.id.clone(),
            status: self.status.label(),
            conflict_level: self.conflict_level.label(),
            commission_percent: self.commission_percent,
            findings: self.findings.iter().map(ReportedFinding::summary).collect(),
        }
    }
}
