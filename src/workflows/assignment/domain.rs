use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for client service requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Identifier wrapper for professionals (chartered accountants).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaId(pub String);

/// Identifier wrapper for firms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FirmId(pub String);

/// Identifier wrapper for clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub String);

/// Identifier wrapper for the user performing an administrative action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Service categories a request can target. The order a professional lists these
/// in their profile matters: the first entry is their primary specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    TaxFiling,
    GstCompliance,
    Audit,
    Bookkeeping,
    CompanyIncorporation,
    FinancialAdvisory,
}

impl ServiceType {
    pub const fn label(self) -> &'static str {
        match self {
            ServiceType::TaxFiling => "tax_filing",
            ServiceType::GstCompliance => "gst_compliance",
            ServiceType::Audit => "audit",
            ServiceType::Bookkeeping => "bookkeeping",
            ServiceType::CompanyIncorporation => "company_incorporation",
            ServiceType::FinancialAdvisory => "financial_advisory",
        }
    }
}

/// Work-status state machine of a service request, independent of its assignment facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// Statuses that count toward a professional's current workload.
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            RequestStatus::Pending | RequestStatus::Accepted | RequestStatus::InProgress
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

/// Assignment facet of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    Unassigned,
    PendingManual,
    AutoAssigned,
    ManualAssigned,
}

impl AssignmentState {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentState::Unassigned => "unassigned",
            AssignmentState::PendingManual => "pending_manual",
            AssignmentState::AutoAssigned => "auto_assigned",
            AssignmentState::ManualAssigned => "manual_assigned",
        }
    }

    pub const fn is_assigned(self) -> bool {
        matches!(
            self,
            AssignmentState::AutoAssigned | AssignmentState::ManualAssigned
        )
    }
}

/// How a professional ended up on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    Auto,
    Manual,
    ClientSpecified,
}

impl AssignmentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentMethod::Auto => "auto",
            AssignmentMethod::Manual => "manual",
            AssignmentMethod::ClientSpecified => "client_specified",
        }
    }
}

/// A unit of work a client wants performed. Never deleted, only status-terminated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub client_id: ClientId,
    pub firm_id: Option<FirmId>,
    pub ca_id: Option<CaId>,
    pub service_type: ServiceType,
    pub status: RequestStatus,
    pub assignment_state: AssignmentState,
    pub assignment_method: Option<AssignmentMethod>,
    pub assigned_by: Option<UserId>,
    /// Winning candidate's score when auto-assigned. Preserved across overrides
    /// as historical metadata.
    pub auto_assignment_score: Option<u8>,
    pub requested_at: DateTime<Utc>,
    pub description: String,
}

/// Roles a professional can hold inside a firm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Senior,
    Junior,
    Support,
    Consultant,
}

/// Join entity between a professional and a firm. The active flag is flipped
/// to false when membership ends, preserving history; at most one row per
/// professional may be active at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmMembership {
    pub firm_id: FirmId,
    pub ca_id: CaId,
    pub role: MemberRole,
    pub is_active: bool,
    pub can_work_independently: bool,
    pub commission_percent: f32,
}

/// Verification state of a professional's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

/// Professional profile fields the assignment engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    pub ca_id: CaId,
    pub display_name: String,
    pub verification: VerificationStatus,
    /// First entry is the primary specialization.
    pub specializations: Vec<ServiceType>,
}

impl ProfessionalProfile {
    pub fn primary_specialization(&self) -> Option<ServiceType> {
        self.specializations.first().copied()
    }

    pub fn covers(&self, service_type: ServiceType) -> bool {
        self.specializations.contains(&service_type)
    }
}

/// Completion history of a professional for one service type and client,
/// pre-aggregated by the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceHistory {
    /// Completed requests of the same service type.
    pub completed_same_type: u32,
    /// Average rating across those completions, on a 0-5 scale.
    pub average_rating: f32,
    /// Whether this professional has ever completed a request for this client.
    pub served_client_before: bool,
}

impl ServiceHistory {
    pub const fn none() -> Self {
        Self {
            completed_same_type: 0,
            average_rating: 0.0,
            served_client_before: false,
        }
    }
}

/// Snapshot of one firm member with the supporting data scoring needs. Reads
/// within a single assignment decision come from one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    pub profile: ProfessionalProfile,
    pub membership: FirmMembership,
    /// Discrete bookable slots over the next seven days.
    pub booked_slots: u16,
    pub total_slots: u16,
    /// Requests currently in an active status and assigned to this member.
    pub active_assignments: u16,
    pub history: ServiceHistory,
}

impl CandidateSnapshot {
    pub fn ca_id(&self) -> &CaId {
        &self.profile.ca_id
    }
}

/// Firm policy mode for independent work by its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndependentWorkPolicy {
    NoIndependentWork,
    LimitedWithApproval,
    FullIndependentWork,
    ClientRestrictions,
}

/// Firm configuration consumed by the assignment orchestrator, the conflict
/// detector, and the policy resolver. Mutated only by firm administrators
/// through configuration endpoints elsewhere; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaFirm {
    pub id: FirmId,
    pub name: String,
    pub auto_assignment_enabled: bool,
    pub allow_independent_work: bool,
    pub independent_work_policy: IndependentWorkPolicy,
    pub default_commission_percent: f32,
    pub min_commission_percent: f32,
    pub max_commission_percent: f32,
    pub client_cooldown_days: i64,
    pub restrict_current_clients: bool,
    pub restrict_past_clients: bool,
    pub restrict_industry_overlap: bool,
    pub auto_approve_non_conflict: bool,
    pub max_independent_hours_week: u16,
}

impl CaFirm {
    pub fn clamp_commission(&self, percent: f32) -> f32 {
        percent.clamp(self.min_commission_percent, self.max_commission_percent)
    }
}
