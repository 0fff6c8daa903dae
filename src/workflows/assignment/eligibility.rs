use serde::{Deserialize, Serialize};

use super::config::AssignmentConfig;
use super::domain::{CaId, CandidateSnapshot, ServiceRequest, VerificationStatus};

/// Why a firm member was removed from the candidate pool before scoring.
/// Excluded members do not receive a score of zero; they are absent entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityCause {
    NotVerified,
    SpecializationMismatch,
    AfterHoursNotPermitted,
    InactiveMembership,
}

impl IneligibilityCause {
    pub const fn summary(self) -> &'static str {
        match self {
            IneligibilityCause::NotVerified => "professional is not verified",
            IneligibilityCause::SpecializationMismatch => {
                "specializations do not cover the requested service type"
            }
            IneligibilityCause::AfterHoursNotPermitted => {
                "request falls outside business hours and independent work is not permitted"
            }
            IneligibilityCause::InactiveMembership => "membership in the firm is not active",
        }
    }
}

/// Outcome of the hard-constraint pass over a firm roster.
#[derive(Debug, Clone)]
pub struct EligibilityReport {
    pub eligible: Vec<CandidateSnapshot>,
    pub excluded: Vec<(CaId, IneligibilityCause)>,
}

/// Apply the hard constraints in order: verification, specialization (unless
/// overridden by the manual-assignment path), after-hours permission, active
/// membership. All must pass.
pub fn filter_candidates(
    request: &ServiceRequest,
    roster: Vec<CandidateSnapshot>,
    config: &AssignmentConfig,
    override_specialization: bool,
) -> EligibilityReport {
    let within_hours = config.business_hours.contains(request.requested_at);

    let mut eligible = Vec::new();
    let mut excluded = Vec::new();

    for candidate in roster {
        match check_candidate(request, &candidate, within_hours, override_specialization) {
            None => eligible.push(candidate),
            Some(cause) => excluded.push((candidate.profile.ca_id.clone(), cause)),
        }
    }

    EligibilityReport { eligible, excluded }
}

/// Validate a single member against the hard constraints, returning the first
/// failing cause. Used by the manual-assignment path as well, where the
/// specialization check may be overridden but never the others.
pub fn check_candidate(
    request: &ServiceRequest,
    candidate: &CandidateSnapshot,
    within_hours: bool,
    override_specialization: bool,
) -> Option<IneligibilityCause> {
    if candidate.profile.verification != VerificationStatus::Verified {
        return Some(IneligibilityCause::NotVerified);
    }

    if !override_specialization && !candidate.profile.covers(request.service_type) {
        return Some(IneligibilityCause::SpecializationMismatch);
    }

    if !within_hours && !candidate.membership.can_work_independently {
        return Some(IneligibilityCause::AfterHoursNotPermitted);
    }

    if !candidate.membership.is_active {
        return Some(IneligibilityCause::InactiveMembership);
    }

    None
}
