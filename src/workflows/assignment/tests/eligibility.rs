use super::common::*;

use crate::workflows::assignment::config::AssignmentConfig;
use crate::workflows::assignment::domain::{ServiceType, VerificationStatus};
use crate::workflows::assignment::eligibility::{
    check_candidate, filter_candidates, IneligibilityCause,
};

#[test]
fn unverified_members_are_excluded() {
    let mut unverified = top_candidate();
    unverified.profile.verification = VerificationStatus::Pending;

    let report = filter_candidates(
        &tax_request(),
        vec![unverified.clone(), runner_up()],
        &AssignmentConfig::default(),
        false,
    );

    assert_eq!(report.eligible.len(), 1);
    assert_eq!(report.eligible[0].profile.ca_id, runner_up().profile.ca_id);
    assert_eq!(
        report.excluded,
        vec![(
            unverified.profile.ca_id.clone(),
            IneligibilityCause::NotVerified
        )]
    );
}

#[test]
fn specialization_mismatch_removes_candidate_from_all_output() {
    let covered = top_candidate();
    let mut uncovered = top_candidate();
    uncovered.profile.ca_id = crate::workflows::assignment::domain::CaId("ca-other".to_string());
    uncovered.profile.specializations = vec![ServiceType::Bookkeeping];

    let report = filter_candidates(
        &tax_request(),
        vec![covered.clone(), uncovered.clone()],
        &AssignmentConfig::default(),
        false,
    );

    assert_eq!(report.eligible.len(), 1);
    assert_eq!(report.eligible[0].profile.ca_id, covered.profile.ca_id);
    assert_eq!(
        report.excluded,
        vec![(
            uncovered.profile.ca_id.clone(),
            IneligibilityCause::SpecializationMismatch
        )]
    );
}

#[test]
fn specialization_check_can_be_overridden() {
    let mut uncovered = top_candidate();
    uncovered.profile.specializations = vec![ServiceType::Bookkeeping];

    let report = filter_candidates(
        &tax_request(),
        vec![uncovered],
        &AssignmentConfig::default(),
        true,
    );

    assert_eq!(report.eligible.len(), 1);
    assert!(report.excluded.is_empty());
}

#[test]
fn after_hours_requires_independent_work_permission() {
    let mut request = tax_request();
    request.requested_at = weekend_morning();

    let permitted = top_candidate();
    let mut restricted = runner_up();
    restricted.membership.can_work_independently = false;

    let report = filter_candidates(
        &request,
        vec![permitted.clone(), restricted.clone()],
        &AssignmentConfig::default(),
        false,
    );

    assert_eq!(report.eligible.len(), 1);
    assert_eq!(report.eligible[0].profile.ca_id, permitted.profile.ca_id);
    assert_eq!(
        report.excluded,
        vec![(
            restricted.profile.ca_id.clone(),
            IneligibilityCause::AfterHoursNotPermitted
        )]
    );
}

#[test]
fn inactive_membership_is_excluded() {
    let mut inactive = top_candidate();
    inactive.membership.is_active = false;

    let report = filter_candidates(
        &tax_request(),
        vec![inactive],
        &AssignmentConfig::default(),
        false,
    );

    assert!(report.eligible.is_empty());
    assert_eq!(report.excluded[0].1, IneligibilityCause::InactiveMembership);
}

#[test]
fn verification_is_checked_before_specialization() {
    let mut candidate = top_candidate();
    candidate.profile.verification = VerificationStatus::Rejected;
    candidate.profile.specializations = vec![ServiceType::Bookkeeping];

    let cause = check_candidate(&tax_request(), &candidate, true, false);
    assert_eq!(cause, Some(IneligibilityCause::NotVerified));
}

#[test]
fn fully_qualified_candidate_passes_every_check() {
    let cause = check_candidate(&tax_request(), &top_candidate(), true, false);
    assert_eq!(cause, None);
}
