use super::common::*;

use crate::workflows::assignment::domain::IndependentWorkPolicy;
use crate::workflows::independent::conflict::ConflictConfig;
use crate::workflows::independent::domain::ConflictLevel;
use crate::workflows::independent::policy::{PolicyOutcome, PolicyResolver, PolicyViolation};

fn resolver() -> PolicyResolver {
    PolicyResolver::new(ConflictConfig::default())
}

#[test]
fn forbidding_policy_fails_preflight() {
    let firm = firm_with_policy(IndependentWorkPolicy::NoIndependentWork);
    let result = resolver().preflight(&firm, 10);
    assert_eq!(result, Err(PolicyViolation::PolicyForbidsIndependentWork));
}

#[test]
fn disabled_flag_fails_preflight_regardless_of_policy() {
    let mut firm = firm_with_policy(IndependentWorkPolicy::FullIndependentWork);
    firm.allow_independent_work = false;
    let result = resolver().preflight(&firm, 10);
    assert_eq!(result, Err(PolicyViolation::PolicyForbidsIndependentWork));
}

#[test]
fn limited_policy_enforces_the_weekly_hours_cap() {
    let firm = firm();
    assert_eq!(
        resolver().preflight(&firm, 25),
        Err(PolicyViolation::HoursExceedWeeklyCap {
            requested: 25,
            cap: 20,
        })
    );
    assert_eq!(resolver().preflight(&firm, 20), Ok(()));
}

#[test]
fn hours_cap_only_applies_under_the_limited_policy() {
    let firm = firm_with_policy(IndependentWorkPolicy::FullIndependentWork);
    assert_eq!(resolver().preflight(&firm, 60), Ok(()));
}

#[test]
fn critical_conflicts_auto_reject_under_any_policy() {
    let mut firm = firm_with_policy(IndependentWorkPolicy::FullIndependentWork);
    firm.auto_approve_non_conflict = true;
    let mut snapshot = cooldown_snapshot();
    snapshot.active_client_requests = 1;

    let decision = resolver().evaluate(context(firm, snapshot));

    assert_eq!(decision.outcome, PolicyOutcome::AutoRejected);
    assert_eq!(decision.report.level, ConflictLevel::Critical);
}

#[test]
fn liberal_policy_auto_approves_clean_reports() {
    let mut firm = firm_with_policy(IndependentWorkPolicy::FullIndependentWork);
    firm.auto_approve_non_conflict = true;

    let decision = resolver().evaluate(context(firm, Default::default()));

    assert_eq!(
        decision.outcome,
        PolicyOutcome::AutoApproved {
            commission_percent: 10.0,
        }
    );
    assert_eq!(decision.report.level, ConflictLevel::NoConflict);
}

#[test]
fn auto_approval_requires_the_firm_opt_in() {
    let firm = firm_with_policy(IndependentWorkPolicy::FullIndependentWork);

    let decision = resolver().evaluate(context(firm, Default::default()));
    assert_eq!(decision.outcome, PolicyOutcome::PendingApproval);
}

#[test]
fn limited_policy_queues_everything_short_of_critical() {
    let decision = resolver().evaluate(context(firm(), cooldown_snapshot()));

    assert_eq!(decision.outcome, PolicyOutcome::PendingApproval);
    assert_eq!(decision.report.level, ConflictLevel::HighRisk);
}

#[test]
fn client_restrictions_policy_hardens_the_history_check() {
    let firm = firm_with_policy(IndependentWorkPolicy::ClientRestrictions);
    let mut snapshot = cooldown_snapshot();
    // Far outside the cooldown; only the strict policy still objects.
    snapshot.last_completed_engagement = Some(now() - chrono::Duration::days(400));

    let decision = resolver().evaluate(context(firm, snapshot));

    assert_eq!(decision.outcome, PolicyOutcome::AutoRejected);
    assert_eq!(decision.report.level, ConflictLevel::Critical);
}
