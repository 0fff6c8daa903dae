use serde::{Deserialize, Serialize};

use crate::workflows::assignment::domain::{CaFirm, IndependentWorkPolicy};

use super::conflict::{run_checks, ConflictConfig, ConflictContext};
use super::domain::{ConflictLevel, ConflictReport};

/// Hard precondition failures, raised before any conflict check runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("firm policy forbids independent work")]
    PolicyForbidsIndependentWork,
    #[error("estimated {requested} hours/week exceeds the firm cap of {cap}")]
    HoursExceedWeeklyCap { requested: u16, cap: u16 },
}

/// How the policy resolved a submission after conflict detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PolicyOutcome {
    AutoApproved { commission_percent: f32 },
    PendingApproval,
    AutoRejected,
}

/// Conflict report plus the resolved outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    pub outcome: PolicyOutcome,
    pub report: ConflictReport,
}

/// Maps a firm's independent-work policy onto conflict-detector behavior and
/// auto-approval eligibility.
pub struct PolicyResolver {
    config: ConflictConfig,
}

impl PolicyResolver {
    pub fn new(config: ConflictConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConflictConfig {
        &self.config
    }

    /// Preconditions checked before the conflict snapshot is even fetched:
    /// a forbidding policy fails fast with no conflict report, and the
    /// limited policy enforces its weekly-hours cap up front.
    pub fn preflight(&self, firm: &CaFirm, estimated_hours: u16) -> Result<(), PolicyViolation> {
        if !firm.allow_independent_work
            || firm.independent_work_policy == IndependentWorkPolicy::NoIndependentWork
        {
            return Err(PolicyViolation::PolicyForbidsIndependentWork);
        }

        if firm.independent_work_policy == IndependentWorkPolicy::LimitedWithApproval {
            let cap = firm.max_independent_hours_week;
            if cap > 0 && estimated_hours > cap {
                return Err(PolicyViolation::HoursExceedWeeklyCap {
                    requested: estimated_hours,
                    cap,
                });
            }
        }

        Ok(())
    }

    /// Run the check battery under the firm's policy and resolve the outcome.
    /// Only a critical overall level forces rejection outright; the liberal
    /// policy may auto-approve a clean report.
    pub fn evaluate(&self, mut ctx: ConflictContext) -> PolicyDecision {
        let policy = ctx.firm.independent_work_policy;
        ctx.strict_client_history = policy == IndependentWorkPolicy::ClientRestrictions;

        let report = run_checks(&ctx, &self.config);

        let outcome = match report.level {
            ConflictLevel::Critical => PolicyOutcome::AutoRejected,
            ConflictLevel::NoConflict
                if policy == IndependentWorkPolicy::FullIndependentWork
                    && ctx.firm.auto_approve_non_conflict =>
            {
                PolicyOutcome::AutoApproved {
                    commission_percent: ctx
                        .firm
                        .clamp_commission(ctx.firm.default_commission_percent),
                }
            }
            _ => PolicyOutcome::PendingApproval,
        };

        PolicyDecision { outcome, report }
    }
}
