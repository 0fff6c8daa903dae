use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::assignment::domain::{CaFirm, ServiceType};

use super::domain::{ConflictFinding, ConflictLevel, ConflictReport, Recommendation, ReportedFinding};

/// Tunable thresholds for the conflict check battery. The numbers mirror the
/// product defaults but are data, not constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictConfig {
    /// Total active load at which workload becomes a medium-risk finding.
    pub heavy_load_threshold: u32,
    /// Total active load at which workload becomes a low-risk advisory.
    pub elevated_load_threshold: u32,
    /// Token-similarity cutoff above which declared scope overlaps a recent
    /// firm engagement.
    pub scope_similarity_cutoff: f32,
    /// How far back firm engagements are considered for scope comparison.
    pub scope_window_days: i64,
    pub commission: CommissionLadder,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            heavy_load_threshold: 8,
            elevated_load_threshold: 5,
            scope_similarity_cutoff: 0.7,
            scope_window_days: 183,
            commission: CommissionLadder::default(),
        }
    }
}

/// Suggested commission percentage per overall conflict level. The
/// no-conflict rate comes from the firm's default instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionLadder {
    pub low_risk: f32,
    pub medium_risk: f32,
    pub high_risk: f32,
    pub critical: f32,
}

impl Default for CommissionLadder {
    fn default() -> Self {
        Self {
            low_risk: 15.0,
            medium_risk: 20.0,
            high_risk: 25.0,
            critical: 30.0,
        }
    }
}

/// Completed firm engagement with the target client, used for scope
/// comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub completed_at: DateTime<Utc>,
    pub description: String,
}

/// Relationship and workload figures fetched from the store in one snapshot
/// before the checks run. The checks themselves are pure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConflictSnapshot {
    /// PENDING/ACCEPTED/IN_PROGRESS requests the client has with the firm.
    pub active_client_requests: u32,
    /// Most recent COMPLETED engagement between the firm and the client.
    pub last_completed_engagement: Option<DateTime<Utc>>,
    /// Another member is actively handling the same service type for this
    /// client at this firm.
    pub same_type_in_progress: bool,
    pub client_industry: Option<String>,
    /// Other active firm clients sharing the target client's industry.
    pub firm_clients_same_industry: u32,
    pub client_city: Option<String>,
    /// Active firm clients in the target client's city.
    pub firm_clients_same_city: u32,
    /// The professional's active firm-assigned requests.
    pub firm_active_assignments: u32,
    /// The professional's already-approved independent engagements.
    pub approved_independent_work: u32,
    /// Firm engagements with this client, newest first.
    pub engagements: Vec<EngagementSummary>,
}

/// Everything a conflict evaluation needs, assembled by the service layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictContext {
    pub now: DateTime<Utc>,
    pub firm: CaFirm,
    pub service_type: ServiceType,
    pub description: String,
    pub estimated_hours: u16,
    pub snapshot: ConflictSnapshot,
    /// Set by the policy resolver under the client-restrictions policy: any
    /// historical relationship with a firm client becomes critical, not just
    /// one inside the cooldown window.
    pub strict_client_history: bool,
}

type ConflictCheck = fn(&ConflictContext, &ConflictConfig) -> Option<ReportedFinding>;

/// Fixed ordered battery. Every check runs regardless of earlier findings so
/// the report is complete; the overall level is the maximum severity found.
const CHECKS: [ConflictCheck; 7] = [
    check_active_client,
    check_cooldown,
    check_service_type_overlap,
    check_industry_overlap,
    check_workload,
    check_geographic_proximity,
    check_scope_overlap,
];

/// Run the full battery and fold the findings into a report.
pub fn run_checks(ctx: &ConflictContext, config: &ConflictConfig) -> ConflictReport {
    let findings: Vec<ReportedFinding> = CHECKS
        .iter()
        .filter_map(|check| check(ctx, config))
        .collect();

    let level = findings
        .iter()
        .map(|finding| finding.severity)
        .max()
        .unwrap_or(ConflictLevel::NoConflict);

    ConflictReport {
        level,
        recommendation: recommendation_for(level),
        suggested_commission_percent: suggested_commission(level, &ctx.firm, config),
        findings,
    }
}

pub fn recommendation_for(level: ConflictLevel) -> Recommendation {
    match level {
        ConflictLevel::NoConflict => Recommendation::AutoApprove,
        ConflictLevel::LowRisk | ConflictLevel::MediumRisk => Recommendation::ReviewCarefully,
        ConflictLevel::HighRisk => Recommendation::LikelyReject,
        ConflictLevel::Critical => Recommendation::AutoReject,
    }
}

/// Commission suggestion per the severity ladder, clamped to the firm bounds.
pub fn suggested_commission(level: ConflictLevel, firm: &CaFirm, config: &ConflictConfig) -> f32 {
    let raw = match level {
        ConflictLevel::NoConflict => firm.default_commission_percent,
        ConflictLevel::LowRisk => config.commission.low_risk,
        ConflictLevel::MediumRisk => config.commission.medium_risk,
        ConflictLevel::HighRisk => config.commission.high_risk,
        ConflictLevel::Critical => config.commission.critical,
    };
    firm.clamp_commission(raw)
}

fn check_active_client(ctx: &ConflictContext, _config: &ConflictConfig) -> Option<ReportedFinding> {
    if ctx.snapshot.active_client_requests == 0 {
        return None;
    }
    Some(ReportedFinding {
        severity: ConflictLevel::Critical,
        finding: ConflictFinding::ActiveClient {
            active_requests: ctx.snapshot.active_client_requests,
        },
    })
}

fn check_cooldown(ctx: &ConflictContext, _config: &ConflictConfig) -> Option<ReportedFinding> {
    let completed_at = ctx.snapshot.last_completed_engagement?;
    let days_since = (ctx.now - completed_at).num_days();

    if ctx.strict_client_history && ctx.firm.restrict_past_clients {
        return Some(ReportedFinding {
            severity: ConflictLevel::Critical,
            finding: ConflictFinding::PastClientRelationship {
                days_since_completion: days_since,
            },
        });
    }

    let cooldown_days = ctx.firm.client_cooldown_days;
    if days_since >= cooldown_days {
        return None;
    }
    Some(ReportedFinding {
        severity: ConflictLevel::HighRisk,
        finding: ConflictFinding::CooldownWindow {
            days_since_completion: days_since,
            cooldown_days,
            days_remaining: cooldown_days - days_since,
        },
    })
}

fn check_service_type_overlap(
    ctx: &ConflictContext,
    _config: &ConflictConfig,
) -> Option<ReportedFinding> {
    if !ctx.snapshot.same_type_in_progress {
        return None;
    }
    Some(ReportedFinding {
        severity: ConflictLevel::HighRisk,
        finding: ConflictFinding::ServiceTypeOverlap {
            service_type: ctx.service_type,
        },
    })
}

fn check_industry_overlap(
    ctx: &ConflictContext,
    _config: &ConflictConfig,
) -> Option<ReportedFinding> {
    if !ctx.firm.restrict_industry_overlap || ctx.snapshot.firm_clients_same_industry == 0 {
        return None;
    }
    let industry = ctx.snapshot.client_industry.clone()?;
    Some(ReportedFinding {
        severity: ConflictLevel::MediumRisk,
        finding: ConflictFinding::IndustryOverlap {
            industry,
            firm_clients: ctx.snapshot.firm_clients_same_industry,
        },
    })
}

fn check_workload(ctx: &ConflictContext, config: &ConflictConfig) -> Option<ReportedFinding> {
    let firm_active = ctx.snapshot.firm_active_assignments;
    let independent_active = ctx.snapshot.approved_independent_work;
    let total = firm_active + independent_active;

    let severity = if total >= config.heavy_load_threshold {
        ConflictLevel::MediumRisk
    } else if total >= config.elevated_load_threshold {
        ConflictLevel::LowRisk
    } else {
        return None;
    };

    Some(ReportedFinding {
        severity,
        finding: ConflictFinding::Workload {
            firm_active,
            independent_active,
        },
    })
}

fn check_geographic_proximity(
    ctx: &ConflictContext,
    _config: &ConflictConfig,
) -> Option<ReportedFinding> {
    if ctx.snapshot.firm_clients_same_city == 0 {
        return None;
    }
    let city = ctx.snapshot.client_city.clone()?;
    Some(ReportedFinding {
        severity: ConflictLevel::LowRisk,
        finding: ConflictFinding::GeographicProximity {
            city,
            firm_clients: ctx.snapshot.firm_clients_same_city,
        },
    })
}

fn check_scope_overlap(ctx: &ConflictContext, config: &ConflictConfig) -> Option<ReportedFinding> {
    let window = chrono::Duration::days(config.scope_window_days);
    let best = ctx
        .snapshot
        .engagements
        .iter()
        .filter(|engagement| ctx.now - engagement.completed_at <= window)
        .map(|engagement| scope_similarity(&ctx.description, &engagement.description))
        .fold(0.0_f32, f32::max);

    if best <= config.scope_similarity_cutoff {
        return None;
    }
    Some(ReportedFinding {
        severity: ConflictLevel::HighRisk,
        finding: ConflictFinding::ScopeOverlap { similarity: best },
    })
}

/// Fraction of tokens in the shorter description with a substring match in
/// the other. A deliberately simple lexical heuristic, not semantic matching.
pub fn scope_similarity(a: &str, b: &str) -> f32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let tokens: Vec<&str> = shorter.split_whitespace().collect();
    if tokens.is_empty() {
        return 0.0;
    }

    let matched = tokens
        .iter()
        .filter(|token| longer.contains(**token))
        .count();
    matched as f32 / tokens.len() as f32
}
