use serde::{Deserialize, Serialize};

use super::config::AssignmentConfig;
use super::domain::{CaId, CandidateSnapshot, ServiceRequest};

/// Structured justification attached to a candidate score. Rendering to
/// advisory text happens in `summary`, keeping the engine free of prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreFactor {
    HighAvailability { free_ratio: f32 },
    PrimarySpecialization,
    SecondarySpecialization,
    LowWorkload { active_assignments: u16 },
    StrongHistory { average_rating: f32, completions: u32 },
    VarietyBonus,
}

impl ScoreFactor {
    pub fn summary(&self) -> String {
        match self {
            ScoreFactor::HighAvailability { free_ratio } => {
                format!("High availability ({:.0}% of slots free)", free_ratio * 100.0)
            }
            ScoreFactor::PrimarySpecialization => "Primary specialization match".to_string(),
            ScoreFactor::SecondarySpecialization => "Secondary specialization match".to_string(),
            ScoreFactor::LowWorkload { active_assignments } => {
                format!("Low current workload ({active_assignments} active)")
            }
            ScoreFactor::StrongHistory {
                average_rating,
                completions,
            } => format!(
                "High success rate with similar requests ({average_rating:.1}/5 over {completions})"
            ),
            ScoreFactor::VarietyBonus => "New CA for this client (variety)".to_string(),
        }
    }
}

/// Normalized sub-scores before weighting, retained for admin visibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub availability: f32,
    pub specialization: f32,
    pub workload: f32,
    pub history: f32,
}

/// Final score for one eligible candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub ca_id: CaId,
    /// Weighted sum scaled to an integer in 0..=100.
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub factors: Vec<ScoreFactor>,
}

/// Stateless engine applying the weighted rubric to eligible candidates.
pub struct ScoringEngine {
    config: AssignmentConfig,
}

impl ScoringEngine {
    pub fn new(config: AssignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    /// Score one candidate against a request. Inputs are a consistent
    /// snapshot; the computation is pure and bounded.
    pub fn score(&self, request: &ServiceRequest, candidate: &CandidateSnapshot) -> CandidateScore {
        let weights = &self.config.weights;
        let mut factors = Vec::new();

        let availability = availability_score(candidate.booked_slots, candidate.total_slots);
        if availability > 0.70 {
            factors.push(ScoreFactor::HighAvailability {
                free_ratio: availability,
            });
        }

        let specialization =
            if candidate.profile.primary_specialization() == Some(request.service_type) {
                factors.push(ScoreFactor::PrimarySpecialization);
                1.0
            } else if candidate.profile.covers(request.service_type) {
                factors.push(ScoreFactor::SecondarySpecialization);
                0.7
            } else {
                // Reachable only through the specialization override path.
                0.0
            };

        let workload = workload_score(candidate.active_assignments);
        if workload > 0.80 {
            factors.push(ScoreFactor::LowWorkload {
                active_assignments: candidate.active_assignments,
            });
        }

        let history = history_score(&candidate.history);
        if history > 0.80 {
            factors.push(ScoreFactor::StrongHistory {
                average_rating: candidate.history.average_rating,
                completions: candidate.history.completed_same_type,
            });
        }

        let mut weighted = availability * weights.availability
            + specialization * weights.specialization
            + workload * weights.workload
            + history * weights.history;

        if !candidate.history.served_client_before && weighted > self.config.variety_floor {
            weighted = (weighted * self.config.variety_bonus).min(1.0);
            factors.push(ScoreFactor::VarietyBonus);
        }

        CandidateScore {
            ca_id: candidate.profile.ca_id.clone(),
            score: (weighted * 100.0).round() as u8,
            breakdown: ScoreBreakdown {
                availability,
                specialization,
                workload,
                history,
            },
            factors,
        }
    }

    /// Score and rank candidates: non-increasing score, ties broken by
    /// candidate id so repeated calls over the same snapshot are
    /// deterministic.
    pub fn rank(
        &self,
        request: &ServiceRequest,
        candidates: &[CandidateSnapshot],
    ) -> Vec<CandidateScore> {
        let mut scored: Vec<CandidateScore> = candidates
            .iter()
            .map(|candidate| self.score(request, candidate))
            .collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.ca_id.cmp(&b.ca_id)));
        scored
    }
}

fn availability_score(booked_slots: u16, total_slots: u16) -> f32 {
    if total_slots == 0 {
        return 0.0;
    }
    let booked = booked_slots.min(total_slots);
    1.0 - booked as f32 / total_slots as f32
}

fn workload_score(active_assignments: u16) -> f32 {
    match active_assignments {
        0 => 1.0,
        1..=2 => 0.9,
        3..=5 => 0.6,
        _ => 0.2,
    }
}

fn history_score(history: &super::domain::ServiceHistory) -> f32 {
    if history.completed_same_type == 0 {
        // Neutral default with no track record for this service type.
        return 0.5;
    }

    let base = (history.average_rating / 5.0).clamp(0.0, 1.0);
    if history.completed_same_type >= 10 {
        (base * 1.1).min(1.0)
    } else if history.completed_same_type < 3 {
        base * 0.9
    } else {
        base
    }
}
