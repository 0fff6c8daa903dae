use serde::{Deserialize, Serialize};

/// Relative weight of each scoring sub-score. The weights are expected to sum
/// to 1.0; the engine does not renormalize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub availability: f32,
    pub specialization: f32,
    pub workload: f32,
    pub history: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            availability: 0.40,
            specialization: 0.30,
            workload: 0.20,
            history: 0.10,
        }
    }
}

/// Business-hours window used by the after-hours eligibility rule, expressed
/// in the firm's local business calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 18,
        }
    }
}

impl BusinessHours {
    /// Monday through Friday, within the configured hour window.
    pub fn contains(&self, at: chrono::DateTime<chrono::Utc>) -> bool {
        use chrono::{Datelike, Timelike, Weekday};

        let weekday = at.weekday();
        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let hour = at.hour();
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Tunable dials for eligibility filtering, scoring, and auto-assignment.
/// Passed into the engines explicitly so environments can tune them and tests
/// can pin them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentConfig {
    pub weights: ScoringWeights,
    /// Best candidate must reach this score or the request falls back to
    /// manual assignment.
    pub min_auto_assign_score: u8,
    /// Multiplier applied when the candidate has never served this client and
    /// the pre-bonus score exceeds `variety_floor`. Capped at 1.0 pre-rounding.
    pub variety_bonus: f32,
    pub variety_floor: f32,
    /// How many runner-up candidates to surface alongside a successful
    /// auto-assignment.
    pub alternative_limit: usize,
    pub business_hours: BusinessHours,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_auto_assign_score: 50,
            variety_bonus: 1.05,
            variety_floor: 0.5,
            alternative_limit: 5,
            business_hours: BusinessHours::default(),
        }
    }
}
