//! Caretaker performance scoring.
//!
//! A caretaker's rating is derived from the pigs in their care and the status of
//! their association. Five category scores (1-5) are built from three rates, combined
//! with fixed weights, nudged by a small "plus factor", and finally bucketed into a
//! descriptive label.

use db::models::{
    association::Association,
    caretaker::{Caretaker, CaretakerStatus},
    pig::Pig,
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use utils::text::round2;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// Bonus granted per satisfied plus-factor condition
pub const PLUS_FACTOR_STEP: f64 = 0.05;

/// Herd size that counts as a full workload (and earns a plus factor)
pub const FULL_HERD_SIZE: usize = 5;

/// Category weights, in the order punctuality, communication, patient care,
/// professionalism, technical skills. They sum to 1.
pub const CATEGORY_WEIGHTS: CategoryWeights = CategoryWeights {
    punctuality: 0.20,
    communication: 0.20,
    patient_care: 0.25,
    professionalism: 0.15,
    technical_skills: 0.20,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryWeights {
    pub punctuality: f64,
    pub communication: f64,
    pub patient_care: f64,
    pub professionalism: f64,
    pub technical_skills: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub punctuality: f64,
    pub communication: f64,
    pub patient_care: f64,
    pub professionalism: f64,
    pub technical_skills: f64,
}

impl CategoryScores {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.punctuality,
            self.communication,
            self.patient_care,
            self.professionalism,
            self.technical_skills,
        ]
    }

    /// Fixed-weight dot product, rounded to two decimals
    pub fn weighted_average(&self) -> f64 {
        let w = CATEGORY_WEIGHTS;
        round2(
            self.punctuality * w.punctuality
                + self.communication * w.communication
                + self.patient_care * w.patient_care
                + self.professionalism * w.professionalism
                + self.technical_skills * w.technical_skills,
        )
    }

    /// Name of the first category outside `[MIN_SCORE, MAX_SCORE]`, if any
    pub fn first_out_of_range(&self) -> Option<&'static str> {
        const NAMES: [&str; 5] = [
            "punctuality",
            "communication",
            "patientCare",
            "professionalism",
            "technicalSkills",
        ];
        self.as_array()
            .into_iter()
            .zip(NAMES)
            .find(|(score, _)| !(MIN_SCORE..=MAX_SCORE).contains(score))
            .map(|(_, name)| name)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TS,
    Display,
    EnumString,
    EnumIter,
)]
pub enum DescriptiveRating {
    Outstanding,
    #[serde(rename = "Very Satisfactory")]
    #[strum(serialize = "Very Satisfactory")]
    VerySatisfactory,
    Satisfactory,
    Fair,
    #[serde(rename = "Needs Improvement")]
    #[strum(serialize = "Needs Improvement")]
    NeedsImprovement,
}

impl DescriptiveRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.5 {
            DescriptiveRating::Outstanding
        } else if score >= 4.0 {
            DescriptiveRating::VerySatisfactory
        } else if score >= 3.5 {
            DescriptiveRating::Satisfactory
        } else if score >= 2.5 {
            DescriptiveRating::Fair
        } else {
            DescriptiveRating::NeedsImprovement
        }
    }
}

/// Rates derived from a caretaker's herd
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    #[ts(type = "number")]
    pub pig_count: usize,
    #[ts(type = "number")]
    pub healthy_count: usize,
    #[ts(type = "number")]
    pub breeding_count: usize,
    pub health_rate: f64,
    pub breeding_rate: f64,
    pub activity_score: f64,
}

impl PerformanceMetrics {
    pub fn derive(status: CaretakerStatus, pigs: &[&Pig]) -> Self {
        let pig_count = pigs.len();
        let healthy_count = pigs.iter().filter(|p| p.health_status.is_healthy()).count();
        let breeding_count = pigs
            .iter()
            .filter(|p| p.breeding_status.is_in_breeding_cycle())
            .count();

        let ratio = |n: usize| {
            if pig_count == 0 {
                0.0
            } else {
                n as f64 / pig_count as f64
            }
        };

        let status_factor = match status {
            CaretakerStatus::Active => 1.0,
            CaretakerStatus::OnLeave => 0.5,
            CaretakerStatus::Inactive => 0.0,
        };
        let workload = (pig_count as f64 / FULL_HERD_SIZE as f64).min(1.0);

        Self {
            pig_count,
            healthy_count,
            breeding_count,
            health_rate: round2(ratio(healthy_count)),
            breeding_rate: round2(ratio(breeding_count)),
            activity_score: round2(0.5 * status_factor + 0.5 * workload),
        }
    }
}

/// Map a 0..1 rate onto the 1..5 scale
pub fn score_from_rate(rate: f64) -> f64 {
    round2(MIN_SCORE + (MAX_SCORE - MIN_SCORE) * rate.clamp(0.0, 1.0))
}

impl CategoryScores {
    pub fn from_metrics(metrics: &PerformanceMetrics) -> Self {
        let health = metrics.health_rate;
        let breeding = metrics.breeding_rate;
        let activity = metrics.activity_score;
        Self {
            punctuality: score_from_rate(activity),
            communication: score_from_rate((activity + breeding) / 2.0),
            patient_care: score_from_rate(health),
            professionalism: score_from_rate((health + activity) / 2.0),
            technical_skills: score_from_rate(breeding),
        }
    }
}

/// +0.05 for each of: active caretaker, active association, full herd
pub fn plus_factor(caretaker_active: bool, association_active: bool, pig_count: usize) -> f64 {
    let satisfied = [
        caretaker_active,
        association_active,
        pig_count >= FULL_HERD_SIZE,
    ]
    .into_iter()
    .filter(|c| *c)
    .count();
    round2(satisfied as f64 * PLUS_FACTOR_STEP)
}

/// Clamp into `[MIN_SCORE, MAX_SCORE]` and round
pub fn overall_score(weighted_average: f64, plus_factor: f64) -> f64 {
    round2((weighted_average + plus_factor).clamp(MIN_SCORE, MAX_SCORE))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RatingBreakdown {
    pub metrics: PerformanceMetrics,
    pub scores: CategoryScores,
    pub weighted_average: f64,
    pub plus_factor: f64,
    pub overall_score: f64,
    pub descriptive_rating: DescriptiveRating,
}

/// Score one caretaker. A missing association simply forfeits its plus factor.
pub fn rate_caretaker(
    caretaker: &Caretaker,
    association: Option<&Association>,
    pigs: &[&Pig],
) -> RatingBreakdown {
    let metrics = PerformanceMetrics::derive(caretaker.status, pigs);
    let scores = CategoryScores::from_metrics(&metrics);
    let weighted_average = scores.weighted_average();
    let plus_factor = plus_factor(
        caretaker.status == CaretakerStatus::Active,
        association.is_some_and(Association::is_active),
        metrics.pig_count,
    );
    let overall_score = overall_score(weighted_average, plus_factor);

    RatingBreakdown {
        metrics,
        scores,
        weighted_average,
        plus_factor,
        overall_score,
        descriptive_rating: DescriptiveRating::from_score(overall_score),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use db::models::{
        association::AssociationStatus,
        pig::{BreedingStatus, HealthStatus},
    };
    use uuid::Uuid;

    use super::*;

    fn caretaker(status: CaretakerStatus) -> Caretaker {
        Caretaker {
            id: Uuid::new_v4(),
            first_name: "Juan".to_string(),
            middle_name: None,
            last_name: "Reyes".to_string(),
            barangay: "Magugpo".to_string(),
            municipality: "Tagum City".to_string(),
            province: "Davao del Norte".to_string(),
            contact_number: None,
            slp_association: None,
            status,
            modality: String::new(),
            participant_type: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn association(status: AssociationStatus) -> Association {
        Association {
            id: Uuid::new_v4(),
            name: "Bayanihan".to_string(),
            location: "Tagum".to_string(),
            total_members: 10,
            active_members: 10,
            status,
            archived: false,
            date_formulated: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn pig(health: HealthStatus, breeding: BreedingStatus) -> Pig {
        Pig {
            id: Uuid::new_v4(),
            caretaker_id: None,
            caretaker_name: String::new(),
            health_status: health,
            breeding_status: breeding,
            weight: 60.0,
            sex: None,
            breed: None,
            date_of_birth: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = CATEGORY_WEIGHTS;
        let sum = w.punctuality + w.communication + w.patient_care + w.professionalism
            + w.technical_skills;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_descriptive_rating_steps() {
        assert_eq!(DescriptiveRating::from_score(4.6), DescriptiveRating::Outstanding);
        assert_eq!(DescriptiveRating::from_score(4.5), DescriptiveRating::Outstanding);
        assert_eq!(
            DescriptiveRating::from_score(4.2),
            DescriptiveRating::VerySatisfactory
        );
        assert_eq!(DescriptiveRating::from_score(3.7), DescriptiveRating::Satisfactory);
        assert_eq!(DescriptiveRating::from_score(3.2), DescriptiveRating::Fair);
        assert_eq!(
            DescriptiveRating::from_score(1.0),
            DescriptiveRating::NeedsImprovement
        );
        assert_eq!(DescriptiveRating::VerySatisfactory.to_string(), "Very Satisfactory");
    }

    #[test]
    fn test_plus_factor_is_monotonic() {
        assert_eq!(plus_factor(false, false, 0), 0.0);
        assert_eq!(plus_factor(true, false, 0), 0.05);
        assert_eq!(plus_factor(true, true, 0), 0.10);
        assert_eq!(plus_factor(true, true, 5), 0.15);
        assert_eq!(plus_factor(false, false, 7), 0.05);
    }

    #[test]
    fn test_no_pigs_inactive_caretaker_scores_floor() {
        let rating = rate_caretaker(&caretaker(CaretakerStatus::Inactive), None, &[]);
        assert_eq!(rating.metrics.pig_count, 0);
        assert_eq!(rating.scores.as_array(), [1.0; 5]);
        assert_eq!(rating.weighted_average, 1.0);
        assert_eq!(rating.plus_factor, 0.0);
        assert_eq!(rating.overall_score, 1.0);
        assert_eq!(rating.descriptive_rating, DescriptiveRating::NeedsImprovement);
    }

    #[test]
    fn test_perfect_herd_is_clamped_to_max() {
        let pigs: Vec<Pig> = (0..6)
            .map(|_| pig(HealthStatus::Excellent, BreedingStatus::Pregnant))
            .collect();
        let refs: Vec<&Pig> = pigs.iter().collect();
        let assoc = association(AssociationStatus::Active);

        let rating = rate_caretaker(&caretaker(CaretakerStatus::Active), Some(&assoc), &refs);
        assert_eq!(rating.scores.as_array(), [5.0; 5]);
        assert_eq!(rating.weighted_average, 5.0);
        assert_eq!(rating.plus_factor, 0.15);
        assert_eq!(rating.overall_score, 5.0);
        assert_eq!(rating.descriptive_rating, DescriptiveRating::Outstanding);
    }

    #[test]
    fn test_mixed_herd_breakdown() {
        // 4 pigs: 3 healthy, 2 in a breeding cycle, caretaker on leave
        let pigs = [
            pig(HealthStatus::Excellent, BreedingStatus::Breeding),
            pig(HealthStatus::Good, BreedingStatus::Farrowed),
            pig(HealthStatus::Good, BreedingStatus::NotReady),
            pig(HealthStatus::Poor, BreedingStatus::Ready),
        ];
        let refs: Vec<&Pig> = pigs.iter().collect();
        let rating = rate_caretaker(&caretaker(CaretakerStatus::OnLeave), None, &refs);

        assert_eq!(rating.metrics.health_rate, 0.75);
        assert_eq!(rating.metrics.breeding_rate, 0.5);
        // 0.5 * 0.5 + 0.5 * 0.8
        assert_eq!(rating.metrics.activity_score, 0.65);

        assert_eq!(rating.scores.punctuality, 3.6);
        assert_eq!(rating.scores.communication, 3.3);
        assert_eq!(rating.scores.patient_care, 4.0);
        assert_eq!(rating.scores.professionalism, 3.8);
        assert_eq!(rating.scores.technical_skills, 3.0);

        let dot = 3.6 * 0.20 + 3.3 * 0.20 + 4.0 * 0.25 + 3.8 * 0.15 + 3.0 * 0.20;
        assert_eq!(rating.weighted_average, round2(dot));
        assert_eq!(rating.plus_factor, 0.0);
        assert_eq!(rating.overall_score, 3.55);
        assert_eq!(rating.descriptive_rating, DescriptiveRating::Satisfactory);
    }

    #[test]
    fn test_overall_score_always_in_range() {
        for wa in [0.0, 0.5, 1.0, 2.75, 4.99, 5.0, 7.0] {
            for pf in [0.0, 0.05, 0.10, 0.15] {
                let score = overall_score(wa, pf);
                assert!((MIN_SCORE..=MAX_SCORE).contains(&score), "{wa} + {pf} -> {score}");
            }
        }
    }

    #[test]
    fn test_first_out_of_range() {
        let scores = CategoryScores {
            punctuality: 5.0,
            communication: 4.0,
            patient_care: 6.0,
            professionalism: 1.0,
            technical_skills: 0.5,
        };
        assert_eq!(scores.first_out_of_range(), Some("patientCare"));
    }
}
