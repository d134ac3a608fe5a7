//! Joins caretakers with their association and herd, scores them, and manages
//! stored performance assessments.

use std::collections::HashMap;

use db::models::{
    association::Association,
    caretaker::{Caretaker, CaretakerStatus},
    performance_assessment::{CreatePerformanceAssessment, PerformanceAssessment},
    pig::Pig,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::{debug, info};
use ts_rs::TS;
use utils::text::round2;
use uuid::Uuid;

use super::rating::{CategoryScores, DescriptiveRating, RatingBreakdown, rate_caretaker};

pub const UNKNOWN_ASSOCIATION: &str = "Unknown Association";

#[derive(Debug, Error)]
pub enum PerformanceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("caretaker not found")]
    CaretakerNotFound,
    #[error("assessment not found")]
    AssessmentNotFound,
    #[error("{0} must be between 1 and 5")]
    RatingOutOfRange(&'static str),
    #[error("assessedBy is required")]
    MissingAssessor,
}

/// A caretaker joined with its association and scored
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CaretakerRating {
    pub caretaker_id: Uuid,
    pub caretaker_name: String,
    pub association_id: Option<Uuid>,
    pub association_name: String,
    pub status: CaretakerStatus,
    pub rating: RatingBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RatingCount {
    pub rating: DescriptiveRating,
    #[ts(type = "number")]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RatingsSummary {
    #[ts(type = "number")]
    pub total_caretakers: usize,
    pub average_score: f64,
    pub highest_score: Option<f64>,
    pub lowest_score: Option<f64>,
    pub distribution: Vec<RatingCount>,
}

/// True when the pig belongs to the caretaker, by id or (for legacy rows without
/// an id) by name
fn pig_belongs_to(pig: &Pig, caretaker: &Caretaker, full_name: &str) -> bool {
    match pig.caretaker_id {
        Some(id) => id == caretaker.id,
        None => {
            let name = pig.caretaker_name.trim();
            !name.is_empty()
                && (name.eq_ignore_ascii_case(full_name)
                    || name.eq_ignore_ascii_case(&format!(
                        "{} {}",
                        caretaker.first_name, caretaker.last_name
                    )))
        }
    }
}

pub struct PerformanceService;

impl PerformanceService {
    /// Pure join-then-score step over already fetched records
    pub fn score_all(
        caretakers: &[Caretaker],
        associations: &[Association],
        pigs: &[Pig],
    ) -> Vec<CaretakerRating> {
        let associations_by_id: HashMap<Uuid, &Association> =
            associations.iter().map(|a| (a.id, a)).collect();

        let mut pigs_by_caretaker: HashMap<Uuid, Vec<&Pig>> = HashMap::new();
        let mut unlinked: Vec<&Pig> = Vec::new();
        for pig in pigs {
            match pig.caretaker_id {
                Some(id) => pigs_by_caretaker.entry(id).or_default().push(pig),
                None => unlinked.push(pig),
            }
        }

        caretakers
            .iter()
            .map(|caretaker| {
                let full_name = caretaker.full_name();
                let association = caretaker
                    .slp_association
                    .and_then(|id| associations_by_id.get(&id).copied());

                let mut herd = pigs_by_caretaker
                    .get(&caretaker.id)
                    .cloned()
                    .unwrap_or_default();
                herd.extend(
                    unlinked
                        .iter()
                        .copied()
                        .filter(|p| pig_belongs_to(p, caretaker, &full_name)),
                );

                CaretakerRating {
                    caretaker_id: caretaker.id,
                    caretaker_name: full_name,
                    association_id: caretaker.slp_association,
                    association_name: association
                        .map(|a| a.name.clone())
                        .unwrap_or_else(|| UNKNOWN_ASSOCIATION.to_string()),
                    status: caretaker.status,
                    rating: rate_caretaker(caretaker, association, &herd),
                }
            })
            .collect()
    }

    /// Fetch caretakers, associations, and pigs independently and score every caretaker
    pub async fn list_ratings(pool: &SqlitePool) -> Result<Vec<CaretakerRating>, PerformanceError> {
        let (caretakers, associations, pigs) = tokio::try_join!(
            Caretaker::find_all(pool),
            Association::find_all(pool),
            Pig::find_all(pool),
        )?;
        debug!(
            caretakers = caretakers.len(),
            associations = associations.len(),
            pigs = pigs.len(),
            "Scoring caretakers"
        );
        Ok(Self::score_all(&caretakers, &associations, &pigs))
    }

    pub async fn rating_for(
        pool: &SqlitePool,
        caretaker_id: Uuid,
    ) -> Result<CaretakerRating, PerformanceError> {
        let caretaker = Caretaker::find_by_id(pool, caretaker_id)
            .await?
            .ok_or(PerformanceError::CaretakerNotFound)?;
        let association = match caretaker.slp_association {
            Some(id) => Association::find_by_id(pool, id).await?,
            None => None,
        };
        let pigs = Pig::find_all(pool).await?;
        let associations: Vec<Association> = association.into_iter().collect();

        Self::score_all(std::slice::from_ref(&caretaker), &associations, &pigs)
            .pop()
            .ok_or(PerformanceError::CaretakerNotFound)
    }

    pub fn summarize(ratings: &[CaretakerRating]) -> RatingsSummary {
        let scores: Vec<f64> = ratings.iter().map(|r| r.rating.overall_score).collect();
        let average_score = if scores.is_empty() {
            0.0
        } else {
            round2(scores.iter().sum::<f64>() / scores.len() as f64)
        };

        let distribution = DescriptiveRating::iter()
            .map(|rating| RatingCount {
                rating,
                count: ratings
                    .iter()
                    .filter(|r| r.rating.descriptive_rating == rating)
                    .count(),
            })
            .collect();

        RatingsSummary {
            total_caretakers: ratings.len(),
            average_score,
            highest_score: scores.iter().copied().reduce(f64::max),
            lowest_score: scores.iter().copied().reduce(f64::min),
            distribution,
        }
    }

    /// Validate and store a manual assessment; its overall rating uses the same weights
    /// as the computed score.
    pub async fn create_assessment(
        pool: &SqlitePool,
        data: &CreatePerformanceAssessment,
    ) -> Result<PerformanceAssessment, PerformanceError> {
        let scores = CategoryScores {
            punctuality: data.punctuality,
            communication: data.communication,
            patient_care: data.patient_care,
            professionalism: data.professionalism,
            technical_skills: data.technical_skills,
        };
        if let Some(category) = scores.first_out_of_range() {
            return Err(PerformanceError::RatingOutOfRange(category));
        }
        if data.assessed_by.trim().is_empty() {
            return Err(PerformanceError::MissingAssessor);
        }
        if Caretaker::find_by_id(pool, data.caretaker_id).await?.is_none() {
            return Err(PerformanceError::CaretakerNotFound);
        }

        let overall_rating = scores.weighted_average();
        let assessment =
            PerformanceAssessment::create(pool, data, overall_rating, Uuid::new_v4()).await?;

        info!(
            caretaker_id = %data.caretaker_id,
            assessment_id = %assessment.id,
            overall_rating,
            "Performance assessment recorded"
        );
        Ok(assessment)
    }

    pub async fn list_assessments(
        pool: &SqlitePool,
        caretaker_id: Option<Uuid>,
    ) -> Result<Vec<PerformanceAssessment>, PerformanceError> {
        let assessments = match caretaker_id {
            Some(id) => PerformanceAssessment::find_by_caretaker_id(pool, id).await?,
            None => PerformanceAssessment::find_all(pool).await?,
        };
        Ok(assessments)
    }

    pub async fn delete_assessment(pool: &SqlitePool, id: Uuid) -> Result<(), PerformanceError> {
        match PerformanceAssessment::delete(pool, id).await? {
            0 => Err(PerformanceError::AssessmentNotFound),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::{
            association::CreateAssociation,
            caretaker::CreateCaretaker,
            pig::{BreedingStatus, CreatePig, HealthStatus},
        },
    };

    use super::*;

    fn new_caretaker(first: &str, association: Option<Uuid>) -> CreateCaretaker {
        CreateCaretaker {
            first_name: first.to_string(),
            middle_name: None,
            last_name: "Bautista".to_string(),
            barangay: None,
            municipality: None,
            province: None,
            contact_number: None,
            slp_association: association,
            status: None,
            modality: None,
            participant_type: None,
        }
    }

    fn new_pig(caretaker_id: Option<Uuid>, caretaker_name: Option<&str>) -> CreatePig {
        CreatePig {
            caretaker_id,
            caretaker_name: caretaker_name.map(str::to_string),
            health_status: Some(HealthStatus::Excellent),
            breeding_status: Some(BreedingStatus::Weaned),
            weight: 80.0,
            sex: None,
            breed: None,
            date_of_birth: None,
        }
    }

    #[tokio::test]
    async fn ratings_join_pigs_and_default_missing_association() {
        let db = DBService::new_in_memory().await.unwrap();
        let association = Association::create(
            &db.pool,
            &CreateAssociation {
                name: "Sto. Niño SLPA".to_string(),
                location: "Panabo".to_string(),
                total_members: None,
                active_members: None,
                status: None,
                date_formulated: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let linked = Caretaker::create(
            &db.pool,
            &new_caretaker("Ana", Some(association.id)),
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let orphan = Caretaker::create(
            &db.pool,
            &new_caretaker("Ben", Some(Uuid::new_v4())),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        Pig::create(&db.pool, &new_pig(Some(linked.id), None), None, Uuid::new_v4())
            .await
            .unwrap();
        Pig::create(&db.pool, &new_pig(None, Some("ana bautista")), None, Uuid::new_v4())
            .await
            .unwrap();

        let ratings = PerformanceService::list_ratings(&db.pool).await.unwrap();
        assert_eq!(ratings.len(), 2);

        let ana = ratings.iter().find(|r| r.caretaker_id == linked.id).unwrap();
        assert_eq!(ana.association_name, "Sto. Niño SLPA");
        assert_eq!(ana.rating.metrics.pig_count, 2);
        assert_eq!(ana.rating.plus_factor, 0.10);

        let ben = ratings.iter().find(|r| r.caretaker_id == orphan.id).unwrap();
        assert_eq!(ben.association_name, UNKNOWN_ASSOCIATION);
        assert_eq!(ben.rating.metrics.pig_count, 0);

        let summary = PerformanceService::summarize(&ratings);
        assert_eq!(summary.total_caretakers, 2);
        let counted: usize = summary.distribution.iter().map(|c| c.count).sum();
        assert_eq!(counted, 2);
        assert!(summary.lowest_score <= summary.highest_score);
    }

    #[tokio::test]
    async fn assessment_rejects_out_of_range_ratings() {
        let db = DBService::new_in_memory().await.unwrap();
        let caretaker = Caretaker::create(&db.pool, &new_caretaker("Cora", None), Uuid::new_v4())
            .await
            .unwrap();

        let mut data = CreatePerformanceAssessment {
            caretaker_id: caretaker.id,
            punctuality: 5.0,
            communication: 4.0,
            patient_care: 4.0,
            professionalism: 3.0,
            technical_skills: 6.0,
            comments: None,
            assessed_by: "PDO Santos".to_string(),
        };
        let err = PerformanceService::create_assessment(&db.pool, &data)
            .await
            .unwrap_err();
        assert!(matches!(err, PerformanceError::RatingOutOfRange("technicalSkills")));

        data.technical_skills = 4.0;
        let stored = PerformanceService::create_assessment(&db.pool, &data)
            .await
            .unwrap();
        // 1.0 + 0.8 + 1.0 + 0.45 + 0.8
        assert_eq!(stored.overall_rating, 4.05);

        let listed = PerformanceService::list_assessments(&db.pool, Some(caretaker.id))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }
}
