//! Search and filter predicates applied to fetched listings.
//!
//! Every filter deserializes straight from query-string parameters; unset fields
//! match everything.

use db::models::{
    activity_log::ActivityLogFilter,
    association::{Association, AssociationStatus},
    caretaker::{Caretaker, CaretakerStatus},
    financial_report::FinancialReport,
    monitoring_record::{MonitoringRecord, MonitoringStatus, MonitoringType},
    pig::{BreedingStatus, HealthStatus, Pig},
};
use serde::Deserialize;
use uuid::Uuid;

use super::{performance::CaretakerRating, rating::DescriptiveRating};

pub const DEFAULT_ACTIVITY_LOG_LIMIT: i64 = 100;
pub const MAX_ACTIVITY_LOG_LIMIT: i64 = 500;

/// Case-insensitive substring match; a blank needle matches everything
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaretakerFilter {
    pub search: Option<String>,
    pub status: Option<CaretakerStatus>,
    pub association_id: Option<Uuid>,
}

impl CaretakerFilter {
    pub fn search_term(&self) -> Option<&str> {
        search_term(&self.search)
    }

    pub fn matches(&self, caretaker: &Caretaker, association_name: &str) -> bool {
        if self.status.is_some_and(|s| s != caretaker.status) {
            return false;
        }
        if self
            .association_id
            .is_some_and(|id| caretaker.slp_association != Some(id))
        {
            return false;
        }
        match search_term(&self.search) {
            Some(term) => [
                caretaker.full_name().as_str(),
                caretaker.barangay.as_str(),
                caretaker.municipality.as_str(),
                association_name,
            ]
            .into_iter()
            .any(|field| contains_ci(field, term)),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationFilter {
    pub search: Option<String>,
    pub status: Option<AssociationStatus>,
    #[serde(default)]
    pub include_archived: bool,
}

impl AssociationFilter {
    pub fn search_term(&self) -> Option<&str> {
        search_term(&self.search)
    }

    pub fn matches(&self, association: &Association) -> bool {
        if association.archived && !self.include_archived {
            return false;
        }
        if self.status.is_some_and(|s| s != association.status) {
            return false;
        }
        search_term(&self.search).is_none_or(|term| {
            contains_ci(&association.name, term) || contains_ci(&association.location, term)
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PigFilter {
    pub search: Option<String>,
    pub health_status: Option<HealthStatus>,
    pub breeding_status: Option<BreedingStatus>,
    pub caretaker_id: Option<Uuid>,
}

impl PigFilter {
    pub fn search_term(&self) -> Option<&str> {
        search_term(&self.search)
    }

    pub fn matches(&self, pig: &Pig) -> bool {
        if self.health_status.is_some_and(|s| s != pig.health_status) {
            return false;
        }
        if self.breeding_status.is_some_and(|s| s != pig.breeding_status) {
            return false;
        }
        if self.caretaker_id.is_some_and(|id| pig.caretaker_id != Some(id)) {
            return false;
        }
        search_term(&self.search).is_none_or(|term| {
            contains_ci(&pig.caretaker_name, term)
                || pig.breed.as_deref().is_some_and(|b| contains_ci(b, term))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringFilter {
    pub project_id: Option<Uuid>,
    pub association_id: Option<Uuid>,
    pub monitoring_type: Option<MonitoringType>,
    pub status: Option<MonitoringStatus>,
}

impl MonitoringFilter {
    pub fn matches(&self, record: &MonitoringRecord) -> bool {
        self.project_id.is_none_or(|id| record.project_id == id)
            && self
                .association_id
                .is_none_or(|id| record.association_ids.contains(&id))
            && self
                .monitoring_type
                .is_none_or(|t| record.monitoring_type == t)
            && self.status.is_none_or(|s| record.status == s)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialFilter {
    pub association_id: Option<Uuid>,
    pub caretaker_id: Option<Uuid>,
    pub reporting_period: Option<String>,
}

impl FinancialFilter {
    pub fn matches(&self, report: &FinancialReport) -> bool {
        self.association_id
            .is_none_or(|id| report.association_id == id)
            && self
                .caretaker_id
                .is_none_or(|id| report.caretaker_id == Some(id))
            && search_term(&self.reporting_period)
                .is_none_or(|period| report.reporting_period.eq_ignore_ascii_case(period))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingFilter {
    pub search: Option<String>,
    pub rating: Option<DescriptiveRating>,
}

impl RatingFilter {
    pub fn search_term(&self) -> Option<&str> {
        search_term(&self.search)
    }

    pub fn matches(&self, rating: &CaretakerRating) -> bool {
        if self
            .rating
            .is_some_and(|r| r != rating.rating.descriptive_rating)
        {
            return false;
        }
        search_term(&self.search).is_none_or(|term| {
            contains_ci(&rating.caretaker_name, term) || contains_ci(&rating.association_name, term)
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    pub action: Option<String>,
    pub resource: Option<String>,
    pub limit: Option<i64>,
}

impl From<ActivityLogQuery> for ActivityLogFilter {
    fn from(query: ActivityLogQuery) -> Self {
        ActivityLogFilter {
            action: query.action.filter(|a| !a.trim().is_empty()),
            resource: query.resource.filter(|r| !r.trim().is_empty()),
            limit: query
                .limit
                .unwrap_or(DEFAULT_ACTIVITY_LOG_LIMIT)
                .clamp(1, MAX_ACTIVITY_LOG_LIMIT),
        }
    }
}
