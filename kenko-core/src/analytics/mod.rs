//! Analytics aggregation over the workout log store.
//!
//! A caller builds an [`AnalyticsRequest`] (which metric, grouped along
//! which dimension, over which date range), the planner resolves it to a
//! single aggregation query, and the result comes back as an ordered list
//! of [`AnalyticsDataPoint`]s. The requesting user is never part of the
//! request payload; it is passed separately by the authenticated caller and
//! every query is scoped to it.

mod engine;
mod plan;

pub use engine::get_analytics_data;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejection for a request that names an unknown metric or dimension.
/// Only reachable through stringly inputs (stored widgets, the CLI); typed
/// callers cannot construct an invalid combination.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("unknown group-by dimension: {0}")]
    UnknownGroupBy(String),
}

/// What to aggregate. The variant picks both the aggregate function and the
/// base table the query reads from: FREQUENCY counts distinct sessions,
/// everything else reduces over set records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Volume,
    MaxWeight,
    TotalReps,
    TotalSets,
    Frequency,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Volume,
        Metric::MaxWeight,
        Metric::TotalReps,
        Metric::TotalSets,
        Metric::Frequency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Volume => "volume",
            Metric::MaxWeight => "max_weight",
            Metric::TotalReps => "total_reps",
            Metric::TotalSets => "total_sets",
            Metric::Frequency => "frequency",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RequestError::UnknownMetric(s.to_string()))
    }
}

/// The grouping dimension. MUSCLE_GROUP fans a set out to every muscle
/// group its exercise is tagged with; WORKOUT_TEMPLATE groups by the
/// session's free-text name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    MuscleGroup,
    Exercise,
    WorkoutTemplate,
    Date,
}

impl GroupBy {
    pub const ALL: [GroupBy; 4] = [
        GroupBy::MuscleGroup,
        GroupBy::Exercise,
        GroupBy::WorkoutTemplate,
        GroupBy::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::MuscleGroup => "muscle_group",
            GroupBy::Exercise => "exercise",
            GroupBy::WorkoutTemplate => "workout_template",
            GroupBy::Date => "date",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupBy::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| RequestError::UnknownGroupBy(s.to_string()))
    }
}

/// One analytics query. `group_by: None` is the defensive ungrouped case
/// and collapses to a single "Total" point. `filter_ids` restricts to
/// specific muscle groups or exercises depending on the grouping; it is
/// ignored for WORKOUT_TEMPLATE and DATE, which have no filterable entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRequest {
    pub metric: Metric,
    #[serde(default)]
    pub group_by: Option<GroupBy>,
    /// Inclusive lower bound on the session date.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the session date.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub filter_ids: Vec<i64>,
}

/// One grouped result point. `value` is never null; an aggregate over zero
/// rows comes back as 0.0. `date` is set (to the same string as `label`)
/// only when grouping by DATE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsDataPoint {
    pub label: String,
    pub value: f64,
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>(), Ok(metric));
        }
        assert_eq!(
            "cadence".parse::<Metric>(),
            Err(RequestError::UnknownMetric("cadence".to_string()))
        );
    }

    #[test]
    fn group_by_names_round_trip() {
        for group_by in GroupBy::ALL {
            assert_eq!(group_by.as_str().parse::<GroupBy>(), Ok(group_by));
        }
        assert_eq!(
            "workout".parse::<GroupBy>(),
            Err(RequestError::UnknownGroupBy("workout".to_string()))
        );
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: AnalyticsRequest =
            serde_json::from_str(r#"{"metric": "max_weight", "group_by": "exercise"}"#).unwrap();
        assert_eq!(request.metric, Metric::MaxWeight);
        assert_eq!(request.group_by, Some(GroupBy::Exercise));
        assert_eq!(request.start_date, None);
        assert_eq!(request.end_date, None);
        assert!(request.filter_ids.is_empty());
    }
}
