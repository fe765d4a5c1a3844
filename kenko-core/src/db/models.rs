use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One workout on one calendar date. `date` is stored as `%Y-%m-%d` text.
#[derive(FromRow, Debug, Clone)]
pub struct WorkoutSession {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub date: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A single set: reps at a weight. `weight_unit` is informational only;
/// the engine never converts units.
#[derive(FromRow, Debug, Clone)]
pub struct SetRecord {
    pub id: i64,
    pub logged_exercise_id: i64,
    pub set_index: i64,
    pub reps: i64,
    pub weight: f64,
    pub weight_unit: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(FromRow, Debug, Clone)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_by_user_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(FromRow, Debug, Clone)]
pub struct MuscleGroup {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A saved analytics request plus display metadata, keyed by owner.
#[derive(FromRow, Debug, Clone, Serialize)]
pub struct DashboardWidget {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub metric: String,
    pub group_by: String,
    pub time_range: String,
    pub chart_type: String,
    pub filter_type: String,
    pub filter_id: Option<String>,
    pub position: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl fmt::Display for DashboardWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} \"{}\" ({} by {}, {})",
            self.id, self.title, self.metric, self.group_by, self.time_range
        )
    }
}

fn default_chart_type() -> String {
    "area".to_string()
}

fn default_filter_type() -> String {
    "none".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDashboardWidget {
    pub title: String,
    pub metric: String,
    pub group_by: String,
    pub time_range: String,
    #[serde(default = "default_chart_type")]
    pub chart_type: String,
    #[serde(default = "default_filter_type")]
    pub filter_type: String,
    #[serde(default)]
    pub filter_id: Option<String>,
    #[serde(default)]
    pub position: i64,
}

/// Partial widget update; `None` fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDashboardWidget {
    pub title: Option<String>,
    pub metric: Option<String>,
    pub group_by: Option<String>,
    pub time_range: Option<String>,
    pub chart_type: Option<String>,
    pub filter_type: Option<String>,
    pub filter_id: Option<String>,
    pub position: Option<i64>,
}
