//! Dashboard widget store: saved analytics requests plus display metadata,
//! keyed by owner. Widgets persist the metric and grouping as strings, so
//! resolving one back into an [`AnalyticsRequest`] can fail and is a
//! request rejection, not a panic.

use anyhow::Result;
use chrono::{Days, NaiveDate};
use sqlx::SqlitePool;

use crate::analytics::{AnalyticsRequest, GroupBy, Metric, RequestError};
use crate::db::models::{DashboardWidget, NewDashboardWidget, UpdateDashboardWidget};

pub async fn create_widget(
    pool: &SqlitePool,
    user_id: i64,
    widget: &NewDashboardWidget,
) -> Result<DashboardWidget> {
    sqlx::query_as::<_, DashboardWidget>(
        "INSERT INTO dashboard_widgets \
         (user_id, title, metric, group_by, time_range, chart_type, filter_type, filter_id, position) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING *",
    )
    .bind(user_id)
    .bind(&widget.title)
    .bind(&widget.metric)
    .bind(&widget.group_by)
    .bind(&widget.time_range)
    .bind(&widget.chart_type)
    .bind(&widget.filter_type)
    .bind(&widget.filter_id)
    .bind(widget.position)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_widgets_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<DashboardWidget>> {
    sqlx::query_as::<_, DashboardWidget>(
        "SELECT * FROM dashboard_widgets WHERE user_id = ?1 ORDER BY position, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_widget(
    pool: &SqlitePool,
    user_id: i64,
    widget_id: i64,
) -> Result<Option<DashboardWidget>> {
    sqlx::query_as::<_, DashboardWidget>(
        "SELECT * FROM dashboard_widgets WHERE id = ?1 AND user_id = ?2",
    )
    .bind(widget_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

/// Partial update. Returns `None` when the widget does not exist or belongs
/// to another user.
pub async fn update_widget(
    pool: &SqlitePool,
    user_id: i64,
    widget_id: i64,
    update: &UpdateDashboardWidget,
) -> Result<Option<DashboardWidget>> {
    sqlx::query_as::<_, DashboardWidget>(
        "UPDATE dashboard_widgets SET \
         title = COALESCE(?3, title), \
         metric = COALESCE(?4, metric), \
         group_by = COALESCE(?5, group_by), \
         time_range = COALESCE(?6, time_range), \
         chart_type = COALESCE(?7, chart_type), \
         filter_type = COALESCE(?8, filter_type), \
         filter_id = COALESCE(?9, filter_id), \
         position = COALESCE(?10, position), \
         updated_at = CAST(strftime('%s','now') AS INTEGER) \
         WHERE id = ?1 AND user_id = ?2 RETURNING *",
    )
    .bind(widget_id)
    .bind(user_id)
    .bind(&update.title)
    .bind(&update.metric)
    .bind(&update.group_by)
    .bind(&update.time_range)
    .bind(&update.chart_type)
    .bind(&update.filter_type)
    .bind(&update.filter_id)
    .bind(update.position)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

pub async fn delete_widget(pool: &SqlitePool, user_id: i64, widget_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM dashboard_widgets WHERE id = ?1 AND user_id = ?2")
        .bind(widget_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Windows a widget's `time_range` into an inclusive start date ending at
/// `today`. Unknown ranges (including "all") apply no bound.
fn start_date_for_range(time_range: &str, today: NaiveDate) -> Option<NaiveDate> {
    let days: u64 = match time_range {
        "7d" => 7,
        "30d" => 30,
        "90d" => 90,
        "180d" => 180,
        "1y" => 365,
        _ => return None,
    };
    today.checked_sub_days(Days::new(days - 1))
}

impl DashboardWidget {
    /// Resolve this widget into the request the engine runs at render time.
    /// `today` is supplied by the caller; the core never reads a wall
    /// clock.
    pub fn to_request(&self, today: NaiveDate) -> Result<AnalyticsRequest, RequestError> {
        let metric: Metric = self.metric.parse()?;
        let group_by: GroupBy = self.group_by.parse()?;
        let filter_ids = match self.filter_type.as_str() {
            "exercise" | "muscle_group" => self
                .filter_id
                .as_deref()
                .and_then(|id| id.parse::<i64>().ok())
                .into_iter()
                .collect(),
            _ => Vec::new(),
        };
        Ok(AnalyticsRequest {
            metric,
            group_by: Some(group_by),
            start_date: start_date_for_range(&self.time_range, today),
            end_date: None,
            filter_ids,
        })
    }
}
