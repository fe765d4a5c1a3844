//! Executes an analytics request as one aggregation query and shapes the
//! rows into data points.

use anyhow::Result;
use log::debug;
use sqlx::SqlitePool;

use super::plan::{self, QueryPlan};
use super::{AnalyticsDataPoint, AnalyticsRequest, GroupBy};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Run one analytics request on behalf of `user_id`.
///
/// `user_id` comes from the caller's authenticated context, never from the
/// request payload. The owner predicate is appended inside the single SQL
/// assembly path below, so no request shape can bypass it. Zero matching
/// rows is an empty list, not an error.
pub async fn get_analytics_data(
    pool: &SqlitePool,
    user_id: i64,
    request: &AnalyticsRequest,
) -> Result<Vec<AnalyticsDataPoint>> {
    let plan = plan::resolve(request.metric, request.group_by);
    let sql = build_sql(&plan, request);
    debug!("analytics query for user {}: {}", user_id, sql);

    let mut query = sqlx::query_as::<_, (Option<String>, Option<f64>)>(&sql).bind(user_id);
    if let Some(start) = request.start_date {
        query = query.bind(start.format(DATE_FORMAT).to_string());
    }
    if let Some(end) = request.end_date {
        query = query.bind(end.format(DATE_FORMAT).to_string());
    }
    if plan.filter_column.is_some() {
        for &id in &request.filter_ids {
            query = query.bind(id);
        }
    }
    let rows = query.fetch_all(pool).await?;

    let is_date_series = request.group_by == Some(GroupBy::Date);
    Ok(rows
        .into_iter()
        .map(|(label, value)| {
            let label = label.unwrap_or_else(|| "Unknown".to_string());
            AnalyticsDataPoint {
                date: is_date_series.then(|| label.clone()),
                value: value.unwrap_or(0.0),
                label,
            }
        })
        .collect())
}

fn build_sql(plan: &QueryPlan, request: &AnalyticsRequest) -> String {
    // CAST keeps counts and rep sums decoding as REAL alongside the
    // weight-based aggregates.
    let mut sql = match plan.group_key {
        Some(key) => format!(
            "SELECT {} AS label, CAST({} AS REAL) AS value {}",
            key, plan.aggregate, plan.from_clause
        ),
        None => format!(
            "SELECT 'Total' AS label, CAST({} AS REAL) AS value {}",
            plan.aggregate, plan.from_clause
        ),
    };

    sql.push_str(" WHERE ws.user_id = ?");
    if request.start_date.is_some() {
        sql.push_str(" AND ws.date >= ?");
    }
    if request.end_date.is_some() {
        sql.push_str(" AND ws.date <= ?");
    }
    if let Some(column) = plan.filter_column {
        if !request.filter_ids.is_empty() {
            let placeholders = vec!["?"; request.filter_ids.len()].join(", ");
            sql.push_str(&format!(" AND {} IN ({})", column, placeholders));
        }
    }
    if let Some(key) = plan.group_key {
        sql.push_str(&format!(" GROUP BY {} ORDER BY {} ASC", key, key));
    }
    sql
}
