use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::extract::Owner;
use crate::model::{DailyCount, MappingAnalyticsQuery, OwnerAnalyticsQuery};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use burrow_core::{ShortCode, TimeRange};
use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::Timestamp;

pub async fn mapping_analytics_handler(
    Path(short_code): Path<String>,
    Query(query): Query<MappingAnalyticsQuery>,
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<DailyCount>>> {
    let code = ShortCode::new(short_code)?;
    let range = TimeRange::new(parse_timestamp(&query.start)?, parse_timestamp(&query.end)?)?;

    let series = state
        .analytics()
        .count_by_day_for_code(&owner, &code, range)
        .await?;
    Ok(Json(series.into_iter().map(DailyCount::from).collect()))
}

pub async fn owner_analytics_handler(
    Query(query): Query<OwnerAnalyticsQuery>,
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<BTreeMap<String, u64>>> {
    let start = parse_date(&query.start_date)?;
    let end = parse_date(&query.end_date)?;

    let counts = state
        .analytics()
        .count_by_day_for_owner(&owner, start, end)
        .await?;
    Ok(Json(
        counts
            .into_iter()
            .map(|(date, count)| (date.to_string(), count))
            .collect(),
    ))
}

/// Parses an ISO-8601 instant. Values without an offset are taken as UTC.
fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Ok(ts);
    }

    let local: DateTime = raw
        .parse()
        .map_err(|e| AppError::InvalidInput(format!("invalid timestamp '{raw}': {e}")))?;
    local
        .to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .map_err(|e| AppError::InvalidInput(format!("invalid timestamp '{raw}': {e}")))
}

fn parse_date(raw: &str) -> Result<Date> {
    raw.parse()
        .map_err(|e| AppError::InvalidInput(format!("invalid date '{raw}': {e}")))
}
