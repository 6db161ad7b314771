// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Timesheet entry endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime};

use crate::{
    auth::{Auth, VerifiedClaims},
    error::ApiError,
    models::{
        CreateEntryRequest, DataResponse, DateRange, EntryInput, NewTimesheetEntry,
        TimesheetEntry,
    },
    state::AppState,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Record a timesheet entry for the caller.
#[utoipa::path(
    post,
    path = "/api/timesheet/demo",
    tag = "Timesheet",
    request_body = CreateEntryRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Entry recorded", body = TimesheetEntry),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 500, description = "Server error"),
    )
)]
pub async fn create_entry(
    State(state): State<AppState>,
    Auth(claims): Auth,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<TimesheetEntry>>), ApiError> {
    let Json(request) = payload?;
    let employee_oid = caller_oid(&claims)?;
    let input = request
        .entry
        .ok_or_else(|| ApiError::bad_request("Missing required fields"))?;
    let entry = validate_entry(employee_oid, input)?;

    let created = state.store.create_entry(entry).await?;
    tracing::info!(
        entry_id = %created.id,
        employee_oid = %created.employee_oid,
        date = %created.date,
        hours = created.hours,
        "timesheet entry recorded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

/// List the caller's entries, optionally bounded by date.
#[utoipa::path(
    get,
    path = "/api/timesheet",
    tag = "Timesheet",
    params(DateRange),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Entries by date and start time", body = [TimesheetEntry]),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Auth(claims): Auth,
    query: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<TimesheetEntry>>>, ApiError> {
    let Query(range) = query?;
    if range.is_inverted() {
        return Err(ApiError::bad_request("'from' must not be after 'to'"));
    }
    let employee_oid = caller_oid(&claims)?;

    let entries = state.store.list_entries(&employee_oid, range).await?;
    Ok(Json(DataResponse::new(entries)))
}

fn caller_oid(claims: &VerifiedClaims) -> Result<String, ApiError> {
    claims
        .object_id()
        .map(str::to_owned)
        .ok_or_else(|| ApiError::unauthorized("Token has no object id"))
}

fn validate_entry(
    employee_oid: String,
    input: EntryInput,
) -> Result<NewTimesheetEntry, ApiError> {
    let required = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let (Some(date), Some(start), Some(end)) = (
        required(input.date),
        required(input.start_time),
        required(input.end_time),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| ApiError::bad_request("date must be YYYY-MM-DD"))?;
    let start_time = parse_time(&start, "startTime")?;
    let end_time = parse_time(&end, "endTime")?;
    if end_time <= start_time {
        return Err(ApiError::bad_request("endTime must be after startTime"));
    }

    let hours = match input.hours {
        Some(hours) if hours.is_finite() && hours >= 0.0 => hours,
        Some(_) => return Err(ApiError::bad_request("hours must be a non-negative number")),
        None => worked_hours(start_time, end_time),
    };

    Ok(NewTimesheetEntry {
        employee_oid,
        date,
        entry_type: input.entry_type,
        project: input.project,
        phase: input.phase,
        start_time,
        end_time,
        hours,
        notes: input.notes,
    })
}

fn parse_time(value: &str, field: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| ApiError::bad_request(format!("{field} must be HH:MM")))
}

/// Hours between two times, rounded to two decimals.
fn worked_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    let minutes = (end - start).num_minutes() as f64;
    (minutes / 60.0 * 100.0).round() / 100.0
}
