// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response data structures used by the REST API. Stored types
//! derive `Serialize` and `ToSchema`; request payloads derive `Deserialize`
//! with every field optional so that missing fields are reported as a single
//! validation error rather than a deserialization failure.
//!
//! ## Model Categories
//!
//! - **Employees**: Upserted on login, keyed by the Entra ID object id
//! - **Timesheet entries**: Hours worked on a project phase or internal work

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// =============================================================================
// Employee Models
// =============================================================================

/// An employee known to the service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Employee {
    /// Entra ID object id (`oid` claim).
    pub object_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// When the employee first logged in.
    pub created_at: DateTime<Utc>,
}

/// Login payload sent by the frontend after sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Must equal the `oid` claim of the bearer token.
    #[serde(default)]
    pub object_id: Option<String>,
}

/// Validated employee data for an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub object_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Whether login created the employee record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoginStatus {
    Created,
    Updated,
}

/// Response for POST /login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub status: LoginStatus,
}

// =============================================================================
// Timesheet Models
// =============================================================================

/// Kind of work recorded by an entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Project,
    Internal,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Project => "project",
            EntryType::Internal => "internal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "project" => Some(EntryType::Project),
            "internal" => Some(EntryType::Internal),
            _ => None,
        }
    }
}

/// A recorded timesheet entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub id: Uuid,
    /// Object id of the employee who recorded the entry.
    pub employee_oid: String,
    /// Work date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<EntryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Start time (`HH:MM`, 24-hour).
    pub start_time: String,
    /// End time (`HH:MM`, 24-hour).
    pub end_time: String,
    pub hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry fields as submitted by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "type", default)]
    pub entry_type: Option<EntryType>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for POST /api/timesheet/demo
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub entry: Option<EntryInput>,
}

/// Validated entry ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimesheetEntry {
    pub employee_oid: String,
    pub date: NaiveDate,
    pub entry_type: Option<EntryType>,
    pub project: Option<String>,
    pub phase: Option<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: f64,
    pub notes: Option<String>,
}

/// Optional inclusive date bounds for listing entries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, IntoParams, PartialEq, Eq)]
#[into_params(parameter_in = Query)]
pub struct DateRange {
    /// First date to include (`YYYY-MM-DD`).
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Last date to include (`YYYY-MM-DD`).
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }
}

/// `{"data": ...}` envelope used by every successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_payload_uses_camel_case_fields() {
        let request: CreateEntryRequest = serde_json::from_value(serde_json::json!({
            "entry": {
                "date": "2025-03-14",
                "type": "project",
                "project": "Atlas",
                "phase": "Design",
                "startTime": "09:00",
                "endTime": "12:30"
            }
        }))
        .unwrap();
        let entry = request.entry.unwrap();
        assert_eq!(entry.entry_type, Some(EntryType::Project));
        assert_eq!(entry.start_time.as_deref(), Some("09:00"));
        assert!(entry.hours.is_none());
    }

    #[test]
    fn login_payload_field_names() {
        let request: LoginRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "object_id": "oid-1"
        }))
        .unwrap();
        assert_eq!(request.first_name.as_deref(), Some("Ada"));
        assert_eq!(request.object_id.as_deref(), Some("oid-1"));
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
        let range = DateRange {
            from: Some(day(10)),
            to: Some(day(12)),
        };
        assert!(range.contains(day(10)));
        assert!(range.contains(day(12)));
        assert!(!range.contains(day(13)));
        assert!(DateRange::default().contains(day(1)));
        assert!(!range.is_inverted());
        assert!(DateRange {
            from: Some(day(12)),
            to: Some(day(10))
        }
        .is_inverted());
    }

    #[test]
    fn entry_type_round_trips_through_str() {
        for kind in [EntryType::Project, EntryType::Internal] {
            assert_eq!(EntryType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntryType::parse("vacation"), None);
    }
}
