// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Postgres-backed [`TimesheetStore`].
//!
//! Migrations run before the server accepts requests, so handlers can assume
//! the schema exists. The database URL may carry credentials and is never
//! logged.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{format_time, StoreError, StoreResult, TimesheetStore, UpsertOutcome};
use crate::models::{
    DateRange, Employee, EntryType, NewEmployee, NewTimesheetEntry, TimesheetEntry,
};

/// Connection settings.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and apply pending migrations.
    pub async fn connect(config: &PostgresConfig) -> StoreResult<Self> {
        let connect_options = PgConnectOptions::from_str(&config.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(connect_options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database connected and migrated");

        Ok(Self { pool })
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    object_id: String,
    first_name: String,
    last_name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            object_id: row.object_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct EntryRow {
    id: Uuid,
    employee_oid: String,
    work_date: NaiveDate,
    entry_type: Option<String>,
    project: Option<String>,
    phase: Option<String>,
    start_time: String,
    end_time: String,
    hours: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EntryRow> for TimesheetEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let entry_type = row
            .entry_type
            .map(|value| {
                EntryType::parse(&value)
                    .ok_or_else(|| StoreError::InvalidRow(format!("unknown entry type '{value}'")))
            })
            .transpose()?;

        Ok(TimesheetEntry {
            id: row.id,
            employee_oid: row.employee_oid,
            date: row.work_date,
            entry_type,
            project: row.project,
            phase: row.phase,
            start_time: row.start_time,
            end_time: row.end_time,
            hours: row.hours,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

const EMPLOYEE_COLUMNS: &str = "object_id, first_name, last_name, email, created_at";

const ENTRY_COLUMNS: &str = "id, employee_oid, work_date, entry_type, project, phase, \
     start_time, end_time, hours, notes, created_at";

#[async_trait]
impl TimesheetStore for PostgresStore {
    async fn upsert_employee(&self, employee: NewEmployee) -> StoreResult<UpsertOutcome> {
        // DO NOTHING returns no row on conflict; the existing row is read back.
        let inserted = sqlx::query_as::<_, EmployeeRow>(&format!(
            "INSERT INTO employees (object_id, first_name, last_name, email)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (object_id) DO NOTHING
             RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(&employee.object_id)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(UpsertOutcome {
                employee: row.into(),
                created: true,
            });
        }

        let existing = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE object_id = $1"
        ))
        .bind(&employee.object_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UpsertOutcome {
            employee: existing.into(),
            created: false,
        })
    }

    async fn find_employee(&self, object_id: &str) -> StoreResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE object_id = $1"
        ))
        .bind(object_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Employee::from))
    }

    async fn create_entry(&self, entry: NewTimesheetEntry) -> StoreResult<TimesheetEntry> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "INSERT INTO timesheet_entries (
                id, employee_oid, work_date, entry_type, project, phase,
                start_time, end_time, hours, notes
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&entry.employee_oid)
        .bind(entry.date)
        .bind(entry.entry_type.map(|kind| kind.as_str()))
        .bind(&entry.project)
        .bind(&entry.phase)
        .bind(format_time(entry.start_time))
        .bind(format_time(entry.end_time))
        .bind(entry.hours)
        .bind(&entry.notes)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_entries(
        &self,
        employee_oid: &str,
        range: DateRange,
    ) -> StoreResult<Vec<TimesheetEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS}
             FROM timesheet_entries
             WHERE employee_oid = $1
               AND ($2::date IS NULL OR work_date >= $2)
               AND ($3::date IS NULL OR work_date <= $3)
             ORDER BY work_date, start_time, created_at"
        ))
        .bind(employee_oid)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TimesheetEntry::try_from).collect()
    }
}
