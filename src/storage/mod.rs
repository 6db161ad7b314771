// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for employees and timesheet entries behind the
//! [`TimesheetStore`] trait.
//!
//! - [`PostgresStore`] is used when `DATABASE_URL` is set. Migrations in
//!   `migrations/` are applied at startup.
//! - [`InMemoryStore`] backs tests and local development without a database.
//!
//! ## Schema
//!
//! ```text
//! employees(object_id PK, first_name, last_name, email, created_at)
//! timesheet_entries(id PK, employee_oid, work_date, entry_type, project,
//!                   phase, start_time, end_time, hours, notes, created_at)
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DateRange, Employee, NewEmployee, NewTimesheetEntry, TimesheetEntry};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{PostgresConfig, PostgresStore};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("stored row is invalid: {0}")]
    InvalidRow(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of an employee upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub employee: Employee,
    /// `true` when no employee with this object id existed before.
    pub created: bool,
}

/// Persistence interface used by the API handlers.
#[async_trait]
pub trait TimesheetStore: Send + Sync {
    /// Insert the employee unless one with the same object id exists.
    /// Existing rows are returned unchanged.
    async fn upsert_employee(&self, employee: NewEmployee) -> StoreResult<UpsertOutcome>;

    async fn find_employee(&self, object_id: &str) -> StoreResult<Option<Employee>>;

    async fn create_entry(&self, entry: NewTimesheetEntry) -> StoreResult<TimesheetEntry>;

    /// Entries of one employee, ordered by date then start time.
    async fn list_entries(
        &self,
        employee_oid: &str,
        range: DateRange,
    ) -> StoreResult<Vec<TimesheetEntry>>;
}

/// `HH:MM` rendering used for stored start and end times.
pub(crate) fn format_time(time: chrono::NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
