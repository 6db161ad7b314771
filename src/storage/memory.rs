// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for tests and local development.
//!
//! Data is lost on restart. Selected automatically when no `DATABASE_URL`
//! is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{format_time, StoreResult, TimesheetStore, UpsertOutcome};
use crate::models::{DateRange, Employee, NewEmployee, NewTimesheetEntry, TimesheetEntry};

#[derive(Default)]
struct Tables {
    employees: HashMap<String, Employee>,
    entries: HashMap<Uuid, TimesheetEntry>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimesheetStore for InMemoryStore {
    async fn upsert_employee(&self, employee: NewEmployee) -> StoreResult<UpsertOutcome> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.employees.get(&employee.object_id) {
            return Ok(UpsertOutcome {
                employee: existing.clone(),
                created: false,
            });
        }

        let created = Employee {
            object_id: employee.object_id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            created_at: Utc::now(),
        };
        tables
            .employees
            .insert(created.object_id.clone(), created.clone());
        Ok(UpsertOutcome {
            employee: created,
            created: true,
        })
    }

    async fn find_employee(&self, object_id: &str) -> StoreResult<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(object_id).cloned())
    }

    async fn create_entry(&self, entry: NewTimesheetEntry) -> StoreResult<TimesheetEntry> {
        let stored = TimesheetEntry {
            id: Uuid::new_v4(),
            employee_oid: entry.employee_oid,
            date: entry.date,
            entry_type: entry.entry_type,
            project: entry.project,
            phase: entry.phase,
            start_time: format_time(entry.start_time),
            end_time: format_time(entry.end_time),
            hours: entry.hours,
            notes: entry.notes,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .entries
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_entries(
        &self,
        employee_oid: &str,
        range: DateRange,
    ) -> StoreResult<Vec<TimesheetEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<TimesheetEntry> = tables
            .entries
            .values()
            .filter(|entry| entry.employee_oid == employee_oid && range.contains(entry.date))
            .cloned()
            .collect();
        // "HH:MM" strings sort chronologically.
        entries.sort_by(|a, b| {
            (a.date, &a.start_time, a.created_at).cmp(&(b.date, &b.start_time, b.created_at))
        });
        Ok(entries)
    }
}
