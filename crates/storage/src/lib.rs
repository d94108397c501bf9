use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::info;

use shared::domain::{CompletionId, CompletionRecord, Employee, EmployeeId, EmployeeStatus};

/// Owned roster of employees plus the audit trail of finished briefings.
///
/// Callers only ever receive clones; the roster itself is never handed out.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Employee>>;
    async fn get(&self, id: &EmployeeId) -> Result<Option<Employee>>;
    /// Marks the matching employee completed at `at` and records the completion.
    /// Returns `None` without touching anything when `id` is unknown.
    async fn mark_completed(
        &self,
        id: &EmployeeId,
        topic: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<CompletionRecord>>;
    async fn completions(&self) -> Result<Vec<CompletionRecord>>;
}

#[derive(Default)]
struct RosterState {
    employees: Vec<Employee>,
    completions: Vec<CompletionRecord>,
}

#[derive(Clone)]
pub struct InMemoryRoster {
    inner: Arc<RwLock<RosterState>>,
}

impl InMemoryRoster {
    pub fn new(employees: Vec<Employee>) -> Result<Self> {
        for (index, employee) in employees.iter().enumerate() {
            if employees[..index].iter().any(|e| e.id == employee.id) {
                bail!("duplicate employee id '{}' in roster", employee.id);
            }
        }
        Ok(Self {
            inner: Arc::new(RwLock::new(RosterState {
                employees,
                completions: Vec::new(),
            })),
        })
    }

    pub fn seeded() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RosterState {
                employees: seed_roster(),
                completions: Vec::new(),
            })),
        }
    }
}

#[async_trait]
impl RosterStore for InMemoryRoster {
    async fn list(&self) -> Result<Vec<Employee>> {
        Ok(self.inner.read().await.employees.clone())
    }

    async fn get(&self, id: &EmployeeId) -> Result<Option<Employee>> {
        Ok(self
            .inner
            .read()
            .await
            .employees
            .iter()
            .find(|e| &e.id == id)
            .cloned())
    }

    async fn mark_completed(
        &self,
        id: &EmployeeId,
        topic: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<CompletionRecord>> {
        let mut state = self.inner.write().await;
        let Some(employee) = state.employees.iter_mut().find(|e| &e.id == id) else {
            return Ok(None);
        };
        employee.status = EmployeeStatus::Completed;
        employee.last_training_at = Some(at);

        let record = CompletionRecord {
            id: CompletionId::generate(),
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            topic: topic.to_string(),
            completed_at: at,
            signature_hash: signature_hash(&employee.id, topic, at),
        };
        state.completions.push(record.clone());
        info!(employee_id = %id, %topic, "briefing completion recorded");
        Ok(Some(record))
    }

    async fn completions(&self) -> Result<Vec<CompletionRecord>> {
        Ok(self.inner.read().await.completions.clone())
    }
}

/// Hex SHA-256 over employee id, topic and RFC 3339 completion time.
pub fn signature_hash(id: &EmployeeId, topic: &str, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(topic.as_bytes());
    hasher.update([0u8]);
    hasher.update(at.to_rfc3339().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn seed_roster() -> Vec<Employee> {
    vec![
        seed_employee(
            "1",
            "Max Mustermann",
            "Lagerist",
            "Logistik",
            EmployeeStatus::Open,
            None,
            (2024, 10, 30),
        ),
        seed_employee(
            "2",
            "Lisa Müller",
            "Maschinenführerin",
            "Produktion",
            EmployeeStatus::Completed,
            Some((2024, 5, 12)),
            (2025, 5, 12),
        ),
        seed_employee(
            "3",
            "Klaus Schmidt",
            "Vorarbeiter",
            "Bau",
            EmployeeStatus::Expired,
            Some((2023, 1, 1)),
            (2024, 1, 1),
        ),
    ]
}

fn seed_employee(
    id: &str,
    name: &str,
    role: &str,
    department: &str,
    status: EmployeeStatus,
    last_training: Option<(i32, u32, u32)>,
    due: (i32, u32, u32),
) -> Employee {
    Employee {
        id: EmployeeId::new(id),
        name: name.into(),
        role: role.into(),
        department: department.into(),
        status,
        last_training_at: last_training
            .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc()),
        due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
