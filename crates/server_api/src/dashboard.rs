//! Employer overview derived from a roster snapshot. Nothing here is cached.

use shared::{
    domain::{Employee, EmployeeStatus},
    protocol::{DashboardRow, DashboardSummary, StatusTone},
};

const DUE_DATE_FORMAT: &str = "%-d.%-m.%Y";

/// Rounded percentage of completed employees; an empty roster reports 0.
pub fn completion_rate(employees: &[Employee]) -> u32 {
    if employees.is_empty() {
        return 0;
    }
    let completed = count_status(employees, EmployeeStatus::Completed);
    let rate = (completed as f64 / employees.len() as f64 * 100.0).round();
    rate as u32
}

pub fn count_status(employees: &[Employee], status: EmployeeStatus) -> usize {
    employees.iter().filter(|e| e.status == status).count()
}

pub fn status_label(status: EmployeeStatus) -> &'static str {
    match status {
        EmployeeStatus::Completed => "Erledigt",
        EmployeeStatus::Expired => "Überfällig",
        EmployeeStatus::Open => "Offen",
    }
}

pub fn status_tone(status: EmployeeStatus) -> StatusTone {
    match status {
        EmployeeStatus::Completed => StatusTone::Success,
        EmployeeStatus::Expired => StatusTone::Danger,
        EmployeeStatus::Open => StatusTone::Warning,
    }
}

pub fn summarize(employees: &[Employee], organization: &str) -> DashboardSummary {
    DashboardSummary {
        organization: organization.to_string(),
        total: employees.len(),
        completion_rate: completion_rate(employees),
        open_count: count_status(employees, EmployeeStatus::Open),
        overdue_count: count_status(employees, EmployeeStatus::Expired),
        rows: employees.iter().map(row).collect(),
    }
}

fn row(employee: &Employee) -> DashboardRow {
    DashboardRow {
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        role: employee.role.clone(),
        department: employee.department.clone(),
        status: employee.status,
        label: status_label(employee.status).to_string(),
        tone: status_tone(employee.status),
        due_date: employee.due_date.format(DUE_DATE_FORMAT).to_string(),
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
