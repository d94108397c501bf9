use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CompletionRecord, Employee, EmployeeId, EmployeeStatus, SafetyContent, SessionToken,
};

/// Entry in the "pick an employee" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    pub department: String,
    pub status: EmployeeStatus,
    pub training_due: bool,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id.clone(),
            name: employee.name.clone(),
            role: employee.role.clone(),
            department: employee.department.clone(),
            status: employee.status,
            training_due: employee.status == EmployeeStatus::Open,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub employee_id: EmployeeId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectAnswerRequest {
    pub question: usize,
    pub option: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub confirmed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStepKind {
    Welcome,
    Learning,
    Quiz,
    Confirm,
    Certificate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    Back,
    Start,
    Proceed,
    SelectAnswer,
    CheckAnswers,
    SetConfirmed,
    Complete,
    PrintCertificate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionMark {
    Unanswered,
    Selected,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
    pub mark: QuestionMark,
    /// Revealed once the answers have been checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizView {
    pub questions: Vec<QuestionView>,
    pub submitted: bool,
    pub passed: bool,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSummary {
    pub document_id: String,
    pub completed_at: DateTime<Utc>,
    pub valid_until: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowView {
    pub session: SessionToken,
    pub employee: Employee,
    pub step: FlowStepKind,
    pub quiz_enabled: bool,
    pub greeting: String,
    pub loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<SafetyContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizView>,
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateSummary>,
    pub actions: Vec<FlowAction>,
}

impl FlowView {
    pub fn allows(&self, action: FlowAction) -> bool {
        self.actions.contains(&action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub employee_id: EmployeeId,
    pub name: String,
    pub role: String,
    pub department: String,
    pub status: EmployeeStatus,
    pub label: String,
    pub tone: StatusTone,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub organization: String,
    pub total: usize,
    pub completion_rate: u32,
    pub open_count: usize,
    pub overdue_count: usize,
    pub rows: Vec<DashboardRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionList {
    pub records: Vec<CompletionRecord>,
}
