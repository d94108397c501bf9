//! Plain-text screens for the terminal.

use std::fmt::Write;

use shared::{
    domain::SafetyContent,
    protocol::{DashboardSummary, EmployeeSummary, QuestionMark, QuizView},
};

pub fn roster(employees: &[EmployeeSummary]) -> String {
    let mut out = String::from("Wer bist du?\n");
    for employee in employees {
        let due = if employee.training_due {
            "  [Unterweisung fällig]"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:>3}  {} ({}){due}",
            employee.id, employee.name, employee.role
        );
    }
    out
}

pub fn dashboard(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} | Unterweisungs-Cockpit", summary.organization);
    let _ = writeln!(
        out,
        "Erfüllungsquote {}%   Offen {}   Überfällig {}\n",
        summary.completion_rate, summary.open_count, summary.overdue_count
    );
    for row in &summary.rows {
        let _ = writeln!(
            out,
            "  {:<18} {:<20} {:<12} {:<11} fällig {}",
            row.name, row.role, row.department, row.label, row.due_date
        );
    }
    out
}

pub fn content(content: &SafetyContent) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({})", content.title, content.duration);
    let _ = writeln!(out, "{}\n", content.intro);
    for (index, step) in content.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {step}", index + 1);
    }
    out
}

pub fn quiz_question(quiz: &QuizView, index: usize) -> String {
    let mut out = String::new();
    let Some(question) = quiz.questions.get(index) else {
        return out;
    };
    let _ = writeln!(out, "\nFrage {} von {}: {}", index + 1, quiz.questions.len(), question.question);
    for (option, text) in question.options.iter().enumerate() {
        let _ = writeln!(out, "  {}) {text}", option + 1);
    }
    out
}

/// Result lines after checking, one per question.
pub fn quiz_marks(quiz: &QuizView) -> String {
    let mut out = String::new();
    for (index, question) in quiz.questions.iter().enumerate() {
        let line = match question.mark {
            QuestionMark::Correct => "richtig".to_string(),
            QuestionMark::Wrong => question
                .retry_prompt
                .clone()
                .unwrap_or_else(|| "falsch".to_string()),
            QuestionMark::Selected | QuestionMark::Unanswered => "offen".to_string(),
        };
        let _ = writeln!(out, "  Frage {}: {line}", index + 1);
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
