//! Fixed-layout completion certificate.
//!
//! The certificate block is rendered once and embedded unchanged in both the
//! screen page and the export page; only the surrounding chrome differs.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Employee, EmployeeId, SafetyContent},
    protocol::CertificateSummary,
};
use uuid::Uuid;

const DOCUMENT_ID_LEN: usize = 9;
const DATE_FORMAT: &str = "%-d.%-m.%Y";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    #[default]
    Screen,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub document_id: String,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role: String,
    pub department: String,
    pub title: String,
    pub steps: Vec<String>,
    pub completed_at: DateTime<Utc>,
    pub valid_until: NaiveDate,
    pub quiz_passed: bool,
}

impl Certificate {
    pub fn issue(
        employee: &Employee,
        content: &SafetyContent,
        completed_at: DateTime<Utc>,
        quiz_passed: bool,
    ) -> Self {
        Self {
            document_id: new_document_id(),
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            role: employee.role.clone(),
            department: employee.department.clone(),
            title: content.title.clone(),
            steps: content.steps.clone(),
            completed_at,
            valid_until: valid_until(completed_at),
            quiz_passed,
        }
    }

    pub fn completion_date(&self) -> NaiveDate {
        self.completed_at.date_naive()
    }

    pub fn summary(&self) -> CertificateSummary {
        CertificateSummary {
            document_id: self.document_id.clone(),
            completed_at: self.completed_at,
            valid_until: self.valid_until.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn render_html(&self, surface: Surface) -> String {
        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n<meta charset=\"utf-8\">\n");
        page.push_str(&format!(
            "<title>Zertifikat {}</title>\n",
            escape_html(&self.employee_name)
        ));
        page.push_str(STYLE);
        page.push_str("</head>\n<body>\n");
        if surface == Surface::Screen {
            page.push_str(&self.screen_chrome());
        }
        page.push_str(&self.certificate_block());
        page.push_str("</body>\n</html>\n");
        page
    }

    /// The printable certificate itself, without any interactive elements.
    pub fn certificate_block(&self) -> String {
        let steps = if self.steps.is_empty() {
            "<li>Grundlagen der Arbeitssicherheit</li>\n".to_string()
        } else {
            self.steps
                .iter()
                .map(|step| format!("<li>{}</li>\n", escape_html(step)))
                .collect()
        };
        let quiz_line = if self.quiz_passed {
            "<p class=\"passed\">Wissens-Check erfolgreich bestanden</p>\n"
        } else {
            ""
        };

        format!(
            "<section id=\"certificate-area\">\n\
             <div class=\"frame\">\n\
             <header>\n<h1>Zertifikat</h1>\n<p>Sicherheitsunterweisung nach §12 ArbSchG</p>\n\
             <div class=\"brand\">SafetyFirst</div>\n</header>\n\
             <main>\n<p>Hiermit wird bestätigt, dass</p>\n<h2>{name}</h2>\n<p class=\"role\">{role} | {department}</p>\n\
             <div class=\"contents\">\n<h3>Unterweisungsinhalte</h3>\n<p class=\"title\">{title}</p>\n<ul>\n{steps}</ul>\n{quiz_line}</div>\n\
             <dl>\n<dt>Datum</dt><dd>{date}</dd>\n<dt>Status</dt><dd>Erfolgreich absolviert</dd>\n<dt>Gültig bis</dt><dd>{valid}</dd>\n</dl>\n\
             </main>\n\
             <footer>\n<div class=\"signature\">Digitally Signed: {employee_id}</div>\n\
             <div class=\"signature-label\">Unterschrift Mitarbeiter</div>\n\
             <div class=\"document-id\">Dokument-ID: {document_id}</div>\n</footer>\n\
             </div>\n</section>\n",
            name = escape_html(&self.employee_name),
            role = escape_html(&self.role),
            department = escape_html(&self.department),
            title = escape_html(&self.title),
            steps = steps,
            quiz_line = quiz_line,
            date = self.completion_date().format(DATE_FORMAT),
            valid = self.valid_until.format(DATE_FORMAT),
            employee_id = escape_html(self.employee_id.as_str()),
            document_id = escape_html(&self.document_id),
        )
    }

    fn screen_chrome(&self) -> String {
        let first_name = self
            .employee_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.employee_name);
        format!(
            "<div class=\"screen-only\">\n\
             <h2>Glückwunsch, {first}!</h2>\n\
             <p>Deine Unterweisung ist gültig bis {valid}.</p>\n\
             <div class=\"actions\">\n\
             <button type=\"button\" onclick=\"window.print()\">PDF Speichern</button>\n\
             <a href=\"/\">Zurück zur Übersicht</a>\n\
             </div>\n</div>\n",
            first = escape_html(first_name),
            valid = self.valid_until.format(DATE_FORMAT),
        )
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("ZERTIFIKAT\nSicherheitsunterweisung nach §12 ArbSchG\n\n");
        out.push_str("Hiermit wird bestätigt, dass\n");
        out.push_str(&format!("  {}\n", self.employee_name));
        out.push_str(&format!("  {} | {}\n\n", self.role, self.department));
        out.push_str(&format!("Unterweisungsinhalte: {}\n", self.title));
        for step in &self.steps {
            out.push_str(&format!("  - {step}\n"));
        }
        if self.quiz_passed {
            out.push_str("Wissens-Check erfolgreich bestanden\n");
        }
        out.push_str(&format!(
            "\nDatum: {}   Status: Erfolgreich absolviert   Gültig bis: {}\n",
            self.completion_date().format(DATE_FORMAT),
            self.valid_until.format(DATE_FORMAT)
        ));
        out.push_str(&format!("Digitally Signed: {}\n", self.employee_id));
        out.push_str(&format!("Dokument-ID: {}\n", self.document_id));
        out
    }
}

/// One year after the completion date.
pub fn valid_until(completed_at: DateTime<Utc>) -> NaiveDate {
    let date = completed_at.date_naive();
    date.checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX)
}

fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()[..DOCUMENT_ID_LEN].to_ascii_uppercase()
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const STYLE: &str = "<style>\n\
@page { size: A4; margin: 0; }\n\
body { font-family: sans-serif; margin: 0; }\n\
#certificate-area { width: 210mm; min-height: 297mm; box-sizing: border-box; padding: 12mm; margin: 0 auto; }\n\
#certificate-area .frame { border: 4px solid #0f172a; min-height: 270mm; padding: 10mm; box-sizing: border-box; }\n\
#certificate-area .brand { float: right; color: #cbd5e1; font-weight: bold; }\n\
#certificate-area .document-id { color: #cbd5e1; font-size: 0.75rem; text-align: right; }\n\
@media print { .screen-only { display: none; } }\n\
</style>\n";

#[cfg(test)]
#[path = "tests/certificate_tests.rs"]
mod tests;
