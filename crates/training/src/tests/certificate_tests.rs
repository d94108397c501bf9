use super::*;
use briefing::fallback_content;
use shared::domain::EmployeeStatus;

fn employee() -> Employee {
    Employee {
        id: EmployeeId::new("1"),
        name: "Max Mustermann".into(),
        role: "Lagerist".into(),
        department: "Logistik".into(),
        status: EmployeeStatus::Open,
        last_training_at: None,
        due_date: NaiveDate::from_ymd_opt(2024, 10, 30).expect("date"),
    }
}

fn completed_at() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-10-01T09:30:00Z")
        .expect("time")
        .with_timezone(&Utc)
}

fn certificate() -> Certificate {
    Certificate::issue(&employee(), &fallback_content(), completed_at(), true)
}

#[test]
fn validity_is_one_year_after_completion() {
    let cert = certificate();
    assert_eq!(
        cert.valid_until,
        NaiveDate::from_ymd_opt(2025, 10, 1).expect("date")
    );
    assert_eq!(cert.summary().valid_until, "1.10.2025");
}

#[test]
fn leap_day_validity_clamps_to_month_end() {
    let leap = DateTime::parse_from_rfc3339("2024-02-29T12:00:00Z")
        .expect("time")
        .with_timezone(&Utc);
    assert_eq!(
        valid_until(leap),
        NaiveDate::from_ymd_opt(2025, 2, 28).expect("date")
    );
}

#[test]
fn document_id_is_nine_uppercase_alphanumerics() {
    let cert = certificate();
    assert_eq!(cert.document_id.len(), 9);
    assert!(cert
        .document_id
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert_ne!(cert.document_id, certificate().document_id);
}

#[test]
fn block_lists_employee_content_and_dates() {
    let block = certificate().certificate_block();
    assert!(block.contains("<h2>Max Mustermann</h2>"));
    assert!(block.contains("Lagerist | Logistik"));
    assert!(block.contains("Allgemeine Arbeitssicherheit"));
    assert!(block.contains("<dd>1.10.2024</dd>"));
    assert!(block.contains("<dd>1.10.2025</dd>"));
    assert!(block.contains("Digitally Signed: 1"));
    assert!(block.contains("Wissens-Check erfolgreich bestanden"));

    let first = block.find("Trage immer").expect("first rule");
    let second = block.find("Halte Fluchtwege").expect("second rule");
    let third = block.find("Melde Besch").expect("third rule");
    assert!(first < second && second < third);
}

#[test]
fn screen_and_export_embed_identical_certificate() {
    let cert = certificate();
    let block = cert.certificate_block();
    let screen = cert.render_html(Surface::Screen);
    let export = cert.render_html(Surface::Export);

    assert!(screen.contains(&block));
    assert!(export.contains(&block));
    assert!(screen.contains("PDF Speichern"));
    assert!(!export.contains("PDF Speichern"));
    assert!(!export.contains("<button"));
    assert!(!export.contains("Zurück zur Übersicht"));
}

#[test]
fn generated_text_is_escaped() {
    let mut content = fallback_content();
    content.title = "<script>alert(1)</script>".into();
    let cert = Certificate::issue(&employee(), &content, completed_at(), false);
    let block = cert.certificate_block();
    assert!(block.contains("&lt;script&gt;"));
    assert!(!block.contains("<script>"));
    assert!(!block.contains("Wissens-Check"));
}

#[test]
fn text_rendering_contains_signature_and_id() {
    let cert = certificate();
    let text = cert.render_text();
    assert!(text.contains("Max Mustermann"));
    assert!(text.contains("Gültig bis: 1.10.2025"));
    assert!(text.contains(&format!("Dokument-ID: {}", cert.document_id)));
}

#[test]
fn surface_defaults_to_screen() {
    assert_eq!(Surface::default(), Surface::Screen);
}
