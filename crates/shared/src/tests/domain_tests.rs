use super::*;

#[test]
fn status_uses_uppercase_wire_names() {
    let json = serde_json::to_string(&EmployeeStatus::Completed).expect("json");
    assert_eq!(json, "\"COMPLETED\"");
    let parsed: EmployeeStatus = serde_json::from_str("\"EXPIRED\"").expect("parse");
    assert_eq!(parsed, EmployeeStatus::Expired);
}

#[test]
fn quiz_question_reads_camel_case_correct_index() {
    let parsed: QuizQuestion = serde_json::from_str(
        r#"{"question":"Q?","options":["a","b","c"],"correctIndex":2}"#,
    )
    .expect("parse");
    assert_eq!(parsed.correct_index, 2);
}

#[test]
fn content_without_quiz_field_parses_with_empty_quiz() {
    let parsed: SafetyContent = serde_json::from_str(
        r#"{"title":"T","intro":"I","steps":["s"],"duration":"45 Sekunden"}"#,
    )
    .expect("parse");
    assert!(parsed.quiz.is_empty());
}

#[test]
fn first_name_is_first_word() {
    let employee = Employee {
        id: EmployeeId::new("1"),
        name: "Max Mustermann".into(),
        role: "Lagerist".into(),
        department: "Logistik".into(),
        status: EmployeeStatus::Open,
        last_training_at: None,
        due_date: NaiveDate::from_ymd_opt(2024, 10, 30).expect("date"),
    };
    assert_eq!(employee.first_name(), "Max");
}
