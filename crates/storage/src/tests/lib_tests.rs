use super::*;

#[tokio::test]
async fn seeded_roster_lists_three_employees() {
    let roster = InMemoryRoster::seeded();
    let employees = roster.list().await.expect("list");
    assert_eq!(employees.len(), 3);
    assert_eq!(employees[0].name, "Max Mustermann");
    assert_eq!(employees[0].status, EmployeeStatus::Open);
    assert!(employees[0].last_training_at.is_none());
    assert_eq!(employees[2].status, EmployeeStatus::Expired);
}

#[tokio::test]
async fn get_finds_by_id() {
    let roster = InMemoryRoster::seeded();
    let lisa = roster
        .get(&EmployeeId::new("2"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(lisa.role, "Maschinenführerin");
    assert!(roster
        .get(&EmployeeId::new("99"))
        .await
        .expect("get")
        .is_none());
}

#[tokio::test]
async fn mark_completed_only_touches_matching_record() {
    let roster = InMemoryRoster::seeded();
    let before = roster.list().await.expect("list");
    let at = Utc::now();

    let record = roster
        .mark_completed(&EmployeeId::new("1"), "Allgemeine Arbeitssicherheit", at)
        .await
        .expect("mark")
        .expect("record");
    assert_eq!(record.employee_name, "Max Mustermann");
    assert_eq!(record.completed_at, at);

    let after = roster.list().await.expect("list");
    assert_eq!(after[0].status, EmployeeStatus::Completed);
    assert_eq!(after[0].last_training_at, Some(at));
    assert_eq!(after[0].name, before[0].name);
    assert_eq!(after[0].due_date, before[0].due_date);
    assert_eq!(after[1..], before[1..]);
}

#[tokio::test]
async fn mark_completed_with_unknown_id_changes_nothing() {
    let roster = InMemoryRoster::seeded();
    let before = roster.list().await.expect("list");
    let outcome = roster
        .mark_completed(&EmployeeId::new("42"), "Topic", Utc::now())
        .await
        .expect("mark");
    assert!(outcome.is_none());
    assert_eq!(roster.list().await.expect("list"), before);
    assert!(roster.completions().await.expect("completions").is_empty());
}

#[tokio::test]
async fn completions_accumulate_audit_records() {
    let roster = InMemoryRoster::seeded();
    let first = Utc::now();
    roster
        .mark_completed(&EmployeeId::new("1"), "A", first)
        .await
        .expect("mark");
    roster
        .mark_completed(&EmployeeId::new("3"), "B", first)
        .await
        .expect("mark");
    let records = roster.completions().await.expect("completions");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].employee_id, EmployeeId::new("3"));
    assert_ne!(records[0].id, records[1].id);
}

#[test]
fn signature_hash_is_stable_hex() {
    let at = DateTime::parse_from_rfc3339("2024-10-01T08:00:00Z")
        .expect("time")
        .with_timezone(&Utc);
    let a = signature_hash(&EmployeeId::new("1"), "Topic", at);
    let b = signature_hash(&EmployeeId::new("1"), "Topic", at);
    let c = signature_hash(&EmployeeId::new("2"), "Topic", at);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut employees = seed_roster();
    employees.push(employees[0].clone());
    assert!(InMemoryRoster::new(employees).is_err());
}
