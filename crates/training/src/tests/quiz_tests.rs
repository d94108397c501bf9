use super::*;
use briefing::fallback_content;

fn questions() -> Vec<QuizQuestion> {
    fallback_content().quiz
}

#[test]
fn grade_requires_every_answer_to_match() {
    let quiz = questions();
    assert!(grade(&[Some(0), Some(1), Some(2)], &quiz));
    assert!(!grade(&[Some(0), Some(1), Some(1)], &quiz));
    assert!(!grade(&[Some(0), None, Some(2)], &quiz));
}

#[test]
fn grade_rejects_length_mismatch() {
    let quiz = questions();
    assert!(!grade(&[Some(0), Some(1)], &quiz));
}

#[test]
fn grade_matches_definition_for_every_answer_combination() {
    let quiz = questions();
    let choices = [None, Some(0), Some(1), Some(2)];
    for a in choices {
        for b in choices {
            for c in choices {
                let answers = [a, b, c];
                let expected = answers
                    .iter()
                    .zip(&quiz)
                    .all(|(answer, q)| *answer == Some(q.correct_index));
                assert_eq!(grade(&answers, &quiz), expected, "answers {answers:?}");
            }
        }
    }
}

#[test]
fn check_needs_all_answers() {
    let quiz = questions();
    let mut attempt = QuizAttempt::new(quiz.len());
    attempt.select(&quiz, 0, 0).expect("select");
    let err = attempt.check(&quiz).expect_err("incomplete");
    assert_eq!(err, FlowError::QuizIncomplete { unanswered: 2 });
    assert!(!attempt.submitted());
}

#[test]
fn changing_an_answer_after_failed_check_clears_submitted() {
    let quiz = questions();
    let mut attempt = QuizAttempt::new(quiz.len());
    for (q, option) in [(0, 0), (1, 0), (2, 2)] {
        attempt.select(&quiz, q, option).expect("select");
    }
    assert!(!attempt.check(&quiz).expect("check"));
    assert!(attempt.submitted());

    assert!(attempt.select(&quiz, 1, 1).expect("select"));
    assert!(!attempt.submitted());
    assert!(!attempt.passed());
}

#[test]
fn passed_attempt_freezes_answers() {
    let quiz = questions();
    let mut attempt = QuizAttempt::new(quiz.len());
    for (q, option) in [(0, 0), (1, 1), (2, 2)] {
        attempt.select(&quiz, q, option).expect("select");
    }
    assert!(attempt.check(&quiz).expect("check"));

    assert!(!attempt.select(&quiz, 0, 2).expect("no-op"));
    assert_eq!(attempt.answers(), &[Some(0), Some(1), Some(2)]);
    assert!(attempt.passed());
    assert!(attempt.submitted());
}

#[test]
fn out_of_range_selection_is_rejected() {
    let quiz = questions();
    let mut attempt = QuizAttempt::new(quiz.len());
    assert_eq!(
        attempt.select(&quiz, 3, 0),
        Err(FlowError::InvalidAnswer {
            question: 3,
            option: 0
        })
    );
    assert_eq!(
        attempt.select(&quiz, 0, 3),
        Err(FlowError::InvalidAnswer {
            question: 0,
            option: 3
        })
    );
}

#[test]
fn marks_follow_submission_state() {
    let quiz = questions();
    let mut attempt = QuizAttempt::new(quiz.len());
    attempt.select(&quiz, 0, 0).expect("select");
    assert_eq!(
        attempt.marks(&quiz),
        vec![
            QuestionMark::Selected,
            QuestionMark::Unanswered,
            QuestionMark::Unanswered
        ]
    );

    attempt.select(&quiz, 1, 2).expect("select");
    attempt.select(&quiz, 2, 2).expect("select");
    attempt.check(&quiz).expect("check");
    assert_eq!(
        attempt.marks(&quiz),
        vec![
            QuestionMark::Correct,
            QuestionMark::Wrong,
            QuestionMark::Correct
        ]
    );
}
