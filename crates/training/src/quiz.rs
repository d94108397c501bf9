use shared::{domain::QuizQuestion, protocol::QuestionMark};

use crate::FlowError;

/// True iff every answer matches the correct option of its question.
pub fn grade(answers: &[Option<usize>], questions: &[QuizQuestion]) -> bool {
    answers.len() == questions.len()
        && answers
            .iter()
            .zip(questions)
            .all(|(answer, question)| *answer == Some(question.correct_index))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttempt {
    answers: Vec<Option<usize>>,
    submitted: bool,
    passed: bool,
}

impl QuizAttempt {
    pub fn new(question_count: usize) -> Self {
        Self {
            answers: vec![None; question_count],
            submitted: false,
            passed: false,
        }
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn unanswered(&self) -> usize {
        self.answers.iter().filter(|a| a.is_none()).count()
    }

    pub fn all_answered(&self) -> bool {
        self.unanswered() == 0
    }

    /// Records a selection. Returns `Ok(false)` when the attempt is already
    /// passed and the answers are frozen.
    pub fn select(
        &mut self,
        questions: &[QuizQuestion],
        question: usize,
        option: usize,
    ) -> Result<bool, FlowError> {
        if self.passed {
            return Ok(false);
        }
        let valid = questions
            .get(question)
            .is_some_and(|q| option < q.options.len())
            && question < self.answers.len();
        if !valid {
            return Err(FlowError::InvalidAnswer { question, option });
        }
        self.answers[question] = Some(option);
        self.submitted = false;
        Ok(true)
    }

    pub fn check(&mut self, questions: &[QuizQuestion]) -> Result<bool, FlowError> {
        if self.passed {
            return Ok(true);
        }
        let unanswered = self.unanswered();
        if unanswered > 0 {
            return Err(FlowError::QuizIncomplete { unanswered });
        }
        self.submitted = true;
        self.passed = grade(&self.answers, questions);
        Ok(self.passed)
    }

    pub fn marks(&self, questions: &[QuizQuestion]) -> Vec<QuestionMark> {
        questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| match (self.submitted, answer) {
                (_, None) => QuestionMark::Unanswered,
                (false, Some(_)) => QuestionMark::Selected,
                (true, Some(selected)) if *selected == question.correct_index => {
                    QuestionMark::Correct
                }
                (true, Some(_)) => QuestionMark::Wrong,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/quiz_tests.rs"]
mod tests;
