use briefing::{fallback_content, validate_content, ContentError};
use chrono::{DateTime, Utc};
use shared::{
    domain::{Employee, EmployeeId, SafetyContent, SessionToken},
    protocol::{FlowAction, FlowStepKind, FlowView, QuestionMark, QuestionView, QuizView},
};
use tracing::{debug, warn};

use crate::{certificate::Certificate, quiz::QuizAttempt, FlowError};

const RETRY_PROMPT: &str = "Leider falsch. Bitte noch einmal versuchen.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    pub quiz_enabled: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self { quiz_enabled: true }
    }
}

/// Identifies the session a content fetch was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTicket {
    pub session: SessionToken,
    pub employee_id: EmployeeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub ticket: ContentTicket,
    pub role: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub topic: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied { fallback: bool },
    Discarded,
}

#[derive(Debug, Clone)]
struct LoadedContent {
    content: SafetyContent,
    attempt: QuizAttempt,
    fallback: bool,
}

#[derive(Debug, Clone)]
struct LearningStep {
    pending: Option<ContentTicket>,
    loaded: Option<LoadedContent>,
}

#[derive(Debug, Clone)]
struct QuizStep {
    content: SafetyContent,
    attempt: QuizAttempt,
}

#[derive(Debug, Clone)]
struct ConfirmStep {
    content: SafetyContent,
    quiz_passed: bool,
    confirmed: bool,
}

#[derive(Debug, Clone)]
struct CertificateStep {
    content: SafetyContent,
    certificate: Certificate,
}

#[derive(Debug, Clone)]
enum Step {
    Welcome,
    Learning(LearningStep),
    Quiz(QuizStep),
    Confirm(ConfirmStep),
    Certificate(CertificateStep),
}

impl Step {
    fn kind(&self) -> FlowStepKind {
        match self {
            Step::Welcome => FlowStepKind::Welcome,
            Step::Learning(_) => FlowStepKind::Learning,
            Step::Quiz(_) => FlowStepKind::Quiz,
            Step::Confirm(_) => FlowStepKind::Confirm,
            Step::Certificate(_) => FlowStepKind::Certificate,
        }
    }

    fn content(&self) -> Option<&SafetyContent> {
        match self {
            Step::Welcome => None,
            Step::Learning(learning) => learning.loaded.as_ref().map(|l| &l.content),
            Step::Quiz(quiz) => Some(&quiz.content),
            Step::Confirm(confirm) => Some(&confirm.content),
            Step::Certificate(done) => Some(&done.content),
        }
    }
}

/// One employee's walk through the briefing.
///
/// The flow owns a snapshot of the employee and never touches the roster; the
/// side effects it needs (content fetch, completion) are handed back to the
/// caller as [`ContentRequest`] and [`CompletionRequest`].
#[derive(Debug, Clone)]
pub struct TrainingFlow {
    token: SessionToken,
    employee: Employee,
    config: FlowConfig,
    step: Step,
}

impl TrainingFlow {
    pub fn new(employee: Employee, config: FlowConfig) -> Self {
        Self {
            token: SessionToken::generate(),
            employee,
            config,
            step: Step::Welcome,
        }
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn employee(&self) -> &Employee {
        &self.employee
    }

    pub fn config(&self) -> FlowConfig {
        self.config
    }

    pub fn step(&self) -> FlowStepKind {
        self.step.kind()
    }

    pub fn content(&self) -> Option<&SafetyContent> {
        self.step.content()
    }

    pub fn is_loading(&self) -> bool {
        matches!(&self.step, Step::Learning(learning) if learning.loaded.is_none())
    }

    /// Whether the loaded content is the static fallback. Only known while learning.
    pub fn uses_fallback(&self) -> Option<bool> {
        match &self.step {
            Step::Learning(LearningStep {
                loaded: Some(loaded),
                ..
            }) => Some(loaded.fallback),
            _ => None,
        }
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        match &self.step {
            Step::Certificate(done) => Some(&done.certificate),
            _ => None,
        }
    }

    /// Replaces the employee snapshot with a fresher copy of the same record.
    pub fn refresh_employee(&mut self, employee: Employee) {
        if employee.id == self.employee.id {
            self.employee = employee;
        }
    }

    pub fn start(&mut self) -> Result<ContentRequest, FlowError> {
        if !matches!(self.step, Step::Welcome) {
            return Err(self.unavailable(FlowAction::Start));
        }
        let ticket = ContentTicket {
            session: self.token.clone(),
            employee_id: self.employee.id.clone(),
        };
        self.step = Step::Learning(LearningStep {
            pending: Some(ticket.clone()),
            loaded: None,
        });
        Ok(ContentRequest {
            ticket,
            role: self.employee.role.clone(),
            department: self.employee.department.clone(),
        })
    }

    /// Applies the outcome of a content fetch. Failures and invalid content are
    /// replaced by the fallback briefing. Results for another session, or
    /// arriving after the flow left the loading state, are discarded.
    pub fn deliver_content(
        &mut self,
        ticket: &ContentTicket,
        result: Result<SafetyContent, ContentError>,
    ) -> Delivery {
        let Step::Learning(learning) = &mut self.step else {
            debug!(session = %ticket.session, "discarding content for a flow that moved on");
            return Delivery::Discarded;
        };
        if learning.pending.as_ref() != Some(ticket) {
            debug!(session = %ticket.session, "discarding content for a stale ticket");
            return Delivery::Discarded;
        }

        let (content, fallback) = match result.and_then(|c| validate_content(&c).map(|()| c)) {
            Ok(content) => (content, false),
            Err(error) => {
                warn!(
                    employee_id = %self.employee.id,
                    role = %self.employee.role,
                    %error,
                    "briefing generation failed, using fallback content"
                );
                (fallback_content(), true)
            }
        };

        learning.pending = None;
        learning.loaded = Some(LoadedContent {
            attempt: QuizAttempt::new(content.quiz.len()),
            content,
            fallback,
        });
        Delivery::Applied { fallback }
    }

    /// Moves on from learning (to the quiz, or straight to confirmation when the
    /// quiz is disabled) and from a passed quiz to confirmation.
    pub fn proceed(&mut self) -> Result<(), FlowError> {
        let quiz_enabled = self.config.quiz_enabled;
        let step = std::mem::replace(&mut self.step, Step::Welcome);
        let (next, outcome) = match step {
            Step::Learning(LearningStep {
                loaded: Some(loaded),
                ..
            }) => {
                let next = if quiz_enabled {
                    Step::Quiz(QuizStep {
                        content: loaded.content,
                        attempt: loaded.attempt,
                    })
                } else {
                    Step::Confirm(ConfirmStep {
                        content: loaded.content,
                        quiz_passed: false,
                        confirmed: false,
                    })
                };
                (next, Ok(()))
            }
            learning @ Step::Learning(_) => (learning, Err(FlowError::ContentLoading)),
            Step::Quiz(quiz) if quiz.attempt.passed() => (
                Step::Confirm(ConfirmStep {
                    content: quiz.content,
                    quiz_passed: true,
                    confirmed: false,
                }),
                Ok(()),
            ),
            quiz @ Step::Quiz(_) => (quiz, Err(FlowError::QuizNotPassed)),
            other => {
                let step = other.kind();
                (
                    other,
                    Err(FlowError::ActionUnavailable {
                        action: FlowAction::Proceed,
                        step,
                    }),
                )
            }
        };
        self.step = next;
        outcome
    }

    /// Returns whether the selection was recorded; `false` once the quiz is passed.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<bool, FlowError> {
        match &mut self.step {
            Step::Quiz(quiz) => quiz.attempt.select(&quiz.content.quiz, question, option),
            _ => Err(self.unavailable(FlowAction::SelectAnswer)),
        }
    }

    pub fn check_answers(&mut self) -> Result<bool, FlowError> {
        match &mut self.step {
            Step::Quiz(quiz) => quiz.attempt.check(&quiz.content.quiz),
            _ => Err(self.unavailable(FlowAction::CheckAnswers)),
        }
    }

    pub fn set_confirmed(&mut self, confirmed: bool) -> Result<(), FlowError> {
        match &mut self.step {
            Step::Confirm(confirm) => {
                confirm.confirmed = confirmed;
                Ok(())
            }
            _ => Err(self.unavailable(FlowAction::SetConfirmed)),
        }
    }

    /// Finishes the briefing. The returned request must be applied to the
    /// roster by the caller; the flow is in the certificate step either way.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<CompletionRequest, FlowError> {
        let confirm = match &self.step {
            Step::Confirm(confirm) if confirm.confirmed => confirm.clone(),
            Step::Confirm(_) => return Err(FlowError::NotConfirmed),
            _ => return Err(self.unavailable(FlowAction::Complete)),
        };

        let certificate =
            Certificate::issue(&self.employee, &confirm.content, now, confirm.quiz_passed);
        let request = CompletionRequest {
            employee_id: self.employee.id.clone(),
            employee_name: self.employee.name.clone(),
            topic: confirm.content.title.clone(),
            completed_at: now,
        };
        self.step = Step::Certificate(CertificateStep {
            content: confirm.content,
            certificate,
        });
        Ok(request)
    }

    /// Leaving is only offered on the welcome and certificate screens.
    pub fn back(&self) -> Result<(), FlowError> {
        match self.step {
            Step::Welcome | Step::Certificate(_) => Ok(()),
            _ => Err(self.unavailable(FlowAction::Back)),
        }
    }

    pub fn view(&self) -> FlowView {
        let step = self.step.kind();
        let greeting = match step {
            FlowStepKind::Certificate => format!("Glückwunsch, {}!", self.employee.first_name()),
            _ => format!("Moin, {}!", self.employee.first_name()),
        };

        let (quiz, confirmed) = match &self.step {
            Step::Quiz(quiz) => (Some(quiz_view(quiz)), false),
            Step::Confirm(confirm) => (None, confirm.confirmed),
            _ => (None, false),
        };

        FlowView {
            session: self.token.clone(),
            employee: self.employee.clone(),
            step,
            quiz_enabled: self.config.quiz_enabled,
            greeting,
            loading: self.is_loading(),
            content: self.step.content().cloned(),
            quiz,
            confirmed,
            certificate: self.certificate().map(Certificate::summary),
            actions: self.actions(),
        }
    }

    fn actions(&self) -> Vec<FlowAction> {
        match &self.step {
            Step::Welcome => vec![FlowAction::Back, FlowAction::Start],
            Step::Learning(learning) if learning.loaded.is_none() => Vec::new(),
            Step::Learning(_) => vec![FlowAction::Proceed],
            Step::Quiz(quiz) if quiz.attempt.passed() => vec![FlowAction::Proceed],
            Step::Quiz(quiz) if quiz.attempt.all_answered() => {
                vec![FlowAction::SelectAnswer, FlowAction::CheckAnswers]
            }
            Step::Quiz(_) => vec![FlowAction::SelectAnswer],
            Step::Confirm(confirm) if confirm.confirmed => {
                vec![FlowAction::SetConfirmed, FlowAction::Complete]
            }
            Step::Confirm(_) => vec![FlowAction::SetConfirmed],
            Step::Certificate(_) => vec![FlowAction::PrintCertificate, FlowAction::Back],
        }
    }

    fn unavailable(&self, action: FlowAction) -> FlowError {
        FlowError::ActionUnavailable {
            action,
            step: self.step.kind(),
        }
    }
}

fn quiz_view(quiz: &QuizStep) -> QuizView {
    let attempt = &quiz.attempt;
    let marks = attempt.marks(&quiz.content.quiz);
    let questions = quiz
        .content
        .quiz
        .iter()
        .zip(attempt.answers())
        .zip(marks)
        .map(|((question, selected), mark)| QuestionView {
            question: question.question.clone(),
            options: question.options.clone(),
            selected: *selected,
            mark,
            correct_index: attempt.submitted().then_some(question.correct_index),
            retry_prompt: (mark == QuestionMark::Wrong).then(|| RETRY_PROMPT.to_string()),
        })
        .collect();

    QuizView {
        questions,
        submitted: attempt.submitted(),
        passed: attempt.passed(),
        locked: attempt.passed(),
    }
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
