//! Employee training flow: welcome, briefing content, quiz, confirmation and
//! certificate.

pub mod certificate;
mod flow;
pub mod quiz;

use shared::protocol::{FlowAction, FlowStepKind};
use thiserror::Error;

pub use certificate::{Certificate, Surface};
pub use flow::{
    CompletionRequest, ContentRequest, ContentTicket, Delivery, FlowConfig, TrainingFlow,
};
pub use quiz::{grade, QuizAttempt};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("action {action:?} is not available in step {step:?}")]
    ActionUnavailable {
        action: FlowAction,
        step: FlowStepKind,
    },
    #[error("briefing content is still loading")]
    ContentLoading,
    #[error("{unanswered} quiz question(s) still unanswered")]
    QuizIncomplete { unanswered: usize },
    #[error("quiz has not been passed")]
    QuizNotPassed,
    #[error("option {option} of question {question} does not exist")]
    InvalidAnswer { question: usize, option: usize },
    #[error("participation has not been confirmed")]
    NotConfirmed,
}
