use std::fmt;

use crate::completion::{CompletionBackend, Prompt};
use crate::error::Result;
use crate::tracker::types::Ticket;

/// Who the generation backend is asked to act as.
#[derive(Debug)]
pub struct Role {
    pub name: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

pub static QA_PLAN_AUTHOR: Role = Role {
    name: "QA test plan author",
    goal: "Create and document test plans from issue tracker tickets",
    backstory: "You are a QA engineer responsible for making sure every ticket has a proper test plan.",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Extract,
    Generate,
    PublishPrep,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Extract => "extract",
            StageKind::Generate => "generate",
            StageKind::PublishPrep => "publish-prep",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of the pipeline.
///
/// `instructions` and `expected_output` only frame the prompt; nothing
/// checks the backend's answer against them.
#[derive(Debug)]
pub struct Stage {
    pub kind: StageKind,
    pub role: &'static Role,
    pub instructions: &'static str,
    pub expected_output: &'static str,
}

/// The stages in execution order.
pub static STAGES: [Stage; 3] = [
    Stage {
        kind: StageKind::Extract,
        role: &QA_PLAN_AUTHOR,
        instructions: "Extract the key functional requirements, acceptance criteria, and edge cases from the ticket below. \
Also review any recent comments to capture changes, clarifications, or additional requirements that could affect the test plan.",
        expected_output: "A structured summary covering the purpose of the change, the workflows to validate, edge cases, \
and any relevant updates or changes found in the ticket comments.",
    },
    Stage {
        kind: StageKind::Generate,
        role: &QA_PLAN_AUTHOR,
        instructions: "Using the extracted summary below, write a markdown test plan broken down into test cases. \
Group the cases into three sections: happy path, edge cases, and negative cases.",
        expected_output: "A complete markdown test plan with Happy Path, Edge Cases, and Negative Cases sections, \
ready to be posted as a ticket comment.",
    },
    Stage {
        kind: StageKind::PublishPrep,
        role: &QA_PLAN_AUTHOR,
        instructions: "Take the generated test plan and add it as a comment on the original ticket.",
        expected_output: "Confirmation that the ticket was updated.",
    },
];

/// Text handed from one stage to the next. Never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageContext(String);

impl StageContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Context for the first stage, built from the ticket snapshot.
    pub fn initial(ticket: &Ticket) -> Self {
        Self(format!(
            "Summary: {}\n\nDescription: {}",
            ticket.summary, ticket.description
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Stage {
    pub fn prompt(&self, input: &StageContext) -> Prompt {
        Prompt {
            system: format!(
                "You are acting as: {}.\n\nGoal: {}\n\n{}",
                self.role.name, self.role.goal, self.role.backstory
            ),
            user: format!(
                "## Task\n{}\n\n## Input\n{}\n\n## Expected output\n{}",
                self.instructions,
                input.as_str(),
                self.expected_output
            ),
        }
    }

    /// Produce this stage's output context from `input`.
    ///
    /// Publish-prep passes its input through untouched; publishing is done
    /// by the runner, not by the backend.
    pub async fn run(
        &self,
        backend: &dyn CompletionBackend,
        input: &StageContext,
    ) -> Result<StageContext> {
        match self.kind {
            StageKind::PublishPrep => Ok(input.clone()),
            StageKind::Extract | StageKind::Generate => {
                let text = backend.complete(&self.prompt(input)).await?;
                Ok(StageContext(text))
            }
        }
    }
}
