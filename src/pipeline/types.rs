use super::stage::{StageContext, StageKind};

/// Minimum trimmed length, in characters, a plan needs before it is posted.
pub const MIN_PLAN_CHARS: usize = 30;

/// Progress of a single ticket through the pipeline.
///
/// Only ever moves forward; failures leave the machine through an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Fetched,
    Extracted,
    Generated,
}

impl PipelineState {
    /// State reached once `completed` has produced its output.
    pub fn advance(self, completed: StageKind) -> Self {
        match (self, completed) {
            (PipelineState::Fetched, StageKind::Extract) => PipelineState::Extracted,
            (PipelineState::Extracted, StageKind::Generate) => PipelineState::Generated,
            (state, _) => state,
        }
    }
}

/// The generated test plan, ready for the quality gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub plan: String,
    pub char_count: usize,
}

impl PipelineResult {
    pub fn from_output(output: StageContext) -> Self {
        let plan = output.as_str().trim().to_string();
        let char_count = plan.chars().count();
        Self { plan, char_count }
    }

    pub fn passes_quality_gate(&self) -> bool {
        self.char_count >= MIN_PLAN_CHARS
    }
}

/// Terminal outcome of one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketOutcome {
    /// Plan posted as a comment.
    Published,
    /// Plan empty or under the length floor; nothing posted.
    SkippedTooShort { char_count: usize },
    /// Tracker did not acknowledge the comment as created.
    PublishRejected,
    /// Any error raised while processing the ticket.
    Failed { reason: String },
}
