use std::sync::Arc;

use crate::completion::CompletionBackend;
use crate::error::Result;
use crate::tracker::TicketTracker;

use super::retry::RetryPolicy;
use super::stage::{Stage, StageContext, StageKind, STAGES};
use super::types::{PipelineResult, PipelineState, TicketOutcome, MIN_PLAN_CHARS};

/// Turns one ticket into one published test plan comment.
pub struct PipelineRunner {
    tracker: Arc<dyn TicketTracker>,
    backend: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
}

impl PipelineRunner {
    pub fn new(
        tracker: Arc<dyn TicketTracker>,
        backend: Arc<dyn CompletionBackend>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            tracker,
            backend,
            retry,
        }
    }

    /// Run the full pipeline for `ticket_id`.
    ///
    /// Fetch and stage failures are returned as errors; everything else ends
    /// in a `TicketOutcome`.
    pub async fn run(&self, ticket_id: &str) -> Result<TicketOutcome> {
        let ticket = self
            .retry
            .run("fetch ticket", || self.tracker.fetch(ticket_id))
            .await?;

        let mut state = PipelineState::Fetched;
        tracing::debug!(ticket = ticket_id, state = ?state, "Ticket fetched");

        let mut context = StageContext::initial(&ticket);
        let mut generated = None;

        for stage in STAGES.iter() {
            context = self.run_stage(ticket_id, stage, &context).await?;
            if stage.kind == StageKind::Generate {
                generated = Some(context.clone());
            }

            let next = state.advance(stage.kind);
            if next != state {
                tracing::info!(ticket = ticket_id, stage = %stage.kind, state = ?next, "Stage complete");
                state = next;
            }
        }

        let result = PipelineResult::from_output(generated.unwrap_or_else(|| StageContext::new("")));

        if !result.passes_quality_gate() {
            tracing::debug!(
                ticket = ticket_id,
                chars = result.char_count,
                min_chars = MIN_PLAN_CHARS,
                "Plan failed the quality gate"
            );
            return Ok(TicketOutcome::SkippedTooShort {
                char_count: result.char_count,
            });
        }

        // Publishing is never retried so a comment is posted at most once
        let created = self.tracker.publish(ticket_id, &result.plan).await?;

        Ok(if created {
            TicketOutcome::Published
        } else {
            TicketOutcome::PublishRejected
        })
    }

    async fn run_stage(
        &self,
        ticket_id: &str,
        stage: &Stage,
        input: &StageContext,
    ) -> Result<StageContext> {
        tracing::debug!(
            ticket = ticket_id,
            stage = %stage.kind,
            input_chars = input.as_str().chars().count(),
            "Running stage"
        );

        self.retry
            .run(stage.kind.name(), || stage.run(self.backend.as_ref(), input))
            .await
    }
}
