use chrono::{DateTime, Utc};

use crate::config::BatchConfig;
use crate::error::{AppError, Result};
use crate::pipeline::{PipelineRunner, TicketOutcome};

/// Split a comma-separated ticket list, trimming and dropping empty entries.
pub fn parse_ticket_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick the ticket list for this run: the command line wins over config.
///
/// Having no list at all is a configuration error. A list that parses to
/// nothing is not; it yields an empty batch.
pub fn resolve_ticket_ids(cli: Option<String>, config: &BatchConfig) -> Result<Vec<String>> {
    let raw = cli.or_else(|| config.ticket_ids.clone()).ok_or_else(|| {
        AppError::Config("no ticket IDs given; set JIRA_TICKET_IDS or pass --tickets".to_string())
    })?;

    let ticket_ids = parse_ticket_ids(&raw);
    if ticket_ids.is_empty() {
        tracing::warn!(raw = %raw, "Ticket list is empty, nothing to do");
    }
    Ok(ticket_ids)
}

#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub ticket_id: String,
    pub outcome: TicketOutcome,
}

/// What happened to every ticket in one batch run, in input order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    fn count(&self, pred: impl Fn(&TicketOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    pub fn published(&self) -> usize {
        self.count(|o| matches!(o, TicketOutcome::Published))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TicketOutcome::SkippedTooShort { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, TicketOutcome::PublishRejected))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TicketOutcome::Failed { .. }))
    }
}

/// Runs the pipeline over a list of tickets, one at a time.
pub struct BatchDriver {
    runner: PipelineRunner,
}

impl BatchDriver {
    pub fn new(runner: PipelineRunner) -> Self {
        Self { runner }
    }

    /// Process every ticket in order. A failing ticket never stops the batch.
    pub async fn run(&self, ticket_ids: &[String]) -> BatchReport {
        let started_at = Utc::now();
        let mut entries = Vec::with_capacity(ticket_ids.len());

        for ticket_id in ticket_ids {
            tracing::info!(ticket = %ticket_id, "Processing ticket");

            let outcome = match self.runner.run(ticket_id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(ticket = %ticket_id, error = %e, "Failed to process ticket");
                    TicketOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            match &outcome {
                TicketOutcome::Published => {
                    tracing::info!(ticket = %ticket_id, "Test plan posted to ticket");
                }
                TicketOutcome::SkippedTooShort { char_count } => {
                    tracing::warn!(
                        ticket = %ticket_id,
                        chars = char_count,
                        "Skipping comment: generated plan was empty or too short"
                    );
                }
                TicketOutcome::PublishRejected => {
                    tracing::error!(ticket = %ticket_id, "Failed to add test plan comment");
                }
                TicketOutcome::Failed { .. } => {}
            }

            entries.push(BatchEntry {
                ticket_id: ticket_id.clone(),
                outcome,
            });
        }

        BatchReport {
            started_at,
            finished_at: Utc::now(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::completion::CompletionBackend;
    use crate::pipeline::RetryPolicy;
    use crate::testing::{FakeTracker, ScriptedBackend};
    use crate::tracker::TicketTracker;

    const PLAN: &str = "## Test Plan\n### Happy Path\n- works\n### Edge Cases\n- limits\n### Negative Cases\n- errors";

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_ticket_ids() {
        assert_eq!(parse_ticket_ids(" QA-1, QA-2 ,,QA-3 "), ids(&["QA-1", "QA-2", "QA-3"]));
        assert_eq!(parse_ticket_ids("QA-1,QA-1"), ids(&["QA-1", "QA-1"]));
        assert!(parse_ticket_ids("").is_empty());
        assert!(parse_ticket_ids(" , ").is_empty());
    }

    #[test]
    fn test_cli_tickets_override_config() {
        let config = BatchConfig {
            ticket_ids: Some("QA-1,QA-2".to_string()),
        };

        let resolved = resolve_ticket_ids(Some("QA-9, QA-8".to_string()), &config).unwrap();
        assert_eq!(resolved, ids(&["QA-9", "QA-8"]));

        let resolved = resolve_ticket_ids(None, &config).unwrap();
        assert_eq!(resolved, ids(&["QA-1", "QA-2"]));
    }

    #[test]
    fn test_no_ticket_list_is_config_error() {
        let err = resolve_ticket_ids(None, &BatchConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("JIRA_TICKET_IDS"));
    }

    #[test]
    fn test_blank_ticket_list_is_empty_batch() {
        let config = BatchConfig {
            ticket_ids: Some(" , ,".to_string()),
        };
        assert!(resolve_ticket_ids(None, &config).unwrap().is_empty());
        assert!(resolve_ticket_ids(Some(String::new()), &BatchConfig::default())
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_ticket_does_not_stop_batch() {
        let tracker = Arc::new(
            FakeTracker::new()
                .with_ticket("QA-1", "Add login button", "Users need a login button on the homepage")
                .with_ticket("QA-2", "", "")
                .with_ticket("QA-3", "Logout", "Users can log out"),
        );
        // QA-404 fails at fetch and never reaches the backend
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("summary 1".to_string()),
            Ok(PLAN.to_string()),
            Ok("summary 2".to_string()),
            Ok("   ".to_string()),
            Ok("summary 3".to_string()),
            Ok(PLAN.to_string()),
        ]));
        let driver = BatchDriver::new(PipelineRunner::new(
            Arc::clone(&tracker) as Arc<dyn TicketTracker>,
            Arc::clone(&backend) as Arc<dyn CompletionBackend>,
            RetryPolicy::single_attempt(),
        ));

        let input = ids(&["QA-1", "QA-404", "QA-2", "QA-3"]);
        let report = driver.run(&input).await;

        assert_eq!(report.entries.len(), input.len());
        let order: Vec<&str> = report.entries.iter().map(|e| e.ticket_id.as_str()).collect();
        assert_eq!(order, vec!["QA-1", "QA-404", "QA-2", "QA-3"]);
        assert_eq!(tracker.fetched(), input);

        assert_eq!(report.entries[0].outcome, TicketOutcome::Published);
        match &report.entries[1].outcome {
            TicketOutcome::Failed { reason } => assert!(reason.contains("QA-404")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(
            report.entries[2].outcome,
            TicketOutcome::SkippedTooShort { char_count: 0 }
        );
        assert_eq!(report.entries[3].outcome, TicketOutcome::Published);

        assert_eq!(report.published(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.rejected(), 0);
        assert_eq!(report.failed(), 1);
        assert!(report.finished_at >= report.started_at);

        let published: Vec<String> = tracker.published().into_iter().map(|(id, _)| id).collect();
        assert_eq!(published, ids(&["QA-1", "QA-3"]));
    }

    #[tokio::test]
    async fn test_backend_failure_is_contained_to_its_ticket() {
        let tracker = Arc::new(
            FakeTracker::new()
                .with_ticket("QA-1", "One", "first")
                .with_ticket("QA-2", "Two", "second")
                .rejecting("QA-2"),
        );
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(AppError::Auth("OpenAI returned 401".to_string())),
            Ok("summary".to_string()),
            Ok(PLAN.to_string()),
        ]));
        let driver = BatchDriver::new(PipelineRunner::new(
            Arc::clone(&tracker) as Arc<dyn TicketTracker>,
            Arc::clone(&backend) as Arc<dyn CompletionBackend>,
            RetryPolicy::single_attempt(),
        ));

        let report = driver.run(&ids(&["QA-1", "QA-2"])).await;

        assert!(matches!(report.entries[0].outcome, TicketOutcome::Failed { .. }));
        assert_eq!(report.entries[1].outcome, TicketOutcome::PublishRejected);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.rejected(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let driver = BatchDriver::new(PipelineRunner::new(
            Arc::new(FakeTracker::new()),
            Arc::new(ScriptedBackend::new(Vec::new())),
            RetryPolicy::single_attempt(),
        ));

        let report = driver.run(&[]).await;
        assert!(report.entries.is_empty());
    }
}
