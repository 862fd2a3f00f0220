pub mod jira;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::Ticket;

#[async_trait]
pub trait TicketTracker: Send + Sync {
    /// Fetch a read-only snapshot of a ticket's summary and description.
    async fn fetch(&self, ticket_id: &str) -> Result<Ticket>;

    /// Append `text` as a new comment on the ticket.
    ///
    /// Returns `Ok(true)` only when the tracker acknowledges the comment as
    /// created. Any other answer is `Ok(false)`; only transport failures are
    /// errors.
    async fn publish(&self, ticket_id: &str, text: &str) -> Result<bool>;
}
