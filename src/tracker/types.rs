/// Snapshot of a ticket, fetched once per pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub summary: String,
    pub description: String,
}
