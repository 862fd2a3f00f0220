pub mod retry;
pub mod runner;
pub mod stage;
pub mod types;

pub use retry::RetryPolicy;
pub use runner::PipelineRunner;
pub use types::{TicketOutcome, MIN_PLAN_CHARS};
