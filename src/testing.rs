//! Shared test doubles.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing_subscriber::fmt::MakeWriter;

use crate::completion::{CompletionBackend, Prompt};
use crate::error::{AppError, Result};
use crate::tracker::types::Ticket;
use crate::tracker::TicketTracker;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Collects formatted log output so tests can assert on it.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// In-memory tracker. Unknown IDs are `NotFound`.
pub struct FakeTracker {
    tickets: HashMap<String, Ticket>,
    /// Ticket IDs whose publish is answered with a non-created status.
    rejecting: Vec<String>,
    fetched: Mutex<Vec<String>>,
    published: Mutex<Vec<(String, String)>>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self {
            tickets: HashMap::new(),
            rejecting: Vec::new(),
            fetched: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn with_ticket(mut self, id: &str, summary: &str, description: &str) -> Self {
        self.tickets.insert(
            id.to_string(),
            Ticket {
                id: id.to_string(),
                summary: summary.to_string(),
                description: description.to_string(),
            },
        );
        self
    }

    pub fn rejecting(mut self, id: &str) -> Self {
        self.rejecting.push(id.to_string());
        self
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketTracker for FakeTracker {
    async fn fetch(&self, ticket_id: &str) -> Result<Ticket> {
        self.fetched.lock().unwrap().push(ticket_id.to_string());
        self.tickets
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("ticket {ticket_id}")))
    }

    async fn publish(&self, ticket_id: &str, text: &str) -> Result<bool> {
        self.published
            .lock()
            .unwrap()
            .push((ticket_id.to_string(), text.to_string()));
        Ok(!self.rejecting.iter().any(|id| id == ticket_id))
    }
}

/// Backend that answers from a queue of scripted replies, in call order.
///
/// Once the script runs out every further call fails with a transport error.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call answers `reply`.
    pub fn repeating(reply: &str, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(reply.to_string())).collect())
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Transport("script exhausted".to_string())))
    }
}
