use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::JiraConfig;
use crate::error::{AppError, Result};
use crate::tracker::types::Ticket;
use crate::tracker::TicketTracker;

use super::mapper;

/// Issue tracker client speaking the Jira Cloud REST API v3.
pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn issue_url(&self, ticket_id: &str) -> String {
        format!(
            "{}/rest/api/3/issue/{}",
            self.base_url,
            urlencoding::encode(ticket_id)
        )
    }
}

#[async_trait]
impl TicketTracker for JiraClient {
    async fn fetch(&self, ticket_id: &str) -> Result<Ticket> {
        let response = self
            .client
            .get(self.issue_url(ticket_id))
            .basic_auth(&self.email, Some(&self.api_token))
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => AppError::NotFound(format!("ticket {ticket_id}")),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AppError::Auth(format!("issue tracker returned {status}"))
                }
                _ => AppError::TrackerApi(format!("GET issue {ticket_id} returned {status}: {body}")),
            });
        }

        let issue = response.json::<serde_json::Value>().await?;
        Ok(mapper::map_ticket(ticket_id, &issue))
    }

    async fn publish(&self, ticket_id: &str, text: &str) -> Result<bool> {
        let response = self
            .client
            .post(format!("{}/comment", self.issue_url(ticket_id)))
            .basic_auth(&self.email, Some(&self.api_token))
            .header("accept", "application/json")
            .json(&mapper::comment_body(text))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            ticket = ticket_id,
            status = status.as_u16(),
            body = %body,
            "Issue tracker did not create the comment"
        );
        Ok(false)
    }
}
