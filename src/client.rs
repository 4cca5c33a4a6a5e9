//! Remote query endpoint client
//!
//! The endpoint accepts `POST {"query": "..."}` and replies with
//! `{"answer": "..."}`, or `{"error": "..."}` for an application-level
//! error that still carries a success status. Anything else (transport
//! failure, timeout, non-success status, unreadable body) is a
//! [`AskdeskError::NetworkFailure`].

use crate::config::EndpointConfig;
use crate::error::{AskdeskError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text used when a successful response carries neither `answer` nor `error`
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error.";

/// Anything that can turn a user query into reply text
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Send `query` and return the text to show as the bot's reply
    ///
    /// # Errors
    ///
    /// Returns `AskdeskError::NetworkFailure` when no usable reply arrives
    async fn ask(&self, query: &str) -> std::result::Result<String, AskdeskError>;
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// Body of a successful endpoint response
#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl QueryResponse {
    /// `answer` if present, else `error`, else [`FALLBACK_ANSWER`]
    ///
    /// Empty strings count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use askdesk::client::QueryResponse;
    ///
    /// let response = QueryResponse { answer: None, error: Some("Query cannot be empty.".into()) };
    /// assert_eq!(response.into_reply(), "Query cannot be empty.");
    /// ```
    pub fn into_reply(self) -> String {
        self.answer
            .filter(|a| !a.is_empty())
            .or(self.error.filter(|e| !e.is_empty()))
            .unwrap_or_else(|| FALLBACK_ANSWER.to_string())
    }
}

/// HTTP client for the query endpoint
///
/// # Examples
///
/// ```no_run
/// use askdesk::client::{HttpQueryClient, QueryBackend};
/// use askdesk::config::EndpointConfig;
///
/// # async fn example() -> askdesk::error::Result<()> {
/// let client = HttpQueryClient::new(EndpointConfig::default())?;
/// let reply = client.ask("What is retrieval augmented generation?").await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
pub struct HttpQueryClient {
    client: Client,
    url: String,
}

impl HttpQueryClient {
    /// Create a client for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("askdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AskdeskError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized query client: url={}, timeout={}s",
            config.url,
            config.timeout_seconds
        );

        Ok(Self {
            client,
            url: config.url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QueryBackend for HttpQueryClient {
    async fn ask(&self, query: &str) -> std::result::Result<String, AskdeskError> {
        tracing::debug!("Sending query: {} chars", query.chars().count());

        let response = self
            .client
            .post(&self.url)
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Query request failed: {}", e);
                AskdeskError::NetworkFailure(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Query endpoint returned status {}", status);
            return Err(AskdeskError::NetworkFailure(format!(
                "endpoint returned status {}",
                status
            )));
        }

        let body: QueryResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse query response: {}", e);
            AskdeskError::NetworkFailure(format!("unreadable response: {}", e))
        })?;

        Ok(body.into_reply())
    }
}
