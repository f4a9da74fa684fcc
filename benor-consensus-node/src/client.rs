use reqwest::{Client, Response, StatusCode};

use benor_consensus_core::{Message, NodeState};

use crate::error::NodeError;

/// Typed HTTP client for one peer's control and message endpoints.
#[derive(Clone, Debug)]
pub struct NodeClient {
    client: Client,
    base_url: String,
}

impl NodeClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        NodeClient {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness probe. `Ok(true)` for a live peer, `Ok(false)` for a faulty one.
    pub async fn status(&self) -> Result<bool, NodeError> {
        let response = self.client.get(self.url("/status")).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::INTERNAL_SERVER_ERROR => Ok(false),
            _ => Err(unexpected(&response)),
        }
    }

    /// Start the peer's run. Returns once the peer issued its first proposal.
    pub async fn start(&self) -> Result<(), NodeError> {
        let response = self.client.get(self.url("/start")).send().await?;
        expect_ok(&response)
    }

    pub async fn stop(&self) -> Result<(), NodeError> {
        let response = self.client.get(self.url("/stop")).send().await?;
        expect_ok(&response)
    }

    pub async fn get_state(&self) -> Result<NodeState, NodeError> {
        let response = self.client.get(self.url("/getState")).send().await?;
        expect_ok(&response)?;
        Ok(response.json().await?)
    }

    pub async fn send_message(&self, message: &Message) -> Result<(), NodeError> {
        let response = self
            .client
            .post(self.url("/message"))
            .json(message)
            .send()
            .await?;
        expect_ok(&response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn expect_ok(response: &Response) -> Result<(), NodeError> {
    if response.status() == StatusCode::OK {
        Ok(())
    } else {
        Err(unexpected(response))
    }
}

fn unexpected(response: &Response) -> NodeError {
    NodeError::UnexpectedStatus {
        status: response.status().as_u16(),
        url: response.url().to_string(),
    }
}
