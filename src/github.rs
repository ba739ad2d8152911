use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{DeckError, Result};
use crate::forge::Forge;
use crate::types::{Issue, IssueQuery, RepositoryMetadata, RepositoryRef};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("issuedeck/", env!("CARGO_PKG_VERSION"));

/// Unauthenticated client for the GitHub REST API.
#[derive(Clone)]
pub struct GitHub {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GitHub {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        // Malformed payloads must surface as Decode, not Network.
        let body = response.bytes().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(DeckError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(DeckError::Api {
                code: status.as_u16(),
                message: extract_error_message(&body)
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull the `message` field out of a GitHub error body.
fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[async_trait]
impl Forge for GitHub {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn get_repository(&self, repo: &RepositoryRef) -> Result<RepositoryMetadata> {
        self.get_json(&format!("/repos/{}", repo), &[]).await
    }

    async fn list_issues(&self, repo: &RepositoryRef, query: &IssueQuery) -> Result<Vec<Issue>> {
        self.get_json(&format!("/repos/{}/issues", repo), &query.params())
            .await
    }
}
