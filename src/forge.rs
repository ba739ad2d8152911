use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Issue, IssueQuery, RepositoryMetadata, RepositoryRef};

/// Read-only source of repository metadata and issue pages.
#[async_trait]
pub trait Forge: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn get_repository(&self, repo: &RepositoryRef) -> Result<RepositoryMetadata>;
    async fn list_issues(&self, repo: &RepositoryRef, query: &IssueQuery) -> Result<Vec<Issue>>;
}
