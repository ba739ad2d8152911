use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::browser::{BrowserEvent, Command};
use crate::error::Result;
use crate::forge::Forge;
use crate::types::{Issue, IssueQuery, RepositoryMetadata, RepositoryRef};

/// Fetch metadata and the first issue page concurrently. Fails if either does.
pub async fn load_initial(
    forge: &dyn Forge,
    repo: &RepositoryRef,
    query: &IssueQuery,
) -> Result<(RepositoryMetadata, Vec<Issue>)> {
    tokio::try_join!(forge.get_repository(repo), forge.list_issues(repo, query))
}

/// Run `command` to completion and translate the outcome into an event.
pub async fn execute(forge: &dyn Forge, repo: &RepositoryRef, command: &Command) -> BrowserEvent {
    match command {
        Command::LoadAll { seq, query } => match load_initial(forge, repo, query).await {
            Ok((repository, issues)) => BrowserEvent::Initialized {
                seq: *seq,
                repository,
                issues,
            },
            Err(e) => {
                warn!(%repo, seq, error = %e, "initial load failed");
                BrowserEvent::FetchFailed {
                    seq: *seq,
                    error: e.to_string(),
                }
            }
        },
        Command::LoadIssues { seq, query } => match forge.list_issues(repo, query).await {
            Ok(issues) => BrowserEvent::FetchSucceeded { seq: *seq, issues },
            Err(e) => {
                warn!(%repo, seq, error = %e, "issue refresh failed");
                BrowserEvent::FetchFailed {
                    seq: *seq,
                    error: e.to_string(),
                }
            }
        },
    }
}

/// Like [`execute`], but gives up as soon as `cancel` fires.
pub async fn execute_cancellable(
    forge: &dyn Forge,
    repo: &RepositoryRef,
    command: &Command,
    cancel: &CancellationToken,
) -> Option<BrowserEvent> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(%repo, seq = command.seq(), "fetch cancelled");
            None
        }
        event = execute(forge, repo, command) => Some(event),
    }
}
