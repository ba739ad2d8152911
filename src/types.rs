use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

use crate::error::{DeckError, Result};

/// Issues fetched per page.
pub const PER_PAGE: u32 = 5;

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef(String);

impl RepositoryRef {
    /// Parse a plain `owner/name` identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = || DeckError::InvalidRepository(raw.to_string());

        let (owner, name) = raw.split_once('/').ok_or_else(invalid)?;
        // GitHub owner and repository names: ASCII alphanumerics, `-`, `_` and `.`.
        let valid_part = |s: &str| {
            !s.is_empty()
                && s != "."
                && s != ".."
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }

        Ok(Self(raw.to_string()))
    }

    /// Decode a percent-encoded route segment (e.g. `facebook%2Freact`) and parse it.
    pub fn decode(segment: &str) -> Result<Self> {
        let decoded = urlencoding::decode(segment)
            .map_err(|_| DeckError::InvalidRepository(segment.to_string()))?;
        Self::parse(&decoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner of a repository or author of an issue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub login: String,
    pub avatar_url: String,
}

/// Repository metadata from `GET /repos/{owner}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryMetadata {
    pub name: String,
    pub description: Option<String>,
    pub owner: User,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// One entry of `GET /repos/{owner}/{name}/issues`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: IssueState,
    pub user: User,
    pub labels: Vec<Label>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Issue state filter, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl IssueFilter {
    pub const ALL: [IssueFilter; 3] = [IssueFilter::All, IssueFilter::Open, IssueFilter::Closed];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            IssueFilter::All => 0,
            IssueFilter::Open => 1,
            IssueFilter::Closed => 2,
        }
    }

    /// Value of the `state` query parameter
    pub fn state_value(&self) -> &'static str {
        match self {
            IssueFilter::All => "all",
            IssueFilter::Open => "open",
            IssueFilter::Closed => "closed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IssueFilter::All => "Todas",
            IssueFilter::Open => "Abertas",
            IssueFilter::Closed => "Fechadas",
        }
    }

    pub fn color_hint(&self) -> &'static str {
        match self {
            IssueFilter::All => "blue",
            IssueFilter::Open => "green",
            IssueFilter::Closed => "red",
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Query for one page of issues. `page` is omitted on the initial load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueQuery {
    pub filter: IssueFilter,
    pub per_page: u32,
    pub page: Option<u32>,
}

impl IssueQuery {
    pub fn first(filter: IssueFilter) -> Self {
        Self {
            filter,
            per_page: PER_PAGE,
            page: None,
        }
    }

    pub fn page(filter: IssueFilter, page: u32) -> Self {
        Self {
            filter,
            per_page: PER_PAGE,
            page: Some(page),
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("state", self.filter.state_value().to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_owner_name() {
        let repo = RepositoryRef::parse("facebook/react").unwrap();
        assert_eq!(repo.as_str(), "facebook/react");
    }

    #[test]
    fn parse_rejects_malformed() {
        for raw in [
            "",
            "react",
            "/react",
            "facebook/",
            "a/b/c",
            "face book/react",
            "facebook/..",
            "./react",
            "facebook/react?x=1",
            "facebook/react#top",
            "facebook/re%61ct",
        ] {
            assert!(RepositoryRef::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn parse_accepts_github_name_charset() {
        let repo = RepositoryRef::parse("tokio-rs/tokio_util.v2").unwrap();
        assert_eq!(repo.as_str(), "tokio-rs/tokio_util.v2");
    }

    #[test]
    fn decode_rejects_smuggled_query() {
        assert!(RepositoryRef::decode("facebook%2Freact%3Fx%3D1").is_err());
        assert!(RepositoryRef::decode("facebook%2F..").is_err());
    }

    #[test]
    fn decode_route_segment() {
        let repo = RepositoryRef::decode("facebook%2Freact").unwrap();
        assert_eq!(repo.to_string(), "facebook/react");
    }

    #[test]
    fn filter_index_roundtrip_and_bounds() {
        for (i, filter) in IssueFilter::ALL.iter().enumerate() {
            assert_eq!(IssueFilter::from_index(i), Some(*filter));
            assert_eq!(filter.index(), i);
        }
        assert_eq!(IssueFilter::from_index(3), None);
    }

    #[test]
    fn filter_descriptors() {
        assert_eq!(IssueFilter::default(), IssueFilter::All);
        assert_eq!(IssueFilter::Closed.state_value(), "closed");
        assert_eq!(IssueFilter::Closed.label(), "Fechadas");
        assert_eq!(IssueFilter::Open.color_hint(), "green");
        assert_eq!(IssueFilter::Closed.next(), IssueFilter::All);
        assert_eq!(IssueFilter::All.prev(), IssueFilter::Closed);
    }

    #[test]
    fn first_query_has_no_page_param() {
        let params = IssueQuery::first(IssueFilter::All).params();
        assert_eq!(
            params,
            vec![("state", "all".to_string()), ("per_page", "5".to_string())]
        );
    }

    #[test]
    fn page_query_includes_page_param() {
        let params = IssueQuery::page(IssueFilter::Closed, 1).params();
        assert!(params.contains(&("state", "closed".to_string())));
        assert!(params.contains(&("page", "1".to_string())));
    }

    #[test]
    fn issue_decodes_from_api_shape() {
        let json = r#"{
            "id": 1, "number": 42, "title": "Crash on start",
            "html_url": "https://github.com/o/r/issues/42", "state": "open",
            "user": {"login": "octocat", "avatar_url": "https://a/1"},
            "labels": [{"id": 7, "name": "bug", "color": "ff0000"}],
            "created_at": "2024-01-01T00:00:00Z", "comments": 3
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 42);
        assert_eq!(issue.labels[0].name, "bug");
        assert!(issue.created_at.is_some());
    }

    #[test]
    fn issue_missing_user_fails_closed() {
        let json = r#"{"id": 1, "number": 1, "title": "t", "html_url": "u", "state": "open", "labels": []}"#;
        assert!(serde_json::from_str::<Issue>(json).is_err());
    }
}
