//! Issue browsing state machine.
//!
//! `BrowserState` is replaced on every transition. Operations return the
//! fetch they want issued as a [`Command`]; completions come back as
//! [`BrowserEvent`]s tagged with the sequence number of the command that
//! produced them, and [`BrowserState::reduce`] drops any that are not the
//! latest issued.

use tracing::{debug, trace};

use crate::types::{Issue, IssueFilter, IssueQuery, RepositoryMetadata, RepositoryRef, PER_PAGE};

/// What the view currently has to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Loading,
    Failed(String),
    Ready(Loaded),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub repository: RepositoryMetadata,
    pub issues: Vec<Issue>,
    /// Set when the latest issue refresh failed; `issues` is empty then.
    pub issues_error: Option<String>,
    /// A refresh is outstanding.
    pub refreshing: bool,
    /// The latest page held fewer than `PER_PAGE` issues.
    pub exhausted: bool,
}

/// Fetch to run on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Repository metadata and the first issue page, concurrently.
    LoadAll { seq: u64, query: IssueQuery },
    /// One issue page; metadata is left alone.
    LoadIssues { seq: u64, query: IssueQuery },
}

impl Command {
    pub fn seq(&self) -> u64 {
        match self {
            Command::LoadAll { seq, .. } | Command::LoadIssues { seq, .. } => *seq,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    FetchStarted {
        seq: u64,
    },
    Initialized {
        seq: u64,
        repository: RepositoryMetadata,
        issues: Vec<Issue>,
    },
    FetchSucceeded {
        seq: u64,
        issues: Vec<Issue>,
    },
    FetchFailed {
        seq: u64,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowserState {
    pub repository_ref: RepositoryRef,
    pub filter: IssueFilter,
    pub page: u32,
    pub content: Content,
    /// Selected row within the current page.
    pub selected: usize,
    latest_seq: u64,
}

impl BrowserState {
    /// Fresh state for `repository_ref` plus the initial dual fetch.
    pub fn initialize(repository_ref: RepositoryRef) -> (Self, Command) {
        let state = Self {
            repository_ref,
            filter: IssueFilter::default(),
            page: 1,
            content: Content::Loading,
            selected: 0,
            latest_seq: 0,
        };
        state.start_load_all()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.content, Content::Loading)
    }

    pub fn loaded(&self) -> Option<&Loaded> {
        match &self.content {
            Content::Ready(loaded) => Some(loaded),
            _ => None,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.page > 1
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.loaded()?.issues.get(self.selected)
    }

    // Pure transitions

    pub fn with_filter(mut self, filter: IssueFilter) -> Self {
        self.filter = filter;
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        if let Content::Ready(loaded) = &mut self.content {
            loaded.exhausted = issues.len() < PER_PAGE as usize;
            loaded.issues = issues;
            loaded.issues_error = None;
            loaded.refreshing = false;
        }
        self.selected = 0;
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        match &mut self.content {
            Content::Ready(loaded) => {
                loaded.issues.clear();
                loaded.issues_error = Some(error);
                loaded.refreshing = false;
                loaded.exhausted = false;
            }
            content => *content = Content::Failed(error),
        }
        self.selected = 0;
        self
    }

    // Operations

    /// Select a filter by position. Indexes outside the filter set are ignored.
    pub fn select_filter_index(self, index: usize) -> (Self, Option<Command>) {
        match IssueFilter::from_index(index) {
            Some(filter) => self.select_filter(filter),
            None => {
                debug!(index, "ignoring out-of-range filter index");
                (self, None)
            }
        }
    }

    pub fn select_filter(self, filter: IssueFilter) -> (Self, Option<Command>) {
        match self.content {
            Content::Loading => (self, None),
            Content::Failed(_) => {
                let (state, command) = self.with_filter(filter).start_load_all();
                (state, Some(command))
            }
            Content::Ready(_) => {
                let (state, command) = self.with_filter(filter).start_refresh();
                (state, Some(command))
            }
        }
    }

    pub fn increment_page(self) -> (Self, Option<Command>) {
        if self.loaded().is_none() {
            return (self, None);
        }
        let page = self.page.saturating_add(1);
        let (state, command) = self.with_page(page).start_refresh();
        (state, Some(command))
    }

    pub fn decrement_page(self) -> (Self, Option<Command>) {
        if self.loaded().is_none() || self.page == 1 {
            return (self, None);
        }
        let page = self.page - 1;
        let (state, command) = self.with_page(page).start_refresh();
        (state, Some(command))
    }

    /// Re-trigger whatever last ran: the initial load after it failed, or the
    /// current page otherwise.
    pub fn reload(self) -> (Self, Option<Command>) {
        match self.content {
            Content::Loading => (self, None),
            Content::Failed(_) => {
                let (state, command) = self.with_page(1).start_load_all();
                (state, Some(command))
            }
            Content::Ready(_) => {
                let (state, command) = self.start_refresh();
                (state, Some(command))
            }
        }
    }

    pub fn select_next(mut self) -> Self {
        let len = self.loaded().map(|l| l.issues.len()).unwrap_or(0);
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
        self
    }

    pub fn select_prev(mut self) -> Self {
        self.selected = self.selected.saturating_sub(1);
        self
    }

    fn start_load_all(mut self) -> (Self, Command) {
        self.content = Content::Loading;
        let seq = self.latest_seq + 1;
        let command = Command::LoadAll {
            seq,
            query: IssueQuery::first(self.filter),
        };
        (self.reduce(BrowserEvent::FetchStarted { seq }), command)
    }

    fn start_refresh(self) -> (Self, Command) {
        let seq = self.latest_seq + 1;
        let command = Command::LoadIssues {
            seq,
            query: IssueQuery::page(self.filter, self.page),
        };
        (self.reduce(BrowserEvent::FetchStarted { seq }), command)
    }

    /// Apply a fetch lifecycle event.
    pub fn reduce(mut self, event: BrowserEvent) -> Self {
        match event {
            BrowserEvent::FetchStarted { seq } => {
                if seq > self.latest_seq {
                    self.latest_seq = seq;
                }
                if let Content::Ready(loaded) = &mut self.content {
                    loaded.refreshing = true;
                }
                self
            }
            BrowserEvent::Initialized {
                seq,
                repository,
                issues,
            } => {
                if !self.is_current(seq) {
                    return self;
                }
                self.content = Content::Ready(Loaded {
                    repository,
                    issues: Vec::new(),
                    issues_error: None,
                    refreshing: false,
                    exhausted: false,
                });
                self.with_issues(issues)
            }
            BrowserEvent::FetchSucceeded { seq, issues } => {
                if !self.is_current(seq) {
                    return self;
                }
                self.with_issues(issues)
            }
            BrowserEvent::FetchFailed { seq, error } => {
                if !self.is_current(seq) {
                    return self;
                }
                self.with_error(error)
            }
        }
    }

    fn is_current(&self, seq: u64) -> bool {
        if seq == self.latest_seq {
            true
        } else {
            trace!(seq, latest = self.latest_seq, "discarding stale completion");
            false
        }
    }
}
