use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::browser::{BrowserState, Command};
use crate::error::DeckError;
use crate::event::Event;
use crate::forge::Forge;
use crate::loader;
use crate::route::Route;
use crate::types::RepositoryRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,       // Repository list + add-repository input
    Repository, // Issue browser
}

/// Entry screen state
#[derive(Debug, Default)]
pub struct HomeState {
    pub repositories: Vec<RepositoryRef>,
    pub index: usize,
    pub input: String,
    pub editing: bool,
}

/// A live issue browser. Dropping it without cancelling `cancel` would leave
/// its fetches running, so teardown always goes through `App::close_view`.
#[derive(Debug)]
pub struct IssueView {
    pub id: u64,
    pub state: BrowserState,
    cancel: CancellationToken,
    inflight: Option<CancellationToken>,
}

pub struct App {
    pub home: HomeState,
    pub view: Option<IssueView>,
    pub error: Option<String>,
    pub spinner: usize,
    pub should_quit: bool,
    next_view_id: u64,
    forge: Arc<dyn Forge>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        forge: Arc<dyn Forge>,
        repositories: Vec<RepositoryRef>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            home: HomeState {
                repositories,
                ..Default::default()
            },
            view: None,
            error: None,
            spinner: 0,
            should_quit: false,
            next_view_id: 0,
            forge,
            action_tx,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.view.is_some() {
            Screen::Repository
        } else {
            Screen::Home
        }
    }

    pub fn forge_name(&self) -> &str {
        self.forge.name()
    }

    pub fn navigate(&mut self, route: Route) {
        match route {
            Route::Home => self.close_view(),
            Route::Repository(repo) => self.open_view(repo),
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Tick => Action::Tick,
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) if self.home.editing => Action::InputPaste(text),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match self.screen() {
            Screen::Home if self.home.editing => match key.code {
                KeyCode::Esc => Action::BlurInput,
                KeyCode::Enter => Action::SubmitInput,
                KeyCode::Backspace => Action::InputBackspace,
                KeyCode::Char(c) => Action::InputChar(c),
                _ => Action::None,
            },
            Screen::Home => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                KeyCode::Enter => match self.home.repositories.get(self.home.index) {
                    Some(repo) => Action::OpenRepository(repo.clone()),
                    None => Action::None,
                },
                KeyCode::Char('a') | KeyCode::Char('/') => Action::FocusInput,
                _ => Action::None,
            },
            Screen::Repository => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Back,
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                KeyCode::Char(c @ '1'..='3') => Action::SelectFilter(c as usize - '1' as usize),
                KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => Action::NextFilter,
                KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => Action::PrevFilter,
                KeyCode::Char('n') | KeyCode::Char(']') | KeyCode::PageDown => Action::NextPage,
                KeyCode::Char('p') | KeyCode::Char('[') | KeyCode::PageUp => Action::PrevPage,
                KeyCode::Char('r') => Action::Reload,
                KeyCode::Char('o') | KeyCode::Enter => Action::OpenInBrowser,
                KeyCode::Char('y') => Action::YankUrl,
                _ => Action::None,
            },
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some() && !matches!(action, Action::Tick | Action::Browser { .. }) {
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => match self.screen() {
                Screen::Home => self.should_quit = true,
                Screen::Repository => self.close_view(),
            },
            Action::Tick => {
                self.spinner = self.spinner.wrapping_add(1);
            }
            Action::ScrollUp => match self.view.as_mut() {
                Some(view) => view.state = view.state.clone().select_prev(),
                None => self.home.index = self.home.index.saturating_sub(1),
            },
            Action::ScrollDown => match self.view.as_mut() {
                Some(view) => view.state = view.state.clone().select_next(),
                None => {
                    if self.home.index + 1 < self.home.repositories.len() {
                        self.home.index += 1;
                    }
                }
            },

            Action::FocusInput => self.home.editing = true,
            Action::BlurInput => self.home.editing = false,
            Action::InputChar(c) => self.home.input.push(c),
            Action::InputPaste(text) => self
                .home
                .input
                .extend(text.chars().filter(|c| !c.is_control())),
            Action::InputBackspace => {
                self.home.input.pop();
            }
            Action::SubmitInput => {
                // Adding repositories is not supported; the text is left as typed.
                debug!(input = %self.home.input, "ignoring repository submission");
            }

            Action::OpenRepository(repo) => self.open_view(repo),

            Action::SelectFilter(index) => self.apply(|s| s.select_filter_index(index)),
            Action::NextFilter => self.apply(|s| {
                let next = s.filter.next();
                s.select_filter(next)
            }),
            Action::PrevFilter => self.apply(|s| {
                let prev = s.filter.prev();
                s.select_filter(prev)
            }),
            Action::NextPage => self.apply(BrowserState::increment_page),
            Action::PrevPage => self.apply(BrowserState::decrement_page),
            Action::Reload => self.apply(BrowserState::reload),
            Action::Browser { view, event } => match self.view.as_mut() {
                Some(current) if current.id == view => {
                    current.state = current.state.clone().reduce(event);
                }
                _ => debug!(view, "dropping completion for a closed view"),
            },

            Action::OpenInBrowser => {
                if let Some(url) = self.selected_url() {
                    info!(%url, "opening in browser");
                    if let Err(e) = open::that(&url) {
                        self.report(DeckError::Browser(e.to_string()));
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_url() {
                    let copied = arboard::Clipboard::new().and_then(|mut c| c.set_text(url));
                    if let Err(e) = copied {
                        self.report(DeckError::Clipboard(e.to_string()));
                    }
                }
            }

            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    /// Queue `err` for the status bar.
    fn report(&self, err: DeckError) {
        warn!(error = %err, "action failed");
        self.action_tx.send(err.into()).ok();
    }

    fn selected_url(&self) -> Option<String> {
        let state = &self.view.as_ref()?.state;
        state
            .selected_issue()
            .map(|issue| issue.html_url.clone())
            .or_else(|| state.loaded()?.repository.html_url.clone())
    }

    /// Run a browser operation and issue whatever fetch it asks for.
    fn apply(&mut self, op: impl FnOnce(BrowserState) -> (BrowserState, Option<Command>)) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let (state, command) = op(view.state.clone());
        view.state = state;
        if let Some(command) = command {
            self.spawn_fetch(command);
        }
    }

    fn open_view(&mut self, repo: RepositoryRef) {
        self.close_view();
        self.next_view_id += 1;
        info!(%repo, view = self.next_view_id, "opening repository");

        let (state, command) = BrowserState::initialize(repo);
        self.view = Some(IssueView {
            id: self.next_view_id,
            state,
            cancel: CancellationToken::new(),
            inflight: None,
        });
        self.spawn_fetch(command);
    }

    fn close_view(&mut self) {
        if let Some(view) = self.view.take() {
            debug!(view = view.id, "closing repository view");
            view.cancel.cancel();
        }
    }

    /// Spawn `command` for the current view, cancelling the fetch it supersedes.
    fn spawn_fetch(&mut self, command: Command) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        if let Some(previous) = view.inflight.take() {
            previous.cancel();
        }
        let token = view.cancel.child_token();
        view.inflight = Some(token.clone());

        let tx = self.action_tx.clone();
        let forge = Arc::clone(&self.forge);
        let repo = view.state.repository_ref.clone();
        let view_id = view.id;
        tokio::spawn(async move {
            if let Some(event) =
                loader::execute_cancellable(forge.as_ref(), &repo, &command, &token).await
            {
                tx.send(Action::Browser {
                    view: view_id,
                    event,
                })
                .ok();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::tests::issues;
    use crate::browser::{BrowserEvent, Content};
    use crate::loader::tests::FakeForge;
    use crate::types::{IssueFilter, IssueQuery};
    use crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn app_with(forge: FakeForge) -> (App, Arc<FakeForge>, mpsc::UnboundedReceiver<Action>) {
        let forge = Arc::new(forge);
        let (tx, rx) = mpsc::unbounded_channel();
        let repos = vec![
            RepositoryRef::parse("facebook/react").unwrap(),
            RepositoryRef::parse("tokio-rs/tokio").unwrap(),
        ];
        let app = App::new(forge.clone(), repos, tx);
        (app, forge, rx)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn pump(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        let action = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no completion arrived")
            .expect("channel closed");
        app.update(action);
    }

    async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Action>, wait: Duration) {
        assert!(tokio::time::timeout(wait, rx.recv()).await.is_err());
    }

    fn press(app: &mut App, code: KeyCode) {
        let action = app.handle_event(key(code));
        app.update(action);
    }

    #[tokio::test]
    async fn select_opens_repository_and_loads() {
        let (mut app, forge, mut rx) = app_with(FakeForge::default());
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        let view = app.view.as_ref().unwrap();
        assert_eq!(view.state.repository_ref.as_str(), "tokio-rs/tokio");
        assert!(view.state.is_loading());

        pump(&mut app, &mut rx).await;
        let state = &app.view.as_ref().unwrap().state;
        assert_eq!(state.loaded().unwrap().issues.len(), 5);
        assert_eq!(
            *forge.queries.lock().unwrap(),
            vec![IssueQuery::first(IssueFilter::All)]
        );
    }

    #[tokio::test]
    async fn closed_filter_resets_page_and_disables_back() {
        let (mut app, forge, mut rx) = app_with(FakeForge::default());
        app.navigate(Route::Repository(RepositoryRef::parse("facebook/react").unwrap()));
        pump(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('n'));
        pump(&mut app, &mut rx).await;
        assert_eq!(app.view.as_ref().unwrap().state.page, 2);

        press(&mut app, KeyCode::Char('3'));
        pump(&mut app, &mut rx).await;

        let state = &app.view.as_ref().unwrap().state;
        assert_eq!(state.filter, IssueFilter::Closed);
        assert_eq!(state.filter.index(), 2);
        assert_eq!(state.page, 1);
        assert!(!state.can_go_back());
        assert_eq!(
            forge.queries.lock().unwrap().last().copied(),
            Some(IssueQuery::page(IssueFilter::Closed, 1))
        );
    }

    #[tokio::test]
    async fn prev_page_at_first_page_sends_nothing() {
        let (mut app, forge, mut rx) = app_with(FakeForge::default());
        app.navigate(Route::Repository(RepositoryRef::parse("facebook/react").unwrap()));
        pump(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('p'));
        assert_quiet(&mut rx, Duration::from_millis(100)).await;
        assert_eq!(forge.queries.lock().unwrap().len(), 1);
        assert_eq!(app.view.as_ref().unwrap().state.page, 1);
    }

    #[tokio::test]
    async fn superseded_refresh_never_lands() {
        let (mut app, _forge, mut rx) = app_with(FakeForge {
            slow_page: Some((2, Duration::from_millis(300))),
            ..Default::default()
        });
        app.navigate(Route::Repository(RepositoryRef::parse("facebook/react").unwrap()));
        pump(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('p'));
        pump(&mut app, &mut rx).await;
        assert_quiet(&mut rx, Duration::from_millis(500)).await;

        let state = &app.view.as_ref().unwrap().state;
        assert_eq!(state.page, 1);
        let ids: Vec<u64> = state.loaded().unwrap().issues.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![11, 12, 13, 14, 15]);
    }

    #[tokio::test]
    async fn back_cancels_inflight_load() {
        let (mut app, _forge, mut rx) = app_with(FakeForge {
            slow_page: Some((1, Duration::from_millis(200))),
            ..Default::default()
        });
        app.navigate(Route::Repository(RepositoryRef::parse("facebook/react").unwrap()));
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.screen(), Screen::Home);
        assert_quiet(&mut rx, Duration::from_millis(400)).await;
    }

    #[tokio::test]
    async fn completion_for_old_view_is_dropped() {
        let (mut app, _forge, mut rx) = app_with(FakeForge::default());
        app.navigate(Route::Repository(RepositoryRef::parse("facebook/react").unwrap()));
        let old_id = app.view.as_ref().unwrap().id;
        app.navigate(Route::Home);
        app.navigate(Route::Repository(RepositoryRef::parse("tokio-rs/tokio").unwrap()));

        app.update(Action::Browser {
            view: old_id,
            event: BrowserEvent::Initialized {
                seq: 1,
                repository: crate::browser::tests::repository(),
                issues: issues(90..=91),
            },
        });
        assert!(app.view.as_ref().unwrap().state.is_loading());

        pump(&mut app, &mut rx).await;
        let state = &app.view.as_ref().unwrap().state;
        assert_eq!(state.repository_ref.as_str(), "tokio-rs/tokio");
        assert_eq!(state.loaded().unwrap().issues[0].id, 11);
    }

    #[tokio::test]
    async fn missing_repository_shows_failure() {
        let (mut app, _forge, mut rx) = app_with(FakeForge {
            missing_repository: true,
            ..Default::default()
        });
        app.navigate(Route::Repository(RepositoryRef::parse("nobody/nothing").unwrap()));
        pump(&mut app, &mut rx).await;

        let state = &app.view.as_ref().unwrap().state;
        assert!(matches!(&state.content, Content::Failed(msg) if msg.contains("Not found")));
    }

    #[tokio::test]
    async fn submit_input_is_inert() {
        let (mut app, forge, mut rx) = app_with(FakeForge::default());
        press(&mut app, KeyCode::Char('a'));
        for c in "rust-lang/rust".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.home.input, "rust-lang/rus");
        assert_eq!(app.home.repositories.len(), 2);
        assert_eq!(app.screen(), Screen::Home);
        assert_quiet(&mut rx, Duration::from_millis(50)).await;
        assert!(forge.queries.lock().unwrap().is_empty());

        // 'q' types while editing; Esc leaves the input first.
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn paste_only_reaches_focused_input() {
        let (mut app, _forge, _rx) = app_with(FakeForge::default());
        assert!(matches!(
            app.handle_event(Event::Paste("x".into())),
            Action::None
        ));
        press(&mut app, KeyCode::Char('/'));
        let action = app.handle_event(Event::Paste("owner/name\n".into()));
        app.update(action);
        assert_eq!(app.home.input, "owner/name");
    }

    #[tokio::test]
    async fn failed_action_reaches_status_bar_then_clears() {
        let (mut app, _forge, mut rx) = app_with(FakeForge::default());
        app.report(DeckError::Clipboard("no display".into()));
        assert!(app.error.is_none());

        pump(&mut app, &mut rx).await;
        assert_eq!(app.error.as_deref(), Some("Failed to copy URL: no display"));

        app.update(Action::Tick);
        assert!(app.error.is_some());
        press(&mut app, KeyCode::Char('j'));
        assert!(app.error.is_none());
    }

    #[test]
    fn repository_keys_map_to_actions() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(Arc::new(FakeForge::default()), vec![], tx);
        let (state, _) = BrowserState::initialize(RepositoryRef::parse("a/b").unwrap());
        app.view = Some(IssueView {
            id: 1,
            state,
            cancel: CancellationToken::new(),
            inflight: None,
        });

        assert!(matches!(app.handle_event(key(KeyCode::Char('1'))), Action::SelectFilter(0)));
        assert!(matches!(app.handle_event(key(KeyCode::Char('3'))), Action::SelectFilter(2)));
        assert!(matches!(app.handle_event(key(KeyCode::Tab)), Action::NextFilter));
        assert!(matches!(app.handle_event(key(KeyCode::PageDown)), Action::NextPage));
        assert!(matches!(app.handle_event(key(KeyCode::Char('['))), Action::PrevPage));
        assert!(matches!(app.handle_event(key(KeyCode::Char('q'))), Action::Back));
        assert!(matches!(app.handle_event(Event::Tick), Action::Tick));
    }
}
