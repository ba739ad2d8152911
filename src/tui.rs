use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, EventStream,
        KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::event::Event;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn init() -> io::Result<Tui> {
    execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;
    enable_raw_mode()?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

pub fn restore() -> io::Result<()> {
    execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    disable_raw_mode()
}

#[derive(Debug)]
enum Input {
    Emit(Event),
    Skip,
    Stop,
}

/// Map one item of the terminal event stream. A read error ends input: the
/// reader would keep failing on every poll.
fn classify(next: Option<io::Result<CrosstermEvent>>) -> Input {
    match next {
        Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
            Input::Emit(Event::Key(key))
        }
        Some(Ok(CrosstermEvent::Paste(text))) => Input::Emit(Event::Paste(text)),
        // Resizes are picked up by the next render.
        Some(Ok(_)) => Input::Skip,
        Some(Err(e)) => {
            warn!(error = %e, "terminal input failed, stopping");
            Input::Stop
        }
        None => Input::Stop,
    }
}

/// Terminal input plus tick/render timers, merged into one stream of `Event`s.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut tick_interval = interval(tick_rate);
            let mut render_interval = interval(render_rate);

            loop {
                let event = tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = tick_interval.tick() => Event::Tick,
                    _ = render_interval.tick() => Event::Render,
                    next = reader.next() => match classify(next) {
                        Input::Emit(event) => event,
                        Input::Skip => continue,
                        Input::Stop => break,
                    },
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel, task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code: KeyCode::Char('n'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn key_presses_and_pastes_are_emitted() {
        assert!(matches!(
            classify(Some(Ok(key(KeyEventKind::Press)))),
            Input::Emit(Event::Key(_))
        ));
        assert!(matches!(
            classify(Some(Ok(CrosstermEvent::Paste("a/b".into())))),
            Input::Emit(Event::Paste(ref text)) if text == "a/b"
        ));
    }

    #[test]
    fn releases_and_resizes_are_skipped() {
        assert!(matches!(classify(Some(Ok(key(KeyEventKind::Release)))), Input::Skip));
        assert!(matches!(classify(Some(Ok(CrosstermEvent::Resize(80, 24)))), Input::Skip));
    }

    #[test]
    fn read_error_stops_input() {
        let err = io::Error::new(io::ErrorKind::Other, "tty gone");
        assert!(matches!(classify(Some(Err(err))), Input::Stop));
        assert!(matches!(classify(None), Input::Stop));
    }
}
