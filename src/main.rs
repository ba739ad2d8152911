mod action;
mod app;
mod browser;
mod config;
mod error;
mod event;
mod forge;
mod github;
mod loader;
mod route;
mod tui;
mod types;
mod ui;

use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::github::GitHub;
use crate::route::Route;
use crate::tui::EventHandler;

#[derive(Debug, Parser)]
#[command(version, about = "Browse the issues of GitHub repositories from the terminal")]
struct Cli {
    /// Repository to open: `owner/name`, or a route such as `/repository/facebook%2Freact`
    target: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long)]
    api_url: Option<String>,

    /// Config file (default: <config dir>/issuedeck/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let writer = match &cli.log_file {
        Some(path) => BoxMakeWriter::new(Mutex::new(std::fs::File::create(path)?)),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let api_url = cli.api_url.as_deref().unwrap_or(&config.api_url);
    let route = Route::from_target(cli.target.as_deref())?;
    info!(%api_url, route = %route.path(), "starting");

    let github = GitHub::new(api_url)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(github, config, route).await;

    tui::restore()?;

    result
}

async fn run(github: GitHub, config: Config, route: Route) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(Arc::new(github), config.repository_refs(), action_tx.clone());
    app.navigate(route);

    let tick_rate = Duration::from_millis(120);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            event = events.next() => {
                // Input has ended; nothing can drive the app any more.
                let Some(event) = event else {
                    break;
                };
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
