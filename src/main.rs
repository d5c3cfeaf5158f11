use anyhow::Result;

mod app;
mod backend;
mod config;
mod handler;
mod session;
mod tui;
mod ui;

use app::App;
use backend::BackendClient;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::load().unwrap_or_default();
    let api_url = config.resolve_api_url();
    tracing::info!(%api_url, "starting session");

    let mut app = App::new(BackendClient::new(&api_url));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }
    }

    Ok(())
}

/// Logs go to a file under the config directory; stdout belongs to the TUI.
/// A failure here is not fatal, the client just runs without logs.
fn init_logging() {
    let Ok(path) = Config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .init();
}
