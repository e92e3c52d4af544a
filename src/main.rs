use color_eyre::Result;
use eat_roulette::{
    api::{GoogleMapsClient, PlacesClient},
    app::App,
    config::{self, Config},
    events::EventHandler,
    logging, runtime,
    store::LocationStore,
    ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging(logging::LOG_DIR);
    install_panic_hook();
    color_eyre::install()?;

    let config = Config::load();
    let client = build_client(&config);
    let store = match LocationStore::open(&config.storage.path) {
        Ok(store) => store,
        Err(e) => {
            error!("Could not open {}: {}. Location will not persist.", config.storage.path, e);
            LocationStore::in_memory()?
        }
    };

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(config, store, client.is_some());
    let mut event_handler = EventHandler::new(100);
    let tx = event_handler.tx.clone();

    // Main loop
    while !app.should_quit {
        runtime::dispatch(&mut app, client.as_ref(), &tx);
        terminal.draw(|f| ui::render(f, &app))?;

        match event_handler.next().await {
            Some(event) => app.on_event(event),
            None => break,
        }
    }

    // Stops a draw that is still running before the terminal goes away.
    drop(app);
    restore_terminal(terminal)?;
    info!("Bye.");
    Ok(())
}

fn build_client(config: &Config) -> Option<Arc<dyn PlacesClient>> {
    let key = config::api_key()?;
    match GoogleMapsClient::new(key, config.search.language.clone(), config.request_timeout()) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Could not build maps client: {}", e);
            None
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}
