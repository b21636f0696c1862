mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::keys::KeyAction;
use crate::state::app_settings::AppSettings;
use crate::state::feed::MatchFeed;
use crate::state::messages::{SyncEvent, UiEvent};
use anyhow::Context;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use match_api::client::MatchApi;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

const INPUT_POLL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    let settings = AppSettings::load().context("invalid configuration")?;

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    log::set_max_level(settings.log_level);
    tui_logger::set_default_level(settings.log_level);

    let feed: Arc<dyn MatchFeed> = Arc::new(
        MatchApi::new()
            .with_base_url(settings.api_url.clone())
            .with_timeout(settings.request_timeout),
    );
    info!("polling {} every {:?}", feed.name(), settings.poll_interval);

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (sync_tx, sync_rx) = mpsc::unbounded_channel::<SyncEvent>();

    let app = Arc::new(Mutex::new(App::new(settings, feed, sync_tx)));

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Animation tick thread, 80ms ≈ 12.5 FPS
    let anim_tx = ui_event_tx.clone();
    let animation_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(80));
        loop {
            interval.tick().await;
            if anim_tx.send(UiEvent::AnimationTick).await.is_err() {
                break;
            }
        }
    });

    // Start the list sync on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app.clone(), ui_event_rx, sync_rx).await;

    app.lock().await.shutdown();
    input_handler.abort();
    animation_task.abort();

    cleanup_terminal()?;
    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("matchtui {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "matchtui - live esports match dashboard for the terminal

Usage:
  matchtui
  matchtui --help
  matchtui --version

Environment:
  MATCHTUI_API_URL       Match service base URL (default http://localhost:9091)
  MATCHTUI_POLL_MS       Refresh interval in milliseconds (default 3000, min 250)
  MATCHTUI_TIMEOUT_SECS  Per-request timeout in seconds (default 10)
  MATCHTUI_LOG           Log level: off, error, warn, info, debug, trace (default warn)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    mut sync_events: mpsc::UnboundedReceiver<SyncEvent>,
) {
    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                match handle_ui_event(ui_event, &app).await {
                    Some(KeyAction::Quit) => break,
                    Some(KeyAction::Continue) => {
                        let app_guard = app.lock().await;
                        draw::draw(&mut terminal, &app_guard);
                    }
                    None => {}
                }
            }

            Some(sync_event) = sync_events.recv() => {
                let mut app_guard = app.lock().await;
                if app_guard.on_sync_event(sync_event) {
                    draw::draw(&mut terminal, &app_guard);
                }
            }

            else => break,
        }
    }
}

/// Returns `None` when nothing needs redrawing.
async fn handle_ui_event(ui_event: UiEvent, app: &Arc<Mutex<App>>) -> Option<KeyAction> {
    match ui_event {
        UiEvent::AppStarted => {
            app.lock().await.start();
            Some(KeyAction::Continue)
        }
        UiEvent::KeyPressed(key_event) => Some(keys::handle_key_bindings(key_event, app).await),
        UiEvent::Resize => Some(KeyAction::Continue),
        UiEvent::AnimationTick => {
            let mut guard = app.lock().await;
            guard.advance_animation();
            guard.needs_animation().then_some(KeyAction::Continue)
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    // Poll with a short timeout so the task notices shutdown without a keypress.
    while !ui_events.is_closed() {
        match crossterm_event::poll(INPUT_POLL) {
            Ok(true) => {}
            Ok(false) => {
                tokio::task::yield_now().await;
                continue;
            }
            Err(e) => {
                error!("terminal input error: {e}");
                break;
            }
        }
        let event = match crossterm_event::read() {
            Ok(event) => event,
            Err(e) => {
                error!("terminal input error: {e}");
                break;
            }
        };

        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0))?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    execute!(stdout, terminal::LeaveAlternateScreen)?;
    execute!(stdout, cursor::Show)?;
    terminal::disable_raw_mode()
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let _ = cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
