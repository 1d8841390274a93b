mod audio;
mod controller;
mod error;
mod logging;
mod model;
mod settings;
mod view;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::{AppView, Screen};
use audio::{AudioEngine, RodioEngine, SilentEngine};
use controller::{AppController, PlaybackController};
use model::calendar::nz_now;
use model::catalog::CHAPTER_COUNT;
use model::quran_client::HttpSource;
use model::{AppModel, QuranClient};
use settings::{JsonFileBackend, Preferences};

/// Terminal Quran reader and recitation player
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding preferences and favorites
    #[arg(long, default_value = ".cache")]
    data_dir: PathBuf,

    /// Chapter to open on start
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..=i64::from(CHAPTER_COUNT))
    )]
    chapter: u16,

    /// Start with recitation audio disabled
    #[arg(long)]
    no_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging first
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== recite-rs starting ===");

    // Preferences and favorites live in the data directory
    let prefs = Preferences::open(JsonFileBackend::in_dir(&args.data_dir));

    let client = QuranClient::new(Arc::new(HttpSource::new()?));
    let app_model = AppModel::new(prefs.clone());

    // Channel for engine callbacks (loaded, ended, failed, progress ticks)
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Fall back to a silent engine when there is no output device
    let engine: Box<dyn AudioEngine> = if args.no_audio {
        Box::new(SilentEngine::new("audio disabled on the command line"))
    } else {
        match RodioEngine::new(event_tx.clone()) {
            Ok(engine) => Box::new(engine),
            Err(e) => {
                tracing::warn!(error = %e, "Audio output unavailable, continuing without sound");
                app_model
                    .set_error(format!("{e}. Reading still works; recitation is silent."))
                    .await;
                Box::new(SilentEngine::new(e.to_string()))
            }
        }
    };
    let mut player = PlaybackController::new(engine, event_tx, prefs);
    if args.no_audio {
        // Only for this run, the stored preference is untouched
        player.disable_audio_for_session();
    }

    let model = Arc::new(Mutex::new(app_model));
    let controller = AppController::new(model.clone(), Arc::new(Mutex::new(player)), client);
    controller.start_player_event_listener(event_rx);

    // Load the chapter list and the first chapter in the background
    let controller_for_init = controller.clone();
    let initial_chapter = args.chapter;
    tokio::spawn(async move {
        controller_for_init.load_chapters().await;
        controller_for_init.open_chapter_number(initial_chapter).await;
    });

    tracing::info!("Starting TUI...");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller.clone()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Release the audio resource before exiting
    controller.stop_playback().await;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("recite-rs shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let playback = controller.playback_info().await;
        let (ui_state, content_state, display, favorites, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.get_display().await,
                model_guard.favorites().await,
                model_guard.should_quit().await,
            )
        };

        let screen = Screen {
            playback: &playback,
            ui_state: &ui_state,
            content_state: &content_state,
            display: &display,
            favorites: &favorites,
            now: nz_now(),
        };
        terminal.draw(|f| AppView::render(f, &screen))?;

        // Poll for input with a short timeout so playback progress keeps redrawing
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
