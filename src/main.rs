mod app;
mod config;
mod glx;
mod help;
mod page;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use glx::snapshot::Snapshot;
use glx::table::COLUMNS;
use glx::{run_blocking, shutdown_runtime, Source};
use page::GlxPage;

#[derive(Parser, Debug)]
#[command(name = "glxview")]
#[command(version = "0.1.0")]
#[command(about = "Inspect the GLX extension and frame buffer configurations of an X server")]
struct Args {
    /// X display to query (overrides config and $DISPLAY)
    #[arg(short, long)]
    display: Option<String>,

    /// X screen to query
    #[arg(short, long)]
    screen: Option<u32>,

    /// Read from a snapshot file instead of the X server
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Print the GLX page as JSON
    #[arg(short, long)]
    json: bool,

    /// Print the frame buffer configuration table as text
    #[arg(short, long)]
    table: bool,

    /// Capture the source into a snapshot file
    #[arg(long, value_name = "FILE")]
    dump: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for --json/--table
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Built by hand so exit does not block on a query that timed out
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(run(args));
    shutdown_runtime(rt);
    result
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::load()?;
    if args.display.is_some() {
        config.display = args.display.clone();
    }
    if args.screen.is_some() {
        config.screen = args.screen;
    }

    let source = match &args.snapshot {
        Some(path) => Source::Snapshot(path.clone()),
        None => Source::Live {
            display: config.display.clone(),
            screen: config.screen,
            glxinfo: config.glxinfo_path.clone(),
        },
    };

    // Handle CLI-only commands
    if let Some(path) = args.dump {
        return dump_snapshot(&config, source, path).await;
    }

    if args.json {
        return print_json(&config, source).await;
    }

    if args.table {
        return print_table(&config, source).await;
    }

    run_tui(config, source).await
}

/// Build the page and probe its strings, the way the TUI does on first draw.
async fn load_page(config: &AppConfig, source: Source) -> Result<GlxPage> {
    run_blocking(config.query_timeout(), move || {
        let query = source.open()?;
        let mut page = GlxPage::build(&*query);
        page.probe_info(&*query);
        Ok(page)
    })
    .await
}

async fn print_json(config: &AppConfig, source: Source) -> Result<()> {
    let page = load_page(config, source).await?;

    let output = serde_json::json!({
        "page": page,
        "columns": COLUMNS,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn print_table(config: &AppConfig, source: Source) -> Result<()> {
    let page = load_page(config, source).await?;

    match page.fbconfigs() {
        Some(table) => {
            print!("{}", table.render_text());
            Ok(())
        }
        None => {
            eprintln!("{}", page.error().unwrap_or_default());
            std::process::exit(1);
        }
    }
}

async fn dump_snapshot(config: &AppConfig, source: Source, path: PathBuf) -> Result<()> {
    let snapshot = run_blocking(config.query_timeout(), move || {
        let query = source.open()?;
        Snapshot::capture(&*query)
    })
    .await?;

    snapshot
        .save(&path)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;

    println!(
        "Saved {} ({} strings, {} frame buffer configurations)",
        path.display(),
        snapshot.strings.len(),
        snapshot.fbconfigs.as_ref().map(|c| c.len()).unwrap_or(0),
    );
    Ok(())
}

async fn run_tui(config: AppConfig, source: Source) -> Result<()> {
    ui::init_theme(config.theme_file.as_deref());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let result = match App::new(config, source).await {
        Ok(mut app) => run_app(&mut terminal, &mut app).await,
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            if let Err(e) = app.handle_key(key).await {
                                app.status_message = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        // Status expiry and the deferred string probe
        let _ = app.tick().await;
    }
}
