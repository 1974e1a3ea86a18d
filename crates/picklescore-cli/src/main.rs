// Pickleball session scorer entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database slot
// 4. Restore the saved session or seed a fresh roster
// 5. Read commands from stdin until `quit` or EOF

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use tracing::{error, info};

use picklescore_cli::app::{AppState, Reply};
use picklescore_cli::command::parse_command;
use picklescore_core::config;
use picklescore_core::db::Database;
use picklescore_core::seed::CsvSeed;
use picklescore_core::store::{LoadSource, SessionStore, StoreOptions};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("picklescore starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: db={}, slot={}, selection={:?}",
        config.db_path, config.slot_key, config.roster_selection
    );

    // 3. Open database slot
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let slot = Database::open(&config.db_path)
        .context("failed to open database")?
        .slot(config.slot_key.clone());
    info!("Database opened at {}", config.db_path);

    // 4. Restore or seed
    let mut store = SessionStore::new(slot, StoreOptions::from(&config));
    let source = store.initialize(&CsvSeed::new(config.seed_roster_path.clone()));
    let mut app = AppState::new(store, &config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match source {
        LoadSource::Stored => writeln!(out, "restored saved session")?,
        LoadSource::Seeded => writeln!(out, "new session from {}", config.seed_roster_path)?,
        LoadSource::DefaultRoster => writeln!(out, "new session with the built-in roster")?,
    }
    writeln!(out, "{}", app.render_players())?;
    writeln!(out, "type `help` for commands")?;

    // 5. Command loop
    let stdin = io::stdin();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!("failed to read stdin: {}", e);
                break;
            }
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(cmd) => match app.handle_user_command(cmd) {
                Reply::Text(text) => writeln!(out, "{text}")?,
                Reply::Quit => break,
            },
            Err(e) => writeln!(out, "{e}")?,
        }
    }

    info!("picklescore shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the shell).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("picklescore.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("picklescore=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
