mod app;

use app::FlashcardsApp;
use clap::Parser;
use danish_flashcards::cli::{Cli, Command};
use danish_flashcards::config::{Config, user_config_path};
use danish_flashcards::content;
use danish_flashcards::database::{ProgressStore, SqliteProgressStore, db};
use danish_flashcards::export::json;
use danish_flashcards::models::sm2;
use eframe::egui;
use eyre::{Context, Result, eyre};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let conn = db::open_database(&config.database_path).context("Failed to open database")?;
    if config.seed_sample_deck {
        content::seed_if_empty(&conn).context("Failed to create sample deck")?;
    }

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(&config, conn),
        Command::Due { deck } => print_due(conn, deck.as_deref()),
        Command::NextDay => {
            let now = db::advance_day(&conn)?;
            println!("Today is now {}", db::format_day(now));
            Ok(())
        }
        Command::Import { path } => {
            let deck = json::import_json(&path)?;
            db::import_deck(&deck, &conn)?;
            println!("Imported '{}' ({} cards)", deck.name, deck.items.len());
            Ok(())
        }
        Command::Export { deck, path } => {
            let deck = db::load_deck(&deck, &conn)?;
            json::export_json_to_path(&deck, &path)?;
            println!("Exported '{}' to {}", deck.name, path.display());
            Ok(())
        }
        Command::ExportProgress { path } => export_progress(conn, &path),
        Command::ImportProgress { path } => import_progress(conn, &path),
        Command::InitConfig { path, force } => init_config(&config, path, force),
    }
}

fn run_gui(config: &Config, conn: Connection) -> Result<()> {
    info!("Starting GUI");
    let grading_mode = config.grading_mode;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height]),
        ..Default::default()
    };
    eframe::run_native(
        "Danish Flashcards",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(FlashcardsApp::new(
                Arc::new(Mutex::new(conn)),
                grading_mode,
            )))
        }),
    )
    .map_err(|e| eyre!("GUI failed: {}", e))
}

fn print_due(conn: Connection, deck_filter: Option<&str>) -> Result<()> {
    let now = db::current_time(&conn)?;
    let decks = match deck_filter {
        Some(name) => vec![db::load_deck(name, &conn)?],
        None => db::load_all_decks(&conn)?,
    };
    let store = SqliteProgressStore::new(Arc::new(Mutex::new(conn)));
    let progress = store.load_all()?;

    for deck in &decks {
        let due: Vec<_> = sm2::select_due(&deck.items, &progress, now)
            .into_iter()
            .cloned()
            .collect();
        println!("{} ({} due on {})", deck.name, due.len(), db::format_day(now));
        for item in sm2::sort_by_due_at(&due, &progress, now) {
            match progress.get(&item.id) {
                Some(record) => println!(
                    "  {:<20} {:<20} interval {} ease {:.2}",
                    item.front,
                    item.back,
                    sm2::format_interval(record.interval),
                    record.ease_factor
                ),
                None => println!("  {:<20} {:<20} new", item.front, item.back),
            }
        }
    }
    Ok(())
}

fn export_progress(conn: Connection, path: &Path) -> Result<()> {
    let store = SqliteProgressStore::new(Arc::new(Mutex::new(conn)));
    let progress = store.load_all()?;
    json::export_progress_to_path(&progress, path)?;
    println!("Exported {} progress records to {}", progress.len(), path.display());
    Ok(())
}

fn import_progress(conn: Connection, path: &Path) -> Result<()> {
    let progress = json::import_progress(path)
        .with_context(|| format!("Failed to read progress from {}", path.display()))?;
    let store = SqliteProgressStore::new(Arc::new(Mutex::new(conn)));
    for record in progress.values() {
        store.put(record)?;
    }
    info!("Imported {} progress records from {}", progress.len(), path.display());
    println!("Imported {} progress records", progress.len());
    Ok(())
}

fn init_config(config: &Config, path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path
        .or_else(user_config_path)
        .ok_or_else(|| eyre!("No config directory on this platform; pass a path"))?;
    if path.exists() && !force {
        return Err(eyre!("{} already exists (use --force to replace it)", path.display()));
    }
    config.save(&path).context("Failed to write configuration")?;
    println!("Wrote configuration to {}", path.display());
    Ok(())
}
