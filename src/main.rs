mod cli;
mod config;
mod db;
mod export;
mod models;
mod prayer_times;
mod tui;
mod utils;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers::{self, ExportOptions};
use config::AppConfig;
use db::migrations::run_migrations;
use db::SqliteKv;
use models::ManualEntry;
use prayer_times::{ensure_current_month, AladhanClient, ScheduleStore};
use utils::time::{Clock, NOW_FORMAT};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    let clock = match cli.now.as_deref() {
        Some(raw) => Clock::starting_at(
            Clock::parse(raw)
                .ok_or_else(|| anyhow!("Invalid --now '{}', expected {}", raw, NOW_FORMAT))?,
        ),
        None => Clock::system(),
    };

    let db_path = match cli.db {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => {
            AppConfig::ensure_data_dir()?;
            AppConfig::db_path()?
        }
    };
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    let mut store = ScheduleStore::open(SqliteKv::new(&conn))?;
    let today = clock.today();

    match cli.command {
        Some(Commands::Times) => handlers::handle_times(&store, &config, clock.now())?,
        Some(Commands::Watch) => handlers::handle_watch(&store, &config, clock)?,
        Some(Commands::Fetch {
            next,
            method,
            offline,
        }) => handlers::handle_fetch(&mut store, &config, today, next, method, offline)?,
        Some(Commands::Sync { offline }) => {
            handlers::handle_sync(&mut store, &config, today, offline)?
        }
        Some(Commands::List { month }) => {
            handlers::handle_list(&store, &config, month.as_deref())?
        }
        Some(Commands::Add {
            date,
            fajr,
            sunrise,
            dhuhr,
            asr,
            maghrib,
            isha,
        }) => handlers::handle_add(
            &mut store,
            ManualEntry {
                date,
                fajr,
                sunrise,
                dhuhr,
                asr,
                maghrib,
                isha,
            },
        )?,
        Some(Commands::Delete { date }) => handlers::handle_delete(&mut store, &date)?,
        Some(Commands::Import { file, year, month }) => {
            handlers::handle_import(&mut store, &file, year, month, today)?
        }
        Some(Commands::Method { code }) => handlers::handle_method(&store, code)?,
        Some(Commands::Export {
            out,
            dates,
            prayers,
            no_at_adhan,
            no_before,
            before,
            tasks,
            appointments,
        }) => handlers::handle_export(
            &store,
            &config,
            ExportOptions {
                out,
                dates,
                prayers,
                no_at_adhan,
                no_before,
                before,
                tasks,
                appointments,
            },
        )?,

        // No subcommand → fill in this month, then the live view
        None => {
            if config.sync.auto_fetch {
                auto_sync(&mut store, &config, today);
            }
            handlers::handle_watch(&store, &config, clock)?;
        }
    }

    Ok(())
}

/// Startup merge. A failure only costs freshness, so it is logged and the
/// stored schedule is used as is.
fn auto_sync(store: &mut ScheduleStore<SqliteKv<'_>>, config: &AppConfig, today: chrono::NaiveDate) {
    let client = AladhanClient::from_config(config);
    let result = store
        .calculation_method()
        .and_then(|method| ensure_current_month(store, &client, today, method));
    match result {
        Ok(0) => {}
        Ok(added) => log::info!("Auto-sync added {} days", added),
        Err(e) => log::warn!("Auto-sync failed, using stored schedule: {:#}", e),
    }
}
