use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "minasati", version, author, about = "Prayer times schedule, live countdown and calendar export")]
pub struct Cli {
    /// Use this database file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Evaluate as if the clock read this local time (YYYY-MM-DDTHH:MM)
    #[arg(long, global = true, value_name = "DATETIME")]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times and countdown to next prayer
    Times,
    /// Live countdown, refreshed every second (q to quit)
    Watch,
    /// Fetch a whole month and replace the stored schedule
    Fetch {
        /// Fetch next month instead of the current one
        #[arg(long)]
        next: bool,
        /// Calculation method code; also saved as the new preference
        #[arg(long)]
        method: Option<u8>,
        /// Compute locally instead of calling the API
        #[arg(long)]
        offline: bool,
    },
    /// Fill in missing days of the current month, keeping edited days
    Sync {
        /// Compute locally instead of calling the API
        #[arg(long)]
        offline: bool,
    },
    /// List stored days
    List {
        /// Only this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
    /// Add or replace one day by hand
    Add {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        fajr: Option<String>,
        /// Defaults to 06:00
        #[arg(long)]
        sunrise: Option<String>,
        #[arg(long, alias = "zuhr")]
        dhuhr: Option<String>,
        #[arg(long)]
        asr: Option<String>,
        #[arg(long)]
        maghrib: Option<String>,
        #[arg(long)]
        isha: Option<String>,
    },
    /// Delete the stored day with this date (YYYY-MM-DD)
    Delete { date: String },
    /// Import a pasted prayer table from a text file
    Import {
        file: PathBuf,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Show or set the calculation method
    Method {
        /// Method code (2, 3, 4, 5, 7, 13)
        code: Option<u8>,
    },
    /// Write prayer times, tasks and appointments to an .ics calendar
    Export {
        /// Output file (defaults to export.file_name in config)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Only export these dates (repeatable)
        #[arg(long = "date", value_name = "DATE")]
        dates: Vec<String>,
        /// Comma-separated prayers, e.g. fajr,maghrib
        #[arg(long, value_delimiter = ',')]
        prayers: Option<Vec<String>>,
        /// No alarm at adhan time
        #[arg(long)]
        no_at_adhan: bool,
        /// No alarm before adhan
        #[arg(long)]
        no_before: bool,
        /// Minutes before adhan for the early alarm (1-60)
        #[arg(long)]
        before: Option<u32>,
        /// JSON file with tasks
        #[arg(long)]
        tasks: Option<PathBuf>,
        /// JSON file with appointments
        #[arg(long)]
        appointments: Option<PathBuf>,
    },
}
