mod calc;
mod cmd;
mod data;
mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daymark", about = "mark days on personal calendars")]
struct Cli {
    /// Path to the data directory containing config and data files (default: ./config)
    #[arg(long, default_value = "./config")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize data files with a default calendar
    Init,
    /// List all calendars
    Calendars,
    /// Print a calendar's month grid
    Show {
        /// Calendar id (see `calendars`)
        #[arg(short, long)]
        calendar: u64,
        /// Month to show, YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Mark or unmark a single day
    Toggle {
        /// Calendar id (see `calendars`)
        #[arg(short, long)]
        calendar: u64,
        /// Day to toggle, YYYY-MM-DD
        #[arg(short, long)]
        date: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Resolve data_dir to an absolute path so file I/O works regardless of
    // future directory changes within the process.
    let data_dir = if cli.data_dir.is_absolute() {
        cli.data_dir.clone()
    } else {
        std::env::current_dir()?.join(&cli.data_dir)
    };
    data::persistence::set_data_dir(data_dir.clone());

    // Auto-init when the data directory is missing or empty and the user did not
    // explicitly invoke the `init` subcommand.
    let is_init_command = matches!(cli.command, Some(Commands::Init));
    if !is_init_command && dir_needs_init(&data_dir) {
        eprintln!(
            "Data directory '{}' is missing or empty — running init...",
            data_dir.display()
        );
        cmd::init::run()?;
    }

    match cli.command {
        None => cmd::root::run(),
        Some(Commands::Init) => cmd::init::run(),
        Some(Commands::Calendars) => cmd::calendars::run(),
        Some(Commands::Show { calendar, month }) => cmd::show::run(calendar, month.as_deref()),
        Some(Commands::Toggle { calendar, date }) => cmd::toggle::run(calendar, &date),
    }
}

/// Returns true when `dir` does not exist or exists but contains no files.
fn dir_needs_init(dir: &std::path::Path) -> bool {
    if !dir.exists() {
        return true;
    }
    dir.read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
