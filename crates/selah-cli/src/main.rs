use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "selah", version, about = "Selah reminder engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reminder check against the current minute
    Check,
    /// Keep checking on an interval until interrupted
    Watch {
        /// Seconds between checks (defaults to the configured value)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Print every reminder with its state for today
    Status,
    /// Fixed category reminders
    Category {
        #[command(subcommand)]
        action: commands::category::CategoryAction,
    },
    /// Per-note reminders
    Note {
        #[command(subcommand)]
        action: commands::note::NoteAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check => commands::check::run_check(),
        Commands::Watch { interval_secs } => commands::check::run_watch(interval_secs),
        Commands::Status => commands::check::run_status(),
        Commands::Category { action } => commands::category::run(action),
        Commands::Note { action } => commands::note::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
