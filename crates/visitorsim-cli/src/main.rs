//! CLI for visitorsim — operator console for the visitor simulation backend.

mod commands;
mod tui;

use clap::{Parser, Subcommand};

use visitorsim_core::DEFAULT_BASE_URL;

#[derive(Parser)]
#[command(name = "visitorsim")]
#[command(about = "visitorsim — configure, run and inspect visitor simulations")]
#[command(version = visitorsim_core::VERSION)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    api: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_sec: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (TUI): run form, scenario picker, results table and chart
    Dashboard {
        /// Write log output to this file (logging is off otherwise while the TUI is up)
        #[arg(long)]
        log_file: Option<String>,
    },

    /// List scenarios known to the backend
    Scenarios,

    /// Show the time series of one scenario
    Results {
        /// Scenario number
        #[arg(long, allow_hyphen_values = true)]
        scenario: String,

        /// Output format
        #[arg(long, default_value = "table", value_parser = ["table", "json"])]
        format: String,

        /// Also write a JSON snapshot to this path
        #[arg(long)]
        output: Option<String>,
    },

    /// Show the backend's default run settings
    Settings,

    /// Start a simulation run, then show its results and the scenario list
    Start {
        /// Scenario number
        #[arg(long, allow_hyphen_values = true)]
        scenario: String,

        /// Number of terminals
        #[arg(long)]
        terminals: String,

        /// Visitor arrival pace
        #[arg(long)]
        visitors: String,

        /// Only post the run; skip the results and scenario refresh
        #[arg(long)]
        no_refresh: bool,
    },

    /// About this tool
    About,
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Dashboard { log_file } => commands::init_tui_logging(log_file.as_deref()),
        _ => commands::init_logging(),
    }

    let conn = commands::Connection {
        api: &cli.api,
        timeout_sec: cli.timeout_sec,
    };

    match cli.command {
        Commands::Dashboard { .. } => commands::dashboard::run(&conn),
        Commands::Scenarios => commands::scenarios::run(&conn),
        Commands::Results {
            scenario,
            format,
            output,
        } => commands::results::run(&conn, &scenario, &format, output.as_deref()),
        Commands::Settings => commands::settings::run(&conn),
        Commands::Start {
            scenario,
            terminals,
            visitors,
            no_refresh,
        } => commands::start::run(
            &conn,
            commands::start::StartArgs {
                scenario: &scenario,
                terminals: &terminals,
                visitors: &visitors,
                refresh: !no_refresh,
            },
        ),
        Commands::About => commands::about::run(),
    }
}
