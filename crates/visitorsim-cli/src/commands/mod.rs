pub mod about;
pub mod dashboard;
pub mod results;
pub mod scenarios;
pub mod settings;
pub mod start;

use std::fs::File;
use std::time::Duration;

use visitorsim_core::{ClientConfig, Field, FormError, HttpApi, ResultRow, RunForm, ScenarioId};

/// Backend connection options shared by every subcommand.
pub struct Connection<'a> {
    pub api: &'a str,
    pub timeout_sec: f64,
}

impl Connection<'_> {
    pub fn config(&self) -> ClientConfig {
        let timeout = match Duration::try_from_secs_f64(self.timeout_sec) {
            Ok(t) if !t.is_zero() => t,
            _ => fail(&format!(
                "--timeout-sec must be a positive number, got {}",
                self.timeout_sec
            )),
        };
        ClientConfig {
            base_url: self.api.to_string(),
            timeout,
        }
    }

    /// Build the HTTP client, exiting with a message if the URL is unusable.
    pub fn client(&self) -> HttpApi {
        match HttpApi::new(&self.config()) {
            Ok(api) => api,
            Err(e) => fail(&e.to_string()),
        }
    }
}

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Logging for the dashboard: stderr would tear the TUI, so log to a file or
/// not at all.
pub fn init_tui_logging(log_file: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match log_file {
        Some(path) => match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => fail(&format!("cannot open log file {path}: {e}")),
        },
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

pub fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(&format!("failed to start async runtime: {e}")),
    }
}

pub fn fail(msg: &str) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

/// Parse a scenario argument with the dashboard's form rules.
pub fn parse_scenario(text: &str) -> Result<ScenarioId, FormError> {
    let mut form = RunForm::default();
    form.set(Field::Scenario, text);
    form.scenario()
}

/// Render an optional value, blank for null.
pub fn opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// Elapsed days with enough precision to show sub-day steps.
pub fn fmt_days(days: Option<f64>) -> String {
    days.map(|d| format!("{d:.3}")).unwrap_or_default()
}

pub fn print_results_table(rows: &[ResultRow]) {
    println!(
        "  {:>8}  {:>12}  {:>10}  {:>10}  {:>9}",
        "Scenario", "Elapsed days", "Served", "Refused", "Terminals"
    );
    println!("  {}", "─".repeat(57));
    for r in rows {
        println!(
            "  {:>8}  {:>12}  {:>10}  {:>10}  {:>9}",
            opt(r.scenario_number),
            fmt_days(r.elapsed_days()),
            opt(r.cust_served),
            opt(r.cust_refused),
            opt(r.terminals),
        );
    }
}
