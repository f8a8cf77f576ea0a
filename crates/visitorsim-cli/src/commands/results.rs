use std::path::Path;

use visitorsim_core::{ResultsSnapshot, SimulationApi};

use super::Connection;

pub fn run(conn: &Connection, scenario: &str, format: &str, output: Option<&str>) {
    let scenario = match super::parse_scenario(scenario) {
        Ok(s) => s,
        Err(e) => super::fail(&e.to_string()),
    };
    let api = conn.client();
    let rt = super::runtime();

    let rows = match rt.block_on(api.get_results(scenario)) {
        Ok(rows) => rows,
        Err(e) => super::fail(&e.to_string()),
    };
    let snapshot = ResultsSnapshot::new(api.base_url(), Some(scenario), &rows);

    if format == "json" {
        match snapshot.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => super::fail(&e.to_string()),
        }
    } else {
        println!("Scenario {scenario}: {} rows", rows.len());
        println!();
        super::print_results_table(&rows);
    }

    if let Some(path) = output {
        if let Err(e) = snapshot.write_to(Path::new(path)) {
            super::fail(&e.to_string());
        }
        eprintln!("Results written to {path}");
    }
}
