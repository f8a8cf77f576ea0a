use visitorsim_core::SimulationApi;

use super::Connection;

pub fn run(conn: &Connection) {
    let api = conn.client();
    let rt = super::runtime();

    let settings = match rt.block_on(api.get_settings()) {
        Ok(s) => s,
        Err(e) => super::fail(&e.to_string()),
    };

    println!("Default settings from {}", api.base_url());
    println!("  Scenario:      {}", settings.scenario_number);
    println!("  Terminals:     {}", settings.terminal_quantity);
    println!("  Visitor pace:  {}", settings.pace_of_visitors);
}
