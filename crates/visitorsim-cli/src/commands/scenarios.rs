use visitorsim_core::SimulationApi;

use super::Connection;

pub fn run(conn: &Connection) {
    let api = conn.client();
    let rt = super::runtime();

    match rt.block_on(api.list_scenarios()) {
        Ok(ids) if ids.is_empty() => println!("No scenarios on {}", api.base_url()),
        Ok(ids) => {
            println!("{} scenarios on {}", ids.len(), api.base_url());
            for (i, id) in ids.iter().enumerate() {
                println!("  [{i:>3}]  {id}");
            }
        }
        Err(e) => super::fail(&e.to_string()),
    }
}
