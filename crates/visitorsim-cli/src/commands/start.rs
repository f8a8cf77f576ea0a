use visitorsim_core::{Action, DashboardState, Field, SimulationApi, dispatch};

use super::Connection;

pub struct StartArgs<'a> {
    pub scenario: &'a str,
    pub terminals: &'a str,
    pub visitors: &'a str,
    /// Fetch results and the scenario list after the run is accepted.
    pub refresh: bool,
}

pub fn run(conn: &Connection, args: StartArgs<'_>) {
    let api = conn.client();
    let rt = super::runtime();

    let mut state = DashboardState::new();
    for (field, text) in [
        (Field::Scenario, args.scenario),
        (Field::Terminals, args.terminals),
        (Field::Visitors, args.visitors),
    ] {
        state.handle_action(Action::Edit {
            field,
            text: text.to_string(),
        });
    }

    // Same validation the dashboard applies before anything is sent.
    let params = match state.form().validate() {
        Ok(p) => p,
        Err(e) => super::fail(&e.to_string()),
    };

    println!(
        "Starting scenario {} with {} terminals, visitor pace {} on {}",
        params.scenario,
        params.terminals,
        params.visitors,
        api.base_url()
    );

    if !args.refresh {
        match rt.block_on(api.start_run(params)) {
            Ok(ack) => println!("Backend: {}", ack.message.trim()),
            Err(e) => super::fail(&e.to_string()),
        }
        return;
    }

    rt.block_on(dispatch(&api, &mut state, Action::SubmitRun));

    if let Some(ack) = state.last_ack() {
        println!("Backend: {}", ack.message.trim());
    }

    let errors: Vec<String> = state.errors().map(|e| e.to_string()).collect();
    if state.last_ack().is_none() {
        // The POST itself failed; nothing else was attempted.
        super::fail(&errors.join("; "));
    }

    println!();
    println!("Scenario {}:", params.scenario);
    super::print_results_table(state.items());

    println!();
    let list: Vec<String> = state.scenarios().iter().map(|s| s.to_string()).collect();
    println!("Scenarios: {}", list.join(", "));

    if !errors.is_empty() {
        for e in &errors {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}
