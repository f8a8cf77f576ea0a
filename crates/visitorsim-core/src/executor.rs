//! Runs [`Command`]s against a [`SimulationApi`] and reports each answer as
//! an [`Event`].

use tokio::sync::mpsc::{self, UnboundedSender};

use crate::client::SimulationApi;
use crate::error::ApiError;
use crate::state::{Action, Command, DashboardState, Event, RequestKind};

/// Execute one command, sending one event per backend call made.
///
/// `StartRun` makes up to three calls, strictly sequential: the POST, then
/// the results fetch, then the scenario list. A failed POST ends the chain;
/// a failed results fetch does not.
pub async fn run_command<A: SimulationApi>(
    api: &A,
    command: Command,
    events: &UnboundedSender<Event>,
) {
    match command {
        Command::FetchScenarios { id } => {
            let result = api.list_scenarios().await;
            log_failure(RequestKind::Scenarios, &result);
            emit(events, Event::Scenarios { id, result });
        }
        Command::FetchSettings { id } => {
            let result = api.get_settings().await;
            log_failure(RequestKind::Settings, &result);
            emit(events, Event::Settings { id, result });
        }
        Command::FetchResults { id, scenario } => {
            let result = api.get_results(scenario).await;
            log_failure(RequestKind::Results, &result);
            emit(
                events,
                Event::Results {
                    id,
                    scenario,
                    result,
                },
            );
        }
        Command::StartRun {
            run,
            results,
            scenarios,
            params,
        } => {
            let ack = api.start_run(params).await;
            log_failure(RequestKind::Run, &ack);
            let started = ack.is_ok();
            emit(events, Event::RunAcknowledged { id: run, result: ack });
            if !started {
                return;
            }

            let rows = api.get_results(params.scenario).await;
            log_failure(RequestKind::Results, &rows);
            emit(
                events,
                Event::Results {
                    id: results,
                    scenario: params.scenario,
                    result: rows,
                },
            );

            let list = api.list_scenarios().await;
            log_failure(RequestKind::Scenarios, &list);
            emit(
                events,
                Event::Scenarios {
                    id: scenarios,
                    result: list,
                },
            );
        }
    }
}

/// Apply `action` to `state`, run every resulting command to completion in
/// order, and fold the answers back into `state`.
///
/// This is the non-interactive path used by one-shot CLI commands.
pub async fn dispatch<A: SimulationApi>(api: &A, state: &mut DashboardState, action: Action) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    for command in state.handle_action(action) {
        run_command(api, command, &tx).await;
    }
    drop(tx);
    while let Some(event) = rx.recv().await {
        state.handle_event(event);
    }
}

fn emit(events: &UnboundedSender<Event>, event: Event) {
    if events.send(event).is_err() {
        log::debug!("event receiver closed; dropping response");
    }
}

fn log_failure<T>(kind: RequestKind, result: &Result<T, ApiError>) {
    if let Err(e) = result {
        log::warn!("{} failed: {e}", kind.label());
    }
}
