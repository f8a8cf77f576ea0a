//! Dashboard state and its transitions.
//!
//! Design: the state is only ever changed by [`DashboardState::handle_action`]
//! (user intent) and [`DashboardState::handle_event`] (backend responses).
//! Actions return the [`Command`]s the caller must execute; nothing here
//! performs I/O. Every command carries a [`RequestId`] and the state keeps
//! the latest id issued per [`RequestKind`], so a response that was
//! overtaken by a newer request of the same kind is dropped instead of
//! overwriting fresher data.

use std::collections::VecDeque;
use std::fmt;

use crate::error::{ApiError, FormError};
use crate::form::{Field, RunForm};
use crate::model::{ResultRow, RunAck, RunParams, ScenarioId, Settings};

/// Number of error reports retained.
pub const MAX_ERRORS: usize = 16;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Monotonic tag attached to every backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Scenarios,
    Results,
    Settings,
    Run,
}

impl RequestKind {
    const ALL: [RequestKind; 4] = [
        RequestKind::Scenarios,
        RequestKind::Results,
        RequestKind::Settings,
        RequestKind::Run,
    ];

    fn index(self) -> usize {
        match self {
            RequestKind::Scenarios => 0,
            RequestKind::Results => 1,
            RequestKind::Settings => 2,
            RequestKind::Run => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RequestKind::Scenarios => "list scenarios",
            RequestKind::Results => "fetch results",
            RequestKind::Settings => "fetch settings",
            RequestKind::Run => "start run",
        }
    }
}

/// Backend work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchScenarios {
        id: RequestId,
    },
    FetchSettings {
        id: RequestId,
    },
    FetchResults {
        id: RequestId,
        scenario: ScenarioId,
    },
    /// POST the run, then fetch `params.scenario`'s results, then the
    /// scenario list, strictly in that order. Stops after a failed POST.
    StartRun {
        run: RequestId,
        results: RequestId,
        scenarios: RequestId,
        params: RunParams,
    },
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// User intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Start-up: fetch scenario list and default settings.
    Initialize,
    /// Replace a form field's text.
    Edit { field: Field, text: String },
    /// Submit the run form.
    SubmitRun,
    /// Pick entry `index` of the scenario list.
    SelectScenario { index: usize },
    /// Fetch results for the scenario currently in the form.
    FetchSelected,
    RefreshScenarios,
}

/// Backend response, tagged with the request it answers.
#[derive(Debug)]
pub enum Event {
    Scenarios {
        id: RequestId,
        result: Result<Vec<ScenarioId>, ApiError>,
    },
    Settings {
        id: RequestId,
        result: Result<Settings, ApiError>,
    },
    Results {
        id: RequestId,
        scenario: ScenarioId,
        result: Result<Vec<ResultRow>, ApiError>,
    },
    RunAcknowledged {
        id: RequestId,
        result: Result<RunAck, ApiError>,
    },
}

impl Event {
    pub fn id(&self) -> RequestId {
        match self {
            Event::Scenarios { id, .. }
            | Event::Settings { id, .. }
            | Event::Results { id, .. }
            | Event::RunAcknowledged { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Event::Scenarios { .. } => RequestKind::Scenarios,
            Event::Settings { .. } => RequestKind::Settings,
            Event::Results { .. } => RequestKind::Results,
            Event::RunAcknowledged { .. } => RequestKind::Run,
        }
    }
}

// ---------------------------------------------------------------------------
// Error channel
// ---------------------------------------------------------------------------

/// What went wrong, kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSource {
    Request(RequestKind),
    Form(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub source: ErrorSource,
    pub message: String,
}

/// The most recent thing worth telling the operator about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'a> {
    Error(&'a ErrorReport),
    Ack(&'a RunAck),
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ErrorSource::Request(kind) => write!(f, "{} failed: {}", kind.label(), self.message),
            ErrorSource::Form(_) => write!(f, "{}", self.message),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DashboardState {
    form: RunForm,
    scenarios: Vec<ScenarioId>,
    selected: Option<usize>,
    items: Vec<ResultRow>,
    /// Scenario the current `items` were fetched for.
    items_scenario: Option<ScenarioId>,
    last_ack: Option<RunAck>,
    errors: VecDeque<ErrorReport>,
    next_id: u64,
    /// Latest id issued per kind.
    latest: [Option<RequestId>; 4],
    /// Ids issued and not yet answered.
    in_flight: Vec<RequestId>,
    /// Follow-up fetches of the latest run submission.
    run_chain: Option<RunChain>,
    /// Bumped on every ack or error.
    notices: u64,
    ack_notice: u64,
    error_notice: u64,
}

/// Ids reserved for the fetches that follow a run, and the ids they
/// displaced in `latest`.
#[derive(Debug, Clone, Copy)]
struct RunChain {
    results: RequestId,
    scenarios: RequestId,
    superseded: [Option<RequestId>; 2],
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            form: RunForm::default(),
            scenarios: Vec::new(),
            selected: None,
            items: vec![ResultRow::PLACEHOLDER],
            items_scenario: None,
            last_ack: None,
            errors: VecDeque::new(),
            next_id: 1,
            latest: [None; 4],
            in_flight: Vec::new(),
            run_chain: None,
            notices: 0,
            ack_notice: 0,
            error_notice: 0,
        }
    }

    // -- accessors ---------------------------------------------------------

    pub fn form(&self) -> &RunForm {
        &self.form
    }

    pub fn scenarios(&self) -> &[ScenarioId] {
        &self.scenarios
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn items(&self) -> &[ResultRow] {
        &self.items
    }

    pub fn items_scenario(&self) -> Option<ScenarioId> {
        self.items_scenario
    }

    pub fn last_ack(&self) -> Option<&RunAck> {
        self.last_ack.as_ref()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorReport> {
        self.errors.iter()
    }

    pub fn last_error(&self) -> Option<&ErrorReport> {
        self.errors.back()
    }

    /// Whichever of the last error and the last run ack arrived later.
    pub fn latest_notice(&self) -> Option<Notice<'_>> {
        match (self.last_error(), self.last_ack()) {
            (Some(err), Some(_)) if self.error_notice > self.ack_notice => {
                Some(Notice::Error(err))
            }
            (_, Some(ack)) => Some(Notice::Ack(ack)),
            (Some(err), None) => Some(Notice::Error(err)),
            (None, None) => None,
        }
    }

    /// Count of acks and errors seen so far.
    pub fn notice_count(&self) -> u64 {
        self.notices
    }

    /// True while the latest request of `kind` is unanswered.
    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.latest[kind.index()].is_some_and(|id| self.in_flight.contains(&id))
    }

    pub fn is_busy(&self) -> bool {
        RequestKind::ALL.iter().any(|&k| self.is_pending(k))
    }

    // -- transitions -------------------------------------------------------

    pub fn handle_action(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Initialize => vec![
                Command::FetchScenarios {
                    id: self.issue(RequestKind::Scenarios),
                },
                Command::FetchSettings {
                    id: self.issue(RequestKind::Settings),
                },
            ],
            Action::Edit { field, text } => {
                self.form.set(field, text);
                Vec::new()
            }
            Action::SubmitRun => match self.form.validate() {
                Ok(params) => {
                    let superseded = [
                        self.latest[RequestKind::Results.index()],
                        self.latest[RequestKind::Scenarios.index()],
                    ];
                    let run = self.issue(RequestKind::Run);
                    let results = self.issue(RequestKind::Results);
                    let scenarios = self.issue(RequestKind::Scenarios);
                    self.run_chain = Some(RunChain {
                        results,
                        scenarios,
                        superseded,
                    });
                    vec![Command::StartRun {
                        run,
                        results,
                        scenarios,
                        params,
                    }]
                }
                Err(e) => {
                    self.report_form(e);
                    Vec::new()
                }
            },
            Action::SelectScenario { index } => {
                if let Some(id) = self.scenarios.get(index).copied() {
                    self.selected = Some(index);
                    self.form.set(Field::Scenario, id.to_string());
                }
                Vec::new()
            }
            Action::FetchSelected => match self.form.scenario() {
                Ok(scenario) => vec![Command::FetchResults {
                    id: self.issue(RequestKind::Results),
                    scenario,
                }],
                Err(e) => {
                    self.report_form(e);
                    Vec::new()
                }
            },
            Action::RefreshScenarios => vec![Command::FetchScenarios {
                id: self.issue(RequestKind::Scenarios),
            }],
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        let id = event.id();
        let kind = event.kind();
        self.in_flight.retain(|&f| f != id);

        if self.latest[kind.index()] != Some(id) {
            log::debug!("discarding stale {} response {id}", kind.label());
            return;
        }

        match event {
            Event::Scenarios { result, .. } => match result {
                Ok(list) => self.set_scenarios(list),
                Err(e) => self.report_api(kind, &e),
            },
            Event::Settings { result, .. } => match result {
                Ok(settings) => self.form = RunForm::from_settings(&settings),
                Err(e) => self.report_api(kind, &e),
            },
            Event::Results {
                scenario, result, ..
            } => match result {
                Ok(rows) => {
                    self.items = rows;
                    self.items_scenario = Some(scenario);
                }
                Err(e) => self.report_api(kind, &e),
            },
            Event::RunAcknowledged { result, .. } => match result {
                Ok(ack) => {
                    self.last_ack = Some(ack);
                    self.notices += 1;
                    self.ack_notice = self.notices;
                    self.run_chain = None;
                }
                Err(e) => {
                    self.report_api(kind, &e);
                    if let Some(chain) = self.run_chain.take() {
                        self.abandon_chain(chain);
                    }
                }
            },
        }
    }

    // -- internals ---------------------------------------------------------

    fn issue(&mut self, kind: RequestKind) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.latest[kind.index()] = Some(id);
        self.in_flight.push(id);
        id
    }

    /// The chained fetches will never be sent: forget them and let answers to
    /// the requests they displaced count again.
    fn abandon_chain(&mut self, chain: RunChain) {
        self.in_flight.retain(|&f| f != chain.results && f != chain.scenarios);
        for (kind, id, previous) in [
            (RequestKind::Results, chain.results, chain.superseded[0]),
            (RequestKind::Scenarios, chain.scenarios, chain.superseded[1]),
        ] {
            // A newer request of this kind issued meanwhile stays in charge.
            if self.latest[kind.index()] == Some(id) {
                self.latest[kind.index()] = previous;
            }
        }
    }

    fn set_scenarios(&mut self, list: Vec<ScenarioId>) {
        // Keep the highlighted entry on the same scenario if it survived.
        let previous = self.selected.and_then(|i| self.scenarios.get(i).copied());
        self.selected = previous.and_then(|p| list.iter().position(|&s| s == p));
        self.scenarios = list;
    }

    fn report_api(&mut self, kind: RequestKind, err: &ApiError) {
        self.push_error(ErrorReport {
            source: ErrorSource::Request(kind),
            message: err.to_string(),
        });
    }

    fn report_form(&mut self, err: FormError) {
        self.push_error(ErrorReport {
            source: ErrorSource::Form(err.field()),
            message: err.to_string(),
        });
    }

    fn push_error(&mut self, report: ErrorReport) {
        if self.errors.len() == MAX_ERRORS {
            self.errors.pop_front();
        }
        self.errors.push_back(report);
        self.notices += 1;
        self.error_notice = self.notices;
    }
}
