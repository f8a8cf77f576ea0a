//! TUI application state and event loop.
//!
//! Design: all dashboard data lives in a [`DashboardState`]; key presses
//! become [`Action`]s, and the [`Command`]s they produce run as tasks on the
//! tokio runtime so the UI never blocks. Answers come back over a channel
//! that the loop drains every frame.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{ListState, TableState};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use visitorsim_core::{
    Action, Command, DashboardState, Event, Field, HttpApi, ResultsSnapshot, default_export_path,
    run_command,
};

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Scenario,
    Terminals,
    Visitors,
    ScenarioList,
    Results,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::Scenario => Self::Terminals,
            Self::Terminals => Self::Visitors,
            Self::Visitors => Self::ScenarioList,
            Self::ScenarioList => Self::Results,
            Self::Results => Self::Scenario,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Scenario => Self::Results,
            Self::Terminals => Self::Scenario,
            Self::Visitors => Self::Terminals,
            Self::ScenarioList => Self::Visitors,
            Self::Results => Self::ScenarioList,
        }
    }

    /// The form field this focus edits, if any.
    pub fn field(self) -> Option<Field> {
        match self {
            Self::Scenario => Some(Field::Scenario),
            Self::Terminals => Some(Field::Terminals),
            Self::Visitors => Some(Field::Visitors),
            Self::ScenarioList | Self::Results => None,
        }
    }
}

/// Step a list index by `delta`, clamped to `[0, len)`. `None` when empty.
pub fn step_index(current: Option<usize>, delta: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let next = match current {
        Some(i) => i.saturating_add_signed(delta),
        None => 0,
    };
    Some(next.min(len - 1))
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    api: Arc<HttpApi>,
    rt: Runtime,
    state: DashboardState,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
    focus: Focus,
    running: bool,
    show_about: bool,
    list_state: ListState,
    results_state: TableState,
    export_dir: PathBuf,
    last_export: Option<PathBuf>,
    /// Last export error to surface in the status bar.
    export_error: Option<String>,
    /// `notice_count()` at the time of the last export attempt.
    export_notice: Option<u64>,
}

impl App {
    pub fn new(api: HttpApi, rt: Runtime) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api: Arc::new(api),
            rt,
            state: DashboardState::new(),
            events_tx,
            events_rx,
            focus: Focus::default(),
            running: true,
            show_about: false,
            list_state: ListState::default(),
            results_state: TableState::default(),
            export_dir: PathBuf::from("."),
            last_export: None,
            export_error: None,
            export_notice: None,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before the panic message is printed.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        if let Some(path) = &self.last_export {
            println!("Results exported to {}", path.display());
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        self.dispatch(Action::Initialize);

        while self.running {
            self.drain_events();
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(Duration::from_millis(50))? {
                if let TermEvent::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.show_about {
            // Any key closes the overlay.
            self.show_about = false;
            return;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Char('a') => self.show_about = true,
            KeyCode::Char('r') => self.dispatch(Action::RefreshScenarios),
            KeyCode::Char('s') => self.export_results(),
            KeyCode::Up | KeyCode::Char('k') => self.move_vertical(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_vertical(1),
            KeyCode::Enter => match self.focus {
                Focus::Scenario | Focus::Terminals | Focus::Visitors => {
                    self.dispatch(Action::SubmitRun)
                }
                Focus::ScenarioList => self.dispatch(Action::FetchSelected),
                Focus::Results => {}
            },
            KeyCode::Backspace => {
                if let Some(field) = self.focus.field() {
                    let mut text = self.state.form().get(field).to_string();
                    text.pop();
                    self.dispatch(Action::Edit { field, text });
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.focus.field() {
                    if field.accepts(c) {
                        let mut text = self.state.form().get(field).to_string();
                        text.push(c);
                        self.dispatch(Action::Edit { field, text });
                    }
                }
            }
            _ => {}
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        match self.focus {
            Focus::ScenarioList => {
                let len = self.state.scenarios().len();
                if let Some(index) = step_index(self.state.selected(), delta, len) {
                    self.dispatch(Action::SelectScenario { index });
                }
            }
            Focus::Results => {
                let len = self.state.items().len();
                let next = step_index(self.results_state.selected(), delta, len);
                self.results_state.select(next);
            }
            _ => {
                self.focus = if delta < 0 {
                    self.focus.prev()
                } else {
                    self.focus.next()
                };
            }
        }
    }

    /// Feed an action to the state and launch whatever it asks for.
    fn dispatch(&mut self, action: Action) {
        for command in self.state.handle_action(action) {
            self.spawn(command);
        }
        self.list_state.select(self.state.selected());
    }

    fn spawn(&self, command: Command) {
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        self.rt.spawn(async move {
            run_command(api.as_ref(), command, &tx).await;
        });
    }

    fn drain_events(&mut self) {
        let mut got_results = false;
        while let Ok(event) = self.events_rx.try_recv() {
            got_results |= matches!(event, Event::Results { .. });
            self.state.handle_event(event);
        }
        self.list_state.select(self.state.selected());
        if got_results {
            self.results_state.select(None);
        }
    }

    fn export_results(&mut self) {
        let snapshot = ResultsSnapshot::new(
            self.api.base_url(),
            self.state.items_scenario(),
            self.state.items(),
        );
        let path = default_export_path(&self.export_dir, snapshot.exported_at_unix);
        match snapshot.write_to(&path) {
            Ok(()) => {
                self.last_export = Some(path);
                self.export_error = None;
            }
            Err(e) => self.export_error = Some(e.to_string()),
        }
        self.export_notice = Some(self.state.notice_count());
    }

    // -- accessors for rendering ---------------------------------------------

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut DashboardState {
        &mut self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn api_url(&self) -> &str {
        self.api.base_url()
    }

    pub fn show_about(&self) -> bool {
        self.show_about
    }

    pub fn list_state(&self) -> &ListState {
        &self.list_state
    }

    pub fn results_state(&self) -> &TableState {
        &self.results_state
    }

    pub fn last_export(&self) -> Option<&Path> {
        self.last_export.as_deref()
    }

    pub fn export_error(&self) -> Option<&str> {
        self.export_error.as_deref()
    }

    /// True when no ack or error arrived since the last export attempt.
    pub fn export_is_latest(&self) -> bool {
        self.export_notice == Some(self.state.notice_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visitorsim_core::{ClientConfig, RequestKind, ScenarioId};

    fn app() -> App {
        let api = HttpApi::new(&ClientConfig::default()).unwrap();
        App::new(api, Runtime::new().unwrap())
    }

    #[test]
    fn focus_cycles_through_all_panes() {
        let mut f = Focus::default();
        let mut seen = vec![f];
        for _ in 0..4 {
            f = f.next();
            seen.push(f);
        }
        assert_eq!(f.next(), Focus::Scenario);
        assert_eq!(seen.len(), 5);
        for s in seen {
            assert_eq!(s.next().prev(), s);
        }
    }

    #[test]
    fn focus_field_mapping() {
        assert_eq!(Focus::Terminals.field(), Some(Field::Terminals));
        assert_eq!(Focus::ScenarioList.field(), None);
        assert_eq!(Focus::Results.field(), None);
    }

    #[test]
    fn step_index_clamps() {
        assert_eq!(step_index(None, 1, 0), None);
        assert_eq!(step_index(None, 1, 3), Some(0));
        assert_eq!(step_index(Some(0), -1, 3), Some(0));
        assert_eq!(step_index(Some(2), 1, 3), Some(2));
        assert_eq!(step_index(Some(1), 1, 3), Some(2));
    }

    #[test]
    fn typing_edits_focused_field() {
        let mut app = app();
        app.handle_key(KeyCode::Tab); // terminals
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Char('7'));
        assert_eq!(app.state().form().terminals, "7");
    }

    #[test]
    fn non_numeric_keys_do_not_edit() {
        let mut app = app();
        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.state().form().scenario, "-1");
    }

    #[test]
    fn about_overlay_swallows_next_key() {
        let mut app = app();
        app.handle_key(KeyCode::Char('a'));
        assert!(app.show_about());
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.show_about());
        assert!(app.running);
    }

    #[test]
    fn export_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.export_dir = dir.path().to_path_buf();
        app.handle_key(KeyCode::Char('s'));
        let path = app.last_export().unwrap().to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
        assert!(app.export_error().is_none());
    }

    #[test]
    fn r_refreshes_scenario_list() {
        let mut app = app();
        assert!(!app.state().is_pending(RequestKind::Scenarios));
        app.handle_key(KeyCode::Char('r'));
        assert!(app.state().is_pending(RequestKind::Scenarios));
        assert!(!app.state().is_pending(RequestKind::Results));
    }

    #[test]
    fn enter_on_list_fetches_selected_scenario() {
        let mut app = app();
        let Command::FetchScenarios { id } = app.state.handle_action(Action::RefreshScenarios)[0]
        else {
            panic!("expected FetchScenarios");
        };
        app.state.handle_event(Event::Scenarios {
            id,
            result: Ok(vec![ScenarioId(3), ScenarioId(7)]),
        });
        app.focus = Focus::ScenarioList;
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.list_state().selected(), Some(1));
        assert_eq!(app.state().form().scenario, "7");

        app.handle_key(KeyCode::Enter);
        assert!(app.state().is_pending(RequestKind::Results));
        assert!(!app.state().is_pending(RequestKind::Run));
    }

    #[test]
    fn enter_on_form_submits_run() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        assert!(app.state().is_pending(RequestKind::Run));
    }

    #[test]
    fn quit_keys_stop_loop() {
        let mut app = app();
        app.handle_key(KeyCode::Esc);
        assert!(!app.running);
    }
}
