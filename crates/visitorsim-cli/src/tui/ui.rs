//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────────────────┐
//! │  visitorsim   api: http://localhost:22080/api   ⟳        │
//! ├───────────────────┬──────────────────────────────────────┤
//! │  Run              │  Results · scenario 3                │
//! │  Scenario   3     │  Scen  Days   Served Refused Term    │
//! │  Terminals  10    │  3     1.000  40     2       10      │
//! │  Pace       0.25  ├──────────────────────────────────────┤
//! ├───────────────────┤  ╭ served / refused over days        │
//! │  Scenarios        │  │      ⣀⣠⠤⠒⠊                       │
//! │  ▸ 3              │  │  ⣀⠤⠒                              │
//! │    7              │  ╰─────────────────────────────────  │
//! ├───────────────────┴──────────────────────────────────────┤
//! │  run accepted: Model started                             │
//! ├──────────────────────────────────────────────────────────┤
//! │  tab: focus  enter: run/fetch  r: refresh  s: export     │
//! └──────────────────────────────────────────────────────────┘

use super::app::{App, Focus};
use crate::commands::{fmt_days, opt};
use ratatui::{prelude::*, widgets::*};
use visitorsim_core::{ABOUT, Field, Notice, ServiceChart};

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(12),   // main
            Constraint::Length(3), // status
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_main(f, rows[1], app);
    draw_status(f, rows[2], app);
    draw_keys(f, rows[3], app);

    if app.show_about() {
        draw_about(f, f.area());
    }
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let spin = if state.is_busy() { " ⟳" } else { "" };
    let showing = match state.items_scenario() {
        Some(s) => format!("scenario {s}"),
        None => "no results yet".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" visitorsim ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("  api: "),
            Span::styled(app.api_url(), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("  {showing}  {} rows{spin} ", state.items().len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(cols[0]);

    draw_form(f, left[0], app);
    draw_scenarios(f, left[1], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(cols[1]);

    draw_results(f, right[0], app);
    draw_chart(f, right[1], app);
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_form(f: &mut Frame, area: Rect, app: &App) {
    let form = app.state().form();
    // Live validation: highlight the first field that would block a run.
    let invalid = form.validate().err().map(|e| e.field());

    let lines: Vec<Line> = Field::ALL
        .iter()
        .map(|&field| {
            let focused = app.focus().field() == Some(field);
            let pointer = if focused { "▸ " } else { "  " };
            let cursor = if focused { "▏" } else { "" };
            let value_style = if invalid == Some(field) {
                Style::default().fg(Color::Red).bold()
            } else if focused {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::raw(pointer),
                Span::styled(
                    format!("{:<13}", field.label()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{}{cursor}", form.get(field)), value_style),
            ])
        })
        .collect();

    let focused = app.focus().field().is_some();
    let p = Paragraph::new(lines).block(pane_block(" Run (enter to start) ".into(), focused));
    f.render_widget(p, area);
}

fn draw_scenarios(f: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let focused = app.focus() == Focus::ScenarioList;

    if state.scenarios().is_empty() {
        let p = Paragraph::new("No scenarios yet (r to refresh)")
            .style(Style::default().fg(Color::DarkGray))
            .block(pane_block(" Scenarios ".into(), focused));
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = state
        .scenarios()
        .iter()
        .map(|s| ListItem::new(format!("scenario {s}")))
        .collect();

    let list = List::new(items)
        .block(pane_block(
            format!(" Scenarios ({}) enter: fetch ", state.scenarios().len()),
            focused,
        ))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("▸ ");

    let mut list_state = app.list_state().clone();
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_results(f: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let title = match state.items_scenario() {
        Some(s) => format!(" Results · scenario {s} "),
        None => " Results ".to_string(),
    };

    let header = Row::new(vec!["Scenario", "Days", "Served", "Refused", "Terminals"])
        .style(Style::default().bold().fg(Color::Cyan));

    let rows: Vec<Row> = state
        .items()
        .iter()
        .map(|r| {
            Row::new(vec![
                opt(r.scenario_number),
                fmt_days(r.elapsed_days()),
                opt(r.cust_served),
                opt(r.cust_refused),
                opt(r.terminals),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(9),  // scenario
            Constraint::Length(10), // elapsed days
            Constraint::Length(9),  // served
            Constraint::Length(9),  // refused
            Constraint::Length(10), // terminals
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
    .block(pane_block(title, app.focus() == Focus::Results));

    let mut table_state = app.results_state().clone();
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_chart(f: &mut Frame, area: Rect, app: &App) {
    let chart = ServiceChart::from_rows(app.state().items());

    if chart.is_blank() {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Service chart ");
        let p = Paragraph::new("Run a scenario or pick one from the list to plot it")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let served = chart.served.points();
    let refused = chart.refused.points();
    let bounds = chart.bounds();

    let datasets = vec![
        Dataset::default()
            .name(chart.served.name)
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&served),
        Dataset::default()
            .name(chart.refused.name)
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&refused),
    ];

    let latest = |v: Option<f64>| v.map(|v| format!("{v:.0}")).unwrap_or_else(|| "—".into());
    let title = format!(
        " Service  served={}  refused={} ",
        latest(chart.served.latest()),
        latest(chart.refused.latest())
    );

    let widget = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .title("days")
                .bounds(bounds.x)
                .labels(vec![
                    Line::from(format!("{:.1}", bounds.x[0])),
                    Line::from(format!("{:.1}", bounds.x[1])),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("visitors")
                .bounds(bounds.y)
                .labels(vec![
                    Line::from(format!("{:.0}", bounds.y[0])),
                    Line::from(format!("{:.0}", bounds.y[1])),
                ]),
        );

    f.render_widget(widget, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let state = app.state();

    let export = app.export_is_latest().then(|| (app.export_error(), app.last_export()));

    let line = match (export, state.latest_notice()) {
        (Some((Some(err), _)), _) => Line::from(Span::styled(
            format!("export failed: {err}"),
            Style::default().fg(Color::Red),
        )),
        (Some((None, Some(path))), _) => Line::from(Span::styled(
            format!("exported to {}", path.display()),
            Style::default().fg(Color::Green),
        )),
        (_, Some(Notice::Error(err))) => {
            Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red)))
        }
        (_, Some(Notice::Ack(ack))) => Line::from(vec![
            Span::styled("run accepted: ", Style::default().fg(Color::Green)),
            Span::raw(ack.message.trim().to_string()),
        ]),
        _ => Line::from(Span::styled("ready", Style::default().fg(Color::DarkGray))),
    };

    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Status "));
    f.render_widget(p, area);
}

fn draw_keys(f: &mut Frame, area: Rect, app: &App) {
    let context = match app.focus() {
        Focus::Scenario | Focus::Terminals | Focus::Visitors => "type: edit   enter: start run",
        Focus::ScenarioList => "↑↓ select   enter: fetch results",
        Focus::Results => "↑↓ scroll",
    };
    let bar = Paragraph::new(format!(
        " tab: focus   {context}   r: refresh   s: export   a: about   q: quit"
    ))
    .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

fn draw_about(f: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 30, area);
    let text = vec![
        Line::from(Span::styled(
            format!("visitorsim v{}", visitorsim_core::VERSION),
            Style::default().bold().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(ABOUT),
        Line::from(""),
        Line::from(Span::styled(
            "press any key to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" About "));
    f.render_widget(Clear, popup);
    f.render_widget(p, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
