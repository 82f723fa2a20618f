use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use footprint_core::{ExposureTracker, LoadingState, TrackerView};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use tracing::debug;

use crate::report::{device_rows, network_rows, os_rows, shows_records, status_line};

const PANELS: [(&str, Color); 3] = [
    ("Network", Color::Cyan),
    ("System", Color::Green),
    ("Device", Color::Magenta),
];

type Rows = fn(&TrackerView) -> Vec<(&'static str, String)>;

pub async fn run_dashboard(tracker: &ExposureTracker) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut updates = tracker.subscribe();
    {
        let tracker = tracker.clone();
        tokio::spawn(async move {
            tracker.initialize().await;
        });
    }

    let run_result = async {
        loop {
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('r') => spawn_action(tracker, Action::Refresh),
                        KeyCode::Char('c') => spawn_action(tracker, Action::Clear),
                        KeyCode::Char('x') => spawn_action(tracker, Action::ClearAndRefresh),
                        _ => {}
                    }
                }
            }

            let view = updates.borrow_and_update().clone();
            terminal.draw(|frame| draw_ui(frame.size(), frame, &view))?;
        }

        Ok::<(), anyhow::Error>(())
    }
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Refresh,
    Clear,
    ClearAndRefresh,
}

fn spawn_action(tracker: &ExposureTracker, action: Action) {
    debug!(?action, "dashboard action");
    let tracker = tracker.clone();
    tokio::spawn(async move {
        match action {
            Action::Refresh => tracker.refresh().await,
            Action::Clear => tracker.clear_data(false).await,
            Action::ClearAndRefresh => tracker.clear_data(true).await,
        };
    });
}

fn draw_ui(area: Rect, frame: &mut ratatui::Frame<'_>, view: &TrackerView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    frame.render_widget(render_header(view), rows[0]);

    if !shows_records(view) {
        let hint = match view.state {
            LoadingState::Loading => "Collecting network, system and device data...",
            LoadingState::Error => "Collection failed. Press 'r' to retry.",
            LoadingState::Idle => "Nothing collected. Press 'r' to collect.",
            LoadingState::Success => "No data available.",
        };
        let body = Paragraph::new(Line::from(hint)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(body, rows[1]);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[1]);

    let sources: [Rows; 3] = [network_rows, os_rows, device_rows];
    for ((col, (title, color)), rows_of) in cols.iter().copied().zip(PANELS).zip(sources) {
        frame.render_widget(render_panel(title, color, rows_of(view)), col);
    }
}

fn render_header(view: &TrackerView) -> Paragraph<'static> {
    let state_color = match view.state {
        LoadingState::Idle => Color::Gray,
        LoadingState::Loading => Color::Yellow,
        LoadingState::Success => Color::Green,
        LoadingState::Error => Color::Red,
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "Digital Footprint  ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(status_line(view), Style::default().fg(state_color)),
        ]),
        Line::from("r refresh  c clear  x clear+refresh  q quit"),
    ];

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"))
}

fn render_panel(title: &'static str, color: Color, rows: Vec<(&'static str, String)>) -> Paragraph<'static> {
    let lines: Vec<Line<'static>> = rows
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<12}"), Style::default().fg(color)),
                Span::raw(value),
            ])
        })
        .collect();

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title))
}
