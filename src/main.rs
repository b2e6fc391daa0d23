use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Clear, Dataset, GraphType, LegendPosition, Paragraph,
};

use fpl_forecast::chart::{LineStyle, axis_bounds, axis_labels, chart_series};
use fpl_forecast::config::{Rgb, SeasonConfig};
use fpl_forecast::pipeline::parse_team_ids;
use fpl_forecast::provider::{self, SourceKind};
use fpl_forecast::state::{AppState, Delta, Focus, ProviderCommand, apply_delta};

const DEFAULT_EXPORT_PATH: &str = "fpl_forecast.xlsx";

struct App {
    state: AppState,
    source: SourceKind,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    export_path: PathBuf,
}

impl App {
    fn new(
        config: SeasonConfig,
        source: SourceKind,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ) -> Self {
        let export_path = env::var("FPL_EXPORT_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));
        Self {
            state: AppState::new(config),
            source,
            should_quit: false,
            cmd_tx,
            export_path,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.state.help_overlay = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => self.state.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.state.focus_prev(),
            KeyCode::Enter | KeyCode::Char('g') => self.request_generate(),
            KeyCode::Char('x') => self.request_export(),
            KeyCode::Char('c') => {
                self.state.clear_inputs();
                self.state.push_log("[INFO] Inputs cleared");
            }
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Char(c) => self.state.push_char(c),
            _ => {}
        }
    }

    fn request_generate(&mut self) {
        let requests = self.state.requested_slots();
        if requests.is_empty() {
            self.state.push_log("[INFO] Enter at least one Team ID");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Forecast provider unavailable");
            return;
        };
        if tx.send(ProviderCommand::Generate { requests }).is_err() {
            self.state.push_log("[WARN] Generate request failed");
        } else {
            self.state.pending = true;
            self.state.status_line = "Fetching history...".to_string();
        }
    }

    fn request_export(&mut self) {
        if self.state.participants.is_empty() {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Export unavailable");
            return;
        };
        let cmd = ProviderCommand::Export {
            path: self.export_path.clone(),
            participants: self.state.participants.clone(),
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Export request failed");
        } else {
            self.state.push_log("[INFO] Export request sent");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = SeasonConfig::from_env();
    let source = SourceKind::from_env();
    let preset_ids = parse_team_ids(&env::args().skip(1).collect::<Vec<_>>().join(" "));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(tx, cmd_rx, config.clone(), source);

    let mut app = App::new(config, source, Some(cmd_tx));
    if !preset_ids.is_empty() {
        for (slot, id) in app.state.inputs.iter_mut().zip(&preset_ids) {
            *slot = id.to_string();
        }
        app.request_generate();
    }
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(30)])
        .split(chunks[1]);
    render_inputs(frame, body[0], &app.state);
    render_chart(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "Tab/↑/↓ Focus | 0-9 Type ID | Enter/g Generate | x Export | c Clear | ? Help | q Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let cfg = &app.state.config;
    let line1 = format!(
        "FPL Points Visualizer & Predictor | {} | {} weeks | metric: {}",
        app.source.label(),
        cfg.last_week(),
        cfg.metric.label()
    );
    let line2 = format!(
        "View past gameweek points and where you may end up by gameweek {}",
        cfg.last_week()
    );
    format!("{line1}\n{line2}")
}

fn render_inputs(frame: &mut Frame, area: Rect, state: &AppState) {
    let slots = state.inputs.len();
    let mut constraints: Vec<Constraint> = (0..slots).map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(3));
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (idx, raw) in state.inputs.iter().enumerate() {
        let focused = state.focus == Focus::Input(idx);
        let colour = to_color(state.config.colour(idx));
        let border_style = if focused {
            Style::default().fg(colour).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text = if raw.is_empty() && !focused {
            Span::styled("Team ID", Style::default().fg(Color::DarkGray))
        } else if focused {
            Span::raw(format!("{raw}_"))
        } else {
            Span::raw(raw.clone())
        };
        let input = Paragraph::new(Line::from(text)).block(
            Block::default()
                .title(format!("Team {}", idx + 1))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(input, rows[idx]);
    }

    let button_style = if state.focus == Focus::Generate {
        Style::default().fg(Color::Black).bg(Color::White)
    } else {
        Style::default()
    };
    let label = if state.pending { "Generating..." } else { "Generate" };
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(button_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, rows[slots]);

    let status = Paragraph::new(state.status_line.clone())
        .wrap(ratatui::widgets::Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(status, rows[slots + 1]);
}

fn render_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let series = chart_series(&state.participants, &state.config);
    let bounds = axis_bounds(&state.config);

    let datasets: Vec<Dataset> = series
        .iter()
        .filter(|s| !s.points.is_empty())
        .map(|s| {
            let marker = match s.style {
                LineStyle::Solid => Marker::Braille,
                LineStyle::Dashed => Marker::Dot,
            };
            Dataset::default()
                .name(s.label.clone())
                .marker(marker)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(to_color(s.colour)))
                .data(&s.points)
        })
        .collect();

    let x_labels = axis_labels(bounds.x[0], bounds.x[1], 5)
        .into_iter()
        .map(Span::raw)
        .collect::<Vec<_>>();
    let y_labels = axis_labels(bounds.y[0], bounds.y[1], 6)
        .into_iter()
        .map(Span::raw)
        .collect::<Vec<_>>();

    let chart = Chart::new(datasets)
        .block(Block::default().title("Points").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Gameweeks")
                .style(Style::default().fg(Color::Gray))
                .bounds(bounds.x)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Points")
                .style(Style::default().fg(Color::Gray))
                .bounds(bounds.y)
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Percentage(60), Constraint::Percentage(60)));
    frame.render_widget(chart, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);
    let text = [
        "FPL Forecast - Help",
        "",
        "  Tab / ↓      Next field",
        "  Shift-Tab / ↑ Previous field",
        "  0-9          Type Team ID",
        "  Backspace    Delete digit",
        "  Enter / g    Generate chart",
        "  x            Export series to xlsx",
        "  c            Clear inputs",
        "  ?            Toggle help",
        "  q / Esc      Quit",
        "",
        "Solid lines are observed points, dotted lines the forecast.",
    ]
    .join("\n");
    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
