//! Terminal chart of normalized value over time, one line per fund.

use crate::directory::FundDirectory;
use crate::scraper::cleaner::round_to;
use crate::storage::snapshot::SeriesMap;
use anyhow::Result;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Line as CanvasLine, Points},
    },
};
use std::collections::{BTreeSet, HashMap};
use std::io;

const BREAK_EVEN: f64 = 1.0;
const TOTAL_COLOR: Color = Color::Red;
static PALETTE: [Color; 10] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::LightCyan,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightMagenta,
];

// ── Model ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub fund_id: i64,
    pub name: String,
    pub points: Vec<(f64, f64)>, // (date position on the x axis, nvalue)
    pub start_label: String,
    pub end_label: String,
    pub is_total: bool,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct ChartModel {
    pub series: Vec<ChartSeries>,
    pub x_labels: Vec<String>, // MM-DD, one per distinct date
    pub x_max: f64,
    pub y_bounds: [f64; 2],
}

impl ChartModel {
    pub fn new(series: &SeriesMap, directory: &FundDirectory) -> Self {
        let total_id = directory.total().fund_id;
        let mut palette = PALETTE.iter().cycle();

        // Every series is placed on the same axis: the sorted union of all dates.
        let dates: BTreeSet<&str> = series
            .values()
            .flat_map(|s| s.dates().iter().map(String::as_str))
            .collect();
        let position: HashMap<&str, f64> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, i as f64))
            .collect();

        let lines: Vec<ChartSeries> = series
            .values()
            .filter(|s| !s.is_empty())
            .map(|s| {
                let id = s.fund_id();
                let is_total = id == total_id;
                let last = s.nvalues().last().copied().unwrap_or(BREAK_EVEN);
                ChartSeries {
                    fund_id: id,
                    name: directory.name_of(id).unwrap_or_default().to_string(),
                    points: s
                        .dates()
                        .iter()
                        .zip(s.nvalues())
                        .filter_map(|(d, nv)| position.get(d.as_str()).map(|x| (*x, *nv)))
                        .collect(),
                    start_label: id.to_string(),
                    end_label: format!("{}-{}%", id, round_to(last * 100.0, 2)),
                    is_total,
                    color: if is_total {
                        TOTAL_COLOR
                    } else {
                        palette.next().copied().unwrap_or(Color::White)
                    },
                }
            })
            .collect();

        let (lo, hi) = lines
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .fold((BREAK_EVEN, BREAK_EVEN), |(lo, hi), y| (lo.min(y), hi.max(y)));

        Self {
            series: lines,
            x_labels: dates.iter().map(|d| month_day(d)).collect(),
            x_max: dates.len().saturating_sub(1) as f64,
            y_bounds: [lo - 0.02, hi + 0.02],
        }
    }
}

/// "2022-09-01" → "09-01"
pub fn month_day(date: &str) -> String {
    let n = date.chars().count();
    date.chars().skip(n.saturating_sub(5)).collect()
}

// ── Rendering ─────────────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, model: &ChartModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(4)])
        .split(f.area());

    let [y_lo, y_hi] = model.y_bounds;
    let tick_step = (model.x_labels.len() / 8).max(1);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Fund performance, normalized"),
        )
        .marker(Marker::Braille)
        .x_bounds([-0.5, model.x_max + 0.5])
        .y_bounds([y_lo, y_hi])
        .paint(|ctx| {
            ctx.draw(&CanvasLine::new(0.0, BREAK_EVEN, model.x_max, BREAK_EVEN, Color::White));
            for s in &model.series {
                for w in s.points.windows(2) {
                    ctx.draw(&CanvasLine::new(w[0].0, w[0].1, w[1].0, w[1].1, s.color));
                }
                if s.is_total {
                    ctx.draw(&Points {
                        coords: &s.points,
                        color: s.color,
                    });
                }
            }
            ctx.layer();

            for (i, label) in model.x_labels.iter().enumerate().step_by(tick_step) {
                ctx.print(i as f64, y_lo, Span::styled(label.clone(), Style::default().fg(Color::Gray)));
            }
            for s in &model.series {
                let style = Style::default().fg(s.color);
                if let (Some(first), Some(last)) = (s.points.first(), s.points.last()) {
                    ctx.print(first.0, first.1, Span::styled(s.start_label.clone(), style));
                    ctx.print(last.0, last.1, Span::styled(s.end_label.clone(), style));
                }
            }
        });
    f.render_widget(canvas, chunks[0]);

    let mut legend: Vec<Span> = model
        .series
        .iter()
        .map(|s| {
            let mut style = Style::default().fg(s.color);
            if s.is_total {
                style = style.add_modifier(Modifier::BOLD);
            }
            Span::styled(format!("■ {} {}  ", s.fund_id, s.name), style)
        })
        .collect();
    legend.push(Span::raw(format!("── break-even {:.1}   q: quit", BREAK_EVEN)));

    let legend = Paragraph::new(Line::from(legend))
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: true });
    f.render_widget(legend, chunks[1]);
}

/// Restores the terminal when dropped, whichever way `show` exits.
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Open the chart full-screen until `q` or `Esc`.
pub fn show(model: &ChartModel) -> Result<()> {
    enable_raw_mode()?;
    let _guard = RawModeGuard;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let res = run(&mut terminal, model);
    terminal.show_cursor()?;
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, model: &ChartModel) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, model))?;
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                return Ok(());
            }
        }
    }
}
