use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

use crate::app::{App, MenuItem};
use crate::state::detail_sync::{DetailPhase, LOAD_FAILED};
use crate::ui::layout::LayoutAreas;
use chrono::{DateTime, Local};
use log::error;
use match_api::{MatchDetail, MatchSummary};

static TABS: &[&str; 2] = &["Matches", "Match Detail"];
const ERROR_CHAR: char = '!';
/// Rows used by one match in the list, separator included.
const MATCH_ROWS: usize = 4;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &App)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Matches => draw_match_list(f, layout.main, app),
            MenuItem::MatchDetail => draw_match_detail(f, layout.main, app),
            MenuItem::Help => draw_placeholder(
                f,
                layout.main,
                "Help: q=quit  1=Matches  j/k=move  Enter=open match  Esc=back  f=full screen  \"=logs",
            ),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app);
    });

    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index(app.state.active_tab, app.state.previous_tab))
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Help has no tab of its own; the tab it was opened from stays highlighted.
fn tab_index(active: MenuItem, previous: MenuItem) -> usize {
    match active {
        MenuItem::Matches => 0,
        MenuItem::MatchDetail => 1,
        MenuItem::Help => tab_index(previous, MenuItem::Matches),
    }
}

// ---------------------------------------------------------------------------
// Match list
// ---------------------------------------------------------------------------

fn draw_match_list(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    // List errors are never shown here; they only reach the log pane.
    let Some(matches) = app.state.list.matches() else {
        f.render_widget(
            Paragraph::new("Loading...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let mut lines = vec![
        Line::from(format!(
            "{} matches{}",
            matches.len(),
            updated_suffix(app.state.list.updated_at())
        )),
        Line::from(Span::styled(
            "Keys: j/k=move  Enter=open  ?=help  q=quit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    if matches.is_empty() {
        lines.push(Line::from(Span::styled(
            "No matches right now",
            Style::default().fg(Color::DarkGray),
        )));
        f.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let header_rows = lines.len();
    let visible = (inner.height as usize).saturating_sub(header_rows) / MATCH_ROWS;
    let selected = app.state.list_view.selected;
    let first = list_window_start(selected, visible.max(1));

    for (idx, summary) in matches.iter().enumerate().skip(first) {
        lines.extend(match_rows(summary, idx == selected));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// First match index to render so that `selected` stays on screen.
fn list_window_start(selected: usize, visible: usize) -> usize {
    (selected + 1).saturating_sub(visible)
}

fn match_rows(summary: &MatchSummary, selected: bool) -> Vec<Line<'static>> {
    let marker = if selected { "> " } else { "  " };
    let name_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let team_row = |flag: &str, team: &str, score: &str, lead: &str| {
        Line::from(vec![
            Span::raw(lead.to_string()),
            Span::styled(format!("[{:<2}] ", flag_label(flag)), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{:<24}", team_label(team)), name_style),
            Span::raw(format!("{score:>3}")),
        ])
    };

    let eta_style = if summary.is_live() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let info = [summary.event.as_str(), summary.stage.as_str(), summary.time.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");

    vec![
        team_row(summary.team1_flag_code(), &summary.team1, &summary.team1_score, marker),
        team_row(summary.team2_flag_code(), &summary.team2, &summary.team2_score, "  "),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<6}", summary.eta), eta_style),
            Span::styled(info, Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ]
}

fn flag_label(code: &str) -> &str {
    if code.is_empty() { "--" } else { code }
}

fn team_label(team: &str) -> &str {
    if team.is_empty() { "TBD" } else { team }
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

fn draw_match_detail(f: &mut Frame, area: Rect, app: &App) {
    let title = match app.state.detail.match_id() {
        Some(id) => format!(" Match {id} "),
        None => " Match Detail ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let detail = &app.state.detail;
    let msg = match detail.phase() {
        DetailPhase::Uninitialized => {
            Paragraph::new("Select a match in the list and press Enter")
                .style(Style::default().fg(Color::DarkGray))
        }
        DetailPhase::Loading => Paragraph::new(format!(
            "{} Loading match details...",
            app.state.animation.spinner_char()
        ))
        .style(Style::default().fg(Color::Gray)),
        DetailPhase::Failed => {
            Paragraph::new(format!("Error: {}", detail.error_message().unwrap_or(LOAD_FAILED)))
                .style(Style::default().fg(Color::Red))
        }
        DetailPhase::Ready => {
            let Some(data) = detail.detail() else {
                return;
            };
            let mut lines = detail_lines(data);
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Keys: j/k=scroll  Esc=back{}", updated_suffix(detail.updated_at())),
                Style::default().fg(Color::DarkGray),
            )));
            let offset = app.state.detail_view.scroll_offset as usize;
            let lines: Vec<Line> = lines.into_iter().skip(offset).collect();
            f.render_widget(Paragraph::new(lines), inner);
            return;
        }
    };
    f.render_widget(msg.alignment(Alignment::Center), inner);
}

fn detail_lines(detail: &MatchDetail) -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let status_style = if detail.is_live() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "{}  {} - {}  {}",
                team_label(&detail.team1),
                detail.team1_score,
                detail.team2_score,
                team_label(&detail.team2)
            ),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::styled("Status: ", dim), Span::styled(detail.status.clone(), status_style)]),
        Line::from(vec![Span::styled("Event:  ", dim), Span::raw(detail.event.clone())]),
        Line::from(vec![Span::styled("Stage:  ", dim), Span::raw(detail.stage.clone())]),
    ];
    for (team, logo) in [(&detail.team1, &detail.team1_logo), (&detail.team2, &detail.team2_logo)] {
        if !logo.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(format!("{} logo: ", team_label(team)), dim),
                Span::raw(logo.clone()),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("Maps ({})", detail.maps.len()), heading)));
    for map in &detail.maps {
        let pick = if map.is_picked() { format!("  pick: {}", map.pick) } else { String::new() };
        lines.push(Line::from(format!(
            "  {:<12} {:>2} - {:<2}  {}{pick}",
            map.name, map.team1_score, map.team2_score, map.time
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("Streams ({})", detail.streams.len()), heading)));
    for stream in &detail.streams {
        lines.push(Line::from(vec![
            Span::raw(format!("  {}: ", stream.name)),
            Span::styled(stream.link.clone(), Style::default().fg(Color::Cyan)),
        ]));
    }
    lines
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

fn updated_suffix(at: Option<DateTime<Local>>) -> String {
    at.map(|t| format!("  updated {}", t.format("%H:%M:%S")))
        .unwrap_or_default()
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .output_separator(' ')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray))
        .style_trace(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

/// Spinner while something is still loading, `!` once the open match failed.
fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App) {
    let (ch, style) = match app.state.active_tab {
        MenuItem::Matches if app.state.list.matches().is_none() => {
            (app.state.animation.spinner_char(), Style::default().fg(Color::White))
        }
        MenuItem::MatchDetail => match app.state.detail.phase() {
            DetailPhase::Loading => {
                (app.state.animation.spinner_char(), Style::default().fg(Color::White))
            }
            DetailPhase::Failed => (ERROR_CHAR, Style::default().fg(Color::Red)),
            _ => return,
        },
        _ => return,
    };
    let spinner = Paragraph::new(ch.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
