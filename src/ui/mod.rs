use std::path::Path;
use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section};
use crate::glx::table::{FbConfigTable, COLUMNS};
use crate::help::{glx_help, HELP_TITLE};
use crate::theme::Theme;

// Loaded once at startup from the configured color file
static THEME: OnceLock<Theme> = OnceLock::new();

/// Width of the label column in the information pane
const LABEL_WIDTH: usize = 20;

pub fn init_theme(path: Option<&Path>) {
    let _ = THEME.set(Theme::load(path));
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let failed = app.page.error().is_some();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                              // Info line
            Constraint::Min(4),                                 // GLX information
            Constraint::Length(if failed { 0 } else { 3 }),     // Toggle button
            Constraint::Length(1),                              // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    if let Some(message) = app.page.error() {
        draw_error(f, message, chunks[1]);
    } else {
        draw_info_pane(f, app, chunks[1]);
        draw_toggle_button(f, app, chunks[2]);
    }
    draw_footer(f, app, chunks[3]);

    match app.popup {
        Popup::None => {}
        Popup::FbConfigs => draw_fbconfig_window(f, app),
        Popup::Help => draw_help_popup(f, app),
    }
}

fn section_block(title: &str, active: bool) -> Block<'_> {
    let (border, title_style) = if active {
        (accent(), Style::default().fg(accent()).add_modifier(Modifier::BOLD))
    } else {
        (inactive(), Style::default().fg(inactive()))
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(warning())))
    } else {
        Line::from(Span::styled(
            format!("GLX │ {}", app.source.describe()),
            Style::default().fg(text_dim()),
        ))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_error(f: &mut Frame, message: &str, area: Rect) {
    let label = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(danger()))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(section_block(" GLX ", true));

    f.render_widget(label, area);
}

fn draw_info_pane(f: &mut Frame, app: &App, area: Rect) {
    let block = section_block(" GLX ", app.section == Section::Info);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(info) = &app.page.info {
        for section in info.sections() {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                section.title,
                Style::default().fg(header()).add_modifier(Modifier::BOLD),
            )));

            for (label, value) in section.rows {
                let mut values = value.lines();
                let first = values.next().unwrap_or("");
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<width$}", label, width = LABEL_WIDTH), Style::default().fg(text_dim())),
                    Span::styled(first, Style::default().fg(text())),
                ]));
                for more in values {
                    lines.push(Line::from(vec![
                        Span::raw(format!("  {:<width$}", "", width = LABEL_WIDTH)),
                        Span::styled(more, Style::default().fg(text())),
                    ]));
                }
            }
        }
    }

    let content = Paragraph::new(lines)
        .block(block)
        .scroll((app.info_scroll, 0));

    f.render_widget(content, area);
}

fn draw_toggle_button(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::ShowFbConfigs;
    let block = section_block(" Frame Buffer Configurations ", is_active);

    let (mark, mark_color) = if app.show_fbc { ("[x]", accent()) } else { ("[ ]", text_dim()) };
    let count = app.page.fbconfigs().map(|t| t.len()).unwrap_or(0);

    let button = Paragraph::new(Line::from(vec![
        Span::styled(format!("  {} ", mark), Style::default().fg(mark_color)),
        Span::styled("Show GLX Frame Buffer Configurations", Style::default().fg(text())),
        Span::styled(format!("  ({} configurations)", count), Style::default().fg(text_dim())),
    ]))
    .block(block);

    f.render_widget(button, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match (app.popup, app.section) {
        (Popup::FbConfigs, _) => vec![
            ("↑↓", "Row"),
            ("←→", "Column"),
            ("PgUp/PgDn", "Page"),
            ("Esc", "Close"),
        ],
        (Popup::Help, _) => vec![("↑↓", "Scroll"), ("Esc", "Close")],
        (Popup::None, Section::Info) => vec![
            ("↑↓", "Scroll"),
            ("f", "FBConfigs"),
            ("Tab", "Next"),
            ("R", "Reload"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
        (Popup::None, Section::ShowFbConfigs) => vec![
            ("Space", "Toggle"),
            ("Tab", "Next"),
            ("R", "Reload"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center), area);
}

/// First column to draw so that `selected` stays inside `width` cells.
fn first_visible_column(widths: &[usize], selected: usize, width: usize) -> usize {
    let mut start = selected;
    let mut used = widths[selected];
    while start > 0 && used + 1 + widths[start - 1] <= width {
        start -= 1;
        used += 1 + widths[start];
    }
    start
}

fn draw_fbconfig_window(f: &mut Frame, app: &App) {
    let Some(table) = app.page.fbconfigs() else {
        return;
    };

    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 100 { 98 } else { 90 },
        if area.height < 30 { 95 } else { 85 },
        area,
    );
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" GLX Frame Buffer Configurations ", Style::default().fg(accent())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));
    let inner_area = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4)])
        .split(inner_area);

    draw_fbconfig_table(f, app, table, inner[0]);

    // Tooltip for the selected column header
    let column = &COLUMNS[app.fbc_col];
    let tooltip = Paragraph::new(Span::styled(column.tooltip, Style::default().fg(text_dim())))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ({}/{}) ", column.title, app.fbc_col + 1, COLUMNS.len()),
                    Style::default().fg(header()),
                ))
                .borders(Borders::TOP)
                .border_style(Style::default().fg(inactive())),
        );
    f.render_widget(tooltip, inner[1]);
}

fn draw_fbconfig_table(f: &mut Frame, app: &App, table: &FbConfigTable, area: Rect) {
    let widths = table.column_widths();
    let start = first_visible_column(&widths, app.fbc_col, area.width as usize);

    let mut end = start;
    let mut used = 0;
    while end < widths.len() && used + widths[end] <= area.width as usize {
        used += widths[end] + 1;
        end += 1;
    }
    let end = end.max(app.fbc_col + 1);

    let centered = |s: &str, style: Style| Line::styled(s.to_string(), style).alignment(Alignment::Center);

    let header_row = Row::new(COLUMNS[start..end].iter().enumerate().map(|(i, c)| {
        let mut style = Style::default().fg(header());
        if start + i == app.fbc_col {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        centered(c.title, style)
    }));

    // Keep the selected row on screen (header takes one line)
    let visible_rows = area.height.saturating_sub(1).max(1) as usize;
    let offset = app.fbc_row.saturating_sub(visible_rows - 1);

    let rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows)
        .map(|(r, row)| {
            let cells = row[start..end].iter().enumerate().map(|(i, cell)| {
                let style = if r == app.fbc_row && start + i == app.fbc_col {
                    Style::default().fg(accent()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(text())
                };
                centered(cell, style)
            });

            let row_style = if r == app.fbc_row {
                Style::default().bg(bg_selected())
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let constraints: Vec<Constraint> = widths[start..end]
        .iter()
        .map(|w| Constraint::Length(*w as u16))
        .collect();

    let view = Table::new(rows, constraints)
        .header(header_row)
        .column_spacing(1);

    f.render_widget(view, area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 40 { 95 } else { 85 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let mut help_text: Vec<Line> = Vec::new();
    for section in glx_help() {
        help_text.push(Line::from(Span::styled(
            format!("═══ {} ═══", section.heading),
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )));
        for para in section.paragraphs {
            help_text.push(Line::from(Span::raw(format!("  {}", para))));
            help_text.push(Line::from(""));
        }
    }

    help_text.push(Line::from(Span::styled(
        "═══ Keys ═══",
        Style::default().fg(header()).add_modifier(Modifier::BOLD),
    )));
    for (key, action) in [
        ("f / Space", "Show or hide the frame buffer configuration window"),
        ("←→ ↑↓", "Move between cells in the configuration window"),
        ("R", "Query the GLX source again"),
        ("q", "Quit"),
    ] {
        help_text.push(Line::from(vec![
            Span::styled(format!("  {:<12}", key), Style::default().fg(accent())),
            Span::raw(action),
        ]));
    }

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(format!(" {} ", HELP_TITLE), Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_visible_column_keeps_selection() {
        let widths = [4, 4, 2, 3, 3];
        // everything fits
        assert_eq!(first_visible_column(&widths, 4, 80), 0);
        // only the last two fit ("3 3" = 7)
        assert_eq!(first_visible_column(&widths, 4, 7), 3);
        // the selection alone
        assert_eq!(first_visible_column(&widths, 1, 4), 1);
    }
}
