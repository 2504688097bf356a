use crate::app::{App, CARD_HEIGHT, CARD_WIDTH, InputMode};
use crate::omdb::SearchResultItem;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Busy indicator frames, advanced once per event-loop pass.
pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(3) + search(3) + banner(1) + grid(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let header_text = format!(" 🎬 Movie Explorer   [{} results]", app.results.len());
    let header = Paragraph::new(header_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    // ── Search bar ──
    let search_style = match app.input_mode {
        InputMode::Editing => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default().fg(Color::DarkGray),
    };
    let search_label = if app.input_mode == InputMode::Editing {
        " 🔍 Enter a movie name (Enter to search, Esc to cancel): "
    } else {
        " 🔍 Search (/): "
    };
    let search_text = format!("{}{}", search_label, app.query);
    let search_bar = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_style)
            .title(" Search "),
    );
    frame.render_widget(search_bar, chunks[1]);

    // Set cursor position when editing
    if app.input_mode == InputMode::Editing {
        let text_width = (search_label.width() + app.query.width()) as u16;
        let cursor_x = chunks[1].x + 1 + text_width;
        let cursor_y = chunks[1].y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    // ── Error banner ──
    if let Some(banner) = &app.banner {
        let warning = Line::from(vec![
            Span::styled(
                " ⚠ ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(banner.message.clone(), Style::default().fg(Color::Red)),
        ]);
        frame.render_widget(Paragraph::new(warning), chunks[2]);
    }

    // ── Results grid ──
    if app.busy && app.results.is_empty() {
        let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
        let line_y = chunks[3].y + chunks[3].height / 2;
        let loading = Paragraph::new(format!("{spinner} Loading…"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(loading, Rect::new(chunks[3].x, line_y, chunks[3].width, 1));
    } else {
        render_grid(app, frame, chunks[3]);
    }

    // ── Status bar ──
    let mut status_spans = vec![
        Span::styled(
            " ↑↓←→",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Navigate  "),
        Span::styled(
            "/",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Search  "),
        Span::styled(
            "Enter",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Details  "),
        Span::styled(
            "?",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Help  "),
        Span::styled(
            "q",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Quit  "),
    ];
    if app.busy {
        status_spans.push(Span::styled(
            format!("{} ", SPINNER[app.spinner_frame % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        ));
    }
    status_spans.push(Span::styled(
        app.status_msg.clone(),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(status_spans)), chunks[4]);
}

fn render_grid(app: &App, frame: &mut Frame, area: Rect) {
    if app.results.is_empty() {
        return;
    }

    let first = app.row_offset * app.grid_cols;
    let last = (first + app.grid_rows * app.grid_cols).min(app.results.len());
    if first >= last {
        return;
    }

    for (offset, item) in app.results[first..last].iter().enumerate() {
        let col = (offset % app.grid_cols) as u16;
        let row = (offset / app.grid_cols) as u16;
        let x = area.x + col * CARD_WIDTH;
        let y = area.y + row * CARD_HEIGHT;
        let width = CARD_WIDTH.min(area.right().saturating_sub(x));
        let height = CARD_HEIGHT.min(area.bottom().saturating_sub(y));
        // Skip cards clipped down to nothing by a narrow terminal
        if width < 4 || height < 3 {
            continue;
        }

        let selected = first + offset == app.selected;
        let border_style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let card = Paragraph::new(card_lines(item, width.saturating_sub(2) as usize))
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        frame.render_widget(card, Rect::new(x, y, width, height));
    }
}

/// The content lines of one result card: title, year, poster source.
pub fn card_lines(item: &SearchResultItem, width: usize) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            truncate_str(&item.title, width),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("📅 {}", item.year),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            truncate_str(item.poster_src(), width),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut result = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::omdb::FALLBACK_POSTER;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_card_lines_show_title_year_and_poster() {
        let item = SearchResultItem {
            title: "Blade Runner".to_string(),
            year: "1982".to_string(),
            imdb_id: "tt0083658".to_string(),
            poster: Some("https://example.com/poster.jpg".to_string()),
        };
        let lines = card_lines(&item, 40);
        assert_eq!(line_text(&lines[0]), "Blade Runner");
        assert_eq!(line_text(&lines[1]), "📅 1982");
        assert_eq!(line_text(&lines[2]), "https://example.com/poster.jpg");
    }

    #[test]
    fn test_card_lines_use_fallback_poster() {
        let item = SearchResultItem {
            title: "Obscurity".to_string(),
            year: "2003".to_string(),
            imdb_id: "tt0000001".to_string(),
            poster: None,
        };
        let lines = card_lines(&item, 200);
        assert_eq!(line_text(&lines[2]), FALLBACK_POSTER);
    }

    #[test]
    fn test_truncate_str_keeps_short_strings() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_str_adds_ellipsis() {
        assert_eq!(truncate_str("a very long title", 8), "a very …");
    }

    #[test]
    fn test_truncate_str_counts_display_columns() {
        // Wide characters take two columns each.
        assert_eq!(truncate_str("千と千尋の神隠し", 7), "千と千…");
        assert_eq!(truncate_str("千と千尋", 8), "千と千尋");
    }
}
