use crate::app::App;
use crate::omdb::MovieDetail;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render(app: &App, frame: &mut Frame) {
    let detail = match &app.detail {
        Some(d) => d,
        None => return,
    };

    let area = super::centered_rect(72, 84, frame.area());

    // Clear the grid behind the overlay
    frame.render_widget(Clear, area);

    let content = Paragraph::new(detail_lines(detail))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Movie Details ")
                .title_bottom(
                    Line::from(" ↑↓ Scroll  o Open Poster  Esc Close ")
                        .alignment(Alignment::Right)
                        .style(Style::default().fg(Color::DarkGray)),
                ),
        );
    frame.render_widget(content, area);
}

/// Every field of the record, in display order, with the documented
/// stand-ins for absent values.
pub fn detail_lines(detail: &MovieDetail) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", detail.title),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", detail.poster_src()),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];

    push_field(&mut lines, "Year", &detail.year);
    push_field(
        &mut lines,
        "Genre",
        detail.genre.as_deref().unwrap_or("Not available"),
    );
    push_field(
        &mut lines,
        "Director",
        detail.director.as_deref().unwrap_or("Not available"),
    );
    push_field(
        &mut lines,
        "Cast",
        detail.actors.as_deref().unwrap_or("Not available"),
    );
    push_field(
        &mut lines,
        "Runtime",
        detail.runtime.as_deref().unwrap_or("Unknown"),
    );
    push_field(
        &mut lines,
        "Rated",
        detail.rated.as_deref().unwrap_or("Not Rated"),
    );
    push_field(
        &mut lines,
        "Released",
        detail.released.as_deref().unwrap_or("Unknown"),
    );

    lines.push(Line::from(Span::styled(
        " IMDb Rating",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        format!(" ⭐ {}/10", detail.imdb_rating.as_deref().unwrap_or("N/A")),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        " Plot",
        Style::default().fg(Color::DarkGray),
    )));
    let plot = detail.plot.as_deref().unwrap_or("No plot available");
    for plot_line in plot.lines() {
        lines.push(Line::from(format!(" {plot_line}")));
    }

    lines
}

fn push_field(lines: &mut Vec<Line<'static>>, label: &'static str, value: &str) {
    lines.push(Line::from(Span::styled(
        format!(" {label}"),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        format!(" {value}"),
        Style::default().fg(Color::White),
    )));
    lines.push(Line::from(""));
}
