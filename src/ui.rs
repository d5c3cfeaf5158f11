use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::session::{classify_intent, classify_latency, Intent, LatencyBand, Turn};

/// Badge colors matching the backend's intent palette.
fn intent_color(intent: Intent) -> Color {
    match intent {
        Intent::Products => Color::Blue,
        Intent::Policies => Color::Magenta,
        Intent::Orders => Color::Green,
        Intent::Other => Color::DarkGray,
    }
}

fn latency_color(band: LatencyBand) -> Color {
    match band {
        LatencyBand::Fast => Color::Green,
        LatencyBand::Moderate => Color::Yellow,
        LatencyBand::Slow => Color::Red,
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let [header_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    render_header(frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "IntelliRAG AI",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Enterprise Knowledge Intelligence",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, used for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation (Ctrl+S toggles sources) ");

    let chat_text = if app.session.log.is_empty() && !app.session.pending() {
        Text::from(Span::styled(
            "Ask a question about products, policies, or orders...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for turn in &app.session.log {
            match turn {
                Turn::User(text) => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(text.as_str()));
                    lines.push(Line::default());
                }
                Turn::Assistant(envelope) => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in envelope.answer_text().lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                    if let Some(intents) = envelope.intents.as_ref().filter(|i| !i.is_empty()) {
                        lines.push(badge_line(intents));
                    }
                    if let Some(ms) = envelope.latency_ms {
                        lines.push(latency_line(ms));
                    }
                    if let Some(sources) = envelope.sources.as_ref().filter(|s| !s.is_empty()) {
                        lines.extend(source_lines(sources, app.show_sources));
                    }
                    lines.push(Line::default());
                }
            }
        }

        if app.session.pending() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn badge_line(intents: &[String]) -> Line<'static> {
    let mut spans = Vec::new();
    for label in intents {
        let color = intent_color(classify_intent(label));
        spans.push(Span::styled(
            format!(" {} ", label),
            Style::default().bg(color).fg(Color::White),
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn latency_line(ms: u64) -> Line<'static> {
    let color = latency_color(classify_latency(ms));
    Line::from(Span::styled(
        format!("⏱ {} ms", ms),
        Style::default().fg(color),
    ))
}

fn source_lines(sources: &[String], expanded: bool) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("📄 Sources ({})", sources.len()),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    ))];
    if expanded {
        for source in sources {
            lines.push(Line::from(Span::styled(
                format!("  • {}", source),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let border_color = if app.session.pending() {
        Color::DarkGray
    } else {
        Color::Yellow
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask (Enter to send) ");

    // Horizontal scrolling keeps the cursor visible in a narrow box.
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .session
        .draft
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_palette_separates_the_known_buckets() {
        let colors = [
            intent_color(Intent::Products),
            intent_color(Intent::Policies),
            intent_color(Intent::Orders),
            intent_color(Intent::Other),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn source_lines_collapse_to_a_single_header() {
        let sources = vec!["a.pdf".to_string(), "b.pdf".to_string()];
        assert_eq!(source_lines(&sources, false).len(), 1);
        assert_eq!(source_lines(&sources, true).len(), 3);
    }
}
