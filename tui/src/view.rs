//! Frame layout and widgets: search box, topic bar, paper list, status
//! line. Pure functions of the display state so they can be exercised
//! against a test backend.

use chrono::DateTime;
use chrono::Utc;
use paperdeck_core::DisplayState;
use paperdeck_core::TopicFilter;
use paperdeck_core::Whitepaper;
use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::text::Text;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Paragraph;

pub(crate) fn draw(
    frame: &mut Frame,
    state: &DisplayState,
    topics: &[TopicFilter],
    topic_index: usize,
    selected_row: usize,
) {
    let [search_area, topic_area, list_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_search_box(frame, search_area, state);
    draw_topic_bar(frame, topic_area, topics, topic_index);
    draw_paper_list(frame, list_area, state, selected_row);
    draw_status_line(frame, status_area, state);
}

fn draw_search_box(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let title = if state.search_enabled {
        "Search"
    } else {
        "Search (unavailable - no credentials)"
    };
    let content = if state.search_term.is_empty() {
        Line::from("type to search...".dim())
    } else {
        Line::from(state.search_term.clone())
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_topic_bar(frame: &mut Frame, area: Rect, topics: &[TopicFilter], topic_index: usize) {
    let mut spans: Vec<Span> = Vec::new();
    for (index, topic) in topics.iter().enumerate() {
        if index > 0 {
            spans.push("  ".into());
        }
        let label = topic.label().to_string();
        if index == topic_index {
            spans.push(label.bold().reversed());
        } else {
            spans.push(label.into());
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_paper_list(frame: &mut Frame, area: Rect, state: &DisplayState, selected_row: usize) {
    if state.active_list.is_empty() {
        let message = if state.is_loading {
            Text::from("loading whitepapers...")
        } else {
            Text::from(vec![
                Line::from("no whitepapers found"),
                Line::from("clear the search (Esc) or seed the store with `paperdeck seed`".dim()),
            ])
        };
        frame.render_widget(Paragraph::new(message), area);
        return;
    }

    let items: Vec<ListItem> = state.active_list.iter().map(paper_item).collect();
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(Some(selected_row.min(state.active_list.len() - 1)));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn paper_item(paper: &Whitepaper) -> ListItem<'static> {
    let mut meta: Vec<Span> = vec![paper.topic.clone().fg(Color::Cyan)];
    if let Some(date) = paper.publication_date {
        meta.push("  ".into());
        meta.push(format_date(date).dim());
    }
    if let Some(link) = &paper.link {
        meta.push("  ".into());
        meta.push(link.clone().dim().underlined());
    }
    ListItem::new(Text::from(vec![
        Line::from(paper.title.clone().bold()),
        Line::from(meta),
        Line::from(paper.summary.clone()),
        Line::default(),
    ]))
}

fn draw_status_line(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let left = if let Some(error) = &state.last_error {
        Span::from(error.to_string()).fg(Color::Red)
    } else if state.is_loading {
        Span::from("loading...").fg(Color::Yellow)
    } else {
        Span::from(format!("{} papers", state.active_list.len()))
    };
    let line = Line::from(vec![left, "  ".into(), identity_chip(state)]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Truncated anonymous uid shown in the corner of the status line.
fn identity_chip(state: &DisplayState) -> Span<'static> {
    match &state.session_uid {
        Some(uid) => {
            let short: String = uid.chars().take(8).collect();
            Span::from(format!("anon:{short}")).dim()
        }
        None => Span::from("signed out").dim(),
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}
