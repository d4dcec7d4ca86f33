//! Frame rendering: tabs bar, search line, news list, status line.

use chrono::Utc;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs};
use ratatui::Frame;

use crate::app::{App, ViewMode};
use crate::news::{NewsItem, Sentiment};
use crate::util::truncate_to_width;

/// Maximum suggestions shown in the popup.
const MAX_SUGGESTIONS: usize = 6;

pub(super) fn render(frame: &mut Frame, app: &App) {
    let [tabs_area, search_area, list_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_tabs(frame, app, tabs_area);
    render_search(frame, app, search_area);
    render_list(frame, app, list_area);
    render_status(frame, app, status_area);

    if app.search_active && !app.suggest.suggestions().is_empty() {
        render_suggestions(frame, app, search_area);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app.tabs.iter().map(|k| Line::from(k.label())).collect();
    let tabs = Tabs::new(titles)
        .select(app.selected_tab)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let label = if app.search_active { "Search> " } else { "Search (/): " };
    let style = if app.search_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let line = Line::from(vec![
        Span::styled(label, style),
        Span::raw(app.suggest.query().to_string()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.mode() {
        ViewMode::Browsing(key) => format!(" {} ", key.label()),
        ViewMode::CompanyFocus(name) => format!(" News for: {} ", name),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if app.loading {
        let message = Paragraph::new("Loading...").block(block);
        frame.render_widget(message, area);
        return;
    }

    if app.items().is_empty() {
        // Intentionally the same message for "fetch failed" and a genuinely
        // empty category; the distinction lives in the logs.
        let message = Paragraph::new("No news yet").block(block);
        frame.render_widget(message, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let now = Utc::now();
    let items: Vec<ListItem> = app
        .items()
        .iter()
        .map(|item| news_row(item, width, now))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    state.select(Some(app.selected_item));
    frame.render_stateful_widget(list, area, &mut state);
}

fn news_row(item: &NewsItem, width: usize, now: chrono::DateTime<Utc>) -> ListItem<'static> {
    let (marker, marker_color) = match item.sentiment {
        Sentiment::Good => ("▲", Color::Green),
        Sentiment::Bad => ("▼", Color::Red),
        Sentiment::Neutral => ("•", Color::DarkGray),
    };

    let mut meta = vec![Span::styled(
        format!("{} ", marker),
        Style::default().fg(marker_color),
    )];
    if let Some(company) = &item.company {
        meta.push(Span::styled(
            format!("{}  ", company),
            Style::default().fg(Color::Cyan),
        ));
    }
    meta.push(Span::styled(
        format!("[{}]  ", item.sector),
        Style::default().fg(Color::Magenta),
    ));
    let ago = item.time_ago(now);
    if !ago.is_empty() {
        meta.push(Span::styled(ago, Style::default().fg(Color::DarkGray)));
    }

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&item.title, width).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(meta),
    ];
    if !item.description.is_empty() {
        lines.push(Line::from(
            truncate_to_width(&item.description, width).into_owned(),
        ));
    }
    if !item.facts.is_empty() {
        let facts = item
            .facts
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(Span::styled(
            truncate_to_width(&facts, width).into_owned(),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(""));

    ListItem::new(lines)
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.status() {
        Some(message) => message.to_string(),
        None => "q quit  / search  r refresh  Tab/arrows tabs  j/k scroll  Esc back".to_string(),
    };
    let status = Paragraph::new(truncate_to_width(&text, area.width as usize).into_owned())
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, area);
}

fn render_suggestions(frame: &mut Frame, app: &App, search_area: Rect) {
    let suggestions = app.suggest.suggestions();
    let shown = suggestions.len().min(MAX_SUGGESTIONS);

    let width = suggestions
        .iter()
        .take(shown)
        .map(|s| s.len() as u16 + 4)
        .max()
        .unwrap_or(20)
        .min(frame.area().width.saturating_sub(2));
    let popup = Rect {
        x: search_area.x.saturating_add(2),
        y: search_area.y.saturating_add(1),
        width,
        height: (shown as u16 + 2).min(frame.area().height.saturating_sub(search_area.y + 1)),
    };

    let items: Vec<ListItem> = suggestions
        .iter()
        .take(shown)
        .map(|s| ListItem::new(s.clone()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    state.select(Some(app.selected_suggestion.min(shown.saturating_sub(1))));

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut state);
}
