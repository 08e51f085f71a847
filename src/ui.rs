//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a vertical split: the post list, an optional notice
//!   banner, and a one-line status bar.
//! * Publication dates are formatted here and nowhere else
//!   ([`format_published`]).
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use std::fmt;

use chrono::{DateTime, Local, Locale, TimeZone, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, NoticeKind};
use crate::feed::RequestState;
use crate::source::PostSummary;

/// Day, abbreviated month, year, e.g. `15 mar 2021` in pt-BR.
const DATE_FORMAT: &str = "%d %b %Y";

/// Format a publication date for display in the viewer's timezone.
pub fn format_published(published: Option<DateTime<Utc>>, locale: Locale) -> String {
    format_published_in(published, &Local, locale)
}

/// Format a publication date for display in `tz`.
pub fn format_published_in<Tz>(
    published: Option<DateTime<Utc>>,
    tz: &Tz,
    locale: Locale,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    published
        .map(|d| {
            d.with_timezone(tz)
                .format_localized(DATE_FORMAT, locale)
                .to_string()
        })
        .unwrap_or_else(|| "unpublished".into())
}

/// Draw the complete UI for one frame.
///
/// Called once per tick from the main loop.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let notice_height = u16::from(app.notice.is_some());
    let [main_area, notice_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(notice_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_post_list(app, frame, main_area);
    if app.notice.is_some() {
        draw_notice(app, frame, notice_area);
    }
    draw_status_bar(app, frame, status_area);
}

fn post_item<'a>(post: &'a PostSummary, locale: Locale) -> ListItem<'a> {
    let meta = Line::from(vec![
        Span::styled(
            format_published(post.published, locale),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(&post.author, Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(post.route(), Style::default().fg(Color::DarkGray)),
    ]);

    ListItem::new(Text::from(vec![
        Line::from(Span::styled(
            &post.title,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(&post.subtitle, Style::default().fg(Color::Gray))),
        meta,
        Line::default(),
    ]))
}

/// Render the post list with its trailing "load more" row.
fn draw_post_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let mut items: Vec<ListItem> = app
        .feed
        .posts()
        .iter()
        .map(|post| post_item(post, app.date_locale))
        .collect();

    if app.feed.has_more() {
        let label = if app.feed.is_loading() {
            Span::styled("Loading…", Style::default().fg(Color::Yellow))
        } else {
            Span::styled(
                "Load more posts",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )
        };
        items.push(ListItem::new(Line::from(label)));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Posts · {} ", app.source_name))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notice) = &app.notice else {
        return;
    };
    let style = match notice.kind {
        NoticeKind::Info => Style::default().fg(Color::Black).bg(Color::Cyan),
        NoticeKind::Error => Style::default().fg(Color::White).bg(Color::Red),
    };
    let banner = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::raw(notice.message.as_str()),
        Span::raw("  (Esc to dismiss)"),
    ]))
    .style(style);
    frame.render_widget(banner, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let state = match app.feed.state() {
        RequestState::Idle if app.feed.has_more() => "more available",
        RequestState::Idle => "end of feed",
        RequestState::Loading => "loading",
        RequestState::Failed(_) => "last load failed",
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} posts, {state}", app.feed.posts().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  m: more  Enter: open"),
    ]));
    frame.render_widget(status, area);
}
