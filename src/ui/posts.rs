//! Posts tab: filter bar, result header, post list and page strip.
//!
//! Rows and the page strip are built as typed `Line`/`Span` values from the
//! wire records, so backend text is never interpreted as markup and the
//! output can be checked without a terminal.

use crate::api::{format_timestamp, Post};
use crate::app::App;
use crate::filters::{FilterForm, FormField};
use crate::keybindings::{Action, Context};
use crate::pagination::{PageControl, PageState};
use crate::theme::Theme;
use crate::util::{display_width, sanitize, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Render the posts tab
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let border = if app.editing_filters {
        app.theme.border_focused
    } else {
        app.theme.border
    };
    let filters = Paragraph::new(filter_line(app.posts.form(), app.editing_filters, &app.theme))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(" Filters "),
        );
    f.render_widget(filters, chunks[0]);

    let page = app.posts.page();
    let header = if !app.posts.has_loaded() {
        "Loading posts...".to_string()
    } else if app.posts.is_loading() {
        format!("{} (updating...)", header_text(page))
    } else {
        header_text(page)
    };
    f.render_widget(
        Paragraph::new(Span::styled(header, app.theme.muted)),
        chunks[1],
    );

    let list_area = chunks[2];
    let posts = app.posts.posts();
    if posts.is_empty() {
        let msg = if app.posts.has_loaded() {
            empty_message(!app.posts.filters().is_empty(), &fetch_key(app))
        } else {
            String::new()
        };
        let empty = Paragraph::new(Span::styled(msg, app.theme.muted)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border)
                .title(" Posts "),
        );
        f.render_widget(empty, list_area);
        return;
    }

    let width = list_area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = posts
        .iter()
        .map(|post| ListItem::new(post_line(post, width, &app.theme)))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border)
                .title(" Posts "),
        )
        .highlight_style(app.theme.selected);
    let mut state = ListState::default().with_selected(Some(app.posts.selected()));
    f.render_stateful_widget(list, list_area, &mut state);

    f.render_widget(Paragraph::new(page_strip_line(page, &app.theme)), chunks[3]);
}

fn fetch_key(app: &App) -> String {
    app.keybindings
        .keys_for(Context::Posts, Action::FetchRss)
        .into_iter()
        .next()
        .unwrap_or_else(|| "?".to_string())
}

/// "Found 42 posts, page 2 of 3"
pub(super) fn header_text(page: &PageState) -> String {
    format!(
        "Found {} posts, page {} of {}",
        page.total, page.current_page, page.total_pages
    )
}

pub(super) fn empty_message(filters_active: bool, fetch_key: &str) -> String {
    if filters_active {
        "No posts match the filters".to_string()
    } else {
        format!("No posts yet, press [{}] to fetch RSS", fetch_key)
    }
}

/// One post: status, title, creator, category, date.
pub(super) fn post_line(post: &Post, width: usize, theme: &Theme) -> Line<'static> {
    let status = post.push_status;
    let date = format_timestamp(&post.pub_date);
    let meta = format!(
        "  {} · {} · {}",
        sanitize(&post.creator),
        sanitize(&post.category),
        date
    );

    let status_label = format!("[{}] ", status.label());
    let title_room = width
        .saturating_sub(display_width(&status_label))
        .saturating_sub(display_width(&meta))
        .max(10);
    let title = truncate_to_width(&sanitize(&post.title), title_room).into_owned();

    Line::from(vec![
        Span::styled(status_label, theme.push_status(status)),
        Span::styled(title, theme.body),
        Span::styled(meta, theme.muted),
    ])
}

/// Prev, page numbers with ellipses, Next. Empty when there is a single page.
pub(super) fn page_strip_line(page: &PageState, theme: &Theme) -> Line<'static> {
    if page.total_pages <= 1 {
        return Line::default();
    }

    let mut spans = Vec::new();
    spans.push(Span::styled(
        "‹ Prev ",
        if page.has_prev() {
            theme.page
        } else {
            theme.page_disabled
        },
    ));
    for control in page.strip() {
        spans.push(Span::raw(" "));
        match control {
            PageControl::Page {
                number,
                active: true,
            } => spans.push(Span::styled(format!("[{}]", number), theme.page_active)),
            PageControl::Page { number, .. } => {
                spans.push(Span::styled(number.to_string(), theme.page))
            }
            PageControl::Ellipsis => spans.push(Span::styled("…", theme.page_disabled)),
        }
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        "Next ›",
        if page.has_next() {
            theme.page
        } else {
            theme.page_disabled
        },
    ));
    Line::from(spans)
}

/// The four filter inputs. The focused one is highlighted while editing.
pub(super) fn filter_line(form: &FilterForm, editing: bool, theme: &Theme) -> Line<'static> {
    let status = form
        .push_status
        .map(|s| s.label())
        .unwrap_or("Any");
    let fields = [
        (FormField::Search, "Title", form.search.as_str()),
        (FormField::PushStatus, "Status", status),
        (FormField::Creator, "Creator", form.creator.as_str()),
        (FormField::Category, "Category", form.category.as_str()),
    ];

    let mut spans = Vec::with_capacity(fields.len() * 2);
    for (field, label, value) in fields {
        let focused = editing && form.focus == field;
        let cursor = if focused && field != FormField::PushStatus {
            "_"
        } else {
            ""
        };
        spans.push(Span::styled(format!("{}: ", label), theme.muted));
        spans.push(Span::styled(
            format!("{}{}  ", value, cursor),
            if focused { theme.selected } else { theme.body },
        ));
    }
    Line::from(spans)
}
