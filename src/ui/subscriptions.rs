use crate::api::Subscription;
use crate::app::App;
use crate::theme::Theme;
use crate::util::sanitize;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Render the subscriptions tab
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Subscriptions ({}) ", app.subscriptions.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border)
        .title(title);

    if app.subscriptions.is_empty() {
        let msg = if !app.subscriptions_loaded {
            "Loading subscriptions..."
        } else {
            "No subscriptions yet, press [a] to add one"
        };
        f.render_widget(
            Paragraph::new(Span::styled(msg, app.theme.muted)).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .subscriptions
        .iter()
        .map(|sub| ListItem::new(subscription_line(sub, &app.theme)))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.selected);
    let mut state = ListState::default().with_selected(Some(app.selected_subscription));
    f.render_stateful_widget(list, area, &mut state);
}

/// Keywords joined by " + ", then creator and category when set.
pub(super) fn subscription_line(sub: &Subscription, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(format!("#{:<5} ", sub.id), theme.muted)];

    match sub.keywords() {
        Some(k) => spans.push(Span::styled(sanitize(&k).into_owned(), theme.heading)),
        None => spans.push(Span::styled("(no keywords)", theme.muted)),
    }
    if let Some(creator) = sub.creator.as_deref().filter(|c| !c.is_empty()) {
        spans.push(Span::styled("  creator: ", theme.muted));
        spans.push(Span::styled(sanitize(creator).into_owned(), theme.body));
    }
    if let Some(category) = sub.category.as_deref().filter(|c| !c.is_empty()) {
        spans.push(Span::styled("  category: ", theme.muted));
        spans.push(Span::styled(sanitize(category).into_owned(), theme.body));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_line() {
        let sub = Subscription {
            id: 3,
            keyword1: Some("vps".into()),
            keyword2: None,
            keyword3: Some("deal".into()),
            creator: None,
            category: Some("trade".into()),
        };
        let line = subscription_line(&sub, &Theme::default());
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "#3     vps + deal  category: trade");
    }
}
