use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_dispatch::EventKind;

use super::{spinner, Component, ACCENT_GOLD, ACCENT_TEAL, TEXT_DIM};
use crate::action::Action;
use crate::state::AppState;

pub struct SearchBarProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Single-line query input. Typing goes straight to the reducer.
#[derive(Default)]
pub struct SearchBar;

impl Component<Action> for SearchBar {
    type Props<'a> = SearchBarProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Esc => Some(Action::SearchCancel),
                KeyCode::Enter => Some(Action::SearchSubmit),
                KeyCode::Backspace => Some(Action::SearchBackspace),
                KeyCode::Char(ch) => Some(Action::SearchInput(ch)),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let query_style = Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD);
        let mut spans = vec![Span::styled("Search: ", Style::default().fg(TEXT_DIM))];
        if state.search.active {
            spans.push(Span::styled(format!("/{}_", state.search.query), query_style));
        } else if state.search.query.is_empty() {
            spans.push(Span::styled("press / to search", Style::default().fg(TEXT_DIM)));
        } else {
            spans.push(Span::styled(format!("/{}", state.search.query), query_style));
        }
        if state.search_fetching {
            spans.push(Span::styled(
                format!("  fetching matches {}", spinner(state.tick)),
                Style::default().fg(ACCENT_GOLD),
            ));
        } else if state.index_loading {
            spans.push(Span::styled(
                "  (name index loading)",
                Style::default().fg(TEXT_DIM),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::testing::*;

    fn actions_for(event: EventKind, is_focused: bool) -> Vec<Action> {
        let state = AppState::default();
        SearchBar
            .handle_event(&event, SearchBarProps { state: &state, is_focused })
            .into_iter()
            .collect()
    }

    #[test]
    fn typing_emits_input() {
        let actions = actions_for(EventKind::Key(key("p")), true);
        actions.assert_first(Action::SearchInput('p'));
    }

    #[test]
    fn enter_and_esc_map_to_submit_and_cancel() {
        let enter = EventKind::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        let esc = EventKind::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        actions_for(enter, true).assert_first(Action::SearchSubmit);
        actions_for(esc, true).assert_first(Action::SearchCancel);
    }

    #[test]
    fn unfocused_ignores_keys() {
        actions_for(EventKind::Key(key("p")), false).assert_empty();
    }

    #[test]
    fn renders_active_query_with_cursor() {
        let mut state = AppState::default();
        state.search.active = true;
        state.search.query = "pika".into();

        let mut render = RenderHarness::new(50, 1);
        let output = render.render_to_string_plain(|frame| {
            SearchBar.render(
                frame,
                frame.area(),
                SearchBarProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });
        assert!(output.contains("/pika_"));
    }
}
