use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::Borders,
    Frame,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use super::{Component, ACCENT_GOLD, ACCENT_TEAL, BG_PANEL, TEXT_DIM, TEXT_MAIN};
use crate::action::Action;
use crate::state::AppState;

pub const FOOTER_HEIGHT: u16 = 3;

pub struct StatusFooterProps<'a> {
    pub state: &'a AppState,
}

/// Key hints for the current mode plus the latest status message.
pub struct StatusFooter {
    status_bar: StatusBar,
}

impl Default for StatusFooter {
    fn default() -> Self {
        Self {
            status_bar: StatusBar::new(),
        }
    }
}

pub fn status_message(state: &AppState) -> String {
    if let Some(message) = state.message.as_ref() {
        return message.text.clone();
    }
    if state.page_loading {
        "Loading page...".to_string()
    } else if state.search_fetching {
        "Searching...".to_string()
    } else if state.type_filter.loading || state.generation_filter.loading {
        "Loading filter...".to_string()
    } else if state.type_filter.options_loading || state.generation_filter.options_loading {
        "Loading filters...".to_string()
    } else {
        String::new()
    }
}

fn status_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    if state.search.active {
        return vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Clear"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
    }
    if state.overlay.is_some() {
        return vec![
            StatusBarHint::new("h/l", "Browse"),
            StatusBarHint::new("Esc", "Close"),
            StatusBarHint::new("q", "Quit"),
        ];
    }
    vec![
        StatusBarHint::new("hjkl", "Move"),
        StatusBarHint::new("Enter", "Stats"),
        StatusBarHint::new("m", "More"),
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("[ ]", "Type"),
        StatusBarHint::new("{ }", "Gen"),
        StatusBarHint::new("c", "Clear"),
        StatusBarHint::new("q", "Quit"),
    ]
}

impl Component<Action> for StatusFooter {
    type Props<'a> = StatusFooterProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let hints = status_hints(props.state);
        let status = status_message(props.state);
        let status_items = [StatusBarItem::span(Span::styled(
            status.as_str(),
            Style::default().fg(ACCENT_GOLD),
        ))];

        let style = StatusBarStyle {
            base: BaseStyle {
                border: Some(BorderStyle {
                    borders: Borders::ALL,
                    style: Style::default().fg(TEXT_DIM),
                    focused_style: Some(Style::default().fg(ACCENT_TEAL)),
                }),
                padding: Padding::xy(1, 0),
                bg: Some(BG_PANEL),
                fg: Some(TEXT_MAIN),
            },
            text: Style::default().fg(TEXT_DIM),
            hint_key: Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
            hint_label: Style::default().fg(TEXT_DIM),
            separator: Style::default().fg(TEXT_DIM),
        };

        let props = StatusBarProps {
            left: StatusBarSection::hints(&hints).with_separator("  "),
            center: StatusBarSection::empty(),
            right: StatusBarSection::items(&status_items).with_separator("  "),
            style,
            is_focused: false,
        };
        Component::<Action>::render(&mut self.status_bar, frame, area, props);
    }
}
