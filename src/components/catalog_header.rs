use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{
    Component, SearchBar, SearchBarProps, ACCENT_GOLD, ACCENT_TEAL, BG_PANEL, TEXT_DIM, TEXT_MAIN,
};
use crate::action::Action;
use crate::state::{AppState, FilterState};

/// Borders plus the summary and search lines.
pub const HEADER_HEIGHT: u16 = 4;

pub struct CatalogHeaderProps<'a> {
    pub state: &'a AppState,
}

#[derive(Default)]
pub struct CatalogHeader;

fn filter_spans(label: &'static str, filter: &FilterState) -> Vec<Span<'static>> {
    let mut spans = vec![
        Span::raw(label),
        Span::styled(filter.label(), Style::default().fg(ACCENT_GOLD)),
    ];
    if filter.loading {
        spans.push(Span::styled(" (loading)", Style::default().fg(TEXT_DIM)));
    }
    spans
}

impl Component<Action> for CatalogHeader {
    type Props<'a> = CatalogHeaderProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(Style::default().fg(TEXT_DIM))
            .title("POKECATALOG");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

        let total = state
            .total_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "?".to_string());
        let mut spans = vec![
            Span::styled(
                format!("Loaded {}/{total}", state.catalog.len()),
                Style::default()
                    .fg(ACCENT_TEAL)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  Shown "),
            Span::styled(
                state.visible_len().to_string(),
                Style::default().fg(ACCENT_TEAL),
            ),
            Span::raw("  |  "),
        ];
        spans.extend(filter_spans("Type: ", &state.type_filter));
        spans.push(Span::raw("  |  "));
        spans.extend(filter_spans("Gen: ", &state.generation_filter));
        frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

        SearchBar.render(
            frame,
            rows[1],
            SearchBarProps {
                state,
                is_focused: state.search.active,
            },
        );
    }
}
