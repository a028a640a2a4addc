use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use super::status_footer::FOOTER_HEIGHT;
use super::{
    CardGrid, CardGridProps, CatalogHeader, CatalogHeaderProps, Component, DetailOverlay,
    DetailOverlayProps, SearchBar, StatusFooter, StatusFooterProps, BG_BASE, HEADER_HEIGHT,
};
use crate::action::Action;
use crate::state::AppState;

const CARD_MIN_ROWS: u16 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogLayout {
    pub header: Rect,
    pub grid: Rect,
    pub footer: Rect,
}

impl CatalogLayout {
    pub fn split(area: Rect) -> Self {
        let [header, grid, footer] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(CARD_MIN_ROWS),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .areas(area);
        Self {
            header,
            grid,
            footer,
        }
    }
}

pub struct CatalogViewProps<'a> {
    pub state: &'a AppState,
}

/// Whole screen: header with search, card grid, footer, and the stat overlay
/// on top when open.
#[derive(Default)]
pub struct CatalogView {
    pub header: CatalogHeader,
    pub grid: CardGrid,
    pub search: SearchBar,
    pub overlay: DetailOverlay,
    pub footer: StatusFooter,
}

impl Component<Action> for CatalogView {
    type Props<'a> = CatalogViewProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);

        let layout = CatalogLayout::split(area);
        self.header
            .render(frame, layout.header, CatalogHeaderProps { state });
        self.grid.render(
            frame,
            layout.grid,
            CardGridProps {
                state,
                is_focused: !state.search.active && state.overlay.is_none(),
            },
        );
        self.footer
            .render(frame, layout.footer, StatusFooterProps { state });

        if state.overlay.is_some() {
            self.overlay.render(
                frame,
                area,
                DetailOverlayProps {
                    state,
                    is_focused: true,
                },
            );
        }
    }
}
