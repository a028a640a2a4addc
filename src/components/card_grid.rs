use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_dispatch::EventKind;

use super::{
    display_name, spinner, Component, ACCENT_GOLD, ACCENT_TEAL, BG_CARD, BG_HIGHLIGHT, BG_PANEL,
    TEXT_DIM, TEXT_MAIN,
};
use crate::action::Action;
use crate::state::{grid_columns, AppState, FilterKind, PokemonDetail, CARD_HEIGHT, CARD_WIDTH};

pub const LOADING_TEXT: &str = "Loading catalog...";
pub const NO_MATCHES_TEXT: &str = "No Pokémon match the current filters.";

pub struct CardGridProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

#[derive(Default)]
pub struct CardGrid;

impl Component<Action> for CardGrid {
    type Props<'a> = CardGridProps<'a>;

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
                KeyCode::Left | KeyCode::Char('h') => Some(Action::SelectionMove(-1)),
                KeyCode::Right | KeyCode::Char('l') => Some(Action::SelectionMove(1)),
                KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectionRow(-1)),
                KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectionRow(1)),
                KeyCode::Home | KeyCode::Char('g') => Some(Action::SelectionJumpTop),
                KeyCode::End | KeyCode::Char('G') => Some(Action::SelectionJumpBottom),
                KeyCode::Enter => Some(Action::OverlayOpen),
                KeyCode::Char('m') => Some(Action::PageLoadMore),
                KeyCode::Char('/') => Some(Action::SearchStart),
                KeyCode::Char(']') => Some(Action::FilterNext(FilterKind::Type)),
                KeyCode::Char('[') => Some(Action::FilterPrev(FilterKind::Type)),
                KeyCode::Char('}') => Some(Action::FilterNext(FilterKind::Generation)),
                KeyCode::Char('{') => Some(Action::FilterPrev(FilterKind::Generation)),
                KeyCode::Char('c') => Some(Action::FilterClear),
                KeyCode::Esc if !props.state.search.query.is_empty() => {
                    Some(Action::SearchCancel)
                }
                _ => None,
            },
            EventKind::Scroll { delta, .. } if *delta != 0 => {
                Some(Action::SelectionRow(if *delta > 0 { 1 } else { -1 }))
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let border_style = if props.is_focused {
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_DIM)
        };
        let more = if state.page_loading && !state.catalog.is_empty() {
            format!(" loading more {}", spinner(state.tick))
        } else if state.has_more_pages() {
            " m: more".to_string()
        } else {
            String::new()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("CATALOG {}{more}", state.visible_len()))
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if state.catalog.is_empty() && state.page_loading {
            render_loading_panel(frame, inner, state.tick);
            return;
        }
        if state.visible_len() == 0 {
            let text = Paragraph::new(NO_MATCHES_TEXT)
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM));
            frame.render_widget(text, centered_row(inner));
            return;
        }

        let columns = grid_columns(inner.width);
        let rows_visible = ((inner.height / CARD_HEIGHT) as usize).max(1);
        let selected_row = state.selected_index / columns;
        let first_row = (selected_row + 1).saturating_sub(rows_visible);

        for (position, detail) in state
            .visible()
            .enumerate()
            .skip(first_row * columns)
            .take(rows_visible * columns)
        {
            let row = (position / columns - first_row) as u16;
            let column = (position % columns) as u16;
            let card = Rect {
                x: inner.x + column * CARD_WIDTH,
                y: inner.y + row * CARD_HEIGHT,
                width: CARD_WIDTH,
                height: CARD_HEIGHT,
            }
            .intersection(inner);
            if card.is_empty() {
                continue;
            }
            render_card(frame, card, detail, position == state.selected_index);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, detail: &PokemonDetail, selected: bool) {
    let (bg, border) = if selected {
        (
            BG_HIGHLIGHT,
            Style::default()
                .fg(ACCENT_GOLD)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (BG_CARD, Style::default().fg(TEXT_DIM))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .style(Style::default().bg(bg).fg(TEXT_MAIN));
    let lines = vec![
        Line::from(vec![
            Span::styled(format!("#{:03} ", detail.id), Style::default().fg(ACCENT_GOLD)),
            Span::styled(
                display_name(&detail.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            detail
                .types
                .iter()
                .map(|name| name.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join(" / "),
            Style::default().fg(ACCENT_TEAL),
        )),
        Line::from(Span::styled(
            format!("Total {}", detail.stats.total()),
            Style::default().fg(TEXT_DIM),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_loading_panel(frame: &mut Frame, area: Rect, tick: u64) {
    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, panel, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(30),
        Constraint::Fill(1),
    ])
    .areas(row);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT_TEAL))
        .style(Style::default().bg(BG_CARD));
    let text = Paragraph::new(format!("{LOADING_TEXT} {}", spinner(tick)))
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_MAIN))
        .block(block);
    frame.render_widget(text, panel);
}

fn centered_row(area: Rect) -> Rect {
    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);
    row
}
