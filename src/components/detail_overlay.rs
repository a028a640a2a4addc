use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{DataResource, EventKind};

use super::{
    display_name, spinner, Component, StatBars, StatBarsProps, ACCENT_GOLD, ACCENT_TEAL, BG_PANEL,
    TEXT_DIM, TEXT_MAIN,
};
use crate::action::Action;
use crate::state::{AppState, EvolutionStage, OverlayState, PokemonDetail};

pub const NO_EVOLUTION_TEXT: &str = "No evolution data";
const OVERLAY_MIN_WIDTH: u16 = 64;
const OVERLAY_HEIGHT: u16 = 19;

pub struct DetailOverlayProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

#[derive(Default)]
pub struct DetailOverlay;

/// Where the overlay sits within the full frame.
pub fn overlay_area(area: Rect) -> Rect {
    let width = (area.width * 4 / 5).max(OVERLAY_MIN_WIDTH).min(area.width);
    let height = OVERLAY_HEIGHT.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Component<Action> for DetailOverlay {
    type Props<'a> = DetailOverlayProps<'a>;

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
                KeyCode::Esc | KeyCode::Backspace => Some(Action::OverlayClose),
                KeyCode::Left | KeyCode::Char('h') => Some(Action::OverlayPrev),
                KeyCode::Right | KeyCode::Char('l') => Some(Action::OverlayNext),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let Some(overlay) = state.overlay.as_ref() else {
            return;
        };
        let area = overlay_area(area);
        frame.render_widget(Clear, area);

        let title = match state.overlay_detail() {
            Some(detail) => format!("#{:03} {}", detail.id, display_name(&detail.name)),
            None => display_name(&overlay.name),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_bottom(" ←/→ browse  Esc close ")
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(
                Style::default()
                    .fg(ACCENT_GOLD)
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(detail) = state.overlay_detail() else {
            frame.render_widget(Paragraph::new("Details not loaded."), inner);
            return;
        };

        let [info, stats, evolution] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(3),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(info_lines(detail)).wrap(Wrap { trim: true }),
            info,
        );

        let record = detail.record();
        let domain = state.visible_records();
        StatBars.render(
            frame,
            stats,
            StatBarsProps {
                record: &record,
                domain: &domain,
            },
        );

        render_evolution(frame, evolution, overlay, &detail.species, state.tick);
    }
}

fn info_lines(detail: &PokemonDetail) -> Vec<Line<'static>> {
    let label = Style::default().fg(TEXT_DIM);
    let value = Style::default().fg(ACCENT_TEAL);
    let base_experience = detail
        .base_experience
        .map(|exp| exp.to_string())
        .unwrap_or_else(|| "-".to_string());
    vec![
        Line::from(vec![
            Span::styled("Types: ", label),
            Span::styled(
                detail
                    .types
                    .iter()
                    .map(|name| name.to_ascii_uppercase())
                    .collect::<Vec<_>>()
                    .join(" / "),
                value,
            ),
        ]),
        Line::from(vec![
            Span::styled("Height: ", label),
            Span::styled(format!("{:.1} m", f32::from(detail.height) / 10.0), value),
            Span::styled("  Weight: ", label),
            Span::styled(format!("{:.1} kg", f32::from(detail.weight) / 10.0), value),
            Span::styled("  Base exp: ", label),
            Span::styled(base_experience, value),
        ]),
        Line::from(vec![
            Span::styled("Abilities: ", label),
            Span::styled(
                detail
                    .abilities
                    .iter()
                    .map(|name| display_name(name))
                    .collect::<Vec<_>>()
                    .join(", "),
                value,
            ),
        ]),
    ]
}

/// Chain stages are species, so `species` picks the highlighted stage.
fn evolution_line(stages: &[EvolutionStage], species: &str) -> Line<'static> {
    let mut spans = Vec::with_capacity(stages.len() * 2);
    for (index, stage) in stages.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" → ", Style::default().fg(TEXT_DIM)));
        }
        let style = if stage.name == species {
            Style::default()
                .fg(ACCENT_GOLD)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_MAIN)
        };
        spans.push(Span::styled(
            format!("#{:03} {}", stage.id, display_name(&stage.name)),
            style,
        ));
    }
    Line::from(spans)
}

fn render_evolution(
    frame: &mut Frame,
    area: Rect,
    overlay: &OverlayState,
    species: &str,
    tick: u64,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("EVOLUTION")
        .border_style(Style::default().fg(TEXT_DIM));
    let line = match &overlay.evolution {
        DataResource::Loaded(stages) if !stages.is_empty() => evolution_line(stages, species),
        DataResource::Loading => Line::from(format!("Loading evolution {}", spinner(tick))),
        _ => Line::from(Span::styled(NO_EVOLUTION_TEXT, Style::default().fg(TEXT_DIM))),
    };
    frame.render_widget(
        Paragraph::new(line).wrap(Wrap { trim: true }).block(block),
        area,
    );
}
