use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{Component, ACCENT_GOLD, ACCENT_RED, ACCENT_TEAL, TEXT_DIM, TEXT_MAIN};
use crate::action::Action;
use crate::stats::{aggregate, derive_scale, scaled_bar_width, AggregateResult, CreatureRecord};

/// Label, value and the trailing max/avg columns around the bar.
const FIXED_COLUMNS: usize = 8 + 4 + 1 + 16;
const MIN_BAR_CELLS: usize = 4;
const OVERFLOW_GLYPH: &str = "▶";

pub struct StatBarsProps<'a> {
    pub record: &'a CreatureRecord,
    /// Creatures the bars are compared against.
    pub domain: &'a [CreatureRecord],
}

#[derive(Default)]
pub struct StatBars;

/// Converts a percentage width into filled cells out of `cells`. Widths past
/// 100% fill the bar and report overflow.
pub fn bar_cells(width: f64, cells: usize) -> (usize, bool) {
    let filled = (width.max(0.0) / 100.0 * cells as f64).round() as usize;
    (filled.min(cells), width > 100.0)
}

fn stat_lines(
    record: &CreatureRecord,
    result: &AggregateResult,
    scale: u32,
    cells: usize,
) -> Vec<Line<'static>> {
    record
        .stats
        .iter()
        .map(|(kind, value)| {
            let (filled, overflow) = bar_cells(scaled_bar_width(value, scale), cells);
            Line::from(vec![
                Span::styled(format!("{:<8}", kind.label()), Style::default().fg(TEXT_DIM)),
                Span::styled(
                    format!("{value:>3} "),
                    Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
                ),
                Span::styled("█".repeat(filled), Style::default().fg(ACCENT_TEAL)),
                Span::styled("░".repeat(cells - filled), Style::default().fg(TEXT_DIM)),
                Span::styled(
                    if overflow { OVERFLOW_GLYPH } else { " " },
                    Style::default().fg(ACCENT_RED),
                ),
                Span::styled(
                    format!(
                        " max {:>3} avg {:>3}",
                        result.max.get(kind),
                        result.average.get(kind)
                    ),
                    Style::default().fg(ACCENT_GOLD),
                ),
            ])
        })
        .collect()
}

impl Component<Action> for StatBars {
    type Props<'a> = StatBarsProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let result = aggregate(props.domain);
        let scale = derive_scale(&result.max);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("STATS vs {} shown", props.domain.len()))
            .border_style(Style::default().fg(TEXT_DIM));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cells = (inner.width as usize)
            .saturating_sub(FIXED_COLUMNS)
            .max(MIN_BAR_CELLS);
        let lines = stat_lines(props.record, &result, scale, cells);
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatVector;
    use tui_dispatch::testing::*;

    #[test]
    fn bar_cells_rounds_and_clamps() {
        assert_eq!(bar_cells(0.0, 20), (0, false));
        assert_eq!(bar_cells(50.0, 20), (10, false));
        assert_eq!(bar_cells(100.0, 20), (20, false));
        assert_eq!(bar_cells(150.0, 20), (20, true));
    }

    #[test]
    fn renders_domain_max_and_average() {
        let record = CreatureRecord::new(1, "a", StatVector::new([10, 20, 30, 40, 50, 60]));
        let domain = vec![
            record.clone(),
            CreatureRecord::new(2, "b", StatVector::new([20, 30, 40, 50, 60, 70])),
        ];

        let mut render = RenderHarness::new(60, 8);
        let output = render.render_to_string_plain(|frame| {
            StatBars.render(
                frame,
                frame.area(),
                StatBarsProps {
                    record: &record,
                    domain: &domain,
                },
            );
        });

        assert!(output.contains("STATS vs 2 shown"));
        assert!(output.contains("max  20 avg  15"));
        assert!(output.contains("Speed"));
        assert!(!output.contains(OVERFLOW_GLYPH));
    }

    #[test]
    fn marks_overflow_when_outside_domain() {
        let record = CreatureRecord::new(9, "big", StatVector::new([200, 0, 0, 0, 0, 0]));
        let domain = vec![CreatureRecord::new(1, "a", StatVector::new([50, 50, 50, 50, 50, 100]))];

        let mut render = RenderHarness::new(60, 8);
        let output = render.render_to_string_plain(|frame| {
            StatBars.render(
                frame,
                frame.area(),
                StatBarsProps {
                    record: &record,
                    domain: &domain,
                },
            );
        });

        assert!(output.contains(OVERFLOW_GLYPH));
    }
}
