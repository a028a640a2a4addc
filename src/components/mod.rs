pub mod card_grid;
pub mod catalog_header;
pub mod catalog_view;
pub mod detail_overlay;
pub mod search_bar;
pub mod stat_bars;
pub mod status_footer;

use ratatui::style::Color;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use card_grid::{CardGrid, CardGridProps};
pub use catalog_header::{CatalogHeader, CatalogHeaderProps, HEADER_HEIGHT};
pub use catalog_view::{CatalogLayout, CatalogView, CatalogViewProps};
pub use detail_overlay::{overlay_area, DetailOverlay, DetailOverlayProps};
pub use search_bar::{SearchBar, SearchBarProps};
pub use stat_bars::{bar_cells, StatBars, StatBarsProps};
pub use status_footer::{StatusFooter, StatusFooterProps};

pub(crate) const BG_BASE: Color = Color::Rgb(12, 18, 28);
pub(crate) const BG_PANEL: Color = Color::Rgb(20, 32, 46);
pub(crate) const BG_CARD: Color = Color::Rgb(26, 40, 58);
pub(crate) const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
pub(crate) const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
pub(crate) const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
pub(crate) const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
pub(crate) const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
pub(crate) const ACCENT_RED: Color = Color::Rgb(226, 96, 88);

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// `mr-mime` -> `Mr Mime`
pub fn display_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn spinner(tick: u64) -> char {
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}
