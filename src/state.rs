use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::stats::{CreatureRecord, StatVector};

/// Upper bound on creatures fetched for one search query.
pub const SEARCH_FETCH_LIMIT: usize = 20;
pub const CARD_WIDTH: u16 = 24;
pub const CARD_HEIGHT: u16 = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub search_min_chars: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            search_debounce_ms: 300,
            search_min_chars: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub id: u32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    pub species: String,
    pub types: Vec<String>,
    pub stats: StatVector,
    pub height: u16,
    pub weight: u16,
    pub base_experience: Option<u16>,
    pub abilities: Vec<String>,
}

impl PokemonDetail {
    pub fn record(&self) -> CreatureRecord {
        CreatureRecord::new(self.id, self.name.clone(), self.stats)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionStage {
    pub id: u32,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    Type,
    Generation,
}

impl FilterKind {
    pub fn key(self) -> &'static str {
        match self {
            FilterKind::Type => "type",
            FilterKind::Generation => "generation",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub options: Vec<String>,
    pub active: Option<String>,
    /// Membership per option, filled lazily as options get selected.
    pub members: HashMap<String, HashSet<String>>,
    pub loading: bool,
    pub options_loading: bool,
}

impl FilterState {
    /// Steps through `None -> first -> ... -> last -> None`. Returns false when
    /// there is nothing to cycle through.
    pub fn cycle(&mut self, delta: i32) -> bool {
        if self.options.is_empty() {
            return false;
        }
        // position 0 is "no filter", options start at 1
        let slots = self.options.len() as i32 + 1;
        let current = self
            .active
            .as_ref()
            .and_then(|name| self.options.iter().position(|option| option == name))
            .map(|idx| idx as i32 + 1)
            .unwrap_or(0);
        let next = (current + delta).rem_euclid(slots);
        self.active = if next == 0 {
            None
        } else {
            self.options.get(next as usize - 1).cloned()
        };
        true
    }

    pub fn needs_members(&self) -> Option<&str> {
        let name = self.active.as_deref()?;
        if self.members.contains_key(name) {
            None
        } else {
            Some(name)
        }
    }

    fn admits(&self, key: &str) -> bool {
        match self.active.as_ref() {
            None => true,
            Some(name) => self
                .members
                .get(name)
                .map(|members| members.contains(key))
                .unwrap_or(false),
        }
    }

    pub fn label(&self) -> String {
        self.active
            .as_deref()
            .map(|name| name.to_ascii_uppercase())
            .unwrap_or_else(|| "ALL".to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// Request family behind a status message, so a later success of the same
/// family can clear it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadSource {
    Page,
    Index,
    Types,
    Generations,
    Filter(FilterKind),
    Search,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub source: LoadSource,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverlayState {
    pub name: String,
    pub evolution: DataResource<Vec<EvolutionStage>>,
}

impl OverlayState {
    pub fn new(name: String) -> Self {
        Self {
            name,
            evolution: DataResource::Loading,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub settings: CatalogSettings,

    pub catalog: Vec<PokemonDetail>,
    pub next_offset: u32,
    pub total_count: Option<u32>,
    pub page_loading: bool,

    pub name_index: Vec<NamedEntry>,
    pub index_loading: bool,
    pub search_fetching: bool,

    pub type_filter: FilterState,
    pub generation_filter: FilterState,
    pub search: SearchState,
    pub filtered_indices: Vec<usize>,
    pub selected_index: usize,

    pub overlay: Option<OverlayState>,
    pub message: Option<StatusMessage>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CatalogSettings::default())
    }
}

impl AppState {
    pub fn new(settings: CatalogSettings) -> Self {
        Self {
            terminal_size: (80, 24),
            settings,
            catalog: Vec::new(),
            next_offset: 0,
            total_count: None,
            page_loading: false,
            name_index: Vec::new(),
            index_loading: false,
            search_fetching: false,
            type_filter: FilterState::default(),
            generation_filter: FilterState::default(),
            search: SearchState::default(),
            filtered_indices: Vec::new(),
            selected_index: 0,
            overlay: None,
            message: None,
            tick: 0,
        }
    }

    pub fn report_error(&mut self, source: LoadSource, text: String) {
        self.message = Some(StatusMessage { source, text });
    }

    /// Drops the status message if `source` produced it.
    pub fn clear_error(&mut self, source: LoadSource) {
        if self.message.as_ref().is_some_and(|message| message.source == source) {
            self.message = None;
        }
    }

    pub fn filter_mut(&mut self, kind: FilterKind) -> &mut FilterState {
        match kind {
            FilterKind::Type => &mut self.type_filter,
            FilterKind::Generation => &mut self.generation_filter,
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &PokemonDetail> + '_ {
        self.filtered_indices
            .iter()
            .filter_map(|idx| self.catalog.get(*idx))
    }

    pub fn visible_len(&self) -> usize {
        self.filtered_indices.len()
    }

    /// The aggregation domain for the stat view: everything currently shown.
    pub fn visible_records(&self) -> Vec<CreatureRecord> {
        self.visible().map(PokemonDetail::record).collect()
    }

    pub fn selected_detail(&self) -> Option<&PokemonDetail> {
        self.filtered_indices
            .get(self.selected_index)
            .and_then(|idx| self.catalog.get(*idx))
    }

    pub fn find(&self, name: &str) -> Option<&PokemonDetail> {
        self.catalog.iter().find(|detail| detail.name == name)
    }

    pub fn overlay_detail(&self) -> Option<&PokemonDetail> {
        let overlay = self.overlay.as_ref()?;
        self.find(&overlay.name)
    }

    pub fn visible_position(&self, name: &str) -> Option<usize> {
        self.filtered_indices
            .iter()
            .position(|idx| self.catalog.get(*idx).map(|d| d.name.as_str()) == Some(name))
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.filtered_indices.is_empty() {
            let changed = self.selected_index != 0;
            self.selected_index = 0;
            return changed;
        }
        let bounded = index.min(self.filtered_indices.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    /// Adds creatures not already in the catalog and keeps it ordered by id.
    /// Returns how many were new.
    pub fn insert_details(&mut self, details: Vec<PokemonDetail>) -> usize {
        let mut known: HashSet<String> =
            self.catalog.iter().map(|detail| detail.name.clone()).collect();
        let before = self.catalog.len();
        for detail in details {
            if known.insert(detail.name.clone()) {
                self.catalog.push(detail);
            }
        }
        self.catalog.sort_by_key(|detail| detail.id);
        self.catalog.len() - before
    }

    /// Recomputes the visible catalog. The selection stays on the same creature
    /// when it is still visible.
    pub fn rebuild_filtered(&mut self) {
        let previous = self.selected_detail().map(|detail| detail.name.clone());
        let query = self.search.query.trim().to_lowercase();
        self.filtered_indices = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, detail)| {
                let matches_query = query.is_empty()
                    || detail.name.contains(&query)
                    || detail.id.to_string() == query;
                matches_query
                    && self.type_filter.admits(&detail.name)
                    && self.generation_filter.admits(&detail.species)
            })
            .map(|(idx, _)| idx)
            .collect();

        let position = previous.and_then(|name| self.visible_position(&name));
        match position {
            Some(index) => self.selected_index = index,
            None if self.selected_index >= self.filtered_indices.len() => {
                self.selected_index = self.filtered_indices.len().saturating_sub(1);
            }
            None => {}
        }
    }

    pub fn has_more_pages(&self) -> bool {
        match self.total_count {
            Some(total) => self.next_offset < total,
            None => true,
        }
    }

    /// Names in the search index matching the current query that have not
    /// been loaded yet, capped at [`SEARCH_FETCH_LIMIT`].
    pub fn unloaded_search_matches(&self) -> Vec<String> {
        let query = self.search.query.trim().to_lowercase();
        if query.chars().count() < self.settings.search_min_chars.max(1) {
            return Vec::new();
        }
        let loaded: HashSet<&str> = self
            .catalog
            .iter()
            .map(|detail| detail.name.as_str())
            .collect();
        self.name_index
            .iter()
            .filter(|entry| entry.name.contains(&query) && !loaded.contains(entry.name.as_str()))
            .take(SEARCH_FETCH_LIMIT)
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn grid_columns(&self) -> usize {
        grid_columns(self.terminal_size.0.saturating_sub(2))
    }

    pub fn is_busy(&self) -> bool {
        self.page_loading
            || self.search_fetching
            || self.type_filter.loading
            || self.generation_filter.loading
            || self
                .overlay
                .as_ref()
                .map(|overlay| overlay.evolution.is_loading())
                .unwrap_or(false)
    }
}

/// Number of card columns that fit in `width` cells (at least one).
pub fn grid_columns(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Catalog")
                .entry("loaded", ron_string(&self.catalog.len()))
                .entry("visible", ron_string(&self.filtered_indices.len()))
                .entry("selected", ron_string(&self.selected_index))
                .entry("next_offset", ron_string(&self.next_offset))
                .entry("total", ron_string(&self.total_count))
                .entry("index", ron_string(&self.name_index.len())),
            DebugSection::new("Filters")
                .entry("type", ron_string(&self.type_filter.active))
                .entry("generation", ron_string(&self.generation_filter.active))
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active)),
            DebugSection::new("Status")
                .entry("page_loading", ron_string(&self.page_loading))
                .entry("search_fetching", ron_string(&self.search_fetching))
                .entry(
                    "overlay",
                    ron_string(&self.overlay.as_ref().map(|overlay| overlay.name.clone())),
                )
                .entry(
                    "message",
                    ron_string(&self.message.as_ref().map(|message| message.text.clone())),
                ),
        ]
    }
}
