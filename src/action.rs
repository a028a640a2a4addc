use serde::{Deserialize, Serialize};

use crate::state::{EvolutionStage, FilterKind, NamedEntry, PokemonDetail};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    PageLoadMore,
    PageDidLoad {
        offset: u32,
        count: u32,
        pokemon: Vec<PokemonDetail>,
    },
    PageDidError {
        offset: u32,
        error: String,
    },

    IndexDidLoad(Vec<NamedEntry>),
    IndexDidError(String),

    TypesDidLoad(Vec<String>),
    TypesDidError(String),
    GenerationsDidLoad(Vec<String>),
    GenerationsDidError(String),

    FilterNext(FilterKind),
    FilterPrev(FilterKind),
    FilterClear,
    FilterDidLoad {
        kind: FilterKind,
        name: String,
        members: Vec<String>,
    },
    FilterDidError {
        kind: FilterKind,
        name: String,
        error: String,
    },

    SelectionMove(i16),
    SelectionRow(i16),
    SelectionJumpTop,
    SelectionJumpBottom,

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,
    SearchDidLoad(Vec<PokemonDetail>),
    SearchDidError(String),

    OverlayOpen,
    OverlayClose,
    OverlayNext,
    OverlayPrev,
    EvolutionDidLoad {
        name: String,
        stages: Vec<EvolutionStage>,
    },
    EvolutionDidError {
        name: String,
        error: String,
    },

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
