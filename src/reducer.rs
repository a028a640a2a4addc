use std::time::Duration;

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, FilterKind, LoadSource, OverlayState};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.page_loading = true;
            state.index_loading = true;
            state.type_filter.options_loading = true;
            state.generation_filter.options_loading = true;
            state.message = None;
            DispatchResult::changed_with_many(vec![
                Effect::LoadPage {
                    offset: state.next_offset,
                    limit: state.settings.page_size,
                },
                Effect::LoadTypes,
                Effect::LoadGenerations,
                Effect::LoadNameIndex,
            ])
        }

        Action::PageLoadMore => {
            if state.page_loading || !state.has_more_pages() {
                return DispatchResult::unchanged();
            }
            state.page_loading = true;
            state.clear_error(LoadSource::Page);
            DispatchResult::changed_with(Effect::LoadPage {
                offset: state.next_offset,
                limit: state.settings.page_size,
            })
        }

        Action::PageDidLoad {
            offset,
            count,
            pokemon,
        } => {
            state.page_loading = false;
            state.clear_error(LoadSource::Page);
            state.total_count = Some(count);
            if offset == state.next_offset {
                state.next_offset = offset.saturating_add(state.settings.page_size).min(count);
            }
            state.insert_details(pokemon);
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::PageDidError { offset, error } => {
            state.page_loading = false;
            state.report_error(LoadSource::Page, format!("Page at {offset} failed: {error}"));
            DispatchResult::changed()
        }

        Action::IndexDidLoad(entries) => {
            state.index_loading = false;
            state.clear_error(LoadSource::Index);
            state.name_index = entries;
            // a query typed before the index arrived can expand now
            if state.search.query.is_empty() {
                return DispatchResult::changed();
            }
            DispatchResult::changed_with(search_effect(state))
        }

        Action::IndexDidError(error) => {
            state.index_loading = false;
            state.report_error(LoadSource::Index, format!("Search index error: {error}"));
            DispatchResult::changed()
        }

        Action::TypesDidLoad(types) => {
            state.type_filter.options_loading = false;
            state.type_filter.options = types;
            state.clear_error(LoadSource::Types);
            DispatchResult::changed()
        }

        Action::TypesDidError(error) => {
            state.type_filter.options_loading = false;
            state.report_error(LoadSource::Types, format!("Type error: {error}"));
            DispatchResult::changed()
        }

        Action::GenerationsDidLoad(generations) => {
            state.generation_filter.options_loading = false;
            state.generation_filter.options = generations;
            state.clear_error(LoadSource::Generations);
            DispatchResult::changed()
        }

        Action::GenerationsDidError(error) => {
            state.generation_filter.options_loading = false;
            state.report_error(LoadSource::Generations, format!("Generation error: {error}"));
            DispatchResult::changed()
        }

        Action::FilterNext(kind) => cycle_filter(state, kind, 1),
        Action::FilterPrev(kind) => cycle_filter(state, kind, -1),

        Action::FilterClear => {
            if state.type_filter.active.is_none() && state.generation_filter.active.is_none() {
                return DispatchResult::unchanged();
            }
            for kind in [FilterKind::Type, FilterKind::Generation] {
                let filter = state.filter_mut(kind);
                filter.active = None;
                filter.loading = false;
            }
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::FilterDidLoad {
            kind,
            name,
            members,
        } => {
            let filter = state.filter_mut(kind);
            filter.members.insert(name.clone(), members.into_iter().collect());
            if filter.active.as_deref() != Some(name.as_str()) {
                return DispatchResult::unchanged();
            }
            filter.loading = false;
            state.clear_error(LoadSource::Filter(kind));
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::FilterDidError { kind, name, error } => {
            let filter = state.filter_mut(kind);
            if filter.active.as_deref() == Some(name.as_str()) {
                filter.loading = false;
            }
            let text = format!("{} {name} error: {error}", kind.key());
            state.report_error(LoadSource::Filter(kind), text);
            DispatchResult::changed()
        }

        Action::SelectionMove(delta) => move_selection(state, delta as i64),

        Action::SelectionRow(delta) => {
            let columns = state.grid_columns() as i64;
            move_selection(state, delta as i64 * columns)
        }

        Action::SelectionJumpTop => {
            if !state.set_selected_index(0) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SelectionJumpBottom => {
            let last = state.visible_len().saturating_sub(1);
            if !state.set_selected_index(last) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SearchStart => {
            state.search.active = true;
            state.search.query.clear();
            state.search_fetching = false;
            state.rebuild_filtered();
            DispatchResult::changed_with(Effect::CancelSearchFetch)
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.search_fetching = false;
            state.rebuild_filtered();
            DispatchResult::changed_with(Effect::CancelSearchFetch)
        }

        Action::SearchSubmit => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            state.rebuild_filtered();
            DispatchResult::changed_with(search_effect(state))
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.rebuild_filtered();
            DispatchResult::changed_with(search_effect(state))
        }

        Action::SearchDidLoad(pokemon) => {
            state.search_fetching = false;
            state.clear_error(LoadSource::Search);
            state.insert_details(pokemon);
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchDidError(error) => {
            state.search_fetching = false;
            state.report_error(LoadSource::Search, format!("Search error: {error}"));
            DispatchResult::changed()
        }

        Action::OverlayOpen => {
            let Some(name) = state.selected_detail().map(|detail| detail.name.clone()) else {
                return DispatchResult::unchanged();
            };
            state.overlay = Some(OverlayState::new(name.clone()));
            DispatchResult::changed_with(Effect::LoadEvolution { name })
        }

        Action::OverlayClose => {
            if state.overlay.take().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::OverlayNext => step_overlay(state, 1),
        Action::OverlayPrev => step_overlay(state, -1),

        Action::EvolutionDidLoad { name, stages } => match state.overlay.as_mut() {
            Some(overlay) if overlay.name == name => {
                overlay.evolution = DataResource::Loaded(stages);
                DispatchResult::changed()
            }
            _ => DispatchResult::unchanged(),
        },

        Action::EvolutionDidError { name, error } => match state.overlay.as_mut() {
            Some(overlay) if overlay.name == name => {
                overlay.evolution = DataResource::Failed(error);
                DispatchResult::changed()
            }
            _ => DispatchResult::unchanged(),
        },

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        Action::Tick => {
            if !state.is_busy() {
                return DispatchResult::unchanged();
            }
            state.tick = state.tick.wrapping_add(1);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn move_selection(state: &mut AppState, delta: i64) -> DispatchResult<Effect> {
    let index = (state.selected_index as i64 + delta).max(0);
    if !state.set_selected_index(index as usize) {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed()
}

fn cycle_filter(state: &mut AppState, kind: FilterKind, step: i32) -> DispatchResult<Effect> {
    let filter = state.filter_mut(kind);
    if !filter.cycle(step) {
        return DispatchResult::unchanged();
    }

    let missing = filter.needs_members().map(str::to_string);
    filter.loading = missing.is_some();
    state.rebuild_filtered();
    match missing {
        Some(name) => DispatchResult::changed_with(Effect::LoadFilterMembers { kind, name }),
        None => DispatchResult::changed(),
    }
}

/// Expands the current query into a debounced remote fetch, or cancels any
/// pending one when there is nothing left to fetch.
fn search_effect(state: &mut AppState) -> Effect {
    let names = state.unloaded_search_matches();
    if names.is_empty() {
        state.search_fetching = false;
        return Effect::CancelSearchFetch;
    }
    state.search_fetching = true;
    Effect::SearchFetch {
        names,
        delay: Duration::from_millis(state.settings.search_debounce_ms),
    }
}

fn step_overlay(state: &mut AppState, step: i64) -> DispatchResult<Effect> {
    let Some(current) = state.overlay.as_ref().map(|overlay| overlay.name.clone()) else {
        return DispatchResult::unchanged();
    };
    let len = state.visible_len() as i64;
    if len == 0 {
        return DispatchResult::unchanged();
    }

    let next = match state.visible_position(&current) {
        Some(position) => (position as i64 + step).rem_euclid(len),
        None => 0,
    } as usize;
    state.set_selected_index(next);
    let Some(name) = state.selected_detail().map(|detail| detail.name.clone()) else {
        return DispatchResult::unchanged();
    };
    if name == current {
        return DispatchResult::unchanged();
    }
    state.overlay = Some(OverlayState::new(name.clone()));
    DispatchResult::changed_with(Effect::LoadEvolution { name })
}
