//! Store-level flows driven through EffectStoreTestHarness

use pokecatalog::{
    action::Action,
    components::{CardGrid, CardGridProps, Component},
    effect::Effect,
    reducer::reducer,
    state::{AppState, FilterKind, NamedEntry, PokemonDetail},
    stats::StatVector,
};
use tui_dispatch::testing::*;
use tui_dispatch::{EffectStore, NumericComponentId};

fn pokemon(id: u32, name: &str, types: &[&str]) -> PokemonDetail {
    PokemonDetail {
        id,
        name: name.to_string(),
        species: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        stats: StatVector::new([id * 10, id * 10, id * 10, id * 10, id * 10, id * 10]),
        height: 10,
        weight: 100,
        base_experience: Some(64),
        abilities: Vec::new(),
    }
}

fn first_page() -> Vec<PokemonDetail> {
    vec![
        pokemon(1, "bulbasaur", &["grass", "poison"]),
        pokemon(4, "charmander", &["fire"]),
        pokemon(7, "squirtle", &["water"]),
    ]
}

#[test]
fn test_startup_flow() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.page_loading && s.index_loading);

    let effects = harness.drain_effects();
    effects.effects_count(4);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { offset: 0, limit: 20 }));

    harness.complete_action(Action::PageDidLoad {
        offset: 0,
        count: 1302,
        pokemon: first_page(),
    });
    harness.complete_action(Action::TypesDidLoad(vec!["fire".into(), "grass".into()]));
    let (changed, total) = harness.process_emitted();
    assert_eq!(total, 2);
    assert_eq!(changed, 2);

    harness.assert_state(|s| s.visible_len() == 3);
    harness.assert_state(|s| s.next_offset == 20);
    harness.assert_state(|s| !s.page_loading);
}

#[test]
fn test_type_filter_flow() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_all([
        Action::PageDidLoad {
            offset: 0,
            count: 3,
            pokemon: first_page(),
        },
        Action::TypesDidLoad(vec!["fire".into(), "water".into()]),
    ]);

    harness.dispatch_collect(Action::FilterNext(FilterKind::Type));
    harness.assert_state(|s| s.type_filter.active.as_deref() == Some("fire"));
    harness.assert_state(|s| s.type_filter.loading);
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(e, Effect::LoadFilterMembers { kind: FilterKind::Type, name } if name == "fire")
    });

    harness.complete_action(Action::FilterDidLoad {
        kind: FilterKind::Type,
        name: "fire".into(),
        members: vec!["charmander".into(), "charmeleon".into()],
    });
    harness.process_emitted();
    harness.assert_state(|s| s.visible_len() == 1);
    harness.assert_state(|s| {
        s.selected_detail().map(|d| d.name.as_str()) == Some("charmander")
    });

    harness.dispatch_collect(Action::FilterClear);
    harness.assert_state(|s| s.visible_len() == 3);
}

#[test]
fn test_generation_filter_uses_species() {
    let mut state = AppState::default();
    let mut form = pokemon(386, "deoxys-normal", &["psychic"]);
    form.species = "deoxys".into();
    state.insert_details(vec![form, pokemon(1, "bulbasaur", &["grass"])]);
    state.generation_filter.options = vec!["generation-iii".into()];
    state.rebuild_filtered();

    let mut store = EffectStore::new(state, reducer);
    store.dispatch(Action::FilterNext(FilterKind::Generation));
    store.dispatch(Action::FilterDidLoad {
        kind: FilterKind::Generation,
        name: "generation-iii".into(),
        members: vec!["deoxys".into()],
    });

    assert_eq!(store.state().visible_len(), 1);
    assert_eq!(
        store.state().selected_detail().map(|d| d.name.as_str()),
        Some("deoxys-normal")
    );
}

#[test]
fn test_search_expands_past_loaded_pages() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_all([
        Action::PageDidLoad {
            offset: 0,
            count: 1302,
            pokemon: first_page(),
        },
        Action::IndexDidLoad(vec![
            NamedEntry { id: 4, name: "charmander".into() },
            NamedEntry { id: 5, name: "charmeleon".into() },
            NamedEntry { id: 6, name: "charizard".into() },
        ]),
    ]);
    harness.drain_effects();

    harness.dispatch_all([
        Action::SearchStart,
        Action::SearchInput('c'),
        Action::SearchInput('h'),
    ]);
    harness.assert_state(|s| !s.search_fetching);
    let effects = harness.drain_effects();
    effects.effects_all_match(|e| matches!(e, Effect::CancelSearchFetch));

    harness.dispatch_all([Action::SearchInput('a'), Action::SearchInput('r')]);
    harness.assert_state(|s| s.search_fetching);
    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_all_match(|e| {
        matches!(e, Effect::SearchFetch { names, .. } if names.len() == 2)
    });

    harness.complete_action(Action::SearchDidLoad(vec![
        pokemon(5, "charmeleon", &["fire"]),
        pokemon(6, "charizard", &["fire", "flying"]),
    ]));
    harness.process_emitted();
    harness.assert_state(|s| s.visible_len() == 3);
    harness.assert_state(|s| s.catalog.len() == 5);

    harness.dispatch_collect(Action::SearchSubmit);
    harness.assert_state(|s| !s.search.active && s.search.query == "char");
}

#[test]
fn test_keyboard_opens_overlay_with_evolution_fetch() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::PageDidLoad {
        offset: 0,
        count: 3,
        pokemon: first_page(),
    });
    let mut grid = CardGrid;

    let actions = harness.send_keys::<NumericComponentId, _, _>("l", |state, event| {
        grid.handle_event(
            &event.kind,
            CardGridProps {
                state,
                is_focused: true,
            },
        )
        .into_iter()
        .collect::<Vec<_>>()
    });
    actions.assert_first(Action::SelectionMove(1));
    for action in actions {
        harness.dispatch_collect(action);
    }

    harness.dispatch_collect(Action::OverlayOpen);
    harness.assert_state(|s| {
        s.overlay.as_ref().map(|o| o.name.as_str()) == Some("charmander")
    });
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(e, Effect::LoadEvolution { name } if name == "charmander")
    });
}

#[test]
fn test_unfocused_grid_ignores_keys() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    let mut grid = CardGrid;
    let actions = harness.send_keys::<NumericComponentId, _, _>("j k m c", |state, event| {
        grid.handle_event(
            &event.kind,
            CardGridProps {
                state,
                is_focused: false,
            },
        )
        .into_iter()
        .collect::<Vec<_>>()
    });
    actions.assert_empty();
}
