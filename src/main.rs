//! Pokecatalog - browse and compare Pokemon base stats

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pokecatalog::action::Action;
use pokecatalog::api;
use pokecatalog::components::{
    overlay_area, CardGridProps, CatalogLayout, CatalogView, CatalogViewProps, Component,
    DetailOverlayProps, SearchBarProps,
};
use pokecatalog::config::{init_tracing, Config};
use pokecatalog::effect::Effect;
use pokecatalog::reducer::reducer;
use pokecatalog::state::{AppState, FilterKind};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use tracing::{info, warn};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

const TICK_MS: u64 = 90;
const SEARCH_TASK: &str = "search";

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum CatalogComponentId {
    Grid,
    Overlay,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum CatalogContext {
    Grid,
    Overlay,
    Search,
}

impl EventRoutingState<CatalogComponentId, CatalogContext> for AppState {
    fn focused(&self) -> Option<CatalogComponentId> {
        if self.search.active {
            Some(CatalogComponentId::Search)
        } else if self.overlay.is_some() {
            Some(CatalogComponentId::Overlay)
        } else {
            Some(CatalogComponentId::Grid)
        }
    }

    fn modal(&self) -> Option<CatalogComponentId> {
        if self.search.active {
            Some(CatalogComponentId::Search)
        } else if self.overlay.is_some() {
            Some(CatalogComponentId::Overlay)
        } else {
            None
        }
    }

    fn binding_context(&self, id: CatalogComponentId) -> CatalogContext {
        match id {
            CatalogComponentId::Grid => CatalogContext::Grid,
            CatalogComponentId::Overlay => CatalogContext::Overlay,
            CatalogComponentId::Search => CatalogContext::Search,
        }
    }

    fn default_context(&self) -> CatalogContext {
        CatalogContext::Grid
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let config = Config::parse();
    let settings = config.settings();
    init_tracing(config.log_file.as_deref())?;
    api::configure(&config.api_base);
    info!(api_base = %config.api_base, page_size = settings.page_size, "starting");

    let debug = DebugSession::new(config.debug);

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(settings))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

struct CatalogUi {
    view: CatalogView,
}

impl CatalogUi {
    fn new() -> Self {
        Self {
            view: CatalogView::default(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<CatalogComponentId>,
    ) {
        let layout = CatalogLayout::split(area);
        event_ctx.set_component_area(CatalogComponentId::Grid, layout.grid);
        if state.search.active {
            event_ctx.set_component_area(CatalogComponentId::Search, layout.header);
        } else {
            event_ctx
                .component_areas
                .remove(&CatalogComponentId::Search);
        }
        if state.overlay.is_some() {
            event_ctx.set_component_area(CatalogComponentId::Overlay, overlay_area(area));
        } else {
            event_ctx
                .component_areas
                .remove(&CatalogComponentId::Overlay);
        }

        self.view.render(frame, area, CatalogViewProps { state });
    }

    fn handle_grid_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = CardGridProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.view.grid.handle_event(event, props).into_iter().collect();
        handler_response(actions)
    }

    fn handle_overlay_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = DetailOverlayProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self
            .view
            .overlay
            .handle_event(event, props)
            .into_iter()
            .collect();
        handler_response(actions)
    }

    fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = SearchBarProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.view.search.handle_event(event, props).into_iter().collect();
        // the input swallows every key while open
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(CatalogUi::new()));
    let mut bus: EventBus<AppState, Action, CatalogComponentId, CatalogContext> = EventBus::new();
    let keybindings: Keybindings<CatalogContext> = Keybindings::new();

    let ui_grid = Rc::clone(&ui);
    bus.register(CatalogComponentId::Grid, move |event, state| {
        ui_grid.borrow_mut().handle_grid_event(&event.kind, state)
    });

    let ui_overlay = Rc::clone(&ui);
    bus.register(CatalogComponentId::Overlay, move |event, state| {
        ui_overlay
            .borrow_mut()
            .handle_overlay_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(CatalogComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Char('q') if !state.search.active => {
                HandlerResponse::action(Action::Quit)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    let client = api::client();
    match effect {
        Effect::LoadPage { offset, limit } => {
            ctx.tasks().spawn(TaskKey::new("page"), async move {
                match client.fetch_catalog_page(offset, limit).await {
                    Ok(page) => {
                        info!(offset, loaded = page.pokemon.len(), "page loaded");
                        Action::PageDidLoad {
                            offset,
                            count: page.count,
                            pokemon: page.pokemon,
                        }
                    }
                    Err(error) => {
                        warn!(offset, %error, "page load failed");
                        Action::PageDidError {
                            offset,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
        Effect::LoadNameIndex => {
            ctx.tasks().spawn(TaskKey::new("name_index"), async move {
                match client.fetch_name_index().await {
                    Ok(entries) => Action::IndexDidLoad(entries),
                    Err(error) => {
                        warn!(%error, "name index failed");
                        Action::IndexDidError(error.to_string())
                    }
                }
            });
        }
        Effect::LoadTypes => {
            ctx.tasks().spawn(TaskKey::new("types"), async move {
                match client.fetch_types().await {
                    Ok(types) => Action::TypesDidLoad(types),
                    Err(error) => Action::TypesDidError(error.to_string()),
                }
            });
        }
        Effect::LoadGenerations => {
            ctx.tasks().spawn(TaskKey::new("generations"), async move {
                match client.fetch_generations().await {
                    Ok(generations) => Action::GenerationsDidLoad(generations),
                    Err(error) => Action::GenerationsDidError(error.to_string()),
                }
            });
        }
        Effect::LoadFilterMembers { kind, name } => {
            let key = format!("{}_{name}", kind.key());
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let result = match kind {
                    FilterKind::Type => client.fetch_type_members(&name).await,
                    FilterKind::Generation => client.fetch_generation_members(&name).await,
                };
                match result {
                    Ok(members) => Action::FilterDidLoad {
                        kind,
                        name,
                        members,
                    },
                    Err(error) => {
                        warn!(filter = kind.key(), %name, %error, "filter members failed");
                        Action::FilterDidError {
                            kind,
                            name,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
        Effect::SearchFetch { names, delay } => {
            ctx.tasks().debounce(SEARCH_TASK, delay, async move {
                match client.fetch_pokemon_batch(&names).await {
                    Ok(pokemon) => Action::SearchDidLoad(pokemon),
                    Err(error) => Action::SearchDidError(error.to_string()),
                }
            });
        }
        Effect::CancelSearchFetch => {
            ctx.tasks().cancel(&TaskKey::new(SEARCH_TASK));
        }
        Effect::LoadEvolution { name } => {
            ctx.tasks().spawn(TaskKey::new("evolution"), async move {
                match client.fetch_evolution_line(&name).await {
                    Ok(stages) => Action::EvolutionDidLoad { name, stages },
                    Err(error) => {
                        warn!(%name, %error, "evolution failed");
                        Action::EvolutionDidError {
                            name,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
    }
}
