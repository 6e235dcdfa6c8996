//! Scripted host implementations.
//!
//! The engine reaches the outside world only through the host traits; the
//! types here script that world. Both doubles are cheap clones over shared
//! state, so a test keeps one handle for steering and inspection after
//! moving the other into a `HostBundle`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use limen_orchestrator::{
    DocumentFetcher, FetchError, FetchedDocument, PlayerKind, VideoPlayer, Widget, WidgetHost,
};

use crate::pages;

/// Serves manifest pages by route and records every request.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    inner: Rc<RefCell<FetchLog>>,
}

#[derive(Debug, Default)]
struct FetchLog {
    requests: Vec<String>,
    failures: HashMap<String, FetchError>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a failure for one path. Fetches of that path keep failing
    /// until [`clear_failure`](Self::clear_failure).
    pub fn fail_path(&self, path: &str, error: FetchError) {
        self.inner
            .borrow_mut()
            .failures
            .insert(path.to_string(), error);
    }

    pub fn clear_failure(&self, path: &str) {
        self.inner.borrow_mut().failures.remove(path);
    }

    /// Every path fetched so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.inner.borrow().requests.clone()
    }
}

impl DocumentFetcher for ScriptedFetcher {
    fn fetch(&mut self, path: &str) -> Result<FetchedDocument, FetchError> {
        {
            let mut log = self.inner.borrow_mut();
            log.requests.push(path.to_string());
            if let Some(error) = log.failures.get(path) {
                return Err(error.clone());
            }
        }
        let name = route_to_name(path)
            .ok_or_else(|| FetchError::Network(format!("no fixture behind {path}")))?;
        pages::document(&name).map_err(|e| FetchError::Network(e.to_string()))
    }
}

fn route_to_name(path: &str) -> Option<String> {
    pages::keys()
        .into_iter()
        .find(|name| pages::route(name).map(|route| route == path).unwrap_or(false))
}

/// Observable state behind a [`ScriptedPlayer`]. Tests keep the shared
/// handle and flip `ready` to model an asynchronous player boot.
#[derive(Clone, Debug, Default)]
pub struct PlayerState {
    pub ready: bool,
    pub playing: bool,
    pub time: f32,
    pub duration: Option<f32>,
    pub destroyed: bool,
}

pub type SharedPlayerState = Rc<RefCell<PlayerState>>;

/// Player double. Position and duration answer only once ready, matching
/// how the real embeds behave before their API handshake lands.
pub struct ScriptedPlayer {
    kind: PlayerKind,
    state: SharedPlayerState,
}

impl ScriptedPlayer {
    pub fn new(kind: PlayerKind, ready: bool) -> Self {
        Self {
            kind,
            state: Rc::new(RefCell::new(PlayerState {
                ready,
                duration: Some(120.0),
                ..PlayerState::default()
            })),
        }
    }

    pub fn state(&self) -> SharedPlayerState {
        Rc::clone(&self.state)
    }
}

impl VideoPlayer for ScriptedPlayer {
    fn kind(&self) -> PlayerKind {
        self.kind
    }

    fn is_ready(&self) -> bool {
        self.state.borrow().ready
    }

    fn play(&mut self) {
        self.state.borrow_mut().playing = true;
    }

    fn pause(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn current_time(&self) -> Option<f32> {
        let state = self.state.borrow();
        state.ready.then_some(state.time)
    }

    fn duration(&self) -> Option<f32> {
        let state = self.state.borrow();
        if state.ready {
            state.duration
        } else {
            None
        }
    }

    fn seek_to(&mut self, seconds: f32) {
        self.state.borrow_mut().time = seconds;
    }

    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.playing = false;
    }
}

/// Records widget traffic and answers readiness polls on a script.
#[derive(Clone, Default)]
pub struct RecordingWidgetHost {
    inner: Rc<RefCell<WidgetLog>>,
}

struct WidgetLog {
    injected: Vec<Widget>,
    initialized: Vec<Widget>,
    rebinds: Vec<String>,
    ready_after: HashMap<Widget, u32>,
    polls: HashMap<Widget, u32>,
    players: Vec<(PlayerKind, String, SharedPlayerState)>,
    players_start_ready: bool,
    player_capability: bool,
}

impl Default for WidgetLog {
    fn default() -> Self {
        Self {
            injected: Vec::new(),
            initialized: Vec::new(),
            rebinds: Vec::new(),
            ready_after: HashMap::new(),
            polls: HashMap::new(),
            players: Vec::new(),
            players_start_ready: true,
            player_capability: true,
        }
    }
}

impl RecordingWidgetHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `false` for a widget's first `polls` readiness checks.
    pub fn delay_ready(&self, widget: Widget, polls: u32) {
        self.inner.borrow_mut().ready_after.insert(widget, polls);
    }

    /// Created players start not-ready; flip their shared state to proceed.
    pub fn hold_players_unready(&self) {
        self.inner.borrow_mut().players_start_ready = false;
    }

    /// No player capability at all: `create_player` answers `None`.
    pub fn disable_players(&self) {
        self.inner.borrow_mut().player_capability = false;
    }

    pub fn injected(&self) -> Vec<Widget> {
        self.inner.borrow().injected.clone()
    }

    pub fn initialized(&self) -> Vec<Widget> {
        self.inner.borrow().initialized.clone()
    }

    pub fn rebinds(&self) -> Vec<String> {
        self.inner.borrow().rebinds.clone()
    }

    /// How many readiness polls a widget has answered.
    pub fn polls(&self, widget: Widget) -> u32 {
        self.inner
            .borrow()
            .polls
            .get(&widget)
            .copied()
            .unwrap_or(0)
    }

    pub fn player_count(&self) -> usize {
        self.inner.borrow().players.len()
    }

    /// Kind and source URL of the players created so far.
    pub fn player_requests(&self) -> Vec<(PlayerKind, String)> {
        self.inner
            .borrow()
            .players
            .iter()
            .map(|(kind, url, _)| (*kind, url.clone()))
            .collect()
    }

    pub fn player_state(&self, index: usize) -> Option<SharedPlayerState> {
        self.inner
            .borrow()
            .players
            .get(index)
            .map(|(_, _, state)| Rc::clone(state))
    }

    pub fn last_player(&self) -> Option<SharedPlayerState> {
        let log = self.inner.borrow();
        log.players.last().map(|(_, _, state)| Rc::clone(state))
    }
}

impl WidgetHost for RecordingWidgetHost {
    fn inject_script(&mut self, widget: Widget) {
        self.inner.borrow_mut().injected.push(widget);
    }

    fn widget_ready(&self, widget: Widget) -> bool {
        let mut log = self.inner.borrow_mut();
        let count = {
            let seen = log.polls.entry(widget).or_insert(0);
            *seen += 1;
            *seen
        };
        count > log.ready_after.get(&widget).copied().unwrap_or(0)
    }

    fn init_widget(&mut self, widget: Widget) {
        self.inner.borrow_mut().initialized.push(widget);
    }

    fn rebind(&mut self, page_id: &str) {
        self.inner.borrow_mut().rebinds.push(page_id.to_string());
    }

    fn create_player(&mut self, kind: PlayerKind, url: &str) -> Option<Box<dyn VideoPlayer>> {
        let mut log = self.inner.borrow_mut();
        if !log.player_capability {
            return None;
        }
        let state = Rc::new(RefCell::new(PlayerState {
            ready: log.players_start_ready,
            duration: Some(120.0),
            ..PlayerState::default()
        }));
        log.players.push((kind, url.to_string(), Rc::clone(&state)));
        Some(Box::new(ScriptedPlayer { kind, state }))
    }
}
