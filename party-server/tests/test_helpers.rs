#![allow(dead_code)]

use party_core::RoundSettings;
use party_server::groups::GroupManager;
use party_server::websocket::{ConnectionId, ConnectionRegistry};
use party_types::{GameState, GameType, PlayerId, ServerMessage, SessionStateSnapshot};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

pub type Inbox = UnboundedReceiver<ServerMessage>;

/// Test setup that provides all necessary components
pub struct TestPartySetup {
    pub registry: Arc<ConnectionRegistry>,
    pub groups: Arc<GroupManager>,
}

impl TestPartySetup {
    pub fn new() -> Self {
        Self::with_settings(RoundSettings::default())
    }

    /// Setup whose groups only ever pick from `games`
    pub fn with_games(games: &[GameType]) -> Self {
        Self::with_settings(RoundSettings::default().with_games(games))
    }

    pub fn with_settings(settings: RoundSettings) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            groups: Arc::new(GroupManager::new(registry.clone(), settings)),
            registry,
        }
    }

    pub async fn connect(&self) -> (ConnectionId, Inbox) {
        let connection_id = ConnectionId::new();
        let inbox = self.registry.create_connection(connection_id).await;
        (connection_id, inbox)
    }

    /// Opens a connection and joins it to `group`
    pub async fn join(&self, name: &str, group: &str) -> (ConnectionId, PlayerId, Inbox) {
        let (connection_id, inbox) = self.connect().await;
        let player_id = self
            .groups
            .join(connection_id, name, group)
            .await
            .expect("join should succeed");
        (connection_id, player_id, inbox)
    }
}

/// Everything queued for a connection so far
pub fn drain(inbox: &mut Inbox) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = inbox.try_recv() {
        messages.push(message);
    }
    messages
}

pub fn states(messages: &[ServerMessage]) -> Vec<SessionStateSnapshot> {
    messages
        .iter()
        .filter_map(|message| match message {
            ServerMessage::StateUpdate { state } => Some(state.clone()),
            _ => None,
        })
        .collect()
}

/// Latest snapshot queued for a connection, draining the rest
pub fn latest_state(inbox: &mut Inbox) -> Option<SessionStateSnapshot> {
    states(&drain(inbox)).pop()
}

/// Waits for the next snapshot. With paused time this lets the runtime jump
/// to the next pending timer.
pub async fn next_state(inbox: &mut Inbox) -> SessionStateSnapshot {
    loop {
        match inbox.recv().await {
            Some(ServerMessage::StateUpdate { state }) => return state,
            Some(_) => continue,
            None => panic!("connection closed while waiting for a state update"),
        }
    }
}

pub async fn wait_for_phase(inbox: &mut Inbox, phase: GameState) -> SessionStateSnapshot {
    loop {
        let state = next_state(inbox).await;
        if state.game_state == phase {
            return state;
        }
    }
}
