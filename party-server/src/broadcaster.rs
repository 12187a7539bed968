use std::sync::Arc;

use party_types::{PlayerId, ServerMessage, SessionStateSnapshot};
use tracing::debug;

use crate::websocket::{ConnectionId, ConnectionRegistry};

/// Pushes group snapshots to member connections. Each recipient gets its
/// own personalised copy; a closed connection is skipped, never waited on.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn send_snapshot<'a, I>(&self, snapshot: &SessionStateSnapshot, members: I)
    where
        I: IntoIterator<Item = (&'a ConnectionId, &'a PlayerId)>,
    {
        for (connection_id, player_id) in members {
            self.send_to(*connection_id, *player_id, snapshot).await;
        }
    }

    pub async fn send_to(
        &self,
        connection_id: ConnectionId,
        player_id: PlayerId,
        snapshot: &SessionStateSnapshot,
    ) {
        let message = ServerMessage::StateUpdate {
            state: snapshot.personalized_for(player_id),
        };
        if let Err(e) = self.registry.send_to_connection(connection_id, message).await {
            debug!("Skipping snapshot for {}: {}", connection_id, e);
        }
    }
}
