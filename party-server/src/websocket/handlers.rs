use std::sync::Arc;
use tracing::{debug, info};

use crate::groups::{GroupError, GroupManager};
use crate::websocket::connection::{ConnectionId, ConnectionRegistry};
use party_types::{ClientMessage, ServerMessage};

#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
    groups: Arc<GroupManager>,
    // Name supplied by the auth proxy, used when a join carries none
    remote_user: Option<String>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        registry: Arc<ConnectionRegistry>,
        groups: Arc<GroupManager>,
        remote_user: Option<String>,
    ) -> Self {
        Self {
            connection_id,
            registry,
            groups,
            remote_user,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), GroupError> {
        self.registry.update_activity(self.connection_id).await;

        match message {
            ClientMessage::Join { name, group } => self.handle_join(name, group).await,
            ClientMessage::Advance => {
                self.groups.advance(self.connection_id).await?;
                Ok(())
            }
            ClientMessage::SubmitWord { text } => {
                self.groups.submit_word(self.connection_id, &text).await?;
                Ok(())
            }
            ClientMessage::SubmitVote { target_index } => {
                self.groups
                    .submit_vote(self.connection_id, target_index)
                    .await?;
                Ok(())
            }
            ClientMessage::Leave => self.groups.leave(self.connection_id).await,
            ClientMessage::Ping => self.send_message(ServerMessage::Pong).await,
        }
    }

    pub async fn handle_disconnect(&self) {
        info!("Handling disconnect for connection {}", self.connection_id);
        self.groups.disconnect(self.connection_id).await;
    }

    async fn handle_join(&self, name: String, group: String) -> Result<(), GroupError> {
        let name = if name.trim().is_empty() {
            self.remote_user.clone().unwrap_or_default()
        } else {
            name
        };

        let player_id = self.groups.join(self.connection_id, &name, &group).await?;
        info!(
            "Connection {} joined group {} as player {}",
            self.connection_id,
            group.trim(),
            player_id
        );
        Ok(())
    }

    async fn send_message(&self, message: ServerMessage) -> Result<(), GroupError> {
        self.registry
            .send_to_connection(self.connection_id, message)
            .await?;
        Ok(())
    }

    pub async fn send_error(&self, message: impl Into<String>) {
        let message = ServerMessage::Error {
            message: message.into(),
        };
        if let Err(e) = self.send_message(message).await {
            debug!("Could not report error to {}: {}", self.connection_id, e);
        }
    }
}
