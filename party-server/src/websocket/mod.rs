use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::groups::GroupManager;
use party_types::ClientMessage;

pub mod connection;
pub mod handlers;
pub mod rate_limiter;


pub use connection::{ConnectionError, ConnectionId, ConnectionRegistry, Membership};
use handlers::MessageHandler;
pub use rate_limiter::RateLimiter;

/// Largest inbound frame the server reads.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024;

pub async fn handle_connection(
    websocket: WebSocket,
    registry: Arc<ConnectionRegistry>,
    groups: Arc<GroupManager>,
    rate_limiter: RateLimiter,
    remote_user: Option<String>,
) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let message_receiver = registry.create_connection(connection_id).await;
    let message_handler = MessageHandler::new(
        connection_id,
        registry.clone(),
        groups.clone(),
        remote_user,
    );

    let incoming_handler = {
        let message_handler = message_handler.clone();
        let mut rate_limiter = rate_limiter;

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        if msg.is_close() {
                            break;
                        }
                        handle_message(msg, &mut rate_limiter, &message_handler).await;
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        }
    };

    let outgoing_handler = async move {
        let mut receiver = message_receiver;

        while let Some(message) = receiver.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize message: {:?}", e);
                    continue;
                }
            };

            if let Err(e) = ws_sender.send(Message::text(json)).await {
                warn!("Failed to send message to {}: {:?}", connection_id, e);
                break;
            }
        }
    };

    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    info!("Connection {} disconnected", connection_id);
    message_handler.handle_disconnect().await;
    registry.remove_connection(connection_id).await;
}

/// Malformed or throttled input is answered with an error message; the
/// connection stays open.
async fn handle_message(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    message_handler: &MessageHandler,
) {
    if !rate_limiter.check_rate_limit() {
        warn!(
            "Rate limit exceeded for connection {}",
            message_handler.connection_id()
        );
        message_handler.send_error("Rate limit exceeded").await;
        return;
    }

    if !msg.is_text() {
        return;
    }

    let Ok(text) = msg.to_str() else {
        return;
    };

    let client_message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            message_handler
                .send_error(format!("Invalid message: {}", e))
                .await;
            return;
        }
    };

    if let Err(e) = message_handler.handle_message(client_message).await {
        message_handler.send_error(e.to_string()).await;
    }
}
