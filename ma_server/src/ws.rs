//! WebSocket endpoint: one connection per player for the whole session.
//!
//! Outbound messages fan in over an unbounded channel so the lobby and the
//! room actor can both reach the socket without sharing the sink.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info};
use modern_art::{ClientMessage, ServerMessage};
use tokio::sync::{Mutex, mpsc};

use crate::lobby::Lobby;

pub type SharedLobby = Arc<Mutex<Lobby>>;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(lobby): State<SharedLobby>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, lobby))
}

async fn handle_socket(socket: WebSocket, lobby: SharedLobby) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Set once the connection creates or joins a room.
    let mut player_id: Option<String> = None;

    while let Some(Ok(message)) = stream.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(parsed) => handle_message(&lobby, &tx, &mut player_id, parsed).await,
            Err(e) => {
                debug!("dropping malformed client message: {e}");
                send_error(&tx, "Invalid message");
            }
        }
    }

    if let Some(id) = &player_id {
        info!("connection for player {id} closed");
        lobby.lock().await.disconnect(id);
    }
    send_task.abort();
}

async fn handle_message(
    lobby: &SharedLobby,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    player_id: &mut Option<String>,
    message: ClientMessage,
) {
    match message {
        ClientMessage::CreateRoom { player_name } => {
            match lobby.lock().await.create_room(&player_name, tx.clone()) {
                Ok(id) => *player_id = Some(id),
                Err(e) => send_error(tx, &e),
            }
        }
        ClientMessage::JoinRoom {
            player_name,
            room_id,
        } => match lobby.lock().await.join_room(&player_name, &room_id, tx.clone()) {
            Ok(id) => *player_id = Some(id),
            Err(e) => send_error(tx, &e),
        },
        ClientMessage::ListRooms => {
            lobby.lock().await.list_rooms(tx);
        }
        ClientMessage::AddBot { difficulty } => {
            let result = match player_id {
                Some(id) => lobby.lock().await.add_bot(id, difficulty),
                None => Err("Not in a room".to_string()),
            };
            if let Err(e) = result {
                send_error(tx, &e);
            }
        }
        ClientMessage::RemoveBot => {
            let result = match player_id {
                Some(id) => lobby.lock().await.remove_bot(id),
                None => Err("Not in a room".to_string()),
            };
            if let Err(e) = result {
                send_error(tx, &e);
            }
        }
        ClientMessage::StartGame => {
            let result = match player_id {
                Some(id) => lobby.lock().await.start_game(id),
                None => Err("Not in a room".to_string()),
            };
            if let Err(e) = result {
                send_error(tx, &e);
            }
        }
        in_game => {
            let Some(action) = in_game.into_game_action() else {
                return;
            };
            let Some(id) = player_id else {
                send_error(tx, "Not in a room");
                return;
            };
            // Hold the lock only to resolve the route; the room actor does
            // the slow part.
            let route = lobby.lock().await.route_action(id);
            match route {
                Some((game, index)) => {
                    let _ = game.send((index, action));
                }
                None => send_error(tx, "No game in progress"),
            }
        }
    }
}

fn send_error(tx: &mpsc::UnboundedSender<ServerMessage>, message: &str) {
    let _ = tx.send(ServerMessage::Error {
        message: message.to_string(),
    });
}
