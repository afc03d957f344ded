//! Realtime WebSocket endpoint
//!
//! GET /ws?token=<JWT>
//! The token is optional: customers connect without one and may only join
//! `order:*` and `table:*` rooms. Browsers cannot set headers on a WebSocket,
//! so the token travels as a query parameter.
//!
//! 协议:
//! - Client → Server: [`ClientCommand`] (join-rooms, join-order, join-table, leave-room)
//! - Server → Client: [`ServerMessage`] (rooms-joined, joined, left, event, error)

use std::collections::HashMap;

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::realtime::{ClientCommand, Room, ServerMessage};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::auth::{CurrentUser, extractor::authenticate};
use crate::core::ServerState;
use crate::realtime::{RoomHub, authorize_join, staff_rooms};
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

const PING_INTERVAL: Duration = Duration::from_secs(30);
/// Outgoing messages buffered per connection
const OUTBOX_CAPACITY: usize = 128;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_ws))
}

#[derive(Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    token: Option<String>,
}

/// GET /ws?token=<JWT>
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let user = match query.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => Some(authenticate(state.jwt(), token, "/ws")?),
        None => None,
    };
    Ok(ws.on_upgrade(move |socket| ws_session(socket, state.hub.clone(), user)))
}

/// Per-connection room subscriptions
struct Session {
    hub: RoomHub,
    user: Option<CurrentUser>,
    outbox: mpsc::Sender<ServerMessage>,
    rooms: HashMap<Room, CancellationToken>,
    shutdown: CancellationToken,
}

impl Session {
    /// Join one room; answers with an error message when not allowed
    fn join(&mut self, room: Room) -> Result<(), AppError> {
        if let Err(e) = authorize_join(self.user.as_ref(), room) {
            security_log!(
                "WARN",
                "room_join_denied",
                room = room.to_string(),
                member_id = self.user.map(|u| u.member_id).unwrap_or_default()
            );
            return Err(e);
        }
        if self.rooms.contains_key(&room) {
            return Ok(());
        }

        let token = self.shutdown.child_token();
        let rx = self.hub.subscribe(room);
        tokio::spawn(forward(
            room,
            rx,
            self.outbox.clone(),
            token.clone(),
            self.hub.clone(),
        ));
        self.rooms.insert(room, token);
        tracing::debug!(room = %room, "Joined room");
        Ok(())
    }

    fn leave(&mut self, room: Room) {
        if let Some(token) = self.rooms.remove(&room) {
            token.cancel();
            tracing::debug!(room = %room, "Left room");
        }
    }

    fn handle(&mut self, command: ClientCommand) -> ServerMessage {
        let result = match command {
            ClientCommand::JoinRooms => match self.user {
                Some(user) => {
                    let rooms = staff_rooms(&user);
                    let joined: Result<(), AppError> =
                        rooms.iter().try_for_each(|room| self.join(*room));
                    joined.map(|_| ServerMessage::RoomsJoined { rooms })
                }
                None => Err(AppError::not_authenticated()),
            },
            ClientCommand::JoinOrder { order_id } => {
                let room = Room::Order(order_id);
                self.join(room).map(|_| ServerMessage::Joined { room })
            }
            ClientCommand::JoinTable { table_id } => {
                let room = Room::Table(table_id);
                self.join(room).map(|_| ServerMessage::Joined { room })
            }
            ClientCommand::LeaveRoom { room } => {
                self.leave(room);
                Ok(ServerMessage::Left { room })
            }
        };
        result.unwrap_or_else(|e| ServerMessage::Error {
            code: e.code,
            message: e.message,
        })
    }
}

/// Pump one room's broadcast into the connection's outbox
async fn forward(
    room: Room,
    mut rx: broadcast::Receiver<std::sync::Arc<shared::realtime::RoomEvent>>,
    outbox: mpsc::Sender<ServerMessage>,
    token: CancellationToken,
    hub: RoomHub,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            event = rx.recv() => match event {
                Ok(event) => {
                    if outbox.send(ServerMessage::Event((*event).clone())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(room = %room, lagged = n, "Room subscriber lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
    drop(rx);
    hub.release(room);
}

async fn ws_session(socket: WebSocket, hub: RoomHub, user: Option<CurrentUser>) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = mpsc::channel::<ServerMessage>(OUTBOX_CAPACITY);
    let mut session = Session {
        hub,
        user,
        outbox,
        rooms: HashMap::new(),
        shutdown: CancellationToken::new(),
    };

    let member_id = user.map(|u| u.member_id);
    tracing::info!(member_id = ?member_id, "Realtime client connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            Some(msg) = inbox.recv() => {
                if send_message(&mut sink, &msg).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientCommand>(&text) {
                            Ok(command) => session.handle(command),
                            Err(e) => ServerMessage::Error {
                                code: ErrorCode::InvalidRequest,
                                message: format!("Invalid command: {e}"),
                            },
                        };
                        if send_message(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    session.shutdown.cancel();
    tracing::info!(member_id = ?member_id, rooms = session.rooms.len(), "Realtime client disconnected");
}

async fn send_message<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::models::MemberRole;
    use shared::realtime::RealtimeEvent;

    fn session(user: Option<CurrentUser>) -> (Session, mpsc::Receiver<ServerMessage>) {
        let (outbox, inbox) = mpsc::channel(16);
        let session = Session {
            hub: RoomHub::new(),
            user,
            outbox,
            rooms: HashMap::new(),
            shutdown: CancellationToken::new(),
        };
        (session, inbox)
    }

    fn chef() -> CurrentUser {
        CurrentUser {
            member_id: 5,
            restaurant_id: 1,
            role: MemberRole::Chef,
        }
    }

    #[tokio::test]
    async fn test_customer_tracks_order() {
        let (mut session, mut inbox) = session(None);
        let reply = session.handle(ClientCommand::JoinOrder { order_id: 42 });
        assert!(matches!(reply, ServerMessage::Joined { room: Room::Order(42) }));

        session
            .hub
            .send(Room::Order(42), RealtimeEvent::OrderStatusChanged, json!({"status": "ready"}));
        match inbox.recv().await {
            Some(ServerMessage::Event(event)) => {
                assert_eq!(event.room, Room::Order(42));
                assert_eq!(event.data["status"], "ready");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_customer_cannot_join_staff_rooms() {
        let (mut session, _inbox) = session(None);
        let reply = session.handle(ClientCommand::JoinRooms);
        assert!(matches!(
            reply,
            ServerMessage::Error { code: ErrorCode::NotAuthenticated, .. }
        ));
        assert!(session.rooms.is_empty());
    }

    #[tokio::test]
    async fn test_chef_joins_kitchen_rooms() {
        let (mut session, _inbox) = session(Some(chef()));
        let reply = session.handle(ClientCommand::JoinRooms);
        match reply {
            ServerMessage::RoomsJoined { rooms } => {
                assert_eq!(rooms, vec![Room::Kitchen(1), Room::Restaurant(1)]);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
        assert_eq!(session.hub.subscriber_count(Room::Kitchen(1)), 1);

        let reply = session.handle(ClientCommand::LeaveRoom { room: Room::Service(1) });
        assert!(matches!(reply, ServerMessage::Left { .. }));
    }

    #[tokio::test]
    async fn test_leave_releases_the_room() {
        let (mut session, _inbox) = session(None);
        session.handle(ClientCommand::JoinTable { table_id: 7 });
        assert_eq!(session.hub.subscriber_count(Room::Table(7)), 1);

        session.handle(ClientCommand::LeaveRoom { room: Room::Table(7) });
        for _ in 0..50 {
            if session.hub.subscriber_count(Room::Table(7)) == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(session.hub.subscriber_count(Room::Table(7)), 0);
    }
}
