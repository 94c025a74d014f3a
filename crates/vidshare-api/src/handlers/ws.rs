//! WebSocket upgrade handler.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use vidshare_realtime::connection::authenticator::AuthenticatedConnection;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Query parameters for the WebSocket handshake.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// JWT access token. Without one the connection is anonymous.
    #[serde(default)]
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token is verified before the upgrade: a bad token is a 401 and an
/// uninitialized channel a 503, both as regular HTTP responses.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let identity = match state
        .realtime
        .authenticator
        .authenticate(query.token.as_deref())
    {
        Ok(identity) => identity,
        Err(e) => {
            debug!(error = %e, "WebSocket handshake rejected");
            return HttpAppError::from(e).into_response();
        }
    };
    if let Err(e) = state.realtime.channel.get() {
        return HttpAppError::from(e).into_response();
    }

    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_ws_connection(state, identity, socket)),
        Err(rejection) => rejection.into_response(),
    }
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(
    state: AppState,
    identity: Option<AuthenticatedConnection>,
    socket: WebSocket,
) {
    let registration = match state.realtime.connect(identity.as_ref()) {
        Ok(registration) => registration,
        Err(e) => {
            warn!(error = %e, "Dropping WebSocket opened during shutdown");
            return;
        }
    };
    let handle = registration.handle;
    let mut outbound_rx = registration.receiver;
    let (mut ws_tx, mut ws_rx) = socket.split();

    info!(
        conn_id = %handle.id,
        user_id = ?handle.user_id,
        "WebSocket connection established"
    );

    // Outbound forwarder: ends when the handle is closed (disconnect,
    // eviction, heartbeat timeout, shutdown) or the client goes away.
    let outbound_task = {
        let handle = handle.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    msg = outbound_rx.recv() => {
                        let Some(msg) = msg else { break };
                        let text = match serde_json::to_string(&msg) {
                            Ok(text) => text,
                            Err(e) => {
                                warn!(conn_id = %handle.id, error = %e, "Failed to encode frame");
                                continue;
                            }
                        };
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    _ = handle.closed() => break,
                }
            }
            let _ = ws_tx.send(Message::Close(None)).await;
        })
    };

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    state.realtime.handle_inbound(&handle, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => handle.touch(),
                Some(Err(e)) => {
                    warn!(conn_id = %handle.id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = handle.closed() => break,
        }
    }

    state.realtime.disconnect(&handle.id);
    if outbound_task.await.is_err() {
        warn!(conn_id = %handle.id, "Outbound forwarder panicked");
    }

    info!(
        conn_id = %handle.id,
        user_id = ?handle.user_id,
        "WebSocket connection closed"
    );
}
