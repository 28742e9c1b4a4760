use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use types::ids::ConnectionId;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(state.config.outbound_capacity);

    let closed = match state.registry.register(connection_id, tx) {
        Ok(closed) => closed,
        Err(err) => {
            error!(connection_id = %connection_id, error = %err, "Failed to register connection");
            return;
        }
    };

    // Queued before the writer starts, so the id is always the first frame
    if let Err(err) = state
        .registry
        .deliver(connection_id, connection_id.to_string())
        .await
    {
        warn!(connection_id = %connection_id, error = %err, "Handshake failed");
        state.registry.deregister(connection_id);
        return;
    }

    info!(
        connection_id = %connection_id,
        connections = state.registry.len(),
        "New connection"
    );

    // Writer: drains the registry's outbound channel into the socket until
    // the registry drops this connection
    let mut writer = tokio::spawn(async move {
        loop {
            let payload = tokio::select! {
                biased;
                _ = closed.cancelled() => break,
                payload = rx.recv() => match payload {
                    Some(payload) => payload,
                    None => break,
                },
            };

            tokio::select! {
                biased;
                _ = closed.cancelled() => break,
                result = sender.send(Message::Text(payload.into())) => {
                    if let Err(err) = result {
                        debug!(connection_id = %connection_id, error = %err, "Socket write failed");
                        break;
                    }
                }
            }
        }
    });

    // Reader: inbound frames carry nothing but liveness
    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(connection_id = %connection_id, error = %err, "Socket read failed");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    state.registry.deregister(connection_id);
    writer.abort();
    info!(connection_id = %connection_id, "Connection closed");
}

#[cfg(test)]
mod tests {
    use crate::config::GatewayConfig;
    use crate::router::create_router;
    use crate::state::AppState;
    use futures::StreamExt;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
    use types::ids::ConnectionId;

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    const WAIT: Duration = Duration::from_secs(2);

    async fn serve(state: AppState) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        addr
    }

    async fn connect(addr: SocketAddr) -> Client {
        let url = format!("ws://{addr}/v1/ws");
        let (client, _) = connect_async(url.as_str()).await.unwrap();
        client
    }

    async fn next_text(client: &mut Client) -> String {
        let msg = tokio::time::timeout(WAIT, client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        msg.to_text().unwrap().to_string()
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        tokio::time::timeout(WAIT, async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_socket_gets_id_then_match_label() {
        let state = AppState::new(GatewayConfig::default());
        let addr = serve(state.clone()).await;

        let mut client = connect(addr).await;
        let client_id: ConnectionId = next_text(&mut client).await.parse().unwrap();
        assert!(state.registry.is_connected(client_id));

        let peer = ConnectionId::new();
        let (tx, mut rx) = mpsc::channel(4);
        state.registry.register(peer, tx).unwrap();

        state.matcher.submit(peer, "60").await.unwrap();
        state.matcher.submit(client_id, "70").await.unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("50"));
        assert_eq!(next_text(&mut client).await, "50");

        state.registry.deregister(peer);
        client.close(None).await.unwrap();
        wait_until(|| state.registry.is_empty()).await;
    }

    #[tokio::test]
    async fn test_socket_closes_when_registry_drops_connection() {
        let state = AppState::new(GatewayConfig::default());
        let addr = serve(state.clone()).await;

        let mut client = connect(addr).await;
        let client_id: ConnectionId = next_text(&mut client).await.parse().unwrap();

        assert!(state.registry.deregister(client_id));

        let ended = tokio::time::timeout(WAIT, async {
            loop {
                match client.next().await {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        })
        .await;
        assert!(ended.is_ok(), "socket stayed open after the registry dropped it");
    }
}
