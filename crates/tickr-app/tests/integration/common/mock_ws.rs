//! Mock WebSocket feed server for integration tests.
//!
//! Provides a simple WebSocket server that can:
//! - Accept connections and record the requested stream paths
//! - Push text frames to the most recent connection
//! - Close the most recent connection with a given code

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// A mock feed server for testing.
pub struct MockFeedServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    paths: Arc<Mutex<Vec<String>>>,
    outboxes: Arc<Mutex<Vec<mpsc::UnboundedSender<Message>>>>,
}

impl MockFeedServer {
    /// Start a new mock server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let paths: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let outboxes: Arc<Mutex<Vec<mpsc::UnboundedSender<Message>>>> =
            Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let paths_clone = paths.clone();
        let outboxes_clone = outboxes.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let (tx, rx) = mpsc::unbounded_channel();
                        outboxes_clone.lock().await.push(tx);
                        tokio::spawn(handle_connection(stream, paths_clone.clone(), rx));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            paths,
            outboxes,
        }
    }

    /// Base stream URL, as configured in `ws_url`.
    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Number of connections accepted so far.
    pub async fn connection_count(&self) -> usize {
        self.outboxes.lock().await.len()
    }

    /// Paths requested by each connection, in order.
    pub async fn paths(&self) -> Vec<String> {
        self.paths.lock().await.clone()
    }

    /// Send a text frame on the most recent connection.
    pub async fn send_text(&self, text: &str) {
        self.send(Message::Text(text.to_string())).await;
    }

    /// Close the most recent connection.
    pub async fn close_latest(&self, code: u16) {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: "going away".into(),
        };
        self.send(Message::Close(Some(frame))).await;
    }

    async fn send(&self, message: Message) {
        let outboxes = self.outboxes.lock().await;
        let outbox = outboxes.last().expect("no connection to send on");
        outbox.send(message).unwrap();
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    paths: Arc<Mutex<Vec<String>>>,
    mut outbox: mpsc::UnboundedReceiver<Message>,
) {
    let mut path = None;
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        path = Some(req.uri().path().to_string());
        Ok(resp)
    };
    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };
    paths.lock().await.push(path.unwrap_or_default());

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            outgoing = outbox.recv() => match outgoing {
                Some(message) => {
                    let closing = matches!(message, Message::Close(_));
                    if write.send(message).await.is_err() {
                        break;
                    }
                    if closing {
                        // Drain until the client acknowledges
                        while let Some(Ok(_)) = read.next().await {}
                        break;
                    }
                }
                None => break,
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockFeedServer::start().await;
        assert!(server.url().starts_with("ws://127.0.0.1:"));
        server.shutdown().await;
    }
}
