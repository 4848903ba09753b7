//! Canned HTTP responses served from a local socket.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the canned server does with each request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with `status` and a JSON `body`.
    Json {
        /// HTTP status code.
        status: u16,
        /// JSON response body.
        body: String,
    },
    /// Accept the connection and never answer.
    Silent,
}

/// A one-route HTTP server bound to an ephemeral local port.
#[derive(Debug)]
pub struct CannedServer {
    /// Base URL to configure the provider with.
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    /// Bind and start serving `reply` on the current runtime.
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|err| panic!("failed to bind canned server: {err}"));
        let address = listener
            .local_addr()
            .unwrap_or_else(|err| panic!("failed to read canned server address: {err}"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(answer(socket, reply.clone(), Arc::clone(&log)));
            }
        });
        Self {
            base_url: format!("http://{address}"),
            requests,
        }
    }

    /// Request lines received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

async fn answer(mut socket: TcpStream, reply: Reply, log: Arc<Mutex<Vec<String>>>) {
    let mut buffer = vec![0_u8; 16 * 1024];
    let read = socket.read(&mut buffer).await.unwrap_or(0);
    let head = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default());
    let request_line = head.lines().next().unwrap_or_default().to_owned();
    log.lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .push(request_line);

    match reply {
        Reply::Json { status, body } => {
            let response = format!(
                "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Reply::Silent => tokio::time::sleep(Duration::from_secs(3_600)).await,
    }
}

/// Base URL of a local port with nothing listening on it.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|err| panic!("failed to bind probe socket: {err}"));
    let address = listener
        .local_addr()
        .unwrap_or_else(|err| panic!("failed to read probe address: {err}"));
    drop(listener);
    format!("http://{address}")
}
