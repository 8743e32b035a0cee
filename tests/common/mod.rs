//! Shared utilities for relay integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sse_relay::config::RelayConfig;
use sse_relay::http::HttpServer;
use sse_relay::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How the mock upstream answers every connection.
#[derive(Clone)]
#[allow(dead_code)]
pub enum Script {
    /// 200 event-stream, write each chunk after `delay`, then close.
    Stream {
        chunks: Vec<&'static str>,
        delay: Duration,
    },
    /// Non-success status line (e.g. "503 Service Unavailable") with a body.
    Reject {
        status: &'static str,
        body: &'static str,
    },
    /// 200 event-stream, write `chunk` every `interval` until the relay hangs up.
    Endless {
        chunk: &'static str,
        interval: Duration,
    },
    /// 200 event-stream headers, then silence.
    Idle,
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    released: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockUpstream {
    /// Raw request heads received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// True once a write to the relay failed because it dropped the stream.
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Wait up to `timeout` for the relay to drop the upstream connection.
    pub async fn wait_released(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.released() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.released()
    }
}

const STREAM_HEAD: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n";

/// Start a scripted upstream SSE endpoint on an ephemeral port.
pub async fn start_upstream(script: Script) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let released = Arc::new(AtomicBool::new(false));

    let upstream = MockUpstream {
        addr,
        requests: requests.clone(),
        released: released.clone(),
    };

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let script = script.clone();
            let requests = requests.clone();
            let released = released.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                requests.lock().unwrap().push(head);
                serve(&mut socket, script, &released).await;
            });
        }
    });

    upstream
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn serve(socket: &mut TcpStream, script: Script, released: &AtomicBool) {
    match script {
        Script::Stream { chunks, delay } => {
            let _ = socket.write_all(STREAM_HEAD.as_bytes()).await;
            for chunk in chunks {
                tokio::time::sleep(delay).await;
                let _ = socket.write_all(chunk.as_bytes()).await;
            }
            let _ = socket.shutdown().await;
        }
        Script::Reject { status, body } => {
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Script::Endless { chunk, interval } => {
            let _ = socket.write_all(STREAM_HEAD.as_bytes()).await;
            loop {
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    released.store(true, Ordering::SeqCst);
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        }
        Script::Idle => {
            let _ = socket.write_all(STREAM_HEAD.as_bytes()).await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }
}

/// Start the relay on an ephemeral port, reaching upstreams over plain HTTP.
///
/// Keep the returned `Shutdown` alive for the duration of the test.
pub async fn start_relay(configure: impl FnOnce(&mut RelayConfig)) -> (SocketAddr, Shutdown) {
    let mut config = RelayConfig::default();
    config.upstream.scheme = "http".into();
    config.listener.shutdown_grace_secs = 1;
    configure(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// `/sse-proxy` URL with org and token filled in; `extra` appends more query.
pub fn relay_url(relay: SocketAddr, upstream: SocketAddr, extra: &str) -> String {
    format!(
        "http://{relay}/sse-proxy?scrtUrl={upstream}&orgId=00D000000000001&accessToken=secret-token{extra}"
    )
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Read from a streaming response until `needle` appears or `timeout` passes.
#[allow(dead_code)]
pub async fn read_until(
    response: &mut reqwest::Response,
    needle: &str,
    timeout: Duration,
) -> String {
    let mut seen = String::new();
    let _ = tokio::time::timeout(timeout, async {
        while let Ok(Some(chunk)) = response.chunk().await {
            seen.push_str(&String::from_utf8_lossy(&chunk));
            if seen.contains(needle) {
                break;
            }
        }
    })
    .await;
    seen
}
