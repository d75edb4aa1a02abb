//! Shared helpers for end-to-end tests: mock backends, a server harness and
//! a minimal raw HTTP/1.1 client.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use devserver::config::{AppState, Config, RuntimeConfig};
use devserver::server;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

pub const BOUND: Duration = Duration::from_secs(5);

/// Read one byte at a time up to and including the blank line
pub async fn read_head<S: AsyncRead + Unpin>(stream: &mut S) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte).await {
            Ok(1) => head.push(byte[0]),
            _ => break,
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Backend answering every request with its request line and `Host` header
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let request_line = head.lines().next().unwrap_or_default().to_string();
                let host = head
                    .lines()
                    .find_map(|l| l.strip_prefix("host: ").or_else(|| l.strip_prefix("Host: ")))
                    .unwrap_or("-")
                    .to_string();
                let body = format!("{request_line}\n{host}");
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Backend that accepts websocket-style upgrades and echoes raw bytes.
///
/// When `close_after_first` is set it closes right after echoing one read.
pub async fn start_upgrade_backend(close_after_first: bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                if !head.to_ascii_lowercase().contains("upgrade: websocket") {
                    let _ = socket
                        .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                        .await;
                    return;
                }
                let _ = socket
                    .write_all(b"HTTP/1.1 101 Switching Protocols\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\r\n")
                    .await;

                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if socket.write_all(&buf[..n]).await.is_err() {
                                break;
                            }
                            if close_after_first {
                                break;
                            }
                        }
                    }
                }
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Backend that accepts connections and reads, but never answers
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                while let Ok(n) = socket.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
            });
        }
    });
    addr
}

/// A port nothing listens on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Temporary client build with an index page and one asset
pub struct Site {
    pub root: PathBuf,
}

impl Site {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("devserver-e2e-{}-{name}", std::process::id()));
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("index.html"), "<html>app shell</html>").unwrap();
        std::fs::write(root.join("assets").join("app.js"), "console.log('app')").unwrap();
        Self { root }
    }
}

impl Drop for Site {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

/// Running dev server; stops accepting when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.notify_one();
    }
}

/// Start the server on an ephemeral port. Call inside a `LocalSet`.
pub fn start_server(backend_port: u16, site: &Site) -> TestServer {
    start_server_with(backend_port, site, |_| {})
}

/// Same as [`start_server`] with a hook to adjust the config first
pub fn start_server_with(backend_port: u16, site: &Site, adjust: impl FnOnce(&mut Config)) -> TestServer {
    let mut config = Config::defaults().unwrap();
    config.server.port = 0;
    config.logging.access_log = false;
    config.proxy.connect_timeout_ms = 1000;
    config.proxy.response_timeout_secs = 5;
    config.static_files.root = site.root.to_str().unwrap().to_string();
    adjust(&mut config);

    let runtime = RuntimeConfig {
        backend_host: "127.0.0.1".to_string(),
        backend_port,
    };
    let state = Arc::new(AppState::new(&config, runtime).unwrap());
    let listener = server::create_listener(config.get_socket_addr().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Arc::new(Notify::new());
    tokio::task::spawn_local(server::run(listener, state, Arc::clone(&shutdown)));
    TestServer { addr, shutdown }
}

/// Response as seen on the wire
pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: String,
}

/// Send a single request with `Connection: close` and read the full answer
pub async fn send(addr: SocketAddr, method: &str, path: &str, extra_headers: &[(&str, &str)]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let headers: String = extra_headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}\r\n"))
        .collect();
    let request =
        format!("{method} {path} HTTP/1.1\r\nHost: localhost:3000\r\nConnection: close\r\n{headers}\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    tokio::time::timeout(BOUND, stream.read_to_end(&mut raw))
        .await
        .expect("response timed out")
        .unwrap();
    let raw = String::from_utf8_lossy(&raw).into_owned();
    let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw.as_str(), ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    RawResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}
