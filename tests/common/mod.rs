#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Clone)]
struct Canned {
    status: u16,
    body: String,
    stall: bool,
}

/// A tiny HTTP/1.1 server answering canned responses by method and path.
/// Unknown routes get a 404 with an empty body.
#[derive(Clone, Default)]
pub struct MockBackend {
    routes: Arc<Mutex<HashMap<(String, String), Canned>>>,
    prefixes: Arc<Mutex<Vec<(String, String, Canned)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: &str, path: &str, status: u16, body: impl Into<String>) -> &Self {
        self.routes.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            Canned {
                status,
                body: body.into(),
                stall: false,
            },
        );
        self
    }

    /// Answers every `method` request whose path starts with `prefix`.
    pub fn on_prefix(&self, method: &str, prefix: &str, status: u16, body: impl Into<String>) -> &Self {
        self.prefixes.lock().unwrap().push((
            method.to_string(),
            prefix.to_string(),
            Canned {
                status,
                body: body.into(),
                stall: false,
            },
        ));
        self
    }

    /// Sends the status line, headers and `partial_body`, then hangs while
    /// promising more body bytes than it ever writes.
    pub fn on_stalled(&self, method: &str, path: &str, status: u16, partial_body: impl Into<String>) -> &Self {
        self.routes.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            Canned {
                status,
                body: partial_body.into(),
                stall: true,
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Binds an ephemeral port and serves until the test ends.
    pub async fn start(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let backend = self.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let backend = backend.clone();
                tokio::spawn(async move { backend.serve(stream).await });
            }
        });
        format!("http://{addr}")
    }

    async fn serve(&self, mut stream: TcpStream) {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        let header_end = loop {
            let Ok(n) = stream.read(&mut buf).await else {
                return;
            };
            if n == 0 {
                return;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
        let mut lines = head.lines();
        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts.next().unwrap_or_default().to_string();
        let headers: HashMap<String, String> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        let length: usize = headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        while raw.len() < header_end + length {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => raw.extend_from_slice(&buf[..n]),
            }
        }
        let body = String::from_utf8_lossy(&raw[header_end..]).to_string();

        let exact = self
            .routes
            .lock()
            .unwrap()
            .get(&(method.clone(), path.clone()))
            .cloned();
        let canned = exact
            .or_else(|| {
                self.prefixes
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|(m, prefix, _)| *m == method && path.starts_with(prefix.as_str()))
                    .map(|(_, _, canned)| canned.clone())
            })
            .unwrap_or(Canned {
                status: 404,
                body: String::new(),
                stall: false,
            });
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            headers,
            body,
        });

        let promised = if canned.stall {
            canned.body.len() + 1024
        } else {
            canned.body.len()
        };
        let response = format!(
            "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            canned.status, promised, canned.body
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.flush().await;
        if canned.stall {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        let _ = stream.shutdown().await;
    }
}
