//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use rpc_balancer::{Transport, TransportError};

/// How a scripted endpoint answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Reject,
    Hang,
}

#[derive(Default)]
struct Script {
    calls: Mutex<HashMap<String, Behavior>>,
    probes: Mutex<HashMap<String, Behavior>>,
    refuse_connect: Mutex<HashSet<String>>,
    call_log: Mutex<Vec<String>>,
    closed: Mutex<Vec<String>>,
    probe_count: AtomicUsize,
}

/// In-memory transport whose endpoints behave as scripted.
///
/// Responses are `"{address}:{request}"`.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Script>,
}

pub struct ScriptedConnection {
    pub address: String,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_call(&self, address: &str, behavior: Behavior) {
        self.script.calls.lock().unwrap().insert(address.to_string(), behavior);
    }

    pub fn set_probe(&self, address: &str, behavior: Behavior) {
        self.script.probes.lock().unwrap().insert(address.to_string(), behavior);
    }

    pub fn refuse_connect(&self, address: &str) {
        self.script.refuse_connect.lock().unwrap().insert(address.to_string());
    }

    /// Addresses called, in call order.
    pub fn call_log(&self) -> Vec<String> {
        self.script.call_log.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<String> {
        self.script.closed.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.script.probe_count.load(Ordering::SeqCst)
    }

    fn behavior(map: &Mutex<HashMap<String, Behavior>>, address: &str) -> Behavior {
        map.lock().unwrap().get(address).copied().unwrap_or(Behavior::Succeed)
    }
}

async fn act(behavior: Behavior, address: &str) -> Result<(), TransportError> {
    match behavior {
        Behavior::Succeed => Ok(()),
        Behavior::Fail => Err(TransportError::Unavailable(format!("{} is down", address))),
        Behavior::Reject => Err(TransportError::Rejected {
            status: 400,
            message: "bad request".into(),
        }),
        Behavior::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Connection = ScriptedConnection;
    type Request = String;
    type Response = String;

    async fn connect(&self, address: &str) -> Result<ScriptedConnection, TransportError> {
        if self.script.refuse_connect.lock().unwrap().contains(address) {
            return Err(TransportError::Connect {
                address: address.to_string(),
                reason: "connection refused".into(),
            });
        }
        Ok(ScriptedConnection {
            address: address.to_string(),
        })
    }

    async fn invoke(
        &self,
        connection: &ScriptedConnection,
        request: &String,
    ) -> Result<String, TransportError> {
        let address = &connection.address;
        self.script.call_log.lock().unwrap().push(address.clone());
        let behavior = Self::behavior(&self.script.calls, address);
        act(behavior, address).await?;
        Ok(format!("{}:{}", address, request))
    }

    async fn probe(&self, connection: &ScriptedConnection) -> Result<(), TransportError> {
        self.script.probe_count.fetch_add(1, Ordering::SeqCst);
        let behavior = Self::behavior(&self.script.probes, &connection.address);
        act(behavior, &connection.address).await
    }

    async fn close(&self, connection: &ScriptedConnection) {
        self.script.closed.lock().unwrap().push(connection.address.clone());
    }
}

/// Endpoint addresses `E0..E{n-1}`.
pub fn addresses(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("E{}", i)).collect()
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// `f` receives the request path and returns status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    spawn_programmable_backend(f).await.0
}

/// Like `start_programmable_backend`, also returning the accept loop's handle.
/// Aborting it closes the listener, so later connects are refused.
pub async fn spawn_programmable_backend<F, Fut>(f: F) -> (SocketAddr, JoinHandle<()>)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(socket);

                        // Request line, headers, then the body so the client never sees a reset.
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                            return;
                        }
                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();

                        let mut content_length = 0usize;
                        loop {
                            let mut line = String::new();
                            if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                                break;
                            }
                            let line = line.trim_end();
                            if line.is_empty() {
                                break;
                            }
                            if let Some((name, value)) = line.split_once(':') {
                                if name.eq_ignore_ascii_case("content-length") {
                                    content_length = value.trim().parse().unwrap_or(0);
                                }
                            }
                        }
                        let mut body = vec![0u8; content_length];
                        let _ = reader.read_exact(&mut body).await;

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let mut socket = reader.into_inner();
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, handle)
}

/// A backend that answers every call with `{"message": "<name>"}` and passes probes.
pub async fn start_mock_backend(name: &'static str) -> SocketAddr {
    start_programmable_backend(move |_path| async move {
        (200, format!("{{\"message\":\"{}\"}}", name))
    })
    .await
}

/// A mock backend that can be taken down with `stop_backend`.
pub async fn spawn_mock_backend(name: &'static str) -> (SocketAddr, JoinHandle<()>) {
    spawn_programmable_backend(move |_path| async move {
        (200, format!("{{\"message\":\"{}\"}}", name))
    })
    .await
}

/// Stop accepting on a backend and wait for its listener to close.
pub async fn stop_backend(handle: JoinHandle<()>) {
    handle.abort();
    let _ = handle.await;
}

/// An address nothing listens on.
pub async fn unused_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
