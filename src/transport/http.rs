//! JSON-over-HTTP transport.
//!
//! Each endpoint gets its own `reqwest::Client`, so keep-alive connections
//! are pooled per endpoint and reused for every call until the registry is
//! closed. `connect` dials the endpoint once so an unreachable address fails
//! at startup; `close` drops the client and with it the idle pool.

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

use crate::config::TransportConfig;
use crate::transport::{Transport, TransportError};

/// An application call: `POST {base}/{method}` with `params` as JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Connection handle for one HTTP endpoint.
#[derive(Debug)]
pub struct HttpConnection {
    /// Base URL, always ending in `/`.
    pub base_url: Url,
    client: ArcSwapOption<Client>,
}

impl HttpConnection {
    fn client(&self) -> Result<Arc<Client>, TransportError> {
        self.client
            .load_full()
            .ok_or_else(|| TransportError::Unavailable(format!("connection to {} is closed", self.base_url)))
    }

    pub fn is_closed(&self) -> bool {
        self.client.load().is_none()
    }
}

/// Transport speaking JSON over HTTP/1.1.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.config.connect_timeout_secs)
    }

    /// Open one TCP connection to the endpoint within the connect timeout.
    async fn dial(&self, address: &str, base_url: &Url) -> Result<(), TransportError> {
        let (Some(host), Some(port)) = (base_url.host(), base_url.port_or_known_default()) else {
            return Err(connect_error(address, "address has no host or port"));
        };
        let target = format!("{}:{}", host, port);

        match tokio::time::timeout(self.connect_timeout(), TcpStream::connect(&target)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(connect_error(address, e)),
            Err(_) => Err(connect_error(
                address,
                format!("timed out after {:?}", self.connect_timeout()),
            )),
        }
    }
}

fn connect_error(address: &str, reason: impl ToString) -> TransportError {
    TransportError::Connect {
        address: address.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an endpoint address into a base URL. Bare `host:port` gets `http://`.
pub fn parse_base_url(address: &str) -> Result<Url, url::ParseError> {
    let mut url = if address.contains("://") {
        Url::parse(address)?
    } else {
        Url::parse(&format!("http://{}", address))?
    };
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn map_send_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else {
        TransportError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Connection = HttpConnection;
    type Request = RpcRequest;
    type Response = Value;

    async fn connect(&self, address: &str) -> Result<HttpConnection, TransportError> {
        let base_url = parse_base_url(address).map_err(|e| connect_error(address, e))?;
        self.dial(address, &base_url).await?;

        let client = Client::builder()
            .connect_timeout(self.connect_timeout())
            .timeout(self.request_timeout())
            .pool_max_idle_per_host(self.config.max_idle_per_endpoint)
            .user_agent(concat!("rpc-balancer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| connect_error(address, e))?;

        tracing::debug!(address = %address, base_url = %base_url, "HTTP endpoint reachable");
        Ok(HttpConnection {
            base_url,
            client: ArcSwapOption::from_pointee(client),
        })
    }

    async fn invoke(
        &self,
        connection: &HttpConnection,
        request: &RpcRequest,
    ) -> Result<Value, TransportError> {
        let url = connection
            .base_url
            .join(request.method.trim_start_matches('/'))
            .map_err(|e| TransportError::Rejected {
                status: StatusCode::BAD_REQUEST.as_u16(),
                message: format!("invalid method '{}': {}", request.method, e),
            })?;

        let response = connection
            .client()?
            .post(url)
            .json(&request.params)
            .send()
            .await
            .map_err(|e| map_send_error(e, self.request_timeout()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| TransportError::Unavailable(format!("malformed response body: {}", e)));
        }

        let message = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(TransportError::Unavailable(format!("status {}: {}", status, message)))
        } else {
            Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn probe(&self, connection: &HttpConnection) -> Result<(), TransportError> {
        let url = connection
            .base_url
            .join(self.config.probe_path.trim_start_matches('/'))
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        let response = connection
            .client()?
            .get(url)
            .send()
            .await
            .map_err(|e| map_send_error(e, self.request_timeout()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Unavailable(format!(
                "probe returned status {}",
                response.status()
            )))
        }
    }

    async fn close(&self, connection: &HttpConnection) {
        if connection.client.swap(None).is_some() {
            tracing::debug!(base_url = %connection.base_url, "HTTP client released");
        }
    }
}
