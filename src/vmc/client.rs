//! # VMC TCP Client
//!
//! This module implements the request/response exchange with a ventilation unit:
//! one fresh TCP connection per command, one CR+LF framed command written, one
//! response read and decoded. Connections are never pooled; the socket is owned
//! by the exchange future and closed on every exit path, including cancellation.
//!
//! The [`Transport`] trait is the seam the polling coordinator talks to, so the
//! coordinator can be driven by [`crate::vmc::mock::MockTransport`] in tests.

use crate::constants::{ERROR_PREFIX, FRAME_TERMINATOR, MAX_RESPONSE_BYTES, TAG_NETWORK};
use crate::error::VmcError;
use crate::logging::redact_line;
use async_trait::async_trait;
use bytes::BytesMut;
use log::debug;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Configuration for a single exchange.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            timeout: crate::constants::DEFAULT_EXCHANGE_TIMEOUT,
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }
}

/// Sends one command to a device and returns its decoded response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        host: &str,
        port: u16,
        command: &str,
        timeout: Duration,
    ) -> Result<String, VmcError>;
}

/// Strips any trailing CR/LF from `command` and appends exactly one terminator.
pub fn frame_command(command: &str) -> String {
    let body = command.trim_end_matches(['\r', '\n']);
    let mut framed = String::with_capacity(body.len() + FRAME_TERMINATOR.len());
    framed.push_str(body);
    framed.push_str(FRAME_TERMINATOR);
    framed
}

/// Decodes a response as UTF-8, falling back to Latin-1.
pub fn decode_response(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            debug!(
                "Response is not UTF-8 ({e}), decoding as Latin-1: {}",
                hex::encode(&bytes[..bytes.len().min(64)])
            );
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Trims a decoded response and rejects device-side `ERROR` replies.
pub fn check_response(text: &str) -> Result<String, VmcError> {
    let trimmed = text.trim();
    if trimmed.starts_with(ERROR_PREFIX) {
        return Err(VmcError::Protocol(format!("device replied '{trimmed}'")));
    }
    Ok(trimmed.to_string())
}

fn classify_connect_error(addr: &str, err: io::Error) -> VmcError {
    let reason = match err.kind() {
        io::ErrorKind::ConnectionRefused => "connection refused".to_string(),
        io::ErrorKind::AddrNotAvailable => "address not available".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        io::ErrorKind::InvalidInput => format!("invalid address ({err})"),
        // Resolver failures surface as `Other`/`Uncategorized` with a lookup message.
        _ if err.to_string().contains("lookup") => format!("could not resolve host ({err})"),
        _ => format!("unreachable ({err})"),
    };
    VmcError::Connection {
        addr: addr.to_string(),
        reason,
    }
}

fn io_error(addr: &str, stage: &str, err: io::Error) -> VmcError {
    VmcError::Connection {
        addr: addr.to_string(),
        reason: format!("{stage} failed: {err}"),
    }
}

/// TCP implementation of the device protocol.
#[derive(Debug, Clone, Default)]
pub struct ProtocolClient {
    config: ClientConfig,
}

impl ProtocolClient {
    pub fn new(config: ClientConfig) -> Self {
        ProtocolClient { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `command` with the configured default timeout.
    pub async fn send_default(&self, host: &str, port: u16, command: &str) -> Result<String, VmcError> {
        self.exchange(host, port, command, self.config.timeout).await
    }

    async fn exchange(
        &self,
        host: &str,
        port: u16,
        command: &str,
        deadline: Duration,
    ) -> Result<String, VmcError> {
        let addr = format!("{host}:{port}");
        let framed = frame_command(command);
        debug!("-> {addr} {}", redact_line(&framed));

        let mut stream = match timeout(deadline, TcpStream::connect(&addr)).await {
            Err(_) => {
                return Err(VmcError::Timeout {
                    addr,
                    stage: "connect",
                    after: deadline,
                })
            }
            Ok(Err(e)) => return Err(classify_connect_error(&addr, e)),
            Ok(Ok(stream)) => stream,
        };

        // `stream` is dropped (and the socket closed) on every return below.
        let write = async {
            stream.write_all(framed.as_bytes()).await?;
            stream.flush().await
        };
        match timeout(deadline, write).await {
            Err(_) => {
                return Err(VmcError::Timeout {
                    addr,
                    stage: "write",
                    after: deadline,
                })
            }
            Ok(Err(e)) => return Err(io_error(&addr, "write", e)),
            Ok(Ok(())) => {}
        }

        let buf = match timeout(deadline, read_line(&mut stream, self.config.max_response_bytes)).await {
            Err(_) => {
                return Err(VmcError::Timeout {
                    addr,
                    stage: "read",
                    after: deadline,
                })
            }
            Ok(Err(e)) => return Err(io_error(&addr, "read", e)),
            Ok(Ok(buf)) => buf,
        };

        let _ = stream.shutdown().await;

        if buf.is_empty() {
            return Err(VmcError::Protocol(format!("empty response from {addr}")));
        }
        let text = decode_response(&buf);
        if command.starts_with(TAG_NETWORK) {
            debug!("<- {addr} <network payload, {} bytes>", buf.len());
        } else {
            debug!("<- {addr} {}", text.trim_end());
        }
        check_response(&text)
    }
}

/// Reads until a line terminator, EOF or `limit` bytes, whichever comes first.
async fn read_line(stream: &mut TcpStream, limit: usize) -> io::Result<BytesMut> {
    let mut buf = BytesMut::with_capacity(limit.min(MAX_RESPONSE_BYTES));
    while buf.len() < limit {
        let mut chunk = (&mut *stream).take((limit - buf.len()) as u64);
        let n = chunk.read_buf(&mut buf).await?;
        if n == 0 || buf.contains(&b'\n') {
            break;
        }
    }
    Ok(buf)
}

#[async_trait]
impl Transport for ProtocolClient {
    async fn send(
        &self,
        host: &str,
        port: u16,
        command: &str,
        timeout: Duration,
    ) -> Result<String, VmcError> {
        self.exchange(host, port, command, timeout).await
    }
}
