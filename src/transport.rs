// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The byte-level transport contract (spec §6) and its TCP implementation.

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Transport connectivity, as observed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Disconnected,
    Connected,
    Unknown,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The byte-level collaborator the core consumes (spec §6). `open`/`close`
/// manage the socket; `write`/`read_until_cr` exchange framed bytes.
pub trait Transport: Send {
    fn open<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<()>>;
    fn close<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<()>>;
    fn write<'a>(&'a mut self, bytes: &'a [u8]) -> BoxFuture<'a, std::io::Result<()>>;
    /// Read one reply, inclusive of the trailing `0x0D`.
    fn read_until_cr<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<Vec<u8>>>;
    fn state(&self) -> TransportState;
}

/// A single PJLink TCP connection.
pub struct TcpTransport {
    host: String,
    port: u16,
    stream: Option<BufReader<TcpStream>>,
}

impl TcpTransport {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port, stream: None }
    }
}

impl Transport for TcpTransport {
    fn open<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<()>> {
        Box::pin(async move {
            let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
            self.stream = Some(BufReader::new(stream));
            Ok(())
        })
    }

    fn close<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<()>> {
        Box::pin(async move {
            self.stream = None;
            Ok(())
        })
    }

    fn write<'a>(&'a mut self, bytes: &'a [u8]) -> BoxFuture<'a, std::io::Result<()>> {
        Box::pin(async move {
            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotConnected, "not open"))?;
            stream.write_all(bytes).await?;
            stream.flush().await
        })
    }

    fn read_until_cr<'a>(&'a mut self) -> BoxFuture<'a, std::io::Result<Vec<u8>>> {
        Box::pin(async move {
            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotConnected, "not open"))?;
            let mut buf = Vec::new();
            loop {
                let byte = stream.read_u8().await?;
                buf.push(byte);
                if byte == 0x0D {
                    return Ok(buf);
                }
            }
        })
    }

    fn state(&self) -> TransportState {
        if self.stream.is_some() {
            TransportState::Connected
        } else {
            TransportState::Disconnected
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
