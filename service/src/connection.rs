//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Per-peer connection worker.
//!
//! A [`Connection`] owns one Telnet-framed TCP stream and runs as its
//! own task. It reports [`SessionEvent`]s to the manager that spawned it
//! and takes [`ConnectionCommand`]s from the paired
//! [`ConnectionHandle`].
//!
//! The application session handshake runs here. A server connection
//! sends `telnet_client_<N>: connected\r\n` as soon as it is writable
//! and is then established. A client connection is transport-connected
//! but not yet usable until that banner arrives: writes submitted in the
//! meantime are queued, and flushed in order once the banner has been
//! matched and discarded.

use crate::{
    ConnectionId, ConnectionRole, ConnectionState, ServiceError, ServiceResult, SessionEvent,
};
use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use hlx_protocol::ConnectionBuffer;
use hlx_telnetcodec::{TelnetCodec, TelnetItem};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::codec::Framed;
use tracing::{debug, trace};

/// The anchored client-confirmation line a server emits on accept.
static BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^telnet_client_[0-9]+: connected\r\n$").expect("banner regex")
});

const CONTROL_BUFFER_SIZE: usize = 32;

/// Commands a [`ConnectionHandle`] sends to its worker.
#[derive(Debug)]
pub enum ConnectionCommand {
    /// Write application bytes (queued pre-banner on the client side).
    Send(Bytes),
    /// Gracefully close the connection.
    Disconnect,
}

/// The owner's handle to a running connection worker.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    peer: SocketAddr,
    role: ConnectionRole,
    control: mpsc::Sender<ConnectionCommand>,
}

impl ConnectionHandle {
    /// Returns the connection ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the peer address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Returns the connection role.
    pub fn role(&self) -> ConnectionRole {
        self.role
    }

    /// Submits application bytes for writing.
    pub async fn send(&self, frame: Bytes) -> ServiceResult<()> {
        self.control
            .send(ConnectionCommand::Send(frame))
            .await
            .map_err(|_| ServiceError::ConnectionClosed)
    }

    /// Requests a graceful teardown.
    pub async fn disconnect(&self) -> ServiceResult<()> {
        self.control
            .send(ConnectionCommand::Disconnect)
            .await
            .map_err(|_| ServiceError::ConnectionClosed)
    }
}

/// A per-peer connection worker; see the module docs.
pub struct Connection {
    id: ConnectionId,
    role: ConnectionRole,
    state: ConnectionState,
    framed: Framed<TcpStream, TelnetCodec>,
    control_rx: mpsc::Receiver<ConnectionCommand>,
    events: mpsc::Sender<SessionEvent>,
    waiting_for_confirmation: bool,
    banner_buffer: ConnectionBuffer,
    queued_writes: Vec<Bytes>,
    handshake_timeout: Duration,
}

impl Connection {
    /// Wraps a dialed stream as a client-role connection.
    pub fn client(
        id: ConnectionId,
        stream: TcpStream,
        events: mpsc::Sender<SessionEvent>,
        handshake_timeout: Duration,
    ) -> ServiceResult<(Self, ConnectionHandle)> {
        Self::wrap(id, ConnectionRole::Client, stream, events, handshake_timeout)
    }

    /// Wraps an accepted stream as a server-role connection.
    pub fn server(
        id: ConnectionId,
        stream: TcpStream,
        events: mpsc::Sender<SessionEvent>,
    ) -> ServiceResult<(Self, ConnectionHandle)> {
        Self::wrap(id, ConnectionRole::Server, stream, events, Duration::ZERO)
    }

    fn wrap(
        id: ConnectionId,
        role: ConnectionRole,
        stream: TcpStream,
        events: mpsc::Sender<SessionEvent>,
        handshake_timeout: Duration,
    ) -> ServiceResult<(Self, ConnectionHandle)> {
        let peer = stream.peer_addr().map_err(ServiceError::from)?;
        let (control_tx, control_rx) = mpsc::channel(CONTROL_BUFFER_SIZE);

        let connection = Self {
            id,
            role,
            state: ConnectionState::Unknown,
            framed: Framed::new(stream, TelnetCodec::new()),
            control_rx,
            events,
            waiting_for_confirmation: role == ConnectionRole::Client,
            banner_buffer: ConnectionBuffer::new(),
            queued_writes: Vec::new(),
            handshake_timeout,
        };

        let handle = ConnectionHandle {
            id,
            peer,
            role,
            control: control_tx,
        };

        Ok((connection, handle))
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Runs the worker until the connection ends, then reports
    /// `Disconnected` exactly once.
    pub async fn run(mut self) {
        let error = match self.session().await {
            Ok(()) => None,
            Err(error) => Some(error),
        };

        self.state = ConnectionState::Disconnected;
        debug!(id = %self.id, error = ?error, "connection ended");

        let _ = self
            .events
            .send(SessionEvent::Disconnected {
                id: self.id,
                error,
            })
            .await;
    }

    async fn session(&mut self) -> ServiceResult<()> {
        match self.role {
            ConnectionRole::Server => {
                self.state = ConnectionState::Accepting;
                let banner = format!("telnet_client_{}: connected\r\n", self.id.as_u64());
                self.framed
                    .send(TelnetItem::Data(Bytes::from(banner)))
                    .await?;
                self.state = ConnectionState::Accepted;
                self.notify_established().await;
            }
            ConnectionRole::Client => {
                self.state = ConnectionState::Connecting;
            }
        }

        let handshake_deadline = Instant::now() + self.handshake_timeout;

        loop {
            tokio::select! {
                inbound = self.framed.next() => match inbound {
                    Some(Ok(data)) => {
                        self.flush_codec_pending().await?;
                        self.handle_inbound(data).await?;
                    }
                    Some(Err(error)) => return Err(error.into()),
                    None => {
                        // Peer closed. Graceful unless mid-handshake.
                        if self.waiting_for_confirmation {
                            return Err(ServiceError::ConnectionReset);
                        }
                        return Ok(());
                    }
                },
                command = self.control_rx.recv() => match command {
                    Some(ConnectionCommand::Send(frame)) => {
                        if self.waiting_for_confirmation {
                            trace!(id = %self.id, "queueing pre-banner write");
                            self.queued_writes.push(frame);
                        } else {
                            self.framed.send(TelnetItem::Data(frame)).await?;
                        }
                    }
                    Some(ConnectionCommand::Disconnect) | None => {
                        self.state = ConnectionState::Disconnecting;
                        let _ = self.framed.close().await;
                        return Ok(());
                    }
                },
                _ = tokio::time::sleep_until(handshake_deadline),
                    if self.waiting_for_confirmation => {
                    return Err(ServiceError::Timeout);
                }
            }
        }
    }

    async fn handle_inbound(&mut self, data: BytesMut) -> ServiceResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        if !self.waiting_for_confirmation {
            let _ = self
                .events
                .send(SessionEvent::Data { id: self.id, data })
                .await;
            return Ok(());
        }

        self.banner_buffer.put(&data)?;

        loop {
            let Some(line_end) = find_crlf(self.banner_buffer.peek()) else {
                return Ok(());
            };

            let line = self.banner_buffer.get(line_end + 2)?.to_vec();
            let is_banner = std::str::from_utf8(&line)
                .map(|text| BANNER.is_match(text))
                .unwrap_or(false);

            if is_banner {
                break;
            }

            // Not the confirmation line. Discard it and keep waiting.
            trace!(id = %self.id, "discarding pre-banner line");
        }

        self.waiting_for_confirmation = false;
        self.state = ConnectionState::Connected;
        debug!(id = %self.id, "client confirmation received");

        for frame in std::mem::take(&mut self.queued_writes) {
            self.framed.send(TelnetItem::Data(frame)).await?;
        }

        self.notify_established().await;

        // Bytes that followed the banner in the same read are data.
        if !self.banner_buffer.is_empty() {
            let remainder = BytesMut::from(self.banner_buffer.peek());
            self.banner_buffer.flush();
            let _ = self
                .events
                .send(SessionEvent::Data {
                    id: self.id,
                    data: remainder,
                })
                .await;
        }

        Ok(())
    }

    async fn flush_codec_pending(&mut self) -> ServiceResult<()> {
        if let Some(raw) = self.framed.codec_mut().take_pending() {
            self.framed.send(TelnetItem::Raw(raw)).await?;
        }
        Ok(())
    }

    async fn notify_established(&mut self) {
        let _ = self
            .events
            .send(SessionEvent::Established { id: self.id })
            .await;
    }
}

fn find_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|pair| pair == b"\r\n")
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("waiting_for_confirmation", &self.waiting_for_confirmation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_regex_anchoring() {
        assert!(BANNER.is_match("telnet_client_1: connected\r\n"));
        assert!(BANNER.is_match("telnet_client_42: connected\r\n"));
        assert!(!BANNER.is_match("telnet_client_1: connected"));
        assert!(!BANNER.is_match("xtelnet_client_1: connected\r\n"));
        assert!(!BANNER.is_match("telnet_client_: connected\r\n"));
    }

    #[test]
    fn test_find_crlf() {
        assert_eq!(find_crlf(b"abc\r\ndef"), Some(3));
        assert_eq!(find_crlf(b"abc"), None);
        assert_eq!(find_crlf(b"\r\n"), Some(0));
    }
}
