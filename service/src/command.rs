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

//! Command dispatch and request correlation.
//!
//! One [`CommandManager`] serves a role:
//!
//! - **Server role** (receiving requests): inbound bytes are buffered
//!   per connection, split at each `]`, and matched against the
//!   registered handlers in registration order; the first match wins.
//!   A frame matching nothing is reported as [`Inbound::Unmatched`] and
//!   the caller answers with the protocol error response.
//! - **Client role** (receiving responses): frames split at each `)`.
//!   The head of the per-connection FIFO exchange queue is offered the
//!   frame first - the hardware is strictly request/response-serial -
//!   and anything else falls through to the registered notification
//!   table. Every exchange carries a deadline; [`expire`] fails overdue
//!   heads with a timeout.
//!
//! [`expire`]: CommandManager::expire

use crate::{ConnectionId, ConnectionRole, ServiceError, ServiceResult};
use bytes::Bytes;
use hlx_protocol::{CommandKind, CommandMatch, ConnectionBuffer, Pattern, frame, pattern};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace};

/// The completion side of an in-flight exchange.
pub type ExchangeReply = oneshot::Receiver<ServiceResult<CommandMatch>>;

struct Exchange {
    response: &'static Pattern,
    deadline: Instant,
    reply: oneshot::Sender<ServiceResult<CommandMatch>>,
}

/// A dispatched inbound frame.
#[derive(Debug)]
pub enum Inbound {
    /// A request matched a registered handler (server role).
    Request {
        /// Originating connection.
        id: ConnectionId,
        /// The match, captures included.
        matched: CommandMatch,
        /// The raw frame.
        frame: Bytes,
    },
    /// An unsolicited notification matched the registered table (client
    /// role).
    Notification {
        /// Originating connection.
        id: ConnectionId,
        /// The match, captures included.
        matched: CommandMatch,
        /// The raw frame.
        frame: Bytes,
    },
    /// A response completed the head exchange; its completion has
    /// already been delivered through the exchange's reply channel.
    ResponseCompleted {
        /// Originating connection.
        id: ConnectionId,
        /// The match that completed the exchange.
        matched: CommandMatch,
    },
    /// A protocol error response failed the head exchange; the failure
    /// has already been delivered through the exchange's reply channel.
    ResponseFailed {
        /// Originating connection.
        id: ConnectionId,
    },
    /// No handler or exchange claimed the frame.
    Unmatched {
        /// Originating connection.
        id: ConnectionId,
        /// The raw frame.
        frame: Bytes,
    },
}

/// Pattern-directed dispatch and exchange correlation; see the module
/// docs.
pub struct CommandManager {
    role: ConnectionRole,
    terminator: u8,
    registrations: Vec<&'static Pattern>,
    registered: HashSet<CommandKind>,
    exchanges: HashMap<ConnectionId, VecDeque<Exchange>>,
    buffers: HashMap<ConnectionId, ConnectionBuffer>,
    timeout: Duration,
}

impl CommandManager {
    /// Creates a server-role manager (dispatches requests at `]`).
    pub fn server(timeout: Duration) -> Self {
        Self::new(ConnectionRole::Server, frame::REQUEST_END, timeout)
    }

    /// Creates a client-role manager (dispatches responses at `)`).
    pub fn client(timeout: Duration) -> Self {
        Self::new(ConnectionRole::Client, frame::RESPONSE_END, timeout)
    }

    fn new(role: ConnectionRole, terminator: u8, timeout: Duration) -> Self {
        Self {
            role,
            terminator,
            registrations: Vec::new(),
            registered: HashSet::new(),
            exchanges: HashMap::new(),
            buffers: HashMap::new(),
            timeout,
        }
    }

    /// The configured per-exchange timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registers a handler for `kind`. Registration order is match
    /// order. Registering the same command twice fails.
    pub fn register_handler(&mut self, kind: CommandKind) -> ServiceResult<()> {
        if !self.registered.insert(kind) {
            return Err(ServiceError::AlreadyExists);
        }
        self.registrations.push(pattern(kind));
        Ok(())
    }

    /// Unregisters the handler for `kind`. Fails when absent.
    pub fn unregister_handler(&mut self, kind: CommandKind) -> ServiceResult<()> {
        if !self.registered.remove(&kind) {
            return Err(ServiceError::NotFound);
        }
        self.registrations.retain(|pattern| pattern.kind != kind);
        Ok(())
    }

    /// Records an in-flight exchange expecting a `response`-kind frame
    /// on `id`. The caller sends the request itself; the returned
    /// receiver completes with the matched response, an error response,
    /// a timeout, or connection teardown.
    pub fn submit_exchange(&mut self, id: ConnectionId, response: CommandKind) -> ExchangeReply {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.exchanges.entry(id).or_default().push_back(Exchange {
            response: pattern(response),
            deadline: Instant::now() + self.timeout,
            reply: reply_tx,
        });

        trace!(%id, ?response, "exchange submitted");
        reply_rx
    }

    /// The earliest exchange deadline across all connections, for the
    /// owner's timer arm.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.exchanges
            .values()
            .filter_map(|queue| queue.front())
            .map(|exchange| exchange.deadline)
            .min()
    }

    /// Fails every overdue head exchange with a timeout.
    pub fn expire(&mut self, now: Instant) {
        for (id, queue) in self.exchanges.iter_mut() {
            while queue.front().is_some_and(|head| head.deadline <= now) {
                let exchange = queue.pop_front().expect("head just checked");
                debug!(%id, "exchange timed out");
                let _ = exchange.reply.send(Err(ServiceError::Timeout));
            }
        }
    }

    /// Fails every pending exchange on `id` and drops its buffer.
    /// Called on disconnect.
    pub fn fail_connection(&mut self, id: ConnectionId, error: ServiceError) {
        if let Some(queue) = self.exchanges.remove(&id) {
            for exchange in queue {
                let _ = exchange.reply.send(Err(error.clone()));
            }
        }
        self.buffers.remove(&id);
    }

    /// Buffers `data` for `id` and dispatches every complete frame.
    pub fn ingest(&mut self, id: ConnectionId, data: &[u8]) -> ServiceResult<Vec<Inbound>> {
        let buffer = self.buffers.entry(id).or_default();
        buffer.put(data)?;

        let (frames, consumed) = {
            let (frames, consumed) = frame::scan(buffer.peek(), self.terminator);
            let owned: Vec<Bytes> = frames.iter().map(|f| Bytes::copy_from_slice(f)).collect();
            (owned, consumed)
        };

        let _ = buffer.get(consumed)?;
        buffer.compact();

        let mut dispatched = Vec::with_capacity(frames.len());
        for frame_bytes in frames {
            dispatched.push(self.dispatch(id, frame_bytes));
        }

        Ok(dispatched)
    }

    fn dispatch(&mut self, id: ConnectionId, frame_bytes: Bytes) -> Inbound {
        // The head exchange is offered the frame first: responses are
        // correlated FIFO against the strictly-serial peer.
        if self.role == ConnectionRole::Client {
            if let Some(matched) = self.try_complete_head(id, &frame_bytes) {
                return Inbound::ResponseCompleted { id, matched };
            }
        }

        if let Some(matched) = self.match_registered(&frame_bytes) {
            return match self.role {
                ConnectionRole::Server => Inbound::Request {
                    id,
                    matched,
                    frame: frame_bytes,
                },
                ConnectionRole::Client => Inbound::Notification {
                    id,
                    matched,
                    frame: frame_bytes,
                },
            };
        }

        // The protocol error response fails the head exchange.
        if self.role == ConnectionRole::Client
            && frame_bytes.as_ref() == frame::ERROR_RESPONSE
            && let Some(queue) = self.exchanges.get_mut(&id)
            && let Some(exchange) = queue.pop_front()
        {
            let _ = exchange.reply.send(Err(ServiceError::ErrorResponse));
            return Inbound::ResponseFailed { id };
        }

        Inbound::Unmatched {
            id,
            frame: frame_bytes,
        }
    }

    fn try_complete_head(&mut self, id: ConnectionId, frame_bytes: &Bytes) -> Option<CommandMatch> {
        let queue = self.exchanges.get_mut(&id)?;
        let head = queue.front()?;

        let text = std::str::from_utf8(frame_bytes).ok()?;
        let captures = head.response.regex.captures(text)?;

        let matched = CommandMatch {
            kind: head.response.kind,
            captures: captures
                .iter()
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        };

        let exchange = queue.pop_front().expect("head just matched");
        let _ = exchange.reply.send(Ok(matched.clone()));

        Some(matched)
    }

    fn match_registered(&self, frame_bytes: &Bytes) -> Option<CommandMatch> {
        let text = std::str::from_utf8(frame_bytes).ok()?;

        for pattern in &self.registrations {
            if let Some(captures) = pattern.regex.captures(text) {
                return Some(CommandMatch {
                    kind: pattern.kind,
                    captures: captures
                        .iter()
                        .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                        .collect(),
                });
            }
        }

        None
    }
}

impl std::fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandManager")
            .field("role", &self.role)
            .field("registrations", &self.registrations.len())
            .field(
                "exchanges",
                &self.exchanges.values().map(VecDeque::len).sum::<usize>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: ConnectionId = ConnectionId::new(1);

    #[test]
    fn test_register_twice_already_exists() {
        let mut manager = CommandManager::server(Duration::from_secs(10));
        manager.register_handler(CommandKind::ZoneVolume).unwrap();
        assert_eq!(
            manager.register_handler(CommandKind::ZoneVolume).unwrap_err(),
            ServiceError::AlreadyExists
        );
    }

    #[test]
    fn test_unregister_missing_not_found() {
        let mut manager = CommandManager::server(Duration::from_secs(10));
        assert_eq!(
            manager.unregister_handler(CommandKind::ZoneVolume).unwrap_err(),
            ServiceError::NotFound
        );
    }

    #[test]
    fn test_register_unregister_register() {
        let mut manager = CommandManager::server(Duration::from_secs(10));
        manager.register_handler(CommandKind::ZoneVolume).unwrap();
        manager.unregister_handler(CommandKind::ZoneVolume).unwrap();
        manager.register_handler(CommandKind::ZoneVolume).unwrap();
    }

    #[test]
    fn test_server_dispatch_matches_request() {
        let mut manager = CommandManager::server(Duration::from_secs(10));
        manager.register_handler(CommandKind::ZoneVolume).unwrap();

        let inbound = manager.ingest(ID, b"[VO3R-25]").unwrap();
        assert_eq!(inbound.len(), 1);
        match &inbound[0] {
            Inbound::Request { matched, .. } => {
                assert_eq!(matched.kind, CommandKind::ZoneVolume);
                assert_eq!(matched.identifier(1).unwrap(), 3);
            }
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn test_server_dispatch_unmatched() {
        let mut manager = CommandManager::server(Duration::from_secs(10));
        manager.register_handler(CommandKind::ZoneVolume).unwrap();

        let inbound = manager.ingest(ID, b"[ZZZ]").unwrap();
        assert!(matches!(&inbound[0], Inbound::Unmatched { .. }));
    }

    #[test]
    fn test_server_dispatch_partial_frames() {
        let mut manager = CommandManager::server(Duration::from_secs(10));
        manager.register_handler(CommandKind::ZoneVolume).unwrap();
        manager.register_handler(CommandKind::ZoneQuery).unwrap();

        // Two frames split across three reads.
        assert!(manager.ingest(ID, b"[VO3").unwrap().is_empty());
        let first = manager.ingest(ID, b"R-25][QO").unwrap();
        assert_eq!(first.len(), 1);
        let second = manager.ingest(ID, b"3]").unwrap();
        assert_eq!(second.len(), 1);
        assert!(matches!(&second[0], Inbound::Request { matched, .. }
            if matched.kind == CommandKind::ZoneQuery));
    }

    #[tokio::test]
    async fn test_client_exchange_completion() {
        let mut manager = CommandManager::client(Duration::from_secs(10));

        let reply = manager.submit_exchange(ID, CommandKind::ZoneVolume);
        let inbound = manager.ingest(ID, b"(VO3R-25)").unwrap();

        assert!(matches!(&inbound[0], Inbound::ResponseCompleted { .. }));
        let matched = reply.await.unwrap().unwrap();
        assert_eq!(matched.kind, CommandKind::ZoneVolume);
        assert_eq!(matched.level(2).unwrap(), -25);
    }

    #[tokio::test]
    async fn test_client_notification_before_exchange_mismatch() {
        let mut manager = CommandManager::client(Duration::from_secs(10));
        manager.register_handler(CommandKind::ZoneMute).unwrap();

        // The head exchange expects the echoed query; a property
        // notification arriving first must dispatch as a notification.
        let reply = manager.submit_exchange(ID, CommandKind::ZoneQuery);
        let inbound = manager.ingest(ID, b"(VMO3)(QO3)").unwrap();

        assert_eq!(inbound.len(), 2);
        assert!(matches!(&inbound[0], Inbound::Notification { matched, .. }
            if matched.kind == CommandKind::ZoneMute));
        assert!(matches!(&inbound[1], Inbound::ResponseCompleted { .. }));

        let matched = reply.await.unwrap().unwrap();
        assert_eq!(matched.kind, CommandKind::ZoneQuery);
    }

    #[tokio::test]
    async fn test_client_error_response_fails_head() {
        let mut manager = CommandManager::client(Duration::from_secs(10));

        let reply = manager.submit_exchange(ID, CommandKind::ZoneVolume);
        let inbound = manager.ingest(ID, b"(ERROR)").unwrap();

        assert!(matches!(&inbound[0], Inbound::ResponseFailed { .. }));
        assert_eq!(reply.await.unwrap().unwrap_err(), ServiceError::ErrorResponse);
    }

    #[tokio::test]
    async fn test_exchange_fifo_order() {
        let mut manager = CommandManager::client(Duration::from_secs(10));

        let first = manager.submit_exchange(ID, CommandKind::ZoneVolume);
        let second = manager.submit_exchange(ID, CommandKind::ZoneMute);

        let _ = manager.ingest(ID, b"(VO1R-10)(VMO1)").unwrap();

        assert_eq!(
            first.await.unwrap().unwrap().kind,
            CommandKind::ZoneVolume
        );
        assert_eq!(second.await.unwrap().unwrap().kind, CommandKind::ZoneMute);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exchange_timeout() {
        let mut manager = CommandManager::client(Duration::from_secs(10));

        let reply = manager.submit_exchange(ID, CommandKind::ZoneVolume);
        let deadline = manager.next_deadline().unwrap();

        tokio::time::sleep_until(deadline).await;
        manager.expire(Instant::now());

        assert_eq!(reply.await.unwrap().unwrap_err(), ServiceError::Timeout);
        assert!(manager.next_deadline().is_none());
    }

    #[tokio::test]
    async fn test_fail_connection_drains_exchanges() {
        let mut manager = CommandManager::client(Duration::from_secs(10));

        let first = manager.submit_exchange(ID, CommandKind::ZoneVolume);
        let second = manager.submit_exchange(ID, CommandKind::ZoneMute);

        manager.fail_connection(ID, ServiceError::ConnectionClosed);

        assert_eq!(first.await.unwrap().unwrap_err(), ServiceError::ConnectionClosed);
        assert_eq!(second.await.unwrap().unwrap_err(), ServiceError::ConnectionClosed);
    }
}
