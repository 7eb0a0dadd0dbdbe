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

//! Connection manager.
//!
//! The ConnectionManager is responsible for:
//! - Listening and dialing out, one listener per resolved address
//! - Spawning and tracking connection workers
//! - Delivering inbound application data to its single owner
//! - Fanning frames out to every active connection, origin first
//! - Parking torn-down connections in an inactive bin that is drained
//!   on the next accept or an explicit flush
//! - Broadcasting lifecycle events to every registered delegate

use crate::{
    Connection, ConnectionHandle, ConnectionId, ConnectionRole, DEFAULT_PORT, IpVersions, Listener,
    ManagerEvent, ServiceError, ServiceEvent, ServiceResult, SessionEvent, parse_target, resolve,
};
use bytes::Bytes;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SESSION_BUFFER_SIZE: usize = 256;
const ACCEPT_BUFFER_SIZE: usize = 32;
const DELEGATE_BUFFER_HINT: usize = 256;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// What a listener's accept loop forwards to the manager.
#[derive(Debug)]
enum AcceptEvent {
    Accepted { stream: TcpStream, peer: SocketAddr },
    Failed { error: ServiceError },
}

struct ActiveConnection {
    handle: ConnectionHandle,
    task: JoinHandle<()>,
    established: bool,
}

struct InactiveConnection {
    id: ConnectionId,
    task: JoinHandle<()>,
}

/// Owns listeners and connections; see the module docs.
pub struct ConnectionManager {
    session_tx: mpsc::Sender<SessionEvent>,
    session_rx: mpsc::Receiver<SessionEvent>,
    accept_tx: mpsc::Sender<AcceptEvent>,
    accept_rx: mpsc::Receiver<AcceptEvent>,
    active: HashMap<ConnectionId, ActiveConnection>,
    inactive: Vec<InactiveConnection>,
    delegates: Vec<mpsc::Sender<ManagerEvent>>,
    listener_tasks: Vec<JoinHandle<()>>,
    next_session: u64,
    handshake_timeout: Duration,
}

impl ConnectionManager {
    /// Creates a manager. `handshake_timeout` bounds the client-side
    /// banner wait.
    pub fn new(handshake_timeout: Duration) -> Self {
        let (session_tx, session_rx) = mpsc::channel(SESSION_BUFFER_SIZE);
        let (accept_tx, accept_rx) = mpsc::channel(ACCEPT_BUFFER_SIZE);

        Self {
            session_tx,
            session_rx,
            accept_tx,
            accept_rx,
            active: HashMap::new(),
            inactive: Vec::new(),
            delegates: Vec::new(),
            listener_tasks: Vec::new(),
            next_session: 1,
            handshake_timeout,
        }
    }

    /// Registers a lifecycle delegate. Use a buffer of at least
    /// [`ConnectionManager::delegate_buffer_hint`] to avoid drops.
    pub fn add_delegate(&mut self, delegate: mpsc::Sender<ManagerEvent>) {
        self.delegates.push(delegate);
    }

    /// The recommended delegate channel capacity.
    pub fn delegate_buffer_hint() -> usize {
        DELEGATE_BUFFER_HINT
    }

    /// Returns the number of active connections.
    pub fn connection_count(&self) -> usize {
        self.active.len()
    }

    /// Returns the number of connections awaiting disposal.
    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    /// Returns the established connection IDs in ascending order.
    pub fn established_ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self
            .active
            .iter()
            .filter(|(_, active)| active.established)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Returns the peer address of an active connection.
    pub fn peer(&self, id: ConnectionId) -> ServiceResult<SocketAddr> {
        self.active
            .get(&id)
            .map(|active| active.handle.peer())
            .ok_or(ServiceError::ConnectionNotFound(id))
    }

    /// Listens on `target`, or on the wildcard addresses for the
    /// requested IP versions when `target` is `None`. One listener is
    /// created per resolved address; the first bind failure aborts.
    pub async fn listen(
        &mut self,
        target: Option<&str>,
        versions: IpVersions,
    ) -> ServiceResult<Vec<SocketAddr>> {
        let addresses = match target {
            Some(target) => self.resolve_target(target, versions).await?,
            None => versions.wildcards(DEFAULT_PORT),
        };

        let mut bound = Vec::new();
        for address in addresses {
            self.emit(ManagerEvent::WillListen { address });

            match Listener::bind(address).await {
                Ok(listener) => {
                    let local = listener.address();
                    self.emit(ManagerEvent::DidListen { address: local });
                    self.spawn_accept_loop(listener);
                    bound.push(local);
                }
                Err(error) => {
                    self.emit(ManagerEvent::DidNotListen {
                        address,
                        error: error.clone(),
                    });
                    return Err(error);
                }
            }
        }

        Ok(bound)
    }

    /// Dials `target`, trying each resolved address in order. Returns
    /// the new connection's ID once the transport is up; the connection
    /// becomes usable when [`ServiceEvent::Established`] is observed.
    pub async fn connect(
        &mut self,
        target: &str,
        versions: IpVersions,
        timeout: Duration,
    ) -> ServiceResult<ConnectionId> {
        let addresses = self.resolve_target(target, versions).await?;

        let mut last_error = ServiceError::Unknown;
        for address in addresses {
            self.emit(ManagerEvent::WillConnect { address });

            match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
                Ok(Ok(stream)) => {
                    self.emit(ManagerEvent::IsConnecting { address });
                    let id = self.allocate_id();
                    let (connection, handle) = Connection::client(
                        id,
                        stream,
                        self.session_tx.clone(),
                        self.handshake_timeout,
                    )?;
                    let task = tokio::spawn(connection.run());
                    self.active.insert(
                        id,
                        ActiveConnection {
                            handle,
                            task,
                            established: false,
                        },
                    );
                    info!(%id, %address, "transport connected");
                    return Ok(id);
                }
                Ok(Err(error)) => {
                    let error = ServiceError::from(error);
                    self.emit(ManagerEvent::DidNotConnect {
                        address,
                        error: error.clone(),
                    });
                    last_error = error;
                }
                Err(_) => {
                    self.emit(ManagerEvent::DidNotConnect {
                        address,
                        error: ServiceError::Timeout,
                    });
                    last_error = ServiceError::Timeout;
                }
            }
        }

        Err(last_error)
    }

    /// Waits for the next event for the application-data owner.
    pub async fn next_event(&mut self) -> ServiceEvent {
        loop {
            tokio::select! {
                Some(accept) = self.accept_rx.recv() => match accept {
                    AcceptEvent::Accepted { stream, peer } => {
                        self.flush_inactive();
                        if let Err(error) = self.admit(stream, peer) {
                            self.emit(ManagerEvent::DidNotAccept { error });
                        }
                    }
                    AcceptEvent::Failed { error } => {
                        self.emit(ManagerEvent::DidNotAccept { error });
                    }
                },
                Some(session) = self.session_rx.recv() => {
                    if let Some(event) = self.handle_session_event(session) {
                        return event;
                    }
                }
            }
        }
    }

    fn handle_session_event(&mut self, session: SessionEvent) -> Option<ServiceEvent> {
        match session {
            SessionEvent::Established { id } => {
                let role = {
                    let active = self.active.get_mut(&id)?;
                    active.established = true;
                    active.handle.role()
                };

                match role {
                    ConnectionRole::Client => self.emit(ManagerEvent::DidConnect { id }),
                    ConnectionRole::Server => {
                        // DidAccept already fired when the socket arrived.
                    }
                }

                Some(ServiceEvent::Established { id, role })
            }
            SessionEvent::Data { id, data } => Some(ServiceEvent::Data { id, data }),
            SessionEvent::Disconnected { id, error } => {
                if let Some(active) = self.active.remove(&id) {
                    self.inactive.push(InactiveConnection {
                        id,
                        task: active.task,
                    });
                }
                self.emit(ManagerEvent::DidDisconnect {
                    id,
                    error: error.clone(),
                });
                Some(ServiceEvent::Disconnected { id, error })
            }
        }
    }

    /// Sends a frame to one connection.
    pub async fn send(&self, id: ConnectionId, frame: Bytes) -> ServiceResult<()> {
        let active = self
            .active
            .get(&id)
            .ok_or(ServiceError::ConnectionNotFound(id))?;
        active.handle.send(frame).await
    }

    /// Fans a frame out to every active connection: the originating
    /// connection first, then every other, sequentially. A failed send
    /// is logged and does not abort the remainder. Returns the number of
    /// connections the frame was handed to.
    pub async fn send_all(&self, origin: Option<ConnectionId>, frame: Bytes) -> usize {
        let mut sent = 0;

        let mut order = Vec::with_capacity(self.active.len());
        if let Some(origin) = origin {
            order.push(origin);
        }
        let mut others: Vec<_> = self
            .active
            .keys()
            .copied()
            .filter(|id| Some(*id) != origin)
            .collect();
        others.sort();
        order.extend(others);

        for id in order {
            let Some(active) = self.active.get(&id) else {
                continue;
            };
            match active.handle.send(frame.clone()).await {
                Ok(()) => sent += 1,
                Err(error) => {
                    warn!(%id, %error, "fan-out send failed");
                }
            }
        }

        sent
    }

    /// Starts a graceful teardown of one connection. The terminal
    /// `Disconnected` event arrives through [`next_event`].
    ///
    /// [`next_event`]: ConnectionManager::next_event
    pub async fn disconnect(&mut self, id: ConnectionId) -> ServiceResult<()> {
        let active = self
            .active
            .get(&id)
            .ok_or(ServiceError::ConnectionNotFound(id))?;

        self.emit(ManagerEvent::WillDisconnect { id });
        active.handle.disconnect().await
    }

    /// Tears everything down: every active connection gets
    /// `WillDisconnect` then `DidDisconnect`, listeners are closed, and
    /// the inactive bin is drained.
    pub async fn shutdown(&mut self) {
        let ids: Vec<_> = self.active.keys().copied().collect();
        for id in ids {
            self.emit(ManagerEvent::WillDisconnect { id });
            if let Some(active) = self.active.get(&id) {
                let _ = active.handle.disconnect().await;
            }
        }

        let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
        while !self.active.is_empty() {
            match tokio::time::timeout_at(deadline, self.session_rx.recv()).await {
                Ok(Some(SessionEvent::Disconnected { id, error })) => {
                    if let Some(active) = self.active.remove(&id) {
                        self.inactive.push(InactiveConnection {
                            id,
                            task: active.task,
                        });
                    }
                    self.emit(ManagerEvent::DidDisconnect { id, error });
                }
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }

        for task in self.listener_tasks.drain(..) {
            task.abort();
        }
        for (_, active) in self.active.drain() {
            active.task.abort();
        }
        self.flush_inactive();

        info!("connection manager shut down");
    }

    /// Drops every parked connection. Called automatically on the next
    /// accept.
    pub fn flush_inactive(&mut self) {
        for inactive in self.inactive.drain(..) {
            debug!(id = %inactive.id, "disposing inactive connection");
            drop(inactive.task);
        }
    }

    fn admit(&mut self, stream: TcpStream, peer: SocketAddr) -> ServiceResult<()> {
        let id = self.allocate_id();
        let (connection, handle) = Connection::server(id, stream, self.session_tx.clone())?;
        let task = tokio::spawn(connection.run());

        self.active.insert(
            id,
            ActiveConnection {
                handle,
                task,
                established: false,
            },
        );

        info!(%id, %peer, "accepted connection");
        self.emit(ManagerEvent::DidAccept { id, peer });

        Ok(())
    }

    fn allocate_id(&mut self) -> ConnectionId {
        let id = ConnectionId::new(self.next_session);
        self.next_session += 1;
        id
    }

    async fn resolve_target(
        &mut self,
        target: &str,
        versions: IpVersions,
    ) -> ServiceResult<Vec<SocketAddr>> {
        let host = parse_target(target)?.0;
        self.emit(ManagerEvent::WillResolve { host: host.clone() });

        match resolve(target, versions).await {
            Ok(addresses) => {
                for address in &addresses {
                    self.emit(ManagerEvent::DidResolve {
                        host: host.clone(),
                        address: *address,
                    });
                }
                Ok(addresses)
            }
            Err(error) => {
                self.emit(ManagerEvent::DidNotResolve {
                    host,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    fn spawn_accept_loop(&mut self, listener: Listener) {
        let accept_tx = self.accept_tx.clone();
        let task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        if accept_tx
                            .send(AcceptEvent::Accepted { stream, peer })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(error) => {
                        if accept_tx.send(AcceptEvent::Failed { error }).await.is_err() {
                            break;
                        }
                        // Back off so a persistent accept failure cannot
                        // spin the loop.
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        });
        self.listener_tasks.push(task);
    }

    fn emit(&self, event: ManagerEvent) {
        for delegate in &self.delegates {
            if delegate.try_send(event.clone()).is_err() {
                warn!(?event, "delegate channel full; dropping event");
            }
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("active", &self.active.len())
            .field("inactive", &self.inactive.len())
            .field("listeners", &self.listener_tasks.len())
            .field("next_session", &self.next_session)
            .finish()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
