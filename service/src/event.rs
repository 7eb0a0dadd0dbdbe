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

//! Event sum types.
//!
//! Lifecycle delegation is rendered as tagged unions over channels: a
//! connection worker reports [`SessionEvent`]s to its manager, the
//! manager returns [`ServiceEvent`]s to its single owner and fans
//! [`ManagerEvent`]s out to every registered delegate.

use crate::{ConnectionId, ConnectionRole, ServiceError};
use bytes::BytesMut;
use std::net::SocketAddr;

/// What a connection worker reports to the manager that owns it.
#[derive(Debug)]
pub enum SessionEvent {
    /// The application session handshake completed.
    Established {
        /// The reporting connection.
        id: ConnectionId,
    },
    /// Application bytes arrived after the handshake.
    Data {
        /// The reporting connection.
        id: ConnectionId,
        /// Decoded application bytes.
        data: BytesMut,
    },
    /// The connection ended. `error` is `None` for a graceful close.
    Disconnected {
        /// The reporting connection.
        id: ConnectionId,
        /// The terminal error, if any.
        error: Option<ServiceError>,
    },
}

/// What the manager returns to its one-and-only application-data owner.
#[derive(Debug)]
pub enum ServiceEvent {
    /// A connection became usable.
    Established {
        /// The connection.
        id: ConnectionId,
        /// Which role it plays.
        role: ConnectionRole,
    },
    /// Application bytes from a connection.
    Data {
        /// The originating connection.
        id: ConnectionId,
        /// Decoded application bytes.
        data: BytesMut,
    },
    /// A connection ended and was parked for disposal.
    Disconnected {
        /// The connection.
        id: ConnectionId,
        /// The terminal error, if any.
        error: Option<ServiceError>,
    },
}

/// Lifecycle notifications fanned out to every registered delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    /// Host resolution is starting.
    WillResolve {
        /// The host being resolved.
        host: String,
    },
    /// Host resolution produced an address.
    DidResolve {
        /// The host that was resolved.
        host: String,
        /// One resolved address.
        address: SocketAddr,
    },
    /// Host resolution failed.
    DidNotResolve {
        /// The host that failed to resolve.
        host: String,
        /// Why.
        error: ServiceError,
    },
    /// A listener is about to bind.
    WillListen {
        /// The bind address.
        address: SocketAddr,
    },
    /// A listener is accepting.
    DidListen {
        /// The bound address.
        address: SocketAddr,
    },
    /// Binding or listening failed.
    DidNotListen {
        /// The bind address.
        address: SocketAddr,
        /// Why.
        error: ServiceError,
    },
    /// A peer connected to a listener.
    DidAccept {
        /// The new connection.
        id: ConnectionId,
        /// The peer address.
        peer: SocketAddr,
    },
    /// Accepting a peer failed.
    DidNotAccept {
        /// Why.
        error: ServiceError,
    },
    /// An outbound dial is starting.
    WillConnect {
        /// The dial target.
        address: SocketAddr,
    },
    /// The transport is up; the handshake is in progress.
    IsConnecting {
        /// The dial target.
        address: SocketAddr,
    },
    /// The handshake completed; the connection is usable.
    DidConnect {
        /// The new connection.
        id: ConnectionId,
    },
    /// Dialing or the handshake failed.
    DidNotConnect {
        /// The dial target.
        address: SocketAddr,
        /// Why.
        error: ServiceError,
    },
    /// A teardown is starting.
    WillDisconnect {
        /// The connection being torn down.
        id: ConnectionId,
    },
    /// A connection ended. `error` is `None` for a graceful close.
    DidDisconnect {
        /// The connection that ended.
        id: ConnectionId,
        /// The terminal error, if any.
        error: Option<ServiceError>,
    },
    /// A non-connection failure surfaced.
    Error {
        /// The failure.
        error: ServiceError,
    },
}
