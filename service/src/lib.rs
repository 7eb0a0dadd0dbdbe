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

//! # HLX Connection and Command Management
//!
//! The connection subsystem shared by the HLX client, the emulated
//! server, and the proxy:
//!
//! - [`Connection`]: one Telnet-framed TCP peer with the application
//!   session handshake. A server connection announces itself with the
//!   banner `telnet_client_<N>: connected\r\n`; a client connection
//!   queues writes until it has seen, matched and discarded that banner.
//! - [`Listener`]: a bound TCP listening socket feeding accepted peers to
//!   the manager.
//! - [`ConnectionManager`]: owns listeners and connections, delivers
//!   inbound application data to its single owner, fans frames out to
//!   every active connection, and parks torn-down connections in an
//!   inactive bin that is drained on the next accept.
//! - [`CommandManager`]: the dispatch point. Inbound bytes are split at
//!   the frame terminator and matched against the registered command
//!   table in registration order; on the client side, in-flight
//!   exchanges are correlated FIFO with per-exchange timeouts.
//!
//! # Architecture
//!
//! ```text
//! owner task (controller / proxy)
//!     ↓ next_event()            ↑ send()/send_all()
//! ConnectionManager ──mpsc──▶ Connection worker ──▶ Framed<TcpStream, TelnetCodec>
//! ```
//!
//! All mutable state lives with the owning task; connection workers own
//! only their socket and communicate over channels, preserving the
//! single-threaded cooperative contract of the protocol.

mod command;
mod connection;
mod error;
mod event;
mod listener;
mod manager;
mod types;
mod url;

pub use self::command::{CommandManager, ExchangeReply, Inbound};
pub use self::connection::{Connection, ConnectionCommand, ConnectionHandle};
pub use self::error::{ServiceError, ServiceResult};
pub use self::event::{ManagerEvent, ServiceEvent, SessionEvent};
pub use self::listener::Listener;
pub use self::manager::ConnectionManager;
pub use self::types::{ConnectionId, ConnectionRole, ConnectionState};
pub use self::url::{DEFAULT_PORT, IpVersions, parse_target, resolve};
