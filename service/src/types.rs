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

//! Core types for the connection subsystem.

use std::fmt;

/// Unique identifier for a connection.
///
/// Server-side identifiers are the per-server session numbers embedded
/// in the handshake banner: monotonically increasing from 1, never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a connection ID.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying session number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Which side of the wire a connection plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    /// Dialed out to a server; waits for the banner before becoming
    /// usable.
    Client,
    /// Accepted from a listener; sends the banner once writable.
    Server,
}

/// Connection lifecycle state.
///
/// Client connections run `Unknown → Connecting → Connected →
/// Disconnecting → Disconnected`; server connections run `Unknown →
/// Accepting → Accepted → Disconnecting → Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not yet started.
    Unknown,
    /// Dialing and awaiting the banner (client role).
    Connecting,
    /// Awaiting writability for the banner (server role).
    Accepting,
    /// Banner received and discarded; usable (client role).
    Connected,
    /// Banner sent; usable (server role).
    Accepted,
    /// Teardown requested.
    Disconnecting,
    /// Terminal.
    Disconnected,
}

impl ConnectionState {
    /// Returns whether the application session is established.
    pub fn is_established(self) -> bool {
        matches!(self, Self::Connected | Self::Accepted)
    }

    /// Returns whether the connection is tearing down or gone.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Disconnecting | Self::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unknown => "unknown",
            Self::Connecting => "connecting",
            Self::Accepting => "accepting",
            Self::Connected => "connected",
            Self::Accepted => "accepted",
            Self::Disconnecting => "disconnecting",
            Self::Disconnected => "disconnected",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_ordering() {
        let first = ConnectionId::new(1);
        let second = ConnectionId::new(2);
        assert!(first < second);
        assert_eq!(first.as_u64(), 1);
        assert_eq!(first.to_string(), "conn-1");
    }

    #[test]
    fn test_state_predicates() {
        assert!(ConnectionState::Connected.is_established());
        assert!(ConnectionState::Accepted.is_established());
        assert!(!ConnectionState::Connecting.is_established());

        assert!(ConnectionState::Disconnecting.is_terminal());
        assert!(ConnectionState::Disconnected.is_terminal());
        assert!(!ConnectionState::Accepted.is_terminal());
    }
}
