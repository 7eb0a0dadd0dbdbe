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

//! Error types for the connection subsystem.

use crate::types::ConnectionId;
use hlx_protocol::ProtocolError;
use hlx_telnetcodec::CodecError;
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Connection subsystem errors.
///
/// Transport failures are collapsed to their kind so events carrying an
/// error stay cheap to clone when fanned out to several delegates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// I/O error from the socket layer.
    #[error("I/O error: {0:?}")]
    Io(std::io::ErrorKind),

    /// Protocol error from the framing layer.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The peer actively refused the connection.
    #[error("connection refused")]
    ConnectionRefused,

    /// The peer reset the connection.
    #[error("connection reset")]
    ConnectionReset,

    /// The connection is closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// No active connection has the given identifier.
    #[error("connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    /// A registration collides with an existing one.
    #[error("registration already exists")]
    AlreadyExists,

    /// No such registration.
    #[error("registration not found")]
    NotFound,

    /// The operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// The listen or connect target could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The peer answered an exchange with the protocol error response.
    #[error("peer answered (ERROR)")]
    ErrorResponse,

    /// A dependency failed during initialization.
    #[error("initialization failed")]
    InitializationFailed,

    /// An unclassified terminal failure.
    #[error("unknown error")]
    Unknown,
}

impl From<std::io::Error> for ServiceError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::ConnectionRefused => ServiceError::ConnectionRefused,
            std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe => {
                ServiceError::ConnectionReset
            }
            std::io::ErrorKind::TimedOut => ServiceError::Timeout,
            kind => ServiceError::Io(kind),
        }
    }
}

impl From<CodecError> for ServiceError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::Io(io) => io.into(),
            CodecError::SubnegotiationTooLong(_) => {
                ServiceError::Io(std::io::ErrorKind::InvalidData)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kind_mapping() {
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert_eq!(ServiceError::from(refused), ServiceError::ConnectionRefused);

        let reset = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        assert_eq!(ServiceError::from(reset), ServiceError::ConnectionReset);

        let timed_out = std::io::Error::from(std::io::ErrorKind::TimedOut);
        assert_eq!(ServiceError::from(timed_out), ServiceError::Timeout);

        let other = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert_eq!(
            ServiceError::from(other),
            ServiceError::Io(std::io::ErrorKind::PermissionDenied)
        );
    }

    #[test]
    fn test_error_display() {
        let err = ServiceError::ConnectionNotFound(ConnectionId::new(42));
        assert_eq!(err.to_string(), "connection conn-42 not found");
    }
}
