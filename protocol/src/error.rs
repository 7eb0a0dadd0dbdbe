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

//! Error types for the HLX command protocol.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// HLX command protocol errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A growing operation was attempted on caller-provided backing.
    #[error("buffer backing is not owned")]
    BufferNotOwned,

    /// The requested size exceeds the buffer capacity.
    #[error("no space for {requested} bytes in capacity {capacity}")]
    NoSpace {
        /// Bytes requested.
        requested: usize,
        /// Fixed capacity available.
        capacity: usize,
    },

    /// A get was attempted past the buffered data.
    #[error("{requested} bytes requested but only {available} buffered")]
    Underflow {
        /// Bytes requested.
        requested: usize,
        /// Bytes available.
        available: usize,
    },

    /// A frame matched no entry in the command table.
    #[error("frame matches no registered command")]
    UnknownCommand,

    /// A capture group was absent or failed numeric conversion.
    #[error("capture {index} missing or malformed")]
    MalformedCapture {
        /// 1-based capture group index.
        index: usize,
    },
}
