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

//! Error types for the controller layer.

use hlx_model::ModelError;
use hlx_protocol::ProtocolError;
use hlx_service::ServiceError;
use thiserror::Error;

/// Result type for controller operations.
pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

/// Controller layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// An observer or mutator was called before the upstream session
    /// was established.
    #[error("controller is not connected")]
    NotConnected,

    /// A refresh is already in progress.
    #[error("refresh already in progress")]
    RefreshInProgress,

    /// A model setter rejected the operation.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Capture decoding or framing failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The connection subsystem failed.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// An exchange completion channel was dropped.
    #[error("exchange abandoned")]
    ExchangeAbandoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: ControllerError = ModelError::NotFound.into();
        assert_eq!(err, ControllerError::Model(ModelError::NotFound));

        let err: ControllerError = ServiceError::Timeout.into();
        assert_eq!(err, ControllerError::Service(ServiceError::Timeout));
    }
}
