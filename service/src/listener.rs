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

use crate::{ServiceError, ServiceResult};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

/// A bound TCP listening socket.
///
/// Binding fails fast; the manager surfaces a bind or listen error as
/// `DidNotListen` and aborts the listen operation.
pub struct Listener {
    inner: TcpListener,
    address: SocketAddr,
}

impl Listener {
    /// Binds and listens on `address`.
    pub async fn bind(address: SocketAddr) -> ServiceResult<Self> {
        let inner = TcpListener::bind(address)
            .await
            .map_err(ServiceError::from)?;
        let address = inner.local_addr().map_err(ServiceError::from)?;

        info!(%address, "listening");

        Ok(Self { inner, address })
    }

    /// Returns the bound address.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Accepts the next peer.
    pub async fn accept(&self) -> ServiceResult<(TcpStream, SocketAddr)> {
        self.inner.accept().await.map_err(ServiceError::from)
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_and_accept() {
        let listener = Listener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let address = listener.address();
        assert_ne!(address.port(), 0);

        let dial = tokio::spawn(async move { TcpStream::connect(address).await.unwrap() });
        let (_stream, peer) = listener.accept().await.unwrap();
        assert_eq!(peer.ip(), address.ip());
        dial.await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_conflict_fails_fast() {
        let first = Listener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let result = Listener::bind(first.address()).await;
        assert!(result.is_err());
    }
}
