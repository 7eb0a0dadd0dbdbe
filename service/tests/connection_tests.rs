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

//! Connection handshake tests over loopback TCP pairs.

use bytes::Bytes;
use hlx_service::{Connection, ConnectionId, ServiceError, SessionEvent};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

async fn create_test_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client_task = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });

    let (server, _) = listener.accept().await.unwrap();
    let client = client_task.await.unwrap();

    (server, client)
}

#[tokio::test]
async fn test_server_sends_banner_then_establishes() {
    let (server, mut peer) = create_test_pair().await;
    let (events_tx, mut events) = mpsc::channel(16);

    let (connection, handle) =
        Connection::server(ConnectionId::new(1), server, events_tx).unwrap();
    let worker = tokio::spawn(connection.run());

    let mut buffer = [0u8; 64];
    let count = peer.read(&mut buffer).await.unwrap();
    assert_eq!(&buffer[..count], b"telnet_client_1: connected\r\n");

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Established { .. }
    ));

    handle.disconnect().await.unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Disconnected { error: None, .. }
    ));
    worker.await.unwrap();
}

#[tokio::test]
async fn test_banner_session_number_matches_id() {
    let (server, mut peer) = create_test_pair().await;
    let (events_tx, _events) = mpsc::channel(16);

    let (connection, _handle) =
        Connection::server(ConnectionId::new(42), server, events_tx).unwrap();
    tokio::spawn(connection.run());

    let mut buffer = [0u8; 64];
    let count = peer.read(&mut buffer).await.unwrap();
    assert_eq!(&buffer[..count], b"telnet_client_42: connected\r\n");
}

#[tokio::test]
async fn test_client_queues_writes_until_banner() {
    let (peer_side, client_side) = create_test_pair().await;
    let mut peer = peer_side;
    let (events_tx, mut events) = mpsc::channel(16);

    let (connection, handle) = Connection::client(
        ConnectionId::new(1),
        client_side,
        events_tx,
        Duration::from_secs(5),
    )
    .unwrap();
    tokio::spawn(connection.run());

    // A send before the banner must be queued, not written.
    handle.send(Bytes::from_static(b"[QX]")).await.unwrap();

    let mut buffer = [0u8; 64];
    let premature = tokio::time::timeout(Duration::from_millis(200), peer.read(&mut buffer)).await;
    assert!(premature.is_err(), "write leaked before the banner");

    // The banner establishes the session and flushes the queue.
    peer.write_all(b"telnet_client_7: connected\r\n")
        .await
        .unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Established { .. }
    ));

    let count = peer.read(&mut buffer).await.unwrap();
    assert_eq!(&buffer[..count], b"[QX]");
}

#[tokio::test]
async fn test_client_discards_banner_and_forwards_trailing_data() {
    let (mut peer, client_side) = create_test_pair().await;
    let (events_tx, mut events) = mpsc::channel(16);

    let (connection, _handle) = Connection::client(
        ConnectionId::new(1),
        client_side,
        events_tx,
        Duration::from_secs(5),
    )
    .unwrap();
    tokio::spawn(connection.run());

    // Banner and first notification arrive in one segment.
    peer.write_all(b"telnet_client_1: connected\r\n(VO1R-10)")
        .await
        .unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Established { .. }
    ));

    match events.recv().await.unwrap() {
        SessionEvent::Data { data, .. } => assert_eq!(&data[..], b"(VO1R-10)"),
        other => panic!("expected data, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_handshake_timeout() {
    let (_peer, client_side) = create_test_pair().await;
    let (events_tx, mut events) = mpsc::channel(16);

    let (connection, _handle) = Connection::client(
        ConnectionId::new(1),
        client_side,
        events_tx,
        Duration::from_millis(200),
    )
    .unwrap();
    tokio::spawn(connection.run());

    match events.recv().await.unwrap() {
        SessionEvent::Disconnected { error, .. } => {
            assert_eq!(error, Some(ServiceError::Timeout));
        }
        other => panic!("expected disconnect, got {other:?}"),
    }
}

#[tokio::test]
async fn test_telnet_negotiation_is_refused() {
    let (server, mut peer) = create_test_pair().await;
    let (events_tx, _events) = mpsc::channel(16);

    let (connection, _handle) =
        Connection::server(ConnectionId::new(1), server, events_tx).unwrap();
    tokio::spawn(connection.run());

    let mut buffer = [0u8; 64];
    let count = peer.read(&mut buffer).await.unwrap();
    assert_eq!(&buffer[..count], b"telnet_client_1: connected\r\n");

    // IAC DO ECHO must come back as IAC WONT ECHO.
    peer.write_all(&[255, 253, 1]).await.unwrap();
    let count = peer.read(&mut buffer).await.unwrap();
    assert_eq!(&buffer[..count], &[255, 252, 1]);
}

#[tokio::test]
async fn test_peer_close_is_graceful_after_establish() {
    let (server, peer) = create_test_pair().await;
    let (events_tx, mut events) = mpsc::channel(16);

    let (connection, _handle) =
        Connection::server(ConnectionId::new(1), server, events_tx).unwrap();
    tokio::spawn(connection.run());

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Established { .. }
    ));

    drop(peer);

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Disconnected { error: None, .. }
    ));
}
