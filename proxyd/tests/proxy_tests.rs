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

//! Proxy tests: emulated hardware upstream, raw Telnet subscribers
//! downstream.

use hlx_controller::Server;
use hlx_proxyd::Proxy;
use hlx_service::IpVersions;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start_hardware() -> SocketAddr {
    let mut hardware = Server::new(TIMEOUT).unwrap();
    let bound = hardware
        .listen(Some("127.0.0.1:0"), IpVersions::v4_only())
        .await
        .unwrap();
    let address = bound[0];

    tokio::spawn(async move { hardware.run().await });

    address
}

async fn start_proxy(hardware: SocketAddr) -> SocketAddr {
    let mut proxy = Proxy::new(
        &format!("telnet://{hardware}"),
        IpVersions::v4_only(),
        TIMEOUT,
    )
    .await
    .unwrap();

    let bound = proxy
        .listen(Some("127.0.0.1:0"), IpVersions::v4_only())
        .await
        .unwrap();
    let address = bound[0];

    tokio::spawn(async move { proxy.run().await });

    address
}

/// A raw subscriber that has consumed the banner.
async fn subscribe(address: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(address).await.unwrap();
    let mut buffer = [0u8; 64];
    let count = stream.read(&mut buffer).await.unwrap();
    assert!(buffer[..count].starts_with(b"telnet_client_"));
    stream
}

async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut collected = Vec::new();
    let mut buffer = [0u8; 256];
    while !collected.ends_with(b")") {
        let count = stream.read(&mut buffer).await.unwrap();
        assert!(count > 0, "peer closed early");
        collected.extend_from_slice(&buffer[..count]);
    }
    collected
}

async fn expect_silence(stream: &mut TcpStream) {
    let mut buffer = [0u8; 64];
    let result = tokio::time::timeout(Duration::from_millis(200), stream.read(&mut buffer)).await;
    assert!(result.is_err(), "unexpected bytes from the proxy");
}

#[tokio::test]
async fn test_mutation_forwarded_and_fanned_out() {
    let hardware = start_hardware().await;
    let proxy = start_proxy(hardware).await;

    let mut writer = subscribe(proxy).await;
    let mut observer = subscribe(proxy).await;

    writer.write_all(b"[NO7\"Kitchen\"]").await.unwrap();

    // The writer receives the relayed response; the other subscriber
    // receives the identical frame through fan-out.
    assert_eq!(read_frame(&mut writer).await, b"(NO7\"Kitchen\")");
    assert_eq!(read_frame(&mut observer).await, b"(NO7\"Kitchen\")");
}

#[tokio::test]
async fn test_redundant_write_relayed_but_not_fanned_out() {
    let hardware = start_hardware().await;
    let proxy = start_proxy(hardware).await;

    let mut writer = subscribe(proxy).await;

    // Establish the precondition: zone 3 volume is -25.
    writer.write_all(b"[VO3R-25]").await.unwrap();
    assert_eq!(read_frame(&mut writer).await, b"(VO3R-25)");

    let mut observer = subscribe(proxy).await;

    // The redundant write is forwarded upstream, acknowledged to the
    // writer, and suppressed for everyone else.
    writer.write_all(b"[VO3R-25]").await.unwrap();
    assert_eq!(read_frame(&mut writer).await, b"(VO3R-25)");
    expect_silence(&mut observer).await;
}

#[tokio::test]
async fn test_query_answered_from_mirror() {
    let hardware = start_hardware().await;
    let proxy = start_proxy(hardware).await;

    let mut client = subscribe(proxy).await;

    client.write_all(b"[QO5]").await.unwrap();

    let mut collected = Vec::new();
    let mut buffer = [0u8; 1024];
    while !collected.ends_with(b"(QO5)") {
        let count = client.read(&mut buffer).await.unwrap();
        assert!(count > 0);
        collected.extend_from_slice(&buffer[..count]);
    }

    let text = String::from_utf8(collected).unwrap();
    assert!(text.starts_with("(NO5\"ZONE 5\")"));
}

#[tokio::test]
async fn test_unknown_command_answered_with_error() {
    let hardware = start_hardware().await;
    let proxy = start_proxy(hardware).await;

    let mut client = subscribe(proxy).await;

    client.write_all(b"[ZZZ]").await.unwrap();
    assert_eq!(read_frame(&mut client).await, b"(ERROR)");
}

#[tokio::test]
async fn test_hardware_notification_fans_out_to_subscribers() {
    let hardware = start_hardware().await;
    let proxy = start_proxy(hardware).await;

    let mut first = subscribe(proxy).await;
    let mut second = subscribe(proxy).await;

    // A peer talking to the hardware directly, behind the proxy's back.
    let mut direct = subscribe(hardware).await;
    direct.write_all(b"[VO9R-30]").await.unwrap();
    assert_eq!(read_frame(&mut direct).await, b"(VO9R-30)");

    // The hardware notified the proxy's upstream session; the mirror
    // update fans out to every proxy subscriber.
    assert_eq!(read_frame(&mut first).await, b"(VO9R-30)");
    assert_eq!(read_frame(&mut second).await, b"(VO9R-30)");
}

#[tokio::test]
async fn test_rejected_mutation_returns_error_to_originator_only() {
    let hardware = start_hardware().await;
    let proxy = start_proxy(hardware).await;

    let mut writer = subscribe(proxy).await;
    let mut observer = subscribe(proxy).await;

    // +5 dB is above the hardware volume ceiling.
    writer.write_all(b"[VO3R5]").await.unwrap();
    assert_eq!(read_frame(&mut writer).await, b"(ERROR)");
    expect_silence(&mut observer).await;
}

#[tokio::test]
async fn test_mirror_matches_hardware_after_mutations() {
    let hardware = start_hardware().await;

    let mut proxy = Proxy::new(
        &format!("telnet://{hardware}"),
        IpVersions::v4_only(),
        TIMEOUT,
    )
    .await
    .unwrap();
    let bound = proxy
        .listen(Some("127.0.0.1:0"), IpVersions::v4_only())
        .await
        .unwrap();
    let proxy_address = bound[0];

    let client = tokio::spawn(async move {
        let mut client = subscribe(proxy_address).await;
        client.write_all(b"[VO3R-25][NO7\"Kitchen\"]").await.unwrap();

        let mut collected = Vec::new();
        let mut buffer = [0u8; 256];
        while !collected.ends_with(b"(NO7\"Kitchen\")") {
            let count = client.read(&mut buffer).await.unwrap();
            assert!(count > 0);
            collected.extend_from_slice(&buffer[..count]);
        }
    });

    // Drive the proxy long enough for the client to see both
    // responses, then take it back to inspect the mirror.
    let driver = tokio::spawn(async move {
        let _ = tokio::time::timeout(Duration::from_secs(1), proxy.run()).await;
        proxy
    });
    client.await.unwrap();
    let proxy = driver.await.unwrap();

    let zones = proxy.upstream().zones();
    assert_eq!(zones.zone(3).unwrap().volume().level(), -25);
    assert_eq!(zones.zone(7).unwrap().name().as_str(), "Kitchen");
}
