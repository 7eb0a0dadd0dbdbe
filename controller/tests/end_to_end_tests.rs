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

//! End-to-end tests: client controller against the emulated hardware.

use hlx_controller::{Controller, ControllerError, ControllerEvent, Server, StateChange};
use hlx_service::{IpVersions, ServiceError};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start_server() -> SocketAddr {
    let mut server = Server::new(TIMEOUT).unwrap();
    let bound = server
        .listen(Some("127.0.0.1:0"), IpVersions::v4_only())
        .await
        .unwrap();
    let address = bound[0];

    tokio::spawn(async move { server.run().await });

    address
}

async fn connected_controller(address: SocketAddr) -> Controller {
    let mut controller = Controller::new(TIMEOUT).unwrap();
    let _ = controller
        .connect(&format!("telnet://{address}"), IpVersions::v4_only(), TIMEOUT)
        .await
        .unwrap();
    controller
}

/// A raw subscriber that has consumed the banner.
async fn raw_subscriber(address: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(address).await.unwrap();
    let mut buffer = [0u8; 64];
    let count = stream.read(&mut buffer).await.unwrap();
    assert!(buffer[..count].starts_with(b"telnet_client_"));
    stream
}

/// Drains every event the controller has ready.
async fn drain_events(controller: &mut Controller) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) =
        tokio::time::timeout(Duration::from_millis(50), controller.next_event()).await
    {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_connect_refresh_disconnect_sequence() {
    let address = start_server().await;
    let mut controller = Controller::new(TIMEOUT).unwrap();

    let _ = controller
        .connect(&format!("telnet://{address}"), IpVersions::v4_only(), TIMEOUT)
        .await
        .unwrap();
    controller.refresh().await.unwrap();
    let _ = controller.disconnect().await.unwrap();

    let events = drain_events(&mut controller).await;
    let lifecycle: Vec<&ControllerEvent> = events
        .iter()
        .filter(|event| {
            !matches!(
                event,
                ControllerEvent::StateChanged(_) | ControllerEvent::IsRefreshing { .. }
            )
        })
        .collect();

    assert!(matches!(lifecycle[0], ControllerEvent::WillConnect));
    assert!(matches!(lifecycle[1], ControllerEvent::IsConnecting));
    assert!(matches!(lifecycle[2], ControllerEvent::DidConnect));
    assert!(matches!(lifecycle[3], ControllerEvent::DidRefresh));
    assert!(matches!(lifecycle[4], ControllerEvent::WillDisconnect));
    assert!(matches!(
        lifecycle[5],
        ControllerEvent::DidDisconnect { error: None }
    ));

    // Progress fires at least once, strictly within (0, 100].
    let progress: Vec<u8> = events
        .iter()
        .filter_map(|event| match event {
            ControllerEvent::IsRefreshing { percent } => Some(*percent),
            _ => None,
        })
        .collect();
    assert!(!progress.is_empty());
    assert!(progress.iter().all(|p| *p > 0 && *p <= 100));
    assert_eq!(*progress.last().unwrap(), 100);

    // Both peers started from factory defaults, so the refresh must not
    // have produced a single state change.
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, ControllerEvent::StateChanged(_)))
    );
}

#[tokio::test]
async fn test_double_disconnect_is_a_no_op() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    assert!(controller.disconnect().await.unwrap().is_changed());
    assert!(!controller.disconnect().await.unwrap().is_changed());
}

#[tokio::test]
async fn test_set_zone_volume_and_read_back() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    controller.set_zone_volume(3, -25).await.unwrap();
    assert_eq!(controller.zones().zone(3).unwrap().volume().level(), -25);

    let events = drain_events(&mut controller).await;
    let changes: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, ControllerEvent::StateChanged(_)))
        .collect();
    assert_eq!(changes.len(), 1);

    // Setting the same value again is acknowledged but changes nothing.
    controller.set_zone_volume(3, -25).await.unwrap();
    let events = drain_events(&mut controller).await;
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, ControllerEvent::StateChanged(_)))
    );
}

#[tokio::test]
async fn test_set_zone_name_reaches_other_subscriber() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;
    let mut subscriber = raw_subscriber(address).await;

    controller.set_zone_name(7, "Kitchen").await.unwrap();
    assert_eq!(controller.zones().zone(7).unwrap().name().as_str(), "Kitchen");

    let events = drain_events(&mut controller).await;
    assert!(events.iter().any(|event| matches!(
        event,
        ControllerEvent::StateChanged(StateChange::ZoneName { zone: 7, .. })
    )));

    // The state-changing response fans out to the other subscriber.
    let mut buffer = [0u8; 64];
    let count = subscriber.read(&mut buffer).await.unwrap();
    assert_eq!(&buffer[..count], b"(NO7\"Kitchen\")");
}

#[tokio::test]
async fn test_unchanged_write_is_not_fanned_out() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    controller.set_zone_volume(3, -25).await.unwrap();
    let _ = drain_events(&mut controller).await;

    let mut subscriber = raw_subscriber(address).await;

    // The peer state already holds -25; the acknowledgement returns to
    // the writer alone.
    controller.set_zone_volume(3, -25).await.unwrap();

    let mut buffer = [0u8; 64];
    let silent =
        tokio::time::timeout(Duration::from_millis(200), subscriber.read(&mut buffer)).await;
    assert!(silent.is_err(), "no-op write leaked to other subscribers");
}

#[tokio::test]
async fn test_unknown_command_answered_with_error() {
    let address = start_server().await;
    let mut client = raw_subscriber(address).await;

    client.write_all(b"[ZZZ]").await.unwrap();

    let mut buffer = [0u8; 64];
    let count = client.read(&mut buffer).await.unwrap();
    assert_eq!(&buffer[..count], b"(ERROR)");
}

#[tokio::test]
async fn test_rejected_write_surfaces_error_response() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    // +1 dB is above the volume ceiling; the peer answers (ERROR).
    let result = controller.set_zone_volume(3, 1).await;
    assert_eq!(
        result.unwrap_err(),
        ControllerError::Service(ServiceError::ErrorResponse)
    );

    // The mirror is untouched.
    assert_eq!(
        controller.zones().zone(3).unwrap().volume().level(),
        hlx_model::VOLUME_LEVEL_MIN
    );
}

#[tokio::test]
async fn test_zone_query_dump_over_the_wire() {
    let address = start_server().await;
    let mut client = raw_subscriber(address).await;

    client.write_all(b"[QO3]").await.unwrap();

    let mut collected = Vec::new();
    let mut buffer = [0u8; 1024];
    while !collected.ends_with(b"(QO3)") {
        let count = client.read(&mut buffer).await.unwrap();
        assert!(count > 0);
        collected.extend_from_slice(&buffer[..count]);
    }

    let text = String::from_utf8(collected).unwrap();
    assert!(text.starts_with("(NO3\"ZONE 3\")"));
    assert!(text.contains("(VO3R-80)"));
    assert!(text.ends_with("(QO3)"));
}

#[tokio::test]
async fn test_toggle_mute_round_trip() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    controller.toggle_zone_mute(5).await.unwrap();
    assert!(controller.zones().zone(5).unwrap().volume().is_muted());

    controller.toggle_zone_mute(5).await.unwrap();
    assert!(!controller.zones().zone(5).unwrap().volume().is_muted());
}

#[tokio::test]
async fn test_group_membership_round_trip() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    controller.add_group_zone(2, 5).await.unwrap();
    assert!(controller.groups().group(2).unwrap().contains_zone(5));

    controller.remove_group_zone(2, 5).await.unwrap();
    assert!(!controller.groups().group(2).unwrap().contains_zone(5));

    // Removing the absent member is rejected by the peer.
    assert!(controller.remove_group_zone(2, 5).await.is_err());
}

#[tokio::test]
async fn test_front_panel_locked_query_without_echo() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    // Flip the lock so the refresh observes a change.
    controller.set_front_panel_locked(true).await.unwrap();
    let _ = drain_events(&mut controller).await;

    let mut fresh = Controller::new(TIMEOUT).unwrap();
    let _ = fresh
        .connect(&format!("telnet://{address}"), IpVersions::v4_only(), TIMEOUT)
        .await
        .unwrap();
    fresh.refresh().await.unwrap();

    assert!(fresh.front_panel().panel().is_locked());
}

#[tokio::test]
async fn test_save_configuration_reports_saving_then_saved() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    controller.save_configuration().await.unwrap();

    let events = drain_events(&mut controller).await;
    let changes: Vec<&StateChange> = events
        .iter()
        .filter_map(|event| match event {
            ControllerEvent::StateChanged(change) => Some(change),
            _ => None,
        })
        .collect();

    assert_eq!(
        changes,
        vec![&StateChange::ConfigurationSaving, &StateChange::ConfigurationSaved]
    );
}

#[tokio::test]
async fn test_increase_volume_fails_at_ceiling() {
    let address = start_server().await;
    let mut controller = connected_controller(address).await;

    controller.set_zone_volume(1, 0).await.unwrap();
    let result = controller.increase_zone_volume(1).await;
    assert!(matches!(result, Err(ControllerError::Model(_))));
    assert_eq!(controller.zones().zone(1).unwrap().volume().level(), 0);
}
