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

//! The proxy core.
//!
//! One client-role [`Controller`] holds the upstream hardware session
//! and the state mirror; a server-role [`CommandManager`] dispatches
//! the many downstream clients.
//!
//! Request path: a mutation is forwarded upstream unconditionally; when
//! its response changed the mirror, the response frame fans out to
//! every subscriber, originator first - otherwise it returns to the
//! originator alone, which is how redundant writes stay quiet. Queries
//! are answered from the refreshed mirror without an upstream round
//! trip. Unsolicited notifications from the hardware mutate the mirror
//! and fan out re-encoded to every subscriber.

use bytes::Bytes;
use hlx_controller::{Controller, ControllerError, ControllerEvent, ServerController, StateChange};
use hlx_protocol::command::{
    configuration, equalizer_presets, favorites, front_panel, groups, infrared, network, sources,
    zones,
};
use hlx_protocol::{CommandKind, frame};
use hlx_service::{
    CommandManager, ConnectionId, ConnectionManager, Inbound, IpVersions, ServiceError,
    ServiceEvent, ServiceResult,
};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The proxy; see the module docs.
pub struct Proxy {
    upstream: Controller,
    downstream: ConnectionManager,
    commands: CommandManager,
}

enum Step {
    Downstream(ServiceEvent),
    Upstream(ControllerEvent),
}

impl Proxy {
    /// Connects to the upstream hardware and collects the full state
    /// mirror before any client is admitted.
    pub async fn new(
        target: &str,
        versions: IpVersions,
        timeout: Duration,
    ) -> Result<Self, ControllerError> {
        let mut upstream = Controller::new(timeout)?;
        let _ = upstream.connect(target, versions, timeout).await?;
        upstream.refresh().await?;

        let mut commands = CommandManager::server(timeout);
        ServerController::register(&mut commands)?;

        info!(upstream = target, "upstream mirror ready");

        Ok(Self {
            upstream,
            downstream: ConnectionManager::new(timeout),
            commands,
        })
    }

    /// Returns the upstream controller and its mirror.
    pub fn upstream(&self) -> &Controller {
        &self.upstream
    }

    /// Binds the downstream listening sockets.
    pub async fn listen(
        &mut self,
        target: Option<&str>,
        versions: IpVersions,
    ) -> ServiceResult<Vec<SocketAddr>> {
        self.downstream.listen(target, versions).await
    }

    /// Serves until cancelled.
    pub async fn run(&mut self) {
        loop {
            self.step().await;
        }
    }

    /// Processes one downstream or upstream event.
    pub async fn step(&mut self) {
        let step = tokio::select! {
            event = self.downstream.next_event() => Step::Downstream(event),
            event = self.upstream.next_event() => Step::Upstream(event),
        };

        match step {
            Step::Downstream(event) => self.handle_downstream(event).await,
            Step::Upstream(event) => self.handle_upstream(event).await,
        }
    }

    /// Tears down both sides.
    pub async fn shutdown(&mut self) {
        self.downstream.shutdown().await;
        let _ = self.upstream.disconnect().await;
        info!("proxy stopped");
    }

    async fn handle_downstream(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::Data { id, data } => match self.commands.ingest(id, &data) {
                Ok(items) => {
                    for item in items {
                        self.dispatch(item).await;
                    }
                }
                Err(error) => warn!(%id, %error, "dropping undecodable input"),
            },
            ServiceEvent::Disconnected { id, .. } => {
                self.commands
                    .fail_connection(id, ServiceError::ConnectionClosed);
            }
            ServiceEvent::Established { id, .. } => {
                debug!(%id, "subscriber joined");
            }
        }
    }

    async fn dispatch(&mut self, item: Inbound) {
        match item {
            Inbound::Request { id, matched, .. } => {
                if is_query(matched.kind) {
                    match self.upstream.answer_query(&matched) {
                        Ok(bodies) => {
                            let frames = encode_responses(&bodies);
                            if let Err(error) = self.downstream.send(id, frames).await {
                                warn!(%id, %error, "query reply failed");
                            }
                        }
                        Err(error) => {
                            debug!(%id, %error, "query rejected");
                            self.send_error(id).await;
                        }
                    }
                    return;
                }

                let Ok(body) = matched.capture(0) else {
                    self.send_error(id).await;
                    return;
                };
                let body = body.to_string();
                let kind = matched.kind;

                match self.upstream.forward(&body, response_kind(kind)).await {
                    Ok((response, changes)) => {
                        let reply = match response.capture(0) {
                            Ok(body) => frame::response(body),
                            Err(_) => Bytes::from_static(frame::ERROR_RESPONSE),
                        };

                        if changes.is_empty() {
                            if let Err(error) = self.downstream.send(id, reply).await {
                                warn!(%id, %error, "response relay failed");
                            }
                        } else {
                            self.downstream.send_all(Some(id), reply).await;
                        }

                        // The hardware's own state moved out from under
                        // the mirror; rebuild it.
                        if matches!(
                            kind,
                            CommandKind::ConfigurationLoad | CommandKind::ConfigurationReset
                        ) && let Err(error) = self.upstream.refresh().await
                        {
                            warn!(%error, "mirror refresh after restore failed");
                        }
                    }
                    Err(error) => {
                        debug!(%id, %error, "upstream rejected request");
                        self.send_error(id).await;
                    }
                }
            }
            Inbound::Unmatched { id, frame: raw } => {
                debug!(%id, frame = ?raw, "unmatched request");
                self.send_error(id).await;
            }
            _ => {}
        }
    }

    async fn handle_upstream(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::StateChanged(change) => {
                // An unsolicited hardware notification; every
                // subscriber hears about it.
                let body = encode_state_change(&change);
                self.downstream
                    .send_all(None, frame::response(&body))
                    .await;
            }
            ControllerEvent::DidDisconnect { error } => {
                warn!(?error, "upstream session lost; dropping subscribers");
                self.downstream.shutdown().await;
            }
            ControllerEvent::Error(error) => {
                warn!(%error, "upstream controller error");
            }
            other => {
                debug!(?other, "upstream lifecycle event");
            }
        }
    }

    async fn send_error(&mut self, id: ConnectionId) {
        let _ = self
            .downstream
            .send(id, Bytes::from_static(frame::ERROR_RESPONSE))
            .await;
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("subscribers", &self.downstream.connection_count())
            .field("upstream_connected", &self.upstream.is_connected())
            .finish()
    }
}

/// Whether a request is answered from the mirror.
fn is_query(kind: CommandKind) -> bool {
    matches!(
        kind,
        CommandKind::ZoneQuery
            | CommandKind::GroupQuery
            | CommandKind::SourceQuery
            | CommandKind::FavoriteQuery
            | CommandKind::EqualizerPresetQuery
            | CommandKind::FrontPanelQueryBrightness
            | CommandKind::FrontPanelQueryLocked
            | CommandKind::NetworkQuery
            | CommandKind::InfraredQuery
            | CommandKind::ConfigurationQuery
    )
}

/// The response kind an exchange for `kind` completes on. The mute
/// toggle answers with the resulting mute state; everything else
/// mirrors its request.
fn response_kind(kind: CommandKind) -> CommandKind {
    match kind {
        CommandKind::ZoneToggleMute => CommandKind::ZoneMute,
        other => other,
    }
}

/// Frames a body list into one wire buffer.
fn encode_responses(bodies: &[String]) -> Bytes {
    let mut text = String::new();
    for body in bodies {
        text.push(frame::RESPONSE_BEGIN as char);
        text.push_str(body);
        text.push(frame::RESPONSE_END as char);
    }
    Bytes::from(text)
}

/// Re-encodes a state change as its canonical notification body.
fn encode_state_change(change: &StateChange) -> String {
    match change {
        StateChange::ZoneVolume { zone, level } => zones::volume(*zone, *level),
        StateChange::ZoneVolumeFixed { zone, fixed } => zones::volume_fixed(*zone, *fixed),
        StateChange::ZoneMute { zone, muted } => zones::mute(*zone, *muted),
        StateChange::ZoneName { zone, name } => zones::name(*zone, name),
        StateChange::ZoneSource { zone, source } => zones::source(*zone, *source),
        StateChange::ZoneBalance { zone, balance } => zones::balance(*zone, *balance),
        StateChange::ZoneTone { zone, bass, treble } => zones::tone(*zone, *bass, *treble),
        StateChange::ZoneSoundMode { zone, mode } => zones::sound_mode(*zone, mode.to_wire()),
        StateChange::ZoneEqualizerBand { zone, band, level } => {
            zones::equalizer_band_level(*zone, *band, *level)
        }
        StateChange::ZoneEqualizerPreset { zone, preset } => {
            zones::equalizer_preset(*zone, *preset)
        }
        StateChange::ZoneHighpass { zone, frequency } => zones::highpass(*zone, *frequency),
        StateChange::ZoneLowpass { zone, frequency } => zones::lowpass(*zone, *frequency),
        StateChange::GroupName { group, name } => groups::name(*group, name),
        StateChange::GroupZoneAdded { group, zone } => groups::add_zone(*group, *zone),
        StateChange::GroupZoneRemoved { group, zone } => groups::remove_zone(*group, *zone),
        StateChange::GroupSource { group, source } => groups::source(*group, *source),
        StateChange::SourceName { source, name } => sources::name(*source, name),
        StateChange::FavoriteName { favorite, name } => favorites::name(*favorite, name),
        StateChange::EqualizerPresetName { preset, name } => {
            equalizer_presets::name(*preset, name)
        }
        StateChange::EqualizerPresetBand {
            preset,
            band,
            level,
        } => equalizer_presets::band_level(*preset, *band, *level),
        StateChange::FrontPanelBrightness { brightness } => front_panel::brightness(*brightness),
        StateChange::FrontPanelLocked { locked } => front_panel::locked(*locked),
        StateChange::NetworkDhcp { enabled } => network::dhcp(*enabled),
        StateChange::NetworkSddp { enabled } => network::sddp(*enabled),
        StateChange::NetworkMac { mac } => network::mac(mac),
        StateChange::NetworkAddress { address } => network::address(*address),
        StateChange::NetworkNetmask { netmask } => network::netmask(*netmask),
        StateChange::NetworkRouter { router } => network::router(*router),
        StateChange::InfraredDisabled { disabled } => infrared::disabled(*disabled),
        StateChange::ConfigurationSaving => configuration::saving_to_backup(),
        StateChange::ConfigurationSaved => configuration::save_to_backup(),
        StateChange::ConfigurationLoaded => configuration::load_from_backup(),
        StateChange::ConfigurationReset => configuration::reset_to_defaults(),
    }
}
