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

//! The emulated hardware.
//!
//! [`ServerController`] aggregates every family controller and routes
//! matched requests to the owning family; [`Server`] glues it to a
//! listening [`ConnectionManager`] and [`CommandManager`], answering
//! queries from default-initialized models, applying mutations, and
//! fanning state-changing responses out to every other subscriber. It
//! doubles as the in-memory stand-in for real hardware in tests.

use crate::{
    ControllerResult, EqualizerPresetsController, FavoritesController, FrontPanelController,
    GroupsController, InfraredController, NetworkController, RequestOutcome, SourcesController,
    StateChange, ZonesController, configuration, equalizer_presets, favorites, front_panel,
    groups, infrared, network, sources, zones,
};
use bytes::{BufMut, Bytes, BytesMut};
use hlx_model::{EQUALIZER_PRESETS_MAX, FAVORITES_MAX, GROUPS_MAX, SOURCES_MAX, ZONES_MAX};
use hlx_protocol::command::configuration as configuration_command;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError, frame};
use hlx_service::{
    CommandManager, ConnectionManager, Inbound, IpVersions, ServiceError, ServiceEvent,
    ServiceResult,
};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Aggregates every family controller on the server side.
#[derive(Debug, Default)]
pub struct ServerController {
    zones: ZonesController,
    groups: GroupsController,
    sources: SourcesController,
    favorites: FavoritesController,
    equalizer_presets: EqualizerPresetsController,
    front_panel: FrontPanelController,
    network: NetworkController,
    infrared: InfraredController,
}

impl ServerController {
    /// Creates the aggregate with factory-default models.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the zones controller.
    pub fn zones(&self) -> &ZonesController {
        &self.zones
    }

    /// Returns the groups controller.
    pub fn groups(&self) -> &GroupsController {
        &self.groups
    }

    /// Returns the sources controller.
    pub fn sources(&self) -> &SourcesController {
        &self.sources
    }

    /// Returns the favorites controller.
    pub fn favorites(&self) -> &FavoritesController {
        &self.favorites
    }

    /// Returns the front panel controller.
    pub fn front_panel(&self) -> &FrontPanelController {
        &self.front_panel
    }

    /// Registers every request kind this aggregate answers.
    pub fn register(commands: &mut CommandManager) -> ServiceResult<()> {
        let families = [
            zones::REQUEST_KINDS,
            groups::REQUEST_KINDS,
            sources::REQUEST_KINDS,
            favorites::REQUEST_KINDS,
            equalizer_presets::REQUEST_KINDS,
            front_panel::REQUEST_KINDS,
            network::REQUEST_KINDS,
            infrared::REQUEST_KINDS,
            configuration::REQUEST_KINDS,
        ];

        for kinds in families {
            for kind in kinds {
                commands.register_handler(*kind)?;
            }
        }

        Ok(())
    }

    /// Routes a matched request to its owning family.
    pub fn handle(&mut self, m: &CommandMatch) -> ControllerResult<RequestOutcome> {
        match m.kind {
            kind if zones::REQUEST_KINDS.contains(&kind) => self.zones.handle_request(m),
            kind if groups::REQUEST_KINDS.contains(&kind) => self.groups.handle_request(m),
            kind if sources::REQUEST_KINDS.contains(&kind) => self.sources.handle_request(m),
            kind if favorites::REQUEST_KINDS.contains(&kind) => self.favorites.handle_request(m),
            kind if equalizer_presets::REQUEST_KINDS.contains(&kind) => {
                self.equalizer_presets.handle_request(m)
            }
            kind if front_panel::REQUEST_KINDS.contains(&kind) => {
                self.front_panel.handle_request(m)
            }
            kind if network::REQUEST_KINDS.contains(&kind) => self.network.handle_request(m),
            kind if infrared::REQUEST_KINDS.contains(&kind) => self.infrared.handle_request(m),
            CommandKind::ConfigurationQuery => {
                let mut responses = self.dump_all()?;
                responses.push(configuration_command::query_current());
                Ok(RequestOutcome {
                    responses,
                    changes: Vec::new(),
                })
            }
            CommandKind::ConfigurationSave => Ok(RequestOutcome {
                // The saving notification precedes the completion echo,
                // as on hardware writing flash.
                responses: vec![
                    configuration_command::saving_to_backup(),
                    configuration_command::save_to_backup(),
                ],
                changes: vec![StateChange::ConfigurationSaving, StateChange::ConfigurationSaved],
            }),
            CommandKind::ConfigurationLoad => Ok(RequestOutcome {
                responses: vec![configuration_command::load_from_backup()],
                changes: vec![StateChange::ConfigurationLoaded],
            }),
            CommandKind::ConfigurationReset => {
                *self = Self::default();
                Ok(RequestOutcome {
                    responses: vec![configuration_command::reset_to_defaults()],
                    changes: vec![StateChange::ConfigurationReset],
                })
            }
            _ => Err(ProtocolError::UnknownCommand.into()),
        }
    }

    /// The full configuration dump, in the order the hardware answers
    /// the query-current command.
    pub fn dump_all(&self) -> ControllerResult<Vec<String>> {
        dump_families(
            &self.equalizer_presets,
            &self.sources,
            &self.zones,
            &self.groups,
            &self.favorites,
            &self.front_panel,
            &self.infrared,
            &self.network,
        )
    }
}

/// The cross-family dump order shared by the emulated server and the
/// proxy's mirror: equalizer presets, sources, zones, groups,
/// favorites, front panel, infrared, network.
#[allow(clippy::too_many_arguments)]
pub(crate) fn dump_families(
    equalizer_presets: &EqualizerPresetsController,
    sources: &SourcesController,
    zones: &ZonesController,
    groups: &GroupsController,
    favorites: &FavoritesController,
    front_panel: &FrontPanelController,
    infrared: &InfraredController,
    network: &NetworkController,
) -> ControllerResult<Vec<String>> {
    let mut bodies = Vec::new();

    for preset in 1..=EQUALIZER_PRESETS_MAX {
        bodies.extend(equalizer_presets.dump(preset)?);
    }
    for source in 1..=SOURCES_MAX {
        bodies.extend(sources.dump(source)?);
    }
    for zone in 1..=ZONES_MAX {
        bodies.extend(zones.dump(zone)?);
    }
    for group in 1..=GROUPS_MAX {
        bodies.extend(groups.dump(group)?);
    }
    for favorite in 1..=FAVORITES_MAX {
        bodies.extend(favorites.dump(favorite)?);
    }
    bodies.extend(front_panel.dump());
    bodies.extend(infrared.dump());
    bodies.extend(network.dump());

    Ok(bodies)
}

/// Frames a response body list into one wire buffer.
pub(crate) fn encode_responses(bodies: &[String]) -> Bytes {
    let mut buffer = BytesMut::new();
    for body in bodies {
        buffer.put_u8(frame::RESPONSE_BEGIN);
        buffer.put_slice(body.as_bytes());
        buffer.put_u8(frame::RESPONSE_END);
    }
    buffer.freeze()
}

/// The emulated-hardware service: a listening connection manager, a
/// server-role command manager, and the aggregate controller.
pub struct Server {
    manager: ConnectionManager,
    commands: CommandManager,
    controller: ServerController,
}

impl Server {
    /// Creates the service with every request handler registered.
    pub fn new(timeout: Duration) -> ControllerResult<Self> {
        let mut commands = CommandManager::server(timeout);
        ServerController::register(&mut commands)?;

        Ok(Self {
            manager: ConnectionManager::new(timeout),
            commands,
            controller: ServerController::new(),
        })
    }

    /// Returns the aggregate controller.
    pub fn controller(&self) -> &ServerController {
        &self.controller
    }

    /// Returns the connection manager.
    pub fn manager_mut(&mut self) -> &mut ConnectionManager {
        &mut self.manager
    }

    /// Binds the listening sockets.
    pub async fn listen(
        &mut self,
        target: Option<&str>,
        versions: IpVersions,
    ) -> ServiceResult<Vec<SocketAddr>> {
        self.manager.listen(target, versions).await
    }

    /// Serves until cancelled.
    pub async fn run(&mut self) {
        loop {
            self.step().await;
        }
    }

    /// Processes one service event.
    pub async fn step(&mut self) {
        match self.manager.next_event().await {
            ServiceEvent::Data { id, data } => match self.commands.ingest(id, &data) {
                Ok(items) => {
                    for item in items {
                        self.dispatch(item).await;
                    }
                }
                Err(error) => warn!(%id, %error, "dropping undecodable input"),
            },
            ServiceEvent::Disconnected { id, .. } => {
                self.commands.fail_connection(id, ServiceError::ConnectionClosed);
            }
            ServiceEvent::Established { id, .. } => {
                debug!(%id, "session established");
            }
        }
    }

    /// Stops listening and tears down every connection.
    pub async fn shutdown(&mut self) {
        self.manager.shutdown().await;
        info!("server stopped");
    }

    async fn dispatch(&mut self, item: Inbound) {
        match item {
            Inbound::Request { id, matched, .. } => match self.controller.handle(&matched) {
                Ok(outcome) => {
                    let frames = encode_responses(&outcome.responses);
                    if outcome.changes.is_empty() {
                        if let Err(error) = self.manager.send(id, frames).await {
                            warn!(%id, %error, "response send failed");
                        }
                    } else {
                        // The mutation echo doubles as the state-change
                        // notification for every other subscriber.
                        self.manager.send_all(Some(id), frames).await;
                    }
                }
                Err(error) => {
                    debug!(%id, %error, "request rejected");
                    let _ = self
                        .manager
                        .send(id, Bytes::from_static(frame::ERROR_RESPONSE))
                        .await;
                }
            },
            Inbound::Unmatched { id, frame: raw } => {
                debug!(%id, frame = ?raw, "unmatched request");
                let _ = self
                    .manager
                    .send(id, Bytes::from_static(frame::ERROR_RESPONSE))
                    .await;
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("connections", &self.manager.connection_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_protocol::match_frame;

    #[test]
    fn test_register_covers_whole_vocabulary() {
        let mut commands = CommandManager::server(Duration::from_secs(10));
        ServerController::register(&mut commands).unwrap();

        // A second registration pass collides on the first kind.
        assert!(ServerController::register(&mut commands).is_err());
    }

    #[test]
    fn test_handle_routes_across_families() {
        let mut controller = ServerController::new();

        let zone = match_frame(b"[VO3R-25]").unwrap();
        assert_eq!(controller.handle(&zone).unwrap().changes.len(), 1);

        let favorite = match_frame(b"[NF1\"Morning\"]").unwrap();
        assert_eq!(controller.handle(&favorite).unwrap().changes.len(), 1);

        let panel = match_frame(b"[FPB0]").unwrap();
        assert_eq!(controller.handle(&panel).unwrap().changes.len(), 1);
    }

    #[test]
    fn test_query_current_ends_with_echo() {
        let mut controller = ServerController::new();
        let query = match_frame(b"[QX]").unwrap();

        let outcome = controller.handle(&query).unwrap();
        assert_eq!(outcome.responses.last().unwrap(), "QX");
        assert!(outcome.changes.is_empty());
        // Ten presets, eight sources, twenty-four zones, ten groups,
        // ten favorites and the device-level families all dump.
        assert!(outcome.responses.len() > 100);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut controller = ServerController::new();

        let rename = match_frame(b"[NO7\"Kitchen\"]").unwrap();
        controller.handle(&rename).unwrap();
        assert_eq!(
            controller.zones().zone(7).unwrap().name().as_str(),
            "Kitchen"
        );

        let reset = match_frame(b"[RX]").unwrap();
        let outcome = controller.handle(&reset).unwrap();
        assert_eq!(outcome.changes, vec![StateChange::ConfigurationReset]);
        assert_eq!(controller.zones().zone(7).unwrap().name().as_str(), "ZONE 7");
    }

    #[test]
    fn test_save_emits_saving_then_saved() {
        let mut controller = ServerController::new();
        let save = match_frame(b"[SX]").unwrap();

        let outcome = controller.handle(&save).unwrap();
        assert_eq!(outcome.responses, vec!["BX".to_string(), "SX".to_string()]);
        assert_eq!(
            outcome.changes,
            vec![StateChange::ConfigurationSaving, StateChange::ConfigurationSaved]
        );
    }

    #[test]
    fn test_encode_responses() {
        let encoded = encode_responses(&["VO3R-25".to_string(), "QO3".to_string()]);
        assert_eq!(&encoded[..], b"(VO3R-25)(QO3)");
    }
}
