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

//! The top-level client controller.
//!
//! Aggregates every family controller over one upstream connection,
//! mirrors the peer's state, and drives the multi-stage refresh
//! protocol: each family is refreshed in the order the hardware answers
//! the query-current command, a progress event fires at each family
//! completion, and `DidRefresh` fires when every family has completed.
//! Any failure aborts the refresh and surfaces as an error event.
//!
//! All state is confined to the task that owns the `Controller`;
//! lifecycle, progress and state-change notifications are drained as a
//! sum type through [`Controller::next_event`].

use crate::{
    ConfigurationController, ControllerError, ControllerResult, EqualizerPresetsController,
    FavoritesController, FrontPanelController, GroupsController, InfraredController,
    NetworkController, SourcesController, StateChange, ZonesController, configuration,
    equalizer_presets, favorites, front_panel, groups, infrared, network,
    server::dump_families, sources, zones,
};
use hlx_model::{Change, Identifier, SoundMode};
use hlx_protocol::command::{
    configuration as configuration_command, equalizer_presets as equalizer_presets_command,
    favorites as favorites_command, front_panel as front_panel_command,
    groups as groups_command, infrared as infrared_command, network as network_command,
    sources as sources_command, zones as zones_command,
};
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError, frame};
use hlx_service::{
    CommandManager, ConnectionId, ConnectionManager, Inbound, IpVersions, ServiceError,
    ServiceEvent,
};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Events the controller surfaces to its observer.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// An upstream dial is starting.
    WillConnect,
    /// The transport is up; the banner handshake is in progress.
    IsConnecting,
    /// The upstream session is usable.
    DidConnect,
    /// Dialing or the handshake failed.
    DidNotConnect {
        /// Why.
        error: ServiceError,
    },
    /// An upstream teardown is starting.
    WillDisconnect,
    /// The upstream session ended. `error` is `None` for a graceful
    /// close.
    DidDisconnect {
        /// The terminal error, if any.
        error: Option<ServiceError>,
    },
    /// A refresh family completed; `percent` is in `(0, 100]`.
    IsRefreshing {
        /// Completed share of the refresh.
        percent: u8,
    },
    /// Every refresh family completed.
    DidRefresh,
    /// A model mutation actually changed state.
    StateChanged(StateChange),
    /// A controller-level failure surfaced outside any pending call.
    Error(ControllerError),
}

/// The client-role controller stack; see the module docs.
pub struct Controller {
    manager: ConnectionManager,
    commands: CommandManager,
    upstream: Option<ConnectionId>,
    zones: ZonesController,
    groups: GroupsController,
    sources: SourcesController,
    favorites: FavoritesController,
    equalizer_presets: EqualizerPresetsController,
    front_panel: FrontPanelController,
    network: NetworkController,
    infrared: InfraredController,
    configuration: ConfigurationController,
    pending: VecDeque<ControllerEvent>,
    refreshing: bool,
}

impl Controller {
    /// Creates the controller stack. `timeout` governs both the banner
    /// handshake and every exchange.
    pub fn new(timeout: Duration) -> ControllerResult<Self> {
        let mut commands = CommandManager::client(timeout);

        let families = [
            zones::NOTIFICATION_KINDS,
            groups::NOTIFICATION_KINDS,
            sources::NOTIFICATION_KINDS,
            favorites::NOTIFICATION_KINDS,
            equalizer_presets::NOTIFICATION_KINDS,
            front_panel::NOTIFICATION_KINDS,
            network::NOTIFICATION_KINDS,
            infrared::NOTIFICATION_KINDS,
            configuration::NOTIFICATION_KINDS,
        ];
        for kinds in families {
            for kind in kinds {
                commands.register_handler(*kind)?;
            }
        }

        Ok(Self {
            manager: ConnectionManager::new(timeout),
            commands,
            upstream: None,
            zones: ZonesController::new(),
            groups: GroupsController::new(),
            sources: SourcesController::new(),
            favorites: FavoritesController::new(),
            equalizer_presets: EqualizerPresetsController::new(),
            front_panel: FrontPanelController::new(),
            network: NetworkController::new(),
            infrared: InfraredController::new(),
            configuration: ConfigurationController::new(),
            pending: VecDeque::new(),
            refreshing: false,
        })
    }

    /// Returns whether the upstream session is usable.
    pub fn is_connected(&self) -> bool {
        self.upstream.is_some()
    }

    /// Returns whether a refresh is in progress.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Returns the zones mirror.
    pub fn zones(&self) -> &ZonesController {
        &self.zones
    }

    /// Returns the groups mirror.
    pub fn groups(&self) -> &GroupsController {
        &self.groups
    }

    /// Returns the sources mirror.
    pub fn sources(&self) -> &SourcesController {
        &self.sources
    }

    /// Returns the favorites mirror.
    pub fn favorites(&self) -> &FavoritesController {
        &self.favorites
    }

    /// Returns the equalizer presets mirror.
    pub fn equalizer_presets(&self) -> &EqualizerPresetsController {
        &self.equalizer_presets
    }

    /// Returns the front panel mirror.
    pub fn front_panel(&self) -> &FrontPanelController {
        &self.front_panel
    }

    /// Returns the network mirror.
    pub fn network(&self) -> &NetworkController {
        &self.network
    }

    /// Returns the infrared mirror.
    pub fn infrared(&self) -> &InfraredController {
        &self.infrared
    }

    /// Dials the upstream peer and completes the banner handshake.
    /// Connecting while connected is a quiet no-op.
    pub async fn connect(
        &mut self,
        target: &str,
        versions: IpVersions,
        timeout: Duration,
    ) -> ControllerResult<Change> {
        if self.upstream.is_some() {
            return Ok(Change::Unchanged);
        }

        self.pending.push_back(ControllerEvent::WillConnect);

        let id = match self.manager.connect(target, versions, timeout).await {
            Ok(id) => id,
            Err(error) => {
                self.pending.push_back(ControllerEvent::DidNotConnect {
                    error: error.clone(),
                });
                return Err(error.into());
            }
        };

        self.pending.push_back(ControllerEvent::IsConnecting);

        loop {
            match self.manager.next_event().await {
                ServiceEvent::Established { id: established, .. } if established == id => break,
                ServiceEvent::Disconnected { id: ended, error } if ended == id => {
                    let error = error.unwrap_or(ServiceError::ConnectionReset);
                    self.pending.push_back(ControllerEvent::DidNotConnect {
                        error: error.clone(),
                    });
                    return Err(error.into());
                }
                other => self.absorb(other)?,
            }
        }

        self.upstream = Some(id);
        self.pending.push_back(ControllerEvent::DidConnect);

        Ok(Change::Changed)
    }

    /// Gracefully tears down the upstream session. Disconnecting while
    /// already disconnected is a quiet no-op.
    pub async fn disconnect(&mut self) -> ControllerResult<Change> {
        let Some(id) = self.upstream else {
            return Ok(Change::Unchanged);
        };

        self.pending.push_back(ControllerEvent::WillDisconnect);
        self.manager.disconnect(id).await?;

        loop {
            let event = self.manager.next_event().await;
            if let ServiceEvent::Disconnected { id: ended, .. } = &event
                && *ended == id
            {
                self.absorb(event)?;
                return Ok(Change::Changed);
            }
            self.absorb(event)?;
        }
    }

    /// Waits for the next controller event, pumping the connection in
    /// the meantime.
    pub async fn next_event(&mut self) -> ControllerEvent {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }

            let deadline = self.commands.next_deadline();
            tokio::select! {
                event = self.manager.next_event() => {
                    if let Err(error) = self.absorb(event) {
                        return ControllerEvent::Error(error);
                    }
                }
                _ = sleep_until_some(deadline), if deadline.is_some() => {
                    self.commands.expire(Instant::now());
                }
            }
        }
    }

    /// Runs the multi-stage refresh: every family in hardware answer
    /// order, a progress event per family, `DidRefresh` at the end.
    pub async fn refresh(&mut self) -> ControllerResult<()> {
        if self.refreshing {
            return Err(ControllerError::RefreshInProgress);
        }
        if self.upstream.is_none() {
            return Err(ControllerError::NotConnected);
        }

        self.refreshing = true;
        let result = self.run_refresh().await;
        self.refreshing = false;

        if let Err(error) = &result {
            self.pending
                .push_back(ControllerEvent::Error(error.clone()));
        }

        result
    }

    async fn run_refresh(&mut self) -> ControllerResult<()> {
        let stages = [
            EqualizerPresetsController::refresh_queries(),
            SourcesController::refresh_queries(),
            ZonesController::refresh_queries(),
            GroupsController::refresh_queries(),
            FavoritesController::refresh_queries(),
            FrontPanelController::refresh_queries(),
            InfraredController::refresh_queries(),
            NetworkController::refresh_queries(),
        ];
        let total = stages.len();

        for (index, stage) in stages.into_iter().enumerate() {
            for (body, response) in stage {
                let matched = self.transact(&body, response).await?;
                self.apply_match(&matched)?;
            }

            let percent = (((index + 1) * 100) / total) as u8;
            self.pending
                .push_back(ControllerEvent::IsRefreshing { percent });
        }

        self.pending.push_back(ControllerEvent::DidRefresh);
        Ok(())
    }

    /// Forwards a raw request body upstream and applies the response to
    /// the mirror. Returns the matched response and the state changes
    /// it caused - the proxy's fan-out decision. The changes are handed
    /// back rather than queued as events; the caller is the observer.
    pub async fn forward(
        &mut self,
        body: &str,
        response: CommandKind,
    ) -> ControllerResult<(CommandMatch, Vec<StateChange>)> {
        let matched = self.transact(body, response).await?;
        let changes = self.apply_quiet(&matched)?;
        Ok((matched, changes))
    }

    /// Answers a query request from the mirror, the caching-proxy path.
    /// The front-panel locked query reproduces the hardware's missing
    /// echo.
    pub fn answer_query(&self, m: &CommandMatch) -> ControllerResult<Vec<String>> {
        match m.kind {
            CommandKind::ZoneQuery => {
                let zone = m.identifier(1)?;
                let mut bodies = self.zones.dump(zone)?;
                bodies.push(zones_command::query(zone));
                Ok(bodies)
            }
            CommandKind::GroupQuery => {
                let group = m.identifier(1)?;
                let mut bodies = self.groups.dump(group)?;
                bodies.push(groups_command::query(group));
                Ok(bodies)
            }
            CommandKind::SourceQuery => {
                let source = m.identifier(1)?;
                let mut bodies = self.sources.dump(source)?;
                bodies.push(sources_command::query(source));
                Ok(bodies)
            }
            CommandKind::FavoriteQuery => {
                let favorite = m.identifier(1)?;
                let mut bodies = self.favorites.dump(favorite)?;
                bodies.push(favorites_command::query(favorite));
                Ok(bodies)
            }
            CommandKind::EqualizerPresetQuery => {
                let preset = m.identifier(1)?;
                let mut bodies = self.equalizer_presets.dump(preset)?;
                bodies.push(equalizer_presets_command::query(preset));
                Ok(bodies)
            }
            CommandKind::FrontPanelQueryBrightness => Ok(vec![
                front_panel_command::brightness(self.front_panel.panel().brightness()),
                front_panel_command::query_brightness(),
            ]),
            CommandKind::FrontPanelQueryLocked => Ok(vec![front_panel_command::locked(
                self.front_panel.panel().is_locked(),
            )]),
            CommandKind::NetworkQuery => {
                let mut bodies = self.network.dump();
                bodies.push(network_command::query());
                Ok(bodies)
            }
            CommandKind::InfraredQuery => {
                let mut bodies = self.infrared.dump();
                bodies.push(infrared_command::query());
                Ok(bodies)
            }
            CommandKind::ConfigurationQuery => {
                let mut bodies = dump_families(
                    &self.equalizer_presets,
                    &self.sources,
                    &self.zones,
                    &self.groups,
                    &self.favorites,
                    &self.front_panel,
                    &self.infrared,
                    &self.network,
                )?;
                bodies.push(configuration_command::query_current());
                Ok(bodies)
            }
            _ => Err(ProtocolError::UnknownCommand.into()),
        }
    }

    // Zone mutators.

    /// Sets a zone's volume level.
    pub async fn set_zone_volume(&mut self, zone: Identifier, level: i8) -> ControllerResult<()> {
        self.mutate(zones_command::volume(zone, level), CommandKind::ZoneVolume)
            .await
    }

    /// Raises a zone's volume one step. Fails locally at the maximum.
    pub async fn increase_zone_volume(&mut self, zone: Identifier) -> ControllerResult<()> {
        let mut probe = *self.zones.zone(zone)?.volume();
        let target = probe.increase_level()?;
        self.set_zone_volume(zone, target).await
    }

    /// Lowers a zone's volume one step. Fails locally at the minimum.
    pub async fn decrease_zone_volume(&mut self, zone: Identifier) -> ControllerResult<()> {
        let mut probe = *self.zones.zone(zone)?.volume();
        let target = probe.decrease_level()?;
        self.set_zone_volume(zone, target).await
    }

    /// Sets every zone's volume level.
    pub async fn set_all_zones_volume(&mut self, level: i8) -> ControllerResult<()> {
        self.mutate(zones_command::volume_all(level), CommandKind::ZoneVolumeAll)
            .await
    }

    /// Sets a zone's volume fixed (locked) flag.
    pub async fn set_zone_volume_fixed(
        &mut self,
        zone: Identifier,
        fixed: bool,
    ) -> ControllerResult<()> {
        self.mutate(
            zones_command::volume_fixed(zone, fixed),
            CommandKind::ZoneVolumeFixed,
        )
        .await
    }

    /// Sets a zone's mute flag.
    pub async fn set_zone_mute(&mut self, zone: Identifier, muted: bool) -> ControllerResult<()> {
        self.mutate(zones_command::mute(zone, muted), CommandKind::ZoneMute)
            .await
    }

    /// Toggles a zone's mute flag; the response carries the new state.
    pub async fn toggle_zone_mute(&mut self, zone: Identifier) -> ControllerResult<()> {
        self.mutate(zones_command::toggle_mute(zone), CommandKind::ZoneMute)
            .await
    }

    /// Renames a zone.
    pub async fn set_zone_name(&mut self, zone: Identifier, name: &str) -> ControllerResult<()> {
        self.mutate(zones_command::name(zone, name), CommandKind::ZoneName)
            .await
    }

    /// Selects a zone's source.
    pub async fn set_zone_source(
        &mut self,
        zone: Identifier,
        source: Identifier,
    ) -> ControllerResult<()> {
        self.mutate(zones_command::source(zone, source), CommandKind::ZoneSource)
            .await
    }

    /// Selects every zone's source.
    pub async fn set_all_zones_source(&mut self, source: Identifier) -> ControllerResult<()> {
        self.mutate(
            zones_command::source_all(source),
            CommandKind::ZoneSourceAll,
        )
        .await
    }

    /// Sets a zone's stereo balance.
    pub async fn set_zone_balance(&mut self, zone: Identifier, balance: i8) -> ControllerResult<()> {
        self.mutate(
            zones_command::balance(zone, balance),
            CommandKind::ZoneBalance,
        )
        .await
    }

    /// Sets a zone's bass and treble levels.
    pub async fn set_zone_tone(
        &mut self,
        zone: Identifier,
        bass: i8,
        treble: i8,
    ) -> ControllerResult<()> {
        self.mutate(
            zones_command::tone(zone, bass, treble),
            CommandKind::ZoneTone,
        )
        .await
    }

    /// Sets a zone's sound mode.
    pub async fn set_zone_sound_mode(
        &mut self,
        zone: Identifier,
        mode: SoundMode,
    ) -> ControllerResult<()> {
        self.mutate(
            zones_command::sound_mode(zone, mode.to_wire()),
            CommandKind::ZoneSoundMode,
        )
        .await
    }

    /// Sets a zone equalizer band level.
    pub async fn set_zone_equalizer_band(
        &mut self,
        zone: Identifier,
        band: Identifier,
        level: i8,
    ) -> ControllerResult<()> {
        self.mutate(
            zones_command::equalizer_band_level(zone, band, level),
            CommandKind::ZoneEqualizerBandLevel,
        )
        .await
    }

    /// Selects a zone's equalizer preset.
    pub async fn set_zone_equalizer_preset(
        &mut self,
        zone: Identifier,
        preset: Identifier,
    ) -> ControllerResult<()> {
        self.mutate(
            zones_command::equalizer_preset(zone, preset),
            CommandKind::ZoneEqualizerPreset,
        )
        .await
    }

    /// Sets a zone's highpass crossover frequency.
    pub async fn set_zone_highpass(
        &mut self,
        zone: Identifier,
        frequency: u16,
    ) -> ControllerResult<()> {
        self.mutate(
            zones_command::highpass(zone, frequency),
            CommandKind::ZoneHighpass,
        )
        .await
    }

    /// Sets a zone's lowpass crossover frequency.
    pub async fn set_zone_lowpass(
        &mut self,
        zone: Identifier,
        frequency: u16,
    ) -> ControllerResult<()> {
        self.mutate(
            zones_command::lowpass(zone, frequency),
            CommandKind::ZoneLowpass,
        )
        .await
    }

    // Group mutators.

    /// Renames a group.
    pub async fn set_group_name(&mut self, group: Identifier, name: &str) -> ControllerResult<()> {
        self.mutate(groups_command::name(group, name), CommandKind::GroupName)
            .await
    }

    /// Adds a zone to a group.
    pub async fn add_group_zone(
        &mut self,
        group: Identifier,
        zone: Identifier,
    ) -> ControllerResult<()> {
        self.mutate(
            groups_command::add_zone(group, zone),
            CommandKind::GroupAddZone,
        )
        .await
    }

    /// Removes a zone from a group.
    pub async fn remove_group_zone(
        &mut self,
        group: Identifier,
        zone: Identifier,
    ) -> ControllerResult<()> {
        self.mutate(
            groups_command::remove_zone(group, zone),
            CommandKind::GroupRemoveZone,
        )
        .await
    }

    /// Routes a source to a group.
    pub async fn set_group_source(
        &mut self,
        group: Identifier,
        source: Identifier,
    ) -> ControllerResult<()> {
        self.mutate(
            groups_command::source(group, source),
            CommandKind::GroupSource,
        )
        .await
    }

    // Remaining family mutators.

    /// Renames a source.
    pub async fn set_source_name(
        &mut self,
        source: Identifier,
        name: &str,
    ) -> ControllerResult<()> {
        self.mutate(sources_command::name(source, name), CommandKind::SourceName)
            .await
    }

    /// Renames a favorite.
    pub async fn set_favorite_name(
        &mut self,
        favorite: Identifier,
        name: &str,
    ) -> ControllerResult<()> {
        self.mutate(
            favorites_command::name(favorite, name),
            CommandKind::FavoriteName,
        )
        .await
    }

    /// Renames an equalizer preset.
    pub async fn set_equalizer_preset_name(
        &mut self,
        preset: Identifier,
        name: &str,
    ) -> ControllerResult<()> {
        self.mutate(
            equalizer_presets_command::name(preset, name),
            CommandKind::EqualizerPresetName,
        )
        .await
    }

    /// Sets an equalizer preset band level.
    pub async fn set_equalizer_preset_band(
        &mut self,
        preset: Identifier,
        band: Identifier,
        level: i8,
    ) -> ControllerResult<()> {
        self.mutate(
            equalizer_presets_command::band_level(preset, band, level),
            CommandKind::EqualizerPresetBandLevel,
        )
        .await
    }

    /// Sets the front panel brightness.
    pub async fn set_front_panel_brightness(&mut self, brightness: u8) -> ControllerResult<()> {
        self.mutate(
            front_panel_command::brightness(brightness),
            CommandKind::FrontPanelBrightness,
        )
        .await
    }

    /// Sets the front panel lock flag.
    pub async fn set_front_panel_locked(&mut self, locked: bool) -> ControllerResult<()> {
        self.mutate(
            front_panel_command::locked(locked),
            CommandKind::FrontPanelLocked,
        )
        .await
    }

    /// Sets the DHCPv4-enabled flag.
    pub async fn set_network_dhcp(&mut self, enabled: bool) -> ControllerResult<()> {
        self.mutate(network_command::dhcp(enabled), CommandKind::NetworkDhcp)
            .await
    }

    /// Sets the Control4 SDDP-enabled flag.
    pub async fn set_network_sddp(&mut self, enabled: bool) -> ControllerResult<()> {
        self.mutate(network_command::sddp(enabled), CommandKind::NetworkSddp)
            .await
    }

    /// Sets the infrared receiver's disabled flag.
    pub async fn set_infrared_disabled(&mut self, disabled: bool) -> ControllerResult<()> {
        self.mutate(
            infrared_command::disabled(disabled),
            CommandKind::InfraredDisabled,
        )
        .await
    }

    // Configuration operations.

    /// Asks the peer to save its configuration to backup.
    pub async fn save_configuration(&mut self) -> ControllerResult<()> {
        self.mutate(
            configuration_command::save_to_backup(),
            CommandKind::ConfigurationSave,
        )
        .await
    }

    /// Asks the peer to load its configuration from backup.
    pub async fn load_configuration(&mut self) -> ControllerResult<()> {
        self.mutate(
            configuration_command::load_from_backup(),
            CommandKind::ConfigurationLoad,
        )
        .await
    }

    /// Asks the peer to reset its configuration to factory defaults.
    pub async fn reset_configuration(&mut self) -> ControllerResult<()> {
        self.mutate(
            configuration_command::reset_to_defaults(),
            CommandKind::ConfigurationReset,
        )
        .await
    }

    /// Asks the peer for its full configuration; the dump applies to
    /// the mirror as it streams in.
    pub async fn query_current_configuration(&mut self) -> ControllerResult<()> {
        let matched = self
            .transact(
                &configuration_command::query_current(),
                CommandKind::ConfigurationQuery,
            )
            .await?;
        self.apply_match(&matched)?;
        Ok(())
    }

    async fn mutate(&mut self, body: String, response: CommandKind) -> ControllerResult<()> {
        let matched = self.transact(&body, response).await?;
        self.apply_match(&matched)?;
        Ok(())
    }

    async fn transact(
        &mut self,
        body: &str,
        response: CommandKind,
    ) -> ControllerResult<CommandMatch> {
        let id = self.upstream.ok_or(ControllerError::NotConnected)?;

        let mut reply = self.commands.submit_exchange(id, response);
        self.manager.send(id, frame::request(body)).await?;
        trace!(body, ?response, "request sent");

        loop {
            let deadline = self.commands.next_deadline();
            tokio::select! {
                completed = &mut reply => {
                    return match completed {
                        Ok(Ok(matched)) => Ok(matched),
                        Ok(Err(error)) => Err(error.into()),
                        Err(_) => Err(ControllerError::ExchangeAbandoned),
                    };
                }
                event = self.manager.next_event() => {
                    self.absorb(event)?;
                }
                _ = sleep_until_some(deadline), if deadline.is_some() => {
                    self.commands.expire(Instant::now());
                }
            }
        }
    }

    fn absorb(&mut self, event: ServiceEvent) -> ControllerResult<()> {
        match event {
            ServiceEvent::Data { id, data } => {
                let items = self.commands.ingest(id, &data)?;
                for item in items {
                    match item {
                        Inbound::Notification { matched, .. } => {
                            self.apply_match(&matched)?;
                        }
                        Inbound::Unmatched { frame: raw, .. } => {
                            debug!(frame = ?raw, "unmatched inbound frame");
                        }
                        _ => {}
                    }
                }
            }
            ServiceEvent::Established { .. } => {}
            ServiceEvent::Disconnected { id, error } => {
                self.commands
                    .fail_connection(id, ServiceError::ConnectionClosed);
                if self.upstream == Some(id) {
                    self.upstream = None;
                    self.pending
                        .push_back(ControllerEvent::DidDisconnect { error });
                }
            }
        }
        Ok(())
    }

    fn apply_match(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = self.apply_quiet(m)?;

        for change in &changes {
            self.pending
                .push_back(ControllerEvent::StateChanged(change.clone()));
        }

        Ok(changes)
    }

    fn apply_quiet(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            kind if zones::NOTIFICATION_KINDS.contains(&kind) => self.zones.apply(m)?,
            kind if groups::NOTIFICATION_KINDS.contains(&kind) => self.groups.apply(m)?,
            kind if sources::NOTIFICATION_KINDS.contains(&kind) => self.sources.apply(m)?,
            kind if favorites::NOTIFICATION_KINDS.contains(&kind) => self.favorites.apply(m)?,
            kind if equalizer_presets::NOTIFICATION_KINDS.contains(&kind) => {
                self.equalizer_presets.apply(m)?
            }
            kind if front_panel::NOTIFICATION_KINDS.contains(&kind) => {
                self.front_panel.apply(m)?
            }
            kind if network::NOTIFICATION_KINDS.contains(&kind) => self.network.apply(m)?,
            kind if infrared::NOTIFICATION_KINDS.contains(&kind) => self.infrared.apply(m)?,
            CommandKind::ConfigurationSaving
            | CommandKind::ConfigurationSave
            | CommandKind::ConfigurationLoad
            | CommandKind::ConfigurationReset => self.configuration.apply(m)?,
            _ => Vec::new(),
        };

        Ok(changes)
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        // The arm is disabled by its guard; never polled.
        None => std::future::pending().await,
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("upstream", &self.upstream)
            .field("refreshing", &self.refreshing)
            .field("pending_events", &self.pending.len())
            .finish()
    }
}
