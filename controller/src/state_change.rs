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

//! State-change notifications.
//!
//! Every model mutation that actually changed something produces exactly
//! one of these. They are emitted to observers and, in the proxy, decide
//! whether a response fans out to every subscriber or returns only to
//! its originator.

use hlx_model::{Identifier, SoundMode};
use std::net::IpAddr;

/// A state-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// A zone's volume level changed.
    ZoneVolume {
        /// The zone.
        zone: Identifier,
        /// The new level in dB.
        level: i8,
    },
    /// A zone's volume fixed (locked) flag changed.
    ZoneVolumeFixed {
        /// The zone.
        zone: Identifier,
        /// The new flag.
        fixed: bool,
    },
    /// A zone's mute flag changed.
    ZoneMute {
        /// The zone.
        zone: Identifier,
        /// The new flag.
        muted: bool,
    },
    /// A zone was renamed.
    ZoneName {
        /// The zone.
        zone: Identifier,
        /// The new name.
        name: String,
    },
    /// A zone's source selection changed.
    ZoneSource {
        /// The zone.
        zone: Identifier,
        /// The newly selected source.
        source: Identifier,
    },
    /// A zone's stereo balance changed.
    ZoneBalance {
        /// The zone.
        zone: Identifier,
        /// The new signed balance; negative leans left.
        balance: i8,
    },
    /// A zone's tone levels changed.
    ZoneTone {
        /// The zone.
        zone: Identifier,
        /// The new bass level.
        bass: i8,
        /// The new treble level.
        treble: i8,
    },
    /// A zone's sound mode changed.
    ZoneSoundMode {
        /// The zone.
        zone: Identifier,
        /// The new mode.
        mode: SoundMode,
    },
    /// A zone equalizer band level changed.
    ZoneEqualizerBand {
        /// The zone.
        zone: Identifier,
        /// The band.
        band: Identifier,
        /// The new level.
        level: i8,
    },
    /// A zone's equalizer preset selection changed.
    ZoneEqualizerPreset {
        /// The zone.
        zone: Identifier,
        /// The newly selected preset.
        preset: Identifier,
    },
    /// A zone's highpass crossover frequency changed.
    ZoneHighpass {
        /// The zone.
        zone: Identifier,
        /// The new frequency in Hz.
        frequency: u16,
    },
    /// A zone's lowpass crossover frequency changed.
    ZoneLowpass {
        /// The zone.
        zone: Identifier,
        /// The new frequency in Hz.
        frequency: u16,
    },
    /// A group was renamed.
    GroupName {
        /// The group.
        group: Identifier,
        /// The new name.
        name: String,
    },
    /// A zone joined a group.
    GroupZoneAdded {
        /// The group.
        group: Identifier,
        /// The zone that joined.
        zone: Identifier,
    },
    /// A zone left a group.
    GroupZoneRemoved {
        /// The group.
        group: Identifier,
        /// The zone that left.
        zone: Identifier,
    },
    /// A group's source routing changed.
    GroupSource {
        /// The group.
        group: Identifier,
        /// The newly routed source.
        source: Identifier,
    },
    /// A source was renamed.
    SourceName {
        /// The source.
        source: Identifier,
        /// The new name.
        name: String,
    },
    /// A favorite was renamed.
    FavoriteName {
        /// The favorite.
        favorite: Identifier,
        /// The new name.
        name: String,
    },
    /// An equalizer preset was renamed.
    EqualizerPresetName {
        /// The preset.
        preset: Identifier,
        /// The new name.
        name: String,
    },
    /// An equalizer preset band level changed.
    EqualizerPresetBand {
        /// The preset.
        preset: Identifier,
        /// The band.
        band: Identifier,
        /// The new level.
        level: i8,
    },
    /// The front panel brightness changed.
    FrontPanelBrightness {
        /// The new brightness.
        brightness: u8,
    },
    /// The front panel lock flag changed.
    FrontPanelLocked {
        /// The new flag.
        locked: bool,
    },
    /// The DHCPv4-enabled flag changed.
    NetworkDhcp {
        /// The new flag.
        enabled: bool,
    },
    /// The Control4 SDDP-enabled flag changed.
    NetworkSddp {
        /// The new flag.
        enabled: bool,
    },
    /// The reported EUI-48 changed.
    NetworkMac {
        /// The new EUI-48.
        mac: [u8; 6],
    },
    /// The reported host address changed.
    NetworkAddress {
        /// The new address.
        address: IpAddr,
    },
    /// The reported netmask changed.
    NetworkNetmask {
        /// The new netmask.
        netmask: IpAddr,
    },
    /// The reported default router changed.
    NetworkRouter {
        /// The new router.
        router: IpAddr,
    },
    /// The infrared receiver's disabled flag changed.
    InfraredDisabled {
        /// The new flag.
        disabled: bool,
    },
    /// The peer began writing its configuration to backup.
    ConfigurationSaving,
    /// The peer finished writing its configuration to backup.
    ConfigurationSaved,
    /// The peer loaded its configuration from backup.
    ConfigurationLoaded,
    /// The peer reset its configuration to factory defaults.
    ConfigurationReset,
}
