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

//! The zones controller.

use crate::{ControllerResult, RequestOutcome, StateChange, parse};
use hlx_model::{EntityCollection, Identifier, ModelResult, ZONES_MAX, ZoneModel};
use hlx_protocol::command::zones;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError};

/// Notification and response kinds that mutate zone state.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[
    CommandKind::ZoneBalance,
    CommandKind::ZoneEqualizerBandLevel,
    CommandKind::ZoneHighpass,
    CommandKind::ZoneLowpass,
    CommandKind::ZoneEqualizerPreset,
    CommandKind::ZoneSoundMode,
    CommandKind::ZoneMute,
    CommandKind::ZoneName,
    CommandKind::ZoneSource,
    CommandKind::ZoneSourceAll,
    CommandKind::ZoneTone,
    CommandKind::ZoneVolume,
    CommandKind::ZoneVolumeAll,
    CommandKind::ZoneVolumeFixed,
];

/// Request kinds a server answers for this family.
pub const REQUEST_KINDS: &[CommandKind] = &[
    CommandKind::ZoneBalance,
    CommandKind::ZoneEqualizerBandLevel,
    CommandKind::ZoneHighpass,
    CommandKind::ZoneLowpass,
    CommandKind::ZoneEqualizerPreset,
    CommandKind::ZoneSoundMode,
    CommandKind::ZoneToggleMute,
    CommandKind::ZoneMute,
    CommandKind::ZoneName,
    CommandKind::ZoneQuery,
    CommandKind::ZoneSource,
    CommandKind::ZoneSourceAll,
    CommandKind::ZoneTone,
    CommandKind::ZoneVolume,
    CommandKind::ZoneVolumeAll,
    CommandKind::ZoneVolumeFixed,
];

/// Owns the zone models and translates between wire captures and typed
/// mutations.
#[derive(Debug)]
pub struct ZonesController {
    zones: EntityCollection<ZoneModel>,
}

impl Default for ZonesController {
    fn default() -> Self {
        Self::new()
    }
}

impl ZonesController {
    /// Creates the controller with default-initialized zones.
    pub fn new() -> Self {
        Self {
            zones: EntityCollection::new(ZONES_MAX, ZoneModel::new),
        }
    }

    /// Returns the zone for `identifier`.
    pub fn zone(&self, identifier: Identifier) -> ModelResult<&ZoneModel> {
        self.zones.get(identifier)
    }

    /// Returns the zone for `identifier`, mutably.
    pub fn zone_mut(&mut self, identifier: Identifier) -> ModelResult<&mut ZoneModel> {
        self.zones.get_mut(identifier)
    }

    /// Applies a matched notification or response to the model,
    /// returning the state changes actually produced.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::ZoneBalance => {
                let (zone, balance) = parse::balance(m)?;
                self.zones
                    .get_mut(zone)?
                    .balance_mut()
                    .set_balance(balance)?
                    .is_changed()
                    .then_some(StateChange::ZoneBalance { zone, balance })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneEqualizerBandLevel => {
                let (zone, band, level) = parse::band_level(m)?;
                self.zones
                    .get_mut(zone)?
                    .sound_mut()
                    .bands_mut()
                    .band_mut(band)?
                    .set_level(level)?
                    .is_changed()
                    .then_some(StateChange::ZoneEqualizerBand { zone, band, level })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneHighpass => {
                let (zone, frequency) = parse::id_frequency(m)?;
                self.zones
                    .get_mut(zone)?
                    .sound_mut()
                    .highpass_mut()
                    .set_frequency(frequency)?
                    .is_changed()
                    .then_some(StateChange::ZoneHighpass { zone, frequency })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneLowpass => {
                let (zone, frequency) = parse::id_frequency(m)?;
                self.zones
                    .get_mut(zone)?
                    .sound_mut()
                    .lowpass_mut()
                    .set_frequency(frequency)?
                    .is_changed()
                    .then_some(StateChange::ZoneLowpass { zone, frequency })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneEqualizerPreset => {
                let (zone, preset) = parse::id_pair(m)?;
                self.zones
                    .get_mut(zone)?
                    .sound_mut()
                    .set_preset(preset, hlx_model::EQUALIZER_PRESETS_MAX)?
                    .is_changed()
                    .then_some(StateChange::ZoneEqualizerPreset { zone, preset })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneSoundMode => {
                let (zone, mode) = parse::sound_mode(m)?;
                self.zones
                    .get_mut(zone)?
                    .sound_mut()
                    .set_mode(mode)
                    .is_changed()
                    .then_some(StateChange::ZoneSoundMode { zone, mode })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneMute => {
                let (zone, muted) = parse::mute(m)?;
                self.zones
                    .get_mut(zone)?
                    .volume_mut()
                    .set_muted(muted)
                    .is_changed()
                    .then_some(StateChange::ZoneMute { zone, muted })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneName => {
                let (zone, name) = parse::named(m)?;
                self.zones
                    .get_mut(zone)?
                    .set_name(&name)?
                    .is_changed()
                    .then_some(StateChange::ZoneName { zone, name })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneSource => {
                let (zone, source) = parse::id_pair(m)?;
                self.zones
                    .get_mut(zone)?
                    .set_source(source)?
                    .is_changed()
                    .then_some(StateChange::ZoneSource { zone, source })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneSourceAll => {
                let source = parse::single_id(m)?;
                let mut changes = Vec::new();
                for (zone, model) in self.zones.iter_mut() {
                    if model.set_source(source)?.is_changed() {
                        changes.push(StateChange::ZoneSource { zone, source });
                    }
                }
                changes
            }
            CommandKind::ZoneTone => {
                let (zone, bass, treble) = parse::tone(m)?;
                self.zones
                    .get_mut(zone)?
                    .sound_mut()
                    .tone_mut()
                    .set_tone(bass, treble)?
                    .is_changed()
                    .then_some(StateChange::ZoneTone { zone, bass, treble })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneVolume => {
                let (zone, level) = parse::id_level(m)?;
                self.zones
                    .get_mut(zone)?
                    .volume_mut()
                    .set_level(level)?
                    .is_changed()
                    .then_some(StateChange::ZoneVolume { zone, level })
                    .into_iter()
                    .collect()
            }
            CommandKind::ZoneVolumeAll => {
                let level = parse::level(m)?;
                let mut changes = Vec::new();
                for (zone, model) in self.zones.iter_mut() {
                    if model.volume_mut().set_level(level)?.is_changed() {
                        changes.push(StateChange::ZoneVolume { zone, level });
                    }
                }
                changes
            }
            CommandKind::ZoneVolumeFixed => {
                let (zone, fixed) = parse::id_flag(m)?;
                self.zones
                    .get_mut(zone)?
                    .volume_mut()
                    .set_fixed(fixed)
                    .is_changed()
                    .then_some(StateChange::ZoneVolumeFixed { zone, fixed })
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        };

        Ok(changes)
    }

    /// Handles a matched request on the server side.
    pub fn handle_request(&mut self, m: &CommandMatch) -> ControllerResult<RequestOutcome> {
        match m.kind {
            CommandKind::ZoneQuery => {
                let zone = parse::single_id(m)?;
                let mut responses = self.dump(zone)?;
                responses.push(zones::query(zone));
                Ok(RequestOutcome {
                    responses,
                    changes: Vec::new(),
                })
            }
            CommandKind::ZoneToggleMute => {
                let zone = parse::single_id(m)?;
                let muted = self.zones.get_mut(zone)?.volume_mut().toggle_muted();
                Ok(RequestOutcome {
                    responses: vec![zones::mute(zone, muted)],
                    changes: vec![StateChange::ZoneMute { zone, muted }],
                })
            }
            kind if REQUEST_KINDS.contains(&kind) => {
                let changes = self.apply(m)?;
                Ok(RequestOutcome {
                    responses: vec![m.capture(0)?.to_string()],
                    changes,
                })
            }
            _ => Err(ProtocolError::UnknownCommand.into()),
        }
    }

    /// The per-identifier queries a refresh issues, with the response
    /// kind each exchange completes on.
    pub fn refresh_queries() -> Vec<(String, CommandKind)> {
        (1..=ZONES_MAX)
            .map(|zone| (zones::query(zone), CommandKind::ZoneQuery))
            .collect()
    }

    /// The full property dump for one zone, in wire order.
    pub fn dump(&self, zone: Identifier) -> ControllerResult<Vec<String>> {
        let model = self.zones.get(zone)?;
        let sound = model.sound();

        let mut bodies = vec![
            zones::name(zone, model.name().as_str()),
            zones::source(zone, model.source()),
            zones::volume(zone, model.volume().level()),
            zones::volume_fixed(zone, model.volume().is_fixed()),
            zones::mute(zone, model.volume().is_muted()),
            zones::balance(zone, model.balance().balance()),
            zones::sound_mode(zone, sound.mode().to_wire()),
            zones::tone(zone, sound.tone().bass(), sound.tone().treble()),
        ];

        for (band, band_model) in sound.bands().iter() {
            bodies.push(zones::equalizer_band_level(zone, band, band_model.level()));
        }

        bodies.push(zones::equalizer_preset(zone, sound.preset()));
        bodies.push(zones::highpass(zone, sound.highpass().frequency()));
        bodies.push(zones::lowpass(zone, sound.lowpass().frequency()));

        Ok(bodies)
    }
}
