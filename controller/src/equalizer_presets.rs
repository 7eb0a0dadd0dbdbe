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

//! The equalizer presets controller.

use crate::{ControllerResult, RequestOutcome, StateChange, parse};
use hlx_model::{EQUALIZER_PRESETS_MAX, EntityCollection, EqualizerPresetModel, Identifier, ModelResult};
use hlx_protocol::command::equalizer_presets;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError};

/// Notification and response kinds that mutate preset state.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[
    CommandKind::EqualizerPresetName,
    CommandKind::EqualizerPresetBandLevel,
];

/// Request kinds a server answers for this family.
pub const REQUEST_KINDS: &[CommandKind] = &[
    CommandKind::EqualizerPresetName,
    CommandKind::EqualizerPresetBandLevel,
    CommandKind::EqualizerPresetQuery,
];

/// Owns the equalizer preset models.
#[derive(Debug)]
pub struct EqualizerPresetsController {
    presets: EntityCollection<EqualizerPresetModel>,
}

impl Default for EqualizerPresetsController {
    fn default() -> Self {
        Self::new()
    }
}

impl EqualizerPresetsController {
    /// Creates the controller with default-initialized presets.
    pub fn new() -> Self {
        Self {
            presets: EntityCollection::new(EQUALIZER_PRESETS_MAX, EqualizerPresetModel::new),
        }
    }

    /// Returns the preset for `identifier`.
    pub fn preset(&self, identifier: Identifier) -> ModelResult<&EqualizerPresetModel> {
        self.presets.get(identifier)
    }

    /// Applies a matched notification or response to the model.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::EqualizerPresetName => {
                let (preset, name) = parse::named(m)?;
                self.presets
                    .get_mut(preset)?
                    .set_name(&name)?
                    .is_changed()
                    .then_some(StateChange::EqualizerPresetName { preset, name })
                    .into_iter()
                    .collect()
            }
            CommandKind::EqualizerPresetBandLevel => {
                let (preset, band, level) = parse::band_level(m)?;
                self.presets
                    .get_mut(preset)?
                    .bands_mut()
                    .band_mut(band)?
                    .set_level(level)?
                    .is_changed()
                    .then_some(StateChange::EqualizerPresetBand {
                        preset,
                        band,
                        level,
                    })
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
            CommandKind::EqualizerPresetQuery => {
                let preset = parse::single_id(m)?;
                let mut responses = self.dump(preset)?;
                responses.push(equalizer_presets::query(preset));
                Ok(RequestOutcome {
                    responses,
                    changes: Vec::new(),
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

    /// The per-identifier queries a refresh issues.
    pub fn refresh_queries() -> Vec<(String, CommandKind)> {
        (1..=EQUALIZER_PRESETS_MAX)
            .map(|preset| {
                (
                    equalizer_presets::query(preset),
                    CommandKind::EqualizerPresetQuery,
                )
            })
            .collect()
    }

    /// The property dump for one preset: name plus every band level.
    pub fn dump(&self, preset: Identifier) -> ControllerResult<Vec<String>> {
        let model = self.presets.get(preset)?;

        let mut bodies = vec![equalizer_presets::name(preset, model.name().as_str())];
        for (band, band_model) in model.bands().iter() {
            bodies.push(equalizer_presets::band_level(
                preset,
                band,
                band_model.level(),
            ));
        }

        Ok(bodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_protocol::match_frame;

    #[test]
    fn test_band_level_round_trip() {
        let mut controller = EqualizerPresetsController::new();
        let matched = match_frame(b"[EP4B10L7]").unwrap();

        let changes = controller.apply(&matched).unwrap();
        assert_eq!(
            changes,
            vec![StateChange::EqualizerPresetBand {
                preset: 4,
                band: 10,
                level: 7
            }]
        );
        assert!(controller.apply(&matched).unwrap().is_empty());
        assert_eq!(
            controller.preset(4).unwrap().bands().band(10).unwrap().level(),
            7
        );
    }

    #[test]
    fn test_query_dump_has_name_and_ten_bands() {
        let mut controller = EqualizerPresetsController::new();
        let query = match_frame(b"[QEP1]").unwrap();

        let outcome = controller.handle_request(&query).unwrap();
        assert_eq!(outcome.responses.len(), 12);
        assert_eq!(outcome.responses.last().unwrap(), "QEP1");
    }
}
