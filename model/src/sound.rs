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

//! Per-zone sound processing mode and its dependent properties.

use crate::{
    Change, CrossoverModel, EqualizerBandsModel, Identifier, ModelError, ModelResult, ToneModel,
};

/// The active sound processing of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SoundMode {
    /// No processing.
    Disabled = 0,
    /// The zone's own ten-band equalizer.
    ZoneEqualizer = 1,
    /// A shared equalizer preset.
    PresetEqualizer = 2,
    /// Bass and treble tone controls.
    Tone = 3,
    /// Lowpass crossover filter.
    Lowpass = 4,
    /// Highpass crossover filter.
    Highpass = 5,
}

/// Channel topology derived from the sound mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Single summed channel.
    Mono,
    /// Left and right channels.
    Stereo,
}

impl SoundMode {
    /// Decodes the wire ordinal.
    pub fn from_wire(value: u8) -> ModelResult<Self> {
        match value {
            0 => Ok(SoundMode::Disabled),
            1 => Ok(SoundMode::ZoneEqualizer),
            2 => Ok(SoundMode::PresetEqualizer),
            3 => Ok(SoundMode::Tone),
            4 => Ok(SoundMode::Lowpass),
            5 => Ok(SoundMode::Highpass),
            _ => Err(ModelError::OutOfRange {
                value: i32::from(value),
                min: 0,
                max: 5,
            }),
        }
    }

    /// Encodes the wire ordinal.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// The channel mode is an attribute of the sound mode: only the
    /// lowpass filter sums to mono.
    pub fn channel_mode(self) -> ChannelMode {
        match self {
            SoundMode::Lowpass => ChannelMode::Mono,
            _ => ChannelMode::Stereo,
        }
    }
}

/// A zone's sound processing state: the active mode plus the state of
/// every processing branch, retained across mode switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundModel {
    mode: SoundMode,
    tone: ToneModel,
    bands: EqualizerBandsModel,
    preset: Identifier,
    lowpass: CrossoverModel,
    highpass: CrossoverModel,
}

impl Default for SoundModel {
    fn default() -> Self {
        Self {
            mode: SoundMode::Disabled,
            tone: ToneModel::default(),
            bands: EqualizerBandsModel::default(),
            preset: crate::IDENTIFIER_MIN,
            lowpass: CrossoverModel::default(),
            highpass: CrossoverModel::default(),
        }
    }
}

impl SoundModel {
    /// Returns the active sound mode.
    pub fn mode(&self) -> SoundMode {
        self.mode
    }

    /// Returns the channel mode derived from the active sound mode.
    pub fn channel_mode(&self) -> ChannelMode {
        self.mode.channel_mode()
    }

    /// Sets the active sound mode.
    pub fn set_mode(&mut self, mode: SoundMode) -> Change {
        if self.mode == mode {
            Change::Unchanged
        } else {
            self.mode = mode;
            Change::Changed
        }
    }

    /// Returns the tone branch.
    pub fn tone(&self) -> &ToneModel {
        &self.tone
    }

    /// Returns the tone branch, mutably.
    pub fn tone_mut(&mut self) -> &mut ToneModel {
        &mut self.tone
    }

    /// Returns the zone equalizer bands.
    pub fn bands(&self) -> &EqualizerBandsModel {
        &self.bands
    }

    /// Returns the zone equalizer bands, mutably.
    pub fn bands_mut(&mut self) -> &mut EqualizerBandsModel {
        &mut self.bands
    }

    /// Returns the selected equalizer preset identifier.
    pub fn preset(&self) -> Identifier {
        self.preset
    }

    /// Selects an equalizer preset.
    pub fn set_preset(&mut self, preset: Identifier, presets_max: Identifier) -> ModelResult<Change> {
        crate::validate_identifier(preset, presets_max)?;

        if self.preset == preset {
            Ok(Change::Unchanged)
        } else {
            self.preset = preset;
            Ok(Change::Changed)
        }
    }

    /// Returns the lowpass crossover.
    pub fn lowpass(&self) -> &CrossoverModel {
        &self.lowpass
    }

    /// Returns the lowpass crossover, mutably.
    pub fn lowpass_mut(&mut self) -> &mut CrossoverModel {
        &mut self.lowpass
    }

    /// Returns the highpass crossover.
    pub fn highpass(&self) -> &CrossoverModel {
        &self.highpass
    }

    /// Returns the highpass crossover, mutably.
    pub fn highpass_mut(&mut self) -> &mut CrossoverModel {
        &mut self.highpass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() {
        for ordinal in 0..=5u8 {
            let mode = SoundMode::from_wire(ordinal).unwrap();
            assert_eq!(mode.to_wire(), ordinal);
        }
        assert!(SoundMode::from_wire(6).is_err());
    }

    #[test]
    fn test_only_lowpass_is_mono() {
        assert_eq!(SoundMode::Lowpass.channel_mode(), ChannelMode::Mono);
        for mode in [
            SoundMode::Disabled,
            SoundMode::ZoneEqualizer,
            SoundMode::PresetEqualizer,
            SoundMode::Tone,
            SoundMode::Highpass,
        ] {
            assert_eq!(mode.channel_mode(), ChannelMode::Stereo);
        }
    }

    #[test]
    fn test_set_mode_already_set() {
        let mut sound = SoundModel::default();
        assert!(sound.set_mode(SoundMode::Tone).is_changed());
        assert!(!sound.set_mode(SoundMode::Tone).is_changed());
    }

    #[test]
    fn test_branches_survive_mode_switch() {
        let mut sound = SoundModel::default();
        let _ = sound.tone_mut().set_bass(5).unwrap();

        let _ = sound.set_mode(SoundMode::Lowpass);
        let _ = sound.set_mode(SoundMode::Tone);
        assert_eq!(sound.tone().bass(), 5);
    }

    #[test]
    fn test_preset_selection_validated() {
        let mut sound = SoundModel::default();
        assert!(sound.set_preset(0, 10).is_err());
        assert!(sound.set_preset(11, 10).is_err());
        assert!(sound.set_preset(3, 10).unwrap().is_changed());
        assert!(!sound.set_preset(3, 10).unwrap().is_changed());
    }
}
