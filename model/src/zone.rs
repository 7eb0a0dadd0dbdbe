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

use crate::{
    BalanceModel, Change, Identifier, ModelResult, Name, SOURCES_MAX, SoundModel, VolumeModel,
    validate_identifier,
};

/// Number of zones in the HLX.
pub const ZONES_MAX: Identifier = 24;

/// An addressable audio output region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneModel {
    identifier: Identifier,
    name: Name,
    source: Identifier,
    volume: VolumeModel,
    balance: BalanceModel,
    sound: SoundModel,
}

impl ZoneModel {
    /// Creates a zone with its factory default name.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            name: Name::new(&format!("ZONE {identifier}")).expect("default name fits"),
            source: crate::IDENTIFIER_MIN,
            volume: VolumeModel::default(),
            balance: BalanceModel::default(),
            sound: SoundModel::default(),
        }
    }

    /// Returns the zone identifier.
    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    /// Returns the zone name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Sets the zone name.
    pub fn set_name(&mut self, name: &str) -> ModelResult<Change> {
        self.name.set(name)
    }

    /// Returns the selected source identifier.
    pub fn source(&self) -> Identifier {
        self.source
    }

    /// Selects the zone's source.
    pub fn set_source(&mut self, source: Identifier) -> ModelResult<Change> {
        validate_identifier(source, SOURCES_MAX)?;

        if self.source == source {
            Ok(Change::Unchanged)
        } else {
            self.source = source;
            Ok(Change::Changed)
        }
    }

    /// Returns the volume state.
    pub fn volume(&self) -> &VolumeModel {
        &self.volume
    }

    /// Returns the volume state, mutably.
    pub fn volume_mut(&mut self) -> &mut VolumeModel {
        &mut self.volume
    }

    /// Returns the balance state.
    pub fn balance(&self) -> &BalanceModel {
        &self.balance
    }

    /// Returns the balance state, mutably.
    pub fn balance_mut(&mut self) -> &mut BalanceModel {
        &mut self.balance
    }

    /// Returns the sound processing state.
    pub fn sound(&self) -> &SoundModel {
        &self.sound
    }

    /// Returns the sound processing state, mutably.
    pub fn sound_mut(&mut self) -> &mut SoundModel {
        &mut self.sound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name() {
        let zone = ZoneModel::new(7);
        assert_eq!(zone.name().as_str(), "ZONE 7");
        assert_eq!(zone.identifier(), 7);
    }

    #[test]
    fn test_source_validated() {
        let mut zone = ZoneModel::new(1);
        assert!(zone.set_source(0).is_err());
        assert!(zone.set_source(SOURCES_MAX + 1).is_err());
        assert!(zone.set_source(5).unwrap().is_changed());
        assert!(!zone.set_source(5).unwrap().is_changed());
    }

    #[test]
    fn test_name_change_round_trip() {
        let mut zone = ZoneModel::new(7);
        assert!(zone.set_name("Kitchen").unwrap().is_changed());
        assert_eq!(zone.name().as_str(), "Kitchen");
        assert!(!zone.set_name("Kitchen").unwrap().is_changed());
    }
}
