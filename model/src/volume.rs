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

use crate::error::check_range;
use crate::{Change, ModelResult};

/// Minimum volume level in dB.
pub const VOLUME_LEVEL_MIN: i8 = -80;
/// Maximum volume level in dB.
pub const VOLUME_LEVEL_MAX: i8 = 0;

/// A zone's volume: attenuation level, fixed (locked) flag, mute flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeModel {
    level: i8,
    fixed: bool,
    muted: bool,
}

impl Default for VolumeModel {
    fn default() -> Self {
        Self {
            level: VOLUME_LEVEL_MIN,
            fixed: false,
            muted: false,
        }
    }
}

impl VolumeModel {
    /// Returns the level in dB.
    pub fn level(&self) -> i8 {
        self.level
    }

    /// Returns the fixed (locked) flag.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Returns the mute flag.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Sets the level.
    pub fn set_level(&mut self, level: i8) -> ModelResult<Change> {
        check_range(level, VOLUME_LEVEL_MIN, VOLUME_LEVEL_MAX)?;

        if self.level == level {
            Ok(Change::Unchanged)
        } else {
            self.level = level;
            Ok(Change::Changed)
        }
    }

    /// Raises the level one step. Fails at the maximum without mutation.
    pub fn increase_level(&mut self) -> ModelResult<i8> {
        check_range(self.level + 1, VOLUME_LEVEL_MIN, VOLUME_LEVEL_MAX)?;
        self.level += 1;
        Ok(self.level)
    }

    /// Lowers the level one step. Fails at the minimum without mutation.
    pub fn decrease_level(&mut self) -> ModelResult<i8> {
        check_range(self.level - 1, VOLUME_LEVEL_MIN, VOLUME_LEVEL_MAX)?;
        self.level -= 1;
        Ok(self.level)
    }

    /// Sets the fixed flag.
    pub fn set_fixed(&mut self, fixed: bool) -> Change {
        if self.fixed == fixed {
            Change::Unchanged
        } else {
            self.fixed = fixed;
            Change::Changed
        }
    }

    /// Sets the mute flag.
    pub fn set_muted(&mut self, muted: bool) -> Change {
        if self.muted == muted {
            Change::Unchanged
        } else {
            self.muted = muted;
            Change::Changed
        }
    }

    /// Inverts the mute flag, returning the new state.
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_level_range() {
        let mut volume = VolumeModel::default();
        assert!(volume.set_level(1).is_err());
        assert!(volume.set_level(-81).is_err());
        assert!(volume.set_level(-25).unwrap().is_changed());
        assert_eq!(volume.level(), -25);
    }

    #[test]
    fn test_set_level_already_set() {
        let mut volume = VolumeModel::default();
        let _ = volume.set_level(-25).unwrap();
        assert!(!volume.set_level(-25).unwrap().is_changed());
    }

    #[test]
    fn test_increase_saturates_at_max() {
        let mut volume = VolumeModel::default();
        let _ = volume.set_level(VOLUME_LEVEL_MAX).unwrap();

        assert!(volume.increase_level().is_err());
        assert_eq!(volume.level(), VOLUME_LEVEL_MAX);
    }

    #[test]
    fn test_decrease_saturates_at_min() {
        let mut volume = VolumeModel::default();

        assert!(volume.decrease_level().is_err());
        assert_eq!(volume.level(), VOLUME_LEVEL_MIN);
    }

    #[test]
    fn test_step_returns_new_level() {
        let mut volume = VolumeModel::default();
        let _ = volume.set_level(-10).unwrap();
        assert_eq!(volume.increase_level().unwrap(), -9);
        assert_eq!(volume.decrease_level().unwrap(), -10);
    }

    #[test]
    fn test_mute_and_fixed_flags() {
        let mut volume = VolumeModel::default();

        assert!(volume.set_muted(true).is_changed());
        assert!(!volume.set_muted(true).is_changed());
        assert!(!volume.toggle_muted());
        assert!(volume.toggle_muted());

        assert!(volume.set_fixed(true).is_changed());
        assert!(!volume.set_fixed(true).is_changed());
    }
}
