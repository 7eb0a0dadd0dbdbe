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

use crate::{Change, ModelError, ModelResult};

/// Dimmest front panel brightness.
pub const BRIGHTNESS_MIN: u8 = 0;
/// Brightest front panel brightness.
pub const BRIGHTNESS_MAX: u8 = 3;

/// The device's local user interface: display brightness and a lock flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontPanelModel {
    brightness: u8,
    locked: bool,
}

impl Default for FrontPanelModel {
    fn default() -> Self {
        Self {
            brightness: BRIGHTNESS_MAX,
            locked: false,
        }
    }
}

impl FrontPanelModel {
    /// Returns the display brightness.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Returns the lock flag.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Sets the display brightness.
    pub fn set_brightness(&mut self, brightness: u8) -> ModelResult<Change> {
        if brightness > BRIGHTNESS_MAX {
            return Err(ModelError::OutOfRange {
                value: i32::from(brightness),
                min: i32::from(BRIGHTNESS_MIN),
                max: i32::from(BRIGHTNESS_MAX),
            });
        }

        if self.brightness == brightness {
            Ok(Change::Unchanged)
        } else {
            self.brightness = brightness;
            Ok(Change::Changed)
        }
    }

    /// Sets the lock flag.
    pub fn set_locked(&mut self, locked: bool) -> Change {
        if self.locked == locked {
            Change::Unchanged
        } else {
            self.locked = locked;
            Change::Changed
        }
    }
}
