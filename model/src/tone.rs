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

/// Minimum bass or treble level.
pub const TONE_LEVEL_MIN: i8 = -10;
/// Maximum bass or treble level.
pub const TONE_LEVEL_MAX: i8 = 10;
/// The flat (no boost, no cut) level.
pub const TONE_LEVEL_FLAT: i8 = 0;

/// Independent bass and treble levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneModel {
    bass: i8,
    treble: i8,
}

impl Default for ToneModel {
    fn default() -> Self {
        Self {
            bass: TONE_LEVEL_FLAT,
            treble: TONE_LEVEL_FLAT,
        }
    }
}

impl ToneModel {
    /// Returns the bass level.
    pub fn bass(&self) -> i8 {
        self.bass
    }

    /// Returns the treble level.
    pub fn treble(&self) -> i8 {
        self.treble
    }

    /// Sets the bass level.
    pub fn set_bass(&mut self, bass: i8) -> ModelResult<Change> {
        check_range(bass, TONE_LEVEL_MIN, TONE_LEVEL_MAX)?;

        if self.bass == bass {
            Ok(Change::Unchanged)
        } else {
            self.bass = bass;
            Ok(Change::Changed)
        }
    }

    /// Sets the treble level.
    pub fn set_treble(&mut self, treble: i8) -> ModelResult<Change> {
        check_range(treble, TONE_LEVEL_MIN, TONE_LEVEL_MAX)?;

        if self.treble == treble {
            Ok(Change::Unchanged)
        } else {
            self.treble = treble;
            Ok(Change::Changed)
        }
    }

    /// Sets both levels. Either argument out of range rejects the whole
    /// call with nothing mutated.
    pub fn set_tone(&mut self, bass: i8, treble: i8) -> ModelResult<Change> {
        check_range(bass, TONE_LEVEL_MIN, TONE_LEVEL_MAX)?;
        check_range(treble, TONE_LEVEL_MIN, TONE_LEVEL_MAX)?;

        let change = self.set_bass(bass)?.or(self.set_treble(treble)?);
        Ok(change)
    }

    /// Raises the bass one step.
    pub fn increase_bass(&mut self) -> ModelResult<i8> {
        check_range(self.bass + 1, TONE_LEVEL_MIN, TONE_LEVEL_MAX)?;
        self.bass += 1;
        Ok(self.bass)
    }

    /// Lowers the bass one step.
    pub fn decrease_bass(&mut self) -> ModelResult<i8> {
        check_range(self.bass - 1, TONE_LEVEL_MIN, TONE_LEVEL_MAX)?;
        self.bass -= 1;
        Ok(self.bass)
    }

    /// Raises the treble one step.
    pub fn increase_treble(&mut self) -> ModelResult<i8> {
        check_range(self.treble + 1, TONE_LEVEL_MIN, TONE_LEVEL_MAX)?;
        self.treble += 1;
        Ok(self.treble)
    }

    /// Lowers the treble one step.
    pub fn decrease_treble(&mut self) -> ModelResult<i8> {
        check_range(self.treble - 1, TONE_LEVEL_MIN, TONE_LEVEL_MAX)?;
        self.treble -= 1;
        Ok(self.treble)
    }
}
