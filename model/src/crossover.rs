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

/// Minimum crossover frequency in Hz.
pub const FREQUENCY_MIN: u16 = 1;
/// Maximum crossover frequency in Hz.
pub const FREQUENCY_MAX: u16 = 20011;

/// A lowpass or highpass filter crossover frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverModel {
    frequency: u16,
}

impl CrossoverModel {
    /// Creates a crossover at the given frequency.
    pub fn new(frequency: u16) -> ModelResult<Self> {
        check_frequency(frequency)?;
        Ok(Self { frequency })
    }

    /// Returns the frequency in Hz.
    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    /// Sets the frequency.
    pub fn set_frequency(&mut self, frequency: u16) -> ModelResult<Change> {
        check_frequency(frequency)?;

        if self.frequency == frequency {
            Ok(Change::Unchanged)
        } else {
            self.frequency = frequency;
            Ok(Change::Changed)
        }
    }
}

impl Default for CrossoverModel {
    fn default() -> Self {
        Self {
            frequency: FREQUENCY_MIN,
        }
    }
}

fn check_frequency(frequency: u16) -> ModelResult<()> {
    if !(FREQUENCY_MIN..=FREQUENCY_MAX).contains(&frequency) {
        Err(ModelError::OutOfRange {
            value: i32::from(frequency),
            min: i32::from(FREQUENCY_MIN),
            max: i32::from(FREQUENCY_MAX),
        })
    } else {
        Ok(())
    }
}
