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

use crate::Change;

/// The infrared remote-control receiver: a single disabled flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfraredModel {
    disabled: bool,
}

impl InfraredModel {
    /// Returns the disabled flag.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Sets the disabled flag.
    pub fn set_disabled(&mut self, disabled: bool) -> Change {
        if self.disabled == disabled {
            Change::Unchanged
        } else {
            self.disabled = disabled;
            Change::Changed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_flag() {
        let mut infrared = InfraredModel::default();
        assert!(!infrared.is_disabled());
        assert!(infrared.set_disabled(true).is_changed());
        assert!(!infrared.set_disabled(true).is_changed());
    }
}
