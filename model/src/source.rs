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

use crate::{Change, Identifier, ModelResult, Name};

/// Number of sources (inputs) in the HLX.
pub const SOURCES_MAX: Identifier = 8;

/// An addressable audio input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModel {
    identifier: Identifier,
    name: Name,
}

impl SourceModel {
    /// Creates a source with its factory default name.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            name: Name::new(&format!("SOURCE {identifier}")).expect("default name fits"),
        }
    }

    /// Returns the source identifier.
    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    /// Returns the source name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Sets the source name.
    pub fn set_name(&mut self, name: &str) -> ModelResult<Change> {
        self.name.set(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let source = SourceModel::new(3);
        assert_eq!(source.identifier(), 3);
        assert_eq!(source.name().as_str(), "SOURCE 3");
    }

    #[test]
    fn test_rename() {
        let mut source = SourceModel::new(3);
        assert!(source.set_name("Tuner").unwrap().is_changed());
        assert!(!source.set_name("Tuner").unwrap().is_changed());
    }
}
