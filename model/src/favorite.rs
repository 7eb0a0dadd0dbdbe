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

/// Number of favorites in the HLX.
pub const FAVORITES_MAX: Identifier = 10;

/// A named preset selection. Favorites carry no direct audio state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteModel {
    identifier: Identifier,
    name: Name,
}

impl FavoriteModel {
    /// Creates a favorite with its factory default name.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            name: Name::new(&format!("FAVORITE {identifier}")).expect("default name fits"),
        }
    }

    /// Returns the favorite identifier.
    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    /// Returns the favorite name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Sets the favorite name.
    pub fn set_name(&mut self, name: &str) -> ModelResult<Change> {
        self.name.set(name)
    }
}
