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

//! Entity identifiers.
//!
//! Every addressable entity family uses dense 1-based identifiers. Zero
//! is the invalid identifier; each family bounds its own maximum.

use crate::{ModelError, ModelResult};

/// An entity identifier. Valid values are `1..=family max`.
pub type Identifier = u8;

/// The invalid identifier.
pub const IDENTIFIER_INVALID: Identifier = 0;

/// The smallest valid identifier in any family.
pub const IDENTIFIER_MIN: Identifier = 1;

/// Validates `identifier` against a family maximum.
pub fn validate_identifier(identifier: Identifier, max: Identifier) -> ModelResult<()> {
    if identifier < IDENTIFIER_MIN || identifier > max {
        Err(ModelError::OutOfRange {
            value: i32::from(identifier),
            min: i32::from(IDENTIFIER_MIN),
            max: i32::from(max),
        })
    } else {
        Ok(())
    }
}
