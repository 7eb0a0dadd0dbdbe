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

/// Maximum entity name length in bytes, fixed by the protocol.
pub const NAME_LENGTH_MAX: usize = 16;

/// A bounded entity name.
///
/// An empty name is rejected as `InvalidArgument`; an over-length name is
/// the distinct `NameTooLong` error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    /// Validates and constructs a name.
    pub fn new(name: &str) -> ModelResult<Self> {
        validate(name)?;
        Ok(Self(name.to_string()))
    }

    /// Returns the name text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Replaces the name, reporting whether anything changed.
    pub fn set(&mut self, name: &str) -> ModelResult<Change> {
        validate(name)?;

        if self.0 == name {
            Ok(Change::Unchanged)
        } else {
            self.0 = name.to_string();
            Ok(Change::Changed)
        }
    }
}

fn validate(name: &str) -> ModelResult<()> {
    if name.is_empty() {
        Err(ModelError::InvalidArgument)
    } else if name.len() > NAME_LENGTH_MAX {
        Err(ModelError::NameTooLong {
            max: NAME_LENGTH_MAX,
        })
    } else {
        Ok(())
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_invalid_argument() {
        assert_eq!(Name::new("").unwrap_err(), ModelError::InvalidArgument);
    }

    #[test]
    fn test_over_length_is_name_too_long() {
        let long = "A".repeat(NAME_LENGTH_MAX + 1);
        assert_eq!(
            Name::new(&long).unwrap_err(),
            ModelError::NameTooLong {
                max: NAME_LENGTH_MAX
            }
        );

        // Exactly at the bound is fine.
        let bound = "A".repeat(NAME_LENGTH_MAX);
        assert!(Name::new(&bound).is_ok());
    }

    #[test]
    fn test_set_reports_change() {
        let mut name = Name::new("Kitchen").unwrap();
        assert!(!name.set("Kitchen").unwrap().is_changed());
        assert!(name.set("Porch").unwrap().is_changed());
        assert_eq!(name.as_str(), "Porch");
    }
}
