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

//! Error and change-reporting types for model setters.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Outcome of a successful setter.
///
/// `Unchanged` means the value was already set: the model is bit-identical
/// and the caller must not emit a state-change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Change {
    /// The model was mutated.
    Changed,
    /// The value was already set; nothing happened.
    Unchanged,
}

impl Change {
    /// Returns whether the model was mutated.
    pub fn is_changed(self) -> bool {
        matches!(self, Change::Changed)
    }

    /// Folds two outcomes: changed wins.
    pub fn or(self, other: Change) -> Change {
        if self.is_changed() || other.is_changed() {
            Change::Changed
        } else {
            Change::Unchanged
        }
    }
}

/// Model validation errors. Setters returning an error leave the model
/// untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ModelError {
    /// An observer was called before initialization.
    #[error("model is not initialized")]
    NotInitialized,

    /// A null or empty argument was supplied.
    #[error("invalid argument")]
    InvalidArgument,

    /// An identifier or numeric level fell outside its valid interval.
    #[error("value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// The rejected value.
        value: i32,
        /// Inclusive minimum.
        min: i32,
        /// Inclusive maximum.
        max: i32,
    },

    /// A name exceeded the per-family maximum length.
    #[error("name exceeds {max} bytes")]
    NameTooLong {
        /// Maximum permitted length.
        max: usize,
    },

    /// The addressed member does not exist.
    #[error("not found")]
    NotFound,

    /// The member already exists.
    #[error("already exists")]
    AlreadyExists,
}

/// Checks `value` against an inclusive interval, the common prologue of
/// every leveled setter.
pub(crate) fn check_range<T>(value: T, min: T, max: T) -> ModelResult<()>
where
    T: PartialOrd + Into<i32> + Copy,
{
    if value < min || value > max {
        Err(ModelError::OutOfRange {
            value: value.into(),
            min: min.into(),
            max: max.into(),
        })
    } else {
        Ok(())
    }
}
