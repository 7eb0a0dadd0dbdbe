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

//! The configuration controller.
//!
//! Configuration carries no model state of its own: save, load and
//! reset are delegated to the peer, and the periodic saving-to-backup
//! notification is surfaced as a state change. The query-current and
//! reset operations touch every family, so the server routes them at
//! the aggregate level.

use crate::{ControllerResult, StateChange};
use hlx_protocol::{CommandKind, CommandMatch};

/// Notification kinds surfaced for configuration.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[CommandKind::ConfigurationSaving];

/// Request kinds a server answers for this family. Handled by the
/// aggregate because query and reset span every family.
pub const REQUEST_KINDS: &[CommandKind] = &[
    CommandKind::ConfigurationQuery,
    CommandKind::ConfigurationSave,
    CommandKind::ConfigurationLoad,
    CommandKind::ConfigurationReset,
];

/// Stateless translator for configuration notifications and responses.
#[derive(Debug, Default)]
pub struct ConfigurationController;

impl ConfigurationController {
    /// Creates the controller.
    pub fn new() -> Self {
        Self
    }

    /// Applies a matched notification or response, yielding the
    /// corresponding state change.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::ConfigurationSaving => vec![StateChange::ConfigurationSaving],
            CommandKind::ConfigurationSave => vec![StateChange::ConfigurationSaved],
            CommandKind::ConfigurationLoad => vec![StateChange::ConfigurationLoaded],
            CommandKind::ConfigurationReset => vec![StateChange::ConfigurationReset],
            _ => Vec::new(),
        };

        Ok(changes)
    }
}
