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

//! The infrared controller.

use crate::{ControllerResult, RequestOutcome, StateChange, parse};
use hlx_model::InfraredModel;
use hlx_protocol::command::infrared;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError};

/// Notification and response kinds that mutate infrared state.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[CommandKind::InfraredDisabled];

/// Request kinds a server answers for this family.
pub const REQUEST_KINDS: &[CommandKind] =
    &[CommandKind::InfraredQuery, CommandKind::InfraredDisabled];

/// Owns the infrared model.
#[derive(Debug, Default)]
pub struct InfraredController {
    infrared: InfraredModel,
}

impl InfraredController {
    /// Creates the controller with the default infrared state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the infrared state.
    pub fn infrared(&self) -> &InfraredModel {
        &self.infrared
    }

    /// Applies a matched notification or response to the model.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::InfraredDisabled => {
                let disabled = parse::flag(m)?;
                self.infrared
                    .set_disabled(disabled)
                    .is_changed()
                    .then_some(StateChange::InfraredDisabled { disabled })
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        };

        Ok(changes)
    }

    /// Handles a matched request on the server side.
    pub fn handle_request(&mut self, m: &CommandMatch) -> ControllerResult<RequestOutcome> {
        match m.kind {
            CommandKind::InfraredQuery => Ok(RequestOutcome {
                responses: vec![
                    infrared::disabled(self.infrared.is_disabled()),
                    infrared::query(),
                ],
                changes: Vec::new(),
            }),
            CommandKind::InfraredDisabled => {
                let changes = self.apply(m)?;
                Ok(RequestOutcome {
                    responses: vec![m.capture(0)?.to_string()],
                    changes,
                })
            }
            _ => Err(ProtocolError::UnknownCommand.into()),
        }
    }

    /// The queries a refresh issues.
    pub fn refresh_queries() -> Vec<(String, CommandKind)> {
        vec![(infrared::query(), CommandKind::InfraredQuery)]
    }

    /// The property dump.
    pub fn dump(&self) -> Vec<String> {
        vec![infrared::disabled(self.infrared.is_disabled())]
    }
}
