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

//! The sources (inputs) controller.

use crate::{ControllerResult, RequestOutcome, StateChange, parse};
use hlx_model::{EntityCollection, Identifier, ModelResult, SOURCES_MAX, SourceModel};
use hlx_protocol::command::sources;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError};

/// Notification and response kinds that mutate source state.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[CommandKind::SourceName];

/// Request kinds a server answers for this family.
pub const REQUEST_KINDS: &[CommandKind] = &[CommandKind::SourceName, CommandKind::SourceQuery];

/// Owns the source models.
#[derive(Debug)]
pub struct SourcesController {
    sources: EntityCollection<SourceModel>,
}

impl Default for SourcesController {
    fn default() -> Self {
        Self::new()
    }
}

impl SourcesController {
    /// Creates the controller with default-initialized sources.
    pub fn new() -> Self {
        Self {
            sources: EntityCollection::new(SOURCES_MAX, SourceModel::new),
        }
    }

    /// Returns the source for `identifier`.
    pub fn source(&self, identifier: Identifier) -> ModelResult<&SourceModel> {
        self.sources.get(identifier)
    }

    /// Applies a matched notification or response to the model.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::SourceName => {
                let (source, name) = parse::named(m)?;
                self.sources
                    .get_mut(source)?
                    .set_name(&name)?
                    .is_changed()
                    .then_some(StateChange::SourceName { source, name })
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
            CommandKind::SourceQuery => {
                let source = parse::single_id(m)?;
                let model = self.sources.get(source)?;
                Ok(RequestOutcome {
                    responses: vec![
                        sources::name(source, model.name().as_str()),
                        sources::query(source),
                    ],
                    changes: Vec::new(),
                })
            }
            CommandKind::SourceName => {
                let changes = self.apply(m)?;
                Ok(RequestOutcome {
                    responses: vec![m.capture(0)?.to_string()],
                    changes,
                })
            }
            _ => Err(ProtocolError::UnknownCommand.into()),
        }
    }

    /// The per-identifier queries a refresh issues.
    pub fn refresh_queries() -> Vec<(String, CommandKind)> {
        (1..=SOURCES_MAX)
            .map(|source| (sources::query(source), CommandKind::SourceQuery))
            .collect()
    }

    /// The property dump for one source.
    pub fn dump(&self, source: Identifier) -> ControllerResult<Vec<String>> {
        let model = self.sources.get(source)?;
        Ok(vec![sources::name(source, model.name().as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_protocol::match_frame;

    #[test]
    fn test_rename_and_dedup() {
        let mut controller = SourcesController::new();
        let matched = match_frame(b"[NI3\"Tuner\"]").unwrap();

        let changes = controller.apply(&matched).unwrap();
        assert_eq!(
            changes,
            vec![StateChange::SourceName {
                source: 3,
                name: "Tuner".to_string()
            }]
        );
        assert!(controller.apply(&matched).unwrap().is_empty());
    }

    #[test]
    fn test_query_echoes() {
        let mut controller = SourcesController::new();
        let query = match_frame(b"[QI3]").unwrap();

        let outcome = controller.handle_request(&query).unwrap();
        assert_eq!(
            outcome.responses,
            vec!["NI3\"SOURCE 3\"".to_string(), "QI3".to_string()]
        );
    }
}
