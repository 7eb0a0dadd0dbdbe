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

//! The groups controller.

use crate::{ControllerResult, RequestOutcome, StateChange, parse};
use hlx_model::{EntityCollection, GROUPS_MAX, GroupModel, Identifier, ModelResult};
use hlx_protocol::command::groups;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError};

/// Notification and response kinds that mutate group state.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[
    CommandKind::GroupName,
    CommandKind::GroupAddZone,
    CommandKind::GroupRemoveZone,
    CommandKind::GroupSource,
];

/// Request kinds a server answers for this family.
pub const REQUEST_KINDS: &[CommandKind] = &[
    CommandKind::GroupName,
    CommandKind::GroupQuery,
    CommandKind::GroupAddZone,
    CommandKind::GroupRemoveZone,
    CommandKind::GroupSource,
];

/// Owns the group models.
#[derive(Debug)]
pub struct GroupsController {
    groups: EntityCollection<GroupModel>,
}

impl Default for GroupsController {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupsController {
    /// Creates the controller with default-initialized groups.
    pub fn new() -> Self {
        Self {
            groups: EntityCollection::new(GROUPS_MAX, GroupModel::new),
        }
    }

    /// Returns the group for `identifier`.
    pub fn group(&self, identifier: Identifier) -> ModelResult<&GroupModel> {
        self.groups.get(identifier)
    }

    /// Applies a matched notification or response to the model.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::GroupName => {
                let (group, name) = parse::named(m)?;
                self.groups
                    .get_mut(group)?
                    .set_name(&name)?
                    .is_changed()
                    .then_some(StateChange::GroupName { group, name })
                    .into_iter()
                    .collect()
            }
            CommandKind::GroupAddZone => {
                let (group, zone) = parse::id_pair(m)?;
                self.groups
                    .get_mut(group)?
                    .add_zone(zone)?
                    .is_changed()
                    .then_some(StateChange::GroupZoneAdded { group, zone })
                    .into_iter()
                    .collect()
            }
            CommandKind::GroupRemoveZone => {
                let (group, zone) = parse::id_pair(m)?;
                self.groups
                    .get_mut(group)?
                    .remove_zone(zone)?
                    .is_changed()
                    .then_some(StateChange::GroupZoneRemoved { group, zone })
                    .into_iter()
                    .collect()
            }
            CommandKind::GroupSource => {
                let (group, source) = parse::id_pair(m)?;
                self.groups
                    .get_mut(group)?
                    .set_source(source)?
                    .is_changed()
                    .then_some(StateChange::GroupSource { group, source })
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
            CommandKind::GroupQuery => {
                let group = parse::single_id(m)?;
                let mut responses = self.dump(group)?;
                responses.push(groups::query(group));
                Ok(RequestOutcome {
                    responses,
                    changes: Vec::new(),
                })
            }
            kind if REQUEST_KINDS.contains(&kind) => {
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
        (1..=GROUPS_MAX)
            .map(|group| (groups::query(group), CommandKind::GroupQuery))
            .collect()
    }

    /// The property dump for one group: name, members, routing.
    pub fn dump(&self, group: Identifier) -> ControllerResult<Vec<String>> {
        let model = self.groups.get(group)?;

        let mut bodies = vec![groups::name(group, model.name().as_str())];
        for zone in model.zones().iter() {
            bodies.push(groups::add_zone(group, zone));
        }
        for source in model.sources().iter() {
            bodies.push(groups::source(group, source));
        }

        Ok(bodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_model::ModelError;
    use hlx_protocol::match_frame;

    #[test]
    fn test_membership_round_trip() {
        let mut controller = GroupsController::new();
        let add = match_frame(b"[AG2O5]").unwrap();

        let changes = controller.apply(&add).unwrap();
        assert_eq!(
            changes,
            vec![StateChange::GroupZoneAdded { group: 2, zone: 5 }]
        );
        assert!(controller.group(2).unwrap().contains_zone(5));

        // Adding again changes nothing.
        assert!(controller.apply(&add).unwrap().is_empty());

        let remove = match_frame(b"[RG2O5]").unwrap();
        let changes = controller.apply(&remove).unwrap();
        assert_eq!(
            changes,
            vec![StateChange::GroupZoneRemoved { group: 2, zone: 5 }]
        );

        // Removing an absent member is an error, answered with (ERROR).
        let err = controller.apply(&remove).unwrap_err();
        assert_eq!(err, ModelError::NotFound.into());
    }

    #[test]
    fn test_group_query_dump() {
        let mut controller = GroupsController::new();
        for frame in [&b"[AG2O5]"[..], b"[AG2O6]", b"[CG2I3]"] {
            let matched = match_frame(frame).unwrap();
            controller.apply(&matched).unwrap();
        }

        let query = match_frame(b"[QG2]").unwrap();
        let outcome = controller.handle_request(&query).unwrap();
        assert_eq!(
            outcome.responses,
            vec![
                "NG2\"GROUP 2\"".to_string(),
                "AG2O5".to_string(),
                "AG2O6".to_string(),
                "CG2I3".to_string(),
                "QG2".to_string(),
            ]
        );
    }

    #[test]
    fn test_source_routing_replacement() {
        let mut controller = GroupsController::new();

        let first = match_frame(b"[CG1I3]").unwrap();
        assert_eq!(controller.apply(&first).unwrap().len(), 1);

        let second = match_frame(b"[CG1I4]").unwrap();
        assert_eq!(
            controller.apply(&second).unwrap(),
            vec![StateChange::GroupSource { group: 1, source: 4 }]
        );

        let routed: Vec<_> = controller.group(1).unwrap().sources().iter().collect();
        assert_eq!(routed, vec![4]);
    }
}
