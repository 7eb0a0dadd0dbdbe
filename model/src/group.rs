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

use crate::{
    Change, Identifier, IdentifiersCollection, ModelResult, Name, SOURCES_MAX, ZONES_MAX,
    validate_identifier,
};

/// Number of groups in the HLX.
pub const GROUPS_MAX: Identifier = 10;

/// A named set of zones and their routed sources, controlled as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupModel {
    identifier: Identifier,
    name: Name,
    zones: IdentifiersCollection,
    sources: IdentifiersCollection,
}

impl GroupModel {
    /// Creates an empty group with its factory default name.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            name: Name::new(&format!("GROUP {identifier}")).expect("default name fits"),
            zones: IdentifiersCollection::new(),
            sources: IdentifiersCollection::new(),
        }
    }

    /// Returns the group identifier.
    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    /// Returns the group name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Sets the group name.
    pub fn set_name(&mut self, name: &str) -> ModelResult<Change> {
        self.name.set(name)
    }

    /// Returns whether `zone` is a member.
    pub fn contains_zone(&self, zone: Identifier) -> bool {
        self.zones.contains(zone)
    }

    /// Returns the member zone identifiers.
    pub fn zones(&self) -> &IdentifiersCollection {
        &self.zones
    }

    /// Returns the routed source identifiers.
    pub fn sources(&self) -> &IdentifiersCollection {
        &self.sources
    }

    /// Adds a member zone.
    pub fn add_zone(&mut self, zone: Identifier) -> ModelResult<Change> {
        validate_identifier(zone, ZONES_MAX)?;
        Ok(self.zones.add(zone))
    }

    /// Removes a member zone. Fails with `NotFound` when absent.
    pub fn remove_zone(&mut self, zone: Identifier) -> ModelResult<Change> {
        validate_identifier(zone, ZONES_MAX)?;
        self.zones.remove(zone)
    }

    /// Removes every member zone.
    pub fn clear_zones(&mut self) -> Change {
        self.zones.clear()
    }

    /// Routes a single source, replacing the current routing.
    pub fn set_source(&mut self, source: Identifier) -> ModelResult<Change> {
        validate_identifier(source, SOURCES_MAX)?;

        let replacement: IdentifiersCollection = [source].into_iter().collect();
        Ok(self.sources.set_identifiers(&replacement))
    }

    /// Replaces the full source routing.
    pub fn set_sources(&mut self, sources: &IdentifiersCollection) -> ModelResult<Change> {
        for source in sources.iter() {
            validate_identifier(source, SOURCES_MAX)?;
        }
        Ok(self.sources.set_identifiers(sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelError;

    #[test]
    fn test_default_group_is_empty() {
        let group = GroupModel::new(2);
        assert_eq!(group.name().as_str(), "GROUP 2");
        assert!(group.zones().is_empty());
        assert!(group.sources().is_empty());
    }

    #[test]
    fn test_zone_membership() {
        let mut group = GroupModel::new(1);
        assert!(group.add_zone(5).unwrap().is_changed());
        assert!(group.contains_zone(5));

        // Re-adding is a quiet no-op; removing twice is an error.
        assert!(!group.add_zone(5).unwrap().is_changed());
        assert!(group.remove_zone(5).unwrap().is_changed());
        assert_eq!(group.remove_zone(5).unwrap_err(), ModelError::NotFound);
    }

    #[test]
    fn test_zone_identifier_validated() {
        let mut group = GroupModel::new(1);
        assert!(group.add_zone(0).is_err());
        assert!(group.add_zone(ZONES_MAX + 1).is_err());
    }

    #[test]
    fn test_set_source_replaces_routing() {
        let mut group = GroupModel::new(1);
        assert!(group.set_source(3).unwrap().is_changed());
        assert!(!group.set_source(3).unwrap().is_changed());

        assert!(group.set_source(4).unwrap().is_changed());
        let routed: Vec<_> = group.sources().iter().collect();
        assert_eq!(routed, vec![4]);
    }

    #[test]
    fn test_set_sources_validates_members() {
        let mut group = GroupModel::new(1);
        let bad: IdentifiersCollection = [SOURCES_MAX + 1].into_iter().collect();
        assert!(group.set_sources(&bad).is_err());
        assert!(group.sources().is_empty());
    }
}
