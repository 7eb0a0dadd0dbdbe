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

//! The favorites controller.

use crate::{ControllerResult, RequestOutcome, StateChange, parse};
use hlx_model::{EntityCollection, FAVORITES_MAX, FavoriteModel, Identifier, ModelResult};
use hlx_protocol::command::favorites;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError};

/// Notification and response kinds that mutate favorite state.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[CommandKind::FavoriteName];

/// Request kinds a server answers for this family.
pub const REQUEST_KINDS: &[CommandKind] = &[CommandKind::FavoriteName, CommandKind::FavoriteQuery];

/// Owns the favorite models.
#[derive(Debug)]
pub struct FavoritesController {
    favorites: EntityCollection<FavoriteModel>,
}

impl Default for FavoritesController {
    fn default() -> Self {
        Self::new()
    }
}

impl FavoritesController {
    /// Creates the controller with default-initialized favorites.
    pub fn new() -> Self {
        Self {
            favorites: EntityCollection::new(FAVORITES_MAX, FavoriteModel::new),
        }
    }

    /// Returns the favorite for `identifier`.
    pub fn favorite(&self, identifier: Identifier) -> ModelResult<&FavoriteModel> {
        self.favorites.get(identifier)
    }

    /// Applies a matched notification or response to the model.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::FavoriteName => {
                let (favorite, name) = parse::named(m)?;
                self.favorites
                    .get_mut(favorite)?
                    .set_name(&name)?
                    .is_changed()
                    .then_some(StateChange::FavoriteName { favorite, name })
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
            CommandKind::FavoriteQuery => {
                let favorite = parse::single_id(m)?;
                let model = self.favorites.get(favorite)?;
                Ok(RequestOutcome {
                    responses: vec![
                        favorites::name(favorite, model.name().as_str()),
                        favorites::query(favorite),
                    ],
                    changes: Vec::new(),
                })
            }
            CommandKind::FavoriteName => {
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
        (1..=FAVORITES_MAX)
            .map(|favorite| (favorites::query(favorite), CommandKind::FavoriteQuery))
            .collect()
    }

    /// The property dump for one favorite.
    pub fn dump(&self, favorite: Identifier) -> ControllerResult<Vec<String>> {
        let model = self.favorites.get(favorite)?;
        Ok(vec![favorites::name(favorite, model.name().as_str())])
    }
}
