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

//! The front panel controller.
//!
//! The locked query carries a known hardware quirk: `[QFPL]` is answered
//! with `(FPLn)` alone, without the echoed `(QFPL)` every other query
//! appends. The server reproduces the observed behavior and the client
//! refresh therefore completes that exchange on the `FPLn` form,
//! tolerating hardware that someday appends the echo.

use crate::{ControllerResult, RequestOutcome, StateChange, parse};
use hlx_model::FrontPanelModel;
use hlx_protocol::command::front_panel;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError};

/// Notification and response kinds that mutate front panel state.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[
    CommandKind::FrontPanelBrightness,
    CommandKind::FrontPanelLocked,
];

/// Request kinds a server answers for this family.
pub const REQUEST_KINDS: &[CommandKind] = &[
    CommandKind::FrontPanelQueryBrightness,
    CommandKind::FrontPanelQueryLocked,
    CommandKind::FrontPanelBrightness,
    CommandKind::FrontPanelLocked,
];

/// Owns the front panel model.
#[derive(Debug, Default)]
pub struct FrontPanelController {
    panel: FrontPanelModel,
}

impl FrontPanelController {
    /// Creates the controller with the default front panel state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the front panel state.
    pub fn panel(&self) -> &FrontPanelModel {
        &self.panel
    }

    /// Applies a matched notification or response to the model.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::FrontPanelBrightness => {
                let brightness = parse::brightness(m)?;
                self.panel
                    .set_brightness(brightness)?
                    .is_changed()
                    .then_some(StateChange::FrontPanelBrightness { brightness })
                    .into_iter()
                    .collect()
            }
            CommandKind::FrontPanelLocked => {
                let locked = parse::flag(m)?;
                self.panel
                    .set_locked(locked)
                    .is_changed()
                    .then_some(StateChange::FrontPanelLocked { locked })
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
            CommandKind::FrontPanelQueryBrightness => Ok(RequestOutcome {
                responses: vec![
                    front_panel::brightness(self.panel.brightness()),
                    front_panel::query_brightness(),
                ],
                changes: Vec::new(),
            }),
            // The locked response alone, no echoed query; see the
            // module docs.
            CommandKind::FrontPanelQueryLocked => Ok(RequestOutcome {
                responses: vec![front_panel::locked(self.panel.is_locked())],
                changes: Vec::new(),
            }),
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

    /// The queries a refresh issues. The locked exchange completes on
    /// the `FPLn` response form.
    pub fn refresh_queries() -> Vec<(String, CommandKind)> {
        vec![
            (
                front_panel::query_brightness(),
                CommandKind::FrontPanelQueryBrightness,
            ),
            (front_panel::query_locked(), CommandKind::FrontPanelLocked),
        ]
    }

    /// The property dump.
    pub fn dump(&self) -> Vec<String> {
        vec![
            front_panel::brightness(self.panel.brightness()),
            front_panel::locked(self.panel.is_locked()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_protocol::match_frame;

    #[test]
    fn test_brightness_round_trip() {
        let mut controller = FrontPanelController::new();
        let matched = match_frame(b"(FPB1)").unwrap();

        assert_eq!(
            controller.apply(&matched).unwrap(),
            vec![StateChange::FrontPanelBrightness { brightness: 1 }]
        );
        assert!(controller.apply(&matched).unwrap().is_empty());
    }

    #[test]
    fn test_locked_query_has_no_echo() {
        let mut controller = FrontPanelController::new();
        let query = match_frame(b"[QFPL]").unwrap();

        let outcome = controller.handle_request(&query).unwrap();
        assert_eq!(outcome.responses, vec!["FPL0".to_string()]);
    }

    #[test]
    fn test_brightness_query_echoes() {
        let mut controller = FrontPanelController::new();
        let query = match_frame(b"[QFPB]").unwrap();

        let outcome = controller.handle_request(&query).unwrap();
        assert_eq!(
            outcome.responses,
            vec!["FPB3".to_string(), "QFPB".to_string()]
        );
    }

    #[test]
    fn test_brightness_out_of_range() {
        let mut controller = FrontPanelController::new();
        let matched = match_frame(b"(FPB9)").unwrap();
        assert!(controller.apply(&matched).is_err());
    }
}
