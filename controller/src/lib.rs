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

//! # HLX Object Controllers
//!
//! One controller per entity family - zones, groups, sources, favorites,
//! equalizer presets, front panel, network, infrared, configuration -
//! each owning its model slice and translating between wire captures and
//! typed mutations. A setter that reports "unchanged" suppresses the
//! state-change notification: that is the fabric's de-duplication
//! invariant.
//!
//! Each family controller carries both halves of the protocol:
//!
//! - `apply` consumes a matched notification or response and mutates the
//!   model, returning the state changes actually produced (client and
//!   proxy mirror side);
//! - `handle_request` consumes a matched request, mutates the model, and
//!   returns the response bodies plus state changes (server side).
//!
//! The shared capture-decoding routines are free functions in
//! [`parse`]; the halves are capabilities on one struct rather than an
//! inheritance lattice.
//!
//! [`Controller`] aggregates the families into the client-role stack and
//! drives the multi-stage refresh protocol; [`Server`] aggregates them
//! into the emulated hardware.

mod configuration;
mod controller;
mod equalizer_presets;
mod error;
mod favorites;
mod front_panel;
mod groups;
mod infrared;
mod network;
pub mod parse;
mod server;
mod sources;
mod state_change;
mod zones;

pub use self::configuration::ConfigurationController;
pub use self::controller::{Controller, ControllerEvent};
pub use self::equalizer_presets::EqualizerPresetsController;
pub use self::error::{ControllerError, ControllerResult};
pub use self::favorites::FavoritesController;
pub use self::front_panel::FrontPanelController;
pub use self::groups::GroupsController;
pub use self::infrared::InfraredController;
pub use self::network::NetworkController;
pub use self::server::{Server, ServerController};
pub use self::sources::SourcesController;
pub use self::state_change::StateChange;
pub use self::zones::ZonesController;

/// What a server-side request handler produced: the response bodies to
/// frame and the state changes to fan out.
#[derive(Debug, Default)]
pub struct RequestOutcome {
    /// Response bodies, in emission order, bare of brackets.
    pub responses: Vec<String>,
    /// State changes the request caused. Empty means the response goes
    /// only to the originating connection.
    pub changes: Vec<StateChange>,
}

impl RequestOutcome {
    /// An outcome that only echoes, with no state change.
    pub fn echo(body: impl Into<String>) -> Self {
        Self {
            responses: vec![body.into()],
            changes: Vec::new(),
        }
    }
}
