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

//! The network controller.
//!
//! Addressing fields (address, netmask, router, EUI-48) are reported by
//! the hardware and only ever applied from the wire; the DHCP and SDDP
//! flags have set forms.

use crate::{ControllerResult, RequestOutcome, StateChange, parse};
use hlx_model::NetworkModel;
use hlx_protocol::command::network;
use hlx_protocol::{CommandKind, CommandMatch, ProtocolError};

/// Notification and response kinds that mutate network state.
pub const NOTIFICATION_KINDS: &[CommandKind] = &[
    CommandKind::NetworkDhcp,
    CommandKind::NetworkSddp,
    CommandKind::NetworkMac,
    CommandKind::NetworkAddress,
    CommandKind::NetworkNetmask,
    CommandKind::NetworkRouter,
];

/// Request kinds a server answers for this family.
pub const REQUEST_KINDS: &[CommandKind] = &[
    CommandKind::NetworkQuery,
    CommandKind::NetworkDhcp,
    CommandKind::NetworkSddp,
];

/// Owns the network model.
#[derive(Debug, Default)]
pub struct NetworkController {
    network: NetworkModel,
}

impl NetworkController {
    /// Creates the controller with the default network state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the network state.
    pub fn network(&self) -> &NetworkModel {
        &self.network
    }

    /// Applies a matched notification or response to the model.
    pub fn apply(&mut self, m: &CommandMatch) -> ControllerResult<Vec<StateChange>> {
        let changes = match m.kind {
            CommandKind::NetworkDhcp => {
                let enabled = parse::flag(m)?;
                self.network
                    .set_dhcp_enabled(enabled)
                    .is_changed()
                    .then_some(StateChange::NetworkDhcp { enabled })
                    .into_iter()
                    .collect()
            }
            CommandKind::NetworkSddp => {
                let enabled = parse::flag(m)?;
                self.network
                    .set_sddp_enabled(enabled)
                    .is_changed()
                    .then_some(StateChange::NetworkSddp { enabled })
                    .into_iter()
                    .collect()
            }
            CommandKind::NetworkMac => {
                let mac = parse::mac(m)?;
                self.network
                    .set_mac(mac)
                    .is_changed()
                    .then_some(StateChange::NetworkMac { mac })
                    .into_iter()
                    .collect()
            }
            CommandKind::NetworkAddress => {
                let address = parse::ip(m)?;
                self.network
                    .set_address(address)
                    .is_changed()
                    .then_some(StateChange::NetworkAddress { address })
                    .into_iter()
                    .collect()
            }
            CommandKind::NetworkNetmask => {
                let netmask = parse::ip(m)?;
                self.network
                    .set_netmask(netmask)
                    .is_changed()
                    .then_some(StateChange::NetworkNetmask { netmask })
                    .into_iter()
                    .collect()
            }
            CommandKind::NetworkRouter => {
                let router = parse::ip(m)?;
                self.network
                    .set_router(router)
                    .is_changed()
                    .then_some(StateChange::NetworkRouter { router })
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
            CommandKind::NetworkQuery => {
                let mut responses = self.dump();
                responses.push(network::query());
                Ok(RequestOutcome {
                    responses,
                    changes: Vec::new(),
                })
            }
            CommandKind::NetworkDhcp | CommandKind::NetworkSddp => {
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
        vec![(network::query(), CommandKind::NetworkQuery)]
    }

    /// The property dump: flags, EUI-48, and whatever addressing is
    /// known.
    pub fn dump(&self) -> Vec<String> {
        let mut bodies = vec![
            network::dhcp(self.network.is_dhcp_enabled()),
            network::mac(self.network.mac()),
        ];

        if let Some(address) = self.network.address() {
            bodies.push(network::address(address));
        }
        if let Some(netmask) = self.network.netmask() {
            bodies.push(network::netmask(netmask));
        }
        if let Some(router) = self.network.router() {
            bodies.push(network::router(router));
        }

        bodies.push(network::sddp(self.network.is_sddp_enabled()));
        bodies
    }
}
