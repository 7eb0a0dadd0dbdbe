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

use crate::Change;
use std::net::IpAddr;

/// The device's Ethernet interface state. Addressing fields are reported
/// by the hardware; only the DHCP and SDDP flags are settable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkModel {
    dhcp_enabled: bool,
    mac: [u8; 6],
    address: Option<IpAddr>,
    netmask: Option<IpAddr>,
    router: Option<IpAddr>,
    sddp_enabled: bool,
}

impl NetworkModel {
    /// Returns the DHCPv4-enabled flag.
    pub fn is_dhcp_enabled(&self) -> bool {
        self.dhcp_enabled
    }

    /// Returns the EUI-48.
    pub fn mac(&self) -> &[u8; 6] {
        &self.mac
    }

    /// Returns the host address, when known.
    pub fn address(&self) -> Option<IpAddr> {
        self.address
    }

    /// Returns the netmask, when known.
    pub fn netmask(&self) -> Option<IpAddr> {
        self.netmask
    }

    /// Returns the default router, when known.
    pub fn router(&self) -> Option<IpAddr> {
        self.router
    }

    /// Returns the Control4 SDDP-enabled flag.
    pub fn is_sddp_enabled(&self) -> bool {
        self.sddp_enabled
    }

    /// Sets the DHCPv4-enabled flag.
    pub fn set_dhcp_enabled(&mut self, enabled: bool) -> Change {
        if self.dhcp_enabled == enabled {
            Change::Unchanged
        } else {
            self.dhcp_enabled = enabled;
            Change::Changed
        }
    }

    /// Sets the Control4 SDDP-enabled flag.
    pub fn set_sddp_enabled(&mut self, enabled: bool) -> Change {
        if self.sddp_enabled == enabled {
            Change::Unchanged
        } else {
            self.sddp_enabled = enabled;
            Change::Changed
        }
    }

    /// Records the reported EUI-48.
    pub fn set_mac(&mut self, mac: [u8; 6]) -> Change {
        if self.mac == mac {
            Change::Unchanged
        } else {
            self.mac = mac;
            Change::Changed
        }
    }

    /// Records the reported host address.
    pub fn set_address(&mut self, address: IpAddr) -> Change {
        if self.address == Some(address) {
            Change::Unchanged
        } else {
            self.address = Some(address);
            Change::Changed
        }
    }

    /// Records the reported netmask.
    pub fn set_netmask(&mut self, netmask: IpAddr) -> Change {
        if self.netmask == Some(netmask) {
            Change::Unchanged
        } else {
            self.netmask = Some(netmask);
            Change::Changed
        }
    }

    /// Records the reported default router.
    pub fn set_router(&mut self, router: IpAddr) -> Change {
        if self.router == Some(router) {
            Change::Unchanged
        } else {
            self.router = Some(router);
            Change::Changed
        }
    }
}
