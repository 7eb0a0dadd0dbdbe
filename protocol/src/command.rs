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

//! Typed formatting of command bodies.
//!
//! Each function returns the bare body; callers enclose it with
//! [`frame::request`] or [`frame::response`] depending on direction. A
//! response mirrors the request body literally, so the same builders
//! serve both sides of an exchange.
//!
//! [`frame::request`]: crate::frame::request
//! [`frame::response`]: crate::frame::response

/// Zone commands.
pub mod zones {
    /// Stereophonic balance. Negative values lean left.
    pub fn balance(zone: u8, balance: i8) -> String {
        if balance < 0 {
            format!("BO{zone}L{}", -i16::from(balance))
        } else {
            format!("BO{zone}R{balance}")
        }
    }

    /// Zone equalizer band level.
    pub fn equalizer_band_level(zone: u8, band: u8, level: i8) -> String {
        format!("EO{zone}B{band}L{level}")
    }

    /// Zone equalizer preset selection.
    pub fn equalizer_preset(zone: u8, preset: u8) -> String {
        format!("EO{zone}P{preset}")
    }

    /// Highpass crossover frequency.
    pub fn highpass(zone: u8, frequency: u16) -> String {
        format!("EO{zone}HP{frequency}")
    }

    /// Lowpass crossover frequency.
    pub fn lowpass(zone: u8, frequency: u16) -> String {
        format!("EO{zone}LP{frequency}")
    }

    /// Mute (`VM…`) or unmute (`VUM…`).
    pub fn mute(zone: u8, muted: bool) -> String {
        if muted {
            format!("VMO{zone}")
        } else {
            format!("VUMO{zone}")
        }
    }

    /// Zone name.
    pub fn name(zone: u8, name: &str) -> String {
        format!("NO{zone}\"{name}\"")
    }

    /// Zone query.
    pub fn query(zone: u8) -> String {
        format!("QO{zone}")
    }

    /// Sound mode selection.
    pub fn sound_mode(zone: u8, mode: u8) -> String {
        format!("EO{zone}M{mode}")
    }

    /// Source (input) selection.
    pub fn source(zone: u8, source: u8) -> String {
        format!("CO{zone}I{source}")
    }

    /// Source selection for every zone.
    pub fn source_all(source: u8) -> String {
        format!("CXI{source}")
    }

    /// Mute toggle.
    pub fn toggle_mute(zone: u8) -> String {
        format!("VMTO{zone}")
    }

    /// Bass and treble tone levels.
    pub fn tone(zone: u8, bass: i8, treble: i8) -> String {
        format!("TO{zone}B{bass}T{treble}")
    }

    /// Volume level.
    pub fn volume(zone: u8, level: i8) -> String {
        format!("VO{zone}R{level}")
    }

    /// Volume level for every zone.
    pub fn volume_all(level: i8) -> String {
        format!("VXR{level}")
    }

    /// Volume fixed (locked) flag.
    pub fn volume_fixed(zone: u8, fixed: bool) -> String {
        format!("VO{zone}F{}", u8::from(fixed))
    }
}

/// Group commands.
pub mod groups {
    /// Group name.
    pub fn name(group: u8, name: &str) -> String {
        format!("NG{group}\"{name}\"")
    }

    /// Group query.
    pub fn query(group: u8) -> String {
        format!("QG{group}")
    }

    /// Add a zone to a group.
    pub fn add_zone(group: u8, zone: u8) -> String {
        format!("AG{group}O{zone}")
    }

    /// Remove a zone from a group.
    pub fn remove_zone(group: u8, zone: u8) -> String {
        format!("RG{group}O{zone}")
    }

    /// Route a source to a group.
    pub fn source(group: u8, source: u8) -> String {
        format!("CG{group}I{source}")
    }
}

/// Source (input) commands.
pub mod sources {
    /// Source name.
    pub fn name(source: u8, name: &str) -> String {
        format!("NI{source}\"{name}\"")
    }

    /// Source query.
    pub fn query(source: u8) -> String {
        format!("QI{source}")
    }
}

/// Favorite commands.
pub mod favorites {
    /// Favorite name.
    pub fn name(favorite: u8, name: &str) -> String {
        format!("NF{favorite}\"{name}\"")
    }

    /// Favorite query.
    pub fn query(favorite: u8) -> String {
        format!("QF{favorite}")
    }
}

/// Equalizer preset commands.
pub mod equalizer_presets {
    /// Preset name.
    pub fn name(preset: u8, name: &str) -> String {
        format!("NEP{preset}\"{name}\"")
    }

    /// Preset band level.
    pub fn band_level(preset: u8, band: u8, level: i8) -> String {
        format!("EP{preset}B{band}L{level}")
    }

    /// Preset query.
    pub fn query(preset: u8) -> String {
        format!("QEP{preset}")
    }
}

/// Front panel commands.
pub mod front_panel {
    /// Display brightness.
    pub fn brightness(brightness: u8) -> String {
        format!("FPB{brightness}")
    }

    /// Locked flag.
    pub fn locked(locked: bool) -> String {
        format!("FPL{}", u8::from(locked))
    }

    /// Brightness query.
    pub fn query_brightness() -> String {
        "QFPB".to_string()
    }

    /// Locked query.
    pub fn query_locked() -> String {
        "QFPL".to_string()
    }
}

/// Network commands.
pub mod network {
    use std::net::IpAddr;

    /// Network query.
    pub fn query() -> String {
        "QE".to_string()
    }

    /// DHCPv4 enabled flag.
    pub fn dhcp(enabled: bool) -> String {
        format!("DHCP{}", u8::from(enabled))
    }

    /// Control4 SDDP enabled flag.
    pub fn sddp(enabled: bool) -> String {
        format!("SDDP{}", u8::from(enabled))
    }

    /// Host address report.
    pub fn address(address: IpAddr) -> String {
        format!("IP{address}")
    }

    /// Netmask report.
    pub fn netmask(netmask: IpAddr) -> String {
        format!("NM{netmask}")
    }

    /// Default router report.
    pub fn router(router: IpAddr) -> String {
        format!("GW{router}")
    }

    /// EUI-48 report, octets dash-separated.
    pub fn mac(mac: &[u8; 6]) -> String {
        format!(
            "MAC{:02X}-{:02X}-{:02X}-{:02X}-{:02X}-{:02X}",
            mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
        )
    }

    /// Parses a dash-separated EUI-48 report back into octets.
    pub fn parse_mac(text: &str) -> Option<[u8; 6]> {
        let mut octets = [0u8; 6];
        let mut parts = text.split('-');
        for octet in octets.iter_mut() {
            *octet = u8::from_str_radix(parts.next()?, 16).ok()?;
        }
        parts.next().is_none().then_some(octets)
    }
}

/// Infrared commands.
pub mod infrared {
    /// Remote control disabled flag.
    pub fn disabled(disabled: bool) -> String {
        format!("IRD{}", u8::from(disabled))
    }

    /// Infrared query.
    pub fn query() -> String {
        "QIRD".to_string()
    }
}

/// Configuration commands.
pub mod configuration {
    /// Query the current configuration.
    pub fn query_current() -> String {
        "QX".to_string()
    }

    /// Save the current configuration to backup.
    pub fn save_to_backup() -> String {
        "SX".to_string()
    }

    /// Periodic notification emitted while the hardware writes flash.
    pub fn saving_to_backup() -> String {
        "BX".to_string()
    }

    /// Load the configuration from backup.
    pub fn load_from_backup() -> String {
        "LX".to_string()
    }

    /// Reset the configuration to factory defaults.
    pub fn reset_to_defaults() -> String {
        "RX".to_string()
    }
}
