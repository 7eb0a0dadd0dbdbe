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

//! The static command regex table.
//!
//! One compiled regular expression per command or notification, matched
//! against a complete frame in table order with first match winning.
//! Ordering matters for the handful of prefix-overlapping entries: the
//! equalizer-preset query (`QEP…`) must precede the network query (`QE`),
//! and the exact-literal configuration commands come last so a quoted
//! name can never shadow them.

use crate::{ProtocolError, ProtocolResult};
use regex::Regex;
use std::sync::LazyLock;

/// Identity of a command or notification in the wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    // Zones
    ZoneBalance,
    ZoneEqualizerBandLevel,
    ZoneHighpass,
    ZoneLowpass,
    ZoneEqualizerPreset,
    ZoneSoundMode,
    ZoneToggleMute,
    ZoneMute,
    ZoneName,
    ZoneQuery,
    ZoneSource,
    ZoneSourceAll,
    ZoneTone,
    ZoneVolume,
    ZoneVolumeAll,
    ZoneVolumeFixed,
    // Groups
    GroupName,
    GroupQuery,
    GroupAddZone,
    GroupRemoveZone,
    GroupSource,
    // Sources
    SourceName,
    SourceQuery,
    // Favorites
    FavoriteName,
    FavoriteQuery,
    // Equalizer presets
    EqualizerPresetName,
    EqualizerPresetBandLevel,
    EqualizerPresetQuery,
    // Front panel
    FrontPanelQueryBrightness,
    FrontPanelQueryLocked,
    FrontPanelBrightness,
    FrontPanelLocked,
    // Network
    NetworkDhcp,
    NetworkSddp,
    NetworkMac,
    NetworkAddress,
    NetworkNetmask,
    NetworkRouter,
    NetworkQuery,
    // Infrared
    InfraredQuery,
    InfraredDisabled,
    // Configuration
    ConfigurationQuery,
    ConfigurationSave,
    ConfigurationSaving,
    ConfigurationLoad,
    ConfigurationReset,
}

/// A compiled command pattern with its expected capture count (whole
/// match included).
pub struct Pattern {
    /// The command this pattern recognizes.
    pub kind: CommandKind,
    /// Compiled regular expression.
    pub regex: Regex,
    /// Expected number of captures, counting the whole match.
    pub captures: usize,
}

macro_rules! patterns {
    ($(($kind:ident, $regex:literal, $captures:literal)),+ $(,)?) => {
        vec![
            $(Pattern {
                kind: CommandKind::$kind,
                regex: Regex::new($regex).expect("command table regex"),
                captures: $captures,
            }),+
        ]
    };
}

static COMMAND_TABLE: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    patterns![
        // Zones
        (ZoneBalance, r#"BO([[:digit:]]+)([RL])([[:digit:]]+)"#, 4),
        (ZoneEqualizerBandLevel, r#"EO([[:digit:]]+)B([[:digit:]]+)L(-?[[:digit:]]+)"#, 4),
        (ZoneHighpass, r#"EO([[:digit:]]+)HP([[:digit:]]+)"#, 3),
        (ZoneLowpass, r#"EO([[:digit:]]+)LP([[:digit:]]+)"#, 3),
        (ZoneEqualizerPreset, r#"EO([[:digit:]]+)P([[:digit:]]+)"#, 3),
        (ZoneSoundMode, r#"EO([[:digit:]]+)M([[:digit:]]+)"#, 3),
        (ZoneToggleMute, r#"VMTO([[:digit:]]+)"#, 2),
        (ZoneMute, r#"V(U?M)O([[:digit:]]+)"#, 3),
        (ZoneName, r#"NO([[:digit:]]+)"([[:print:]]+)""#, 3),
        (ZoneQuery, r#"QO([[:digit:]]+)"#, 2),
        (ZoneSource, r#"CO([[:digit:]]+)I([[:digit:]]+)"#, 3),
        (ZoneSourceAll, r#"CXI([[:digit:]]+)"#, 2),
        (ZoneTone, r#"TO([[:digit:]]+)B(-?[[:digit:]]+)T(-?[[:digit:]]+)"#, 4),
        (ZoneVolume, r#"VO([[:digit:]]+)R(-?[[:digit:]]+)"#, 3),
        (ZoneVolumeAll, r#"VXR(-?[[:digit:]]+)"#, 2),
        (ZoneVolumeFixed, r#"VO([[:digit:]]+)F([01])"#, 3),
        // Groups
        (GroupName, r#"NG([[:digit:]]+)"([[:print:]]+)""#, 3),
        (GroupQuery, r#"QG([[:digit:]]+)"#, 2),
        (GroupAddZone, r#"AG([[:digit:]]+)O([[:digit:]]+)"#, 3),
        (GroupRemoveZone, r#"RG([[:digit:]]+)O([[:digit:]]+)"#, 3),
        (GroupSource, r#"CG([[:digit:]]+)I([[:digit:]]+)"#, 3),
        // Sources
        (SourceName, r#"NI([[:digit:]]+)"([[:print:]]+)""#, 3),
        (SourceQuery, r#"QI([[:digit:]]+)"#, 2),
        // Favorites
        (FavoriteName, r#"NF([[:digit:]]+)"([[:print:]]+)""#, 3),
        (FavoriteQuery, r#"QF([[:digit:]]+)"#, 2),
        // Equalizer presets
        (EqualizerPresetName, r#"NEP([[:digit:]]+)"([[:print:]]+)""#, 3),
        (EqualizerPresetBandLevel, r#"EP([[:digit:]]+)B([[:digit:]]+)L(-?[[:digit:]]+)"#, 4),
        (EqualizerPresetQuery, r#"QEP([[:digit:]]+)"#, 2),
        // Front panel
        (FrontPanelQueryBrightness, r#"QFPB"#, 1),
        (FrontPanelQueryLocked, r#"QFPL"#, 1),
        (FrontPanelBrightness, r#"FPB([[:digit:]]+)"#, 2),
        (FrontPanelLocked, r#"FPL([01])"#, 2),
        // Network
        (NetworkDhcp, r#"DHCP([01])"#, 2),
        (NetworkSddp, r#"SDDP([01])"#, 2),
        (NetworkMac, r#"MAC((?:[0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2})"#, 2),
        (NetworkAddress, r#"IP([0-9A-Fa-f:.]+)"#, 2),
        (NetworkNetmask, r#"NM([0-9A-Fa-f:.]+)"#, 2),
        (NetworkRouter, r#"GW([0-9A-Fa-f:.]+)"#, 2),
        (NetworkQuery, r#"QE"#, 1),
        // Infrared
        (InfraredQuery, r#"QIRD"#, 1),
        (InfraredDisabled, r#"IRD([01])"#, 2),
        // Configuration
        (ConfigurationQuery, r#"QX"#, 1),
        (ConfigurationSave, r#"SX"#, 1),
        (ConfigurationSaving, r#"BX"#, 1),
        (ConfigurationLoad, r#"LX"#, 1),
        (ConfigurationReset, r#"RX"#, 1),
    ]
});

/// Returns the full command table in match order.
pub fn command_table() -> &'static [Pattern] {
    &COMMAND_TABLE
}

/// Returns the pattern for a specific command.
pub fn pattern(kind: CommandKind) -> &'static Pattern {
    COMMAND_TABLE
        .iter()
        .find(|pattern| pattern.kind == kind)
        .expect("every kind has a table entry")
}

/// A successful match of a frame against the command table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    /// The matched command.
    pub kind: CommandKind,
    /// Captures, index 0 being the whole match.
    pub captures: Vec<String>,
}

impl CommandMatch {
    /// Returns capture `index` as a string slice.
    pub fn capture(&self, index: usize) -> ProtocolResult<&str> {
        self.captures
            .get(index)
            .map(String::as_str)
            .ok_or(ProtocolError::MalformedCapture { index })
    }

    /// Decodes capture `index` as an unsigned identifier.
    pub fn identifier(&self, index: usize) -> ProtocolResult<u8> {
        self.capture(index)?
            .parse()
            .map_err(|_| ProtocolError::MalformedCapture { index })
    }

    /// Decodes capture `index` as a signed level.
    pub fn level(&self, index: usize) -> ProtocolResult<i8> {
        self.capture(index)?
            .parse()
            .map_err(|_| ProtocolError::MalformedCapture { index })
    }

    /// Decodes capture `index` as a frequency in Hz.
    pub fn frequency(&self, index: usize) -> ProtocolResult<u16> {
        self.capture(index)?
            .parse()
            .map_err(|_| ProtocolError::MalformedCapture { index })
    }

    /// Decodes capture `index` as a `0`/`1` flag.
    pub fn flag(&self, index: usize) -> ProtocolResult<bool> {
        match self.capture(index)? {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(ProtocolError::MalformedCapture { index }),
        }
    }
}

/// Matches a frame against the table in registration order.
///
/// Returns `None` when no entry matches, in which case the dispatcher
/// answers with the protocol error response.
pub fn match_frame(frame: &[u8]) -> Option<CommandMatch> {
    let text = std::str::from_utf8(frame).ok()?;

    for pattern in COMMAND_TABLE.iter() {
        if let Some(captures) = pattern.regex.captures(text) {
            let captures = captures
                .iter()
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect();
            return Some(CommandMatch {
                kind: pattern.kind,
                captures,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(frame: &[u8]) -> CommandMatch {
        match_frame(frame).expect("frame should match")
    }

    #[test]
    fn test_zone_volume() {
        let m = matched(b"[VO3R-25]");
        assert_eq!(m.kind, CommandKind::ZoneVolume);
        assert_eq!(m.identifier(1).unwrap(), 3);
        assert_eq!(m.level(2).unwrap(), -25);
    }

    #[test]
    fn test_zone_balance() {
        let m = matched(b"[BO2L15]");
        assert_eq!(m.kind, CommandKind::ZoneBalance);
        assert_eq!(m.identifier(1).unwrap(), 2);
        assert_eq!(m.capture(2).unwrap(), "L");
        assert_eq!(m.identifier(3).unwrap(), 15);
    }

    #[test]
    fn test_zone_mute_and_unmute() {
        let m = matched(b"[VMO4]");
        assert_eq!(m.kind, CommandKind::ZoneMute);
        assert_eq!(m.capture(1).unwrap(), "M");
        assert_eq!(m.identifier(2).unwrap(), 4);

        let m = matched(b"[VUMO4]");
        assert_eq!(m.kind, CommandKind::ZoneMute);
        assert_eq!(m.capture(1).unwrap(), "UM");
    }

    #[test]
    fn test_zone_toggle_mute_beats_mute() {
        let m = matched(b"[VMTO7]");
        assert_eq!(m.kind, CommandKind::ZoneToggleMute);
        assert_eq!(m.identifier(1).unwrap(), 7);
    }

    #[test]
    fn test_zone_equalizer_family_disambiguation() {
        assert_eq!(matched(b"[EO1B5L-3]").kind, CommandKind::ZoneEqualizerBandLevel);
        assert_eq!(matched(b"[EO1HP200]").kind, CommandKind::ZoneHighpass);
        assert_eq!(matched(b"[EO1LP100]").kind, CommandKind::ZoneLowpass);
        assert_eq!(matched(b"[EO1P3]").kind, CommandKind::ZoneEqualizerPreset);
        assert_eq!(matched(b"[EO1M2]").kind, CommandKind::ZoneSoundMode);
    }

    #[test]
    fn test_zone_name_and_query() {
        let m = matched(b"[NO7\"Kitchen\"]");
        assert_eq!(m.kind, CommandKind::ZoneName);
        assert_eq!(m.identifier(1).unwrap(), 7);
        assert_eq!(m.capture(2).unwrap(), "Kitchen");

        assert_eq!(matched(b"[QO7]").kind, CommandKind::ZoneQuery);
    }

    #[test]
    fn test_zone_tone_signed_levels() {
        let m = matched(b"[TO2B-5T10]");
        assert_eq!(m.kind, CommandKind::ZoneTone);
        assert_eq!(m.level(2).unwrap(), -5);
        assert_eq!(m.level(3).unwrap(), 10);
    }

    #[test]
    fn test_zone_all_forms() {
        assert_eq!(matched(b"[VXR-40]").kind, CommandKind::ZoneVolumeAll);
        assert_eq!(matched(b"[CXI5]").kind, CommandKind::ZoneSourceAll);
    }

    #[test]
    fn test_zone_volume_fixed() {
        let m = matched(b"[VO9F1]");
        assert_eq!(m.kind, CommandKind::ZoneVolumeFixed);
        assert!(m.flag(2).unwrap());
    }

    #[test]
    fn test_group_vocabulary() {
        assert_eq!(matched(b"[NG2\"Upstairs\"]").kind, CommandKind::GroupName);
        assert_eq!(matched(b"[QG2]").kind, CommandKind::GroupQuery);
        assert_eq!(matched(b"[AG2O5]").kind, CommandKind::GroupAddZone);
        assert_eq!(matched(b"[RG2O5]").kind, CommandKind::GroupRemoveZone);
        assert_eq!(matched(b"[CG2I3]").kind, CommandKind::GroupSource);
    }

    #[test]
    fn test_source_and_favorite_vocabulary() {
        assert_eq!(matched(b"[NI3\"Tuner\"]").kind, CommandKind::SourceName);
        assert_eq!(matched(b"[QI3]").kind, CommandKind::SourceQuery);
        assert_eq!(matched(b"[NF1\"Morning\"]").kind, CommandKind::FavoriteName);
        assert_eq!(matched(b"[QF1]").kind, CommandKind::FavoriteQuery);
    }

    #[test]
    fn test_equalizer_preset_vocabulary() {
        assert_eq!(matched(b"[NEP4\"Rock\"]").kind, CommandKind::EqualizerPresetName);
        let m = matched(b"[EP4B10L7]");
        assert_eq!(m.kind, CommandKind::EqualizerPresetBandLevel);
        assert_eq!(m.identifier(2).unwrap(), 10);
        assert_eq!(m.level(3).unwrap(), 7);
    }

    #[test]
    fn test_preset_query_beats_network_query() {
        // "QEP1" contains "QE"; table order must pick the preset query.
        assert_eq!(matched(b"[QEP1]").kind, CommandKind::EqualizerPresetQuery);
        assert_eq!(matched(b"[QE]").kind, CommandKind::NetworkQuery);
    }

    #[test]
    fn test_front_panel_vocabulary() {
        assert_eq!(matched(b"[QFPB]").kind, CommandKind::FrontPanelQueryBrightness);
        assert_eq!(matched(b"[QFPL]").kind, CommandKind::FrontPanelQueryLocked);
        assert_eq!(matched(b"(FPB2)").kind, CommandKind::FrontPanelBrightness);
        assert_eq!(matched(b"(FPL1)").kind, CommandKind::FrontPanelLocked);
    }

    #[test]
    fn test_network_vocabulary() {
        assert_eq!(matched(b"(DHCP1)").kind, CommandKind::NetworkDhcp);
        assert_eq!(matched(b"(SDDP0)").kind, CommandKind::NetworkSddp);
        assert_eq!(matched(b"(IP192.168.1.48)").kind, CommandKind::NetworkAddress);
        assert_eq!(matched(b"(NM255.255.255.0)").kind, CommandKind::NetworkNetmask);
        assert_eq!(matched(b"(GW192.168.1.1)").kind, CommandKind::NetworkRouter);

        let m = matched(b"(MAC00-50-C2-D9-02-17)");
        assert_eq!(m.kind, CommandKind::NetworkMac);
        assert_eq!(m.capture(1).unwrap(), "00-50-C2-D9-02-17");
    }

    #[test]
    fn test_infrared_vocabulary() {
        assert_eq!(matched(b"[QIRD]").kind, CommandKind::InfraredQuery);
        assert_eq!(matched(b"(IRD1)").kind, CommandKind::InfraredDisabled);
    }

    #[test]
    fn test_configuration_vocabulary() {
        assert_eq!(matched(b"[QX]").kind, CommandKind::ConfigurationQuery);
        assert_eq!(matched(b"[SX]").kind, CommandKind::ConfigurationSave);
        assert_eq!(matched(b"(BX)").kind, CommandKind::ConfigurationSaving);
        assert_eq!(matched(b"[LX]").kind, CommandKind::ConfigurationLoad);
        assert_eq!(matched(b"[RX]").kind, CommandKind::ConfigurationReset);
    }

    #[test]
    fn test_quoted_name_shadows_literals() {
        // A zone rename whose text contains "QX" must match as a name, not
        // as the configuration query.
        assert_eq!(matched(b"[NO1\"QX ROOM\"]").kind, CommandKind::ZoneName);
    }

    #[test]
    fn test_unknown_command() {
        assert!(match_frame(b"[ZZZ]").is_none());
    }

    #[test]
    fn test_expected_capture_counts() {
        for pattern in command_table() {
            assert_eq!(
                pattern.regex.captures_len(),
                pattern.captures,
                "capture count mismatch for {:?}",
                pattern.kind
            );
        }
    }

    #[test]
    fn test_pattern_lookup() {
        assert_eq!(pattern(CommandKind::ZoneVolume).captures, 3);
        assert_eq!(pattern(CommandKind::ConfigurationQuery).captures, 1);
    }
}
