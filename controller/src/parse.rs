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

//! Capture decoding shared across families.
//!
//! Several families share capture shapes - every name command is
//! `<prefix><id>"<text>"`, every band level is `<prefix><id>B<band>L<level>`
//! - so the decoding routines live here as free functions rather than on
//! any one controller.

use crate::{ControllerError, ControllerResult};
use hlx_model::{Identifier, SoundMode};
use hlx_protocol::{CommandMatch, ProtocolError};
use std::net::IpAddr;

/// `<id>` at capture 1.
pub fn single_id(m: &CommandMatch) -> ControllerResult<Identifier> {
    Ok(m.identifier(1)?)
}

/// `<id>` and a second identifier, as in source routing and group
/// membership commands.
pub fn id_pair(m: &CommandMatch) -> ControllerResult<(Identifier, Identifier)> {
    Ok((m.identifier(1)?, m.identifier(2)?))
}

/// `<id>` and a signed level, as in the volume command.
pub fn id_level(m: &CommandMatch) -> ControllerResult<(Identifier, i8)> {
    Ok((m.identifier(1)?, m.level(2)?))
}

/// A bare signed level, as in the all-zones volume command.
pub fn level(m: &CommandMatch) -> ControllerResult<i8> {
    Ok(m.level(1)?)
}

/// `<id>` and a `0`/`1` flag, as in the volume-fixed command.
pub fn id_flag(m: &CommandMatch) -> ControllerResult<(Identifier, bool)> {
    Ok((m.identifier(1)?, m.flag(2)?))
}

/// A bare `0`/`1` flag, as in the front panel, network and infrared
/// flag commands.
pub fn flag(m: &CommandMatch) -> ControllerResult<bool> {
    Ok(m.flag(1)?)
}

/// `<id>` and a quoted name.
pub fn named(m: &CommandMatch) -> ControllerResult<(Identifier, String)> {
    Ok((m.identifier(1)?, m.capture(2)?.to_string()))
}

/// `<id>`, band identifier and signed band level.
pub fn band_level(m: &CommandMatch) -> ControllerResult<(Identifier, Identifier, i8)> {
    Ok((m.identifier(1)?, m.identifier(2)?, m.level(3)?))
}

/// `<id>` and a crossover frequency.
pub fn id_frequency(m: &CommandMatch) -> ControllerResult<(Identifier, u16)> {
    Ok((m.identifier(1)?, m.frequency(2)?))
}

/// `<id>`, bass and treble levels.
pub fn tone(m: &CommandMatch) -> ControllerResult<(Identifier, i8, i8)> {
    Ok((m.identifier(1)?, m.level(2)?, m.level(3)?))
}

/// Zone balance: channel letter and magnitude back to a signed offset;
/// `L` is negative.
pub fn balance(m: &CommandMatch) -> ControllerResult<(Identifier, i8)> {
    let zone = m.identifier(1)?;
    let channel = m.capture(2)?;
    let magnitude: i16 = m
        .capture(3)?
        .parse()
        .map_err(|_| ProtocolError::MalformedCapture { index: 3 })?;

    let signed = match channel {
        "L" => -magnitude,
        "R" => magnitude,
        _ => return Err(ProtocolError::MalformedCapture { index: 2 }.into()),
    };

    let balance =
        i8::try_from(signed).map_err(|_| ProtocolError::MalformedCapture { index: 3 })?;
    Ok((zone, balance))
}

/// Zone mute: `M` mutes, `UM` unmutes.
pub fn mute(m: &CommandMatch) -> ControllerResult<(Identifier, bool)> {
    let muted = match m.capture(1)? {
        "M" => true,
        "UM" => false,
        _ => return Err(ProtocolError::MalformedCapture { index: 1 }.into()),
    };
    Ok((m.identifier(2)?, muted))
}

/// `<id>` and a sound mode ordinal.
pub fn sound_mode(m: &CommandMatch) -> ControllerResult<(Identifier, SoundMode)> {
    let zone = m.identifier(1)?;
    let ordinal = m.identifier(2)?;
    let mode = SoundMode::from_wire(ordinal).map_err(ControllerError::Model)?;
    Ok((zone, mode))
}

/// A front panel brightness ordinal.
pub fn brightness(m: &CommandMatch) -> ControllerResult<u8> {
    Ok(m.identifier(1)?)
}

/// A reported IP address.
pub fn ip(m: &CommandMatch) -> ControllerResult<IpAddr> {
    m.capture(1)?
        .parse()
        .map_err(|_| ProtocolError::MalformedCapture { index: 1 }.into())
}

/// A dash-separated EUI-48.
pub fn mac(m: &CommandMatch) -> ControllerResult<[u8; 6]> {
    hlx_protocol::command::network::parse_mac(m.capture(1)?)
        .ok_or_else(|| ProtocolError::MalformedCapture { index: 1 }.into())
}
