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

//! # HLX Data Model
//!
//! Typed in-memory mirrors of the entities an HLX manages: zones, groups,
//! sources, favorites, equalizer presets, the front panel, the network
//! interface, the infrared receiver.
//!
//! Every setter validates its argument and reports one of three outcomes:
//!
//! - `Ok(Change::Changed)` - the model was mutated; callers emit exactly
//!   one state-change notification;
//! - `Ok(Change::Unchanged)` - the value was already set; the model is
//!   bit-identical and no notification is owed;
//! - `Err(ModelError)` - the argument was rejected; the model is
//!   untouched.
//!
//! The unchanged case is the protocol's de-duplication point: a wire
//! notification that matches current state must not echo back out as a
//! fresh state change.

mod balance;
mod collection;
mod crossover;
mod equalizer;
mod error;
mod favorite;
mod front_panel;
mod group;
mod identifier;
mod identifiers;
mod infrared;
mod name;
mod network;
mod sound;
mod source;
mod tone;
mod volume;
mod zone;

pub use self::balance::{BALANCE_CENTER, BALANCE_MAX, BalanceModel};
pub use self::collection::EntityCollection;
pub use self::crossover::{CrossoverModel, FREQUENCY_MAX, FREQUENCY_MIN};
pub use self::equalizer::{
    EQUALIZER_BAND_FREQUENCIES, EQUALIZER_BANDS_MAX, EQUALIZER_LEVEL_FLAT, EQUALIZER_LEVEL_MAX,
    EQUALIZER_LEVEL_MIN, EQUALIZER_PRESETS_MAX, EqualizerBandModel, EqualizerBandsModel,
    EqualizerPresetModel,
};
pub use self::error::{Change, ModelError, ModelResult};
pub use self::favorite::{FAVORITES_MAX, FavoriteModel};
pub use self::front_panel::{BRIGHTNESS_MAX, BRIGHTNESS_MIN, FrontPanelModel};
pub use self::group::{GROUPS_MAX, GroupModel};
pub use self::identifier::{IDENTIFIER_INVALID, IDENTIFIER_MIN, Identifier, validate_identifier};
pub use self::identifiers::IdentifiersCollection;
pub use self::infrared::InfraredModel;
pub use self::name::{NAME_LENGTH_MAX, Name};
pub use self::network::NetworkModel;
pub use self::sound::{ChannelMode, SoundMode, SoundModel};
pub use self::source::{SOURCES_MAX, SourceModel};
pub use self::tone::{TONE_LEVEL_FLAT, TONE_LEVEL_MAX, TONE_LEVEL_MIN, ToneModel};
pub use self::volume::{VOLUME_LEVEL_MAX, VOLUME_LEVEL_MIN, VolumeModel};
pub use self::zone::{ZONES_MAX, ZoneModel};
