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

//! # HLX Command Protocol
//!
//! The HLX speaks a proprietary ASCII line-oriented command protocol.
//! Requests are enclosed in square brackets (`[QX]`), responses and
//! unsolicited notifications in parentheses (`(QX)`); in most cases a
//! response mirrors its request literally. Frame dispatch is driven by a
//! terminator scanner - `]` on the server side, `)` on the client side -
//! with a three-byte minimum frame.
//!
//! This crate provides:
//!
//! - [`ConnectionBuffer`]: the growable byte buffer used to accumulate
//!   inbound wire data between dispatch passes;
//! - [`frame`]: bracket framing and the terminator scanner;
//! - [`CommandKind`] and the compiled [`command_table`]: one regular
//!   expression per command or notification, matched in registration
//!   order, first match wins;
//! - [`command`]: typed formatting of every request/response body and
//!   capture decoding helpers.

mod buffer;
pub mod command;
mod error;
pub mod frame;
mod table;

pub use self::buffer::ConnectionBuffer;
pub use self::error::{ProtocolError, ProtocolResult};
pub use self::table::{CommandKind, CommandMatch, Pattern, command_table, match_frame, pattern};
