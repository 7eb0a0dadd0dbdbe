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

//! # HLX Telnet Envelope Codec
//!
//! The HLX hardware carries its command protocol inside a plain Telnet
//! (RFC 854) byte stream on port 23. No Telnet options are negotiated in
//! either direction; the envelope exists solely so that stock Telnet
//! clients can talk to the hardware.
//!
//! This crate provides [`TelnetCodec`], a [`tokio_util::codec`] decoder and
//! encoder that:
//!
//! - strips IAC command and negotiation sequences from the inbound stream,
//!   yielding only application bytes;
//! - refuses every option the peer tries to negotiate (`DO` is answered
//!   with `WONT`, `WILL` with `DONT`) and discards subnegotiation payloads;
//! - escapes literal `0xFF` bytes on the outbound path by doubling the IAC.
//!
//! Refusals generated during decode are queued inside the codec; the
//! connection layer drains them with [`TelnetCodec::take_pending`] and
//! writes them back as [`TelnetItem::Raw`] so they bypass IAC escaping.

mod codec;
mod consts;
mod result;

pub use self::codec::{TelnetCodec, TelnetItem};
pub use self::result::{CodecError, CodecResult};
