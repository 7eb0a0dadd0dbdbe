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

use super::{CodecError, consts};
use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// Maximum subnegotiation payload tolerated before the stream is treated
/// as corrupt. The HLX never subnegotiates, so anything near this limit is
/// garbage.
const SUBNEGOTIATION_LIMIT: usize = 1024;

/// Outbound item for the Telnet envelope encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelnetItem {
    /// Application bytes. Literal `0xFF` bytes are escaped on encode.
    Data(Bytes),
    /// Pre-formed protocol bytes (negotiation refusals). Written verbatim.
    Raw(Bytes),
}

/// Decoder state for the byte-at-a-time Telnet state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Plain application data.
    Data,
    /// An IAC was seen; the next byte selects a command.
    Command,
    /// An IAC DO/DONT/WILL/WONT was seen; the next byte is the option.
    Negotiation(u8),
    /// Inside an IAC SB ... IAC SE sequence; payload is discarded.
    Subnegotiation(usize),
    /// An IAC was seen inside a subnegotiation.
    SubnegotiationCommand(usize),
}

/// A codec for the option-less Telnet envelope the HLX hardware speaks.
///
/// Decoding yields chunks of application bytes with all IAC sequences
/// removed. Every negotiation request from the peer is answered with the
/// matching refusal, queued internally until the connection drains it with
/// [`TelnetCodec::take_pending`]. Subnegotiation payloads are discarded.
pub struct TelnetCodec {
    state: DecoderState,
    pending: BytesMut,
}

impl TelnetCodec {
    /// Creates a codec in the initial data state with no pending refusals.
    pub fn new() -> TelnetCodec {
        TelnetCodec {
            state: DecoderState::Data,
            pending: BytesMut::new(),
        }
    }

    /// Takes any protocol responses queued during decode.
    ///
    /// Returns `None` when nothing is pending. The caller must write the
    /// returned bytes as [`TelnetItem::Raw`] so they are not re-escaped.
    pub fn take_pending(&mut self) -> Option<Bytes> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.split().freeze())
        }
    }

    fn refuse(&mut self, verb: u8, option: u8) {
        let refusal = match verb {
            consts::DO => consts::WONT,
            consts::WILL => consts::DONT,
            // DONT and WONT confirm a state we never left; no reply owed.
            _ => return,
        };

        trace!(option, verb, "refusing telnet option");

        self.pending.reserve(3);
        self.pending.put_u8(consts::IAC);
        self.pending.put_u8(refusal);
        self.pending.put_u8(option);
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for TelnetCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let had_input = !src.is_empty();
        let mut data = BytesMut::with_capacity(src.len());

        while let Some(&byte) = src.first() {
            let _ = src.split_to(1);

            match self.state {
                DecoderState::Data => match byte {
                    consts::IAC => self.state = DecoderState::Command,
                    _ => data.put_u8(byte),
                },
                DecoderState::Command => match byte {
                    // IAC IAC is an escaped literal 0xFF data byte.
                    consts::IAC => {
                        data.put_u8(consts::IAC);
                        self.state = DecoderState::Data;
                    }
                    consts::DO | consts::DONT | consts::WILL | consts::WONT => {
                        self.state = DecoderState::Negotiation(byte);
                    }
                    consts::SB => {
                        self.state = DecoderState::Subnegotiation(0);
                    }
                    // NOP, GA, AYT and friends carry no payload for us.
                    _ => {
                        trace!(command = byte, "ignoring telnet command");
                        self.state = DecoderState::Data;
                    }
                },
                DecoderState::Negotiation(verb) => {
                    self.refuse(verb, byte);
                    self.state = DecoderState::Data;
                }
                DecoderState::Subnegotiation(seen) => match byte {
                    consts::IAC => self.state = DecoderState::SubnegotiationCommand(seen),
                    _ => {
                        if seen + 1 > SUBNEGOTIATION_LIMIT {
                            return Err(CodecError::SubnegotiationTooLong(SUBNEGOTIATION_LIMIT));
                        }
                        self.state = DecoderState::Subnegotiation(seen + 1);
                    }
                },
                DecoderState::SubnegotiationCommand(seen) => match byte {
                    consts::SE => self.state = DecoderState::Data,
                    // IAC IAC inside a subnegotiation is a payload byte.
                    consts::IAC => self.state = DecoderState::Subnegotiation(seen + 1),
                    _ => self.state = DecoderState::Subnegotiation(seen),
                },
            }
        }

        // An all-protocol read still yields an (empty) item so the
        // connection layer wakes up and drains the queued refusals.
        if !data.is_empty() || (had_input && !self.pending.is_empty()) {
            Ok(Some(data))
        } else {
            Ok(None)
        }
    }
}

impl Encoder<TelnetItem> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: TelnetItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            TelnetItem::Data(bytes) => {
                dst.reserve(bytes.len());
                for &byte in bytes.iter() {
                    if byte == consts::IAC {
                        dst.put_u8(consts::IAC);
                    }
                    dst.put_u8(byte);
                }
            }
            TelnetItem::Raw(bytes) => {
                dst.extend_from_slice(&bytes);
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for TelnetCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetCodec")
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .finish()
    }
}
