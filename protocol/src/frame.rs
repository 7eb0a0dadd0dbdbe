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

//! Bracket framing for the HLX wire protocol.
//!
//! Requests travel as `[body]`, responses and notifications as `(body)`.
//! Dispatch splits the inbound stream at each terminator byte: `]` when
//! receiving requests (server role), `)` when receiving responses (client
//! role). A partial frame at the tail of the buffer is left unconsumed
//! for the next pass.

use bytes::Bytes;

/// Opening byte of a request frame.
pub const REQUEST_BEGIN: u8 = b'[';
/// Terminating byte of a request frame; the server-role dispatch boundary.
pub const REQUEST_END: u8 = b']';
/// Opening byte of a response frame.
pub const RESPONSE_BEGIN: u8 = b'(';
/// Terminating byte of a response frame; the client-role dispatch boundary.
pub const RESPONSE_END: u8 = b')';

/// Minimum size of a dispatchable frame: one opener, one payload byte,
/// one terminator.
pub const FRAME_SIZE_MIN: usize = 3;

/// The protocol-defined error response sent when no command matches.
pub const ERROR_RESPONSE: &[u8] = b"(ERROR)";

/// Encloses a command body in request brackets.
pub fn request(body: &str) -> Bytes {
    Bytes::from(format!("[{body}]"))
}

/// Encloses a command body in response brackets.
pub fn response(body: &str) -> Bytes {
    Bytes::from(format!("({body})"))
}

/// Splits `buf` into complete frames at each `terminator`.
///
/// Returns the frame slices - each spanning from the previous boundary
/// through the terminator inclusive - and the total number of bytes
/// consumed. Nothing is consumed until the buffer holds at least
/// [`FRAME_SIZE_MIN`] bytes; a trailing partial frame is left for the
/// next pass.
pub fn scan(buf: &[u8], terminator: u8) -> (Vec<&[u8]>, usize) {
    let mut frames = Vec::new();
    let mut start = 0;

    if buf.len() < FRAME_SIZE_MIN {
        return (frames, 0);
    }

    while let Some(offset) = buf[start..].iter().position(|&b| b == terminator) {
        let end = start + offset + 1;
        frames.push(&buf[start..end]);
        start = end;
    }

    (frames, start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_response_enclosure() {
        assert_eq!(&request("QX")[..], b"[QX]");
        assert_eq!(&response("VO3R-25")[..], b"(VO3R-25)");
    }

    #[test]
    fn test_scan_single_frame() {
        let (frames, consumed) = scan(b"[QX]", REQUEST_END);
        assert_eq!(frames, vec![&b"[QX]"[..]]);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_scan_multiple_frames() {
        let (frames, consumed) = scan(b"[VO3R-25][QO3]", REQUEST_END);
        assert_eq!(frames, vec![&b"[VO3R-25]"[..], &b"[QO3]"[..]]);
        assert_eq!(consumed, 14);
    }

    #[test]
    fn test_scan_partial_tail_retained() {
        let (frames, consumed) = scan(b"[QX][VO3", REQUEST_END);
        assert_eq!(frames, vec![&b"[QX]"[..]]);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_scan_below_minimum_consumes_nothing() {
        let (frames, consumed) = scan(b"[]", REQUEST_END);
        assert!(frames.is_empty());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_scan_response_boundary() {
        let (frames, consumed) = scan(b"(VO3R-25)(QO3)(", RESPONSE_END);
        assert_eq!(frames, vec![&b"(VO3R-25)"[..], &b"(QO3)"[..]]);
        assert_eq!(consumed, 14);
    }

    #[test]
    fn test_scan_no_terminator() {
        let (frames, consumed) = scan(b"telnet_client_1: connected\r\n", REQUEST_END);
        assert!(frames.is_empty());
        assert_eq!(consumed, 0);
    }
}
