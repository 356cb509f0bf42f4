//! Door controller board wire protocol
//!
//! The board accepts fixed-length binary frames over a 9600 baud serial link.
//! Only two commands are used:
//!
//! | Frame   | Bytes 0-3          | Bytes 4-29  |
//! |---------|--------------------|-------------|
//! | Init    | `7F 7F 0A 01`      | zero-filled |
//! | Open(N) | `7F (40+N) 06 0F`  | zero-filled |

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

/// Length of every frame sent to the board
pub const FRAME_LEN: usize = 30;

/// Prefix of the handshake frame that readies the board
pub const INIT_PREFIX: [u8; 4] = [0x7F, 0x7F, 0x0A, 0x01];

/// Prefix of the open frame before the door id is added
pub const OPEN_PREFIX: [u8; 4] = [0x7F, 0x40, 0x06, 0x0F];

/// Position of the door address byte inside [`OPEN_PREFIX`]
pub const OPEN_ADDRESS_OFFSET: usize = 1;

/// A single fixed-length command frame
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Raw bytes of the frame, always [`FRAME_LEN`] long
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Space separated upper-case hex of the whole frame, for logging
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[{}]", self.to_hex())
    }
}

/// Build a frame from an opcode prefix, zero-padding to [`FRAME_LEN`].
///
/// Prefixes are protocol constants and never exceed the frame length; a longer
/// prefix is a programming error and is truncated in release builds.
pub fn encode_frame(prefix: &[u8]) -> Frame {
    debug_assert!(
        prefix.len() <= FRAME_LEN,
        "prefix of {} bytes exceeds frame length",
        prefix.len()
    );

    let mut bytes = [0u8; FRAME_LEN];
    let len = prefix.len().min(FRAME_LEN);
    bytes[..len].copy_from_slice(&prefix[..len]);
    Frame(bytes)
}

/// Render bytes as space separated upper-case hex
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // write! to String is infallible
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

/// Door selector sent in the open frame
///
/// Any non-negative integer is accepted. Only the low byte reaches the wire and
/// the addition to the `0x40` base wraps, so ids of `0xC0` and above alias
/// lower addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoorId(pub u32);

impl DoorId {
    /// Address byte written at [`OPEN_ADDRESS_OFFSET`]
    pub fn address_byte(self) -> u8 {
        OPEN_PREFIX[OPEN_ADDRESS_OFFSET].wrapping_add(self.0 as u8)
    }

    /// Parse a door id from a request path segment, falling back to door 0
    ///
    /// Values wider than 32 bits keep their low bits, so the address byte
    /// always follows the low byte of the number given.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim()
            .parse::<u64>()
            .map(|id| DoorId(id as u32))
            .unwrap_or_default()
    }
}

impl From<u32> for DoorId {
    fn from(id: u32) -> Self {
        DoorId(id)
    }
}

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DoorId {
    type Err = crate::EltisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>().map(DoorId).map_err(|e| {
            crate::EltisError::InvalidInput(format!("Invalid door id '{}': {}", s, e))
        })
    }
}

/// Commands understood by the door controller board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reset/ready the board, sent once before any door command
    Init,
    /// Release the given door
    Open(DoorId),
}

impl Command {
    /// Opcode prefix for this command
    pub fn prefix(&self) -> [u8; 4] {
        match self {
            Command::Init => INIT_PREFIX,
            Command::Open(door) => {
                let mut prefix = OPEN_PREFIX;
                prefix[OPEN_ADDRESS_OFFSET] = door.address_byte();
                prefix
            }
        }
    }

    /// Full zero-padded frame for this command
    pub fn encode(&self) -> Frame {
        encode_frame(&self.prefix())
    }
}
