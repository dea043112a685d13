//! Types describing the Wayland protocol vocabulary.
//!
//! The message schemas are known statically: every interface this crate
//! speaks is described once, by hand, in [`crate::interfaces`], as a pair of
//! opcode-ordered request and event lists. The codec consults these
//! descriptors by position; renaming a field is a non-change, reordering one
//! is a protocol break.

use std::fmt;

/// The object id of the `wl_display` singleton, fixed by the protocol.
pub const DISPLAY_ID: u32 = 1;

/// Whether a message travels client-to-server or server-to-client.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Client to server.
    Request,
    /// Server to client.
    Event,
}

/// Enum of possible argument types as recognized by the wire.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ArgumentType {
    /// A signed integer argument, one word.
    Int,
    /// An unsigned integer argument, one word.
    Uint,
    /// An unsigned word interpreted against a protocol enum.
    Enum,
    /// An unsigned word interpreted as a fixed-layout bitset.
    Bitfield,
    /// A length-prefixed, NUL-terminated UTF-8 string, zero-padded to a
    /// word boundary.
    Str,
    /// Length-prefixed raw bytes, zero-padded to a word boundary.
    Array,
    /// The id of a newly created object, one word.
    NewId,
    /// The id of an existing object, one word.
    Object,
    /// A file descriptor. Occupies no space in the word stream; it travels
    /// in the message's ancillary SCM_RIGHTS block instead.
    Fd,
}

impl ArgumentType {
    /// Whether this argument occupies space in the word stream.
    pub fn on_wire(self) -> bool {
        !matches!(self, Self::Fd)
    }
}

/// Wire metadata of a given message.
#[derive(Copy, Clone, Debug)]
pub struct MessageDesc {
    /// Name of this message.
    pub name: &'static str,
    /// Argument kinds, in declaration order.
    pub signature: &'static [ArgumentType],
}

impl MessageDesc {
    /// Number of file descriptors this message carries out of band.
    pub fn fd_count(&self) -> usize {
        self.signature.iter().filter(|arg| matches!(arg, ArgumentType::Fd)).count()
    }
}

/// Description of a Wayland interface.
///
/// An interface describes the requests and events a client and a compositor
/// exchange on objects of that type. The opcode of a message is its position
/// in the corresponding list.
#[derive(Debug)]
pub struct Interface {
    /// The name of the interface, as advertised by `wl_registry.global`.
    pub name: &'static str,
    /// The version this catalog describes.
    pub version: u32,
    /// Every request this interface supports, opcode-ordered.
    pub requests: &'static [MessageDesc],
    /// Every event this interface supports, opcode-ordered.
    pub events: &'static [MessageDesc],
}

impl Interface {
    /// Number of opcodes in the given direction.
    pub fn op_count(&self, dir: Direction) -> u16 {
        match dir {
            Direction::Request => self.requests.len() as u16,
            Direction::Event => self.events.len() as u16,
        }
    }

    /// Metadata of one message, or `None` if the opcode is out of range.
    pub fn message(&self, dir: Direction, opcode: u16) -> Option<&'static MessageDesc> {
        match dir {
            Direction::Request => self.requests.get(opcode as usize),
            Direction::Event => self.events.get(opcode as usize),
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Returns true if the two interfaces are the same.
#[inline]
pub fn same_interface(a: &'static Interface, b: &'static Interface) -> bool {
    std::ptr::eq(a, b) || a.name == b.name
}

/// The fixed 8-byte header framing every message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    /// The object this message was sent on.
    pub object_id: u32,
    /// Total frame length in bytes, header included. Always a multiple of 4
    /// and at least 8.
    pub size: u16,
    /// Position of the message in its interface's request or event list.
    pub opcode: u16,
}

impl MessageHeader {
    /// Encoded size of a header.
    pub const BYTES: usize = 8;

    /// Decode a header from its wire representation.
    pub fn from_bytes(raw: [u8; Self::BYTES]) -> Self {
        let object_id = u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let word_2 = u32::from_ne_bytes([raw[4], raw[5], raw[6], raw[7]]);
        Self { object_id, size: (word_2 >> 16) as u16, opcode: (word_2 & 0x0000_FFFF) as u16 }
    }

    /// Encode this header to its wire representation.
    pub fn to_bytes(self) -> [u8; Self::BYTES] {
        let mut raw = [0; Self::BYTES];
        raw[..4].copy_from_slice(&self.object_id.to_ne_bytes());
        let word_2 = (u32::from(self.size) << 16) | u32::from(self.opcode);
        raw[4..].copy_from_slice(&word_2.to_ne_bytes());
        raw
    }
}

/// An enum value in the protocol.
///
/// Open protocol enums grow new members over time; a compositor newer than
/// this catalog may send a value the catalog does not name. Such values
/// decode as [`WEnum::Unknown`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WEnum<T> {
    /// The interpreted value.
    Value(T),
    /// A value the catalog does not name.
    Unknown(u32),
}

/// Error representing an unknown numeric variant for a [`WEnum`].
#[derive(Debug, Copy, Clone, thiserror::Error)]
#[error("unknown numeric value {value} for enum {typ}")]
pub struct WEnumError {
    typ: &'static str,
    value: u32,
}

impl<T> WEnum<T> {
    /// Convert this [`WEnum`] into a result, for callers that don't intend
    /// to handle the unknown case.
    #[inline]
    pub fn into_result(self) -> Result<T, WEnumError> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Unknown(value) => Err(WEnumError { typ: std::any::type_name::<T>(), value }),
        }
    }
}

impl<T> From<WEnum<T>> for Result<T, WEnumError> {
    fn from(me: WEnum<T>) -> Self {
        me.into_result()
    }
}

impl<T: TryFrom<u32>> From<u32> for WEnum<T> {
    /// Constructs an enum from the integer format used by the wire.
    fn from(v: u32) -> Self {
        match T::try_from(v) {
            Ok(t) => Self::Value(t),
            Err(_) => Self::Unknown(v),
        }
    }
}

impl<T: Into<u32>> From<WEnum<T>> for u32 {
    /// Converts an enum into the numerical form used by the wire.
    fn from(enu: WEnum<T>) -> u32 {
        match enu {
            WEnum::Value(t) => t.into(),
            WEnum::Unknown(u) => u,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = MessageHeader { object_id: 42, size: 20, opcode: 3 };
        assert_eq!(MessageHeader::from_bytes(header.to_bytes()), header);
    }

    #[test]
    fn header_packs_size_above_opcode() {
        let raw = MessageHeader { object_id: 1, size: 12, opcode: 0 }.to_bytes();
        let word_2 = u32::from_ne_bytes([raw[4], raw[5], raw[6], raw[7]]);
        assert_eq!(word_2, 12 << 16);
    }

    #[test]
    fn interface_identity_and_arity() {
        use crate::interfaces::{WL_DISPLAY_INTERFACE, WL_REGISTRY_INTERFACE};

        assert!(same_interface(&WL_DISPLAY_INTERFACE, &WL_DISPLAY_INTERFACE));
        assert!(!same_interface(&WL_DISPLAY_INTERFACE, &WL_REGISTRY_INTERFACE));

        assert_eq!(WL_DISPLAY_INTERFACE.op_count(Direction::Request), 2);
        assert_eq!(WL_DISPLAY_INTERFACE.op_count(Direction::Event), 2);

        // fd arguments are the only kind with no word-stream footprint
        assert!(ArgumentType::Uint.on_wire());
        assert!(ArgumentType::Str.on_wire());
        assert!(!ArgumentType::Fd.on_wire());
    }

    #[test]
    fn wenum_from_wire() {
        let known: WEnum<crate::interfaces::wl_shm::Format> = WEnum::from(1);
        assert_eq!(known, WEnum::Value(crate::interfaces::wl_shm::Format::Xrgb8888));
        let unknown: WEnum<crate::interfaces::wl_shm::Format> = WEnum::from(0xdead_beef);
        assert_eq!(unknown, WEnum::Unknown(0xdead_beef));
        assert!(unknown.into_result().is_err());
    }
}
