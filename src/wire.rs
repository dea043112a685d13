//! Encoding and decoding of typed messages against the wire format.
//!
//! Every message is a frame: an 8-byte header followed by the argument
//! payload, padded so the total length is a multiple of 4. Integers, enums,
//! bitfields and object ids occupy one host-endian word each; strings and
//! arrays are length-prefixed and zero-padded to a word boundary; file
//! descriptors occupy no payload space at all and ride the frame's ancillary
//! SCM_RIGHTS block instead.
//!
//! The typed request and event enums of [`crate::interfaces`] implement
//! [`Payload`], so [`write_message`] and [`parse_message`] work in both
//! directions for every interface. Decoded strings and arrays borrow from
//! the input buffer; when that buffer is a connection's receive buffer, the
//! views stay valid until the next [`recv`](crate::Connection::recv).

use std::mem;
use std::os::unix::io::RawFd;
use std::slice;

use smallvec::SmallVec;

use crate::protocol::{Direction, Interface, MessageHeader, WEnum};

/// Inline capacity of the per-message fd list. No catalogued message
/// carries more descriptors than this, so sending never allocates.
pub const INLINE_FDS: usize = 4;

/// File descriptors collected from or destined for a frame's ancillary
/// block, in argument order.
pub type FdList = SmallVec<[RawFd; INLINE_FDS]>;

/// Largest encodable frame: the header stores the size in 16 bits, and
/// frames are whole words.
pub const MAX_FRAME_BYTES: usize = u16::MAX as usize & !3;

/// Error generated when serializing a message into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MessageWriteError {
    /// The buffer is too small to hold the message contents.
    #[error("the provided buffer is too small to hold the message")]
    BufferTooSmall,
    /// A string argument does not fit in a 32-bit length prefix.
    #[error("a string argument is too long to be encoded")]
    StringTooLong,
    /// A string argument contains an interior NUL byte.
    #[error("a string argument contains an interior NUL byte")]
    NulInString,
    /// The message exceeds the 16-bit frame size limit.
    #[error("the message exceeds the maximum frame size")]
    FrameTooBig,
}

/// Error generated when deserializing a message from a buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageParseError {
    /// The frame ended before the signature was fully read.
    #[error("more data is needed to deserialize the message")]
    MissingData,
    /// The message content contradicts its own framing and cannot be parsed.
    #[error("the message is malformed and cannot be parsed")]
    Malformed,
    /// The header names an opcode past the interface's declared messages.
    #[error("unknown opcode {opcode} for interface {interface}")]
    UnknownOpcode {
        /// Interface the frame was decoded against.
        interface: &'static str,
        /// The out-of-range opcode.
        opcode: u16,
    },
    /// A closed protocol enum received a value it does not define.
    #[error("unknown value {value} for enum {enum_name}")]
    UnknownEnum {
        /// Type name of the rejecting enum.
        enum_name: &'static str,
        /// The undefined value.
        value: u32,
    },
}

/// A typed message body: one half (requests or events) of an interface's
/// vocabulary, with variants in opcode order.
pub trait Payload<'buf>: Sized {
    /// The interface this payload belongs to.
    fn interface() -> &'static Interface;

    /// Which half of the vocabulary this type covers.
    fn direction() -> Direction;

    /// Position of the active variant in the interface's opcode list.
    fn opcode(&self) -> u16;

    /// Write the argument payload, in declaration order.
    fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError>;

    /// Read the argument payload of the variant named by `opcode`.
    fn parse(opcode: u16, dec: &mut Decoder<'buf>) -> Result<Self, MessageParseError>;
}

/// Serialize a full frame (header and payload) into `dst`.
///
/// File descriptor arguments are appended to `fds` and produce no payload
/// bytes. On success returns the frame length in bytes.
pub fn write_message<'a, P: Payload<'a>>(
    object_id: u32,
    payload: &P,
    dst: &mut [u8],
    fds: &mut FdList,
) -> Result<usize, MessageWriteError> {
    if dst.len() < MessageHeader::BYTES {
        return Err(MessageWriteError::BufferTooSmall);
    }
    let fds_before = fds.len();
    let (header, body) = dst.split_at_mut(MessageHeader::BYTES);

    let mut enc = Encoder { buf: body, len: 0, fds };
    payload.write(&mut enc)?;
    let size = MessageHeader::BYTES + enc.len;
    if size > MAX_FRAME_BYTES {
        return Err(MessageWriteError::FrameTooBig);
    }

    if let Some(desc) = P::interface().message(P::direction(), payload.opcode()) {
        debug_assert_eq!(fds.len() - fds_before, desc.fd_count());
    }

    let frame = MessageHeader { object_id, size: size as u16, opcode: payload.opcode() };
    header.copy_from_slice(&frame.to_bytes());
    Ok(size)
}

/// Deserialize the payload of a received frame into the typed message it
/// represents.
///
/// `body` must hold at least the `header.size - 8` payload bytes; anything
/// past that is never read. Fails with
/// [`UnknownOpcode`](MessageParseError::UnknownOpcode) if the header's
/// opcode is outside the interface's declared range.
pub fn parse_message<'buf, P: Payload<'buf>>(
    header: MessageHeader,
    body: &'buf [u8],
) -> Result<P, MessageParseError> {
    let interface = P::interface();
    if header.opcode >= interface.op_count(P::direction()) {
        return Err(MessageParseError::UnknownOpcode {
            interface: interface.name,
            opcode: header.opcode,
        });
    }
    let body_len = (header.size as usize)
        .checked_sub(MessageHeader::BYTES)
        .ok_or(MessageParseError::MissingData)?;
    let body = body.get(..body_len).ok_or(MessageParseError::MissingData)?;
    P::parse(header.opcode, &mut Decoder { body })
}

/// Incremental writer for a message payload.
///
/// One method per argument kind, invoked in declaration order by
/// [`Payload::write`] implementations.
#[derive(Debug)]
pub struct Encoder<'a> {
    buf: &'a mut [u8],
    len: usize,
    fds: &'a mut FdList,
}

impl Encoder<'_> {
    fn word(&mut self, word: u32) -> Result<(), MessageWriteError> {
        if self.len + 4 > self.buf.len() {
            return Err(MessageWriteError::BufferTooSmall);
        }
        self.buf[self.len..self.len + 4].copy_from_slice(&word.to_ne_bytes());
        self.len += 4;
        Ok(())
    }

    fn padded_bytes(&mut self, bytes: &[u8]) -> Result<(), MessageWriteError> {
        let padded = next_multiple_of(bytes.len(), 4);
        if self.len + padded > self.buf.len() {
            return Err(MessageWriteError::BufferTooSmall);
        }
        let dst = &mut self.buf[self.len..self.len + padded];
        dst[..bytes.len()].copy_from_slice(bytes);
        dst[bytes.len()..].fill(0);
        self.len += padded;
        Ok(())
    }

    /// Write an unsigned integer argument. Enums and bitfields use this
    /// after conversion to their wire value.
    pub fn uint(&mut self, val: u32) -> Result<(), MessageWriteError> {
        self.word(val)
    }

    /// Write a signed integer argument.
    pub fn int(&mut self, val: i32) -> Result<(), MessageWriteError> {
        self.word(val as u32)
    }

    /// Write an object id argument.
    pub fn object(&mut self, id: u32) -> Result<(), MessageWriteError> {
        self.word(id)
    }

    /// Write the id of a newly created object.
    pub fn new_id(&mut self, id: u32) -> Result<(), MessageWriteError> {
        self.word(id)
    }

    /// Write a string argument: length word counting the trailing NUL,
    /// then the bytes, NUL, and zero padding to a word boundary.
    ///
    /// Wire strings are NUL-terminated, so an interior NUL can never be
    /// represented; it is rejected before anything is written.
    pub fn string(&mut self, s: &str) -> Result<(), MessageWriteError> {
        if s.len() as u64 >= u64::from(u32::MAX) {
            return Err(MessageWriteError::StringTooLong);
        }
        if s.as_bytes().contains(&0) {
            return Err(MessageWriteError::NulInString);
        }
        let len_with_nul = s.len() + 1;
        self.word(len_with_nul as u32)?;
        let padded = next_multiple_of(len_with_nul, 4);
        if self.len + padded > self.buf.len() {
            return Err(MessageWriteError::BufferTooSmall);
        }
        let dst = &mut self.buf[self.len..self.len + padded];
        dst[..s.len()].copy_from_slice(s.as_bytes());
        dst[s.len()..].fill(0);
        self.len += padded;
        Ok(())
    }

    /// Write an array argument: length word counting bytes, then the raw
    /// element bytes, zero-padded to a word boundary.
    pub fn array<T: ArrayElement>(&mut self, items: &[T]) -> Result<(), MessageWriteError> {
        let byte_len = items.len() * mem::size_of::<T>();
        self.word(byte_len as u32)?;
        // plain words in, plain bytes out; T is a sealed POD type
        let bytes = unsafe { slice::from_raw_parts(items.as_ptr().cast::<u8>(), byte_len) };
        self.padded_bytes(bytes)
    }

    /// Queue a file descriptor argument for the frame's ancillary block.
    /// Produces no payload bytes.
    pub fn fd(&mut self, fd: RawFd) -> Result<(), MessageWriteError> {
        self.fds.push(fd);
        Ok(())
    }
}

/// Incremental reader for a message payload.
///
/// Mirror of [`Encoder`]; strings and arrays are returned as borrows of the
/// underlying buffer. File descriptors are not read here at all: they are
/// claimed from the connection's queue after the frame is received.
#[derive(Debug)]
pub struct Decoder<'buf> {
    body: &'buf [u8],
}

impl<'buf> Decoder<'buf> {
    /// Wrap a message payload for decoding. For typed array views to be
    /// produced, `body` must be 4-byte aligned (a connection's receive
    /// buffer always is).
    pub fn new(body: &'buf [u8]) -> Self {
        Self { body }
    }

    fn word(&mut self) -> Result<u32, MessageParseError> {
        if self.body.len() < 4 {
            return Err(MessageParseError::MissingData);
        }
        let (front, rest) = self.body.split_at(4);
        self.body = rest;
        Ok(u32::from_ne_bytes(front.try_into().unwrap()))
    }

    /// Read an unsigned integer argument.
    pub fn uint(&mut self) -> Result<u32, MessageParseError> {
        self.word()
    }

    /// Read a signed integer argument.
    pub fn int(&mut self) -> Result<i32, MessageParseError> {
        self.word().map(|w| w as i32)
    }

    /// Read an object id argument.
    pub fn object(&mut self) -> Result<u32, MessageParseError> {
        self.word()
    }

    /// Read the id of a newly created object.
    pub fn new_id(&mut self) -> Result<u32, MessageParseError> {
        self.word()
    }

    /// Read a closed protocol enum; values the enum does not define are
    /// rejected with [`UnknownEnum`](MessageParseError::UnknownEnum).
    pub fn enum_arg<T: TryFrom<u32>>(&mut self) -> Result<T, MessageParseError> {
        let value = self.word()?;
        T::try_from(value).map_err(|_| MessageParseError::UnknownEnum {
            enum_name: std::any::type_name::<T>(),
            value,
        })
    }

    /// Read an open protocol enum; undefined values decode as
    /// [`WEnum::Unknown`].
    pub fn open_enum_arg<T: TryFrom<u32>>(&mut self) -> Result<WEnum<T>, MessageParseError> {
        Ok(WEnum::from(self.word()?))
    }

    /// Read a string argument as a borrowed view into the buffer.
    pub fn string(&mut self) -> Result<&'buf str, MessageParseError> {
        let len = self.word()? as usize;
        if len == 0 {
            return Err(MessageParseError::Malformed);
        }
        if len > self.body.len() {
            return Err(MessageParseError::MissingData);
        }
        let padded = next_multiple_of(len, 4);
        if padded > self.body.len() {
            return Err(MessageParseError::MissingData);
        }
        let (front, rest) = self.body.split_at(padded);
        self.body = rest;
        let payload = &front[..len];
        if payload[len - 1] != 0 || payload[..len - 1].contains(&0) {
            return Err(MessageParseError::Malformed);
        }
        std::str::from_utf8(&payload[..len - 1]).map_err(|_| MessageParseError::Malformed)
    }

    /// Read an array argument as a borrowed, typed view into the buffer.
    ///
    /// The byte length must divide evenly into `T`-sized elements and the
    /// payload must be aligned for `T`; anything else is malformed.
    pub fn array<T: ArrayElement>(&mut self) -> Result<&'buf [T], MessageParseError> {
        let byte_len = self.word()? as usize;
        if byte_len > self.body.len() {
            return Err(MessageParseError::MissingData);
        }
        let padded = next_multiple_of(byte_len, 4);
        if padded > self.body.len() {
            return Err(MessageParseError::MissingData);
        }
        let (front, rest) = self.body.split_at(padded);
        self.body = rest;
        if byte_len == 0 {
            return Ok(&[]);
        }
        let payload = &front[..byte_len];
        if byte_len % mem::size_of::<T>() != 0
            || payload.as_ptr() as usize % mem::align_of::<T>() != 0
        {
            return Err(MessageParseError::Malformed);
        }
        let elements = byte_len / mem::size_of::<T>();
        // alignment and element count were just checked; T is a sealed POD
        // type for which every bit pattern is a value
        Ok(unsafe { slice::from_raw_parts(payload.as_ptr().cast::<T>(), elements) })
    }
}

/// Element types an array argument may be viewed as: plain-old-data words
/// no wider than the 4-byte wire unit.
pub trait ArrayElement: sealed::Sealed + Copy {}

mod sealed {
    pub trait Sealed {}
}

macro_rules! array_element {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl ArrayElement for $ty {}
        )*
    };
}

array_element!(u8, u16, u32, i32);

// Stabilized in Rust 1.73
fn next_multiple_of(lhs: usize, rhs: usize) -> usize {
    match lhs % rhs {
        0 => lhs,
        r => lhs + (rhs - r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{wl_display, wl_keyboard, wl_registry, wl_shm};
    use crate::protocol::WEnum;

    fn encode<'a, P: Payload<'a>>(object_id: u32, payload: &P) -> (Vec<u8>, FdList) {
        let mut buf = vec![0; 1024];
        let mut fds = FdList::new();
        let size = write_message(object_id, payload, &mut buf, &mut fds).unwrap();
        buf.truncate(size);
        (buf, fds)
    }

    fn words(bytes: &[u8]) -> Vec<u32> {
        bytes.chunks(4).map(|c| u32::from_ne_bytes(c.try_into().unwrap())).collect()
    }

    #[test]
    fn empty_payload_sync_frame() {
        let (frame, fds) = encode(1, &wl_display::Request::Sync { callback: 3 });
        assert_eq!(words(&frame), vec![1, (12 << 16) | 0, 3]);
        assert!(fds.is_empty());
    }

    #[test]
    fn empty_record_is_header_only() {
        let (frame, _) = encode(7, &crate::interfaces::wl_surface::Request::Commit);
        assert_eq!(frame.len(), MessageHeader::BYTES);
        assert_eq!(frame, MessageHeader { object_id: 7, size: 8, opcode: 6 }.to_bytes());
    }

    #[test]
    fn string_payload_with_nul_and_padding() {
        let event = wl_registry::Event::Global { name: 1, interface: "wl_shm", version: 3 };
        let (frame, _) = encode(2, &event);
        let mut expected = Vec::new();
        expected.extend_from_slice(&2u32.to_ne_bytes());
        expected.extend_from_slice(&(((frame.len() as u32) << 16) | 0).to_ne_bytes());
        expected.extend_from_slice(&1u32.to_ne_bytes());
        expected.extend_from_slice(&7u32.to_ne_bytes());
        expected.extend_from_slice(b"wl_shm\0\0");
        expected.extend_from_slice(&3u32.to_ne_bytes());
        assert_eq!(frame, expected);
    }

    #[test]
    fn string_padding_is_zero_filled() {
        // every residue of (len + 1) mod 4
        for text in ["a", "ab", "abc", "abcd", "abcde"] {
            let event = wl_registry::Event::Global { name: 0, interface: text, version: 1 };
            let (frame, _) = encode(2, &event);
            let len_with_nul = text.len() + 1;
            let pad = (4 - len_with_nul % 4) % 4;
            let tail = &frame[8 + 8 + text.len()..];
            assert_eq!(tail[0], 0, "missing NUL for {text:?}");
            assert!(tail[1..1 + pad].iter().all(|&b| b == 0), "dirty pad for {text:?}");
        }
    }

    #[test]
    fn error_event_decode() {
        let message = "invalid arguments to wl_registry@2.bind";
        let mut body = Vec::new();
        body.extend_from_slice(&1u32.to_ne_bytes());
        body.extend_from_slice(&15u32.to_ne_bytes());
        body.extend_from_slice(&((message.len() as u32) + 1).to_ne_bytes());
        body.extend_from_slice(message.as_bytes());
        body.push(0);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        let header =
            MessageHeader { object_id: 1, size: (8 + body.len()) as u16, opcode: 0 };
        let event: wl_display::Event = parse_message(header, &body).unwrap();
        assert_eq!(
            event,
            wl_display::Event::Error { object_id: 1, code: 15, message }
        );
    }

    #[test]
    fn round_trip_bind_request() {
        let request = wl_registry::Request::Bind {
            name: 17,
            interface: "wl_compositor",
            version: 5,
            id: 4,
        };
        let (frame, _) = encode(2, &request);
        let header = MessageHeader::from_bytes(frame[..8].try_into().unwrap());
        assert_eq!(header, MessageHeader { object_id: 2, size: frame.len() as u16, opcode: 0 });
        let parsed: wl_registry::Request = parse_message(header, &frame[8..]).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn round_trip_array() {
        let event = wl_keyboard::Event::Enter { serial: 9, surface: 3, keys: &[30, 31, 42] };
        let (frame, _) = encode(12, &event);
        let header = MessageHeader::from_bytes(frame[..8].try_into().unwrap());
        // the test frame is heap-allocated; keep the body word-aligned by
        // decoding from a word vector
        let body = words(&frame[8..]);
        let body_bytes =
            unsafe { slice::from_raw_parts(body.as_ptr().cast::<u8>(), body.len() * 4) };
        let parsed: wl_keyboard::Event = parse_message(header, body_bytes).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let header = MessageHeader { object_id: 1, size: 8, opcode: 9 };
        let err = parse_message::<wl_display::Event>(header, &[]).unwrap_err();
        assert_eq!(
            err,
            MessageParseError::UnknownOpcode { interface: "wl_display", opcode: 9 }
        );
    }

    #[test]
    fn truncated_body_is_missing_data() {
        let header = MessageHeader { object_id: 1, size: 16, opcode: 1 };
        // delete_id wants one word, frame claims two, buffer has none
        let err = parse_message::<wl_display::Event>(header, &[]).unwrap_err();
        assert_eq!(err, MessageParseError::MissingData);
    }

    #[test]
    fn closed_enum_rejects_undefined_values() {
        let mut body = Vec::new();
        body.extend_from_slice(&7u32.to_ne_bytes());
        body.extend_from_slice(&0u32.to_ne_bytes());
        let header = MessageHeader { object_id: 12, size: 16, opcode: 0 };
        let err = parse_message::<wl_keyboard::Event>(header, &body).unwrap_err();
        assert!(matches!(err, MessageParseError::UnknownEnum { value: 7, .. }));
    }

    #[test]
    fn open_enum_accepts_undefined_values() {
        let mut body = Vec::new();
        body.extend_from_slice(&0x3431_3152u32.to_ne_bytes());
        let header = MessageHeader { object_id: 6, size: 12, opcode: 0 };
        let event: wl_shm::Event = parse_message(header, &body).unwrap();
        assert_eq!(event, wl_shm::Event::Format { format: WEnum::Unknown(0x3431_3152) });
    }

    #[test]
    fn interior_nul_in_string_is_rejected() {
        let mut buf = vec![0; 64];
        let mut fds = FdList::new();
        let event = wl_registry::Event::Global { name: 1, interface: "wl\0shm", version: 3 };
        let err = write_message(2, &event, &mut buf, &mut fds).unwrap_err();
        assert_eq!(err, MessageWriteError::NulInString);

        let request = wl_registry::Request::Bind {
            name: 1,
            interface: "wl_shm\0",
            version: 1,
            id: 4,
        };
        let err = write_message(2, &request, &mut buf, &mut fds).unwrap_err();
        assert_eq!(err, MessageWriteError::NulInString);
    }

    #[test]
    fn string_without_nul_is_malformed() {
        let mut body = Vec::new();
        body.extend_from_slice(&1u32.to_ne_bytes());
        body.extend_from_slice(&4u32.to_ne_bytes());
        body.extend_from_slice(b"abcd");
        body.extend_from_slice(&1u32.to_ne_bytes());
        let header = MessageHeader { object_id: 2, size: (8 + body.len()) as u16, opcode: 0 };
        let err = parse_message::<wl_registry::Event>(header, &body).unwrap_err();
        assert_eq!(err, MessageParseError::Malformed);
    }

    #[test]
    fn decode_never_reads_past_declared_size() {
        // a frame claiming a one-word body followed by trailing garbage
        let mut body = Vec::new();
        body.extend_from_slice(&99u32.to_ne_bytes());
        body.extend_from_slice(&0xffff_ffffu32.to_ne_bytes());
        let header = MessageHeader { object_id: 1, size: 12, opcode: 1 };
        let event: wl_display::Event = parse_message(header, &body).unwrap();
        assert_eq!(event, wl_display::Event::DeleteId { id: 99 });
    }

    #[test]
    fn fd_argument_produces_no_words() {
        let request = wl_shm::Request::CreatePool { id: 8, fd: 1, size: 4096 };
        let (frame, fds) = encode(6, &request);
        assert_eq!(words(&frame), vec![6, ((16u32) << 16) | 0, 8, 4096]);
        assert_eq!(fds.as_slice(), &[1]);
    }
}
