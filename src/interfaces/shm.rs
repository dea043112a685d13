//! Shared-memory buffers: `wl_shm`, `wl_shm_pool` and `wl_buffer`.

use crate::protocol::{ArgumentType as Arg, Interface, MessageDesc};

/// Interface `wl_shm`.
pub static WL_SHM_INTERFACE: Interface = Interface {
    name: "wl_shm",
    version: 1,
    requests: &[MessageDesc {
        name: "create_pool",
        signature: &[Arg::NewId, Arg::Fd, Arg::Int],
    }],
    events: &[MessageDesc { name: "format", signature: &[Arg::Enum] }],
};

/// Interface `wl_shm_pool`.
pub static WL_SHM_POOL_INTERFACE: Interface = Interface {
    name: "wl_shm_pool",
    version: 1,
    requests: &[
        MessageDesc {
            name: "create_buffer",
            signature: &[Arg::NewId, Arg::Int, Arg::Int, Arg::Int, Arg::Int, Arg::Enum],
        },
        MessageDesc { name: "destroy", signature: &[] },
        MessageDesc { name: "resize", signature: &[Arg::Int] },
    ],
    events: &[],
};

/// Interface `wl_buffer`.
pub static WL_BUFFER_INTERFACE: Interface = Interface {
    name: "wl_buffer",
    version: 1,
    requests: &[MessageDesc { name: "destroy", signature: &[] }],
    events: &[MessageDesc { name: "release", signature: &[] }],
};

/// The shared-memory global: pools are created from sealed fds.
pub mod wl_shm {
    use std::os::unix::io::RawFd;

    use super::WL_SHM_INTERFACE;
    use crate::protocol::{Direction, Interface, WEnum};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Errors raised by `wl_shm` requests.
    #[repr(u32)]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Error {
        /// Buffer format is not known.
        InvalidFormat = 0,
        /// Invalid size or stride during pool or buffer creation.
        InvalidStride = 1,
        /// Mmapping the file descriptor failed.
        InvalidFd = 2,
    }

    impl TryFrom<u32> for Error {
        type Error = ();
        fn try_from(val: u32) -> Result<Self, ()> {
            match val {
                0 => Ok(Self::InvalidFormat),
                1 => Ok(Self::InvalidStride),
                2 => Ok(Self::InvalidFd),
                _ => Err(()),
            }
        }
    }

    impl From<Error> for u32 {
        fn from(val: Error) -> u32 {
            val as u32
        }
    }

    /// Pixel formats, as drm-fourcc codes (with the two legacy exceptions).
    ///
    /// Compositors keep gaining formats, so this enum is open: undefined
    /// values decode as [`WEnum::Unknown`].
    #[repr(u32)]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Format {
        /// 32-bit ARGB, little-endian.
        Argb8888 = 0,
        /// 32-bit RGB with ignored alpha, little-endian.
        Xrgb8888 = 1,
        /// 16-bit RGB 5-6-5.
        Rgb565 = 0x3631_4752,
        /// 32-bit XBGR.
        Xbgr8888 = 0x3432_4258,
        /// 32-bit ABGR.
        Abgr8888 = 0x3432_4241,
    }

    impl TryFrom<u32> for Format {
        type Error = ();
        fn try_from(val: u32) -> Result<Self, ()> {
            match val {
                0 => Ok(Self::Argb8888),
                1 => Ok(Self::Xrgb8888),
                0x3631_4752 => Ok(Self::Rgb565),
                0x3432_4258 => Ok(Self::Xbgr8888),
                0x3432_4241 => Ok(Self::Abgr8888),
                _ => Err(()),
            }
        }
    }

    impl From<Format> for u32 {
        fn from(val: Format) -> u32 {
            val as u32
        }
    }

    /// Requests of `wl_shm`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Create a memory pool backed by `fd`.
        ///
        /// The descriptor travels in the frame's ancillary block, not in the
        /// payload.
        CreatePool {
            /// Pool-allocated id for the new `wl_shm_pool`.
            id: u32,
            /// Mappable file descriptor backing the pool.
            fd: RawFd,
            /// Pool size in bytes.
            size: i32,
        },
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_SHM_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::CreatePool { .. } => 0,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::CreatePool { id, fd, size } => {
                    enc.new_id(id)?;
                    enc.fd(fd)?;
                    enc.int(size)
                }
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                // the fd is not in the word stream; receivers claim it from
                // the connection's fd queue
                0 => Ok(Self::CreatePool { id: dec.new_id()?, fd: -1, size: dec.int()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_SHM_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `wl_shm`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        /// The compositor supports the given buffer format.
        Format {
            /// An advertised pixel format.
            format: WEnum<Format>,
        },
    }

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &WL_SHM_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Format { .. } => 0,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Format { format } => enc.uint(format.into()),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Format { format: dec.open_enum_arg()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_SHM_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}

/// A slab of mappable memory buffers are carved from.
pub mod wl_shm_pool {
    use super::WL_SHM_POOL_INTERFACE;
    use crate::protocol::{Direction, Interface, WEnum};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Requests of `wl_shm_pool`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Create a buffer viewing part of the pool.
        CreateBuffer {
            /// Pool-allocated id for the new `wl_buffer`.
            id: u32,
            /// Byte offset of the buffer within the pool.
            offset: i32,
            /// Buffer width in pixels.
            width: i32,
            /// Buffer height in pixels.
            height: i32,
            /// Row stride in bytes.
            stride: i32,
            /// Pixel format of the buffer.
            format: WEnum<super::wl_shm::Format>,
        },
        /// Delete the pool. Existing buffers keep their storage alive.
        Destroy,
        /// Grow the pool after the backing file grew.
        Resize {
            /// New pool size in bytes.
            size: i32,
        },
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_SHM_POOL_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::CreateBuffer { .. } => 0,
                Self::Destroy => 1,
                Self::Resize { .. } => 2,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::CreateBuffer { id, offset, width, height, stride, format } => {
                    enc.new_id(id)?;
                    enc.int(offset)?;
                    enc.int(width)?;
                    enc.int(height)?;
                    enc.int(stride)?;
                    enc.uint(format.into())
                }
                Self::Destroy => Ok(()),
                Self::Resize { size } => enc.int(size),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::CreateBuffer {
                    id: dec.new_id()?,
                    offset: dec.int()?,
                    width: dec.int()?,
                    height: dec.int()?,
                    stride: dec.int()?,
                    format: dec.open_enum_arg()?,
                }),
                1 => Ok(Self::Destroy),
                2 => Ok(Self::Resize { size: dec.int()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_SHM_POOL_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// `wl_shm_pool` has no events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {}

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &WL_SHM_POOL_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {}
        }

        fn write(&self, _enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {}
        }

        fn parse(opcode: u16, _dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            Err(MessageParseError::UnknownOpcode {
                interface: WL_SHM_POOL_INTERFACE.name,
                opcode,
            })
        }
    }
}

/// A chunk of pixels attachable to a surface.
pub mod wl_buffer {
    use super::WL_BUFFER_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Requests of `wl_buffer`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Delete the buffer.
        Destroy,
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_BUFFER_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Destroy => 0,
            }
        }

        fn write(&self, _enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            Ok(())
        }

        fn parse(opcode: u16, _dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Destroy),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_BUFFER_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `wl_buffer`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        /// The compositor no longer reads the buffer; the client may reuse
        /// or destroy its storage.
        Release,
    }

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &WL_BUFFER_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Release => 0,
            }
        }

        fn write(&self, _enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            Ok(())
        }

        fn parse(opcode: u16, _dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Release),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_BUFFER_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}
