//! The frozen core of the protocol: `wl_display`, `wl_registry` and
//! `wl_callback`. Every connection speaks these three before anything else
//! is bound.

use crate::protocol::{ArgumentType as Arg, Interface, MessageDesc};

/// Interface `wl_display`.
pub static WL_DISPLAY_INTERFACE: Interface = Interface {
    name: "wl_display",
    version: 1,
    requests: &[
        MessageDesc { name: "sync", signature: &[Arg::NewId] },
        MessageDesc { name: "get_registry", signature: &[Arg::NewId] },
    ],
    events: &[
        MessageDesc { name: "error", signature: &[Arg::Object, Arg::Uint, Arg::Str] },
        MessageDesc { name: "delete_id", signature: &[Arg::Uint] },
    ],
};

/// Interface `wl_registry`.
pub static WL_REGISTRY_INTERFACE: Interface = Interface {
    name: "wl_registry",
    version: 1,
    requests: &[MessageDesc {
        name: "bind",
        signature: &[Arg::Uint, Arg::Str, Arg::Uint, Arg::NewId],
    }],
    events: &[
        MessageDesc { name: "global", signature: &[Arg::Uint, Arg::Str, Arg::Uint] },
        MessageDesc { name: "global_remove", signature: &[Arg::Uint] },
    ],
};

/// Interface `wl_callback`.
pub static WL_CALLBACK_INTERFACE: Interface = Interface {
    name: "wl_callback",
    version: 1,
    requests: &[],
    events: &[MessageDesc { name: "done", signature: &[Arg::Uint] }],
};

/// The `wl_display` singleton, living at object id 1.
pub mod wl_display {
    use super::WL_DISPLAY_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Global error values. These can be emitted in response to any request.
    #[repr(u32)]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Error {
        /// Server couldn't find object.
        InvalidObject = 0,
        /// Method doesn't exist on the specified interface or malformed request.
        InvalidMethod = 1,
        /// Server is out of memory.
        NoMemory = 2,
        /// Implementation error in compositor.
        Implementation = 3,
    }

    impl TryFrom<u32> for Error {
        type Error = ();
        fn try_from(val: u32) -> Result<Self, ()> {
            match val {
                0 => Ok(Self::InvalidObject),
                1 => Ok(Self::InvalidMethod),
                2 => Ok(Self::NoMemory),
                3 => Ok(Self::Implementation),
                _ => Err(()),
            }
        }
    }

    impl From<Error> for u32 {
        fn from(val: Error) -> u32 {
            val as u32
        }
    }

    /// Requests of `wl_display`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Request {
        /// Asynchronous roundtrip barrier: `callback` receives `done` once
        /// every preceding request has been processed.
        Sync {
            /// Pool-allocated id for the new `wl_callback`.
            callback: u32,
        },
        /// Create the registry object enumerating the compositor's globals.
        GetRegistry {
            /// Pool-allocated id for the new `wl_registry`.
            registry: u32,
        },
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_DISPLAY_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Sync { .. } => 0,
                Self::GetRegistry { .. } => 1,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Sync { callback } => enc.new_id(callback),
                Self::GetRegistry { registry } => enc.new_id(registry),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Sync { callback: dec.new_id()? }),
                1 => Ok(Self::GetRegistry { registry: dec.new_id()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_DISPLAY_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `wl_display`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event<'a> {
        /// Fatal, connection-terminal error report.
        Error {
            /// The object the error occurred on.
            object_id: u32,
            /// Error code, defined by that object's interface.
            code: u32,
            /// Human-readable description.
            message: &'a str,
        },
        /// Acknowledgement that a client id may be reused.
        DeleteId {
            /// The id now free for recycling.
            id: u32,
        },
    }

    impl<'a> Payload<'a> for Event<'a> {
        fn interface() -> &'static Interface {
            &WL_DISPLAY_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Error { .. } => 0,
                Self::DeleteId { .. } => 1,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Error { object_id, code, message } => {
                    enc.object(object_id)?;
                    enc.uint(code)?;
                    enc.string(message)
                }
                Self::DeleteId { id } => enc.uint(id),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Error {
                    object_id: dec.object()?,
                    code: dec.uint()?,
                    message: dec.string()?,
                }),
                1 => Ok(Self::DeleteId { id: dec.uint()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_DISPLAY_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}

/// The global registry, bound via `wl_display.get_registry`.
pub mod wl_registry {
    use super::WL_REGISTRY_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Requests of `wl_registry`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Request<'a> {
        /// Bind an advertised global to a fresh client id.
        Bind {
            /// The numeric name from the matching `global` event.
            name: u32,
            /// The interface name, echoed from the advertisement for the
            /// server to validate.
            interface: &'a str,
            /// The version the client will speak.
            version: u32,
            /// Pool-allocated id for the bound object.
            id: u32,
        },
    }

    impl<'a> Payload<'a> for Request<'a> {
        fn interface() -> &'static Interface {
            &WL_REGISTRY_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Bind { .. } => 0,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Bind { name, interface, version, id } => {
                    enc.uint(name)?;
                    enc.string(interface)?;
                    enc.uint(version)?;
                    enc.new_id(id)
                }
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Bind {
                    name: dec.uint()?,
                    interface: dec.string()?,
                    version: dec.uint()?,
                    id: dec.new_id()?,
                }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_REGISTRY_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `wl_registry`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event<'a> {
        /// A global is (or became) available.
        Global {
            /// Numeric name identifying the global in `bind` requests.
            name: u32,
            /// Interface the global implements.
            interface: &'a str,
            /// Highest version the compositor supports.
            version: u32,
        },
        /// A previously advertised global went away.
        GlobalRemove {
            /// The numeric name that is no longer valid.
            name: u32,
        },
    }

    impl<'a> Payload<'a> for Event<'a> {
        fn interface() -> &'static Interface {
            &WL_REGISTRY_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Global { .. } => 0,
                Self::GlobalRemove { .. } => 1,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Global { name, interface, version } => {
                    enc.uint(name)?;
                    enc.string(interface)?;
                    enc.uint(version)
                }
                Self::GlobalRemove { name } => enc.uint(name),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Global {
                    name: dec.uint()?,
                    interface: dec.string()?,
                    version: dec.uint()?,
                }),
                1 => Ok(Self::GlobalRemove { name: dec.uint()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_REGISTRY_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}

/// One-shot callback objects, used as barriers.
pub mod wl_callback {
    use super::WL_CALLBACK_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// `wl_callback` has no requests.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {}

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_CALLBACK_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {}
        }

        fn write(&self, _enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {}
        }

        fn parse(opcode: u16, _dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            Err(MessageParseError::UnknownOpcode {
                interface: WL_CALLBACK_INTERFACE.name,
                opcode,
            })
        }
    }

    /// Events of `wl_callback`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        /// The callback fired; the object is dead afterwards.
        Done {
            /// Request-specific payload (the event serial for `sync`).
            callback_data: u32,
        },
    }

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &WL_CALLBACK_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Done { .. } => 0,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Done { callback_data } => enc.uint(callback_data),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Done { callback_data: dec.uint()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_CALLBACK_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}
