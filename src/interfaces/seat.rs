//! Input devices: `wl_seat` and `wl_keyboard`.
//!
//! Pointer and touch objects can still be created through `wl_seat` (the
//! opcodes are part of the interface), but their own interfaces use
//! fixed-point arguments this catalog does not describe.

use crate::protocol::{ArgumentType as Arg, Interface, MessageDesc};

/// Interface `wl_seat`.
pub static WL_SEAT_INTERFACE: Interface = Interface {
    name: "wl_seat",
    version: 5,
    requests: &[
        MessageDesc { name: "get_pointer", signature: &[Arg::NewId] },
        MessageDesc { name: "get_keyboard", signature: &[Arg::NewId] },
        MessageDesc { name: "get_touch", signature: &[Arg::NewId] },
        MessageDesc { name: "release", signature: &[] },
    ],
    events: &[
        MessageDesc { name: "capabilities", signature: &[Arg::Bitfield] },
        MessageDesc { name: "name", signature: &[Arg::Str] },
    ],
};

/// Interface `wl_keyboard`.
pub static WL_KEYBOARD_INTERFACE: Interface = Interface {
    name: "wl_keyboard",
    version: 5,
    requests: &[MessageDesc { name: "release", signature: &[] }],
    events: &[
        MessageDesc { name: "keymap", signature: &[Arg::Enum, Arg::Fd, Arg::Uint] },
        MessageDesc { name: "enter", signature: &[Arg::Uint, Arg::Object, Arg::Array] },
        MessageDesc { name: "leave", signature: &[Arg::Uint, Arg::Object] },
        MessageDesc {
            name: "key",
            signature: &[Arg::Uint, Arg::Uint, Arg::Uint, Arg::Enum],
        },
        MessageDesc {
            name: "modifiers",
            signature: &[Arg::Uint, Arg::Uint, Arg::Uint, Arg::Uint, Arg::Uint],
        },
        MessageDesc { name: "repeat_info", signature: &[Arg::Int, Arg::Int] },
    ],
};

/// A group of input devices sharing one focus.
pub mod wl_seat {
    use super::WL_SEAT_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    bitflags::bitflags! {
        /// Device classes present on a seat, from `wl_seat.capabilities`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct Capability: u32 {
            /// The seat has pointer devices.
            const POINTER = 1;
            /// The seat has one or more keyboards.
            const KEYBOARD = 2;
            /// The seat has touch devices.
            const TOUCH = 4;
        }
    }

    /// Requests of `wl_seat`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Create a pointer object for this seat.
        GetPointer {
            /// Pool-allocated id for the new `wl_pointer`.
            id: u32,
        },
        /// Create a keyboard object for this seat.
        GetKeyboard {
            /// Pool-allocated id for the new `wl_keyboard`.
            id: u32,
        },
        /// Create a touch object for this seat.
        GetTouch {
            /// Pool-allocated id for the new `wl_touch`.
            id: u32,
        },
        /// Release the seat object.
        Release,
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_SEAT_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::GetPointer { .. } => 0,
                Self::GetKeyboard { .. } => 1,
                Self::GetTouch { .. } => 2,
                Self::Release => 3,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::GetPointer { id } | Self::GetKeyboard { id } | Self::GetTouch { id } => {
                    enc.new_id(id)
                }
                Self::Release => Ok(()),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::GetPointer { id: dec.new_id()? }),
                1 => Ok(Self::GetKeyboard { id: dec.new_id()? }),
                2 => Ok(Self::GetTouch { id: dec.new_id()? }),
                3 => Ok(Self::Release),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_SEAT_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `wl_seat`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event<'a> {
        /// The device classes currently present on the seat.
        Capabilities {
            /// Bitset of present device classes. Unknown bits are kept
            /// as-is.
            capabilities: Capability,
        },
        /// Human-readable seat identification.
        Name {
            /// The seat name.
            name: &'a str,
        },
    }

    impl<'a> Payload<'a> for Event<'a> {
        fn interface() -> &'static Interface {
            &WL_SEAT_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Capabilities { .. } => 0,
                Self::Name { .. } => 1,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Capabilities { capabilities } => enc.uint(capabilities.bits()),
                Self::Name { name } => enc.string(name),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Capabilities {
                    capabilities: Capability::from_bits_retain(dec.uint()?),
                }),
                1 => Ok(Self::Name { name: dec.string()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_SEAT_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}

/// A keyboard attached to a seat.
pub mod wl_keyboard {
    use super::WL_KEYBOARD_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Formats of the keymap delivered by [`Event::Keymap`].
    #[repr(u32)]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum KeymapFormat {
        /// No keymap; interpret keycodes as is.
        NoKeymap = 0,
        /// An xkb-compatible, libxkbcommon-parsable keymap.
        XkbV1 = 1,
    }

    impl TryFrom<u32> for KeymapFormat {
        type Error = ();
        fn try_from(val: u32) -> Result<Self, ()> {
            match val {
                0 => Ok(Self::NoKeymap),
                1 => Ok(Self::XkbV1),
                _ => Err(()),
            }
        }
    }

    impl From<KeymapFormat> for u32 {
        fn from(val: KeymapFormat) -> u32 {
            val as u32
        }
    }

    /// Physical state of a key.
    #[repr(u32)]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum KeyState {
        /// The key is not pressed.
        Released = 0,
        /// The key is pressed.
        Pressed = 1,
    }

    impl TryFrom<u32> for KeyState {
        type Error = ();
        fn try_from(val: u32) -> Result<Self, ()> {
            match val {
                0 => Ok(Self::Released),
                1 => Ok(Self::Pressed),
                _ => Err(()),
            }
        }
    }

    impl From<KeyState> for u32 {
        fn from(val: KeyState) -> u32 {
            val as u32
        }
    }

    /// Requests of `wl_keyboard`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Release the keyboard object.
        Release,
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_KEYBOARD_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
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
                    interface: WL_KEYBOARD_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `wl_keyboard`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event<'a> {
        /// The keymap changed.
        ///
        /// The schema carries a keymap file descriptor between `format` and
        /// `size`; it is not materialized here. Claim it with
        /// [`take_fd`](crate::Connection::take_fd) after receiving this
        /// event.
        Keymap {
            /// How to interpret the keymap file.
            format: KeymapFormat,
            /// Size of the keymap file in bytes.
            size: u32,
        },
        /// The surface gained keyboard focus.
        Enter {
            /// Serial of the focus change.
            serial: u32,
            /// The focused surface.
            surface: u32,
            /// Scancodes of the keys held down when focus was gained.
            keys: &'a [u32],
        },
        /// The surface lost keyboard focus.
        Leave {
            /// Serial of the focus change.
            serial: u32,
            /// The surface that lost focus.
            surface: u32,
        },
        /// A key was pressed or released.
        Key {
            /// Serial of the key event.
            serial: u32,
            /// Timestamp with millisecond granularity.
            time: u32,
            /// Platform scancode of the key.
            key: u32,
            /// Whether the key went down or up.
            state: KeyState,
        },
        /// The modifier or group state changed.
        Modifiers {
            /// Serial of the modifier change.
            serial: u32,
            /// Depressed modifier bits.
            mods_depressed: u32,
            /// Latched modifier bits.
            mods_latched: u32,
            /// Locked modifier bits.
            mods_locked: u32,
            /// Active keyboard layout group.
            group: u32,
        },
        /// The key repeat rate and delay, sent once at bind time (v4+).
        RepeatInfo {
            /// Repeated characters per second, 0 to disable repeat.
            rate: i32,
            /// Delay in milliseconds before repeat starts.
            delay: i32,
        },
    }

    impl<'a> Payload<'a> for Event<'a> {
        fn interface() -> &'static Interface {
            &WL_KEYBOARD_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Keymap { .. } => 0,
                Self::Enter { .. } => 1,
                Self::Leave { .. } => 2,
                Self::Key { .. } => 3,
                Self::Modifiers { .. } => 4,
                Self::RepeatInfo { .. } => 5,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Keymap { format, size } => {
                    enc.uint(format.into())?;
                    enc.uint(size)
                }
                Self::Enter { serial, surface, keys } => {
                    enc.uint(serial)?;
                    enc.object(surface)?;
                    enc.array(keys)
                }
                Self::Leave { serial, surface } => {
                    enc.uint(serial)?;
                    enc.object(surface)
                }
                Self::Key { serial, time, key, state } => {
                    enc.uint(serial)?;
                    enc.uint(time)?;
                    enc.uint(key)?;
                    enc.uint(state.into())
                }
                Self::Modifiers { serial, mods_depressed, mods_latched, mods_locked, group } => {
                    enc.uint(serial)?;
                    enc.uint(mods_depressed)?;
                    enc.uint(mods_latched)?;
                    enc.uint(mods_locked)?;
                    enc.uint(group)
                }
                Self::RepeatInfo { rate, delay } => {
                    enc.int(rate)?;
                    enc.int(delay)
                }
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Keymap { format: dec.enum_arg()?, size: dec.uint()? }),
                1 => Ok(Self::Enter {
                    serial: dec.uint()?,
                    surface: dec.object()?,
                    keys: dec.array()?,
                }),
                2 => Ok(Self::Leave { serial: dec.uint()?, surface: dec.object()? }),
                3 => Ok(Self::Key {
                    serial: dec.uint()?,
                    time: dec.uint()?,
                    key: dec.uint()?,
                    state: dec.enum_arg()?,
                }),
                4 => Ok(Self::Modifiers {
                    serial: dec.uint()?,
                    mods_depressed: dec.uint()?,
                    mods_latched: dec.uint()?,
                    mods_locked: dec.uint()?,
                    group: dec.uint()?,
                }),
                5 => Ok(Self::RepeatInfo { rate: dec.int()?, delay: dec.int()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_KEYBOARD_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}
