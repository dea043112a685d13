//! Surface creation and manipulation: `wl_compositor`, `wl_surface` and
//! `wl_region`.

use crate::protocol::{ArgumentType as Arg, Interface, MessageDesc};

/// Interface `wl_compositor`.
pub static WL_COMPOSITOR_INTERFACE: Interface = Interface {
    name: "wl_compositor",
    version: 4,
    requests: &[
        MessageDesc { name: "create_surface", signature: &[Arg::NewId] },
        MessageDesc { name: "create_region", signature: &[Arg::NewId] },
    ],
    events: &[],
};

/// Interface `wl_surface`.
pub static WL_SURFACE_INTERFACE: Interface = Interface {
    name: "wl_surface",
    version: 4,
    requests: &[
        MessageDesc { name: "destroy", signature: &[] },
        MessageDesc { name: "attach", signature: &[Arg::Object, Arg::Int, Arg::Int] },
        MessageDesc { name: "damage", signature: &[Arg::Int, Arg::Int, Arg::Int, Arg::Int] },
        MessageDesc { name: "frame", signature: &[Arg::NewId] },
        MessageDesc { name: "set_opaque_region", signature: &[Arg::Object] },
        MessageDesc { name: "set_input_region", signature: &[Arg::Object] },
        MessageDesc { name: "commit", signature: &[] },
        MessageDesc { name: "set_buffer_transform", signature: &[Arg::Int] },
        MessageDesc { name: "set_buffer_scale", signature: &[Arg::Int] },
        MessageDesc {
            name: "damage_buffer",
            signature: &[Arg::Int, Arg::Int, Arg::Int, Arg::Int],
        },
    ],
    events: &[
        MessageDesc { name: "enter", signature: &[Arg::Object] },
        MessageDesc { name: "leave", signature: &[Arg::Object] },
    ],
};

/// Interface `wl_region`.
pub static WL_REGION_INTERFACE: Interface = Interface {
    name: "wl_region",
    version: 1,
    requests: &[
        MessageDesc { name: "destroy", signature: &[] },
        MessageDesc { name: "add", signature: &[Arg::Int, Arg::Int, Arg::Int, Arg::Int] },
        MessageDesc { name: "subtract", signature: &[Arg::Int, Arg::Int, Arg::Int, Arg::Int] },
    ],
    events: &[],
};

/// The compositor singleton, factory of surfaces and regions.
pub mod wl_compositor {
    use super::WL_COMPOSITOR_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Requests of `wl_compositor`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Create a surface.
        CreateSurface {
            /// Pool-allocated id for the new `wl_surface`.
            id: u32,
        },
        /// Create a region.
        CreateRegion {
            /// Pool-allocated id for the new `wl_region`.
            id: u32,
        },
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_COMPOSITOR_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::CreateSurface { .. } => 0,
                Self::CreateRegion { .. } => 1,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::CreateSurface { id } => enc.new_id(id),
                Self::CreateRegion { id } => enc.new_id(id),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::CreateSurface { id: dec.new_id()? }),
                1 => Ok(Self::CreateRegion { id: dec.new_id()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_COMPOSITOR_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// `wl_compositor` has no events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {}

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &WL_COMPOSITOR_INTERFACE
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
                interface: WL_COMPOSITOR_INTERFACE.name,
                opcode,
            })
        }
    }
}

/// A rectangle of pixels the compositor composites.
pub mod wl_surface {
    use super::WL_SURFACE_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Requests of `wl_surface`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Delete the surface.
        Destroy,
        /// Set the displayed buffer. `buffer` of `None` detaches content.
        Attach {
            /// `wl_buffer` id to display, or `None` for no content.
            buffer: Option<u32>,
            /// Horizontal displacement relative to the previous attach.
            x: i32,
            /// Vertical displacement relative to the previous attach.
            y: i32,
        },
        /// Mark part of the surface (surface coordinates) as needing repaint.
        Damage {
            /// Left edge of the damaged rectangle.
            x: i32,
            /// Top edge of the damaged rectangle.
            y: i32,
            /// Damaged width.
            width: i32,
            /// Damaged height.
            height: i32,
        },
        /// Request a frame-throttling callback for the next repaint.
        Frame {
            /// Pool-allocated id for the new `wl_callback`.
            callback: u32,
        },
        /// Declare the fully opaque part of the surface.
        SetOpaqueRegion {
            /// `wl_region` id, or `None` to mark nothing opaque.
            region: Option<u32>,
        },
        /// Restrict where input events are delivered.
        SetInputRegion {
            /// `wl_region` id, or `None` for the whole surface.
            region: Option<u32>,
        },
        /// Atomically apply all pending state.
        Commit,
        /// Declare the buffer's output transform (a `wl_output.transform`
        /// value; the protocol types it as a signed int).
        SetBufferTransform {
            /// The transform applied to buffer contents.
            transform: i32,
        },
        /// Declare the buffer scale factor.
        SetBufferScale {
            /// Integer scale of the attached buffer.
            scale: i32,
        },
        /// Like `damage`, but in buffer coordinates.
        DamageBuffer {
            /// Left edge of the damaged rectangle.
            x: i32,
            /// Top edge of the damaged rectangle.
            y: i32,
            /// Damaged width.
            width: i32,
            /// Damaged height.
            height: i32,
        },
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_SURFACE_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Destroy => 0,
                Self::Attach { .. } => 1,
                Self::Damage { .. } => 2,
                Self::Frame { .. } => 3,
                Self::SetOpaqueRegion { .. } => 4,
                Self::SetInputRegion { .. } => 5,
                Self::Commit => 6,
                Self::SetBufferTransform { .. } => 7,
                Self::SetBufferScale { .. } => 8,
                Self::DamageBuffer { .. } => 9,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Destroy | Self::Commit => Ok(()),
                Self::Attach { buffer, x, y } => {
                    enc.object(buffer.unwrap_or(0))?;
                    enc.int(x)?;
                    enc.int(y)
                }
                Self::Damage { x, y, width, height }
                | Self::DamageBuffer { x, y, width, height } => {
                    enc.int(x)?;
                    enc.int(y)?;
                    enc.int(width)?;
                    enc.int(height)
                }
                Self::Frame { callback } => enc.new_id(callback),
                Self::SetOpaqueRegion { region } | Self::SetInputRegion { region } => {
                    enc.object(region.unwrap_or(0))
                }
                Self::SetBufferTransform { transform } => enc.int(transform),
                Self::SetBufferScale { scale } => enc.int(scale),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            fn nullable(id: u32) -> Option<u32> {
                (id != 0).then_some(id)
            }
            match opcode {
                0 => Ok(Self::Destroy),
                1 => Ok(Self::Attach {
                    buffer: nullable(dec.object()?),
                    x: dec.int()?,
                    y: dec.int()?,
                }),
                2 => Ok(Self::Damage {
                    x: dec.int()?,
                    y: dec.int()?,
                    width: dec.int()?,
                    height: dec.int()?,
                }),
                3 => Ok(Self::Frame { callback: dec.new_id()? }),
                4 => Ok(Self::SetOpaqueRegion { region: nullable(dec.object()?) }),
                5 => Ok(Self::SetInputRegion { region: nullable(dec.object()?) }),
                6 => Ok(Self::Commit),
                7 => Ok(Self::SetBufferTransform { transform: dec.int()? }),
                8 => Ok(Self::SetBufferScale { scale: dec.int()? }),
                9 => Ok(Self::DamageBuffer {
                    x: dec.int()?,
                    y: dec.int()?,
                    width: dec.int()?,
                    height: dec.int()?,
                }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_SURFACE_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `wl_surface`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        /// The surface now overlaps the given output.
        Enter {
            /// The `wl_output` entered.
            output: u32,
        },
        /// The surface left the given output.
        Leave {
            /// The `wl_output` left.
            output: u32,
        },
    }

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &WL_SURFACE_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Enter { .. } => 0,
                Self::Leave { .. } => 1,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Enter { output } | Self::Leave { output } => enc.object(output),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Enter { output: dec.object()? }),
                1 => Ok(Self::Leave { output: dec.object()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_SURFACE_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}

/// An area of a surface, built from rectangles.
pub mod wl_region {
    use super::WL_REGION_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Requests of `wl_region`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Delete the region.
        Destroy,
        /// Add a rectangle to the region.
        Add {
            /// Left edge of the rectangle.
            x: i32,
            /// Top edge of the rectangle.
            y: i32,
            /// Rectangle width.
            width: i32,
            /// Rectangle height.
            height: i32,
        },
        /// Subtract a rectangle from the region.
        Subtract {
            /// Left edge of the rectangle.
            x: i32,
            /// Top edge of the rectangle.
            y: i32,
            /// Rectangle width.
            width: i32,
            /// Rectangle height.
            height: i32,
        },
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &WL_REGION_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Destroy => 0,
                Self::Add { .. } => 1,
                Self::Subtract { .. } => 2,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Destroy => Ok(()),
                Self::Add { x, y, width, height } | Self::Subtract { x, y, width, height } => {
                    enc.int(x)?;
                    enc.int(y)?;
                    enc.int(width)?;
                    enc.int(height)
                }
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Destroy),
                1 => Ok(Self::Add {
                    x: dec.int()?,
                    y: dec.int()?,
                    width: dec.int()?,
                    height: dec.int()?,
                }),
                2 => Ok(Self::Subtract {
                    x: dec.int()?,
                    y: dec.int()?,
                    width: dec.int()?,
                    height: dec.int()?,
                }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: WL_REGION_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// `wl_region` has no events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {}

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &WL_REGION_INTERFACE
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
                interface: WL_REGION_INTERFACE.name,
                opcode,
            })
        }
    }
}
