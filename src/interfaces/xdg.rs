//! The xdg-shell windowing extension: `xdg_wm_base`, `xdg_surface` and
//! `xdg_toplevel`. This is what turns a bare `wl_surface` into a desktop
//! window.

use crate::protocol::{ArgumentType as Arg, Interface, MessageDesc};

/// Interface `xdg_wm_base`.
pub static XDG_WM_BASE_INTERFACE: Interface = Interface {
    name: "xdg_wm_base",
    version: 2,
    requests: &[
        MessageDesc { name: "destroy", signature: &[] },
        MessageDesc { name: "create_positioner", signature: &[Arg::NewId] },
        MessageDesc { name: "get_xdg_surface", signature: &[Arg::NewId, Arg::Object] },
        MessageDesc { name: "pong", signature: &[Arg::Uint] },
    ],
    events: &[MessageDesc { name: "ping", signature: &[Arg::Uint] }],
};

/// Interface `xdg_surface`.
pub static XDG_SURFACE_INTERFACE: Interface = Interface {
    name: "xdg_surface",
    version: 2,
    requests: &[
        MessageDesc { name: "destroy", signature: &[] },
        MessageDesc { name: "get_toplevel", signature: &[Arg::NewId] },
        MessageDesc {
            name: "get_popup",
            signature: &[Arg::NewId, Arg::Object, Arg::Object],
        },
        MessageDesc {
            name: "set_window_geometry",
            signature: &[Arg::Int, Arg::Int, Arg::Int, Arg::Int],
        },
        MessageDesc { name: "ack_configure", signature: &[Arg::Uint] },
    ],
    events: &[MessageDesc { name: "configure", signature: &[Arg::Uint] }],
};

/// Interface `xdg_toplevel`.
pub static XDG_TOPLEVEL_INTERFACE: Interface = Interface {
    name: "xdg_toplevel",
    version: 2,
    requests: &[
        MessageDesc { name: "destroy", signature: &[] },
        MessageDesc { name: "set_parent", signature: &[Arg::Object] },
        MessageDesc { name: "set_title", signature: &[Arg::Str] },
        MessageDesc { name: "set_app_id", signature: &[Arg::Str] },
        MessageDesc {
            name: "show_window_menu",
            signature: &[Arg::Object, Arg::Uint, Arg::Int, Arg::Int],
        },
        MessageDesc { name: "move", signature: &[Arg::Object, Arg::Uint] },
        MessageDesc { name: "resize", signature: &[Arg::Object, Arg::Uint, Arg::Enum] },
        MessageDesc { name: "set_max_size", signature: &[Arg::Int, Arg::Int] },
        MessageDesc { name: "set_min_size", signature: &[Arg::Int, Arg::Int] },
        MessageDesc { name: "set_maximized", signature: &[] },
        MessageDesc { name: "unset_maximized", signature: &[] },
        MessageDesc { name: "set_fullscreen", signature: &[Arg::Object] },
        MessageDesc { name: "unset_fullscreen", signature: &[] },
        MessageDesc { name: "set_minimized", signature: &[] },
    ],
    events: &[
        MessageDesc { name: "configure", signature: &[Arg::Int, Arg::Int, Arg::Array] },
        MessageDesc { name: "close", signature: &[] },
    ],
};

/// The shell global tying surfaces to desktop semantics.
pub mod xdg_wm_base {
    use super::XDG_WM_BASE_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Errors raised by shell requests.
    #[repr(u32)]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Error {
        /// Given surface has another role.
        Role = 0,
        /// The shell was destroyed before its children.
        DefunctSurfaces = 1,
        /// The client tried to map or destroy a non-topmost popup.
        NotTheTopmostPopup = 2,
        /// The client specified an invalid popup parent surface.
        InvalidPopupParent = 3,
        /// The client provided an invalid surface state.
        InvalidSurfaceState = 4,
        /// The client provided an invalid positioner.
        InvalidPositioner = 5,
    }

    impl TryFrom<u32> for Error {
        type Error = ();
        fn try_from(val: u32) -> Result<Self, ()> {
            match val {
                0 => Ok(Self::Role),
                1 => Ok(Self::DefunctSurfaces),
                2 => Ok(Self::NotTheTopmostPopup),
                3 => Ok(Self::InvalidPopupParent),
                4 => Ok(Self::InvalidSurfaceState),
                5 => Ok(Self::InvalidPositioner),
                _ => Err(()),
            }
        }
    }

    impl From<Error> for u32 {
        fn from(val: Error) -> u32 {
            val as u32
        }
    }

    /// Requests of `xdg_wm_base`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Delete the shell object.
        Destroy,
        /// Create a positioner for popup placement.
        CreatePositioner {
            /// Pool-allocated id for the new `xdg_positioner`.
            id: u32,
        },
        /// Wrap a `wl_surface` in an `xdg_surface`.
        GetXdgSurface {
            /// Pool-allocated id for the new `xdg_surface`.
            id: u32,
            /// The `wl_surface` to assign the role to.
            surface: u32,
        },
        /// Liveness reply to a `ping` event.
        Pong {
            /// Serial from the matching `ping`.
            serial: u32,
        },
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &XDG_WM_BASE_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Destroy => 0,
                Self::CreatePositioner { .. } => 1,
                Self::GetXdgSurface { .. } => 2,
                Self::Pong { .. } => 3,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Destroy => Ok(()),
                Self::CreatePositioner { id } => enc.new_id(id),
                Self::GetXdgSurface { id, surface } => {
                    enc.new_id(id)?;
                    enc.object(surface)
                }
                Self::Pong { serial } => enc.uint(serial),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Destroy),
                1 => Ok(Self::CreatePositioner { id: dec.new_id()? }),
                2 => Ok(Self::GetXdgSurface { id: dec.new_id()?, surface: dec.object()? }),
                3 => Ok(Self::Pong { serial: dec.uint()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: XDG_WM_BASE_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `xdg_wm_base`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        /// Liveness check; answer with `pong` or be deemed unresponsive.
        Ping {
            /// Serial to echo back.
            serial: u32,
        },
    }

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &XDG_WM_BASE_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Ping { .. } => 0,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Ping { serial } => enc.uint(serial),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Ping { serial: dec.uint()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: XDG_WM_BASE_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}

/// The shell's per-surface state machine.
pub mod xdg_surface {
    use super::XDG_SURFACE_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Requests of `xdg_surface`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request {
        /// Delete the xdg surface.
        Destroy,
        /// Assign the toplevel (window) role.
        GetToplevel {
            /// Pool-allocated id for the new `xdg_toplevel`.
            id: u32,
        },
        /// Assign the popup role.
        GetPopup {
            /// Pool-allocated id for the new `xdg_popup`.
            id: u32,
            /// Parent xdg surface, or `None` to position via other means.
            parent: Option<u32>,
            /// The positioner defining placement.
            positioner: u32,
        },
        /// Declare which part of the surface is the window.
        SetWindowGeometry {
            /// Left edge of the geometry rectangle.
            x: i32,
            /// Top edge of the geometry rectangle.
            y: i32,
            /// Geometry width.
            width: i32,
            /// Geometry height.
            height: i32,
        },
        /// Accept a `configure` sequence.
        AckConfigure {
            /// Serial from the acknowledged `configure`.
            serial: u32,
        },
    }

    impl<'a> Payload<'a> for Request {
        fn interface() -> &'static Interface {
            &XDG_SURFACE_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Destroy => 0,
                Self::GetToplevel { .. } => 1,
                Self::GetPopup { .. } => 2,
                Self::SetWindowGeometry { .. } => 3,
                Self::AckConfigure { .. } => 4,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Destroy => Ok(()),
                Self::GetToplevel { id } => enc.new_id(id),
                Self::GetPopup { id, parent, positioner } => {
                    enc.new_id(id)?;
                    enc.object(parent.unwrap_or(0))?;
                    enc.object(positioner)
                }
                Self::SetWindowGeometry { x, y, width, height } => {
                    enc.int(x)?;
                    enc.int(y)?;
                    enc.int(width)?;
                    enc.int(height)
                }
                Self::AckConfigure { serial } => enc.uint(serial),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Destroy),
                1 => Ok(Self::GetToplevel { id: dec.new_id()? }),
                2 => {
                    let id = dec.new_id()?;
                    let parent = dec.object()?;
                    Ok(Self::GetPopup {
                        id,
                        parent: (parent != 0).then_some(parent),
                        positioner: dec.object()?,
                    })
                }
                3 => Ok(Self::SetWindowGeometry {
                    x: dec.int()?,
                    y: dec.int()?,
                    width: dec.int()?,
                    height: dec.int()?,
                }),
                4 => Ok(Self::AckConfigure { serial: dec.uint()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: XDG_SURFACE_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `xdg_surface`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        /// A new configure sequence is ready to be acked and committed.
        Configure {
            /// Serial to pass to `ack_configure`.
            serial: u32,
        },
    }

    impl<'a> Payload<'a> for Event {
        fn interface() -> &'static Interface {
            &XDG_SURFACE_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Configure { .. } => 0,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Configure { serial } => enc.uint(serial),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Configure { serial: dec.uint()? }),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: XDG_SURFACE_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}

/// A desktop window.
pub mod xdg_toplevel {
    use super::XDG_TOPLEVEL_INTERFACE;
    use crate::protocol::{Direction, Interface};
    use crate::wire::{Decoder, Encoder, MessageParseError, MessageWriteError, Payload};

    /// Requests of `xdg_toplevel`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Request<'a> {
        /// Delete the toplevel.
        Destroy,
        /// Declare this window as a child of another toplevel.
        SetParent {
            /// Parent toplevel, or `None` to unset.
            parent: Option<u32>,
        },
        /// Set the window title.
        SetTitle {
            /// UTF-8 title shown in window decorations and switchers.
            title: &'a str,
        },
        /// Set the application id used to group windows.
        SetAppId {
            /// Reverse-DNS style application identifier.
            app_id: &'a str,
        },
        /// Ask the compositor to show the window menu.
        ShowWindowMenu {
            /// The seat the triggering input event came from.
            seat: u32,
            /// Serial of the triggering input event.
            serial: u32,
            /// Menu x position in surface coordinates.
            x: i32,
            /// Menu y position in surface coordinates.
            y: i32,
        },
        /// Start an interactive move.
        Move {
            /// The seat the triggering input event came from.
            seat: u32,
            /// Serial of the triggering input event.
            serial: u32,
        },
        /// Start an interactive resize.
        Resize {
            /// The seat the triggering input event came from.
            seat: u32,
            /// Serial of the triggering input event.
            serial: u32,
            /// Which edge or corner is being dragged (a
            /// `resize_edges` value).
            edges: u32,
        },
        /// Declare the maximum window size.
        SetMaxSize {
            /// Maximum width, 0 for no limit.
            width: i32,
            /// Maximum height, 0 for no limit.
            height: i32,
        },
        /// Declare the minimum window size.
        SetMinSize {
            /// Minimum width, 0 for no limit.
            width: i32,
            /// Minimum height, 0 for no limit.
            height: i32,
        },
        /// Ask to be maximized.
        SetMaximized,
        /// Ask to leave the maximized state.
        UnsetMaximized,
        /// Ask for fullscreen presentation.
        SetFullscreen {
            /// Preferred output, or `None` to let the compositor pick.
            output: Option<u32>,
        },
        /// Ask to leave fullscreen.
        UnsetFullscreen,
        /// Ask to be minimized.
        SetMinimized,
    }

    impl<'a> Payload<'a> for Request<'a> {
        fn interface() -> &'static Interface {
            &XDG_TOPLEVEL_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Request
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Destroy => 0,
                Self::SetParent { .. } => 1,
                Self::SetTitle { .. } => 2,
                Self::SetAppId { .. } => 3,
                Self::ShowWindowMenu { .. } => 4,
                Self::Move { .. } => 5,
                Self::Resize { .. } => 6,
                Self::SetMaxSize { .. } => 7,
                Self::SetMinSize { .. } => 8,
                Self::SetMaximized => 9,
                Self::UnsetMaximized => 10,
                Self::SetFullscreen { .. } => 11,
                Self::UnsetFullscreen => 12,
                Self::SetMinimized => 13,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Destroy
                | Self::SetMaximized
                | Self::UnsetMaximized
                | Self::UnsetFullscreen
                | Self::SetMinimized => Ok(()),
                Self::SetParent { parent } => enc.object(parent.unwrap_or(0)),
                Self::SetTitle { title } => enc.string(title),
                Self::SetAppId { app_id } => enc.string(app_id),
                Self::ShowWindowMenu { seat, serial, x, y } => {
                    enc.object(seat)?;
                    enc.uint(serial)?;
                    enc.int(x)?;
                    enc.int(y)
                }
                Self::Move { seat, serial } => {
                    enc.object(seat)?;
                    enc.uint(serial)
                }
                Self::Resize { seat, serial, edges } => {
                    enc.object(seat)?;
                    enc.uint(serial)?;
                    enc.uint(edges)
                }
                Self::SetMaxSize { width, height } | Self::SetMinSize { width, height } => {
                    enc.int(width)?;
                    enc.int(height)
                }
                Self::SetFullscreen { output } => enc.object(output.unwrap_or(0)),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Destroy),
                1 => {
                    let parent = dec.object()?;
                    Ok(Self::SetParent { parent: (parent != 0).then_some(parent) })
                }
                2 => Ok(Self::SetTitle { title: dec.string()? }),
                3 => Ok(Self::SetAppId { app_id: dec.string()? }),
                4 => Ok(Self::ShowWindowMenu {
                    seat: dec.object()?,
                    serial: dec.uint()?,
                    x: dec.int()?,
                    y: dec.int()?,
                }),
                5 => Ok(Self::Move { seat: dec.object()?, serial: dec.uint()? }),
                6 => Ok(Self::Resize {
                    seat: dec.object()?,
                    serial: dec.uint()?,
                    edges: dec.uint()?,
                }),
                7 => Ok(Self::SetMaxSize { width: dec.int()?, height: dec.int()? }),
                8 => Ok(Self::SetMinSize { width: dec.int()?, height: dec.int()? }),
                9 => Ok(Self::SetMaximized),
                10 => Ok(Self::UnsetMaximized),
                11 => {
                    let output = dec.object()?;
                    Ok(Self::SetFullscreen { output: (output != 0).then_some(output) })
                }
                12 => Ok(Self::UnsetFullscreen),
                13 => Ok(Self::SetMinimized),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: XDG_TOPLEVEL_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }

    /// Events of `xdg_toplevel`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event<'a> {
        /// The compositor suggests a new window state.
        Configure {
            /// Suggested width, 0 for "client decides".
            width: i32,
            /// Suggested height, 0 for "client decides".
            height: i32,
            /// Active `state` values, one word each.
            states: &'a [u32],
        },
        /// The user or compositor wants the window closed.
        Close,
    }

    impl<'a> Payload<'a> for Event<'a> {
        fn interface() -> &'static Interface {
            &XDG_TOPLEVEL_INTERFACE
        }

        fn direction() -> Direction {
            Direction::Event
        }

        fn opcode(&self) -> u16 {
            match *self {
                Self::Configure { .. } => 0,
                Self::Close => 1,
            }
        }

        fn write(&self, enc: &mut Encoder<'_>) -> Result<(), MessageWriteError> {
            match *self {
                Self::Configure { width, height, states } => {
                    enc.int(width)?;
                    enc.int(height)?;
                    enc.array(states)
                }
                Self::Close => Ok(()),
            }
        }

        fn parse(opcode: u16, dec: &mut Decoder<'a>) -> Result<Self, MessageParseError> {
            match opcode {
                0 => Ok(Self::Configure {
                    width: dec.int()?,
                    height: dec.int()?,
                    states: dec.array()?,
                }),
                1 => Ok(Self::Close),
                _ => Err(MessageParseError::UnknownOpcode {
                    interface: XDG_TOPLEVEL_INTERFACE.name,
                    opcode,
                }),
            }
        }
    }
}
