//! Client-side implementation of the Wayland wire protocol.
//!
//! This crate speaks the byte-level protocol a Wayland client exchanges
//! with a compositor over a Unix stream: typed messages framed into
//! word-oriented payloads, file descriptors carried as SCM_RIGHTS ancillary
//! data, client-side object id allocation, and the registry handshake that
//! discovers and binds the compositor's globals.
//!
//! It deliberately stops there. There are no proxy objects, no event queues
//! and no dispatching; received messages are handed back as typed enums and
//! what happens next is the caller's business. Integrators that want
//! readiness-driven operation can poll the connection's fd (it implements
//! [`AsFd`](std::os::fd::AsFd)) and call [`Connection::recv`] when it is
//! readable.
//!
//! # Typical setup
//!
//! ```no_run
//! use wayland_wire::interfaces::{WL_COMPOSITOR_INTERFACE, WL_SHM_INTERFACE};
//! use wayland_wire::{register_globals, Connection, IdPool};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut conn = Connection::connect_to_env()?;
//! let mut ids = IdPool::new();
//! let globals =
//!     register_globals(&mut conn, &mut ids, &[&WL_COMPOSITOR_INTERFACE, &WL_SHM_INTERFACE])?;
//! # let _ = globals;
//! # Ok(())
//! # }
//! ```
//!
//! # Lifetimes of received data
//!
//! Strings and arrays decoded from an event borrow the connection's receive
//! buffer and are invalidated by the next [`Connection::recv`]. Copy out
//! anything that needs to live longer. File descriptors are not part of the
//! decoded value at all: claim them with [`Connection::take_fd`], once per
//! fd argument, in field order.
//!
//! # Logging
//!
//! Message traces and protocol warnings go through the [`log`] facade; the
//! crate never installs a logger.

#![warn(missing_docs, missing_debug_implementations)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod conn;
pub mod id_pool;
pub mod interfaces;
pub mod protocol;
pub mod registry;
mod socket;
pub mod wire;

pub use conn::{ConnectError, Connection, EmptyFdQueue, RecvError, SendError};
pub use id_pool::IdPool;
pub use protocol::{
    Direction, Interface, MessageDesc, MessageHeader, WEnum, WEnumError, DISPLAY_ID,
};
pub use registry::{register_globals, BindError};
pub use wire::{parse_message, write_message, MessageParseError, MessageWriteError, Payload};
