//! The registry bootstrap: discover the compositor's globals and bind the
//! ones the caller requires.
//!
//! The handshake uses the two synchronization primitives the core protocol
//! provides: `wl_display.get_registry` makes the compositor replay every
//! current global as a `wl_registry.global` event, and a `wl_display.sync`
//! callback queued right behind it marks the end of that replay.

use crate::conn::{Connection, RecvError, SendError};
use crate::id_pool::IdPool;
use crate::interfaces::{wl_callback, wl_display, wl_registry};
use crate::protocol::{Interface, DISPLAY_ID};
use crate::wire::{parse_message, MessageParseError};

/// An error while binding required globals.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The compositor advertises the interface at a version older than the
    /// catalog requires.
    #[error("compositor advertises {interface} v{advertised}, v{required} is required")]
    IncompatibleVersion {
        /// The interface in question.
        interface: &'static str,
        /// The version the compositor offered.
        advertised: u32,
        /// The version the caller's catalog entry demands.
        required: u32,
    },

    /// A request could not be sent.
    #[error(transparent)]
    Send(#[from] SendError),

    /// An event could not be received.
    #[error(transparent)]
    Recv(#[from] RecvError),

    /// An event could not be decoded. Terminal for the connection.
    #[error(transparent)]
    Parse(#[from] MessageParseError),
}

/// Bind the given interfaces against the compositor's advertised globals.
///
/// Returns one entry per element of `required`, in order: the bound object
/// id, or `None` if the compositor never advertised that interface. Each
/// required interface is bound at its catalog version
/// ([`Interface::version`]); an advertisement older than that aborts with
/// [`BindError::IncompatibleVersion`].
///
/// Globals removed while the handshake is in flight are ignored; if such a
/// removal names a global this call just bound, the returned id is already
/// dead and the first use of it will draw a protocol error. The bootstrap
/// does not track that race.
pub fn register_globals(
    conn: &mut Connection,
    ids: &mut IdPool,
    required: &[&'static Interface],
) -> Result<Vec<Option<u32>>, BindError> {
    let registry_id = ids.create();
    conn.send(DISPLAY_ID, &wl_display::Request::GetRegistry { registry: registry_id })?;

    // the compositor answers the sync only after every global event above
    let done_id = ids.create();
    conn.send(DISPLAY_ID, &wl_display::Request::Sync { callback: done_id })?;

    let mut bound = vec![None; required.len()];
    loop {
        let (header, body) = conn.recv()?;

        if header.object_id == registry_id {
            let event = parse_message::<wl_registry::Event>(header, body)?;
            match event {
                wl_registry::Event::Global { name, interface, version } => {
                    let slot = required
                        .iter()
                        .enumerate()
                        .find(|(idx, iface)| iface.name == interface && bound[*idx].is_none())
                        .map(|(idx, _)| idx);
                    // the advertised string dies on the next recv; keep a copy
                    // to echo back in the bind
                    let interface = interface.to_owned();
                    let slot = match slot {
                        Some(slot) => slot,
                        None => {
                            log::debug!("skipping global {interface} v{version} (not required)");
                            continue;
                        }
                    };
                    let iface = required[slot];
                    if version < iface.version {
                        return Err(BindError::IncompatibleVersion {
                            interface: iface.name,
                            advertised: version,
                            required: iface.version,
                        });
                    }
                    let id = ids.create();
                    conn.send(
                        registry_id,
                        &wl_registry::Request::Bind {
                            name,
                            interface: &interface,
                            version: iface.version,
                            id,
                        },
                    )?;
                    bound[slot] = Some(id);
                }
                wl_registry::Event::GlobalRemove { name } => {
                    log::debug!("global {name} removed during bootstrap (ignored)");
                }
            }
        } else if header.object_id == done_id {
            let wl_callback::Event::Done { .. } = parse_message::<wl_callback::Event>(header, body)?;
            break;
        } else if header.object_id == DISPLAY_ID {
            let event = parse_message::<wl_display::Event>(header, body)?;
            match event {
                wl_display::Event::DeleteId { id } => ids.destroy(id),
                wl_display::Event::Error { object_id, code, message } => {
                    log::error!("protocol error on object {object_id} (code {code}): {message}");
                }
            }
        } else {
            log::debug!(
                "ignoring event for object {} (opcode {}) during bootstrap",
                header.object_id,
                header.opcode
            );
        }
    }

    Ok(bound)
}
