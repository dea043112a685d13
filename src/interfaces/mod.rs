//! The static interface catalog.
//!
//! Each interface appears twice: as an [`Interface`](crate::protocol::Interface)
//! descriptor naming every opcode and its argument kinds, and as a module of
//! typed `Request`/`Event` enums implementing
//! [`Payload`](crate::wire::Payload). The two are kept in lockstep by hand
//! (and by the tests below); opcodes equal list position, matching the
//! published protocol files, so the catalog is wire-compatible with real
//! compositors.
//!
//! Interfaces whose arguments use the fixed-point wire type (`wl_pointer`,
//! `wl_touch`, `wl_output`) are not catalogued; requests creating such
//! objects still encode fine, they just hand out ids this crate cannot
//! decode events for.

mod compositor;
mod core;
mod seat;
mod shm;
mod xdg;

pub use self::compositor::{
    wl_compositor, wl_region, wl_surface, WL_COMPOSITOR_INTERFACE, WL_REGION_INTERFACE,
    WL_SURFACE_INTERFACE,
};
pub use self::core::{
    wl_callback, wl_display, wl_registry, WL_CALLBACK_INTERFACE, WL_DISPLAY_INTERFACE,
    WL_REGISTRY_INTERFACE,
};
pub use self::seat::{wl_keyboard, wl_seat, WL_KEYBOARD_INTERFACE, WL_SEAT_INTERFACE};
pub use self::shm::{
    wl_buffer, wl_shm, wl_shm_pool, WL_BUFFER_INTERFACE, WL_SHM_INTERFACE,
    WL_SHM_POOL_INTERFACE,
};
pub use self::xdg::{
    xdg_surface, xdg_toplevel, xdg_wm_base, XDG_SURFACE_INTERFACE, XDG_TOPLEVEL_INTERFACE,
    XDG_WM_BASE_INTERFACE,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ArgumentType, Direction, Interface};
    use crate::wire::Payload;

    static CATALOG: &[&Interface] = &[
        &WL_DISPLAY_INTERFACE,
        &WL_REGISTRY_INTERFACE,
        &WL_CALLBACK_INTERFACE,
        &WL_COMPOSITOR_INTERFACE,
        &WL_SURFACE_INTERFACE,
        &WL_REGION_INTERFACE,
        &WL_SHM_INTERFACE,
        &WL_SHM_POOL_INTERFACE,
        &WL_BUFFER_INTERFACE,
        &WL_SEAT_INTERFACE,
        &WL_KEYBOARD_INTERFACE,
        &XDG_WM_BASE_INTERFACE,
        &XDG_SURFACE_INTERFACE,
        &XDG_TOPLEVEL_INTERFACE,
    ];

    #[test]
    fn names_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn fd_bearing_messages_are_the_known_two() {
        let mut carriers = Vec::new();
        for interface in CATALOG {
            for desc in interface.requests.iter().chain(interface.events) {
                if desc.signature.iter().any(|arg| matches!(arg, ArgumentType::Fd)) {
                    carriers.push((interface.name, desc.name));
                }
            }
        }
        assert_eq!(carriers, vec![("wl_shm", "create_pool"), ("wl_keyboard", "keymap")]);
    }

    #[test]
    fn descriptor_positions_match_known_opcodes() {
        assert_eq!(WL_DISPLAY_INTERFACE.message(Direction::Request, 1).unwrap().name, "get_registry");
        assert_eq!(WL_REGISTRY_INTERFACE.message(Direction::Request, 0).unwrap().name, "bind");
        assert_eq!(WL_SURFACE_INTERFACE.message(Direction::Request, 6).unwrap().name, "commit");
        assert_eq!(WL_SEAT_INTERFACE.message(Direction::Event, 0).unwrap().name, "capabilities");
        assert_eq!(XDG_TOPLEVEL_INTERFACE.message(Direction::Request, 13).unwrap().name, "set_minimized");
        assert!(WL_CALLBACK_INTERFACE.message(Direction::Request, 0).is_none());
    }

    #[test]
    fn typed_opcodes_agree_with_descriptors() {
        assert_eq!(wl_display::Request::GetRegistry { registry: 2 }.opcode(), 1);
        assert_eq!(wl_surface::Request::Commit.opcode(), 6);
        assert_eq!(
            wl_keyboard::Event::Leave { serial: 0, surface: 0 }.opcode() as usize,
            WL_KEYBOARD_INTERFACE
                .events
                .iter()
                .position(|desc| desc.name == "leave")
                .unwrap()
        );
        assert_eq!(xdg_toplevel::Request::SetMinimized.opcode(), 13);
    }

    #[test]
    fn create_pool_carries_exactly_one_fd() {
        assert_eq!(WL_SHM_INTERFACE.requests[0].fd_count(), 1);
        assert_eq!(WL_KEYBOARD_INTERFACE.events[0].fd_count(), 1);
        assert_eq!(WL_REGISTRY_INTERFACE.requests[0].fd_count(), 0);
    }
}
