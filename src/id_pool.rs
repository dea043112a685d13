//! Client-side object id allocation.
//!
//! Ids name live protocol objects on one connection. Id 1 is the
//! `wl_display` singleton; everything the client creates draws from 2
//! upwards. An id only becomes reusable once the server acknowledges the
//! object's death with `wl_display.delete_id`.

/// Ids at or above this bound belong to the server's allocation range and
/// are never produced client-side.
pub const SERVER_ID_LIMIT: u32 = 0xFF00_0000;

// Free-list length past which a high-water warning is logged once.
const FREE_LIST_HIGH_WATER: usize = 1024;

/// Allocator for client-side object ids, recycling ids the server has
/// released.
#[derive(Debug)]
pub struct IdPool {
    next_id: u32,
    free_ids: Vec<u32>,
    high_water_logged: bool,
}

impl Default for IdPool {
    fn default() -> Self {
        Self::new()
    }
}

impl IdPool {
    /// Create an empty pool. The first id handed out is 2.
    pub fn new() -> Self {
        Self { next_id: 2, free_ids: Vec::new(), high_water_logged: false }
    }

    /// Allocate an id, preferring the most recently recycled one.
    pub fn create(&mut self) -> u32 {
        if let Some(id) = self.free_ids.pop() {
            return id;
        }
        let id = self.next_id;
        assert!(id < SERVER_ID_LIMIT, "client object ids exhausted");
        self.next_id += 1;
        id
    }

    /// Return an id to the pool after the server sent `delete_id` for it.
    ///
    /// Duplicate notifications are ignored, as are ids the pool never
    /// produced; the free list holds each id at most once.
    pub fn destroy(&mut self, id: u32) {
        if id < 2 || id >= self.next_id {
            log::debug!("ignoring delete_id for unallocated id {id}");
            return;
        }
        if self.free_ids.contains(&id) {
            return;
        }
        self.free_ids.push(id);
        if self.free_ids.len() > FREE_LIST_HIGH_WATER && !self.high_water_logged {
            self.high_water_logged = true;
            log::warn!(
                "id free list exceeded {FREE_LIST_HIGH_WATER} entries; \
                 the peer is deleting far more objects than are being created"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_two_and_increase() {
        let mut pool = IdPool::new();
        assert_eq!(pool.create(), 2);
        assert_eq!(pool.create(), 3);
        assert_eq!(pool.create(), 4);
    }

    #[test]
    fn recycles_lifo() {
        let mut pool = IdPool::new();
        let a = pool.create();
        let b = pool.create();
        pool.destroy(a);
        pool.destroy(b);
        assert_eq!(pool.create(), b);
        assert_eq!(pool.create(), a);
        assert_eq!(pool.create(), 4);
    }

    #[test]
    fn duplicate_destroy_is_idempotent() {
        let mut pool = IdPool::new();
        let a = pool.create();
        let _b = pool.create();
        pool.destroy(a);
        pool.destroy(a);
        assert_eq!(pool.create(), a);
        // the second destroy must not have queued `a` twice
        assert_eq!(pool.create(), 4);
    }

    #[test]
    fn never_hands_out_reserved_ids() {
        let mut pool = IdPool::new();
        pool.destroy(0);
        pool.destroy(1);
        assert_eq!(pool.create(), 2);
    }

    #[test]
    fn ignores_ids_it_never_produced() {
        let mut pool = IdPool::new();
        let _ = pool.create();
        pool.destroy(1000);
        assert_eq!(pool.create(), 3);
    }
}
