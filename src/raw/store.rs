use alloc::vec::Vec;
use core::mem;

use super::handle::Handle;
use crate::error::{Error, Result};

/// How a tree obtains and recycles node storage.
///
/// The policy only affects allocation, freeing and reservation; the balancing
/// logic is identical under all three.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum AllocationMode {
    /// Storage is handed back as soon as a node is removed; no free list is
    /// kept and clearing is a plain reset.
    #[default]
    DynamicDiscard,
    /// Removed nodes are kept on a free list and reused before any new storage
    /// is reserved. The free list can be pre-populated with `reserve`.
    DynamicRetain,
    /// All storage is reserved at construction; allocating past it fails with
    /// [`Error::CapacityExhausted`].
    Fixed,
}

#[derive(Clone, Debug)]
enum Slot<T> {
    Occupied(T),
    // Next vacant slot in the free list.
    Vacant(Option<Handle>),
}

/// A node moved to a new slot by a discard-mode `free`.
///
/// Whoever links to `from` must be repointed to `to`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Relocation {
    pub(crate) from: Handle,
    pub(crate) to: Handle,
}

/// Flat node storage with an intrusive free list.
#[derive(Clone, Debug)]
pub(crate) struct NodeStore<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<Handle>,
    free_len: usize,
    live: usize,
    mode: AllocationMode,
}

impl<T> NodeStore<T> {
    /// Creates a store. Under `Fixed` and `DynamicRetain` the `capacity` is
    /// reserved as free nodes; under `DynamicDiscard` it is only a hint.
    ///
    /// # Panics
    ///
    /// Panics if a `Fixed` capacity exceeds the handle space.
    pub(crate) fn new(mode: AllocationMode, capacity: usize) -> Self {
        let mut store = Self {
            slots: Vec::new(),
            free_head: None,
            free_len: 0,
            live: 0,
            mode,
        };
        match mode {
            AllocationMode::DynamicDiscard => store.slots.reserve(capacity),
            AllocationMode::DynamicRetain | AllocationMode::Fixed => {
                assert!(
                    mode != AllocationMode::Fixed || capacity <= Handle::MAX + 1,
                    "`NodeStore::new()` - fixed capacity > handle space ({})",
                    Handle::MAX + 1
                );
                store.push_vacant(capacity.min(Handle::MAX + 1));
            }
        }
        tracing::debug!(?mode, capacity, "created node store");
        store
    }

    pub(crate) const fn mode(&self) -> AllocationMode {
        self.mode
    }

    /// Number of occupied slots.
    pub(crate) const fn live(&self) -> usize {
        self.live
    }

    /// Number of slots on the free list.
    pub(crate) const fn free_len(&self) -> usize {
        self.free_len
    }

    /// Number of slots ever handed out, occupied or vacant.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of nodes the store can hold without reserving more memory.
    pub(crate) fn capacity(&self) -> usize {
        match self.mode {
            AllocationMode::Fixed => self.slots.len(),
            AllocationMode::DynamicDiscard | AllocationMode::DynamicRetain => self.slots.capacity(),
        }
    }

    pub(crate) fn alloc(&mut self, value: T) -> Result<Handle> {
        if let Some(handle) = self.free_head {
            let slot = &mut self.slots[handle.index()];
            let Slot::Vacant(next) = *slot else {
                panic!("`NodeStore::alloc()` - free list points at an occupied slot!");
            };
            *slot = Slot::Occupied(value);
            self.free_head = next;
            self.free_len -= 1;
            self.live += 1;
            return Ok(handle);
        }

        if self.mode == AllocationMode::Fixed {
            let capacity = self.slots.len();
            tracing::warn!(capacity, "fixed node store exhausted");
            return Err(Error::CapacityExhausted { capacity });
        }

        let Some(handle) = Handle::new(self.slots.len()) else {
            tracing::warn!(capacity = Handle::MAX + 1, "node handle space exhausted");
            return Err(Error::CapacityExhausted {
                capacity: Handle::MAX + 1,
            });
        };
        self.slots.push(Slot::Occupied(value));
        self.live += 1;
        Ok(handle)
    }

    /// Releases a node and returns its payload.
    ///
    /// Under `DynamicDiscard` the last slot is moved into the hole; the returned
    /// [`Relocation`] says which handle changed.
    pub(crate) fn free(&mut self, handle: Handle) -> (T, Option<Relocation>) {
        let index = handle.index();
        match self.mode {
            AllocationMode::DynamicDiscard => {
                let last = self.slots.len() - 1;
                let Slot::Occupied(value) = self.slots.swap_remove(index) else {
                    panic!("`NodeStore::free()` - `handle` is vacant!");
                };
                self.live -= 1;
                let relocation = if index == last {
                    None
                } else {
                    Handle::new(last).map(|from| Relocation { from, to: handle })
                };
                (value, relocation)
            }
            AllocationMode::DynamicRetain | AllocationMode::Fixed => {
                let Slot::Occupied(value) = mem::replace(&mut self.slots[index], Slot::Vacant(self.free_head)) else {
                    panic!("`NodeStore::free()` - `handle` is vacant!");
                };
                self.free_head = Some(handle);
                self.free_len += 1;
                self.live -= 1;
                (value, None)
            }
        }
    }

    /// Makes room for `additional` more nodes.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        match self.mode {
            AllocationMode::DynamicDiscard => {
                self.slots.reserve(additional);
                Ok(())
            }
            AllocationMode::DynamicRetain => {
                let room = Handle::MAX + 1 - self.slots.len();
                if additional > room {
                    return Err(Error::CapacityExhausted {
                        capacity: Handle::MAX + 1,
                    });
                }
                self.push_vacant(additional);
                tracing::debug!(additional, free = self.free_len, "reserved free nodes");
                Ok(())
            }
            AllocationMode::Fixed => {
                if additional > self.free_len {
                    return Err(Error::InvalidArgument("a fixed-capacity store cannot grow"));
                }
                Ok(())
            }
        }
    }

    /// Drops every node. Retaining stores keep all slots on the free list.
    pub(crate) fn clear(&mut self) {
        match self.mode {
            AllocationMode::DynamicDiscard => {
                self.slots.clear();
                self.free_head = None;
                self.free_len = 0;
            }
            AllocationMode::DynamicRetain | AllocationMode::Fixed => {
                // Chain from the back so the lowest slot is handed out first.
                let mut head = None;
                for index in (0..self.slots.len()).rev() {
                    self.slots[index] = Slot::Vacant(head);
                    head = Handle::new(index);
                }
                self.free_head = head;
                self.free_len = self.slots.len();
            }
        }
        self.live = 0;
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.index()] {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => panic!("`NodeStore::get()` - `handle` is vacant!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.index()] {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => panic!("`NodeStore::get_mut()` - `handle` is vacant!"),
        }
    }

    /// Returns two distinct nodes mutably.
    pub(crate) fn get2_mut(&mut self, a: Handle, b: Handle) -> (&mut T, &mut T) {
        assert_ne!(a, b, "`NodeStore::get2_mut()` - handles alias!");
        let (low, high, swapped) = if a.index() < b.index() {
            (a.index(), b.index(), false)
        } else {
            (b.index(), a.index(), true)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let (Slot::Occupied(first), Slot::Occupied(second)) = (&mut head[low], &mut tail[0]) else {
            panic!("`NodeStore::get2_mut()` - `handle` is vacant!");
        };
        if swapped { (second, first) } else { (first, second) }
    }

    fn push_vacant(&mut self, additional: usize) {
        self.slots.reserve(additional);
        for _ in 0..additional {
            let Some(handle) = Handle::new(self.slots.len()) else {
                break;
            };
            self.slots.push(Slot::Vacant(self.free_head));
            self.free_head = Some(handle);
            self.free_len += 1;
        }
    }
}
