//! Generational slot arena backing node and edge ownership
//!
//! Slots freed by removal go on a free list and are handed out again with a
//! bumped generation, so a handle to a removed entity never resolves to the
//! entity that later reuses its slot.

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// The `(index, generation)` the next `insert` will use.
    pub(crate) fn vacant_key(&self) -> (u32, u32) {
        match self.free.last() {
            Some(&index) => (index, self.slots[index as usize].generation),
            None => (slot_index(self.slots.len()), 0),
        }
    }

    /// # Panics
    ///
    /// When a new slot would need an index above `u32::MAX`, the same way
    /// `Vec` panics on capacity overflow.
    pub(crate) fn insert(&mut self, value: T) -> (u32, u32) {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return (index, slot.generation);
        }
        let index = slot_index(self.slots.len());
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        (index, 0)
    }

    pub(crate) fn get(&self, (index, generation): (u32, u32)) -> Option<&T> {
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, (index, generation): (u32, u32)) -> Option<&mut T> {
        self.slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub(crate) fn contains(&self, key: (u32, u32)) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn remove(&mut self, (index, generation): (u32, u32)) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;
        Some(value)
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

/// Index for a slot appended at position `len`.
fn slot_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("arena full: slot index {} exceeds u32::MAX", len))
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
