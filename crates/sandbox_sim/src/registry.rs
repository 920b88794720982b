//! Entity registry - generational slots for live entities
//!
//! Handles carry a generation so a handle to a removed entity never resolves
//! to whatever later reuses its slot.

use std::fmt;

/// Identifier of an entity in an [`EntityRegistry`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Slot index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into a u64
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Unpack from a u64
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }

    /// Encode as body/shape user data. Zero is reserved for "no entity".
    #[inline]
    pub const fn to_user_data(&self) -> u128 {
        self.to_bits() as u128 + 1
    }

    /// Decode user data written by [`to_user_data`](Self::to_user_data)
    pub fn from_user_data(data: u128) -> Option<Self> {
        if data == 0 || data > u64::MAX as u128 + 1 {
            return None;
        }
        Some(Self::from_bits((data - 1) as u64))
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityHandle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena with a free list
pub struct EntityRegistry<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> Default for EntityRegistry<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }
}

impl<T> EntityRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the next insertion will receive
    fn next_handle(&self) -> EntityHandle {
        match self.free_list.last() {
            Some(&index) => EntityHandle {
                index,
                generation: self.slots[index as usize].generation,
            },
            None => EntityHandle {
                index: self.slots.len() as u32,
                generation: 0,
            },
        }
    }

    /// Insert a value that needs to know its own handle while being built.
    ///
    /// Nothing is allocated when `build` fails.
    pub fn try_insert_with<E>(
        &mut self,
        build: impl FnOnce(EntityHandle) -> Result<T, E>,
    ) -> Result<EntityHandle, E> {
        let handle = self.next_handle();
        let value = build(handle)?;

        if handle.index as usize == self.slots.len() {
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
        } else {
            self.free_list.pop();
            self.slots[handle.index as usize].value = Some(value);
        }
        self.len += 1;
        Ok(handle)
    }

    /// Insert a value
    pub fn insert(&mut self, value: T) -> EntityHandle {
        match self.try_insert_with::<std::convert::Infallible>(|_| Ok(value)) {
            Ok(handle) => handle,
            Err(never) => match never {},
        }
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Whether the handle still names a live value
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Remove a value, invalidating its handle. `None` when already gone.
    pub fn remove(&mut self, handle: EntityHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live values with their handles, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    EntityHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|value| {
                (
                    EntityHandle {
                        index: index as u32,
                        generation,
                    },
                    value,
                )
            })
        })
    }

    /// Handles of every live value
    pub fn handles(&self) -> Vec<EntityHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Remove every value, returning them with their handles
    pub fn drain(&mut self) -> Vec<(EntityHandle, T)> {
        let mut drained = Vec::with_capacity(self.len);
        for handle in self.handles() {
            if let Some(value) = self.remove(handle) {
                drained.push((handle, value));
            }
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handle_does_not_resolve() {
        let mut registry = EntityRegistry::new();
        let first = registry.insert("coin");
        assert_eq!(registry.remove(first), Some("coin"));

        let second = registry.insert("ball");
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert!(registry.get(first).is_none());
        assert_eq!(registry.get(second), Some(&"ball"));
    }

    #[test]
    fn double_remove_is_none() {
        let mut registry = EntityRegistry::new();
        let handle = registry.insert(1);
        assert!(registry.remove(handle).is_some());
        assert!(registry.remove(handle).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn failed_build_allocates_nothing() {
        let mut registry: EntityRegistry<u32> = EntityRegistry::new();
        let result: Result<_, &str> = registry.try_insert_with(|_| Err("no"));
        assert!(result.is_err());
        assert!(registry.is_empty());

        let handle = registry.try_insert_with::<()>(|h| Ok(h.index())).unwrap();
        assert_eq!(handle.index(), 0);
        assert_eq!(registry.get(handle), Some(&0));
    }

    #[test]
    fn user_data_round_trip_reserves_zero() {
        let mut registry = EntityRegistry::new();
        let handle = registry.insert(());
        let data = handle.to_user_data();
        assert_ne!(data, 0);
        assert_eq!(EntityHandle::from_user_data(data), Some(handle));
        assert_eq!(EntityHandle::from_user_data(0), None);
    }

    #[test]
    fn drain_empties_registry() {
        let mut registry = EntityRegistry::new();
        let a = registry.insert('a');
        let b = registry.insert('b');
        let drained = registry.drain();
        assert_eq!(drained, vec![(a, 'a'), (b, 'b')]);
        assert!(registry.is_empty());
        assert!(!registry.contains(a));
    }
}
