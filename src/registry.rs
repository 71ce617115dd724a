//! Generation-checked handles for solver instances.
//!
//! A [`Handle`] packs a slot index with the slot's generation. Destroying an
//! instance bumps the generation, so stale handles are detected instead of
//! reaching another instance. Resolving stays a bounds check and a compare.

use tracing::debug;

use crate::{
    config::SolverConfig,
    error::{Error, Result},
    instance::Instance,
};

/// Opaque instance handle. Its raw value is never `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Handle(u64);

impl Handle {
    fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn into_raw(self) -> u64 {
        self.0
    }

    fn index(self) -> usize {
        (self.0 & u32::MAX as u64) as usize
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct Registry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn insert(&mut self, value: T) -> Result<Handle> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none());
            slot.value = Some(value);
            self.live += 1;
            return Ok(Handle::new(index, slot.generation));
        }

        let index = u32::try_from(self.slots.len()).map_err(|_| Error::OutOfMemory)?;
        self.slots.try_reserve(1)?;
        // removal must not allocate
        self.free.try_reserve(self.slots.len() + 1 - self.free.len())?;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        self.live += 1;
        Ok(Handle::new(index, 1))
    }

    pub fn remove(&mut self, handle: Handle) -> Result<T> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .ok_or(Error::InvalidHandle(handle.into_raw()))?;
        let value = slot
            .value
            .take()
            .ok_or(Error::InvalidHandle(handle.into_raw()))?;
        // generation 0 is never handed out, keeping raw handles nonzero
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free.push(handle.index() as u32);
        self.live -= 1;
        Ok(value)
    }

    pub fn get(&self, handle: Handle) -> Result<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_ref())
            .ok_or(Error::InvalidHandle(handle.into_raw()))
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_mut())
            .ok_or(Error::InvalidHandle(handle.into_raw()))
    }
}

/// Instance lifecycle for any slot type that can wrap a fresh [`Instance`],
/// e.g. `Instance` itself or a shared, lockable wrapper.
impl<T: From<Instance>> Registry<T> {
    pub fn create(&mut self) -> Result<Handle> {
        self.create_with(SolverConfig::default())
    }

    pub fn create_with(&mut self, config: SolverConfig) -> Result<Handle> {
        let handle = self.insert(T::from(Instance::with_config(config)))?;
        debug!(handle = handle.into_raw(), live = self.len(), "instance created");
        Ok(handle)
    }

    /// Removes the slot and returns its value; the handle is stale from now on.
    pub fn destroy(&mut self, handle: Handle) -> Result<T> {
        let value = self.remove(handle)?;
        debug!(handle = handle.into_raw(), live = self.len(), "instance destroyed");
        Ok(value)
    }

    pub fn resolve(&mut self, handle: Handle) -> Result<&mut T> {
        self.get_mut(handle)
    }
}
