//! Generation-checked handles for editor element arenas
//!
//! Editor documents keep their elements (property nodes, rig bones) in a
//! [`HandleMap`]. A [`Handle`] packs a slot index with the generation of the
//! slot at allocation time, so a handle kept by an undo command after the
//! element was destroyed resolves to [`HandleError::Stale`] instead of
//! aliasing whatever reuses the slot.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use crate::error::HandleError;

/// A type-safe handle to an element of type T
#[repr(transparent)]
pub struct Handle<T> {
    /// Lower 24 bits: index, Upper 8 bits: generation
    bits: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Maximum index value (24 bits)
    pub const MAX_INDEX: u32 = (1 << 24) - 1;

    /// Create a new handle from index and generation
    #[inline]
    pub const fn new(index: u32, generation: u8) -> Self {
        debug_assert!(index <= Self::MAX_INDEX);
        Self {
            bits: (generation as u32) << 24 | index,
            _marker: PhantomData,
        }
    }

    /// Create an invalid/null handle
    #[inline]
    pub const fn null() -> Self {
        Self {
            bits: u32::MAX,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.bits == u32::MAX
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits & Self::MAX_INDEX
    }

    #[inline]
    pub const fn generation(&self) -> u8 {
        (self.bits >> 24) as u8
    }

    /// Raw bits, stable for the lifetime of the element
    #[inline]
    pub const fn to_bits(&self) -> u32 {
        self.bits
    }
}

// Manual trait implementations to avoid T bounds
impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = core::any::type_name::<T>().rsplit("::").next().unwrap_or("?");
        if self.is_null() {
            write!(f, "{}(null)", name)
        } else {
            write!(f, "{}({}v{})", name, self.index(), self.generation())
        }
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::null()
    }
}

/// Allocates handles with generation tracking
pub struct HandleAllocator<T> {
    /// Generations for each slot
    generations: Vec<u8>,
    /// Free list of available indices
    free_list: Vec<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HandleAllocator<T> {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocate a new handle, reusing freed slots first
    pub fn allocate(&mut self) -> Result<Handle<T>, HandleError> {
        if let Some(index) = self.free_list.pop() {
            return Ok(Handle::new(index, self.generations[index as usize]));
        }
        let index = self.generations.len() as u32;
        if index > Handle::<T>::MAX_INDEX {
            return Err(HandleError::Exhausted);
        }
        self.generations.push(0);
        Ok(Handle::new(index, 0))
    }

    /// Free a handle, making its slot available for reuse
    pub fn free(&mut self, handle: Handle<T>) -> Result<(), HandleError> {
        self.check(handle)?;
        let gen = &mut self.generations[handle.index() as usize];
        *gen = gen.wrapping_add(1);
        self.free_list.push(handle.index());
        Ok(())
    }

    /// Validate a handle, reporting why it does not resolve
    pub fn check(&self, handle: Handle<T>) -> Result<(), HandleError> {
        if handle.is_null() {
            return Err(HandleError::Null);
        }
        match self.generations.get(handle.index() as usize) {
            None => Err(HandleError::OutOfBounds),
            Some(&gen) if gen != handle.generation() => Err(HandleError::Stale),
            Some(_) => Ok(()),
        }
    }

    pub fn is_valid(&self, handle: Handle<T>) -> bool {
        self.check(handle).is_ok()
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HandleAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena storing values addressed by handles
pub struct HandleMap<T> {
    allocator: HandleAllocator<T>,
    values: Vec<Option<T>>,
}

impl<T> HandleMap<T> {
    pub fn new() -> Self {
        Self {
            allocator: HandleAllocator::new(),
            values: Vec::new(),
        }
    }

    /// Create a map holding a single value at the first slot
    pub fn with_first(value: T) -> (Self, Handle<T>) {
        let mut allocator = HandleAllocator::new();
        allocator.generations.push(0);
        let map = Self {
            allocator,
            values: vec![Some(value)],
        };
        (map, Handle::new(0, 0))
    }

    /// Insert a value and get a handle to it
    pub fn insert(&mut self, value: T) -> Result<Handle<T>, HandleError> {
        let handle = self.allocator.allocate()?;
        let index = handle.index() as usize;
        if index >= self.values.len() {
            self.values.resize_with(index + 1, || None);
        }
        self.values[index] = Some(value);
        Ok(handle)
    }

    /// Remove a value by its handle
    pub fn remove(&mut self, handle: Handle<T>) -> Result<T, HandleError> {
        self.allocator.free(handle)?;
        self.values[handle.index() as usize]
            .take()
            .ok_or(HandleError::Stale)
    }

    pub fn get(&self, handle: Handle<T>) -> Result<&T, HandleError> {
        self.allocator.check(handle)?;
        self.values[handle.index() as usize]
            .as_ref()
            .ok_or(HandleError::Stale)
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Result<&mut T, HandleError> {
        self.allocator.check(handle)?;
        self.values[handle.index() as usize]
            .as_mut()
            .ok_or(HandleError::Stale)
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.allocator.is_valid(handle)
    }

    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocator.is_empty()
    }

    /// Iterate over all live handles and values in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        let gens = &self.allocator.generations;
        self.values
            .iter()
            .enumerate()
            .filter_map(move |(i, opt)| opt.as_ref().map(|v| (Handle::new(i as u32, gens[i]), v)))
    }

    /// Iterate over all live handles and mutable values in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        let gens = &self.allocator.generations;
        self.values
            .iter_mut()
            .enumerate()
            .filter_map(move |(i, opt)| opt.as_mut().map(|v| (Handle::new(i as u32, gens[i]), v)))
    }
}

impl<T> Default for HandleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
