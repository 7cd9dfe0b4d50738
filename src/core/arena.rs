//! Block-chain arena for DOM entities
//!
//! Entities live in fixed-capacity blocks. A full block is never grown in
//! place; a new block is chained instead, so an entity's storage never moves
//! once allocated. Handles are `u32` indices: `block * block_slots + slot`.
//!
//! Entities are never freed individually. Dropping the arena releases every
//! block in one linear pass.

use crate::error::AllocError;

/// Default number of slots per block
pub const DEFAULT_BLOCK_SLOTS: usize = 512;

/// Chained fixed-size blocks with stable `u32` handles
#[derive(Debug)]
pub struct Arena<T> {
    blocks: Vec<Vec<T>>,
    /// log2 of the slots per block
    shift: u32,
    len: usize,
}

impl<T> Arena<T> {
    /// Create an empty arena with the default block size
    pub fn new() -> Self {
        Self::with_block_slots(DEFAULT_BLOCK_SLOTS)
    }

    /// Create an empty arena; `slots` is rounded up to a power of two
    pub fn with_block_slots(slots: usize) -> Self {
        let slots = slots.max(1).next_power_of_two();
        Arena {
            blocks: Vec::new(),
            shift: slots.trailing_zeros(),
            len: 0,
        }
    }

    /// Number of slots in each block
    #[inline]
    pub fn block_slots(&self) -> usize {
        1 << self.shift
    }

    /// Number of entities allocated so far
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks in the chain
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Store `value` and return its handle.
    ///
    /// Fails only when a new block cannot be reserved or the handle space
    /// is exhausted; the arena is left unchanged in that case.
    pub fn alloc(&mut self, value: T) -> Result<u32, AllocError> {
        let index = u32::try_from(self.len).map_err(|_| AllocError)?;
        let slots = self.block_slots();

        let tail_full = self.blocks.last().map_or(true, |block| block.len() == slots);
        if tail_full {
            self.push_block()?;
        }

        // push_block guarantees a tail with spare reserved capacity
        let Some(tail) = self.blocks.last_mut() else {
            return Err(AllocError);
        };
        tail.push(value);
        self.len += 1;
        Ok(index)
    }

    fn push_block(&mut self) -> Result<(), AllocError> {
        let mut block = Vec::new();
        block
            .try_reserve_exact(self.block_slots())
            .map_err(|_| AllocError)?;
        self.blocks.try_reserve(1).map_err(|_| AllocError)?;
        self.blocks.push(block);
        tracing::trace!(
            blocks = self.blocks.len(),
            slots = self.block_slots(),
            "arena block allocated"
        );
        Ok(())
    }

    /// Look up an entity by handle
    #[inline]
    pub fn get(&self, index: u32) -> Option<&T> {
        let (block, slot) = self.locate(index);
        self.blocks.get(block)?.get(slot)
    }

    /// Look up an entity by handle for mutation
    #[inline]
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        let (block, slot) = self.locate(index);
        self.blocks.get_mut(block)?.get_mut(slot)
    }

    #[inline]
    fn locate(&self, index: u32) -> (usize, usize) {
        let index = index as usize;
        (index >> self.shift, index & (self.block_slots() - 1))
    }

    /// Iterate over every entity in allocation order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().flat_map(|block| block.iter())
    }

    /// Heap bytes reserved by the block chain
    pub fn reserved_bytes(&self) -> usize {
        let slots: usize = self.blocks.iter().map(Vec::capacity).sum();
        slots * std::mem::size_of::<T>() + self.blocks.capacity() * std::mem::size_of::<Vec<T>>()
    }

    /// Release every block at once
    pub fn clear(&mut self) {
        self.blocks = Vec::new();
        self.len = 0;
    }

    /// Empty the arena down to its first block and store `first` at handle 0.
    ///
    /// The first block is kept across resets, so only a fresh arena
    /// allocates here, and that allocation is infallible like any `Vec`.
    pub fn reset_with(&mut self, first: T) {
        self.blocks.truncate(1);
        let slots = self.block_slots();
        match self.blocks.first_mut() {
            Some(block) => {
                block.clear();
                block.push(first);
            }
            None => {
                let mut block = Vec::with_capacity(slots);
                block.push(first);
                self.blocks.push(block);
            }
        }
        self.len = 1;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
