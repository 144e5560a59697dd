use crate::FaultCode;

/// Default capacity, in entries, of both machine stacks.
pub const DEFAULT_STACK_CAPACITY: usize = 4096;

/// LIFO storage with a fixed maximum depth.
///
/// Pops report emptiness through `Option`; the caller decides which stack
/// underflow fault applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedStack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: Copy> BoundedStack<T> {
    /// Creates an empty stack holding at most `capacity` entries.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Pushes `value`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::StackOverflow`] when the stack is full.
    pub fn push(&mut self, value: T) -> Result<(), FaultCode> {
        if self.items.len() >= self.capacity {
            return Err(FaultCode::StackOverflow);
        }
        self.items.push(value);
        Ok(())
    }

    /// Removes and returns the top entry.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Returns the top entry without removing it.
    #[must_use]
    pub fn top(&self) -> Option<T> {
        self.items.last().copied()
    }

    /// Returns the entry `depth` places below the top (`0` is the top).
    #[must_use]
    pub fn peek(&self, depth: usize) -> Option<T> {
        let index = self.items.len().checked_sub(depth + 1)?;
        self.items.get(index).copied()
    }

    /// Returns `true` when `count` more entries fit after popping `pops`.
    #[must_use]
    pub fn has_room(&self, pops: usize, count: usize) -> bool {
        self.items.len().saturating_sub(pops) + count <= self.capacity
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum depth.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries, bottom first.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}
