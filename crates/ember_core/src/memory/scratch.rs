//! # Scratch Pool
//!
//! Small free-list of reusable helper objects.

/// Objects that can be returned to a [`ScratchPool`].
pub trait Recycle {
    /// Resets the object for reuse without releasing its memory.
    fn recycle(&mut self);
}

impl<T> Recycle for Vec<T> {
    fn recycle(&mut self) {
        self.clear();
    }
}

/// Counters for pool behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScratchStats {
    /// Objects handed out.
    pub acquired: u64,
    /// Objects that had to be freshly created.
    pub created: u64,
    /// Objects returned and kept.
    pub retained: u64,
    /// Objects returned while the pool was full.
    pub discarded: u64,
}

/// A bounded free-list of reusable objects.
///
/// Unlike a slot allocator this hands objects out by value: the caller owns
/// the object for the duration of the tick and gives it back at the end.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It belongs to the single tick thread.
///
/// # Example
///
/// ```rust
/// use ember_core::ScratchPool;
///
/// let mut pool: ScratchPool<Vec<u32>> = ScratchPool::with_prewarmed(2);
///
/// let mut buffer = pool.acquire();
/// buffer.push(7);
/// pool.release(buffer);
///
/// // Same allocation, already cleared
/// assert!(pool.acquire().is_empty());
/// ```
#[derive(Debug)]
pub struct ScratchPool<T> {
    free: Vec<T>,
    max_retained: usize,
    stats: ScratchStats,
}

impl<T: Default + Recycle> ScratchPool<T> {
    /// Creates an empty pool that keeps at most `max_retained` idle objects.
    #[must_use]
    pub fn new(max_retained: usize) -> Self {
        Self {
            free: Vec::with_capacity(max_retained),
            max_retained,
            stats: ScratchStats::default(),
        }
    }

    /// Creates a pool with every idle slot already filled.
    #[must_use]
    pub fn with_prewarmed(max_retained: usize) -> Self {
        let mut pool = Self::new(max_retained);
        pool.free.extend((0..max_retained).map(|_| T::default()));
        pool
    }

    /// Takes an object, creating one only if the pool is empty.
    pub fn acquire(&mut self) -> T {
        self.stats.acquired += 1;
        if let Some(item) = self.free.pop() {
            item
        } else {
            self.stats.created += 1;
            T::default()
        }
    }

    /// Returns an object. It is recycled, or dropped if the pool is full.
    pub fn release(&mut self, mut item: T) {
        if self.free.len() < self.max_retained {
            item.recycle();
            self.free.push(item);
            self.stats.retained += 1;
        } else {
            self.stats.discarded += 1;
        }
    }

    /// Idle objects waiting for reuse.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    /// Returns the counters.
    #[must_use]
    pub const fn stats(&self) -> ScratchStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_allocation() {
        let mut pool: ScratchPool<Vec<u32>> = ScratchPool::new(1);

        let mut buffer = pool.acquire();
        buffer.extend(0..100);
        let capacity = buffer.capacity();
        pool.release(buffer);

        let again = pool.acquire();
        assert!(again.is_empty());
        assert_eq!(again.capacity(), capacity);
        assert_eq!(pool.stats().created, 1);
        assert_eq!(pool.stats().acquired, 2);
    }

    #[test]
    fn test_bounded_retention() {
        let mut pool: ScratchPool<Vec<u8>> = ScratchPool::new(1);
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);

        assert_eq!(pool.idle(), 1);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn test_prewarmed_never_creates() {
        let mut pool: ScratchPool<Vec<u8>> = ScratchPool::with_prewarmed(2);
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.stats().created, 0);
    }
}
