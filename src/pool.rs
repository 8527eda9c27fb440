//! Bounded pool of reusable byte buffers
//!
//! Rendering a line borrows a buffer from the pool instead of allocating a
//! fresh one per call. The pool grows lazily up to its ceiling and never
//! shrinks. When the ceiling is reached and no buffer is free, [`BufferPool::get`]
//! blocks until another caller returns one.

use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard};

struct PoolState {
    free: Vec<Vec<u8>>,
    /// Buffers ever allocated, checked out or not
    allocated: usize,
}

/// Free-list of byte buffers with a floor and a ceiling
pub struct BufferPool {
    state: Mutex<PoolState>,
    returned: Condvar,
    floor: usize,
    ceiling: usize,
}

impl BufferPool {
    /// Create a pool with `floor` buffers pre-allocated and at most `ceiling` in total
    pub fn new(floor: usize, ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        let floor = floor.min(ceiling);
        let free = (0..floor).map(|_| Vec::new()).collect();

        Self {
            state: Mutex::new(PoolState {
                free,
                allocated: floor,
            }),
            returned: Condvar::new(),
            floor,
            ceiling,
        }
    }

    /// Check out an empty buffer, blocking while the pool is exhausted
    pub fn get(&self) -> PooledBuffer<'_> {
        let mut state = self.lock();
        let buf = loop {
            if let Some(buf) = state.free.pop() {
                break buf;
            }
            if state.allocated < self.ceiling {
                state.allocated += 1;
                break Vec::new();
            }
            state = self
                .returned
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        };

        PooledBuffer { buf, pool: self }
    }

    /// Clear a buffer and make it available again
    ///
    /// Provenance is not checked: any buffer is accepted.
    pub fn put(&self, mut buf: Vec<u8>) {
        buf.clear();
        self.lock().free.push(buf);
        self.returned.notify_one();
    }

    /// Buffers ever allocated by this pool
    pub fn allocated(&self) -> usize {
        self.lock().allocated
    }

    /// Buffers currently checked in
    pub fn available(&self) -> usize {
        self.lock().free.len()
    }

    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // The free list stays consistent even if a holder panicked
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("floor", &self.floor)
            .field("ceiling", &self.ceiling)
            .field("allocated", &self.allocated())
            .field("available", &self.available())
            .finish()
    }
}

/// A checked-out buffer, returned to its pool on drop
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_pool_preallocates_floor() {
        let pool = BufferPool::new(4, 8);
        assert_eq!(pool.allocated(), 4);
        assert_eq!(pool.available(), 4);
    }

    #[test]
    fn test_get_beyond_floor_allocates_distinct_buffers() {
        let pool = BufferPool::new(2, 8);

        let mut held: Vec<PooledBuffer<'_>> = (0..3).map(|_| pool.get()).collect();
        for (i, buf) in held.iter_mut().enumerate() {
            buf.push(i as u8);
        }

        assert_eq!(pool.allocated(), 3);
        assert_eq!(pool.available(), 0);
        let contents: Vec<Vec<u8>> = held.iter().map(|b| b.to_vec()).collect();
        assert_eq!(contents, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_returned_buffer_is_empty() {
        let pool = BufferPool::new(1, 1);
        {
            let mut buf = pool.get();
            buf.extend_from_slice(b"leftover");
        }
        let buf = pool.get();
        assert!(buf.is_empty());
        assert_eq!(pool.allocated(), 1);
    }

    #[test]
    fn test_put_accepts_foreign_buffer() {
        let pool = BufferPool::new(0, 1);
        pool.put(b"not from here".to_vec());
        assert_eq!(pool.available(), 1);
        assert!(pool.get().is_empty());
    }

    #[test]
    fn test_floor_clamped_to_ceiling() {
        let pool = BufferPool::new(10, 3);
        assert_eq!(pool.floor(), 3);
        assert_eq!(pool.allocated(), 3);
    }

    #[test]
    fn test_get_blocks_at_ceiling_until_return() {
        let pool = Arc::new(BufferPool::new(0, 1));
        let held = pool.get();

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let buf = pool.get();
                tx.send(buf.len()).unwrap();
            })
        };

        // Still exhausted: the waiter must not get through
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(pool.allocated(), 1);

        drop(held);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 0);
        waiter.join().unwrap();
        assert_eq!(pool.allocated(), 1);
    }
}
