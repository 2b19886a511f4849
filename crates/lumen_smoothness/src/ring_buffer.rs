//! Fixed-capacity ring buffer of recent frame outcomes

/// Result of one composited frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameOutcome {
    /// Presented on time
    Complete,
    /// Presented, but late or missing some updates
    Partial,
    /// Not presented at its scheduled time
    Dropped,
}

/// Circular buffer holding the `capacity` most recently saved values.
///
/// Once full, each save overwrites the oldest entry.
#[derive(Debug, Clone)]
pub struct FrameRingBuffer<T> {
    entries: Vec<T>,
    capacity: usize,
    /// Total number of saves since the last clear
    saved: usize,
}

impl<T: Copy> FrameRingBuffer<T> {
    /// Create an empty buffer; a zero capacity is bumped to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            saved: 0,
        }
    }

    /// Configured capacity
    pub fn buffer_size(&self) -> usize {
        self.capacity
    }

    /// Number of valid entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slot the next save will write to
    pub fn current_index(&self) -> usize {
        self.saved % self.capacity
    }

    pub fn save_to_buffer(&mut self, value: T) {
        let index = self.current_index();
        if index < self.entries.len() {
            self.entries[index] = value;
        } else {
            self.entries.push(value);
        }
        self.saved += 1;
    }

    /// Read a raw slot, `None` if it was never written
    pub fn read_buffer(&self, index: usize) -> Option<T> {
        self.entries.get(index).copied()
    }

    /// The most recently saved value
    pub fn most_recent(&self) -> Option<T> {
        self.iter_recent().next()
    }

    /// Iterate valid entries from most recent to oldest
    pub fn iter_recent(&self) -> RecentIter<'_, T> {
        RecentIter {
            buffer: self,
            remaining: self.entries.len(),
            next_slot: self.current_index(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.saved = 0;
    }
}

/// Most-recent-first iterator over a [`FrameRingBuffer`]
pub struct RecentIter<'a, T> {
    buffer: &'a FrameRingBuffer<T>,
    remaining: usize,
    /// One past the slot to yield next, modulo capacity
    next_slot: usize,
}

impl<T: Copy> Iterator for RecentIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        self.next_slot = (self.next_slot + self.buffer.capacity - 1) % self.buffer.capacity;
        self.remaining -= 1;
        self.buffer.entries.get(self.next_slot).copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Copy> ExactSizeIterator for RecentIter<'_, T> {}
