//! Scrollback buffer

use pterm_types::OutputBlock;
use std::collections::VecDeque;
use tracing::debug;

/// Ordered, bounded sequence of output blocks.
///
/// Blocks are appended at the back and evicted from the front once the
/// buffer holds more than `capacity` blocks.
#[derive(Debug)]
pub struct ScreenBuffer {
    blocks: VecDeque<OutputBlock>,
    capacity: usize,
    next_seq: u64,
    clears: u64,
}

impl ScreenBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            blocks: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            next_seq: 1,
            clears: 0,
        }
    }

    /// Append a block, stamping its sequence number. Returns the number
    /// assigned.
    pub fn append(&mut self, mut block: OutputBlock) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        block.seq = seq;
        self.blocks.push_back(block);
        self.evict_oldest_if_over_capacity();
        seq
    }

    /// Drop blocks from the front until the capacity is respected. Returns
    /// how many were removed.
    pub fn evict_oldest_if_over_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.blocks.len() > self.capacity {
            self.blocks.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!("screen buffer evicted {evicted} block(s)");
        }
        evicted
    }

    /// Remove every block. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.clears += 1;
    }

    /// How many times the buffer has been cleared. Eviction does not count.
    pub fn clear_generation(&self) -> u64 {
        self.clears
    }

    /// Full ordered copy, oldest first.
    pub fn snapshot(&self) -> Vec<OutputBlock> {
        self.blocks.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputBlock> {
        self.blocks.iter()
    }

    /// Blocks whose sequence number is greater than `seq`.
    pub fn after(&self, seq: u64) -> impl Iterator<Item = &OutputBlock> {
        self.blocks.iter().filter(move |b| b.seq > seq)
    }

    pub fn last(&self) -> Option<&OutputBlock> {
        self.blocks.back()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
