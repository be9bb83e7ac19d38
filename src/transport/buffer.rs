/// Fixed ring of reusable datagram read buffers.
///
/// Receiving into preallocated storage keeps the hot receive path free
/// of per-packet allocation. Buffers are handed out by slot index in
/// strict rotation: after `count` acquisitions the first slot comes
/// around again, so a consumer must be done with a returned datagram
/// before the ring wraps back to its slot.
///
/// The pool itself does not track in-use state.
/// [`UdpPeerListener`](crate::transport::UdpPeerListener) owns one pool
/// and ties returned slices to its own borrow, which enforces the
/// consume-before-reuse contract at compile time.
pub struct BufferPool {
    buffers: Vec<Vec<u8>>,
    next: usize,
}

impl BufferPool {
    /// Preallocate `count` buffers of `capacity` bytes each.
    ///
    /// `count` is clamped to at least one buffer.
    pub fn new(count: usize, capacity: usize) -> Self {
        let count = count.max(1);
        Self {
            buffers: vec![vec![0u8; capacity]; count],
            next: 0,
        }
    }

    /// Hand out the next slot in rotation.
    pub fn acquire(&mut self) -> usize {
        let slot = self.next;
        self.next = (self.next + 1) % self.buffers.len();
        slot
    }

    /// Storage of a previously acquired slot.
    pub fn get(&self, slot: usize) -> &[u8] {
        &self.buffers[slot]
    }

    /// Mutable storage of a previously acquired slot.
    pub fn get_mut(&mut self, slot: usize) -> &mut [u8] {
        &mut self.buffers[slot]
    }

    /// Number of buffers in the ring.
    pub fn count(&self) -> usize {
        self.buffers.len()
    }
}
