// libese/libese/src/engine/reassembly.rs

//! Response reassembly.

/// Accumulates the INF fields of a chained response in arrival order.
#[derive(Debug, Default, Clone)]
pub struct ReassemblyBuffer {
    data: Vec<u8>,
    fragments: usize,
}

impl ReassemblyBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one fragment.
    pub fn append(&mut self, fragment: &[u8]) {
        self.data.extend_from_slice(fragment);
        self.fragments += 1;
    }

    /// Bytes collected so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of fragments appended.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Drop collected data.
    pub fn clear(&mut self) {
        self.data.clear();
        self.fragments = 0;
    }

    /// Hand the assembled response to the caller, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        self.fragments = 0;
        std::mem::take(&mut self.data)
    }
}
