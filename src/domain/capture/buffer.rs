//! Ordered store of encoded chunks for one take

/// Append-only sequence of encoded byte chunks.
/// Empty chunks are dropped on arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureBuffer {
    chunks: Vec<Vec<u8>>,
    total_bytes: usize,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk, returning whether it was kept
    pub fn push(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenate every chunk in arrival order
    pub fn assemble(self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.total_bytes);
        for chunk in self.chunks {
            payload.extend_from_slice(&chunk);
        }
        payload
    }
}
