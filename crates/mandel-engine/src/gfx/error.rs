use std::collections::VecDeque;

/// Runtime error recorded by a graphics context.
///
/// Mirrors the classic "query last error code" model: operations never fail
/// loudly, they record an error that the caller drains after a draw.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphicsError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("out of memory: {0}")]
    OutOfMemory(String),
}

impl GraphicsError {
    /// Stable numeric code (same values as the GL error enums).
    pub fn code(&self) -> u32 {
        match self {
            GraphicsError::InvalidValue(_) => 0x0501,
            GraphicsError::InvalidOperation(_) => 0x0502,
            GraphicsError::OutOfMemory(_) => 0x0505,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            GraphicsError::InvalidValue(_) => "INVALID VALUE",
            GraphicsError::InvalidOperation(_) => "INVALID OPERATION",
            GraphicsError::OutOfMemory(_) => "OUT OF MEMORY",
        }
    }
}

/// Bounded FIFO of recorded errors.
///
/// Once full, new errors are dropped; the first overflow is logged at `warn`.
#[derive(Debug)]
pub struct ErrorQueue {
    pending: VecDeque<GraphicsError>,
    capacity: usize,
    overflowed: bool,
}

impl ErrorQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity: capacity.max(1),
            overflowed: false,
        }
    }

    pub fn push(&mut self, err: GraphicsError) {
        if self.pending.len() >= self.capacity {
            if !self.overflowed {
                log::warn!("graphics error queue full ({}); dropping further errors", self.capacity);
                self.overflowed = true;
            }
            log::trace!("dropped: {err}");
            return;
        }
        self.pending.push_back(err);
    }

    /// Returns and removes the oldest recorded error.
    pub fn take(&mut self) -> Option<GraphicsError> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for ErrorQueue {
    fn default() -> Self {
        Self::new(16)
    }
}
