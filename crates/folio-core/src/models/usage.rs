use serde::{Deserialize, Serialize};

/// Photo usage for the account, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub current_photo_count: usize,
    pub photo_limit: usize,
}

impl Usage {
    pub fn new(current_photo_count: usize, photo_limit: usize) -> Self {
        Self {
            current_photo_count,
            photo_limit,
        }
    }

    /// Photos that can still be added before the limit is hit.
    pub fn remaining(&self) -> usize {
        self.photo_limit.saturating_sub(self.current_photo_count)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
