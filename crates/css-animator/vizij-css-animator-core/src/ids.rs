//! Identifiers for in-flight operations.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OpId(pub u64);

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Monotonic allocator for OpId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_op: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_op(&mut self) -> OpId {
        let id = OpId(self.next_op);
        self.next_op = self.next_op.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_op(), OpId(0));
        assert_eq!(alloc.alloc_op(), OpId(1));
        assert_eq!(OpId(7).to_string(), "op#7");
    }
}
