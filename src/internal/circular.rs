//! Circular dependency detection infrastructure.
//!
//! Each resolution call tree carries its own [`ResolutionChain`], so
//! detection needs no thread-local state and reports cycles as ordinary
//! errors rather than unwinding.

use crate::error::{DiError, DiResult};

pub(crate) const MAX_DEPTH: usize = 1024;

/// Abstracts currently being resolved, outermost first.
#[derive(Debug)]
pub(crate) struct ResolutionChain {
    stack: Vec<String>,
    max_depth: usize,
}

impl ResolutionChain {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Pushes `name`, failing if it is already being resolved or the chain
    /// is too deep. Nothing is pushed on failure.
    pub(crate) fn enter(&mut self, name: &str) -> DiResult<()> {
        // Circular detection BEFORE pushing the new name
        if self.stack.iter().any(|n| n == name) {
            let mut path = self.stack.clone();
            path.push(name.to_string());
            return Err(DiError::Circular(path));
        }

        // Depth guard
        if self.stack.len() >= self.max_depth {
            return Err(DiError::DepthExceeded(self.stack.len()));
        }

        self.stack.push(name.to_string());
        Ok(())
    }

    pub(crate) fn exit(&mut self, name: &str) {
        if let Some(last) = self.stack.pop() {
            debug_assert_eq!(last, name);
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for ResolutionChain {
    fn default() -> Self {
        Self::new(MAX_DEPTH)
    }
}
