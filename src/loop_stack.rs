/// Source offsets to resume from when an open loop repeats.
///
/// Each entry is the offset just past a `[` whose body is currently being
/// executed, so the depth always equals the number of open loops.
#[derive(Debug, Clone, Default)]
pub struct LoopStack {
    entries: Vec<u64>,
    limit: Option<usize>,
}

/// Returned by [`LoopStack::push`] when a bounded stack is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackFull {
    pub limit: usize,
}

impl LoopStack {
    /// An unbounded stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack that refuses to hold more than `limit` entries.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn push(&mut self, resume_at: u64) -> Result<(), StackFull> {
        if let Some(limit) = self.limit {
            if self.entries.len() >= limit {
                return Err(StackFull { limit });
            }
        }
        self.entries.push(resume_at);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<u64> {
        self.entries.pop()
    }

    /// Innermost open loop, if any.
    pub fn peek(&self) -> Option<u64> {
        self.entries.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
