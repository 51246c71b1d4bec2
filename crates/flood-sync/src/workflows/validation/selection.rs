use serde::{Deserialize, Serialize};

use super::domain::Report;

/// Identifier handed to a validator for the lifetime of their session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// How the cursor moved after a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMove {
    Advanced,
    Wrapped,
    Exhausted,
}

impl CursorMove {
    pub const fn notice(self) -> Option<&'static str> {
        match self {
            CursorMove::Wrapped => Some("No more pending reports for now! Check back later."),
            CursorMove::Exhausted => {
                Some("No reports pending validation at the moment. Try submitting a new report!")
            }
            CursorMove::Advanced => None,
        }
    }
}

/// Cursor over the eligible pool for a single validator.
///
/// The pool is passed in on every call because it changes between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSession {
    cursor: usize,
    pool_was_empty: bool,
}

impl Default for ValidationSession {
    fn default() -> Self {
        Self::start()
    }
}

impl ValidationSession {
    pub fn start() -> Self {
        Self {
            cursor: 0,
            pool_was_empty: false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sync the cursor with the current pool size.
    ///
    /// Resets to the first report when the pool refills after being empty and
    /// clamps to the last index when the pool shrank underneath the cursor.
    pub fn observe(&mut self, pool_len: usize) {
        if pool_len == 0 {
            self.cursor = 0;
            self.pool_was_empty = true;
            return;
        }

        if self.pool_was_empty {
            self.cursor = 0;
            self.pool_was_empty = false;
        }

        if self.cursor >= pool_len {
            self.cursor = pool_len - 1;
        }
    }

    /// Report currently shown to the validator, or `None` when nothing is left.
    pub fn current<'a>(&mut self, pool: &'a [Report]) -> Option<&'a Report> {
        self.observe(pool.len());
        pool.get(self.cursor)
    }

    /// Move past the report that was just voted on.
    ///
    /// `pool_len` must be the size of the pool recomputed after the vote, since
    /// the voted report may have dropped out of it.
    pub fn advance(&mut self, pool_len: usize) -> CursorMove {
        if pool_len == 0 {
            self.observe(0);
            return CursorMove::Exhausted;
        }

        if self.cursor < pool_len - 1 {
            self.cursor += 1;
            CursorMove::Advanced
        } else {
            self.cursor = 0;
            CursorMove::Wrapped
        }
    }
}
