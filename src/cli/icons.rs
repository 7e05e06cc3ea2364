//! Status markers printed at the start of console lines.

use std::fmt;

use console::{style, StyledObject};

/// A styled one-character marker, usable directly in `format!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Layer saved, size accepted.
    Done,
    /// Stage transition.
    Step,
    /// Large layer, missing features, partial failure.
    Caution,
    /// Nothing was written.
    Failed,
    /// Size could not be determined.
    Unsized,
    /// Secondary detail.
    Aside,
}

impl Mark {
    fn styled(self) -> StyledObject<&'static str> {
        match self {
            Mark::Done => style("✓").green(),
            Mark::Step => style("→").cyan(),
            Mark::Caution => style("!").yellow(),
            Mark::Failed => style("✗").red(),
            Mark::Unsized => style("?").magenta(),
            Mark::Aside => style("→").dim(),
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.styled().fmt(f)
    }
}
