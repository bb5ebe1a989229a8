//! Conflict-resolution policy for `store_packet`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorePolicy {
    /// Fail the store if a value already exists at this name.
    DoNothingReturnFailure,
    /// Add another value under this name (multi-value/append mode).
    Append,
    /// Replace whatever is stored at this name.
    Overwrite,
}
