//! Offset/limit pagination shared by the query API and the store.
//!
//! Both bounds live in the non-negative 32-bit range because that is what the
//! HTTP contract accepts; anything larger is clamped rather than rejected.

pub const MAX_BOUND: u32 = i32::MAX as u32;
pub const DEFAULT_LIMIT: u32 = 10;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// number of matching rows to skip
    pub offset: u32,
    /// maximum rows to return
    pub limit: u32,
}

impl Pagination {
    pub fn new(offset: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Clamp to the accepted range and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        (
            self.offset.min(MAX_BOUND) as u64,
            self.limit.min(MAX_BOUND) as u64,
        )
    }

    /// Whether both bounds fall inside `0..=i32::MAX`.
    pub fn in_range(offset: i64, limit: i64) -> bool {
        let range = 0..=i64::from(MAX_BOUND);
        range.contains(&offset) && range.contains(&limit)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { offset: 0, limit: DEFAULT_LIMIT } }
}
