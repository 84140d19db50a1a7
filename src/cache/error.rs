//! Error taxonomy for the cache subsystem.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// The named tier was never configured. Fatal to the call; not retried.
    #[error("tier `{0}` has not been configured")]
    UnknownTier(String),

    /// A single entry cannot be admitted even with the tier empty, either
    /// because its size exceeds `max_size_bytes` or because the tier is
    /// configured with `max_entries = 0`.
    #[error(
        "entry of {requested} bytes cannot be admitted to tier `{tier}` \
         (max_size_bytes = {max_size_bytes}, max_entries = {max_entries})"
    )]
    CapacityExceeded {
        tier: String,
        requested: u64,
        max_size_bytes: u64,
        max_entries: usize,
    },

    /// Rejected synchronously by `configure_tier` or at manager construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
