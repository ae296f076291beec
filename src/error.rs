//! Error type for the memoring library.
//!
//! One error covers the two ways this library can fail, distinguished by
//! [`ErrorKind`]:
//!
//! - [`ErrorKind::InvalidConfig`]: cache construction parameters were
//!   invalid (zero capacity, zero workers, capacity smaller than the
//!   worker count). Reported synchronously; no cache object is produced.
//! - [`ErrorKind::BrokenInvariant`]: an internal store invariant was
//!   violated (`check_invariants` methods). Always an implementation bug,
//!   never a recoverable condition.
//!
//! ## Example Usage
//!
//! ```
//! use memoring::error::{ErrorKind, MemoError};
//! use memoring::memo::SingleMemo;
//!
//! let cache: Result<SingleMemo<u64, u64, _>, MemoError> =
//!     SingleMemo::new(|k: &u64| k * k, 128);
//! assert!(cache.is_ok());
//!
//! // Zero capacity is caught without panicking.
//! let err = SingleMemo::new(|k: &u64| k * k, 0).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidConfig);
//! assert!(err.to_string().contains("capacity"));
//! ```

use std::fmt;

/// Which failure class a [`MemoError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Construction parameters failed validation.
    InvalidConfig,
    /// A store's entry count, index, and recency list drifted apart.
    ///
    /// Unlike `InvalidConfig` this is never the caller's fault; it means a
    /// bug in this library.
    BrokenInvariant,
}

/// Error raised by cache construction and store invariant checks.
///
/// Produced by the fallible constructors of every cache variant, by
/// [`MemoBuilder::build`](crate::builder::MemoBuilder::build), and by
/// [`LruStore::check_invariants`](crate::store::LruStore::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoError {
    kind: ErrorKind,
    detail: String,
}

impl MemoError {
    /// Creates a construction-fault error with the given description.
    #[inline]
    pub fn config(detail: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidConfig,
            detail: detail.into(),
        }
    }

    /// Creates a broken-invariant error with the given description.
    #[inline]
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BrokenInvariant,
            detail: detail.into(),
        }
    }

    /// Returns the failure class.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error description without the kind prefix.
    #[inline]
    pub fn message(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for MemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::InvalidConfig => write!(f, "invalid cache configuration: {}", self.detail),
            ErrorKind::BrokenInvariant => write!(f, "cache invariant violated: {}", self.detail),
        }
    }
}

impl std::error::Error for MemoError {}
