//! Error types for the purpose-matching engine.
//!
//! None of these escape an access check: the decision engine resolves every
//! failure to a deny (or, for notification delivery, a logged warning).

/// Errors raised while expanding a purpose filter.
///
/// Expansion failures are fail-closed: callers treat the filter as expanding
/// to no purposes at all, which can never authorize a flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpansionError {
    /// The filter nests more alternation layers than allowed.
    #[error("Purpose filter exceeds {limit} alternation groups")]
    TooManyGroups {
        /// Configured group limit.
        limit: usize,
    },

    /// The filter expands to more concrete purposes than allowed.
    #[error("Purpose filter expands to more than {limit} purposes")]
    TooManyPurposes {
        /// Configured purpose limit.
        limit: usize,
    },

    /// The input filter is longer than allowed.
    #[error("Purpose filter is longer than {limit} bytes")]
    FilterTooLong {
        /// Configured length limit.
        limit: usize,
    },

    /// Pending and expanded strings would hold more bytes than allowed.
    #[error("Purpose filter expansion exceeds {limit} bytes")]
    ExpansionBytesExceeded {
        /// Configured byte limit.
        limit: usize,
    },

    /// Expansion visited more intermediate filters than allowed.
    #[error("Purpose filter expansion exceeded its work budget of {limit} steps")]
    WorkBudgetExceeded {
        /// Step budget derived from the other limits.
        limit: usize,
    },
}

/// Result alias for expansion.
pub type ExpansionResult<T> = Result<T, ExpansionError>;
