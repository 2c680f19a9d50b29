//! Purpose filter expansion.
//!
//! Expansion locates the first `{` and the first `}` of a filter. When the `}`
//! follows the `{`, the text between them is split on `,` and every option is
//! substituted in place of the group, left to right; each substituted string
//! is then expanded again. Anything else (no `{`, no `}`, or a `}` before the
//! first `{`) is a literal purpose.
//!
//! The pairing is *not* nesting-aware: `a/{b,{c,d}}` pairs the first `{` with
//! the first `}` and yields `a/b}`, `a/c`, `a/d}`.
//!
//! Expansion runs on an explicit work-list and is bounded by
//! [`ExpansionLimits`]; exceeding a bound fails closed.

use serde::{Deserialize, Serialize};

use crate::error::{ExpansionError, ExpansionResult};

// =============================================================================
// Expanded Purposes
// =============================================================================

/// Ordered concrete purposes produced by expanding a filter.
///
/// Order is left-to-right, depth-first substitution order. Duplicates are
/// kept; a purpose is legitimate by presence, not count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedPurposes(Vec<String>);

impl ExpandedPurposes {
    /// Purposes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate over the purposes in expansion order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Number of purposes, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the filter produced no purposes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ExpandedPurposes {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Limits
// =============================================================================

/// Bounds applied to a single expansion.
///
/// Every intermediate string is a substitution of the input, so none is
/// longer than the input. Together with `max_expanded_bytes` (charged for
/// every pending and emitted string) this bounds expansion memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionLimits {
    /// Maximum number of alternation layers along any substitution path.
    pub max_groups: usize,

    /// Maximum number of concrete purposes one filter may produce.
    pub max_purposes: usize,

    /// Maximum length of the input filter, in bytes.
    pub max_filter_len: usize,

    /// Maximum bytes held by pending and emitted strings at any time.
    pub max_expanded_bytes: usize,
}

impl ExpansionLimits {
    /// Upper bound on work-list steps, derived from the group and purpose limits.
    #[must_use]
    pub fn work_budget(&self) -> usize {
        self.max_purposes
            .saturating_add(1)
            .saturating_mul(self.max_groups.saturating_add(1))
    }
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_groups: 64,
            max_purposes: 4096,
            max_filter_len: 4096,
            max_expanded_bytes: 1 << 20,
        }
    }
}

// =============================================================================
// Purpose Expander
// =============================================================================

/// Expands purpose filters into concrete purposes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PurposeExpander {
    limits: ExpansionLimits,
}

impl PurposeExpander {
    /// Create an expander with the given limits.
    #[must_use]
    pub fn new(limits: ExpansionLimits) -> Self {
        Self { limits }
    }

    /// Limits this expander enforces.
    #[must_use]
    pub fn limits(&self) -> ExpansionLimits {
        self.limits
    }

    /// Expand `filter`, reporting why expansion was abandoned.
    ///
    /// An empty filter expands to an empty set, not to a single empty
    /// purpose.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpansionError`] when any configured bound is exceeded.
    pub fn try_expand(&self, filter: &str) -> ExpansionResult<ExpandedPurposes> {
        let mut purposes = Vec::new();
        if filter.is_empty() {
            return Ok(ExpandedPurposes(purposes));
        }
        if filter.len() > self.limits.max_filter_len {
            return Err(ExpansionError::FilterTooLong {
                limit: self.limits.max_filter_len,
            });
        }

        let budget = self.limits.work_budget();
        let mut steps = 0usize;
        // Bytes of every string currently pending or emitted.
        let mut held = filter.len();

        // (pending filter, alternation layers already substituted)
        let mut pending: Vec<(String, usize)> = vec![(filter.to_string(), 0)];

        while let Some((current, depth)) = pending.pop() {
            steps += 1;
            if steps > budget {
                return Err(ExpansionError::WorkBudgetExceeded { limit: budget });
            }
            held = held.saturating_sub(current.len());

            if current.is_empty() {
                continue;
            }

            let Some((open, close)) = first_group(&current) else {
                if purposes.len() >= self.limits.max_purposes {
                    return Err(ExpansionError::TooManyPurposes {
                        limit: self.limits.max_purposes,
                    });
                }
                held += current.len();
                purposes.push(current);
                continue;
            };

            if depth >= self.limits.max_groups {
                return Err(ExpansionError::TooManyGroups {
                    limit: self.limits.max_groups,
                });
            }

            let prefix = &current[..open];
            let options = &current[open + 1..close];
            let suffix = &current[close + 1..];

            // A pending string yields at least one purpose unless it
            // substitutes down to an empty string.
            let option_count = options.matches(',').count() + 1;
            if purposes.len() + pending.len() + option_count > self.limits.max_purposes {
                return Err(ExpansionError::TooManyPurposes {
                    limit: self.limits.max_purposes,
                });
            }

            let option_bytes = options.len() - (option_count - 1);
            let added = option_count
                .saturating_mul(prefix.len() + suffix.len())
                .saturating_add(option_bytes);
            held = held.saturating_add(added);
            if held > self.limits.max_expanded_bytes {
                return Err(ExpansionError::ExpansionBytesExceeded {
                    limit: self.limits.max_expanded_bytes,
                });
            }

            // Pushed right-to-left so the leftmost option is expanded first.
            for option in options.rsplit(',') {
                pending.push((format!("{prefix}{option}{suffix}"), depth + 1));
            }
        }

        Ok(ExpandedPurposes(purposes))
    }

    /// Expand `filter`, failing closed.
    ///
    /// Any expansion failure is logged and yields an empty set, which the
    /// compatibility evaluator never treats as a match.
    #[must_use]
    pub fn expand(&self, filter: &str) -> ExpandedPurposes {
        match self.try_expand(filter) {
            Ok(purposes) => purposes,
            Err(error) => {
                tracing::warn!(
                    filter_len = filter.len(),
                    error = %error,
                    "Purpose filter expansion abandoned; treating as no purposes"
                );
                ExpandedPurposes::default()
            }
        }
    }
}

/// Expand `filter` with default limits, failing closed.
#[must_use]
pub fn expand(filter: &str) -> ExpandedPurposes {
    PurposeExpander::default().expand(filter)
}

/// Byte offsets of the first `{` and the first `}`, if the `}` comes after.
fn first_group(filter: &str) -> Option<(usize, usize)> {
    let open = filter.find('{')?;
    let close = filter.find('}')?;
    (open < close).then_some((open, close))
}
