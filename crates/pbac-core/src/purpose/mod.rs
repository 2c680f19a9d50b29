//! Purpose filters and purpose comparison.
//!
//! A purpose filter is a `/`-delimited hierarchical string that may contain
//! `{a,b,...}` alternation groups:
//!
//! ```
//! use pbac_core::purpose::{expand, purpose_covers};
//!
//! let purposes = expand("music/{jazz,rock}");
//! assert_eq!(purposes.as_slice(), ["music/jazz", "music/rock"]);
//!
//! assert!(purpose_covers("music", "music/jazz/live"));
//! assert!(!purpose_covers("music/rock", "music/jazz"));
//! ```

pub mod expander;
pub mod matcher;

pub use expander::{ExpandedPurposes, ExpansionLimits, PurposeExpander, expand};
pub use matcher::{PURPOSE_DELIMITER, PurposeMatch, find_match, purpose_covers};
