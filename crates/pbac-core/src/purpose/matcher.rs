//! Hierarchical purpose comparison.

use serde::Serialize;

/// Separator between purpose hierarchy levels.
pub const PURPOSE_DELIMITER: char = '/';

/// Returns `true` if a subscriber authorized for `sp` may receive data
/// declared for `mp`.
///
/// That holds when `mp == sp`, or when `sp` is a strict hierarchical ancestor
/// of `mp` (`mp` starts with `sp` and continues with `/`). Comparison is
/// case-sensitive and segment-exact; `music` covers `music/jazz` but not
/// `musical`, and `music/jazz` never covers `music`.
#[must_use]
pub fn purpose_covers(sp: &str, mp: &str) -> bool {
    match mp.strip_prefix(sp) {
        Some("") => true,
        Some(rest) => rest.starts_with(PURPOSE_DELIMITER),
        None => false,
    }
}

/// A pair of concrete purposes that authorized a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurposeMatch {
    /// The subscriber's purpose.
    pub subscription_purpose: String,
    /// The message purpose it covers.
    pub message_purpose: String,
}

/// Find the first SP/MP pair where the SP purpose covers the MP purpose.
///
/// SP purposes are the outer loop, MP purposes the inner loop.
pub fn find_match<'a, S, M>(sp_purposes: S, mp_purposes: M) -> Option<PurposeMatch>
where
    S: IntoIterator<Item = &'a String>,
    M: IntoIterator<Item = &'a String> + Clone,
{
    for sp in sp_purposes {
        for mp in mp_purposes.clone() {
            if purpose_covers(sp, mp) {
                return Some(PurposeMatch {
                    subscription_purpose: sp.clone(),
                    message_purpose: mp.clone(),
                });
            }
        }
    }
    None
}
