//! Canonical keys for unordered active pairs.
//!
//! Relations in the rule table are symmetric in meaning but are often declared
//! on one side only (`retinol.conflicts_with = [vitamin_c]` with nothing on
//! `vitamin_c`). The detector walks every ordered pair and checks both
//! directions, so each unordered pair is seen twice. `PairKey` orders the two
//! keys lexicographically, which makes `(a, b)` and `(b, a)` the same key and
//! lets a plain `HashSet` suppress the mirrored finding.
//!
//! The canonical orientation is also the reporting orientation: the
//! lexicographically smaller key is always `low`, which keeps output stable
//! regardless of routine order.

/// Ordered pair of two distinct active keys with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PairKey<'r> {
    pub(crate) low: &'r str,
    pub(crate) high: &'r str,
}

impl<'r> PairKey<'r> {
    /// Canonicalise `(a, b)`; `None` when `a == b`.
    pub(crate) fn new(a: &'r str, b: &'r str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(PairKey { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(PairKey { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }
}
