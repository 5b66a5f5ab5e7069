//! Authoritative region selection
//!
//! When several configured regions contain the same point, exactly one of
//! them is treated as the participant's region. The pick is deterministic:
//! highest priority first, then area according to [`TieBreak`], then name,
//! then id.

use std::cmp::Ordering;

use regiontrigger_core::RegionInfo;
use serde::{Deserialize, Serialize};

/// How regions of equal priority are ordered by area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The most specific (smallest) region wins
    #[default]
    SmallestArea,
    /// The outermost (largest) region wins
    LargestArea,
    /// Area is not considered
    Ignore,
}

impl TieBreak {
    fn compare_area(self, a: u64, b: u64) -> Ordering {
        match self {
            Self::SmallestArea => a.cmp(&b),
            Self::LargestArea => b.cmp(&a),
            Self::Ignore => Ordering::Equal,
        }
    }
}

/// Total order over candidates; the `Less` side is preferred.
fn preference(tie_break: TieBreak, a: &RegionInfo, b: &RegionInfo) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| tie_break.compare_area(a.area, b.area))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Picks the authoritative region among `candidates`.
///
/// Callers pass only regions that contain the point and have a policy.
/// Returns `None` for an empty input. The result does not depend on the
/// order of `candidates`.
pub fn select<'a, I>(candidates: I, tie_break: TieBreak) -> Option<&'a RegionInfo>
where
    I: IntoIterator<Item = &'a RegionInfo>,
{
    candidates
        .into_iter()
        .inspect(|region| {
            if region.area == 0 {
                tracing::warn!(
                    region = %region.name,
                    id = region.id,
                    "invariant violation: region reports zero area"
                );
            }
        })
        .min_by(|a, b| preference(tie_break, a, b))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn region(name: &str, id: i32, priority: i32, area: u64) -> RegionInfo {
        RegionInfo::new(name, id, priority, area)
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(select(std::iter::empty(), TieBreak::default()).is_none());
    }

    #[test]
    fn priority_wins_over_area() {
        let regions = [region("a", 1, 0, 10), region("b", 2, 5, 1000)];
        assert_eq!(select(&regions, TieBreak::SmallestArea).unwrap().name, "b");
    }

    #[test]
    fn equal_priority_prefers_smaller_area() {
        let regions = [region("big", 1, 0, 100), region("small", 2, 0, 10)];
        assert_eq!(
            select(&regions, TieBreak::SmallestArea).unwrap().name,
            "small"
        );
        assert_eq!(select(&regions, TieBreak::LargestArea).unwrap().name, "big");
    }

    #[test]
    fn ignore_falls_through_to_name() {
        let regions = [region("zeta", 1, 0, 1), region("alpha", 2, 0, 500)];
        assert_eq!(select(&regions, TieBreak::Ignore).unwrap().name, "alpha");
    }

    #[test]
    fn full_tie_uses_id() {
        let regions = [region("same", 9, 0, 10), region("same", 3, 0, 10)];
        assert_eq!(select(&regions, TieBreak::SmallestArea).unwrap().id, 3);
    }

    #[test]
    fn zero_area_is_still_ordered() {
        let regions = [region("a", 1, 0, 0), region("b", 2, 0, 5)];
        assert_eq!(select(&regions, TieBreak::SmallestArea).unwrap().name, "a");
    }

    fn arb_region() -> impl Strategy<Value = RegionInfo> {
        ("[a-d]{1,2}", 0i32..4, -2i32..3, 0u64..50)
            .prop_map(|(name, id, priority, area)| RegionInfo::new(name, id, priority, area))
    }

    proptest! {
        #[test]
        fn selection_ignores_input_order(
            mut regions in proptest::collection::vec(arb_region(), 1..8),
            rotate in 0usize..8,
        ) {
            let expected = select(&regions, TieBreak::SmallestArea).cloned();
            let len = regions.len();
            regions.rotate_left(rotate % len);
            regions.reverse();
            let actual = select(&regions, TieBreak::SmallestArea).cloned();
            prop_assert_eq!(expected, actual);
        }

        #[test]
        fn winner_has_maximal_priority(regions in proptest::collection::vec(arb_region(), 1..8)) {
            let winner = select(&regions, TieBreak::Ignore).unwrap();
            prop_assert!(regions.iter().all(|r| r.priority <= winner.priority));
        }
    }
}
