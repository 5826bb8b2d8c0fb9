//! Cross-set overlap detection

use crate::{
    error::{Error, Result},
    range::RangeSet,
};

/// Make sure no two range sets share an address.
///
/// Every unordered pair is compared, and the first overlapping pair is reported.
pub fn check_overlaps(range_sets: &[RangeSet]) -> Result<()> {
    for (first, set) in range_sets.iter().enumerate() {
        for (second, other) in range_sets.iter().enumerate().skip(first + 1) {
            if set.overlaps(other) {
                return Err(Error::RangeOverlap { first, second });
            }
        }
    }
    Ok(())
}
