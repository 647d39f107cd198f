//! Closed-form size of a full b-ary tree.

use crate::error::{SubgraphError, SubgraphResult};

/// Number of nodes in a full tree with `branching` children per node and
/// `depth` levels below the starting node.
///
/// Sums `branching^i` for `i` in `0..=depth`; level 0 is the starting node
/// itself and is left out unless `include_root` is set. Fails with
/// [`SubgraphError::InvalidArgument`] if either parameter is zero or the total
/// does not fit in a `u64`.
pub fn expected_count(branching: u32, depth: u32, include_root: bool) -> SubgraphResult<u64> {
    if branching < 1 || depth < 1 {
        return Err(SubgraphError::InvalidArgument(format!(
            "branching and depth must be at least 1, got {branching}x{depth}"
        )));
    }

    let overflow = || {
        SubgraphError::InvalidArgument(format!(
            "a {branching}x{depth} tree has more than u64::MAX nodes"
        ))
    };

    let base = u64::from(branching);
    let mut total: u64 = 0;
    for level in 0..=depth {
        let width = base.checked_pow(level).ok_or_else(overflow)?;
        total = total.checked_add(width).ok_or_else(overflow)?;
    }

    Ok(if include_root { total } else { total - 1 })
}
