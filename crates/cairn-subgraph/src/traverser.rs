use cairn_session::Session;
use cairn_types::NodeId;
use tracing::trace;

use crate::error::SubgraphResult;

/// Read-only walker over the subtree of a node.
///
/// Uses an explicit stack rather than recursion, so tree depth is bounded by
/// memory, not by the call stack.
pub struct SubgraphTraverser<'a> {
    session: &'a Session,
}

impl<'a> SubgraphTraverser<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Count every descendant of `node`, excluding `node` itself.
    ///
    /// Any failure to list children aborts the walk; no partial count is
    /// returned.
    pub fn traverse(&self, node: NodeId) -> SubgraphResult<u64> {
        let mut count = 0;
        let mut stack = self.session.children(node)?;
        while let Some(current) = stack.pop() {
            count += 1;
            stack.extend(self.session.children(current)?);
        }
        trace!(%node, count, "traversal complete");
        Ok(count)
    }

    /// Number of levels below `node`. A leaf has depth 0.
    pub fn depth(&self, node: NodeId) -> SubgraphResult<u32> {
        let mut max = 0;
        let mut stack = vec![(node, 0u32)];
        while let Some((current, level)) = stack.pop() {
            max = max.max(level);
            for child in self.session.children(current)? {
                stack.push((child, level + 1));
            }
        }
        Ok(max)
    }
}
