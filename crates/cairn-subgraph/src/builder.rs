use cairn_session::Session;
use cairn_types::{NodeId, NodeType};
use tracing::trace;

use crate::error::SubgraphResult;
use crate::names::NameGenerator;
use crate::shape::Shape;

/// Generates a full tree of synthetic nodes through a live session.
///
/// Every node is created with a fresh name, the builder's node type and the
/// requested number of fresh properties. All writes are staged on the session;
/// nothing is durable until the caller saves it.
pub struct SubgraphBuilder<'a> {
    session: &'a mut Session,
    names: &'a mut NameGenerator,
    node_type: NodeType,
}

impl<'a> SubgraphBuilder<'a> {
    /// A builder creating `nt:unstructured` nodes.
    pub fn new(session: &'a mut Session, names: &'a mut NameGenerator) -> Self {
        Self {
            session,
            names,
            node_type: NodeType::unstructured(),
        }
    }

    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    /// Build the tree described by `shape` under `parent`.
    pub fn build_shape(&mut self, parent: NodeId, shape: &Shape) -> SubgraphResult<u64> {
        self.build(
            parent,
            shape.properties_per_node(),
            shape.branching(),
            shape.depth(),
        )
    }

    /// Create `branching` children under `parent`, each carrying
    /// `properties_per_node` properties, and recurse `depth - 1` levels.
    ///
    /// Returns the number of nodes created below `parent`. A depth of zero
    /// creates nothing.
    pub fn build(
        &mut self,
        parent: NodeId,
        properties_per_node: u32,
        branching: u32,
        depth: u32,
    ) -> SubgraphResult<u64> {
        if depth < 1 {
            return Ok(0);
        }

        let mut count = 0;
        for _ in 0..branching {
            let name = self.names.node_name();
            let child = self
                .session
                .add_node(parent, &name, self.node_type.clone())?;

            for _ in 0..properties_per_node {
                let property = self.names.property_name();
                let value = self.names.property_value();
                self.session.set_property(child, &property, value)?;
            }
            trace!(%parent, node = %child, depth, "generated node");

            count += 1 + self.build(child, properties_per_node, branching, depth - 1)?;
        }
        Ok(count)
    }
}
