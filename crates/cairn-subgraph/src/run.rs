//! Verified, timed build and traversal runs.
//!
//! Each run predicts the node count with the oracle, does its work through the
//! session, compares the actual count against the prediction, and saves. Any
//! failure aborts the run with a [`RunError`] naming the stage and shape.

use std::time::Duration;

use cairn_session::{CommitReceipt, Session, SessionError};
use cairn_types::{NodeId, NodePath};
use serde::Serialize;
use tracing::info;

use crate::builder::SubgraphBuilder;
use crate::error::{RunError, Stage, SubgraphError};
use crate::names::NameGenerator;
use crate::oracle::expected_count;
use crate::shape::Shape;
use crate::timing::{total_and_average, Stopwatch};
use crate::traverser::SubgraphTraverser;

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub shape: Shape,
    /// Caller-supplied description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Path of the node the run started from.
    pub path: NodePath,
    /// Oracle prediction, root excluded.
    pub expected: u64,
    /// Nodes created or visited. Always equal to `expected`.
    pub counted: u64,
    /// Stopwatch total after the run, if a stopwatch was supplied.
    pub elapsed: Option<Duration>,
    pub receipt: CommitReceipt,
}

impl RunReport {
    /// Headline such as `2x3 tree with 3 properties per node (14 nodes):`.
    /// The label replaces the shape text when one was given.
    pub fn description(&self) -> String {
        match &self.label {
            Some(label) => format!("{label} ({} nodes):", self.expected),
            None => format!("{} ({} nodes):", self.shape, self.expected),
        }
    }

    /// Total and per-node average, if the run was timed.
    pub fn timing(&self) -> Option<String> {
        self.elapsed
            .map(|total| total_and_average(total, self.counted))
    }
}

/// Build `shape` under the node at `initial_path`, check the count and save.
///
/// The stopwatch, if any, times the build and the save. It is stopped whether
/// or not they succeed.
pub fn create_subgraph(
    session: &mut Session,
    initial_path: &str,
    shape: Shape,
    names: &mut NameGenerator,
    mut stopwatch: Option<&mut Stopwatch>,
    description: Option<&str>,
) -> Result<RunReport, RunError> {
    let (expected, path, parent) = prepare(session, initial_path, shape, Stage::Build)?;

    if let Some(sw) = stopwatch.as_deref_mut() {
        sw.start();
    }
    let outcome = build_and_save(session, names, parent, shape, expected);
    let elapsed = stop(stopwatch);
    let (created, receipt) = outcome?;

    info!(%shape, %path, nodes = created, revision = receipt.revision, "subgraph created");
    Ok(RunReport {
        shape,
        label: description.map(str::to_string),
        path,
        expected,
        counted: created,
        elapsed,
        receipt,
    })
}

/// Walk the subtree at `initial_path`, check it against `shape` and save.
pub fn traverse_subgraph(
    session: &mut Session,
    initial_path: &str,
    shape: Shape,
    mut stopwatch: Option<&mut Stopwatch>,
    description: Option<&str>,
) -> Result<RunReport, RunError> {
    let (expected, path, start) = prepare(session, initial_path, shape, Stage::Traverse)?;

    if let Some(sw) = stopwatch.as_deref_mut() {
        sw.start();
    }
    let outcome = traverse_and_save(session, start, shape, expected);
    let elapsed = stop(stopwatch);
    let (visited, receipt) = outcome?;

    info!(%shape, %path, nodes = visited, "subgraph traversed");
    Ok(RunReport {
        shape,
        label: description.map(str::to_string),
        path,
        expected,
        counted: visited,
        elapsed,
        receipt,
    })
}

/// Oracle prediction and the resolved starting node.
fn prepare(
    session: &Session,
    initial_path: &str,
    shape: Shape,
    stage: Stage,
) -> Result<(u64, NodePath, NodeId), RunError> {
    let expected = expected_count(shape.branching(), shape.depth(), false)
        .map_err(|e| RunError::new(stage, shape, e))?;
    let path = NodePath::parse(initial_path)
        .map_err(|e| RunError::new(stage, shape, SessionError::from(e)))?;
    let node = session
        .node_at_path(&path)
        .map_err(|e| RunError::new(stage, shape, e))?;
    Ok((expected, path, node))
}

fn build_and_save(
    session: &mut Session,
    names: &mut NameGenerator,
    parent: NodeId,
    shape: Shape,
    expected: u64,
) -> Result<(u64, CommitReceipt), RunError> {
    let created = SubgraphBuilder::new(session, names)
        .build_shape(parent, &shape)
        .map_err(|e| RunError::new(Stage::Build, shape, e))?;
    check_count(Stage::Build, shape, expected, created)?;
    let receipt = session
        .save()
        .map_err(|e| RunError::new(Stage::Commit, shape, e))?;
    Ok((created, receipt))
}

fn traverse_and_save(
    session: &mut Session,
    start: NodeId,
    shape: Shape,
    expected: u64,
) -> Result<(u64, CommitReceipt), RunError> {
    let visited = SubgraphTraverser::new(session)
        .traverse(start)
        .map_err(|e| RunError::new(Stage::Traverse, shape, e))?;
    check_count(Stage::Traverse, shape, expected, visited)?;
    let receipt = session
        .save()
        .map_err(|e| RunError::new(Stage::Commit, shape, e))?;
    Ok((visited, receipt))
}

fn check_count(stage: Stage, shape: Shape, expected: u64, actual: u64) -> Result<(), RunError> {
    if actual == expected {
        Ok(())
    } else {
        Err(RunError::new(
            stage,
            shape,
            SubgraphError::CountMismatch { expected, actual },
        ))
    }
}

fn stop(stopwatch: Option<&mut Stopwatch>) -> Option<Duration> {
    stopwatch.map(|sw| {
        sw.stop();
        sw.total_duration()
    })
}
