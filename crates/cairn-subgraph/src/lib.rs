//! Subgraph generation and traversal over Cairn sessions.
//!
//! Builds full b-ary trees of a requested shape under a starting node, walks
//! them back, and checks both counts against an independent closed-form
//! prediction.
//!
//! # Key Types
//!
//! - [`Shape`] -- validated `(branching, depth, properties per node)` triple
//! - [`expected_count`] -- the size oracle
//! - [`SubgraphBuilder`] -- creates the tree through a live session
//! - [`SubgraphTraverser`] -- counts every descendant of a node
//! - [`NameGenerator`] -- seeded source of node names, property names and values
//! - [`Stopwatch`] -- accumulating timer used by the run helpers
//! - [`create_subgraph`] / [`traverse_subgraph`] -- verified, timed runs
//! - [`RunConfig`] -- TOML-loadable run parameters and scenarios

pub mod builder;
pub mod config;
pub mod error;
pub mod names;
pub mod oracle;
pub mod run;
pub mod shape;
pub mod timing;
pub mod traverser;

pub use builder::SubgraphBuilder;
pub use config::{ConfigError, RunConfig, ScenarioConfig};
pub use error::{RunError, Stage, SubgraphError, SubgraphResult};
pub use names::{NameGenerator, NameLengths};
pub use oracle::expected_count;
pub use run::{create_subgraph, traverse_subgraph, RunReport};
pub use shape::Shape;
pub use timing::{total_and_average, Stopwatch};
pub use traverser::SubgraphTraverser;
