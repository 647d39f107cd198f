use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::SubgraphError;
use crate::names::NameLengths;
use crate::shape::Shape;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid name lengths: {0}")]
    InvalidNames(#[source] SubgraphError),

    #[error("scenario {index}: {source}")]
    InvalidScenario {
        index: usize,
        #[source]
        source: SubgraphError,
    },
}

/// Parameters shared by every run, plus the scenarios to execute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub workspace: String,
    pub user: String,
    /// Seed of the name generator.
    pub seed: u64,
    /// Path of the node runs start from.
    pub path: String,
    pub names: NameLengths,
    pub scenarios: Vec<ScenarioConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workspace: "workspace1".into(),
            user: "testuser".into(),
            seed: 0,
            path: "/".into(),
            names: NameLengths::default(),
            scenarios: vec![
                ScenarioConfig::new(1, 5, 0),
                ScenarioConfig::new(2, 3, 3),
                ScenarioConfig::new(3, 3, 3),
                ScenarioConfig::new(10, 2, 10),
            ],
        }
    }
}

impl RunConfig {
    /// Read and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate TOML text. Missing keys take their defaults.
    ///
    /// Warns about scenarios whose sibling names are likely to collide.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.names.validate().map_err(ConfigError::InvalidNames)?;
        for shape in config.shapes()? {
            if collision_likely(shape.branching(), config.names.distinct_node_names()) {
                warn!(
                    %shape,
                    node_name_length = config.names.node,
                    "node names this short will likely collide between siblings"
                );
            }
        }
        Ok(config)
    }

    /// Validated shapes of every scenario, in order.
    pub fn shapes(&self) -> Result<Vec<Shape>, ConfigError> {
        self.scenarios
            .iter()
            .enumerate()
            .map(|(index, scenario)| {
                scenario
                    .shape()
                    .and_then(|shape| self.check_shape(shape))
                    .map_err(|source| ConfigError::InvalidScenario { index, source })
            })
            .collect()
    }

    /// Reject a shape whose siblings cannot all get distinct names.
    pub fn check_shape(&self, shape: Shape) -> Result<Shape, SubgraphError> {
        let distinct = self.names.distinct_node_names();
        if u64::from(shape.branching()) > distinct {
            return Err(SubgraphError::InvalidArgument(format!(
                "{shape} needs {} distinct sibling names but {}-letter names allow only {distinct}",
                shape.branching(),
                self.names.node
            )));
        }
        Ok(shape)
    }
}

/// Birthday estimate of a sibling name clash above one percent.
fn collision_likely(branching: u32, distinct: u64) -> bool {
    let b = f64::from(branching);
    b * (b - 1.0) / 2.0 / distinct as f64 > 0.01
}

/// One tree shape to build and traverse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub branching: u32,
    pub depth: u32,
    #[serde(default)]
    pub properties: u32,
    /// Printed instead of the shape text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ScenarioConfig {
    pub fn new(branching: u32, depth: u32, properties: u32) -> Self {
        Self {
            branching,
            depth,
            properties,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn shape(&self) -> Result<Shape, SubgraphError> {
        Shape::new(self.branching, self.depth, self.properties)
    }
}
