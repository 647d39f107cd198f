use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::names::validate_node_name;

/// Absolute path from the workspace root, as a list of validated segments.
///
/// The root is the empty path and renders as `/`. Parsing accepts `""` and
/// `"/"` as the root and tolerates a single trailing slash; every other
/// segment must be a valid node name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path string.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let trimmed = input.strip_suffix('/').unwrap_or(input);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let rest = trimmed.strip_prefix('/').ok_or_else(|| TypeError::InvalidPath {
            path: input.to_string(),
            reason: "path must be absolute".into(),
        })?;

        let segments = rest
            .split('/')
            .map(|segment| {
                validate_node_name(segment)
                    .map(|()| segment.to_string())
                    .map_err(|e| TypeError::InvalidPath {
                        path: input.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The parent path, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Append a validated child segment.
    pub fn join(&self, name: &str) -> Result<Self, TypeError> {
        validate_node_name(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Build a path from segments that are already known to be valid names.
    pub(crate) fn from_segments_unchecked(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Build a path from root-first segments, validating each.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            validate_node_name(segment)?;
        }
        Ok(Self::from_segments_unchecked(segments))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodePath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NodePath> for String {
    fn from(value: NodePath) -> Self {
        value.to_string()
    }
}
