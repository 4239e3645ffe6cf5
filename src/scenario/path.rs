//! Addressed paths into a JSON document tree
//!
//! Accepts dotted and bracketed forms interchangeably:
//! `recoverableClients[0].priorRevenue` and `recoverableClients.0.priorRevenue`
//! resolve to the same steps.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{PlanError, PlanResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePath {
    raw: String,
    steps: Vec<PathStep>,
}

impl ValuePath {
    pub fn parse(path: &str) -> PlanResult<Self> {
        let invalid = || PlanError::InvalidPath(path.to_string());
        let mut steps = Vec::new();

        for segment in path.split('.') {
            let (name, mut brackets) = match segment.find('[') {
                Some(at) => segment.split_at(at),
                None => (segment, ""),
            };

            if name.contains(']') {
                return Err(invalid());
            }
            if name.is_empty() {
                if brackets.is_empty() {
                    return Err(invalid());
                }
            } else if name.bytes().all(|b| b.is_ascii_digit()) {
                steps.push(PathStep::Index(name.parse().map_err(|_| invalid())?));
            } else {
                steps.push(PathStep::Field(name.to_string()));
            }

            while !brackets.is_empty() {
                let close = brackets.find(']').ok_or_else(invalid)?;
                if !brackets.starts_with('[') {
                    return Err(invalid());
                }
                let index = brackets[1..close].parse().map_err(|_| invalid())?;
                steps.push(PathStep::Index(index));
                brackets = &brackets[close + 1..];
            }
        }

        Ok(Self {
            raw: path.to_string(),
            steps,
        })
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Node at the path, `None` when any step is missing
    pub fn get<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        walk(root, &self.steps)
    }

    /// Node that holds the addressed value, with the final step into it
    pub fn parent<'v>(&self, root: &'v Value) -> Option<(&'v Value, &PathStep)> {
        let (last, init) = self.steps.split_last()?;
        walk(root, init).map(|node| (node, last))
    }

    pub fn get_mut<'v>(&self, root: &'v mut Value) -> Option<&'v mut Value> {
        self.steps.iter().try_fold(root, |node, step| match step {
            PathStep::Field(name) => node.get_mut(name.as_str()),
            PathStep::Index(i) => node.get_mut(*i),
        })
    }

    /// Replace the node at the path. The path must already resolve.
    pub fn set(&self, root: &mut Value, value: Value) -> PlanResult<()> {
        let node = self
            .get_mut(root)
            .ok_or_else(|| PlanError::VariableNotFound(self.raw.clone()))?;
        *node = value;
        Ok(())
    }
}

fn walk<'v>(root: &'v Value, steps: &[PathStep]) -> Option<&'v Value> {
    steps.iter().try_fold(root, |node, step| match step {
        PathStep::Field(name) => node.get(name.as_str()),
        PathStep::Index(i) => node.get(*i),
    })
}

impl FromStr for ValuePath {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
