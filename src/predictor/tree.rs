//! Regression tree loaded from a JSON model artifact.
//!
//! Numeric splits send `value <= threshold` to `below`; categorical splits
//! send members of `categories` to `matched`. Structure is checked when the
//! artifact is parsed, but column names and column types are only checked
//! against the actual input row at prediction time.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use super::{FeatureRow, PredictorVariant, YieldPredictor};
use crate::core::errors::{CypError, Result};

/// Artifact format understood by this build.
pub const FORMAT_VERSION: u32 = 1;
/// Deepest tree accepted from an artifact.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Numeric {
        column: String,
        threshold: f64,
        below: Box<TreeNode>,
        above: Box<TreeNode>,
    },
    Categorical {
        column: String,
        categories: Vec<String>,
        matched: Box<TreeNode>,
        otherwise: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeModel {
    pub format_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub root: TreeNode,
}

impl TreeModel {
    /// Parse and structurally validate an artifact.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(malformed(format!(
                "unsupported format_version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        let mut stack = vec![(&self.root, 1_usize)];
        while let Some((node, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(malformed(format!("tree deeper than {MAX_DEPTH} levels")));
            }
            match node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(malformed(format!("leaf value {value} is not finite")));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Numeric {
                    column,
                    threshold,
                    below,
                    above,
                } => {
                    if !threshold.is_finite() {
                        return Err(malformed(format!(
                            "split on {column} has non-finite threshold"
                        )));
                    }
                    stack.push((&**below, depth + 1));
                    stack.push((&**above, depth + 1));
                }
                TreeNode::Categorical {
                    matched, otherwise, ..
                } => {
                    stack.push((&**matched, depth + 1));
                    stack.push((&**otherwise, depth + 1));
                }
            }
        }
        Ok(())
    }
}

impl YieldPredictor for TreeModel {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        let mut node = &self.root;
        loop {
            node = match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Numeric {
                    column,
                    threshold,
                    below,
                    above,
                } => {
                    if row.number(column)? <= *threshold {
                        &**below
                    } else {
                        &**above
                    }
                }
                TreeNode::Categorical {
                    column,
                    categories,
                    matched,
                    otherwise,
                } => {
                    let value = row.text(column)?;
                    if categories.iter().any(|c| c == value) {
                        &**matched
                    } else {
                        &**otherwise
                    }
                }
            };
        }
    }

    fn variant(&self) -> PredictorVariant {
        PredictorVariant::Model
    }
}

fn malformed(details: String) -> CypError {
    CypError::Serialization {
        context: "model artifact",
        details,
    }
}
