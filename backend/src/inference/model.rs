use std::fs;
use std::path::Path;

use ndarray::{Array2, ArrayView1};
use serde::Deserialize;

use super::ArtifactError;
use super::frame::COLUMNS;
use super::service::PipelineError;

/// Pre-trained artifact mapping transformed features to discrete class
/// codes. Implementations are pure and stateless per call.
pub trait Classifier: Send + Sync {
    fn predict(&self, matrix: &Array2<f64>) -> Result<Vec<i64>, PipelineError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

/// Decision tree exported from the training pipeline as a flat node
/// table. Node 0 is the root; a row descends left when
/// `x[feature] <= threshold`.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeModel {
    classes: Vec<i64>,
    n_features: usize,
    nodes: Vec<TreeNode>,
}

impl TreeModel {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model: TreeModel =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        model.validate(path)?;
        Ok(model)
    }

    /// Structural checks so serving-time traversal cannot go out of
    /// bounds or loop. Children must point forward in the node table,
    /// which also guarantees every walk reaches a leaf.
    fn validate(&self, path: &Path) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            path: path.display().to_string(),
            reason,
        };

        if self.n_features != COLUMNS.len() {
            return Err(invalid(format!(
                "model expects {} features, the serving frame has {}",
                self.n_features,
                COLUMNS.len()
            )));
        }
        if self.nodes.is_empty() {
            return Err(invalid("empty node table".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features {
                        return Err(invalid(format!(
                            "node {} splits on feature {}, out of range",
                            i, feature
                        )));
                    }
                    if *left <= i || *right <= i || *left >= self.nodes.len()
                        || *right >= self.nodes.len()
                    {
                        return Err(invalid(format!(
                            "node {} has dangling or backward child ({}, {})",
                            i, left, right
                        )));
                    }
                }
                TreeNode::Leaf { class } => {
                    if !self.classes.contains(class) {
                        return Err(invalid(format!(
                            "leaf {} carries unknown class code {}",
                            i, class
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn score_row(&self, row: ArrayView1<f64>) -> i64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { class } => return *class,
            }
        }
    }
}

impl Classifier for TreeModel {
    fn predict(&self, matrix: &Array2<f64>) -> Result<Vec<i64>, PipelineError> {
        if matrix.ncols() != self.n_features {
            return Err(PipelineError::Predict(format!(
                "expected {} features per row, got {}",
                self.n_features,
                matrix.ncols()
            )));
        }
        Ok(matrix
            .rows()
            .into_iter()
            .map(|row| self.score_row(row))
            .collect())
    }
}
