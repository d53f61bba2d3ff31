// URL risk oracle
// The trained classifier is consumed strictly as a probability function. `ForestOracle`
// evaluates a decision forest exported to JSON by the training pipeline.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Failed to read model file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse model export: {0}")]
    Parse(String),

    #[error("Model feature order does not match: expected {expected:?}, found {found:?}")]
    FeatureOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid model export: {0}")]
    Invalid(String),

    #[error("Invalid tree {tree}: {message}")]
    InvalidTree { tree: usize, message: String },
}

/// Probability-of-phishing capability. Loaded once, shared read-only.
pub trait UrlRiskOracle: Send + Sync {
    fn predict_proba(&self, features: &FeatureVector) -> f64;

    /// Per-feature importances in canonical order (zeros when unknown)
    fn feature_importances(&self) -> [f64; FEATURE_COUNT];
}

// =============================================================================
// EXPORT FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct ForestExport {
    feature_names: Vec<String>,
    #[serde(default)]
    classes: Vec<serde_json::Value>,
    #[serde(default)]
    feature_importances: Option<Vec<f64>>,
    trees: Vec<TreeExport>,
}

#[derive(Debug, Deserialize)]
struct TreeExport {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

fn class_name(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    }
}

// =============================================================================
// FOREST ORACLE
// =============================================================================

#[derive(Debug)]
pub struct ForestOracle {
    trees: Vec<Vec<Node>>,
    phishing_index: usize,
    importances: [f64; FEATURE_COUNT],
}

impl ForestOracle {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| OracleError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let oracle = Self::from_json_str(&content)?;
        info!(
            "Loaded URL model from {} ({} trees)",
            path.display(),
            oracle.trees.len()
        );
        Ok(oracle)
    }

    pub fn from_json_str(json: &str) -> Result<Self, OracleError> {
        let export: ForestExport =
            serde_json::from_str(json).map_err(|e| OracleError::Parse(e.to_string()))?;
        Self::from_export(export)
    }

    fn from_export(export: ForestExport) -> Result<Self, OracleError> {
        if export.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(OracleError::FeatureOrder {
                expected: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
                found: export.feature_names,
            });
        }

        let class_count = if export.classes.is_empty() {
            2
        } else {
            export.classes.len()
        };
        let phishing_index = export
            .classes
            .iter()
            .position(|c| class_name(c) == "phishing")
            .unwrap_or(1);
        if phishing_index >= class_count {
            return Err(OracleError::Invalid(format!(
                "phishing class index {} out of range for {} classes",
                phishing_index, class_count
            )));
        }

        let importances = match export.feature_importances {
            Some(values) => <[f64; FEATURE_COUNT]>::try_from(values).map_err(|v| {
                OracleError::Invalid(format!(
                    "expected {} feature importances, found {}",
                    FEATURE_COUNT,
                    v.len()
                ))
            })?,
            None => [0.0; FEATURE_COUNT],
        };

        if export.trees.is_empty() {
            return Err(OracleError::Invalid("forest has no trees".to_string()));
        }

        let trees = export
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| validate_tree(i, tree.nodes, class_count))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            phishing_index,
            importances,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn leaf_probability(&self, nodes: &[Node], features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut index = 0;
        loop {
            match &nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // trees were trained on float32 inputs
                    index = if (features[*feature] as f32) as f64 <= *threshold {
                        *left
                    } else {
                        *right
                    };
                },
                Node::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    return if total > 0.0 {
                        value[self.phishing_index] / total
                    } else {
                        0.0
                    };
                },
            }
        }
    }
}

/// Children must point forward, which rules out cycles and keeps traversal finite
fn validate_tree(tree: usize, nodes: Vec<Node>, class_count: usize) -> Result<Vec<Node>, OracleError> {
    let invalid = |message: String| OracleError::InvalidTree { tree, message };

    if nodes.is_empty() {
        return Err(invalid("tree has no nodes".to_string()));
    }

    for (i, node) in nodes.iter().enumerate() {
        match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= FEATURE_COUNT {
                    return Err(invalid(format!("node {} splits on unknown feature {}", i, feature)));
                }
                if !threshold.is_finite() {
                    return Err(invalid(format!("node {} has a non-finite threshold", i)));
                }
                for child in [*left, *right] {
                    if child <= i || child >= nodes.len() {
                        return Err(invalid(format!("node {} has invalid child {}", i, child)));
                    }
                }
            },
            Node::Leaf { value } => {
                if value.len() != class_count {
                    return Err(invalid(format!(
                        "leaf {} has {} values, expected {}",
                        i,
                        value.len(),
                        class_count
                    )));
                }
                if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(invalid(format!("leaf {} has invalid values", i)));
                }
            },
        }
    }

    Ok(nodes)
}

impl UrlRiskOracle for ForestOracle {
    fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let values = features.to_array();
        let total: f64 = self
            .trees
            .iter()
            .map(|nodes| self.leaf_probability(nodes, &values))
            .sum();
        total / self.trees.len() as f64
    }

    fn feature_importances(&self) -> [f64; FEATURE_COUNT] {
        self.importances
    }
}
