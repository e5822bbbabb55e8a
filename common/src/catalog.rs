//! Closed catalog of trainable model families and task types.
//!
//! The selection lists rendered by the dashboard and the default
//! hyperparameter lookup both read from this module, so the values offered to
//! the user are always the ones the backend is sent.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    LogisticRegression,
    LinearRegression,
    DecisionTree,
    RandomForest,
    GradientBoosting,
    KNeighbors,
    Svm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Classification,
    Regression,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown model family `{0}`")]
    UnknownFamily(String),

    #[error("unknown task type `{0}` (expected classification or regression)")]
    UnknownTask(String),

    #[error("unknown combination: model family `{family}` does not support task `{task}`")]
    UnknownCombination { family: String, task: String },
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 7] = [
        ModelFamily::LogisticRegression,
        ModelFamily::LinearRegression,
        ModelFamily::DecisionTree,
        ModelFamily::RandomForest,
        ModelFamily::GradientBoosting,
        ModelFamily::KNeighbors,
        ModelFamily::Svm,
    ];

    /// Name sent to the backend as `model_name`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::LogisticRegression => "logistic_regression",
            ModelFamily::LinearRegression => "linear_regression",
            ModelFamily::DecisionTree => "decision_tree",
            ModelFamily::RandomForest => "random_forest",
            ModelFamily::GradientBoosting => "gradient_boosting",
            ModelFamily::KNeighbors => "k_neighbors",
            ModelFamily::Svm => "svm",
        }
    }

    pub fn tasks(&self) -> &'static [TaskType] {
        match self {
            ModelFamily::LogisticRegression => &[TaskType::Classification],
            ModelFamily::LinearRegression => &[TaskType::Regression],
            _ => &TaskType::ALL,
        }
    }

    pub fn supports(&self, task: TaskType) -> bool {
        self.tasks().contains(&task)
    }
}

impl TaskType {
    pub const ALL: [TaskType; 2] = [TaskType::Classification, TaskType::Regression];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Classification => "classification",
            TaskType::Regression => "regression",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ModelFamily::ALL
            .iter()
            .copied()
            .find(|family| family.as_str() == name)
            .ok_or_else(|| CatalogError::UnknownFamily(name.to_string()))
    }
}

impl FromStr for TaskType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "classification" => Ok(TaskType::Classification),
            "regression" => Ok(TaskType::Regression),
            other => Err(CatalogError::UnknownTask(other.to_string())),
        }
    }
}

/// A family/task pair the catalog knows how to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub family: ModelFamily,
    pub task: TaskType,
}

impl ModelSpec {
    pub fn new(family: ModelFamily, task: TaskType) -> Result<Self, CatalogError> {
        if !family.supports(task) {
            return Err(CatalogError::UnknownCombination {
                family: family.to_string(),
                task: task.to_string(),
            });
        }
        Ok(Self { family, task })
    }

    /// Parses user-facing strings. Unknown family or task names are reported
    /// individually so the form can point at the offending field.
    pub fn parse(family: &str, task: &str) -> Result<Self, CatalogError> {
        let family: ModelFamily = family.parse()?;
        let task: TaskType = task.parse()?;
        Self::new(family, task)
    }

    pub fn default_hyperparams(&self) -> Value {
        use ModelFamily::*;
        use TaskType::*;

        match (self.family, self.task) {
            (LogisticRegression, _) => json!({
                "C": 1.0,
                "penalty": "l2",
                "solver": "lbfgs",
                "max_iter": 100,
            }),
            (LinearRegression, _) => json!({
                "fit_intercept": true,
            }),
            (DecisionTree, Classification) => json!({
                "criterion": "gini",
                "max_depth": null,
                "min_samples_split": 2,
                "min_samples_leaf": 1,
            }),
            (DecisionTree, Regression) => json!({
                "criterion": "squared_error",
                "max_depth": null,
                "min_samples_split": 2,
                "min_samples_leaf": 1,
            }),
            (RandomForest, Classification) => json!({
                "n_estimators": 100,
                "criterion": "gini",
                "max_depth": null,
                "min_samples_split": 2,
            }),
            (RandomForest, Regression) => json!({
                "n_estimators": 100,
                "criterion": "squared_error",
                "max_depth": null,
                "min_samples_split": 2,
            }),
            (GradientBoosting, Classification) => json!({
                "n_estimators": 100,
                "learning_rate": 0.1,
                "max_depth": 3,
                "loss": "log_loss",
            }),
            (GradientBoosting, Regression) => json!({
                "n_estimators": 100,
                "learning_rate": 0.1,
                "max_depth": 3,
                "loss": "squared_error",
            }),
            (KNeighbors, _) => json!({
                "n_neighbors": 5,
                "weights": "uniform",
                "metric": "minkowski",
            }),
            (Svm, Classification) => json!({
                "C": 1.0,
                "kernel": "rbf",
                "gamma": "scale",
                "probability": false,
            }),
            (Svm, Regression) => json!({
                "C": 1.0,
                "kernel": "rbf",
                "gamma": "scale",
                "epsilon": 0.1,
            }),
        }
    }
}

/// Default hyperparameters for a family/task pair given as free text.
///
/// Any name the catalog does not know, or a pair it cannot train, is an
/// unknown combination. The lookup never falls back to an empty set.
pub fn default_hyperparams(family: &str, task: &str) -> Result<Value, CatalogError> {
    let spec = ModelSpec::parse(family, task).map_err(|e| {
        tracing::debug!("default hyperparameter lookup failed: {}", e);
        CatalogError::UnknownCombination {
            family: family.trim().to_string(),
            task: task.trim().to_string(),
        }
    })?;

    Ok(spec.default_hyperparams())
}
