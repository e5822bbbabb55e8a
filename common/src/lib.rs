//! Types shared between the dashboard server and its views: the model
//! catalog, hyperparameter parsing and the backend's JSON response shapes.

pub mod catalog;
pub mod hyperparams;
pub mod types;

pub use catalog::{default_hyperparams, CatalogError, ModelFamily, ModelSpec, TaskType};
pub use hyperparams::{HyperparamError, Hyperparameters};
pub use types::*;
