use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HyperparamError {
    #[error("invalid structured data: {0}")]
    Syntax(String),

    #[error("invalid structured data: expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Hyperparameters as typed into the dashboard, parsed into a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hyperparameters(Map<String, Value>);

impl Hyperparameters {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Compact JSON, the form the backend expects in the `hyperparams` field.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl FromStr for Hyperparameters {
    type Err = HyperparamError;

    /// Blank text means "no overrides" and yields an empty object.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value =
            serde_json::from_str(text).map_err(|e| HyperparamError::Syntax(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Array(_) => Err(HyperparamError::NotAnObject("an array")),
            Value::String(_) => Err(HyperparamError::NotAnObject("a string")),
            Value::Number(_) => Err(HyperparamError::NotAnObject("a number")),
            Value::Bool(_) => Err(HyperparamError::NotAnObject("a boolean")),
            Value::Null => Err(HyperparamError::NotAnObject("null")),
        }
    }
}

impl From<Map<String, Value>> for Hyperparameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
