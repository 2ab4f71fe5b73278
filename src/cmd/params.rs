use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Named parameters passed to a command by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandParams(Map<String, Value>);

impl CommandParams {
    /// Parses `key=value` pairs; later pairs win.
    pub fn from_pairs<I, S>(pairs: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut params = Map::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Validation(format!("Parameter '{pair}' is not in key=value form"))
                })?;
            params.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
        }
        Ok(Self(params))
    }

    pub fn optional_str(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn retrieve_str(&self, name: &str) -> AppResult<&str> {
        self.optional_str(name)
            .ok_or_else(|| AppError::Validation(format!("Parameter '{name}' was not provided")))
    }
}
