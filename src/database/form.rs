use std::collections::HashMap;
use std::str::FromStr;

use crate::schema::Id;

pub type QueryData = HashMap<String, String>;

/// Tolerant accessor over raw query parameters. Values that fail to parse
/// are treated as absent rather than surfaced as errors.
pub struct Form {
    inner: HashMap<String, String>,
}

impl Form {
    pub fn from_data(data: QueryData) -> Self {
        Self { inner: data }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(|value| value.as_str())
    }

    pub fn get_number<T>(&self, key: &str) -> Option<T>
    where
        T: FromStr,
    {
        let value = self.inner.get(key)?;
        match value.parse() {
            Ok(number) => Some(number),
            Err(_) => {
                log::debug!("ignoring malformed numeric parameter {key}={value}");
                None
            }
        }
    }

    pub fn get_id(&self, key: &str) -> Option<Id> {
        self.get_number(key)
    }

    /// Boolean-ish decoding: `1`/`true` and `0`/`false` (case-insensitive).
    /// Anything else is ignored.
    pub fn get_flag(&self, key: &str) -> Option<bool> {
        let value = self.inner.get(key)?;
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => {
                log::debug!("ignoring malformed boolean parameter {key}={value}");
                None
            }
        }
    }

    /// Comma-separated list decoding; empty segments are dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.inner.get(key) {
            Some(value) => value
                .split(',')
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .map(|part| part.to_string())
                .collect(),
            None => vec![],
        }
    }
}
