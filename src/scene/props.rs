//! Per-node user properties.
//!
//! The host persists node annotations as string key/value pairs. Typed
//! accessors parse on read and format on write, so a value written as an
//! integer can be read back as a string and vice versa.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProps {
    values: FxHashMap<String, String>,
}

impl UserProps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_owned(), value.into());
    }

    /// Reads an integer property. `None` if absent or not an integer.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get_string(key)?.trim().parse().ok()
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.set_string(key, value.to_string());
    }

    /// Reads a boolean property. Accepts `true`/`false` and integers
    /// (non-zero is true).
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let raw = self.get_string(key)?.trim();
        match raw.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            other => other.parse::<i32>().ok().map(|v| v != 0),
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_string(key, if value { "true" } else { "false" });
    }

    #[must_use]
    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.get_string(key)?.trim().parse().ok()
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.set_string(key, value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
