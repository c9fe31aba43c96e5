//! Level-scoped key/value flags

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(BTreeMap<String, Value>);

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a flag, storing `default` first if it is missing
    pub fn get_or_insert(&mut self, key: &str, default: Value) -> &Value {
        self.0.entry(key.to_string()).or_insert(default)
    }

    /// Set a flag; `None` stores `true`
    pub fn set(&mut self, key: &str, value: Option<Value>) {
        self.0.insert(key.to_string(), value.unwrap_or(Value::Bool(true)));
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_defaults_to_true() {
        let mut flags = Flags::new();
        flags.set("door_open", None);
        assert_eq!(flags.get("door_open"), Some(&json!(true)));
        assert!(flags.has("door_open"));
        assert!(!flags.has("chest_open"));
    }

    #[test]
    fn test_get_or_insert_keeps_existing() {
        let mut flags = Flags::new();
        assert_eq!(flags.get_or_insert("visits", json!(0)), &json!(0));
        flags.set("visits", Some(json!(3)));
        assert_eq!(flags.get_or_insert("visits", json!(0)), &json!(3));
    }
}
