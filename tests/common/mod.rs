// Shared test helpers for integration tests
#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use suite_runner::core::models::{Parameters, TestConfig};
use tempfile::TempDir;

/// Converts a `json!` object literal into a parameter map.
pub fn params(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn test_config(name: &str, plugin: &str) -> Arc<TestConfig> {
    Arc::new(TestConfig::new(name, plugin, Parameters::new()))
}

pub fn test_configs(names: &[&str]) -> Vec<Arc<TestConfig>> {
    names.iter().map(|name| test_config(name, "fake")).collect()
}

/// Records the order in which tests are started.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|n| *n == name).count()
    }
}

/// Writes `content` to `file_name` inside `dir` and returns the full path.
pub fn write_file(dir: &TempDir, file_name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}
