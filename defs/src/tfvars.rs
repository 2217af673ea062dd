use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Well-known variable names. The generator writes them with computed
// defaults and the orchestrator patches them once build-time values
// (image reference, detected port) are known.
pub const APP_NAME: &str = "app_name";
pub const REGION: &str = "region";
pub const IMAGE: &str = "image";
pub const CONTAINER_PORT: &str = "container_port";
pub const HEALTH_CHECK_PATH: &str = "health_check_path";
pub const CPU: &str = "cpu";
pub const MEMORY: &str = "memory";
pub const DESIRED_COUNT: &str = "desired_count";
pub const DB_ENGINE: &str = "db_engine";
pub const DB_INSTANCE_CLASS: &str = "db_instance_class";
pub const DB_NAME: &str = "db_name";
pub const DB_USERNAME: &str = "db_username";
pub const ENVIRONMENT: &str = "environment";
pub const DOMAIN: &str = "domain";
pub const ENABLE_TLS: &str = "enable_tls";
pub const KV_TABLE_NAME: &str = "kv_table_name";

/// The mutable variable set behind `terraform.tfvars.json`.
///
/// This is the single point of late binding between generation and
/// deployment: the generator writes computed defaults, later stages apply
/// typed patches and re-serialize. Keys are kept sorted by the underlying
/// map so the file is stable across rewrites.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TfVars(Map<String, Value>);

impl TfVars {
    pub fn new() -> Self {
        TfVars(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(|v| v.as_u64())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn set_str(&mut self, key: &str, value: &str) {
        self.set(key, Value::String(value.to_string()));
    }

    pub fn set_number(&mut self, key: &str, value: u64) {
        self.set(key, Value::from(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, Value::Bool(value));
    }

    pub fn set_if_absent(&mut self, key: &str, value: Value) {
        if !self.0.contains_key(key) {
            self.0.insert(key.to_string(), value);
        }
    }

    /// Adds one entry to the `environment` map variable, creating it if
    /// needed.
    pub fn set_env_var(&mut self, name: &str, value: &str) {
        let entry = self
            .0
            .entry(ENVIRONMENT.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(map) = entry.as_object_mut() {
            map.insert(name.to_string(), Value::String(value.to_string()));
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.0).context("Failed to serialize tfvars")
    }

    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &self.0)
            .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let vars: TfVars = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip_through_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terraform.tfvars.json");

        let mut vars = TfVars::new();
        vars.set_str(APP_NAME, "demo");
        vars.set_number(CONTAINER_PORT, 8080);
        vars.set_env_var("PORT", "8080");
        vars.write_json_file(&path).unwrap();

        let reread = TfVars::from_json_file(&path).unwrap();
        assert_eq!(reread, vars);
        assert_eq!(reread.get_str(APP_NAME), Some("demo"));
        assert_eq!(reread.get_u64(CONTAINER_PORT), Some(8080));
    }

    #[test]
    fn test_set_if_absent_keeps_existing_value() {
        let mut vars = TfVars::new();
        vars.set_number(CPU, 1024);
        vars.set_if_absent(CPU, Value::from(512));
        vars.set_if_absent(MEMORY, Value::from(1024));
        assert_eq!(vars.get_u64(CPU), Some(1024));
        assert_eq!(vars.get_u64(MEMORY), Some(1024));
    }

    #[test]
    fn test_env_var_map_accumulates() {
        let mut vars = TfVars::new();
        vars.set_env_var("PORT", "8000");
        vars.set_env_var("APP_REGION", "us-east-1");
        let env = vars.get(ENVIRONMENT).unwrap().as_object().unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env["PORT"], "8000");
    }
}
