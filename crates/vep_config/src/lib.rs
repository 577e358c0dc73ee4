//! Data model and on-disk configuration for virtual endpoints
//!
//! A `vep.json` file holds the real endpoints an application knows about, the
//! user-authored virtual endpoints layered on top of them, and the base URL that
//! relative endpoint paths resolve against.

pub mod endpoint;
pub mod templates;
pub mod virtual_endpoint;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::{Deserialize, Serialize};

pub use endpoint::{EndpointSummary, HttpMethod, RealEndpointDescriptor, UnsupportedMethod};
pub use virtual_endpoint::{
    CreateVirtualEndpoint, DEFAULT_TIMEOUT_MS, EndpointConfig, VirtualEndpointDefinition,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Origin that relative endpoint URLs (e.g. `/users/:id`) are resolved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<url::Url>,

    #[serde(default)]
    pub endpoints: Vec<RealEndpointDescriptor>,

    #[serde(default)]
    pub virtual_endpoints: Vec<VirtualEndpointDefinition>,
}

impl Config {
    pub fn default_path() -> Utf8PathBuf {
        Utf8PathBuf::from("vep.json")
    }

    /// Loads the config from `path`, returning an empty config when the file does not exist
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or is not valid JSON
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config found at {path}, using an empty configuration");
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(path).context(format!("Failed to read config file {path}"))?;

        serde_json::from_str(&contents).context(format!("Failed to parse config file {path}"))
    }

    /// Writes the config to `path` as pretty JSON, creating parent directories
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be serialized or written
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context(format!("Failed to write config file {path}"))?;

        Ok(())
    }

    /// Find a virtual endpoint by id, falling back to an exact name match
    pub fn get_virtual(&self, key: &str) -> Option<&VirtualEndpointDefinition> {
        self.virtual_endpoints
            .iter()
            .find(|v| v.id == key)
            .or_else(|| self.virtual_endpoints.iter().find(|v| v.name == key))
    }

    /// Insert a new virtual endpoint, or replace the one sharing its id
    pub fn upsert_virtual(&mut self, def: VirtualEndpointDefinition) {
        if let Some(existing) = self.virtual_endpoints.iter_mut().find(|v| v.id == def.id) {
            *existing = def;
        } else {
            self.virtual_endpoints.push(def);
        }
    }

    /// Remove a virtual endpoint by id or name
    ///
    /// # Errors
    ///
    /// Fails when no virtual endpoint matches `key`
    pub fn remove_virtual(&mut self, key: &str) -> Result<VirtualEndpointDefinition> {
        let index = self
            .virtual_endpoints
            .iter()
            .position(|v| v.id == key || v.name == key)
            .context(format!("Virtual endpoint '{key}' not found"))?;

        Ok(self.virtual_endpoints.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        serde_json::from_str(
            r#"{
                "baseUrl": "http://localhost:4000",
                "endpoints": [
                    { "id": "u", "name": "User", "method": "GET", "url": "/users/:id",
                      "headers": { "X-Api-Key": "abc" } }
                ],
                "virtualEndpoints": [
                    { "id": "v1", "name": "profile", "path": "/virtual/profile/:id",
                      "code": "return { ok: true };" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_config() {
        let cfg = sample();
        assert_eq!(cfg.base_url.unwrap().as_str(), "http://localhost:4000/");
        assert_eq!(cfg.endpoints[0].headers.as_ref().unwrap()["X-Api-Key"], "abc");
        assert_eq!(cfg.virtual_endpoints[0].config.timeout, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_lookup_upsert_remove() {
        let mut cfg = sample();
        assert!(cfg.get_virtual("v1").is_some());
        assert!(cfg.get_virtual("profile").is_some());
        assert!(cfg.get_virtual("nope").is_none());

        let mut replacement = cfg.virtual_endpoints[0].clone();
        replacement.code = "return 2;".into();
        cfg.upsert_virtual(replacement);
        assert_eq!(cfg.virtual_endpoints.len(), 1);
        assert_eq!(cfg.virtual_endpoints[0].code, "return 2;");

        assert!(cfg.remove_virtual("profile").is_ok());
        assert!(cfg.remove_virtual("profile").is_err());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let cfg = Config::load(Utf8Path::new("/definitely/not/here/vep.json")).unwrap();
        assert!(cfg.endpoints.is_empty());
        assert!(cfg.virtual_endpoints.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("nested/vep.json")).unwrap();

        sample().save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.endpoints, sample().endpoints);
        assert_eq!(loaded.virtual_endpoints, sample().virtual_endpoints);
    }
}
