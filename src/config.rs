//! Configuration shared by the search executor and the indexer.
//!
//! Configuration is loaded once (typically from a JSON file) and injected into
//! [`SearchExecutor`](crate::search::SearchExecutor) and
//! [`Indexer`](crate::indexing::Indexer) at construction.
//!
//! ```
//! use pike::config::SearchConfig;
//!
//! let config = SearchConfig::from_json_str(r#"{ "enabled": false, "paginate_size": 50 }"#).unwrap();
//! assert!(!config.enabled);
//! assert_eq!(config.paginate_size, 50);
//! assert_eq!(config.pk_field_name, "id");
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PikeError, Result};

/// Location of a single engine core/collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Host name.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Context path of the engine.
    pub path: String,
    /// Core or collection name.
    pub core: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            host: "localhost".to_string(),
            port: 8983,
            path: "solr".to_string(),
            core: "core".to_string(),
        }
    }
}

impl EndpointConfig {
    /// Base URL of the core, e.g. `http://localhost:8983/solr/core`.
    pub fn base_url(&self) -> String {
        let path = self.path.trim_matches('/');
        if path.is_empty() {
            format!("http://{}:{}/{}", self.host, self.port, self.core)
        } else {
            format!("http://{}:{}/{}/{}", self.host, self.port, path, self.core)
        }
    }
}

/// Search and indexing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// When false, searches return empty results and index updates are skipped.
    pub enabled: bool,
    /// Engine field holding the record's primary key.
    pub pk_field_name: String,
    /// Engine field holding the record's owning type tag.
    pub type_field_name: String,
    /// Reserved record key carrying index boost metadata.
    pub metadata_key: String,
    /// Default number of results per page.
    pub paginate_size: usize,
    /// Endpoint used when a query does not name one.
    pub default_endpoint: String,
    /// Known endpoints by name.
    pub endpoints: BTreeMap<String, EndpointConfig>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert("core".to_string(), EndpointConfig::default());

        SearchConfig {
            enabled: true,
            pk_field_name: "id".to_string(),
            type_field_name: "model_table".to_string(),
            metadata_key: "__search_meta".to_string(),
            paginate_size: 25,
            default_endpoint: "core".to_string(),
            endpoints,
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from JSON; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)
            .map_err(|e| PikeError::config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.paginate_size == 0 {
            return Err(PikeError::config("paginate_size must be greater than 0"));
        }
        for (name, value) in [
            ("pk_field_name", &self.pk_field_name),
            ("type_field_name", &self.type_field_name),
            ("metadata_key", &self.metadata_key),
            ("default_endpoint", &self.default_endpoint),
        ] {
            if value.trim().is_empty() {
                return Err(PikeError::config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// Look up an endpoint by name.
    ///
    /// When no endpoints are configured any name is accepted and `None` is
    /// returned; otherwise an unknown name is a configuration error.
    pub fn endpoint(&self, name: &str) -> Result<Option<&EndpointConfig>> {
        if self.endpoints.is_empty() {
            return Ok(None);
        }
        self.endpoints
            .get(name)
            .map(Some)
            .ok_or_else(|| PikeError::config(format!("unknown endpoint '{name}'")))
    }
}
