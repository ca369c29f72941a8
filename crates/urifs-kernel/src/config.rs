//! Registry configuration.
//!
//! Extra backends are described in a TOML file and registered at startup:
//!
//! ```toml
//! [[backend]]
//! prefix = "proj://"
//! kind = "local"
//! root = "/home/me/project"
//! read_only = true
//!
//! [[backend]]
//! prefix = "scratch://"
//! kind = "memory"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use urifs_glob::split_scheme;

use crate::vfs::{Backend, LocalBackend, MemoryBackend, Registry, VfsError, VfsResult};

/// Kind of store behind a configured prefix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    /// Local directory tree confined to `root`.
    Local,
    /// Ephemeral in-memory tree.
    Memory,
}

/// One `[[backend]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub prefix: String,
    pub kind: BackendKind,
    /// Required for `local`, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub read_only: bool,
}

impl BackendConfig {
    fn validate(&self) -> VfsResult<()> {
        if split_scheme(&self.prefix).is_none() {
            return Err(VfsError::config(format!(
                "prefix {:?} must look like scheme://",
                self.prefix
            )));
        }
        if self.kind == BackendKind::Local && self.root.is_none() {
            return Err(VfsError::config(format!(
                "local backend {} needs a root",
                self.prefix
            )));
        }
        Ok(())
    }

    /// Construct the backend this entry describes.
    pub fn build(&self) -> VfsResult<Arc<dyn Backend>> {
        self.validate()?;
        let backend: Arc<dyn Backend> = match self.kind {
            BackendKind::Local => {
                let root = self
                    .root
                    .as_ref()
                    .ok_or_else(|| VfsError::config("local backend needs a root"))?;
                Arc::new(
                    LocalBackend::rooted(self.prefix.clone(), root).with_read_only(self.read_only),
                )
            }
            BackendKind::Memory => {
                if self.root.is_some() {
                    tracing::warn!(prefix = %self.prefix, "root ignored for memory backend");
                }
                if self.read_only {
                    tracing::warn!(prefix = %self.prefix, "read_only ignored for memory backend");
                }
                Arc::new(MemoryBackend::with_prefix(self.prefix.clone()))
            }
        };
        Ok(backend)
    }
}

/// The full configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default, rename = "backend")]
    pub backends: Vec<BackendConfig>,
}

impl RegistryConfig {
    /// Default location: `<config dir>/urifs/backends.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("urifs").join("backends.toml"))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> VfsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| VfsError::config(format!("parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub async fn load(path: &Path) -> VfsResult<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| VfsError::config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loading registry config");
        Self::from_toml(&text)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> VfsResult<String> {
        toml::to_string_pretty(self).map_err(|e| VfsError::config(e.to_string()))
    }

    pub fn validate(&self) -> VfsResult<()> {
        let mut seen = HashSet::new();
        for backend in &self.backends {
            backend.validate()?;
            if !seen.insert(backend.prefix.as_str()) {
                return Err(VfsError::config(format!(
                    "prefix {} configured twice",
                    backend.prefix
                )));
            }
        }
        Ok(())
    }

    /// Build every backend and register it. Nothing is registered if any
    /// entry fails to build.
    pub fn apply(&self, registry: &Registry) -> VfsResult<usize> {
        self.validate()?;
        let built = self
            .backends
            .iter()
            .map(BackendConfig::build)
            .collect::<VfsResult<Vec<_>>>()?;

        let count = built.len();
        for backend in built {
            if let Some(previous) = registry.register(backend) {
                tracing::warn!(prefix = %previous.prefix(), "config replaced a registered backend");
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_and_apply() {
        let dir = TempDir::new().unwrap();
        let text = format!(
            r#"
[[backend]]
prefix = "proj://"
kind = "local"
root = '{}'
read_only = true

[[backend]]
prefix = "scratch://"
kind = "memory"
"#,
            dir.path().display()
        );

        let config = RegistryConfig::from_toml(&text).unwrap();
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[0].kind, BackendKind::Local);
        assert!(config.backends[0].read_only);
        assert!(!config.backends[1].read_only);

        let registry = Registry::new();
        assert_eq!(config.apply(&registry).unwrap(), 2);

        let infos = registry.backends();
        let proj = infos.iter().find(|i| i.prefix == "proj://").unwrap();
        assert!(proj.read_only);
        assert!(registry.get("scratch://").is_some());
        assert!(!registry.handle("scratch://x").is_invalid());
    }

    #[test]
    fn test_empty_config() {
        let config = RegistryConfig::from_toml("").unwrap();
        assert!(config.backends.is_empty());
        assert_eq!(config.apply(&Registry::new()).unwrap(), 0);
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let err = RegistryConfig::from_toml(
            r#"
[[backend]]
prefix = "x://"
kind = "s3"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, VfsError::Config(_)));
    }

    #[test]
    fn test_rejects_local_without_root() {
        let err = RegistryConfig::from_toml(
            r#"
[[backend]]
prefix = "proj://"
kind = "local"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, VfsError::Config(msg) if msg.contains("root")));
    }

    #[test]
    fn test_rejects_bad_prefix_and_duplicates() {
        let bad = RegistryConfig::from_toml(
            r#"
[[backend]]
prefix = "proj"
kind = "memory"
"#,
        );
        assert!(matches!(bad, Err(VfsError::Config(_))));

        let dup = RegistryConfig::from_toml(
            r#"
[[backend]]
prefix = "m://"
kind = "memory"

[[backend]]
prefix = "m://"
kind = "memory"
"#,
        );
        assert!(matches!(dup, Err(VfsError::Config(msg)) if msg.contains("twice")));
    }

    #[test]
    fn test_failed_apply_registers_nothing() {
        let config = RegistryConfig {
            backends: vec![
                BackendConfig {
                    prefix: "ok://".into(),
                    kind: BackendKind::Memory,
                    root: None,
                    read_only: false,
                },
                BackendConfig {
                    prefix: "broken://".into(),
                    kind: BackendKind::Local,
                    root: None,
                    read_only: false,
                },
            ],
        };
        let registry = Registry::new();
        assert!(config.apply(&registry).is_err());
        assert!(registry.get("ok://").is_none());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = RegistryConfig {
            backends: vec![BackendConfig {
                prefix: "scratch://".into(),
                kind: BackendKind::Memory,
                root: None,
                read_only: false,
            }],
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains("[[backend]]"));
        assert_eq!(RegistryConfig::from_toml(&text).unwrap(), config);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backends.toml");
        std::fs::write(&path, "[[backend]]\nprefix = \"m://\"\nkind = \"memory\"\n").unwrap();

        let config = RegistryConfig::load(&path).await.unwrap();
        assert_eq!(config.backends[0].prefix, "m://");

        let missing = RegistryConfig::load(&dir.path().join("nope.toml")).await;
        assert!(matches!(missing, Err(VfsError::Config(_))));
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = RegistryConfig::default_path() {
            assert!(path.ends_with("urifs/backends.toml"));
        }
    }
}
