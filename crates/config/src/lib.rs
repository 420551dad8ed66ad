//! Layered configuration for mangadav.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults (a catalog server on `127.0.0.1:4567`).
//! 2. A configuration file, TOML, YAML or JSON by extension. Without an
//!    explicit path, `config.toml` in the platform configuration directory is
//!    used if it exists.
//! 3. Environment variables prefixed `MANGADAV_`, with `__` separating nested
//!    keys (`MANGADAV_REMOTE__API_URL`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const APP_NAME: &str = "mangadav";
pub const ENV_PREFIX: &str = "MANGADAV_";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub namespace: NamespaceConfig,
}

/// Where the catalog lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// GraphQL endpoint.
    pub api_url: String,
    /// Base URL relative page URLs are joined onto.
    pub content_url: String,
    pub timeout_secs: u64,
    /// Nodes requested per page of a paginated listing.
    pub page_size: u32,
    pub user_agent: String,
}
impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:4567/api/graphql".to_string(),
            content_url: "http://127.0.0.1:4567/".to_string(),
            timeout_secs: 30,
            page_size: 100,
            user_agent: format!("{APP_NAME}/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How pages are presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Page file extension, without the dot.
    pub page_extension: String,
    pub content_type: String,
}
impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            page_extension: "jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        }
    }
}

impl Config {
    /// `config.toml` in the platform configuration directory, if the platform
    /// has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load from every source. An explicit `path` must exist; the default path
    /// is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = Self::resolve_file(path, Self::default_path())?;
        match &file {
            Some(path) => tracing::debug!(path = %path.display(), "Loading configuration file"),
            None => tracing::debug!("No configuration file, using defaults and environment"),
        }
        Self::extract(Self::layered(file.as_deref()))
    }

    /// The configuration file to read: `path` if given, otherwise `default`
    /// when it exists.
    fn resolve_file(path: Option<&Path>, default: Option<PathBuf>) -> Result<Option<PathBuf>> {
        match path {
            Some(path) if !path.is_file() => {
                exn::bail!(ErrorKind::Invalid(format!("config file {} does not exist", path.display())));
            },
            Some(path) => Ok(Some(path.to_path_buf())),
            None => Ok(default.filter(|path| path.is_file())),
        }
    }

    /// Every layer, environment last.
    fn layered(path: Option<&Path>) -> Figment {
        Self::figment(path).merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Defaults merged with a configuration file (if any), without the
    /// environment.
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let Some(path) = path else {
            return figment;
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        }
    }

    /// Extract and validate a configuration.
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("remote.api_url", &self.remote.api_url), ("remote.content_url", &self.remote.content_url)]
        {
            Url::parse(value).or_raise(|| ErrorKind::Invalid(format!("{key} is not a valid URL: {value}")))?;
        }
        if self.remote.page_size == 0 {
            exn::bail!(ErrorKind::Invalid("remote.page_size must be greater than zero".to_string()));
        }
        if self.remote.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("remote.timeout_secs must be greater than zero".to_string()));
        }
        let extension = &self.namespace.page_extension;
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            exn::bail!(ErrorKind::Invalid(format!(
                "namespace.page_extension must be ASCII letters and digits, got {extension:?}"
            )));
        }
        if self.namespace.content_type.is_empty() {
            exn::bail!(ErrorKind::Invalid("namespace.content_type must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::io::Write;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::extract(Config::figment(None)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.remote.timeout(), Duration::from_secs(30));
        assert!(config.remote.user_agent.starts_with("mangadav/"));
    }

    #[rstest]
    #[case(".toml", "[remote]\npage_size = 25\n\n[namespace]\npage_extension = \"png\"\n")]
    #[case(".yaml", "remote:\n  page_size: 25\nnamespace:\n  page_extension: png\n")]
    #[case(".json", r#"{"remote": {"page_size": 25}, "namespace": {"page_extension": "png"}}"#)]
    fn test_file_overrides_defaults(#[case] suffix: &str, #[case] contents: &str) {
        let file = write_config(suffix, contents);
        let config = Config::extract(Config::figment(Some(file.path()))).unwrap();
        assert_eq!(config.remote.page_size, 25);
        assert_eq!(config.namespace.page_extension, "png");
        // Untouched keys keep their defaults.
        assert_eq!(config.remote.api_url, RemoteConfig::default().api_url);
        assert_eq!(config.namespace.content_type, "image/jpeg");
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config(".toml", "[remote]\npage_size = \"many\"\n");
        let err = Config::extract(Config::figment(Some(file.path()))).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[rstest]
    #[case("[remote]\napi_url = \"not a url\"\n")]
    #[case("[remote]\ncontent_url = \"\"\n")]
    #[case("[remote]\npage_size = 0\n")]
    #[case("[remote]\ntimeout_secs = 0\n")]
    #[case("[namespace]\npage_extension = \"\"\n")]
    #[case("[namespace]\npage_extension = \".jpg\"\n")]
    #[case("[namespace]\ncontent_type = \"\"\n")]
    fn test_invalid(#[case] contents: &str) {
        let file = write_config(".toml", contents);
        let err = Config::extract(Config::figment(Some(file.path()))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[remote]\npage_size = 25\ntimeout_secs = 5\n")?;
            jail.set_env("MANGADAV_REMOTE__PAGE_SIZE", "7");
            jail.set_env("MANGADAV_NAMESPACE__PAGE_EXTENSION", "png");
            let config = Config::load(Some(Path::new("config.toml"))).unwrap();
            assert_eq!(config.remote.page_size, 7);
            assert_eq!(config.remote.timeout_secs, 5);
            assert_eq!(config.namespace.page_extension, "png");
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("MANGADAV_REMOTE__API_URL", "http://catalog.local/api/graphql");
            let config = Config::extract(Config::layered(None)).unwrap();
            assert_eq!(config.remote.api_url, "http://catalog.local/api/graphql");
            assert_eq!(config.remote.page_size, RemoteConfig::default().page_size);
            Ok(())
        });
    }

    #[test]
    fn test_environment_is_validated() {
        Jail::expect_with(|jail| {
            jail.set_env("MANGADAV_REMOTE__PAGE_SIZE", "0");
            let err = Config::extract(Config::layered(None)).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_default_file_used_only_if_present() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join(CONFIG_FILE_NAME);
        assert_eq!(Config::resolve_file(None, Some(default.clone())).unwrap(), None);
        std::fs::write(&default, "[remote]\npage_size = 25\n").unwrap();
        assert_eq!(Config::resolve_file(None, Some(default.clone())).unwrap(), Some(default.clone()));
        assert_eq!(Config::resolve_file(None, None).unwrap(), None);

        let explicit = write_config(".yaml", "remote:\n  page_size: 3\n");
        let file = Config::resolve_file(Some(explicit.path()), Some(default)).unwrap();
        assert_eq!(file.as_deref(), Some(explicit.path()));
    }
}
