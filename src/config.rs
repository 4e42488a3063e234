//! API connection configuration.
//!
//! The configuration is looked up in this order: explicit flags, the config
//! file, built-in defaults. The file is located with `--config-file` or next to the
//! executable (`etc/api.conf`, then `api.conf`). `.json`, `.toml` and
//! `.yaml`/`.yml` files are read as plain text; anything else, including the
//! classic `api.conf`, is gzip-compressed JSON.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cli::ConfigFormat;
use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.coscale.com";
pub const CONFIG_FILE_NAME: &str = "api.conf";

/// Everything needed to talk to one CoScale application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiConfiguration {
    /// `https://<coscale-hostname>`, without trailing slash
    #[serde(default)]
    pub base_url: String,
    /// UUID granting access to the application
    #[serde(default)]
    pub access_token: String,
    /// UUID of the application
    #[serde(default)]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}

/// Connection values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub app_id: Option<String>,
    pub access_token: Option<String>,
}

impl ConfigOverrides {
    /// True when the flags alone are enough to build a configuration.
    pub fn is_complete(&self) -> bool {
        self.app_id.is_some() && self.access_token.is_some()
    }
}

impl ApiConfiguration {
    pub fn new(base_url: &str, access_token: &str, app_id: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_token: access_token.to_string(),
            app_id: app_id.to_string(),
            ..Self::default()
        }
        .normalized()
    }

    fn normalized(mut self) -> Self {
        if self.base_url.is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid("base url must not be empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base url must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if self.app_id.is_empty() {
            return Err(ConfigError::Invalid("app id must not be empty".into()));
        }
        if self.access_token.is_empty() {
            return Err(ConfigError::Invalid("access token must not be empty".into()));
        }
        Ok(())
    }

    /// Copy with the access token reduced to its last four characters.
    pub fn masked(&self) -> Self {
        let visible: String = {
            let chars: Vec<char> = self.access_token.chars().collect();
            if chars.len() > 8 {
                chars[chars.len() - 4..].iter().collect()
            } else {
                String::new()
            }
        };
        Self {
            access_token: format!("****{visible}"),
            ..self.clone()
        }
    }
}

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
    Yaml,
    GzipJson,
}

impl FileFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => FileFormat::Json,
            Some("toml") => FileFormat::Toml,
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            _ => FileFormat::GzipJson,
        }
    }
}

/// Directory holding the (symlink-resolved) executable.
pub fn executable_dir() -> Result<PathBuf, ConfigError> {
    let exe = std::env::current_exe().map_err(|source| ConfigError::Io {
        path: "<current executable>".into(),
        source,
    })?;
    let exe = fs::canonicalize(&exe).unwrap_or(exe);
    Ok(exe.parent().map(Path::to_path_buf).unwrap_or_default())
}

/// Locations searched for the configuration file, in order.
pub fn candidate_paths(dir: &Path) -> Vec<PathBuf> {
    vec![dir.join("etc").join(CONFIG_FILE_NAME), dir.join(CONFIG_FILE_NAME)]
}

fn find_in(dir: &Path) -> Result<PathBuf, ConfigError> {
    let candidates = candidate_paths(dir);
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| {
            ConfigError::NotFound(
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        })
}

/// Finds the configuration file next to the executable.
pub fn find_config_file() -> Result<PathBuf, ConfigError> {
    find_in(&executable_dir()?)
}

/// Where `config set` writes when no `--config-file` is given: the existing file
/// if there is one, otherwise `api.conf` next to the executable.
pub fn default_write_path() -> Result<PathBuf, ConfigError> {
    let dir = executable_dir()?;
    Ok(find_in(&dir).unwrap_or_else(|_| dir.join(CONFIG_FILE_NAME)))
}

/// Reads a configuration file in the format implied by its extension.
pub fn load_config(path: &Path) -> Result<ApiConfiguration, ConfigError> {
    let shown = path.display().to_string();
    let io_err = |source| ConfigError::Io {
        path: shown.clone(),
        source,
    };
    let parse_err = |reason: String| ConfigError::Parse {
        path: shown.clone(),
        reason,
    };

    let format = FileFormat::from_path(path);
    let config: ApiConfiguration = match format {
        FileFormat::GzipJson => {
            let file = File::open(path).map_err(io_err)?;
            let mut content = String::new();
            GzDecoder::new(file)
                .read_to_string(&mut content)
                .map_err(|e| parse_err(e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?
        }
        FileFormat::Json => {
            let content = fs::read_to_string(path).map_err(io_err)?;
            serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?
        }
        FileFormat::Toml => {
            let content = fs::read_to_string(path).map_err(io_err)?;
            toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?
        }
        FileFormat::Yaml => {
            let content = fs::read_to_string(path).map_err(io_err)?;
            serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?
        }
    };

    info!("Loaded {:?} configuration from: {}", format, shown);
    Ok(config)
}

/// Writes a configuration file in the format implied by its extension.
pub fn write_config(path: &Path, config: &ApiConfiguration) -> Result<(), ConfigError> {
    let shown = path.display().to_string();
    let io_err = |source| ConfigError::Io {
        path: shown.clone(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    match FileFormat::from_path(path) {
        FileFormat::GzipJson => {
            let json = serde_json::to_vec(config)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?;
            let file = File::create(path).map_err(io_err)?;
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(&json).map_err(io_err)?;
            encoder.finish().map_err(io_err)?;
        }
        FileFormat::Json => {
            fs::write(path, render_config(config, &ConfigFormat::Json)?).map_err(io_err)?
        }
        FileFormat::Toml => {
            fs::write(path, render_config(config, &ConfigFormat::Toml)?).map_err(io_err)?
        }
        FileFormat::Yaml => {
            fs::write(path, render_config(config, &ConfigFormat::Yaml)?).map_err(io_err)?
        }
    }

    debug!("Wrote configuration to: {}", shown);
    Ok(())
}

/// Renders a configuration for display.
pub fn render_config(config: &ApiConfiguration, format: &ConfigFormat) -> Result<String, ConfigError> {
    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::to_string(config).map_err(|e| e.to_string()),
    };
    content.map_err(ConfigError::Serialize)
}

/// Builds the effective configuration (flags > file > defaults) and validates it.
///
/// The file is only consulted when `config_path` is given or the flags do
/// not carry both an app id and an access token.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    config_path: Option<&Path>,
) -> Result<ApiConfiguration, ConfigError> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None if overrides.is_complete() => ApiConfiguration::default(),
        None => load_config(&find_config_file()?)?,
    };

    if let Some(url) = &overrides.api_url {
        config.base_url = url.clone();
    }
    if let Some(app_id) = &overrides.app_id {
        config.app_id = app_id.clone();
    }
    if let Some(token) = &overrides.access_token {
        config.access_token = token.clone();
    }

    let config = config.normalized();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> ApiConfiguration {
        ApiConfiguration::new(
            "https://api.example.com/",
            "0a1b2c3d-0000-1111-2222-333344445555",
            "app-uuid",
        )
    }

    #[test]
    fn test_new_strips_trailing_slash_and_defaults_url() {
        assert_eq!(sample().base_url, "https://api.example.com");
        assert_eq!(ApiConfiguration::new("", "t", "a").base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_round_trip_all_formats() {
        let dir = tempdir().unwrap();
        for name in ["api.conf", "api.json", "api.toml", "api.yaml", "nested/etc/api.conf"] {
            let path = dir.path().join(name);
            write_config(&path, &sample()).unwrap();
            assert_eq!(load_config(&path).unwrap(), sample(), "format of {name}");
        }
    }

    #[test]
    fn test_gzip_file_uses_pascal_case_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.conf");
        write_config(&path, &sample()).unwrap();

        let mut json = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut json)
            .unwrap();
        assert!(json.contains("\"BaseUrl\":\"https://api.example.com\""));
        assert!(json.contains("\"AppId\":\"app-uuid\""));
    }

    #[test]
    fn test_plain_json_is_not_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.conf");
        fs::write(&path, "{}").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_config(&dir.path().join("api.conf")),
            Err(ConfigError::Io { .. })
        ));
        assert!(matches!(find_in(dir.path()), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_find_prefers_etc() {
        let dir = tempdir().unwrap();
        write_config(&dir.path().join("api.conf"), &sample()).unwrap();
        assert_eq!(find_in(dir.path()).unwrap(), dir.path().join("api.conf"));

        write_config(&dir.path().join("etc").join("api.conf"), &sample()).unwrap();
        assert_eq!(
            find_in(dir.path()).unwrap(),
            dir.path().join("etc").join("api.conf")
        );
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.yaml");
        write_config(&path, &sample()).unwrap();

        let overrides = ConfigOverrides {
            app_id: Some("other-app".into()),
            ..Default::default()
        };
        let config = resolve_config(&overrides, Some(&path)).unwrap();
        assert_eq!(config.app_id, "other-app");
        assert_eq!(config.access_token, sample().access_token);
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_complete_flags_need_no_file() {
        let overrides = ConfigOverrides {
            api_url: None,
            app_id: Some("app".into()),
            access_token: Some("token".into()),
        };
        let config = resolve_config(&overrides, None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_validation() {
        let mut config = sample();
        assert!(config.validate().is_ok());

        config.base_url = "ftp://api.example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = sample();
        config.access_token.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked_token() {
        assert_eq!(sample().masked().access_token, "****5555");
        assert_eq!(ApiConfiguration::new("", "short", "a").masked().access_token, "****");
    }
}
