//! `config check`, `config set` and `config show`.

use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::info;

use coscale_cli::api::Api;
use coscale_cli::cli::ConfigAction;
use coscale_cli::config::{
    default_write_path, find_config_file, load_config, render_config, resolve_config,
    write_config, ApiConfiguration, ConfigOverrides, DEFAULT_BASE_URL,
};

use super::usage;

pub async fn command_config(
    action: ConfigAction,
    overrides: &ConfigOverrides,
    config_path: Option<&Path>,
) -> Result<String> {
    match action {
        ConfigAction::Check => check(config_path).await,
        ConfigAction::Set => set(overrides, config_path),
        ConfigAction::Show { format } => {
            let config = resolve_config(overrides, config_path)?;
            Ok(render_config(&config.masked(), &format)?)
        }
    }
}

/// Every failure here is a failed check, not a usage error.
async fn check(config_path: Option<&Path>) -> Result<String> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file().map_err(|e| anyhow!("{e}"))?,
    };
    let config = load_config(&path).map_err(|e| anyhow!("{e}"))?;
    config.validate().map_err(|e| anyhow!("{e}"))?;

    let mut api = Api::new(&config, false)?;
    api.login()
        .await
        .map_err(|e| anyhow!("Api authentication failed: {e}"))?;

    info!("Configuration {} checked", path.display());
    Ok("Configuration successfully checked".to_string())
}

fn set(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<String> {
    let (Some(app_id), Some(access_token)) = (&overrides.app_id, &overrides.access_token) else {
        return Err(usage("config set needs --app-id and --access-token"));
    };
    let base_url = overrides.api_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

    let config = ApiConfiguration::new(base_url, access_token, app_id);
    config.validate()?;

    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => default_write_path()?,
    };
    write_config(&path, &config)?;
    Ok(format!(
        "Successfully wrote CLI configuration file {}",
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn overrides() -> ConfigOverrides {
        ConfigOverrides {
            api_url: Some("https://api.example.com/".to_string()),
            app_id: Some("app-uuid".to_string()),
            access_token: Some("0a1b2c3d-0000-1111-2222-333344445555".to_string()),
        }
    }

    #[test]
    fn test_set_writes_loadable_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.conf");
        set(&overrides(), Some(&path)).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.app_id, "app-uuid");
    }

    #[test]
    fn test_set_requires_credentials() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.conf");
        let err = set(&ConfigOverrides::default(), Some(&path)).unwrap_err();
        assert!(err.downcast_ref::<super::super::UsageError>().is_some());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_show_masks_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.json");
        set(&overrides(), Some(&path)).unwrap();

        let shown = command_config(
            ConfigAction::Show {
                format: coscale_cli::cli::ConfigFormat::Json,
            },
            &ConfigOverrides::default(),
            Some(&path),
        )
        .await
        .unwrap();
        assert!(shown.contains("****5555"));
        assert!(!shown.contains("0a1b2c3d"));
    }
}
