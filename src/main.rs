//! coscale-cli binary: command-line client for the CoScale monitoring API.

use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;

use coscale_cli::api::Api;
use coscale_cli::cli::{Args, Commands};
use coscale_cli::config::{resolve_config, ConfigOverrides};
use coscale_cli::error::{
    error_json, ApiError, ConfigError, EXIT_AUTHENTICATION_ERROR, EXIT_ERROR, EXIT_FLAG_ERROR,
    EXIT_SUCCESS,
};
use coscale_cli::logging::setup_logging;

mod commands;

use commands::{
    command_alert, command_config, command_data, command_event, command_metric,
    command_metricgroup, command_server, command_servergroup, UsageError,
};

/// Maps a failed command onto the process exit code.
fn exit_code(err: &anyhow::Error) -> i32 {
    if err
        .downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_authentication)
    {
        return EXIT_AUTHENTICATION_ERROR;
    }
    if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<UsageError>().is_some() {
        return EXIT_FLAG_ERROR;
    }
    EXIT_ERROR
}

async fn run(args: Args) -> anyhow::Result<String> {
    let overrides = ConfigOverrides {
        api_url: args.api_url,
        app_id: args.app_id,
        access_token: args.access_token,
    };
    let config_path = args.config_file.as_deref();
    let raw_output = args.raw_output;

    let connect = || -> anyhow::Result<Api> {
        let config = resolve_config(&overrides, config_path)?;
        debug!("Using api {} for application {}", config.base_url, config.app_id);
        Ok(Api::new(&config, raw_output)?)
    };

    match args.command {
        Commands::Server { action } => command_server(&mut connect()?, action).await,
        Commands::Servergroup { action } => command_servergroup(&mut connect()?, action).await,
        Commands::Metric { action } => command_metric(&mut connect()?, action).await,
        Commands::Metricgroup { action } => command_metricgroup(&mut connect()?, action).await,
        Commands::Event { action } => command_event(&mut connect()?, action).await,
        Commands::Alert { action } => command_alert(&mut connect()?, action).await,
        Commands::Data { action } => command_data(&mut connect()?, action).await,
        Commands::Config { action } => command_config(action, &overrides, config_path).await,
    }
}

/// -------------------------------------------------------------------
/// MAIN APPLICATION ENTRY POINT
/// -------------------------------------------------------------------
#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_FLAG_ERROR,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = setup_logging(&args.log_level) {
        eprintln!("{}", error_json(&e.to_string()));
    }

    let code = match run(args).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            let code = exit_code(&e);
            if code == EXIT_AUTHENTICATION_ERROR {
                eprintln!("{}", serde_json::json!({ "msg": "Authentication failed!" }));
            } else {
                eprintln!("{}", error_json(&format!("{e:#}")));
            }
            code
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use coscale_cli::error::DataError;

    #[test]
    fn test_exit_codes() {
        let auth = anyhow::Error::from(ApiError::Authentication("bad token".into()));
        assert_eq!(exit_code(&auth), EXIT_AUTHENTICATION_ERROR);

        let config = anyhow::Error::from(ConfigError::Invalid("app id must not be empty".into()));
        assert_eq!(exit_code(&config), EXIT_FLAG_ERROR);

        let usage = anyhow::Error::from(UsageError("--id or --name".into()));
        assert_eq!(exit_code(&usage), EXIT_FLAG_ERROR);

        let not_found = anyhow::Error::from(ApiError::NotFound("{}".into()));
        assert_eq!(exit_code(&not_found), EXIT_ERROR);

        let data = anyhow::Error::from(DataError::InvalidDimensionSpecs("1-2".into()));
        assert_eq!(exit_code(&data), EXIT_ERROR);
    }
}
