//! CLI command implementations for coscale-cli.
//!
//! One module per object family. Every command returns the text to print
//! on stdout; errors bubble up to `main`, which maps them to exit codes.

pub mod alert;
pub mod config;
pub mod data;
pub mod event;
pub mod metric;
pub mod server;

pub use alert::command_alert;
pub use config::command_config;
pub use data::command_data;
pub use event::command_event;
pub use metric::{command_metric, command_metricgroup};
pub use server::{command_server, command_servergroup};

use anyhow::Result;
use thiserror::Error;

use coscale_cli::api::{Api, ApiObject};
use coscale_cli::cli::{Membership, Target};

/// Flags that parse but do not describe a complete request.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

pub(crate) fn usage(message: impl Into<String>) -> anyhow::Error {
    UsageError(message.into()).into()
}

/// Fetches an object by id, or by name when no id was given.
pub(crate) async fn resolve<T: ApiObject>(
    api: &mut Api,
    id: Option<i64>,
    name: Option<&str>,
) -> Result<T> {
    match (id, name) {
        (Some(id), _) => Ok(api.fetch::<T>(id).await?),
        (None, Some(name)) => Ok(api.fetch_by_name::<T>(name).await?),
        (None, None) => Err(usage(format!("--id or --name of the {} is required", T::NAME))),
    }
}

/// Like [`resolve`] but only needs the id, so a given id is used as is.
pub(crate) async fn resolve_id<T: ApiObject>(
    api: &mut Api,
    id: Option<i64>,
    name: Option<&str>,
) -> Result<i64> {
    match id {
        Some(id) => Ok(id),
        None => Ok(resolve::<T>(api, None, name).await?.id()),
    }
}

pub(crate) async fn get_object<T: ApiObject>(api: &mut Api, target: &Target) -> Result<String> {
    match (target.id, target.name.as_deref()) {
        (Some(id), _) => Ok(api.get_object(T::NAME, id).await?),
        (None, Some(name)) => Ok(api.get_object_by_name(T::NAME, name).await?),
        (None, None) => Err(usage(format!("--id or --name of the {} is required", T::NAME))),
    }
}

/// Deletes an object after checking that it exists.
pub(crate) async fn delete_object<T: ApiObject>(api: &mut Api, target: &Target) -> Result<String> {
    let object: T = resolve(api, target.id, target.name.as_deref()).await?;
    Ok(api.delete_object(T::NAME, object.id()).await?)
}

/// Adds `T` to, or removes it from, a group of type `G`.
pub(crate) async fn change_membership<T: ApiObject, G: ApiObject>(
    api: &mut Api,
    membership: &Membership,
    add: bool,
) -> Result<String> {
    let member: T = resolve(api, membership.id, membership.name.as_deref()).await?;
    let group: G = resolve(api, membership.id_group, membership.name_group.as_deref()).await?;

    let result = if add {
        api.add_object_to_group(T::NAME, member.id(), group.id()).await?
    } else {
        api.delete_object_from_group(T::NAME, member.id(), group.id())
            .await?
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_downcasts() {
        let err = usage("--id or --name of the server is required");
        assert!(err.downcast_ref::<UsageError>().is_some());
        assert_eq!(err.to_string(), "--id or --name of the server is required");
    }
}
