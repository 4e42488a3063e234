//! `alert` commands with the `alert type` and `alert trigger` subcommands.

use anyhow::Result;

use coscale_cli::api::alert::{parse_handle, AlertFilter, AlertSolution, NewAlertType, NewTrigger};
use coscale_cli::api::objects::{Alert, AlertTrigger, AlertType, Metric, Server, ServerGroup};
use coscale_cli::api::{Api, ApiObject};
use coscale_cli::cli::{AlertAction, AlertFilterArg, AlertTypeAction, TriggerAction, TriggerScope};
use coscale_cli::data::parse_dimension_specs;

use super::{delete_object, get_object, resolve, resolve_id, usage};

fn alert_filter(filter: AlertFilterArg) -> AlertFilter {
    match filter {
        AlertFilterArg::Unresolved => AlertFilter::Unresolved,
        AlertFilterArg::Unacknowledged => AlertFilter::Unacknowledged,
    }
}

pub async fn command_alert(api: &mut Api, action: AlertAction) -> Result<String> {
    match action {
        AlertAction::List { filter: None } => Ok(api.list_objects(Alert::NAME).await?),
        AlertAction::List {
            filter: Some(filter),
        } => Ok(api.get_alerts_by(alert_filter(filter)).await?),
        AlertAction::Acknowledge { id } => solve(api, id, AlertSolution::Acknowledge).await,
        AlertAction::Resolve { id } => solve(api, id, AlertSolution::Resolve).await,
        AlertAction::Type { action } => command_alert_type(api, action).await,
        AlertAction::Trigger { action } => command_trigger(api, action).await,
    }
}

async fn solve(api: &mut Api, id: i64, solution: AlertSolution) -> Result<String> {
    let alert: Alert = api.fetch(id).await?;
    Ok(api.alert_solution(&alert, solution).await?)
}

async fn command_alert_type(api: &mut Api, action: AlertTypeAction) -> Result<String> {
    match action {
        AlertTypeAction::List => Ok(api.list_objects(AlertType::NAME).await?),
        AlertTypeAction::Get(target) => get_object::<AlertType>(api, &target).await,
        AlertTypeAction::Delete(target) => delete_object::<AlertType>(api, &target).await,
        AlertTypeAction::New {
            name,
            handle,
            description,
            backup_handle,
            backup_seconds,
            escalation_handle,
            escalation_seconds,
        } => {
            let alert_type = NewAlertType {
                name,
                description,
                handle: parse_handle(&handle)?,
                backup_handle: backup_handle.as_deref().map(parse_handle).transpose()?,
                backup_seconds,
                escalation_handle: escalation_handle.as_deref().map(parse_handle).transpose()?,
                escalation_seconds,
            };
            Ok(api.create_alert_type(&alert_type).await?)
        }
        AlertTypeAction::Update {
            target,
            handle,
            description,
            backup_handle,
            backup_seconds,
            escalation_handle,
            escalation_seconds,
        } => {
            let mut alert_type: AlertType = resolve(api, target.id, target.name.as_deref()).await?;
            if let Some(name) = target.name {
                alert_type.name = name;
            }
            if let Some(description) = description {
                alert_type.description = description;
            }
            if let Some(handle) = handle {
                alert_type.handle = parse_handle(&handle)?;
            }
            if let Some(handle) = backup_handle {
                alert_type.backup_handle = parse_handle(&handle)?;
            }
            if let Some(seconds) = backup_seconds {
                alert_type.backup_seconds = seconds;
            }
            if let Some(handle) = escalation_handle {
                alert_type.escalation_handle = parse_handle(&handle)?;
            }
            if let Some(seconds) = escalation_seconds {
                alert_type.escalation_seconds = seconds;
            }
            Ok(api.update_alert_type(&alert_type).await?)
        }
    }
}

/// Ids of the objects named by a trigger scope; names are looked up only
/// when no id was given.
struct ResolvedScope {
    metric_id: Option<i64>,
    server_id: Option<i64>,
    group_id: Option<i64>,
}

async fn resolve_scope(api: &mut Api, scope: &TriggerScope) -> Result<ResolvedScope> {
    let metric_id = match (scope.metric_id, scope.metric.as_deref()) {
        (None, None) => None,
        (id, name) => Some(resolve_id::<Metric>(api, id, name).await?),
    };
    let server_id = match (scope.server_id, scope.server.as_deref()) {
        (None, None) => None,
        (id, name) => Some(resolve_id::<Server>(api, id, name).await?),
    };
    let group_id = match (scope.server_group_id, scope.server_group.as_deref()) {
        (None, None) => None,
        (id, name) => Some(resolve_id::<ServerGroup>(api, id, name).await?),
    };
    Ok(ResolvedScope {
        metric_id,
        server_id,
        group_id,
    })
}

async fn alert_type_id(api: &mut Api, id: Option<i64>, name: Option<&str>) -> Result<i64> {
    if id.is_none() && name.is_none() {
        return Err(usage("--typeid or the alert type name is required"));
    }
    resolve_id::<AlertType>(api, id, name).await
}

async fn command_trigger(api: &mut Api, action: TriggerAction) -> Result<String> {
    match action {
        TriggerAction::List(target) => {
            let type_id = resolve_id::<AlertType>(api, target.id, target.name.as_deref()).await?;
            Ok(api.get_triggers(type_id).await?)
        }
        TriggerAction::New {
            name,
            config,
            autoresolve,
            scope,
            type_name,
            type_id,
            description,
            dimension_specs,
        } => {
            if scope.metric_id.is_none() && scope.metric.is_none() {
                return Err(usage("--metric or --metricid is required"));
            }
            let resolved = resolve_scope(api, &scope).await?;
            let type_id = alert_type_id(api, type_id, Some(&type_name)).await?;
            let trigger = NewTrigger {
                name,
                description,
                config,
                dimension_specs,
                metric_id: resolved.metric_id.unwrap_or_default(),
                auto_resolve: autoresolve,
                server_id: resolved.server_id,
                group_id: resolved.group_id,
            };
            Ok(api.create_trigger(type_id, &trigger).await?)
        }
        TriggerAction::Update {
            target,
            type_name,
            type_id,
            config,
            autoresolve,
            scope,
            description,
            dimension_specs,
        } => {
            if target.id.is_none() && target.name.is_none() {
                return Err(usage("--id or --name of the trigger is required"));
            }
            let type_id = alert_type_id(api, type_id, type_name.as_deref()).await?;
            let resolved = resolve_scope(api, &scope).await?;

            let mut trigger = match (target.id, target.name.as_deref()) {
                (Some(id), _) => {
                    api.fetch_from_group::<AlertTrigger>(AlertType::NAME, type_id, id)
                        .await?
                }
                (_, name) => {
                    api.fetch_by_name_from_group::<AlertTrigger>(
                        AlertType::NAME,
                        type_id,
                        name.unwrap_or_default(),
                    )
                    .await?
                }
            };

            if let Some(name) = target.name {
                trigger.name = name;
            }
            if let Some(description) = description {
                trigger.description = description;
            }
            if let Some(seconds) = autoresolve {
                trigger.auto_resolve = seconds;
            }
            if let Some(metric_id) = resolved.metric_id {
                trigger.metric = metric_id;
            }
            if let Some(config) = config {
                trigger.config = config;
            }
            if let Some(specs) = dimension_specs {
                trigger.dimension_specs = parse_dimension_specs(&specs)?;
            }
            if let Some(group_id) = resolved.group_id {
                trigger.group_id = group_id;
            }
            if let Some(server_id) = resolved.server_id {
                trigger.server_id = server_id;
            }
            trigger.on_app = trigger.group_id == 0 && trigger.server_id == 0;

            Ok(api.update_trigger(type_id, &trigger).await?)
        }
        TriggerAction::Delete {
            target,
            type_name,
            type_id,
        } => {
            let type_id = alert_type_id(api, type_id, type_name.as_deref()).await?;
            let trigger_id = match (target.id, target.name.as_deref()) {
                (Some(id), _) => id,
                (None, Some(name)) => {
                    api.fetch_by_name_from_group::<AlertTrigger>(AlertType::NAME, type_id, name)
                        .await?
                        .id()
                }
                (None, None) => return Err(usage("--id or --name of the trigger is required")),
            };
            Ok(api
                .delete_object_from_group_by_id(
                    AlertType::NAME,
                    AlertTrigger::NAME,
                    type_id,
                    trigger_id,
                )
                .await?)
        }
    }
}
