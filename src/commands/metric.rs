//! `metric` (with `metric dimension`) and `metricgroup` commands.

use anyhow::Result;
use tracing::debug;

use coscale_cli::api::metric::NewMetric;
use coscale_cli::api::objects::{Metric, MetricGroup};
use coscale_cli::api::{Api, ApiObject};
use coscale_cli::cli::{DimensionAction, MetricAction, MetricGroupAction};

use super::{change_membership, delete_object, get_object, resolve, resolve_id, usage};

pub async fn command_metric(api: &mut Api, action: MetricAction) -> Result<String> {
    match action {
        MetricAction::List => Ok(api.list_objects(Metric::NAME).await?),
        MetricAction::Get(target) => get_object::<Metric>(api, &target).await,
        MetricAction::Delete(target) => delete_object::<Metric>(api, &target).await,
        MetricAction::ListByGroup(target) => {
            let group_id =
                resolve_id::<MetricGroup>(api, target.id, target.name.as_deref()).await?;
            Ok(api.get_metrics_by_group(group_id).await?)
        }
        MetricAction::New {
            name,
            data_type,
            subject,
            unit,
            period,
            description,
        } => {
            let metric = NewMetric {
                name: &name,
                description: &description,
                data_type: &data_type,
                unit: &unit,
                subject: &subject,
                period,
            };
            Ok(api.create_metric(&metric).await?)
        }
        MetricAction::Update {
            target,
            description,
            data_type,
            subject,
            unit,
            period,
        } => {
            let mut metric: Metric = resolve(api, target.id, target.name.as_deref()).await?;
            if let Some(name) = target.name {
                metric.name = name;
            }
            if let Some(description) = description {
                metric.description = description;
            }
            if let Some(data_type) = data_type {
                metric.data_type = data_type;
            }
            if let Some(subject) = subject {
                metric.subject = subject;
            }
            if let Some(unit) = unit {
                metric.unit = unit;
            }
            if let Some(period) = period {
                metric.period = period;
            }
            Ok(api.update_metric(&metric).await?)
        }
        MetricAction::Dimension { action } => command_dimension(api, action).await,
    }
}

async fn command_dimension(api: &mut Api, action: DimensionAction) -> Result<String> {
    match action {
        DimensionAction::New { name, id, metric } => {
            let dimension = api.create_dimension(&name).await?;
            let metric_id = match (id, metric) {
                (Some(id), _) => id,
                (None, Some(metric)) => resolve::<Metric>(api, None, Some(&metric)).await?.id(),
                (None, None) => {
                    debug!("No metric given, dimension {} is not attached", dimension.id);
                    let created = serde_json::to_string(&dimension)?;
                    return Ok(api.format_output(&created));
                }
            };
            Ok(api.add_metric_dimension(metric_id, dimension.id).await?)
        }
        DimensionAction::List { metric_id, metric } => {
            if metric_id.is_none() && metric.is_none() {
                return Err(usage("--metricId or --metric is required"));
            }
            let metric_id = resolve_id::<Metric>(api, metric_id, metric.as_deref()).await?;
            Ok(api.get_dimensions(metric_id).await?)
        }
    }
}

pub async fn command_metricgroup(api: &mut Api, action: MetricGroupAction) -> Result<String> {
    match action {
        MetricGroupAction::List => Ok(api.list_objects(MetricGroup::NAME).await?),
        MetricGroupAction::Get(target) => get_object::<MetricGroup>(api, &target).await,
        MetricGroupAction::Delete(target) => delete_object::<MetricGroup>(api, &target).await,
        MetricGroupAction::New {
            name,
            subject,
            state,
            kind,
            description,
        } => Ok(api
            .create_metric_group(&name, &description, &kind, &state, &subject)
            .await?),
        MetricGroupAction::Update {
            target,
            description,
            kind,
            state,
        } => {
            let mut group: MetricGroup = resolve(api, target.id, target.name.as_deref()).await?;
            if let Some(name) = target.name {
                group.name = name;
            }
            if let Some(description) = description {
                group.description = description;
            }
            if let Some(kind) = kind {
                group.kind = kind;
            }
            if let Some(state) = state {
                group.state = state;
            }
            Ok(api.update_metric_group(&group).await?)
        }
        MetricGroupAction::AddMetric(membership) => {
            change_membership::<Metric, MetricGroup>(api, &membership, true).await
        }
        MetricGroupAction::DeleteMetric(membership) => {
            change_membership::<Metric, MetricGroup>(api, &membership, false).await
        }
    }
}
