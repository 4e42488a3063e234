//! Metrics and metric groups.

use super::objects::{Metric, MetricGroup};
use super::{Api, ApiObject, Form, SOURCE};
use crate::error::ApiError;

/// Fields of a new metric.
#[derive(Debug, Clone, Default)]
pub struct NewMetric<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub data_type: &'a str,
    pub unit: &'a str,
    pub subject: &'a str,
    pub period: i64,
}

impl Api {
    pub async fn create_metric(&mut self, metric: &NewMetric<'_>) -> Result<String, ApiError> {
        let form: Form = vec![
            ("name", metric.name.to_string()),
            ("description", metric.description.to_string()),
            ("dataType", metric.data_type.to_string()),
            ("period", metric.period.to_string()),
            ("unit", metric.unit.to_string()),
            ("subject", metric.subject.to_string()),
            ("source", SOURCE.to_string()),
        ];
        let result = self.post("metrics/", form).await;
        self.created_or_existing(Metric::NAME, result).await
    }

    pub async fn update_metric(&mut self, metric: &Metric) -> Result<String, ApiError> {
        let form: Form = vec![
            ("name", metric.name.clone()),
            ("description", metric.description.clone()),
            ("dataType", metric.data_type.clone()),
            ("period", metric.period.to_string()),
            ("unit", metric.unit.clone()),
            ("subject", metric.subject.clone()),
            ("source", metric.source.clone()),
            ("version", metric.version.to_string()),
        ];
        self.put(&format!("metrics/{}/", metric.id), form).await?;
        self.get_object(Metric::NAME, metric.id).await
    }

    pub async fn create_metric_group(
        &mut self,
        name: &str,
        description: &str,
        group_type: &str,
        state: &str,
        subject: &str,
    ) -> Result<String, ApiError> {
        let form: Form = vec![
            ("name", name.to_string()),
            ("description", description.to_string()),
            ("type", group_type.to_string()),
            ("state", state.to_string()),
            ("subject", subject.to_string()),
            ("source", SOURCE.to_string()),
        ];
        let result = self.post("metricgroups/", form).await;
        self.created_or_existing(MetricGroup::NAME, result).await
    }

    pub async fn update_metric_group(&mut self, group: &MetricGroup) -> Result<String, ApiError> {
        let form: Form = vec![
            ("name", group.name.clone()),
            ("description", group.description.clone()),
            ("type", group.kind.clone()),
            ("state", group.state.clone()),
            ("subject", group.subject.clone()),
            ("source", group.source.clone()),
            ("version", group.version.to_string()),
        ];
        self.put(&format!("metricgroups/{}/", group.id), form).await?;
        self.get_object(MetricGroup::NAME, group.id).await
    }

    pub async fn get_metrics_by_group(&mut self, group_id: i64) -> Result<String, ApiError> {
        self.get(&format!("metricgroups/{group_id}/metrics/")).await
    }
}
