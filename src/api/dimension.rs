//! Metric dimensions.

use super::objects::Dimension;
use super::{Api, ApiObject, Form};
use crate::error::ApiError;

impl Api {
    pub async fn get_dimension(&mut self, id: i64) -> Result<String, ApiError> {
        self.get_object(Dimension::NAME, id).await
    }

    /// Dimensions attached to a metric.
    pub async fn get_dimensions(&mut self, metric_id: i64) -> Result<String, ApiError> {
        self.get(&format!("metrics/{metric_id}/dimensions/")).await
    }

    /// Creates a dimension, or returns the existing one with that name.
    pub async fn create_dimension(&mut self, name: &str) -> Result<Dimension, ApiError> {
        let form: Form = vec![("name", name.to_string())];
        match self.post("dimensions/", form).await {
            Ok(created) => Ok(serde_json::from_str(&created)?),
            Err(ApiError::Duplicate(id)) => self.fetch::<Dimension>(id).await,
            Err(e) => Err(e),
        }
    }

    pub async fn add_metric_dimension(
        &mut self,
        metric_id: i64,
        dimension_id: i64,
    ) -> Result<String, ApiError> {
        self.post(
            &format!("metrics/{metric_id}/dimensions/{dimension_id}/"),
            Form::new(),
        )
        .await
    }
}
