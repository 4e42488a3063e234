//! Metric data upload and retrieval.

use serde::Serialize;
use serde_json::value::RawValue;
use tracing::{debug, info};

use super::{Api, Form};
use crate::data::{encode_batch, parse_dimension_specs, point_count, Batch, BatchSet};
use crate::error::ApiError;

/// Parameters of a `data get` request.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuery {
    /// Unix timestamp, or seconds relative to now when zero or negative.
    pub start: i64,
    pub stop: i64,
    pub metric_id: i64,
    /// Comma separated subjects, e.g. `s1,g2,a`.
    pub subject_ids: String,
    pub aggregator: String,
    pub view_type: String,
    pub dimension_specs: String,
    pub aggregate_subjects: bool,
}

impl Default for DataQuery {
    fn default() -> Self {
        Self {
            start: 0,
            stop: 0,
            metric_id: 0,
            subject_ids: String::new(),
            aggregator: "AVG".to_string(),
            view_type: "DEFAULT".to_string(),
            dimension_specs: "[]".to_string(),
            aggregate_subjects: false,
        }
    }
}

#[derive(Serialize)]
struct QueryBody<'a> {
    start: i64,
    stop: i64,
    ids: [QueryIds<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryIds<'a> {
    metric_id: i64,
    subjects: &'a str,
    aggregator: &'a str,
    #[serde(rename = "viewtype")]
    view_type: &'a str,
    dimensions_specs: Box<RawValue>,
    aggregate_subjects: bool,
}

fn absolute(timestamp: i64, now: i64) -> i64 {
    if timestamp <= 0 {
        now + timestamp
    } else {
        timestamp
    }
}

impl DataQuery {
    /// Renders the JSON body of the request, resolving relative times against `now`.
    pub fn build(&self, now: i64) -> Result<String, ApiError> {
        let specs = parse_dimension_specs(&self.dimension_specs)?;
        let body = QueryBody {
            start: absolute(self.start, now),
            stop: absolute(self.stop, now),
            ids: [QueryIds {
                metric_id: self.metric_id,
                subjects: &self.subject_ids,
                aggregator: &self.aggregator,
                view_type: &self.view_type,
                dimensions_specs: RawValue::from_string(specs)?,
                aggregate_subjects: self.aggregate_subjects,
            }],
        };
        Ok(serde_json::to_string(&body)?)
    }
}

impl Api {
    /// Uploads one batch of data points.
    pub async fn insert_data(&mut self, batch: &Batch) -> Result<String, ApiError> {
        let encoded = encode_batch(batch)?;
        debug!(
            "Uploading {} points, {} bytes uncompressed, {} bytes encoded",
            point_count(batch),
            encoded.uncompressed_len,
            encoded.payload.len()
        );
        let form: Form = vec![("cdata", encoded.payload)];
        self.post("data/", form).await
    }

    /// Uploads every batch in order and stops at the first failure.
    /// Returns the answer to the last upload.
    pub async fn insert_batches(&mut self, batches: &BatchSet) -> Result<String, ApiError> {
        let mut result = String::new();
        for (index, batch) in batches.batches.iter().enumerate() {
            result = self.insert_data(batch).await?;
            info!("Uploaded batch {} of {}", index + 1, batches.batches.len());
        }
        Ok(result)
    }

    pub async fn get_data(&mut self, query: &DataQuery) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let form: Form = vec![("data", query.build(now)?)];
        self.post("data/dimension/getCalculated/", form).await
    }
}
