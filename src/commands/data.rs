//! `data get` and `data insert`.

use anyhow::Result;
use tracing::{info, warn};

use coscale_cli::api::data::DataQuery;
use coscale_cli::api::Api;
use coscale_cli::cli::DataAction;
use coscale_cli::data::{parse_and_batch, MAX_UPLOAD_SIZE};

use super::usage;

pub async fn command_data(api: &mut Api, action: DataAction) -> Result<String> {
    match action {
        DataAction::Get {
            id,
            subject_ids,
            start,
            stop,
            aggregator,
            view_type,
            dimensions_specs,
            aggregate_subjects,
        } => {
            let query = DataQuery {
                start,
                stop,
                metric_id: id,
                subject_ids,
                aggregator,
                view_type,
                dimension_specs: dimensions_specs,
                aggregate_subjects,
            };
            Ok(api.get_data(&query).await?)
        }
        DataAction::Insert { data, datapoint } => {
            // --datapoint takes positive seconds ago
            let (spec, negate_time) = match (data, datapoint) {
                (Some(data), _) => (data, false),
                (None, Some(datapoint)) => (datapoint, true),
                (None, None) => return Err(usage("--data is required")),
            };

            let batches = parse_and_batch(&spec, negate_time, MAX_UPLOAD_SIZE)?;
            if let Some(entry) = &batches.oversized {
                warn!("{entry}; uploading it anyway");
            }
            info!("Inserting data in {} batch(es)", batches.batches.len());
            Ok(api.insert_batches(&batches).await?)
        }
    }
}
