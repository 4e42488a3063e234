//! Parsing, batching and encoding of data points for `data insert`.
//!
//! The pipeline is tokenize -> aggregate -> size probe -> (split) -> encode.
//! Everything here is synchronous and allocates fresh structures per call.

pub mod aggregate;
pub mod batcher;
pub mod dimensions;
pub mod encoder;
pub mod tokenizer;
pub mod wire;

use tracing::{debug, info};

pub use aggregate::{aggregate, point_count, ApiData, Batch, DataPoint, Dimensions};
pub use batcher::{split_batch, BatchSet};
pub use dimensions::parse_dimension_specs;
pub use encoder::{encode_batch, EncodedBatch};
pub use tokenizer::{tokenize, RawPoint};
pub use wire::{parse_wire, serialize_batch};

use crate::error::DataError;

/// Largest payload the data endpoint accepts in one request.
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Parses a data specification and groups it into upload batches.
///
/// Parse errors are returned before anything is batched. When the whole
/// payload is smaller than `ceiling` it is returned as a single batch,
/// otherwise it is split by [`split_batch`].
pub fn parse_and_batch(spec: &str, negate_time: bool, ceiling: usize) -> Result<BatchSet, DataError> {
    let points = tokenize(spec, negate_time)?;
    let batch = aggregate(points);
    debug!(
        "Aggregated {} points into {} subjects",
        point_count(&batch),
        batch.len()
    );

    let probe = encode_batch(&batch)?;
    if probe.uncompressed_len < ceiling {
        return Ok(BatchSet::single(batch));
    }

    info!(
        "Payload of {} bytes exceeds the upload size of {} bytes, splitting",
        probe.uncompressed_len, ceiling
    );
    Ok(split_batch(batch, ceiling))
}
