//! Greedy splitting of a batch into upload-sized pieces.

use tracing::{debug, warn};

use super::aggregate::Batch;
use super::wire::wire_len;
use crate::error::{DataError, OversizedEntry};

/// Result of batching: the batches to upload, in order, plus the last
/// series that did not fit the upload budget on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSet {
    pub batches: Vec<Batch>,
    pub oversized: Option<OversizedEntry>,
}

impl BatchSet {
    pub fn single(batch: Batch) -> Self {
        Self {
            batches: vec![batch],
            oversized: None,
        }
    }

    /// The advisory oversized-entry error, if one was recorded.
    pub fn oversized_error(&self) -> Option<DataError> {
        self.oversized.clone().map(DataError::EntryTooLarge)
    }
}

/// Budget actually packed against; the remainder is left for encoding overhead.
pub fn soft_limit(ceiling: usize) -> usize {
    // 80%, rounded down, without overflowing near usize::MAX
    ceiling / 5 * 4 + (ceiling % 5) * 4 / 5
}

/// Splits `batch` so that every resulting batch stays under 80% of `ceiling`.
///
/// Subjects are visited in order and a batch is closed as soon as the next
/// series would push it over the budget. A series that exceeds the budget by
/// itself is placed alone in its own batch and reported through
/// [`BatchSet::oversized`]; only the last such series is kept.
pub fn split_batch(batch: Batch, ceiling: usize) -> BatchSet {
    let limit = soft_limit(ceiling);
    let mut batches = Vec::new();
    let mut current = Batch::new();
    let mut current_size = 0usize;
    let mut oversized = None;

    for (subject, series) in batch {
        for data in series {
            // subject key plus separator
            let size = wire_len(&data) + subject.len() + 1;

            if current_size > 0 && current_size + size > limit {
                batches.push(std::mem::take(&mut current));
                current_size = 0;
            }

            if size > limit {
                warn!(
                    "Series M{}:{} is {} bytes, over the upload budget of {} bytes",
                    data.metric_id, subject, size, limit
                );
                oversized = Some(OversizedEntry {
                    limit,
                    size,
                    subject_id: subject.clone(),
                    metric_id: data.metric_id,
                });
                current.entry(subject.clone()).or_default().push(data);
                batches.push(std::mem::take(&mut current));
                continue;
            }

            current.entry(subject.clone()).or_default().push(data);
            current_size += size;
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    debug!("Split payload into {} batches (budget {} bytes)", batches.len(), limit);
    BatchSet { batches, oversized }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{point_count, ApiData, DataPoint};
    use crate::data::wire::serialize_batch;

    fn series(metric_id: i64, subject: &str, points: usize) -> ApiData {
        let mut data = ApiData::new(metric_id, subject);
        for i in 0..points {
            data.points.push(DataPoint {
                seconds_ago: -(i as i64) * 60,
                value: "1.25".to_string(),
            });
        }
        data
    }

    fn batch_of(entries: Vec<ApiData>) -> Batch {
        let mut batch = Batch::new();
        for data in entries {
            batch.entry(data.subject_id.clone()).or_default().push(data);
        }
        batch
    }

    #[test]
    fn test_soft_limit() {
        assert_eq!(soft_limit(1000), 800);
        assert_eq!(soft_limit(10 * 1024 * 1024), 8_388_608);
        assert_eq!(soft_limit(7), 5);
        assert_eq!(soft_limit(usize::MAX), usize::MAX / 5 * 4);
    }

    #[test]
    fn test_small_batch_stays_whole() {
        let batch = batch_of(vec![series(1, "S1", 2), series(2, "S2", 1)]);
        let set = split_batch(batch.clone(), 1000);
        assert_eq!(set.batches, vec![batch]);
        assert!(set.oversized.is_none());
    }

    #[test]
    fn test_split_respects_budget_and_keeps_order() {
        let entries: Vec<ApiData> = (0..100).map(|m| series(m, "S1", 6)).collect();
        let set = split_batch(batch_of(entries.clone()), 1000);

        assert!(set.batches.len() > 1);
        assert!(set.oversized.is_none());
        for batch in &set.batches {
            assert!(serialize_batch(batch).len() <= 800);
        }

        let flattened: Vec<ApiData> = set
            .batches
            .into_iter()
            .flat_map(|b| b.into_values().flatten())
            .collect();
        assert_eq!(flattened, entries);
    }

    #[test]
    fn test_subjects_share_batches() {
        let batch = batch_of(vec![
            series(1, "S1", 1),
            series(1, "S2", 1),
            series(1, "S3", 1),
        ]);
        let set = split_batch(batch, 1000);
        assert_eq!(set.batches.len(), 1);
        assert_eq!(set.batches[0].len(), 3);
    }

    #[test]
    fn test_oversized_series_is_isolated_and_last_one_reported() {
        let batch = batch_of(vec![
            series(1, "S1", 1),
            series(2, "S1", 200),
            series(3, "S1", 1),
            series(4, "S2", 300),
        ]);
        let total = point_count(&batch);
        let set = split_batch(batch, 1000);

        let oversized = set.oversized.clone().unwrap();
        assert_eq!(oversized.metric_id, 4);
        assert_eq!(oversized.subject_id, "S2");
        assert_eq!(oversized.limit, 800);
        assert!(set.oversized_error().is_some());

        let metrics: Vec<Vec<i64>> = set
            .batches
            .iter()
            .map(|b| b.values().flatten().map(|d| d.metric_id).collect())
            .collect();
        assert_eq!(metrics, vec![vec![1], vec![2], vec![3], vec![4]]);

        let kept: usize = set.batches.iter().map(point_count).sum();
        assert_eq!(kept, total);
    }
}
