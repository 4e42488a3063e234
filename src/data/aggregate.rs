//! Grouping of tokenized points into per-subject, per-series batch entries.

use indexmap::IndexMap;

use super::tokenizer::RawPoint;

/// Dimension values attached to a series, in the order the user wrote them.
pub type Dimensions = IndexMap<String, String>;

/// A batch maps each subject id to its series, in first-seen order.
pub type Batch = IndexMap<String, Vec<ApiData>>;

/// A single data point of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoint {
    pub seconds_ago: i64,
    /// Scalar or histogram literal, kept exactly as written.
    pub value: String,
}

/// All points for one (subject, metric, dimension set) series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiData {
    pub metric_id: i64,
    pub subject_id: String,
    pub points: Vec<DataPoint>,
    pub dimension_values: Option<Dimensions>,
}

impl ApiData {
    pub fn new(metric_id: i64, subject_id: impl Into<String>) -> Self {
        Self {
            metric_id,
            subject_id: subject_id.into(),
            points: Vec::new(),
            dimension_values: None,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Option<Dimensions>) -> Self {
        self.dimension_values = dimensions.filter(|d| !d.is_empty());
        self
    }

    /// Two dimension sets are equal when they hold the same keys with the
    /// same values; key order does not matter and absence only equals absence.
    pub fn has_dimensions(&self, dimensions: Option<&Dimensions>) -> bool {
        match (self.dimension_values.as_ref(), dimensions) {
            (None, None) => true,
            (Some(own), Some(other)) => own == other,
            _ => false,
        }
    }

    fn is_series_of(&self, point: &RawPoint) -> bool {
        self.metric_id == point.metric_id && self.has_dimensions(point.dimensions.as_ref())
    }
}

/// Folds raw points into a [`Batch`].
///
/// Points for a series that already exists in the subject's list are
/// appended to it, so points written in separate entries end up in one
/// series in arrival order.
pub fn aggregate(points: impl IntoIterator<Item = RawPoint>) -> Batch {
    let mut batch = Batch::new();

    for point in points {
        let series = batch.entry(point.subject_id.clone()).or_default();

        let data_point = DataPoint {
            seconds_ago: point.seconds_ago,
            value: point.value.clone(),
        };

        match series.iter_mut().find(|data| data.is_series_of(&point)) {
            Some(existing) => existing.points.push(data_point),
            None => {
                let mut data = ApiData::new(point.metric_id, point.subject_id)
                    .with_dimensions(point.dimensions);
                data.points.push(data_point);
                series.push(data);
            }
        }
    }

    batch
}

/// Total number of points across all subjects and series.
pub fn point_count(batch: &Batch) -> usize {
    batch
        .values()
        .flat_map(|series| series.iter())
        .map(|data| data.points.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tokenizer::tokenize;

    fn raw(metric_id: i64, subject: &str, t: i64, value: &str, dims: &[(&str, &str)]) -> RawPoint {
        let dimensions = if dims.is_empty() {
            None
        } else {
            Some(
                dims.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        };
        RawPoint {
            metric_id,
            subject_id: subject.to_string(),
            seconds_ago: t,
            value: value.to_string(),
            dimensions,
        }
    }

    #[test]
    fn test_merge_same_series_regardless_of_key_order() {
        let batch = aggregate(vec![
            raw(1, "S1", -60, "1", &[("Queue", "q1"), ("DC", "d1")]),
            raw(1, "S1", -120, "2", &[("DC", "d1"), ("Queue", "q1")]),
        ]);

        assert_eq!(batch.len(), 1);
        let series = &batch["S1"];
        assert_eq!(series.len(), 1);
        let times: Vec<i64> = series[0].points.iter().map(|p| p.seconds_ago).collect();
        assert_eq!(times, vec![-60, -120]);
    }

    #[test]
    fn test_different_dimensions_stay_separate() {
        let batch = aggregate(vec![
            raw(1, "S1", -60, "1", &[("Queue", "q1")]),
            raw(1, "S1", -60, "1", &[("Queue", "q2")]),
            raw(1, "S1", -60, "1", &[]),
            raw(1, "S1", -60, "1", &[("Queue", "q1"), ("DC", "d1")]),
        ]);

        assert_eq!(batch["S1"].len(), 4);
    }

    #[test]
    fn test_subjects_keep_first_seen_order() {
        let batch = aggregate(vec![
            raw(2, "S2", 0, "1", &[]),
            raw(1, "S1", 0, "1", &[]),
            raw(3, "S2", 0, "1", &[]),
        ]);

        let subjects: Vec<&str> = batch.keys().map(String::as_str).collect();
        assert_eq!(subjects, vec!["S2", "S1"]);
        let metrics: Vec<i64> = batch["S2"].iter().map(|d| d.metric_id).collect();
        assert_eq!(metrics, vec![2, 3]);
        assert_eq!(point_count(&batch), 3);
    }

    #[test]
    fn test_empty_dimensions_equal_absent() {
        let data = ApiData::new(1, "S1").with_dimensions(Some(Dimensions::new()));
        assert!(data.has_dimensions(None));
        assert!(data.dimension_values.is_none());
    }

    #[test]
    fn test_reaggregation_keeps_order() {
        let input = concat!(
            r#"M1:S1:[-60:1.5,-120:[10,50,[1,2,3]]]:{"Queue":"q1","DC":"d1"};"#,
            "M2:G3:0:7;",
            r#"M1:S1:-180:2:{"DC":"d1","Queue":"q1"};"#,
            "M3:A:-60:[4,50,[1.5,2.5]];",
            "M2:G3:-60:8;",
            "M4:S1:0:1",
        );
        let first = aggregate(tokenize(input, false).unwrap());
        let second = aggregate(tokenize(input, false).unwrap());

        // IndexMap equality ignores order, so compare the orders explicitly
        assert_eq!(first, second);
        let subjects = |batch: &Batch| batch.keys().cloned().collect::<Vec<_>>();
        assert_eq!(subjects(&first), vec!["S1", "G3", "A"]);
        assert_eq!(subjects(&first), subjects(&second));

        for (subject, series) in &first {
            let other = &second[subject];
            assert_eq!(series.len(), other.len());
            for (a, b) in series.iter().zip(other) {
                assert_eq!(a.metric_id, b.metric_id);
                assert_eq!(a.points, b.points);
                let keys = |data: &ApiData| {
                    data.dimension_values
                        .as_ref()
                        .map(|dims| dims.keys().cloned().collect::<Vec<_>>())
                };
                assert_eq!(keys(a), keys(b));
            }
        }

        let s1 = &first["S1"];
        assert_eq!(s1.iter().map(|d| d.metric_id).collect::<Vec<_>>(), vec![1, 4]);
        let times: Vec<i64> = s1[0].points.iter().map(|p| p.seconds_ago).collect();
        assert_eq!(times, vec![-60, -120, -180]);
        assert_eq!(s1[0].points[1].value, "[10,50,[1,2,3]]");
        let g3: Vec<&str> = first["G3"][0].points.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(g3, vec!["7", "8"]);
    }
}
