//! Compact JSON wire format accepted by the data endpoint.
//!
//! One series renders as `{"m":1,"s":"S1","d":[[-60,1.2]],"dv":{"Queue":"q1"}}`;
//! values are inserted verbatim, so scalars and histograms both stay exactly
//! as the user typed them.

use std::fmt;

use serde::Deserialize;
use serde_json::value::RawValue;

use super::aggregate::{ApiData, Batch, DataPoint, Dimensions};
use crate::error::DataError;

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.seconds_ago, self.value)
    }
}

impl fmt::Display for ApiData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"m\":{},\"s\":", self.metric_id)?;
        write_json_string(f, &self.subject_id)?;
        f.write_str(",\"d\":[")?;
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{point}")?;
        }
        f.write_str("]")?;

        if let Some(dimensions) = &self.dimension_values {
            f.write_str(",\"dv\":{")?;
            for (i, (key, value)) in dimensions.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write_json_string(f, key)?;
                f.write_str(":")?;
                write_json_string(f, value)?;
            }
            f.write_str("}")?;
        }
        f.write_str("}")
    }
}

fn write_json_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let quoted = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

/// Serialized length of a single series in bytes.
pub fn wire_len(data: &ApiData) -> usize {
    data.to_string().len()
}

/// Renders every series of the batch as one JSON array, subjects in batch order.
pub fn serialize_batch(batch: &Batch) -> String {
    let mut out = String::from("[");
    for (i, data) in batch.values().flatten().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&data.to_string());
    }
    out.push(']');
    out
}

#[derive(Deserialize)]
struct WireEntry {
    m: i64,
    s: String,
    d: Vec<(i64, Box<RawValue>)>,
    #[serde(default)]
    dv: Option<Dimensions>,
}

/// Decodes a wire JSON array back into series, in array order.
pub fn parse_wire(text: &str) -> Result<Vec<ApiData>, DataError> {
    let entries: Vec<WireEntry> = serde_json::from_str(text)
        .map_err(|e| DataError::malformed(e.column().saturating_sub(1), e.to_string()))?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let mut data = ApiData::new(entry.m, entry.s).with_dimensions(entry.dv);
            data.points = entry
                .d
                .into_iter()
                .map(|(seconds_ago, value)| DataPoint {
                    seconds_ago,
                    value: value.get().to_string(),
                })
                .collect();
            data
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::aggregate;
    use crate::data::tokenizer::tokenize;

    #[test]
    fn test_series_rendering() {
        let batch = aggregate(
            tokenize(
                r#"M1:S1:-60:[100,50,[1,2,3,4,5,6]]:{"Queue":"q1"};M2:S1:0:1.2"#,
                false,
            )
            .unwrap(),
        );
        assert_eq!(
            serialize_batch(&batch),
            r#"[{"m":1,"s":"S1","d":[[-60,[100,50,[1,2,3,4,5,6]]]],"dv":{"Queue":"q1"}},{"m":2,"s":"S1","d":[[0,1.2]]}]"#
        );
    }

    #[test]
    fn test_empty_batch_is_empty_array() {
        assert_eq!(serialize_batch(&Batch::new()), "[]");
    }

    #[test]
    fn test_dimension_strings_are_escaped() {
        let mut dims = Dimensions::new();
        dims.insert("path".to_string(), "C:\\tmp \"x\"".to_string());
        let mut data = ApiData::new(5, "A").with_dimensions(Some(dims));
        data.points.push(DataPoint {
            seconds_ago: 0,
            value: "1".to_string(),
        });
        assert_eq!(
            data.to_string(),
            r#"{"m":5,"s":"A","d":[[0,1]],"dv":{"path":"C:\\tmp \"x\""}}"#
        );
        assert_eq!(wire_len(&data), data.to_string().len());
    }

    #[test]
    fn test_wire_decoding_restores_series() {
        let batch = aggregate(
            tokenize(
                r#"M1:S1:[-60:1.5,-120:[10,50,[1,2]]]:{"b":"2","a":"1"};M3:G4:0:-7"#,
                false,
            )
            .unwrap(),
        );
        let decoded = parse_wire(&serialize_batch(&batch)).unwrap();
        let original: Vec<ApiData> = batch.into_values().flatten().collect();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_wire_decoding_rejects_garbage() {
        assert!(parse_wire("[{\"m\":1}]").is_err());
        assert!(parse_wire("not json").is_err());
    }
}
