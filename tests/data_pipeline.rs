use coscale_cli::data::{
    parse_and_batch, parse_wire, serialize_batch, ApiData, DataPoint, MAX_UPLOAD_SIZE,
};
use coscale_cli::error::DataError;

fn point(seconds_ago: i64, value: &str) -> DataPoint {
    DataPoint {
        seconds_ago,
        value: value.to_string(),
    }
}

#[test]
fn test_points_are_grouped_per_subject_and_series() {
    let spec = concat!(
        "M2:S2:-60:1.1,0:1.2;",
        "M2:S2:[-120:9.1];",
        r#"M1:S1:-60:[100,50,[1,2,3,4,5,6]]:{"Queue":"q1","Data Center":"data center 1"};"#,
        r#"M1:S1:[-120:[100,50,[1,2,3,4,5,7]],-180:[100,50,[1,2,3,4,5,8]]]:{"Queue":"q1","Data Center":"data center 1"}"#,
    );

    let set = parse_and_batch(spec, false, MAX_UPLOAD_SIZE).unwrap();
    assert!(set.oversized.is_none());
    assert_eq!(set.batches.len(), 1);

    let batch = &set.batches[0];
    assert_eq!(batch.len(), 2);

    let s1 = &batch["S1"];
    assert_eq!(s1.len(), 1);
    assert_eq!(s1[0].metric_id, 1);
    let dims = s1[0].dimension_values.as_ref().unwrap();
    assert_eq!(dims["Queue"], "q1");
    assert_eq!(dims["Data Center"], "data center 1");
    assert_eq!(
        s1[0].points,
        vec![
            point(-60, "[100,50,[1,2,3,4,5,6]]"),
            point(-120, "[100,50,[1,2,3,4,5,7]]"),
            point(-180, "[100,50,[1,2,3,4,5,8]]"),
        ]
    );

    let s2 = &batch["S2"];
    assert_eq!(s2.len(), 1);
    assert_eq!(s2[0].metric_id, 2);
    assert!(s2[0].dimension_values.is_none());
    assert_eq!(
        s2[0].points,
        vec![point(-60, "1.1"), point(0, "1.2"), point(-120, "9.1")]
    );
}

#[test]
fn test_malformed_values_fail_before_batching() {
    for spec in [r#"M2:S2::{"Queue":"q1"}"#, r#"M2:S2:32:{"Queue":"q1"}"#] {
        match parse_and_batch(spec, false, MAX_UPLOAD_SIZE) {
            Err(DataError::MalformedInput { .. }) => {}
            other => panic!("{spec}: unexpected {other:?}"),
        }
    }
}

#[test]
fn test_small_payload_is_one_batch() {
    let spec = "M1:S1:0:1.5";
    let set = parse_and_batch(spec, false, 1000).unwrap();
    assert_eq!(set.batches.len(), 1);
    assert!(serialize_batch(&set.batches[0]).len() < 100);
    assert_eq!(set.batches[0]["S1"][0].points, vec![point(0, "1.5")]);
}

#[test]
fn test_large_payload_is_split_without_losing_series() {
    // 100 distinct series for one subject, roughly 100 bytes each on the wire
    let spec: Vec<String> = (1..=100)
        .map(|metric| {
            format!(r#"M{metric}:S1:-60:{metric}.5:{{"host":"host-number-{metric:04}-of-the-cluster"}}"#)
        })
        .collect();
    let spec = spec.join(";");

    let set = parse_and_batch(&spec, false, 1000).unwrap();
    assert!(set.oversized.is_none());
    assert!(set.batches.len() > 1);

    let mut restored: Vec<ApiData> = Vec::new();
    for batch in &set.batches {
        let wire = serialize_batch(batch);
        assert!(wire.len() <= 800, "batch of {} bytes", wire.len());
        restored.extend(parse_wire(&wire).unwrap());
    }

    let metrics: Vec<i64> = restored.iter().map(|data| data.metric_id).collect();
    assert_eq!(metrics, (1..=100).collect::<Vec<i64>>());
    assert!(restored.iter().all(|data| data.subject_id == "S1"));
    assert!(restored.iter().all(|data| data.points.len() == 1));
}

#[test]
fn test_deprecated_positive_seconds_ago() {
    let set = parse_and_batch("M3:A:120:7", true, MAX_UPLOAD_SIZE).unwrap();
    assert_eq!(set.batches[0]["A"][0].points, vec![point(-120, "7")]);
}
