//! Scanner for the data point mini-language used by `data insert`.
//!
//! ```text
//! spec      := entry (";" entry)* [";"]
//! entry     := "M" digits ":" subject ":" values [":" dimensions]
//! subject   := ("A" | "S" | "G") digits*
//! values    := "[" point ("," point)* "]" | point ("," point)*
//! point     := ["-"] digits ":" value
//! value     := decimal | "[" digits "," digits "," "[" decimal ("," decimal)* "]" "]"
//! ```
//!
//! Values are validated for shape only and kept as the literal text.

use tracing::debug;

use super::aggregate::Dimensions;
use crate::error::DataError;

/// One point as written by the user, before grouping into series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPoint {
    pub metric_id: i64,
    pub subject_id: String,
    pub seconds_ago: i64,
    pub value: String,
    pub dimensions: Option<Dimensions>,
}

const ENTRY_SEPARATOR: u8 = b';';
const SUBJECT_TYPES: &[u8] = b"ASG";

/// Splits a data specification into raw points, in input order.
///
/// With `negate_time` set every timestamp changes sign; this is how the
/// deprecated "seconds ago" dialect (`--datapoint`) is mapped onto the
/// API's time convention.
pub fn tokenize(input: &str, negate_time: bool) -> Result<Vec<RawPoint>, DataError> {
    if input.is_empty() {
        return Err(DataError::malformed(0, "datapoint specification is empty"));
    }

    let mut scanner = Scanner::new(input);
    let mut points = Vec::new();

    loop {
        scanner.entry(negate_time, &mut points)?;
        if scanner.at_end() {
            break;
        }
        scanner.expect(ENTRY_SEPARATOR, "between entries")?;
        if scanner.at_end() {
            break;
        }
    }

    debug!("Tokenized {} data points", points.len());
    Ok(points)
}

struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn found(&self) -> String {
        match self.input[self.pos..].chars().next() {
            Some(c) => format!("'{c}'"),
            None => "end of input".to_string(),
        }
    }

    fn expect(&mut self, byte: u8, context: &str) -> Result<(), DataError> {
        if self.eat(byte) {
            return Ok(());
        }
        Err(DataError::malformed(
            self.pos,
            format!("expected '{}' {}, found {}", byte as char, context, self.found()),
        ))
    }

    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn integer(&mut self, what: &str) -> Result<i64, DataError> {
        let start = self.pos;
        self.eat(b'-');
        if self.digits().is_empty() {
            return Err(DataError::malformed(
                self.pos,
                format!("expected {what}, found {}", self.found()),
            ));
        }
        let text = &self.input[start..self.pos];
        text.parse::<i64>()
            .map_err(|e| DataError::malformed(start, format!("invalid {what} '{text}': {e}")))
    }

    fn unsigned(&mut self, what: &str) -> Result<(), DataError> {
        if self.digits().is_empty() {
            return Err(DataError::malformed(
                self.pos,
                format!("expected {what}, found {}", self.found()),
            ));
        }
        Ok(())
    }

    fn entry(&mut self, negate_time: bool, out: &mut Vec<RawPoint>) -> Result<(), DataError> {
        self.expect(b'M', "at the start of an entry")?;
        let id_start = self.pos;
        let digits = self.digits();
        if digits.is_empty() {
            return Err(DataError::malformed(id_start, "missing metric id"));
        }
        let metric_id = digits.parse::<i64>().map_err(|e| {
            DataError::malformed(id_start, format!("invalid metric id '{digits}': {e}"))
        })?;
        self.expect(b':', "after the metric id")?;

        let subject_id = self.subject()?;
        self.expect(b':', "after the subject id")?;

        let points = self.values()?;
        let dimensions = if self.eat(b':') {
            self.dimensions()?
        } else {
            None
        };

        if !(self.at_end() || self.peek() == Some(ENTRY_SEPARATOR)) {
            return Err(DataError::malformed(
                self.pos,
                format!("unexpected {} after the values of M{metric_id}:{subject_id}", self.found()),
            ));
        }

        for (offset, time, value) in points {
            let seconds_ago = if negate_time {
                time.checked_neg()
                    .ok_or_else(|| DataError::malformed(offset, "timestamp out of range"))?
            } else {
                time
            };
            out.push(RawPoint {
                metric_id,
                subject_id: subject_id.to_string(),
                seconds_ago,
                value: value.to_string(),
                dimensions: dimensions.clone(),
            });
        }
        Ok(())
    }

    fn subject(&mut self) -> Result<&'a str, DataError> {
        let start = self.pos;
        match self.peek() {
            Some(b) if SUBJECT_TYPES.contains(&b) => self.pos += 1,
            _ => {
                return Err(DataError::malformed(
                    start,
                    format!("expected subject type A, S or G, found {}", self.found()),
                ))
            }
        }
        self.digits();
        Ok(&self.input[start..self.pos])
    }

    fn values(&mut self) -> Result<Vec<(usize, i64, &'a str)>, DataError> {
        if matches!(self.peek(), None | Some(b':') | Some(ENTRY_SEPARATOR)) {
            return Err(DataError::malformed(self.pos, "datapoint value is empty"));
        }

        let bracketed = self.eat(b'[');
        let mut points = vec![self.point()?];
        while self.eat(b',') {
            points.push(self.point()?);
        }
        if bracketed {
            self.expect(b']', "to close the list of points")?;
        }
        Ok(points)
    }

    fn point(&mut self) -> Result<(usize, i64, &'a str), DataError> {
        let start = self.pos;
        let time = self.integer("a timestamp")?;
        self.expect(b':', "between timestamp and value")?;
        let value = self.value()?;
        Ok((start, time, value))
    }

    /// Scalar shape is tried first, the histogram shape is the fallback.
    fn value(&mut self) -> Result<&'a str, DataError> {
        if let Some(scalar) = self.scalar() {
            return Ok(scalar);
        }
        if self.peek() == Some(b'[') {
            return self.histogram();
        }
        Err(DataError::malformed(
            self.pos,
            format!("expected a number or histogram value, found {}", self.found()),
        ))
    }

    /// Consumes a decimal literal, or nothing if the input does not start with one.
    fn scalar(&mut self) -> Option<&'a str> {
        let start = self.pos;
        self.eat(b'-');
        let mut digits = 0;
        let mut dots = 0;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => digits += 1,
                b'.' => dots += 1,
                _ => break,
            }
            self.pos += 1;
        }
        if digits == 0 || dots > 1 {
            self.pos = start;
            return None;
        }
        Some(&self.input[start..self.pos])
    }

    fn decimal(&mut self) -> Result<(), DataError> {
        match self.scalar() {
            Some(_) => Ok(()),
            None => Err(DataError::malformed(
                self.pos,
                format!("expected a percentile value, found {}", self.found()),
            )),
        }
    }

    fn histogram(&mut self) -> Result<&'a str, DataError> {
        let start = self.pos;
        self.expect(b'[', "to open a histogram")?;
        self.unsigned("the histogram sample count")?;
        self.expect(b',', "after the sample count")?;
        self.unsigned("the histogram percentile width")?;
        self.expect(b',', "after the percentile width")?;
        self.expect(b'[', "to open the percentile values")?;
        self.decimal()?;
        while self.eat(b',') {
            self.decimal()?;
        }
        self.expect(b']', "to close the percentile values")?;
        self.expect(b']', "to close the histogram")?;
        Ok(&self.input[start..self.pos])
    }

    fn dimensions(&mut self) -> Result<Option<Dimensions>, DataError> {
        let start = self.pos;
        if self.peek() != Some(b'{') {
            return Err(DataError::malformed(
                start,
                format!("expected a dimensions object, found {}", self.found()),
            ));
        }

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        if depth != 0 || in_string {
            return Err(DataError::malformed(start, "unterminated dimensions object"));
        }

        let text = &self.input[start..self.pos];
        let dimensions: Dimensions = serde_json::from_str(text).map_err(|e| {
            DataError::malformed(start, format!("invalid dimensions {text}: {e}"))
        })?;
        Ok(Some(dimensions).filter(|d| !d.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(points: &[RawPoint]) -> Vec<i64> {
        points.iter().map(|p| p.seconds_ago).collect()
    }

    fn offset_of(err: DataError) -> usize {
        match err {
            DataError::MalformedInput { offset, .. } => offset,
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn test_single_scalar_point() {
        let points = tokenize("M1:S100:1454580954:1.2", false).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].metric_id, 1);
        assert_eq!(points[0].subject_id, "S100");
        assert_eq!(points[0].seconds_ago, 1454580954);
        assert_eq!(points[0].value, "1.2");
        assert!(points[0].dimensions.is_none());
    }

    #[test]
    fn test_bracketed_and_bare_point_lists() {
        let points = tokenize("M1:S100:[-60:1.2,0:1.1];M2:S1:-60:1.1,0:1.2;", false).unwrap();
        assert_eq!(times(&points), vec![-60, 0, -60, 0]);
        assert_eq!(points[2].metric_id, 2);
    }

    #[test]
    fn test_histogram_value_kept_verbatim() {
        let points = tokenize("M1:S1:-60:[100,50,[1,2,3,4,5,6]]", false).unwrap();
        assert_eq!(points[0].value, "[100,50,[1,2,3,4,5,6]]");
    }

    #[test]
    fn test_mixed_scalar_and_histogram_in_one_list() {
        let points = tokenize("M1:S1:[-60:1.5,-120:[10,50,[1.5,2]]]", false).unwrap();
        assert_eq!(points[0].value, "1.5");
        assert_eq!(points[1].value, "[10,50,[1.5,2]]");
    }

    #[test]
    fn test_dimensions_attach_to_every_point_of_the_entry() {
        let points =
            tokenize(r#"M1:S1:[-60:1,-120:2]:{"Queue":"q1","Data Center":"dc 1"}"#, false).unwrap();
        assert_eq!(points.len(), 2);
        for point in &points {
            let dims = point.dimensions.as_ref().unwrap();
            assert_eq!(dims["Queue"], "q1");
            assert_eq!(dims["Data Center"], "dc 1");
        }
    }

    #[test]
    fn test_dimension_values_may_contain_separators() {
        let points = tokenize(r#"M1:S1:0:1:{"k":"a;b}:c"};M2:A:0:2"#, false).unwrap();
        assert_eq!(points[0].dimensions.as_ref().unwrap()["k"], "a;b}:c");
        assert_eq!(points[1].subject_id, "A");
    }

    #[test]
    fn test_negate_time() {
        let points = tokenize("M1:S1:120:1.2;M1:S1:[60:1,0:2]", true).unwrap();
        assert_eq!(times(&points), vec![-120, -60, 0]);
    }

    #[test]
    fn test_group_subject() {
        let points = tokenize("M3:G12:0:4", false).unwrap();
        assert_eq!(points[0].subject_id, "G12");
    }

    #[test]
    fn test_empty_value_is_rejected() {
        let err = tokenize(r#"M2:S2::{"Queue":"q1"}"#, false).unwrap_err();
        assert_eq!(offset_of(err), 6);
    }

    #[test]
    fn test_dimension_block_in_value_position_is_rejected() {
        let err = tokenize(r#"M2:S2:32:{"Queue":"q1"}"#, false).unwrap_err();
        assert_eq!(offset_of(err), 9);
    }

    #[test]
    fn test_malformed_inputs() {
        let cases = [
            "",
            "1:S1:0:1",
            "M:S1:0:1",
            "Mx:S1:0:1",
            "M1:X1:0:1",
            "M1:S1:0:",
            "M1:S1:0:1.2.3",
            "M1:S1:[0:1",
            "M1:S1:0:[1,2,[]]",
            "M1:S1:0:[1,2,[3]",
            "M1:S1:0:1:{\"a\":1}",
            "M1:S1:0:1:{\"a\":\"b\"",
            "M1:S1:0:1:nope",
            "M1:S1: 0:1",
            "M1:S1:0:1;;M2:S1:0:1",
            "M99999999999999999999:S1:0:1",
        ];
        for case in cases {
            assert!(tokenize(case, false).is_err(), "expected error for {case:?}");
        }
    }

    #[test]
    fn test_empty_dimension_object_is_absent() {
        let points = tokenize("M1:S1:0:1:{}", false).unwrap();
        assert!(points[0].dimensions.is_none());
    }
}
