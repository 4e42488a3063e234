//! Streaming gzip + base64 encoding of a batch, as sent in the `cdata` form field.

use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::aggregate::Batch;
use crate::error::DataError;

/// Encoded payload together with the number of JSON bytes fed to the compressor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    pub payload: String,
    pub uncompressed_len: usize,
}

/// Counts bytes on their way into the wrapped writer.
struct CountingWriter<W> {
    inner: W,
    total: usize,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, total: 0 }
    }

    fn into_parts(self) -> (W, usize) {
        (self.inner, self.total)
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.total += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Writes the batch as a JSON array through gzip and then base64.
///
/// Output is byte-for-byte the same as compressing
/// [`serialize_batch`](super::wire::serialize_batch), without building the
/// whole JSON string first.
pub fn encode_batch(batch: &Batch) -> Result<EncodedBatch, DataError> {
    let base64 = EncoderWriter::new(Vec::new(), &STANDARD);
    let gzip = GzEncoder::new(base64, Compression::default());
    let mut writer = CountingWriter::new(gzip);

    writer.write_all(b"[")?;
    for (i, data) in batch.values().flatten().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        write!(writer, "{data}")?;
    }
    writer.write_all(b"]")?;

    let (gzip, uncompressed_len) = writer.into_parts();
    let mut base64 = gzip.finish()?;
    let bytes = base64.finish()?;
    let payload =
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(EncodedBatch {
        payload,
        uncompressed_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::aggregate;
    use crate::data::tokenizer::tokenize;
    use crate::data::wire::serialize_batch;
    use base64::Engine;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn decode(payload: &str) -> String {
        let compressed = STANDARD.decode(payload).unwrap();
        let mut json = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut json)
            .unwrap();
        json
    }

    #[test]
    fn test_payload_decodes_to_wire_json() {
        let batch = aggregate(
            tokenize(r#"M1:S1:[-60:1,0:2]:{"Queue":"q1"};M2:S2:-60:[1,50,[3]]"#, false).unwrap(),
        );
        let encoded = encode_batch(&batch).unwrap();
        let json = serialize_batch(&batch);

        assert_eq!(decode(&encoded.payload), json);
        assert_eq!(encoded.uncompressed_len, json.len());
    }

    #[test]
    fn test_empty_batch() {
        let encoded = encode_batch(&Batch::new()).unwrap();
        assert_eq!(decode(&encoded.payload), "[]");
        assert_eq!(encoded.uncompressed_len, 2);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let batch = aggregate(tokenize("M1:S1:0:1;M1:S2:0:2", false).unwrap());
        assert_eq!(encode_batch(&batch).unwrap(), encode_batch(&batch).unwrap());
    }
}
