use crate::error::{Result, TransformError};
use crate::types::{Record, SinkConfig};
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::info;

/// Writes records as newline-delimited JSON, one object per line, in the
/// order received
pub struct RecordSink<W: Write> {
    writer: W,
    config: SinkConfig,
    written: u64,
}

impl<W: Write> RecordSink<W> {
    pub fn new(writer: W, config: SinkConfig) -> Self {
        RecordSink {
            writer,
            config,
            written: 0,
        }
    }

    /// Render the record fully before touching the writer, so a failure never
    /// leaves half a line behind
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let mut line = serde_json::to_vec(record).map_err(TransformError::Serialization)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.written += 1;

        if let Some(interval) = self.config.progress_interval {
            if self.written % interval.get() == 0 {
                info!(records = self.written, "progress");
            }
        }
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and return the number of records written
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

/// Parse a JSON-lines stream one line at a time. Blank lines are skipped;
/// every other line must be a complete JSON value on its own.
pub fn read_json_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Value>> {
    reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str(&line).map_err(TransformError::Serialization)),
        Err(e) => Some(Err(TransformError::Io(e))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;
    use std::io::Cursor;

    fn record(pairs: &[(&str, &str)]) -> Record {
        let mut record = Record::new();
        for (key, value) in pairs {
            record.insert(key, Field::scalar(*value));
        }
        record
    }

    #[test]
    fn test_one_line_per_record_in_order() {
        let mut buffer = Vec::new();
        let mut sink = RecordSink::new(&mut buffer, SinkConfig::default());

        sink.write_record(&record(&[("__type__", "node"), ("id", "1")])).unwrap();
        sink.write_record(&record(&[("__type__", "way"), ("id", "2")])).unwrap();
        assert_eq!(sink.finish().unwrap(), 2);

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "{\"__type__\":\"node\",\"id\":\"1\"}\n{\"__type__\":\"way\",\"id\":\"2\"}\n"
        );
    }

    #[test]
    fn test_progress_does_not_change_output() {
        let records: Vec<Record> = (0..5).map(|i| record(&[("id", &i.to_string())])).collect();

        let mut quiet = Vec::new();
        let mut sink = RecordSink::new(&mut quiet, SinkConfig::default());
        for r in &records {
            sink.write_record(r).unwrap();
        }
        sink.finish().unwrap();

        let mut chatty = Vec::new();
        let mut sink = RecordSink::new(&mut chatty, SinkConfig::with_progress_interval(2));
        for r in &records {
            sink.write_record(r).unwrap();
        }
        assert_eq!(sink.written(), 5);
        sink.finish().unwrap();

        assert_eq!(quiet, chatty);
    }

    #[test]
    fn test_zero_interval_disables_progress() {
        assert!(SinkConfig::with_progress_interval(0).progress_interval.is_none());
    }

    #[test]
    fn test_read_json_lines_is_strict_per_line() {
        let input = "{\"a\":\"1\"}\n\n{\"b\":[\"x\"]}\n{broken\n";
        let parsed: Vec<Result<Value>> = read_json_lines(Cursor::new(input)).collect();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].as_ref().unwrap()["a"], "1");
        assert_eq!(parsed[1].as_ref().unwrap()["b"][0], "x");
        assert!(matches!(parsed[2], Err(TransformError::Serialization(_))));
    }
}
