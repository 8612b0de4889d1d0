//! Export hooks: round-record sinks and report writers.
//!
//! Sinks are infallible from the experiment's point of view. Writers that can fail
//! keep the first error and return it from `finish`.

use std::io::Write;

use crate::decision::RoundRecord;
use crate::error::{BanditError, Result};
#[cfg(feature = "serde")]
use crate::report::ExperimentReport;

/// Receives one record per experiment round, in round order.
pub trait RoundSink {
    fn record(&mut self, record: &RoundRecord);
}

impl RoundSink for Vec<RoundRecord> {
    fn record(&mut self, record: &RoundRecord) {
        self.push(record.clone());
    }
}

/// Column header written by [`CsvRoundWriter`].
pub const CSV_HEADER: &str = "round_index,arm,observed_payoff,epsilon,kind";

/// Streams round records as CSV.
#[derive(Debug)]
pub struct CsvRoundWriter<W: Write> {
    out: W,
    rows: usize,
    error: Option<std::io::Error>,
}

impl<W: Write> CsvRoundWriter<W> {
    /// Writes the header immediately.
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{CSV_HEADER}")?;
        Ok(Self {
            out,
            rows: 0,
            error: None,
        })
    }

    /// Data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and return the writer, or the first write error.
    pub fn finish(mut self) -> Result<W> {
        if let Some(e) = self.error.take() {
            return Err(BanditError::Io(e));
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> RoundSink for CsvRoundWriter<W> {
    fn record(&mut self, record: &RoundRecord) {
        if self.error.is_some() {
            return;
        }
        let res = writeln!(
            self.out,
            "{},{},{},{},{}",
            record.round_index,
            csv_field(&record.arm),
            record.observed_payoff,
            record.epsilon,
            record.kind
        );
        match res {
            Ok(()) => self.rows += 1,
            Err(e) => {
                tracing::warn!(error = %e, round = record.round_index, "csv export failed");
                self.error = Some(e);
            }
        }
    }
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
pub fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Serialize a report as pretty-printed JSON.
#[cfg(feature = "serde")]
pub fn write_report_json<W: Write>(mut out: W, report: &ExperimentReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::SelectionKind;
    use std::cell::Cell;
    use std::rc::Rc;

    fn rec(i: usize, arm: &str) -> RoundRecord {
        RoundRecord {
            round_index: i,
            arm_index: 0,
            arm: arm.to_string(),
            observed_payoff: 0.5,
            epsilon: 0.25,
            kind: SelectionKind::Exploit,
        }
    }

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("funny"), "funny");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_writer_emits_header_and_rows() {
        let mut w = CsvRoundWriter::new(Vec::new()).unwrap();
        w.record(&rec(0, "persuasive"));
        w.record(&rec(1, "short, sweet"));
        assert_eq!(w.rows(), 2);
        let bytes = w.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "0,persuasive,0.5,0.25,exploit");
        assert_eq!(lines[2], "1,\"short, sweet\",0.5,0.25,exploit");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn csv_writer_reports_header_error() {
        assert!(matches!(
            CsvRoundWriter::new(FailingWriter),
            Err(BanditError::Io(_))
        ));
    }

    /// Accepts `max_lines` complete lines, then fails every write.
    #[derive(Debug)]
    struct LineLimitedWriter {
        buf: Vec<u8>,
        max_lines: usize,
        rejected: Rc<Cell<usize>>,
    }

    impl Write for LineLimitedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let lines = self.buf.iter().filter(|&&b| b == b'\n').count();
            if lines >= self.max_lines {
                self.rejected.set(self.rejected.get() + 1);
                return Err(std::io::Error::other("disk full"));
            }
            self.buf.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn csv_writer_latches_mid_stream_error() {
        let rejected = Rc::new(Cell::new(0));
        let out = LineLimitedWriter {
            buf: Vec::new(),
            max_lines: 3,
            rejected: Rc::clone(&rejected),
        };
        let mut w = CsvRoundWriter::new(out).unwrap();
        for i in 0..5 {
            w.record(&rec(i, "funny"));
        }
        // Header plus two rows fit; the third row fails and later records are skipped.
        assert_eq!(w.rows(), 2);
        assert_eq!(rejected.get(), 1);
        let err = w.finish().unwrap_err();
        assert!(matches!(
            err,
            BanditError::Io(ref e) if e.to_string() == "disk full"
        ));
    }

    #[test]
    fn vec_sink_collects_records() {
        let mut v: Vec<RoundRecord> = Vec::new();
        v.record(&rec(3, "a"));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].round_index, 3);
    }
}
