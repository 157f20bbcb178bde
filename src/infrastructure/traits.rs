//! I/O boundary traits for testability
//!
//! The balancing core never touches streams directly: lines come in through
//! a [`LineSource`] and records go out through a [`RecordSink`].

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::domain::BalanceRecord;

/// Supplies raw input lines one at a time.
pub trait LineSource {
    /// Next line without its terminator, `None` at end of input.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Accepts formatted result records one at a time.
pub trait RecordSink {
    fn write_record(&mut self, record: &BalanceRecord) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Line source over any buffered reader.
///
/// Lines are read as bytes; invalid UTF-8 is replaced with U+FFFD so a
/// single badly encoded line cannot end the run.
#[derive(Debug)]
pub struct ReaderLineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> ReaderLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// Record sink writing `NAME,LEFT,RIGHT` lines to any writer.
#[derive(Debug)]
pub struct WriterRecordSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterRecordSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for WriterRecordSink<W> {
    fn write_record(&mut self, record: &BalanceRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", record)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// True when `path` names standard input/output.
fn is_std_stream(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p.as_os_str() == "-")
}

/// Opens a file, or stdin for `None` and `-`.
pub fn open_line_source(path: Option<&Path>) -> io::Result<Box<dyn LineSource>> {
    match path {
        Some(p) if !is_std_stream(path) => {
            let file = File::open(p)?;
            Ok(Box::new(ReaderLineSource::new(BufReader::new(file))))
        }
        _ => Ok(Box::new(ReaderLineSource::new(io::stdin().lock()))),
    }
}

/// Creates (truncates) a file, or stdout for `None` and `-`.
pub fn open_record_sink(path: Option<&Path>) -> io::Result<Box<dyn RecordSink>> {
    match path {
        Some(p) if !is_std_stream(path) => {
            let file = File::create(p)?;
            Ok(Box::new(WriterRecordSink::new(BufWriter::new(file))))
        }
        _ => Ok(Box::new(WriterRecordSink::new(BufWriter::new(
            io::stdout().lock(),
        )))),
    }
}
