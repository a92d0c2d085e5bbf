//! Record stream encoder

use std::io::{self, Write};

use super::payload::{Done, RecordPayload, Version};
use super::record::RecordTag;

/// Frames typed records onto a byte sink.
///
/// Each record is the tag byte followed by the payload bytes, nothing else.
/// The writer keeps no domain state beyond counters; ordering of records is
/// the caller's business.
pub struct RecordWriter<W: Write> {
    inner: W,
    scratch: Vec<u8>,
    records_written: usize,
    bytes_written: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            scratch: Vec::with_capacity(128),
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Append one record: `tag` then `payload` verbatim.
    pub fn write_record(&mut self, tag: RecordTag, payload: &[u8]) -> io::Result<()> {
        self.inner.write_all(&[tag.byte()])?;
        self.inner.write_all(payload)?;
        self.records_written += 1;
        self.bytes_written += 1 + payload.len() as u64;
        Ok(())
    }

    /// Encode and append a typed payload.
    pub fn write<P: RecordPayload>(&mut self, payload: &P) -> io::Result<()> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        payload.encode(&mut scratch);
        let result = self.write_record(P::TAG, &scratch);
        self.scratch = scratch;
        result
    }

    /// Write the `version` record for the current format version.
    pub fn write_version(&mut self) -> io::Result<()> {
        self.write(&Version::CURRENT)
    }

    /// Write the `done` terminator and flush the sink.
    pub fn finish(&mut self) -> io::Result<()> {
        self.write(&Done)?;
        self.inner.flush()
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Number of bytes written so far, tags included
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
