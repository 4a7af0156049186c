use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const MIN_BUFFER_SIZE: usize = 4096;

/// Newline-terminated hash list backed by a buffered file.
pub struct HashWriter {
    writer: BufWriter<File>,
    lines_written: u64,
}

impl HashWriter {
    /// Creates or truncates `path`.
    pub fn create<P: AsRef<Path>>(path: P, buffer_size: usize) -> Result<Self> {
        let file = File::create(path.as_ref())?;

        Ok(Self {
            writer: BufWriter::with_capacity(buffer_size.max(MIN_BUFFER_SIZE), file),
            lines_written: 0,
        })
    }

    pub fn write_hash(&mut self, hash: &str) -> Result<()> {
        self.writer.write_all(hash.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }

    /// Lines written so far, including any still held in the buffer.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Flushes buffered lines and closes the file, returning the line count.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        Ok(self.lines_written)
    }
}
