use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};

pub const HEADER: &str = "model\tepoch\tprecision\trecall";

/// Tab separated result log. Every run appends the header line first.
pub struct Record<W: Write> {
    writer: W,
}

impl Record<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open record {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file))?)
    }
}

impl<W: Write> Record<W> {
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{}", HEADER)?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, model: &str, epoch: usize, precision: f64, recall: f64) -> io::Result<()> {
        writeln!(
            self.writer,
            "{}\t{}\t{:.10}\t{:.10}",
            model, epoch, precision, recall
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
