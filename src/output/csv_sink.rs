//! CSV output
//!
//! Rows are UTF-8 with a byte-order mark at the start of the file, which lets
//! spreadsheet tools detect the encoding of CJK text. Each row is flushed as
//! soon as it is written, so an interrupted run leaves every completed row on
//! disk.

use crate::config::HeaderStyle;
use crate::output::traits::{RecordSink, SinkMode, SinkResult};
use crate::record::{header, MovieRecord};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Byte-order mark written once at the start of the file
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Appends records to a CSV file
pub struct CsvSink {
    writer: csv::Writer<File>,
    mode: SinkMode,
    rows_written: u64,
}

impl CsvSink {
    /// Opens the output file
    ///
    /// # Arguments
    ///
    /// * `path` - The CSV file
    /// * `mode` - `Overwrite` truncates and writes BOM + header; `Append`
    ///   writes neither and trusts the existing header
    /// * `style` - Header language for `Overwrite`
    ///
    /// # Returns
    ///
    /// * `Ok(CsvSink)` - File opened and, for `Overwrite`, header written
    /// * `Err(SinkError)` - File could not be opened or written
    pub fn open(path: &Path, mode: SinkMode, style: HeaderStyle) -> SinkResult<Self> {
        let mut file = match mode {
            SinkMode::Overwrite => File::create(path)?,
            SinkMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        };
        let is_empty = file.metadata()?.len() == 0;

        // The BOM goes straight to the file, ahead of any CSV-encoded row
        match mode {
            SinkMode::Overwrite => file.write_all(UTF8_BOM)?,
            SinkMode::Append if is_empty => {
                tracing::warn!(
                    "Appending to empty file {}; it will have no header row",
                    path.display()
                );
                file.write_all(UTF8_BOM)?;
            }
            SinkMode::Append => {}
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if mode == SinkMode::Overwrite {
            writer.write_record(header(style))?;
            writer.flush()?;
        }

        Ok(Self {
            writer,
            mode,
            rows_written: 0,
        })
    }

    pub fn mode(&self) -> SinkMode {
        self.mode
    }
}

impl RecordSink for CsvSink {
    fn write(&mut self, record: &MovieRecord) -> SinkResult<()> {
        self.writer.write_record(record.as_row())?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows_written
    }
}
