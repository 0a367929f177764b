//! Record serialization for the `normalize` command.

use std::io::Write;

use arrestdb_core::{NormalizedRecord, RECORD_COLUMNS, SHEET_COLUMNS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// One JSON object per line
    Json,
    /// Tab-separated rows of every record column under a header
    Tsv,
    /// Tab-separated rows of the 34-column lead sheet, with lead status
    Sheet,
}

impl OutputFormat {
    fn header(self) -> Option<&'static [&'static str]> {
        match self {
            OutputFormat::Json => None,
            OutputFormat::Tsv => Some(&RECORD_COLUMNS),
            OutputFormat::Sheet => Some(&SHEET_COLUMNS),
        }
    }
}

/// Writes records in the chosen format. Tabular output always carries the
/// header row, even when no record is written.
pub(crate) struct RecordWriter<W: Write> {
    out: W,
    format: OutputFormat,
    header_written: bool,
}

impl<W: Write> RecordWriter<W> {
    pub(crate) fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            header_written: false,
        }
    }

    pub(crate) fn write(&mut self, record: &NormalizedRecord) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, record)?;
                writeln!(self.out)?;
            }
            OutputFormat::Tsv => self.write_row(&record.to_row())?,
            OutputFormat::Sheet => self.write_row(&record.to_sheet_row())?,
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub(crate) fn finish(mut self) -> anyhow::Result<W> {
        self.write_header()?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_row(&mut self, values: &[String]) -> anyhow::Result<()> {
        self.write_header()?;
        let row: Vec<String> = values.iter().map(|v| tsv_cell(v)).collect();
        writeln!(self.out, "{}", row.join("\t"))?;
        Ok(())
    }

    fn write_header(&mut self) -> anyhow::Result<()> {
        if self.header_written {
            return Ok(());
        }
        if let Some(columns) = self.format.header() {
            writeln!(self.out, "{}", columns.join("\t"))?;
        }
        self.header_written = true;
        Ok(())
    }
}

/// Tabs and line breaks inside a value would shift the sheet's columns.
fn tsv_cell(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NormalizedRecord {
        NormalizedRecord {
            booking_id: "2025-001234".to_string(),
            charges_raw: "BATTERY\nDUI\tSECOND".to_string(),
            county: "COLLIER".to_string(),
            qualified_score: 75,
            is_qualified: true,
            ..NormalizedRecord::default()
        }
    }

    fn written(format: OutputFormat, records: &[NormalizedRecord]) -> String {
        let mut writer = RecordWriter::new(Vec::new(), format);
        for record in records {
            writer.write(record).unwrap();
        }
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn json_lines_round_trip() {
        let out = written(OutputFormat::Json, &[record(), record()]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: NormalizedRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn tsv_has_header_then_aligned_rows() {
        let out = written(OutputFormat::Tsv, &[record()]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split('\t').count(), RECORD_COLUMNS.len());
        let cells: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(cells.len(), RECORD_COLUMNS.len());
        assert_eq!(cells[0], "2025-001234");
    }

    #[test]
    fn tsv_flattens_tabs_and_newlines() {
        let out = written(OutputFormat::Tsv, &[record()]);
        assert!(out.contains("BATTERY DUI SECOND"));
    }

    #[test]
    fn tsv_header_written_without_records() {
        let out = written(OutputFormat::Tsv, &[]);
        assert_eq!(out, format!("{}\n", RECORD_COLUMNS.join("\t")));
    }

    #[test]
    fn sheet_rows_follow_sheet_columns() {
        let out = written(OutputFormat::Sheet, &[record()]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], SHEET_COLUMNS.join("\t"));
        let cells: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(cells.len(), SHEET_COLUMNS.len());
        assert_eq!(cells[0], "2025-001234");
        assert_eq!(cells[cells.len() - 2], "75");
        assert_eq!(cells[cells.len() - 1], "Hot");
    }

    #[test]
    fn json_without_records_is_empty() {
        assert!(written(OutputFormat::Json, &[]).is_empty());
    }
}
