//! `normalize` command handler.
//!
//! A line that is not valid UTF-8 or not a flat JSON object is logged and
//! skipped rather than aborting the run, so one bad scrape does not drop a
//! whole county batch.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use arrestdb_core::{NormalizerConfig, RawPairs};
use arrestdb_normalize::Normalizer;

use crate::output::{OutputFormat, RecordWriter};

#[derive(Debug, Clone)]
pub(crate) struct NormalizeOptions {
    pub(crate) county: String,
    pub(crate) source_url: String,
    pub(crate) format: OutputFormat,
    pub(crate) qualified_only: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NormalizeSummary {
    pub(crate) read: usize,
    pub(crate) normalized: usize,
    pub(crate) qualified: usize,
    pub(crate) skipped: usize,
}

/// Normalizes bookings from `input` (stdin when `None`) to stdout.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or read, or stdout cannot
/// be written.
pub(crate) fn run_normalize(
    config: NormalizerConfig,
    input: Option<&Path>,
    options: &NormalizeOptions,
) -> anyhow::Result<()> {
    let normalizer = Normalizer::new(config);
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening input {}", path.display()))?,
        )),
        None => Box::new(std::io::stdin().lock()),
    };
    let stdout = BufWriter::new(std::io::stdout().lock());

    let summary = normalize_stream(&normalizer, reader, stdout, options)?;
    tracing::info!(
        county = %options.county,
        read = summary.read,
        normalized = summary.normalized,
        qualified = summary.qualified,
        skipped = summary.skipped,
        "normalize run complete"
    );
    Ok(())
}

/// Reads one JSON object of raw pairs per line and writes normalized records.
/// Blank lines are ignored and not counted.
///
/// # Errors
///
/// Returns an error only when the reader or the output fails; bad lines are
/// counted as skipped.
pub(crate) fn normalize_stream<R: BufRead, W: Write>(
    normalizer: &Normalizer,
    mut reader: R,
    out: W,
    options: &NormalizeOptions,
) -> anyhow::Result<NormalizeSummary> {
    let mut writer = RecordWriter::new(out, options.format);
    let mut summary = NormalizeSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0_usize;

    loop {
        buf.clear();
        if reader
            .read_until(b'\n', &mut buf)
            .context("reading input")?
            == 0
        {
            break;
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "skipping input line that is not UTF-8");
                summary.read += 1;
                summary.skipped += 1;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        summary.read += 1;

        let raw: RawPairs = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "skipping malformed input line");
                summary.skipped += 1;
                continue;
            }
        };

        let record = normalizer.normalize(&raw, &options.county, &options.source_url);
        summary.normalized += 1;
        if record.is_qualified {
            summary.qualified += 1;
        } else if options.qualified_only {
            continue;
        }
        writer.write(&record)?;
    }

    writer.finish()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use arrestdb_core::NormalizedRecord;
    use chrono::{SecondsFormat, Utc};

    use super::*;

    fn options(format: OutputFormat, qualified_only: bool) -> NormalizeOptions {
        NormalizeOptions {
            county: "COLLIER".to_string(),
            source_url: "https://ccso.test/bookings".to_string(),
            format,
            qualified_only,
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(NormalizerConfig::builtin().unwrap())
    }

    fn input() -> String {
        let today = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let hot = serde_json::json!({
            "Booking Number": "2025-001234",
            "Name": "SMITH, JOHN",
            "Bond": "$2,500.00",
            "Charges": "Battery - Domestic Violence",
            "Arrest Date": today,
        });
        let cold = serde_json::json!({
            "Booking Number": "2025-001235",
            "Name": "DOE, JANE",
            "Charges": "Petit Theft",
        });
        format!("{hot}\n\n{{not json\n{cold}\n")
    }

    fn run(options: &NormalizeOptions) -> (NormalizeSummary, Vec<NormalizedRecord>) {
        let mut out = Vec::new();
        let summary =
            normalize_stream(&normalizer(), input().as_bytes(), &mut out, options).unwrap();
        let records = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (summary, records)
    }

    #[test]
    fn counts_and_skips_malformed_lines() {
        let (summary, records) = run(&options(OutputFormat::Json, false));
        assert_eq!(
            summary,
            NormalizeSummary {
                read: 3,
                normalized: 2,
                qualified: 1,
                skipped: 1,
            }
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].county, "COLLIER");
        assert_eq!(records[0].source_url, "https://ccso.test/bookings");
        assert_eq!(records[1].booking_id, "2025-001235");
    }

    #[test]
    fn qualified_only_filters_output_not_counts() {
        let (summary, records) = run(&options(OutputFormat::Json, true));
        assert_eq!(summary.normalized, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].booking_id, "2025-001234");
        assert!(records[0].is_qualified);
    }

    #[test]
    fn invalid_utf8_line_is_skipped_not_fatal() {
        let input: &[u8] =
            b"{\"Booking Number\":\"1\"}\n{\"Name\":\"\xff\xfe\"}\n{\"Booking Number\":\"2\"}\n";
        let mut out = Vec::new();
        let summary =
            normalize_stream(&normalizer(), input, &mut out, &options(OutputFormat::Json, false))
                .unwrap();
        assert_eq!(summary.read, 3);
        assert_eq!(summary.normalized, 2);
        assert_eq!(summary.skipped, 1);

        let ids: Vec<String> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<NormalizedRecord>(l).unwrap().booking_id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let input = "{\"Booking Number\":\"1\"}\r\n{\"Booking Number\":\"2\"}";
        let mut out = Vec::new();
        let summary = normalize_stream(
            &normalizer(),
            input.as_bytes(),
            &mut out,
            &options(OutputFormat::Json, false),
        )
        .unwrap();
        assert_eq!(summary.normalized, 2);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn tsv_output_has_header_and_rows() {
        let mut out = Vec::new();
        normalize_stream(
            &normalizer(),
            input().as_bytes(),
            &mut out,
            &options(OutputFormat::Tsv, false),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("booking_id\t"));
        assert!(lines[1].starts_with("2025-001234\t"));
    }
}
