// feedsniff - core/export.rs
//
// Text, CSV and JSON export of per-file classification reports.
// Core layer: writes to any Write implementor; the caller owns the file.

use crate::core::model::{FeedFormat, FileReport};
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Column order for CSV reports.
const CSV_HEADER: [&str; 8] = [
    "path",
    "size",
    "format",
    "bytes_to_decide",
    "title",
    "item_count",
    "newest_item",
    "error",
];

/// Export reports as CSV, one row per file. Returns the number of rows.
pub fn export_csv<W: Write>(
    reports: &[FileReport],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: export_path.to_path_buf(),
        source,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER).map_err(csv_err)?;

    for report in reports {
        let summary = report.summary.as_ref();
        csv_writer
            .write_record([
                report.path.display().to_string(),
                report.size.to_string(),
                report.format.id().to_string(),
                report
                    .bytes_to_decide
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                summary
                    .and_then(|s| s.title.clone())
                    .unwrap_or_default(),
                summary.map(|s| s.item_count.to_string()).unwrap_or_default(),
                summary
                    .and_then(|s| s.newest_item)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                report.error.clone().unwrap_or_default(),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(reports.len())
}

/// Human-readable report: one line per file, format id first.
///
/// ```text
/// rss          blog.xml  "Blog" 12 items, newest 2024-01-15T14:30:22+00:00
/// not-a-feed   index.html
/// error        gone.xml  'gone.xml': I/O error: No such file or directory
/// ```
pub fn export_text<W: Write>(
    reports: &[FileReport],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |source| ExportError::Io {
        path: export_path.to_path_buf(),
        source,
    };

    for report in reports {
        let mut line = match &report.error {
            Some(_) if report.format == FeedFormat::Unknown => {
                format!("{:<12} {}", "error", report.path.display())
            }
            _ => format!("{:<12} {}", report.format.id(), report.path.display()),
        };
        if let Some(n) = report.bytes_to_decide {
            line.push_str(&format!("  decided after {n} bytes"));
        }
        if let Some(summary) = &report.summary {
            line.push_str(&format!(
                "  \"{}\" {} items",
                summary.title.as_deref().unwrap_or(""),
                summary.item_count
            ));
            if let Some(newest) = summary.newest_item {
                line.push_str(&format!(", newest {}", newest.to_rfc3339()));
            }
        }
        if let Some(error) = &report.error {
            line.push_str(&format!("  {error}"));
        }
        writeln!(writer, "{line}").map_err(io_err)?;
    }

    writer.flush().map_err(io_err)?;
    Ok(reports.len())
}

/// Export reports as a pretty-printed JSON array.
pub fn export_json<W: Write>(
    reports: &[FileReport],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, reports).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(reports.len())
}
