//! Rendering of progress records and run reports.
//!
//! Feature-gated output formats for the reporting layer:
//!
//! - `table` — [`TableRenderer`], a `tabled`-based ASCII view of a
//!   progress record or a final report.
//! - `json` — [`JsonRenderer`], `serde_json` serialization of any of the
//!   crate's record types.
//!
//! Both renderers return strings; nothing in this module prints.
//!
//! # Examples
//!
//! ```rust,ignore
//! use sciatto::render::{TableRenderer, TableStyle};
//!
//! let renderer = TableRenderer::new().with_style(TableStyle::Ascii);
//! println!("{}", renderer.progress(&record));
//! // +--------+---------+
//! // | Worker | Pending |
//! // +--------+---------+
//! // | 0      | 4       |
//! // | 1      | 2       |
//! // | total  | 40      |
//! // +--------+---------+
//! ```

use thiserror::Error;

#[cfg(feature = "table")]
use crate::harness::SimReport;
#[cfg(feature = "table")]
use crate::observer::ProgressRecord;

/// Unified error type for rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error serializing to JSON.
    #[cfg(feature = "json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Available table styles.
#[cfg(feature = "table")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// GitHub-flavored Markdown table
    Markdown,
    /// No borders, just spacing
    Blank,
}

/// Renders records as formatted ASCII tables.
///
/// A progress record becomes one row per worker (the advisory pending
/// count) plus a `total` row; a report becomes a two-row summary.
#[cfg(feature = "table")]
#[derive(Debug, Clone, Default)]
pub struct TableRenderer {
    style: TableStyle,
}

#[cfg(feature = "table")]
impl TableRenderer {
    /// Creates a renderer with the default rounded style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table style, returning `self` for chaining.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    fn apply_style(&self, table: &mut tabled::Table) {
        use tabled::settings::Style;
        match self.style {
            TableStyle::Ascii => {
                table.with(Style::ascii());
            }
            TableStyle::Rounded => {
                table.with(Style::rounded());
            }
            TableStyle::Markdown => {
                table.with(Style::markdown());
            }
            TableStyle::Blank => {
                table.with(Style::blank());
            }
        }
    }

    /// Renders a progress record: per-worker pending counts and the
    /// flushed total at `elapsed_ms`.
    pub fn progress(&self, record: &ProgressRecord) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(["Worker", "Pending"]);
        for (id, pending) in record.local.iter().enumerate() {
            builder.push_record([id.to_string(), pending.to_string()]);
        }
        builder.push_record(["total".to_string(), record.shared_total.to_string()]);

        let mut table = builder.build();
        self.apply_style(&mut table);
        format!("[{} ms]\n{}", record.elapsed_ms, table)
    }

    /// Renders a final run report.
    pub fn report(&self, report: &SimReport) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(["Final total".to_string(), report.final_total.to_string()]);
        builder.push_record(["Elapsed (ms)".to_string(), report.elapsed_ms.to_string()]);

        let mut table = builder.build();
        self.apply_style(&mut table);
        table.to_string()
    }
}

/// Serializes records to JSON.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pretty: bool,
}

#[cfg(feature = "json")]
impl JsonRenderer {
    /// Creates a renderer producing compact JSON.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables pretty-printing, returning `self` for chaining.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Serializes any of the crate's serializable types
    /// ([`ProgressRecord`], [`SimReport`],
    /// [`crate::sloppy::CounterSnapshot`], ...).
    pub fn render<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused_imports)]
    use crate::harness::SimReport;
    #[allow(unused_imports)]
    use crate::observer::ProgressRecord;

    #[cfg(feature = "table")]
    fn sample_record() -> ProgressRecord {
        ProgressRecord {
            elapsed_ms: 120,
            shared_total: 40,
            local: vec![4, 2],
        }
    }

    #[cfg(feature = "table")]
    #[test]
    fn test_progress_table_contains_rows() {
        let out = TableRenderer::new()
            .with_style(TableStyle::Ascii)
            .progress(&sample_record());
        assert!(out.starts_with("[120 ms]"));
        assert!(out.contains("Worker"));
        assert!(out.contains("total"));
        assert!(out.contains("40"));
    }

    #[cfg(feature = "table")]
    #[test]
    fn test_report_table() {
        let report = SimReport {
            final_total: 80,
            elapsed_ms: 512,
        };
        let out = TableRenderer::new().report(&report);
        assert!(out.contains("Final total"));
        assert!(out.contains("80"));
        assert!(out.contains("512"));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_compact() {
        let report = SimReport {
            final_total: 30,
            elapsed_ms: 7,
        };
        let json = JsonRenderer::new().render(&report).unwrap();
        assert_eq!(json, r#"{"final_total":30,"elapsed_ms":7}"#);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_pretty_roundtrip() {
        let record = ProgressRecord {
            elapsed_ms: 5,
            shared_total: 12,
            local: vec![1, 0, 3],
        };
        let json = JsonRenderer::new().pretty(true).render(&record).unwrap();
        let back: ProgressRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
