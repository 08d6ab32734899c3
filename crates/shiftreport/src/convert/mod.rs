//! Conversion of the raw console export into a clean spreadsheet.
//!
//! The console's "Excel" export is really an HTML document with a single
//! `<table>`, saved under a spreadsheet extension. This module parses that
//! table into an in-memory row/cell structure and re-emits it as a styled
//! single-sheet XLSX workbook.

mod sheet;

pub use sheet::{write_workbook, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH};

use std::path::{Path, PathBuf};

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No table element found in export")]
    NoTableFound,

    #[error("Failed to read export '{path}': {source}")]
    ReadExport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// One table cell: its visible text and whether it came from a `<th>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub header: bool,
}

/// Ordered row/cell structure parsed from the export's first HTML table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularDocument {
    pub rows: Vec<Vec<Cell>>,
}

impl TabularDocument {
    /// Parses the first `<table>` of an HTML document.
    ///
    /// Cell values are the text content with markup stripped and whitespace
    /// collapsed; numeric-looking text is left as text.
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let table_selector = Selector::parse("table").expect("static selector");
        let row_selector = Selector::parse("tr").expect("static selector");
        let cell_selector = Selector::parse("th, td").expect("static selector");

        let table = document
            .select(&table_selector)
            .next()
            .ok_or(ConvertError::NoTableFound)?;

        let rows = table
            .select(&row_selector)
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| Cell {
                        text: cell_text(&cell),
                        header: cell.value().name().eq_ignore_ascii_case("th"),
                    })
                    .collect()
            })
            .collect();

        Ok(Self { rows })
    }

    /// A row is a header row when it is row zero or carries a `<th>` cell.
    pub fn is_header_row(&self, index: usize) -> bool {
        index == 0
            || self
                .rows
                .get(index)
                .is_some_and(|row| row.iter().any(|cell| cell.header))
    }

    /// Widest cell text per column, in characters.
    pub fn column_content_widths(&self) -> Vec<usize> {
        let mut widths = Vec::new();
        for row in &self.rows {
            if row.len() > widths.len() {
                widths.resize(row.len(), 0);
            }
            for (col, cell) in row.iter().enumerate() {
                widths[col] = widths[col].max(cell.text.chars().count());
            }
        }
        widths
    }
}

/// Text content of a cell with nested markup dropped and runs of whitespace
/// collapsed to single spaces. Idempotent on already-clean text.
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The converted spreadsheet written next to the raw export.
#[derive(Debug, Clone)]
pub struct ConvertedArtifact {
    pub file_name: String,
    pub path: PathBuf,
}

/// Parses the staged export and writes the styled workbook beside it,
/// swapping the extension for `.xlsx`.
pub fn convert_export(input: &Path) -> Result<ConvertedArtifact> {
    let bytes = std::fs::read(input).map_err(|e| ConvertError::ReadExport {
        path: input.to_path_buf(),
        source: e,
    })?;
    let html = String::from_utf8_lossy(&bytes);
    let document = TabularDocument::parse(&html)?;

    let output = input.with_extension("xlsx");
    write_workbook(&document, &output)?;

    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report.xlsx".to_string());
    debug!(rows = document.rows.len(), output = %output.display(), "export converted");

    Ok(ConvertedArtifact {
        file_name,
        path: output,
    })
}
