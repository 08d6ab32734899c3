//! Styled XLSX emission for a parsed tabular document.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use super::{Result, TabularDocument};

/// Lower clamp for fitted column widths, in character units.
pub const MIN_COLUMN_WIDTH: f64 = 10.0;

/// Upper clamp for fitted column widths, in character units.
pub const MAX_COLUMN_WIDTH: f64 = 50.0;

const HEADER_FILL: Color = Color::RGB(0xD9D9D9);

/// Writes the document as a single-sheet workbook.
///
/// Every cell gets a thin border, wrapped text and middle/left alignment;
/// header rows are bold, centered and filled light gray. Cell values are
/// written as strings so the source text survives unchanged.
pub fn write_workbook(document: &TabularDocument, output: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let body_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    let header_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_background_color(HEADER_FILL);

    for (row_idx, row) in document.rows.iter().enumerate() {
        let format = if document.is_header_row(row_idx) {
            &header_format
        } else {
            &body_format
        };
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string_with_format(row_idx as u32, col_idx as u16, &cell.text, format)?;
        }
    }

    for (col_idx, content_width) in document.column_content_widths().iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, fitted_width(*content_width))?;
    }

    workbook.save(output)?;
    Ok(())
}

/// Width for a column whose widest value is `content_chars` characters,
/// clamped to [`MIN_COLUMN_WIDTH`, `MAX_COLUMN_WIDTH`].
pub(crate) fn fitted_width(content_chars: usize) -> f64 {
    (content_chars as f64).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Cell;
    use tempfile::TempDir;

    #[test]
    fn test_fitted_width_clamps() {
        assert_eq!(fitted_width(0), MIN_COLUMN_WIDTH);
        assert_eq!(fitted_width(3), MIN_COLUMN_WIDTH);
        assert_eq!(fitted_width(25), 25.0);
        assert_eq!(fitted_width(50), MAX_COLUMN_WIDTH);
        assert_eq!(fitted_width(4000), MAX_COLUMN_WIDTH);
    }

    #[test]
    fn test_fitted_width_monotone() {
        let mut previous = 0.0;
        for chars in 0..120 {
            let width = fitted_width(chars);
            assert!(width >= previous, "width shrank at {chars}");
            assert!((MIN_COLUMN_WIDTH..=MAX_COLUMN_WIDTH).contains(&width));
            previous = width;
        }
    }

    #[test]
    fn test_write_workbook_produces_file() {
        let document = TabularDocument {
            rows: vec![
                vec![
                    Cell {
                        text: "Driver".into(),
                        header: true,
                    },
                    Cell {
                        text: "Event".into(),
                        header: true,
                    },
                ],
                vec![
                    Cell {
                        text: "Somchai".into(),
                        header: false,
                    },
                    Cell {
                        text: "หาว".into(),
                        header: false,
                    },
                ],
            ],
        };

        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("report.xlsx");
        write_workbook(&document, &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_write_workbook_empty_document() {
        let document = TabularDocument { rows: vec![] };
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("empty.xlsx");
        write_workbook(&document, &output).unwrap();
        assert!(output.exists());
    }
}
