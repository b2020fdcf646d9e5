//! Spreadsheet attachments rendered as text for the agent.
//!
//! The first worksheet is read with `calamine` and rendered as a markdown
//! table whose header is the sheet's first row.

use crate::error::{FerretError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, instrument};

/// Returned for a workbook whose first sheet has no cells.
pub const EMPTY_SHEET: &str = "The sheet is empty.";

/// Read the first worksheet of an Excel (or ODS) workbook as rows of cell text.
#[instrument]
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<String>>> {
    if !path.is_file() {
        return Err(FerretError::InvalidInput(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| FerretError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FerretError::Spreadsheet("Workbook has no sheets".to_string()))?
        .map_err(|e| FerretError::Spreadsheet(e.to_string()))?;

    debug!(rows = range.height(), columns = range.width(), "read worksheet");

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Render rows as a markdown table, using the first row as the header.
pub fn render_markdown(rows: &[Vec<String>]) -> String {
    let Some((header, body)) = rows.split_first() else {
        return EMPTY_SHEET.to_string();
    };
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return EMPTY_SHEET.to_string();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(header, width));
    lines.push(format!("|{}", " --- |".repeat(width)));
    lines.extend(body.iter().map(|row| render_row(row, width)));
    lines.join("\n")
}

fn render_row(row: &[String], width: usize) -> String {
    let cells: Vec<String> = (0..width)
        .map(|i| {
            row.get(i)
                .map(|cell| cell.replace('|', "\\|").replace(['\r', '\n'], " "))
                .unwrap_or_default()
        })
        .collect();
    format!("| {} |", cells.join(" | "))
}

/// Load a workbook and render its first sheet.
pub fn process_excel_file(path: &Path) -> Result<String> {
    Ok(render_markdown(&read_first_sheet(path)?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sales" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Item</t></is></c><c r="B1" t="inlineStr"><is><t>Sales</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Burgers</t></is></c><c r="B2"><v>1530</v></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>Soda | large</t></is></c><c r="B3"><v>42.5</v></c></row>
</sheetData>
</worksheet>"#;

    /// Write a one-sheet `.xlsx` with a header and two data rows.
    pub(crate) fn write_fixture_workbook(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", SHEET),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_process_excel_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        write_fixture_workbook(&path);

        let rows = read_first_sheet(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Item", "Sales"]);
        assert_eq!(rows[1], vec!["Burgers", "1530"]);

        assert_eq!(
            process_excel_file(&path).unwrap(),
            "| Item | Sales |\n| --- | --- |\n| Burgers | 1530 |\n| Soda \\| large | 42.5 |"
        );
    }

    #[test]
    fn test_process_excel_file_errors() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            process_excel_file(&dir.path().join("missing.xlsx")),
            Err(FerretError::InvalidInput(_))
        ));

        let bogus = dir.path().join("notes.xlsx");
        std::fs::write(&bogus, "not a zip archive").unwrap();
        assert!(matches!(
            process_excel_file(&bogus),
            Err(FerretError::Spreadsheet(_))
        ));
    }

    #[test]
    fn test_render_markdown_pads_ragged_rows() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["1".to_string()],
        ];
        assert_eq!(render_markdown(&rows), "| a | b |\n| --- | --- |\n| 1 |  |");
        assert_eq!(render_markdown(&[]), EMPTY_SHEET);
        assert_eq!(render_markdown(&[vec![]]), EMPTY_SHEET);
    }
}
