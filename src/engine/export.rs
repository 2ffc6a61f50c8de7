// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text renderings used for `SaveFormat::{Text, Markdown, Csv}`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::model::{Document, Paragraph, PdfDocument, Presentation, Workbook, Worksheet, WordDocument};

use super::{EngineError, SaveFormat};

pub(crate) fn render(
    document: &Document,
    format: SaveFormat,
    max_bytes: usize,
) -> Result<String, EngineError> {
    let unsupported = || EngineError::UnsupportedFormat {
        kind: document.kind(),
        format,
    };
    let rendered = match (document, format) {
        (Document::Word(doc), SaveFormat::Text) => word_text(doc),
        (Document::Word(doc), SaveFormat::Markdown) => word_markdown(doc),
        (Document::Spreadsheet(book), SaveFormat::Csv) => match book.sheets.first() {
            Some(sheet) => sheet_csv(sheet, max_bytes)?,
            None => String::new(),
        },
        (Document::Spreadsheet(book), SaveFormat::Text) => workbook_text(book),
        (Document::Presentation(deck), SaveFormat::Text) => presentation_text(deck),
        (Document::Presentation(deck), SaveFormat::Markdown) => presentation_markdown(deck),
        (Document::Pdf(pdf), SaveFormat::Text) => pdf_text(pdf),
        _ => return Err(unsupported()),
    };
    if rendered.len() > max_bytes {
        return Err(EngineError::TooLarge {
            format,
            estimated: rendered.len(),
            limit: max_bytes,
        });
    }
    Ok(rendered)
}

fn word_text(doc: &WordDocument) -> String {
    let mut out = String::new();
    for paragraph in &doc.paragraphs {
        out.push_str(&paragraph.text);
        out.push('\n');
    }
    out
}

fn word_markdown(doc: &WordDocument) -> String {
    let mut out = String::new();
    for paragraph in &doc.paragraphs {
        out.push_str(&markdown_paragraph(paragraph));
        out.push_str("\n\n");
    }
    out
}

fn markdown_paragraph(paragraph: &Paragraph) -> String {
    let text = paragraph.text.trim();
    if text.is_empty() {
        return String::new();
    }
    match (paragraph.style.bold, paragraph.style.italic) {
        (true, true) => format!("***{text}***"),
        (true, false) => format!("**{text}**"),
        (false, true) => format!("*{text}*"),
        (false, false) => text.to_owned(),
    }
}

/// Renders the first sheet on an A1-anchored grid. Rows without cells stay empty lines, so the
/// size grows with the filled rows times the sheet width, and is checked before rendering.
pub(crate) fn sheet_csv(sheet: &Worksheet, max_bytes: usize) -> Result<String, EngineError> {
    let mut rows: BTreeMap<u32, Vec<(u32, String)>> = BTreeMap::new();
    let mut max_col = 0;
    for (cell_ref, cell) in &sheet.cells {
        max_col = max_col.max(cell_ref.column);
        rows.entry(cell_ref.row)
            .or_default()
            .push((cell_ref.column, csv_escape(&cell.value.display())));
    }
    let Some(&max_row) = rows.keys().next_back() else {
        return Ok(String::new());
    };

    let separators = rows.len().saturating_mul(max_col.saturating_sub(1) as usize);
    let values: usize = rows.values().flatten().map(|(_, value)| value.len()).sum();
    let estimated = (max_row as usize).saturating_add(separators).saturating_add(values);
    if estimated > max_bytes {
        return Err(EngineError::TooLarge {
            format: SaveFormat::Csv,
            estimated,
            limit: max_bytes,
        });
    }

    let mut out = String::with_capacity(estimated);
    for row in 1..=max_row {
        if let Some(cells) = rows.get(&row) {
            let mut column = 1;
            for (cell_column, value) in cells {
                while column < *cell_column {
                    out.push(',');
                    column += 1;
                }
                out.push_str(value);
            }
            for _ in column..max_col {
                out.push(',');
            }
        }
        out.push('\n');
    }
    Ok(out)
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn workbook_text(book: &Workbook) -> String {
    let mut out = String::new();
    for sheet in &book.sheets {
        let _ = writeln!(out, "# {}", sheet.name);
        for (cell_ref, cell) in &sheet.cells {
            let _ = writeln!(out, "{cell_ref}\t{}", cell.value.display());
        }
    }
    out
}

fn presentation_text(deck: &Presentation) -> String {
    let mut out = String::new();
    for (idx, slide) in deck.slides.iter().enumerate() {
        let _ = writeln!(out, "Slide {}: {}", idx + 1, slide.title.as_deref().unwrap_or(""));
        for line in slide.text_lines() {
            let _ = writeln!(out, "{line}");
        }
        if let Some(notes) = &slide.notes {
            let _ = writeln!(out, "Notes: {notes}");
        }
        out.push('\n');
    }
    out
}

fn presentation_markdown(deck: &Presentation) -> String {
    let mut out = String::new();
    for (idx, slide) in deck.slides.iter().enumerate() {
        match &slide.title {
            Some(title) => {
                let _ = writeln!(out, "## {title}\n");
            }
            None => {
                let _ = writeln!(out, "## Slide {}\n", idx + 1);
            }
        }
        for line in slide.text_lines() {
            let _ = writeln!(out, "- {line}");
        }
        if let Some(notes) = &slide.notes {
            let _ = writeln!(out, "\n> {notes}");
        }
        out.push('\n');
    }
    out
}

fn pdf_text(pdf: &PdfDocument) -> String {
    pdf.pages.iter().map(|page| page.text.as_str()).collect::<Vec<_>>().join("\n\u{c}\n")
}

#[cfg(test)]
mod tests {
    use super::{render, sheet_csv};
    use crate::engine::{EngineError, SaveFormat};
    use crate::model::{Cell, CellRef, CellValue, Document, DocumentKind, Paragraph, WordDocument, Worksheet};

    #[test]
    fn csv_fills_gaps_and_escapes() {
        let mut sheet = Worksheet::new("S");
        sheet.cells.insert(
            CellRef::new(1, 1),
            Cell {
                value: CellValue::Text("a,b".to_owned()),
                ..Cell::default()
            },
        );
        sheet.cells.insert(
            CellRef::new(2, 3),
            Cell {
                value: CellValue::Number(4.0),
                ..Cell::default()
            },
        );
        assert_eq!(sheet_csv(&sheet, usize::MAX).expect("csv"), "\"a,b\",,\n,,4\n");
    }

    #[test]
    fn csv_size_follows_filled_rows_not_the_cell_address() {
        let mut sheet = Worksheet::new("S");
        let far = "XFD1048576".parse::<CellRef>().expect("cell ref");
        sheet.cells.insert(
            far,
            Cell {
                value: CellValue::Number(1.0),
                ..Cell::default()
            },
        );
        let csv = sheet_csv(&sheet, usize::MAX).expect("csv");
        assert_eq!(csv.len(), far.row as usize + (far.column as usize - 1) + 1);
        assert!(csv.ends_with(",1\n"));

        let err = sheet_csv(&sheet, 64 * 1024).unwrap_err();
        assert!(matches!(err, EngineError::TooLarge { format: SaveFormat::Csv, limit: 65536, .. }), "{err}");
    }

    #[test]
    fn text_exports_respect_the_byte_limit() {
        let mut doc = WordDocument::default();
        doc.paragraphs.push(Paragraph::new("x".repeat(64)));
        let err = render(&Document::Word(doc), SaveFormat::Text, 16).unwrap_err();
        assert!(matches!(err, EngineError::TooLarge { estimated: 65, limit: 16, .. }));
    }

    #[test]
    fn word_markdown_marks_bold_paragraphs() {
        let mut doc = WordDocument::default();
        let mut title = Paragraph::new("Title");
        title.style.bold = true;
        doc.paragraphs.push(title);
        doc.paragraphs.push(Paragraph::new("Body"));
        let md = render(&Document::Word(doc), SaveFormat::Markdown, usize::MAX).expect("markdown");
        assert_eq!(md, "**Title**\n\nBody\n\n");
    }

    #[test]
    fn unsupported_combinations_are_reported() {
        let err = render(&Document::blank(DocumentKind::Ocr), SaveFormat::Text, usize::MAX).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedFormat { .. }));
    }
}
