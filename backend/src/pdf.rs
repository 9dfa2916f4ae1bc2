//! PDF rendering of report documents
//!
//! Lays out a [`ReportDocument`] on A4 pages with the built-in Helvetica
//! fonts. Positions are measured in millimetres from the top-left corner and
//! flipped to PDF coordinates when drawn.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use shared::report::{Page, ReportDocument, Table};

use crate::error::{AppError, AppResult};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const LINE_HEIGHT: f32 = 7.0;
const BODY_TOP: f32 = 60.0;

/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.5;
const MM_PER_PT: f32 = 0.3528;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render a document to PDF bytes
pub fn render(document: &ReportDocument) -> AppResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        document.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(export_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(export_error)?,
    };

    // A document always has at least one page, even with nothing to list
    let empty = Page {
        title: document.title.clone(),
        lines: Vec::new(),
        table: None,
    };
    let pages: Vec<&Page> = if document.pages.is_empty() {
        vec![&empty]
    } else {
        document.pages.iter().collect()
    };
    let page_total = pages.len();

    for (index, page) in pages.into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_ref, layer_ref) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page_ref).get_layer(layer_ref)
        };
        draw_page(&layer, &fonts, document, page, index + 1, page_total);
    }

    save(doc)
}

fn save(doc: PdfDocumentReference) -> AppResult<Vec<u8>> {
    doc.save_to_bytes().map_err(export_error)
}

fn export_error(error: impl std::fmt::Display) -> AppError {
    AppError::Export(error.to_string())
}

fn draw_page(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    document: &ReportDocument,
    page: &Page,
    page_number: usize,
    page_total: usize,
) {
    let letterhead = &document.letterhead;
    text(layer, &fonts.bold, &letterhead.name, 18.0, MARGIN, 22.0);
    text(layer, &fonts.regular, &letterhead.address, 10.0, MARGIN, 30.0);
    text(layer, &fonts.regular, &letterhead.tax_line(), 10.0, MARGIN, 36.0);
    text(layer, &fonts.regular, &letterhead.contact_line(), 10.0, MARGIN, 42.0);
    rule(layer, 44.0);

    centered(layer, &fonts.bold, &page.title, 14.0, 52.0);

    let mut y = BODY_TOP;
    for line in &page.lines {
        text(layer, &fonts.regular, line, 10.0, MARGIN, y);
        y += LINE_HEIGHT;
    }

    if let Some(table) = &page.table {
        draw_table(layer, fonts, table, y + 2.0);
    }

    text(layer, &fonts.regular, &letterhead.bank, 8.0, MARGIN, 280.0);
    let label = if document.pages.is_empty() {
        format!("Page {} of {}", page_number, page_total)
    } else {
        document.page_label(page_number)
    };
    centered(layer, &fonts.regular, &label, 8.0, 290.0);
}

fn draw_table(layer: &PdfLayerReference, fonts: &Fonts, table: &Table, top: f32) {
    let columns = table.head.len().max(1);
    let width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f32;
    let column_x = |column: usize| MARGIN + width * column as f32;

    let mut y = top + LINE_HEIGHT;
    for (column, heading) in table.head.iter().enumerate() {
        text(layer, &fonts.bold, heading, 9.0, column_x(column), y);
    }
    rule(layer, y + 2.0);

    for row in &table.body {
        y += LINE_HEIGHT;
        for (column, cell) in row.iter().enumerate() {
            text(layer, &fonts.regular, cell, 9.0, column_x(column), y);
        }
    }

    if !table.foot.is_empty() {
        rule(layer, y + 2.0);
        // Footer values sit under the last column, labels just before it
        let value_x = column_x(columns - 1);
        let label_x = column_x(columns.saturating_sub(2));
        for (label, value) in &table.foot {
            y += LINE_HEIGHT;
            text(layer, &fonts.bold, label, 9.0, label_x, y);
            text(layer, &fonts.bold, value, 9.0, value_x, y);
        }
    }
}

fn text(layer: &PdfLayerReference, font: &IndirectFontRef, value: &str, size: f32, x: f32, y: f32) {
    layer.use_text(value, size, Mm(x), Mm(PAGE_HEIGHT - y), font);
}

fn centered(layer: &PdfLayerReference, font: &IndirectFontRef, value: &str, size: f32, y: f32) {
    let estimated = value.chars().count() as f32 * size * GLYPH_WIDTH * MM_PER_PT;
    let x = ((PAGE_WIDTH - estimated) / 2.0).max(MARGIN);
    text(layer, font, value, size, x, y);
}

fn rule(layer: &PdfLayerReference, y: f32) {
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(PAGE_HEIGHT - y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(PAGE_HEIGHT - y)), false),
        ],
        is_closed: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::report::Letterhead;

    fn letterhead() -> Letterhead {
        Letterhead {
            name: "JAISWAL SALES".to_string(),
            address: "Tejgadh".to_string(),
            gstin: "24AAMFJ3444P1ZW".to_string(),
            pan: "AAMFJ3444P".to_string(),
            contact: "8401772172".to_string(),
            bank: "State Bank Of India".to_string(),
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let document = ReportDocument {
            title: "Bill for Patel Stores".to_string(),
            file_name: "bill-Patel Stores-2024-01-10.pdf".to_string(),
            letterhead: letterhead(),
            pages: vec![Page {
                title: "Bill for Patel Stores".to_string(),
                lines: vec!["Date: 2024-01-10".to_string()],
                table: Some(Table {
                    head: vec!["Item".to_string(), "Qty".to_string()],
                    body: vec![vec!["Rice".to_string(), "10".to_string()]],
                    foot: vec![("Grand Total".to_string(), "Rs. 525.00".to_string())],
                }),
            }],
        };

        let bytes = render(&document).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_document() {
        let document = ReportDocument {
            title: "Overall Summary for today".to_string(),
            file_name: "summary-today-2024-01-10.pdf".to_string(),
            letterhead: letterhead(),
            pages: Vec::new(),
        };
        assert!(render(&document).unwrap().starts_with(b"%PDF"));
    }
}
