//! PDF export of the full record set
//!
//! Landscape A3 document: title block, generation date and record count,
//! an essential-fields summary table with a repeating page header/footer,
//! then one detail table per record. A page break is inserted whenever the
//! remaining vertical space falls below a fixed threshold. The document is
//! rendered fully in memory and written only after generation succeeds.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use super::format::{FormattedRow, DETAIL_COLUMNS, ESSENTIAL_COLUMNS};
use crate::error::Error;
use crate::model::Resident;

/// File name of the PDF artifact
pub const PDF_FILE_NAME: &str = "cadastro-moradores.pdf";

const PAGE_WIDTH: f32 = 420.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
/// Break to a new page when less than this much vertical space remains
const BREAK_THRESHOLD: f32 = 30.0;
const ROW_HEIGHT: f32 = 6.0;

const AGENCY_CAPTION: &str =
    "Cadastro Municipal de Residentes de São José do Vale do Rio Preto";
const FOOTER_CAPTION: &str = "Prefeitura Municipal - Documento Oficial";

/// Rough character budget for a cell at 9pt Helvetica
fn truncate_cell(value: &str, width: f32) -> String {
    let budget = ((width - 2.0) / 1.6).max(1.0) as usize;
    if value.chars().count() <= budget {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(budget.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    y: f32,
    page_number: u32,
}

impl PdfWriter {
    fn new() -> Result<Self, Error> {
        let (doc, page, layer) = PdfDocument::new(
            "Relatório de Cadastro de Moradores",
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Camada 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(Error::export)?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(Error::export)?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut writer = Self {
            doc,
            layer,
            font,
            font_bold,
            y: PAGE_HEIGHT - MARGIN,
            page_number: 1,
        };
        writer.draw_chrome();
        Ok(writer)
    }

    /// Header band and footer, repeated on every page
    fn draw_chrome(&mut self) {
        self.set_color(0.0, 0.2, 0.4);
        self.layer.use_text(
            AGENCY_CAPTION,
            14.0,
            Mm(MARGIN),
            Mm(PAGE_HEIGHT - 10.0),
            &self.font_bold,
        );
        self.rule(PAGE_HEIGHT - 13.0);

        self.set_color(0.4, 0.4, 0.4);
        self.layer.use_text(
            format!("Página {}", self.page_number),
            10.0,
            Mm(MARGIN),
            Mm(8.0),
            &self.font,
        );
        self.layer.use_text(
            FOOTER_CAPTION,
            10.0,
            Mm(PAGE_WIDTH / 2.0 - 35.0),
            Mm(8.0),
            &self.font,
        );

        self.y = PAGE_HEIGHT - 22.0;
    }

    fn set_color(&self, r: f32, g: f32, b: f32) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    fn rule(&self, y: f32) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.2, 0.4, None)));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Camada 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_number += 1;
        self.draw_chrome();
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed < BREAK_THRESHOLD {
            self.new_page();
        }
    }

    fn text(&mut self, value: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer.use_text(value, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, amount: f32) {
        self.y -= amount;
    }

    /// Evenly spaced row of cells across the printable width
    fn table_row(&mut self, values: &[&str], bold: bool) {
        let width = (PAGE_WIDTH - 2.0 * MARGIN) / values.len() as f32;
        for (i, value) in values.iter().enumerate() {
            let x = MARGIN + width * i as f32;
            let cell = truncate_cell(value, width);
            self.text(&cell, 9.0, x, bold);
        }
        self.advance(ROW_HEIGHT);
    }
}

/// Generate the PDF document in memory
fn render(records: &[Resident]) -> Result<Vec<u8>, Error> {
    let mut writer = PdfWriter::new()?;
    let rows: Vec<FormattedRow> = records.iter().map(FormattedRow::from_resident).collect();

    // Title block
    writer.set_color(0.0, 0.2, 0.4);
    writer.text("Relatório de Cadastro de Moradores", 20.0, MARGIN, true);
    writer.advance(10.0);

    writer.set_color(0.4, 0.4, 0.4);
    writer.text(
        &format!("Data de geração: {}", Utc::now().format("%d/%m/%Y")),
        12.0,
        MARGIN,
        false,
    );
    writer.advance(7.0);
    writer.text(
        &format!("Total de registros: {}", rows.len()),
        12.0,
        MARGIN,
        false,
    );
    writer.advance(12.0);

    // Summary table of essential columns
    writer.set_color(0.0, 0.2, 0.4);
    writer.table_row(&ESSENTIAL_COLUMNS, true);
    writer.rule(writer.y + ROW_HEIGHT - 2.0);
    writer.set_color(0.1, 0.1, 0.1);
    for row in &rows {
        writer.ensure_space(ROW_HEIGHT);
        let values: Vec<&str> = ESSENTIAL_COLUMNS.iter().map(|&c| row.value(c)).collect();
        writer.table_row(&values, false);
    }
    writer.advance(8.0);

    // One detail table per record
    for row in &rows {
        let table_height = (DETAIL_COLUMNS.len() + 1) as f32 * ROW_HEIGHT + 10.0;
        writer.ensure_space(table_height);

        writer.set_color(0.0, 0.2, 0.4);
        writer.text(
            &format!("Detalhes do Morador: {}", row.name),
            12.0,
            MARGIN,
            true,
        );
        writer.advance(8.0);

        writer.set_color(0.0, 0.4, 0.8);
        writer.table_row(&["Informação", "Valor"], true);
        writer.set_color(0.1, 0.1, 0.1);
        for column in DETAIL_COLUMNS {
            writer.ensure_space(ROW_HEIGHT);
            writer.table_row(&[column, row.value(column)], false);
        }
        writer.advance(10.0);
    }

    writer.doc.save_to_bytes().map_err(Error::export)
}

/// Export every record; the file is written only after rendering succeeds
pub(super) fn export(records: &[Resident], dir: &Path) -> Result<PathBuf, Error> {
    let bytes = render(records)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(PDF_FILE_NAME);
    fs::write(&path, bytes)?;
    Ok(path)
}
