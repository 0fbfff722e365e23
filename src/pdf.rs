// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Minimal tabular PDF layout on top of printpdf's builtin fonts.

use chrono::{DateTime, Utc};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use std::io::BufWriter;

use crate::error::ExportError;

// A4 landscape
const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MARGIN: f32 = 12.0;
const ROW_H: f32 = 5.5;
const BODY_PT: f32 = 8.0;
/// Rough Helvetica advance at 8pt, used to clip cell text.
const CHAR_MM: f32 = 1.6;

pub struct Column {
    pub title: &'static str,
    pub width: f32,
}

pub const fn col(title: &'static str, width: f32) -> Column {
    Column { title, width }
}

pub struct TableSection {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    /// Begin on a fresh page rather than below the previous section.
    pub new_page: bool,
}

struct PageWriter<'d> {
    doc: &'d PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
        self.pages += 1;
    }

    fn ensure_room(&mut self, needed: f32) -> bool {
        if self.y - needed < MARGIN {
            self.new_page();
            return true;
        }
        false
    }

    fn text(&self, s: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(s, size, Mm(x), Mm(self.y), font);
    }

    fn rule(&self) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(self.y)), false),
                (Point::new(Mm(PAGE_W - MARGIN), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }

    fn header_row(&mut self, columns: &[Column]) {
        let mut x = MARGIN;
        for c in columns {
            self.text(c.title, BODY_PT, x, true);
            x += c.width;
        }
        self.y -= 1.8;
        self.rule();
        self.y -= ROW_H - 1.8;
    }

    fn section(&mut self, s: &TableSection) {
        if s.new_page && self.y < PAGE_H - MARGIN - 30.0 {
            self.new_page();
        }
        self.ensure_room(ROW_H * 3.0);
        self.text(&s.title, 12.0, MARGIN, true);
        self.y -= ROW_H * 1.4;
        self.header_row(&s.columns);
        if s.rows.is_empty() {
            self.text("(no records)", BODY_PT, MARGIN, false);
            self.y -= ROW_H;
        }
        for row in &s.rows {
            if self.ensure_room(ROW_H) {
                self.text(&format!("{} (continued)", s.title), 10.0, MARGIN, true);
                self.y -= ROW_H * 1.2;
                self.header_row(&s.columns);
            }
            let mut x = MARGIN;
            for (cell, c) in row.iter().zip(&s.columns) {
                self.text(&clip(cell, c.width), BODY_PT, x, false);
                x += c.width;
            }
            self.y -= ROW_H;
        }
        self.y -= ROW_H;
    }
}

fn clip(s: &str, width_mm: f32) -> String {
    let max = ((width_mm - 1.5) / CHAR_MM).max(1.0) as usize;
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(2)).collect();
    out.push_str("..");
    out
}

/// Cover title and timestamp, then each section. The whole document is built in
/// memory; nothing touches disk here.
pub fn render(
    title: &str,
    generated_at: DateTime<Utc>,
    sections: &[TableSection],
) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let layer = doc.get_page(page1).get_layer(layer1);
    let mut w = PageWriter {
        doc: &doc,
        layer,
        font,
        bold,
        y: PAGE_H - MARGIN - 6.0,
        pages: 1,
    };
    w.text(title, 20.0, MARGIN, true);
    w.y -= 8.0;
    w.text(
        &format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
        10.0,
        MARGIN,
        false,
    );
    w.y -= 4.0;
    w.rule();
    w.y -= 10.0;

    for s in sections {
        w.section(s);
    }
    tracing::debug!(pages = w.pages, "pdf laid out");

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keeps_short_text_and_marks_long_text() {
        assert_eq!(clip("Guppy", 30.0), "Guppy");
        let long = clip(&"x".repeat(100), 20.0);
        assert!(long.ends_with(".."));
        assert!(long.chars().count() < 100);
    }
}
