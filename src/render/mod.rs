//! # Preview Rasterizer
//!
//! Paints a style-inlined preview
//! ([`ResolvedPreview`](crate::preview::style::ResolvedPreview)) into an
//! RGB raster at the export pipeline's fixed geometry: 210 mm wide,
//! 297 mm minimum height, 12 mm padding, opaque white background, all at
//! 2x oversampling (192 dpi) for print quality.
//!
//! ## Architecture
//!
//! ```text
//! ResolvedPreview ─┐
//!                  ├─► Rasterizer::render ─► RgbImage ─► to_png / export::pdf
//! letterhead RGB ──┘
//! ```
//!
//! The canvas starts at the A4 minimum height and grows as blocks are
//! painted; documents taller than one page come out as a taller raster,
//! which the page-fit stage then scales down. The rasterizer only ever
//! sees resolved blocks — it has no access to the theme.

pub mod font;
pub mod letterhead;

use image::{Rgb, RgbImage};

use crate::error::FolioError;
use crate::export::pagefit;
use crate::preview::style::{Color, ResolvedBlock, ResolvedPreview};
use crate::preview::{Align, PartyBlock, Tone, TotalsLineKind};
use font::Face;

/// Convert a CSS design pixel (96 dpi) to raster pixels at 2x.
fn px(css: u32) -> u32 {
    (css as f32 * pagefit::OVERSAMPLE) as u32
}

impl Color {
    fn pixel(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

/// Painter for resolved preview blocks.
pub struct Rasterizer {
    width: u32,
    padding: u32,
    canvas: RgbImage,
    cursor: u32,
    page: Rgb<u8>,
}

impl Rasterizer {
    /// New rasterizer at the fixed page geometry.
    pub fn new(page: Color) -> Self {
        let width = pagefit::page_width_px();
        let min_height = pagefit::min_page_height_px();
        let page = page.pixel();
        Self {
            width,
            padding: pagefit::padding_px(),
            canvas: RgbImage::from_pixel(width, min_height, page),
            cursor: pagefit::padding_px(),
            page,
        }
    }

    fn content_left(&self) -> u32 {
        self.padding
    }

    fn content_width(&self) -> u32 {
        self.width - 2 * self.padding
    }

    /// Grow the canvas so rows `0..needed` exist, painting new rows in
    /// the page color.
    fn ensure_height(&mut self, needed: u32) {
        if needed <= self.canvas.height() {
            return;
        }
        let new_height = needed.max(self.canvas.height() + px(200));
        let mut grown = RgbImage::from_pixel(self.width, new_height, self.page);
        image::imageops::overlay(&mut grown, &self.canvas, 0, 0);
        self.canvas = grown;
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        self.ensure_height(y + h);
        let pixel = color.pixel();
        for yy in y..(y + h).min(self.canvas.height()) {
            for xx in x..(x + w).min(self.width) {
                self.canvas.put_pixel(xx, yy, pixel);
            }
        }
    }

    fn stroke_rect(&mut self, x: u32, y: u32, w: u32, h: u32, thickness: u32, color: Color) {
        self.fill_rect(x, y, w, thickness, color);
        self.fill_rect(x, y + h - thickness, w, thickness, color);
        self.fill_rect(x, y, thickness, h, color);
        self.fill_rect(x + w - thickness, y, thickness, h, color);
    }

    fn hline(&mut self, x: u32, y: u32, w: u32, thickness: u32, color: Color) {
        self.fill_rect(x, y, w, thickness, color);
    }

    /// Draw one line of text. Bold is a one-pixel double strike.
    fn draw_text(&mut self, x: u32, y: u32, text: &str, face: Face, color: Color, bold: bool) {
        let metrics = face.metrics();
        self.ensure_height(y + metrics.char_height as u32);
        let pixel = color.pixel();
        let mut cx = x;
        for ch in text.chars() {
            if cx + metrics.char_width as u32 > self.width {
                break;
            }
            let glyph = font::generate_glyph(face, ch);
            for gy in 0..metrics.char_height {
                for gx in 0..metrics.char_width {
                    if glyph[gy * metrics.char_width + gx] == 1 {
                        let yy = y + gy as u32;
                        let xx = cx + gx as u32;
                        if xx < self.width && yy < self.canvas.height() {
                            self.canvas.put_pixel(xx, yy, pixel);
                            if bold && xx + 1 < self.width {
                                self.canvas.put_pixel(xx + 1, yy, pixel);
                            }
                        }
                    }
                }
            }
            cx += metrics.char_width as u32;
        }
    }

    /// Draw text clipped to `max_width`, aligned within it.
    fn draw_text_in(
        &mut self,
        x: u32,
        y: u32,
        max_width: u32,
        text: &str,
        face: Face,
        color: Color,
        bold: bool,
        align: Align,
    ) {
        let fit = face.chars_that_fit(max_width as usize);
        let clipped: String = text.chars().take(fit).collect();
        let text_w = face.text_width(&clipped) as u32;
        let x = match align {
            Align::Left => x,
            Align::Right => x + max_width.saturating_sub(text_w),
        };
        self.draw_text(x, y, &clipped, face, color, bold);
    }

    /// Draw wrapped text (newlines preserved), returning the y below the
    /// last line.
    fn draw_wrapped(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        text: &str,
        face: Face,
        color: Color,
    ) -> u32 {
        let per_line = face.chars_that_fit(width as usize).max(1);
        let mut cy = y;
        for paragraph in text.split('\n') {
            if paragraph.is_empty() {
                cy += face.line_height() as u32;
                continue;
            }
            let chars: Vec<char> = paragraph.chars().collect();
            for chunk in chars.chunks(per_line) {
                let line: String = chunk.iter().collect();
                self.draw_text(x, cy, &line, face, color, false);
                cy += face.line_height() as u32;
            }
        }
        cy
    }

    /// Paint every block and return the finished raster, trimmed to the
    /// content height but never below the A4 minimum.
    pub fn render(mut self, preview: &ResolvedPreview, letterhead: Option<&RgbImage>) -> RgbImage {
        for block in &preview.blocks {
            self.render_block(block, letterhead);
        }

        let final_height = (self.cursor + self.padding).max(pagefit::min_page_height_px());
        self.ensure_height(final_height);
        image::imageops::crop_imm(&self.canvas, 0, 0, self.width, final_height).to_image()
    }

    fn render_block(&mut self, block: &ResolvedBlock, letterhead: Option<&RgbImage>) {
        match block {
            ResolvedBlock::Letterhead { title, title_ink } => {
                self.render_letterhead(title, *title_ink, letterhead)
            }
            ResolvedBlock::MetaPanel {
                rows,
                fill,
                divider,
                label_ink,
                value_ink,
            } => self.render_meta_panel(rows, *fill, *divider, *label_ink, *value_ink),
            ResolvedBlock::PartyPanel {
                parties,
                border,
                heading_ink,
                primary_ink,
                muted_ink,
                placeholder_ink,
            } => self.render_party_panel(
                parties,
                *border,
                *heading_ink,
                *primary_ink,
                *muted_ink,
                *placeholder_ink,
            ),
            ResolvedBlock::ItemTable {
                columns,
                rows,
                header_fill,
                header_ink,
                header_border,
                row_fill_even,
                row_fill_odd,
                cell_border,
                ink,
            } => self.render_item_table(
                columns,
                rows,
                *header_fill,
                *header_ink,
                *header_border,
                *row_fill_even,
                *row_fill_odd,
                *cell_border,
                *ink,
            ),
            ResolvedBlock::TotalsPanel {
                lines,
                row_fill,
                row_border,
                label_ink,
                value_ink,
                discount_ink,
                grand_fill,
                grand_ink,
            } => self.render_totals_panel(
                lines,
                *row_fill,
                *row_border,
                *label_ink,
                *value_ink,
                *discount_ink,
                *grand_fill,
                *grand_ink,
            ),
            ResolvedBlock::NotePanel {
                title,
                body,
                fill,
                border,
                title_ink,
                body_ink,
            } => self.render_note_panel(title, body, *fill, *border, *title_ink, *body_ink),
            ResolvedBlock::Footer { lines, rule, ink } => self.render_footer(lines, *rule, *ink),
            ResolvedBlock::SignatureRow { labels, ink, rule } => {
                self.render_signature_row(labels, *ink, *rule)
            }
        }
    }

    fn render_letterhead(&mut self, title: &str, title_ink: Color, letterhead: Option<&RgbImage>) {
        let Some(image) = letterhead else {
            // No letterhead asset configured: draw the document-type
            // title where the banner would sit.
            self.draw_text(self.content_left(), self.cursor, title, Face::Heading, title_ink, true);
            self.cursor += Face::Heading.line_height() as u32 + px(32);
            return;
        };
        let target_w = self.content_width();
        let target_h =
            (image.height() as u64 * target_w as u64 / image.width().max(1) as u64) as u32;
        let scaled = image::imageops::resize(
            image,
            target_w,
            target_h.max(1),
            image::imageops::FilterType::Triangle,
        );
        self.ensure_height(self.cursor + scaled.height());
        let x = self.content_left() as i64;
        let y = self.cursor as i64;
        image::imageops::overlay(&mut self.canvas, &scaled, x, y);
        self.cursor += scaled.height() + px(32);
    }

    fn render_meta_panel(
        &mut self,
        rows: &[Vec<crate::preview::MetaCell>],
        fill: Color,
        divider: Color,
        label_ink: Color,
        value_ink: Color,
    ) {
        let pad = px(16);
        let row_gap = px(12);
        let label_gap = px(4);
        let line_h = Face::Caption.line_height() as u32;
        let row_h = line_h + label_gap + line_h;

        let panel_h =
            2 * pad + rows.len() as u32 * row_h + rows.len().saturating_sub(1) as u32 * (2 * row_gap);
        let x0 = self.content_left();
        self.fill_rect(x0, self.cursor, self.content_width(), panel_h, fill);

        let col_w = (self.content_width() - 2 * pad) / 3;
        let mut y = self.cursor + pad;
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                let rule_y = y - row_gap;
                self.hline(x0 + pad, rule_y, self.content_width() - 2 * pad, px(1), divider);
            }
            for (c, cell) in row.iter().enumerate().take(3) {
                let cx = x0 + pad + c as u32 * col_w;
                self.draw_text_in(cx, y, col_w, &cell.label, Face::Caption, label_ink, true, Align::Left);
                self.draw_text_in(
                    cx,
                    y + line_h + label_gap,
                    col_w,
                    &cell.value,
                    Face::Caption,
                    value_ink,
                    false,
                    Align::Left,
                );
            }
            y += row_h + 2 * row_gap;
        }

        self.cursor += panel_h + px(24);
    }

    fn render_party_panel(
        &mut self,
        parties: &[PartyBlock],
        border: Color,
        heading_ink: Color,
        primary_ink: Color,
        muted_ink: Color,
        placeholder_ink: Color,
    ) {
        let pad = px(16);
        let line_h = Face::Caption.line_height() as u32;
        let heading_gap = px(8);

        let tallest = parties
            .iter()
            .map(|p| p.lines.len() as u32 * line_h)
            .max()
            .unwrap_or(0);
        let panel_h = 2 * pad + line_h + heading_gap + tallest;

        let x0 = self.content_left();
        self.stroke_rect(x0, self.cursor, self.content_width(), panel_h, px(2), border);

        let col_w = (self.content_width() - 2 * pad) / 2;
        for (c, party) in parties.iter().enumerate().take(2) {
            let cx = x0 + pad + c as u32 * col_w;
            let mut y = self.cursor + pad;
            self.draw_text(cx, y, &party.heading.to_uppercase(), Face::Caption, heading_ink, true);
            y += line_h + heading_gap;
            for (tone, line) in &party.lines {
                let (ink, bold) = match tone {
                    Tone::Primary => (primary_ink, true),
                    Tone::Muted => (muted_ink, false),
                    Tone::Placeholder => (placeholder_ink, false),
                };
                self.draw_text_in(cx, y, col_w - pad, line, Face::Caption, ink, bold, Align::Left);
                y += line_h;
            }
        }

        self.cursor += panel_h + px(24);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_item_table(
        &mut self,
        columns: &[crate::preview::Column],
        rows: &[Vec<crate::preview::CellText>],
        header_fill: Color,
        header_ink: Color,
        header_border: Color,
        row_fill_even: Color,
        row_fill_odd: Color,
        cell_border: Color,
        ink: Color,
    ) {
        let pad = px(12);
        let line_h = Face::Caption.line_height() as u32;
        let row_h = line_h + 2 * pad;
        let x0 = self.content_left();
        let table_w = self.content_width();

        // Column pixel edges from the width fractions.
        let mut edges = vec![x0];
        let mut acc = 0.0f32;
        for column in columns {
            acc += column.width;
            edges.push(x0 + (table_w as f32 * acc).round() as u32);
        }

        // Header row
        self.fill_rect(x0, self.cursor, table_w, row_h, header_fill);
        for (c, column) in columns.iter().enumerate() {
            let cell_x = edges[c];
            let cell_w = edges[c + 1] - cell_x;
            self.stroke_rect(cell_x, self.cursor, cell_w, row_h, px(1), header_border);
            self.draw_text_in(
                cell_x + pad,
                self.cursor + pad,
                cell_w.saturating_sub(2 * pad),
                &column.title,
                Face::Caption,
                header_ink,
                true,
                column.align,
            );
        }
        self.cursor += row_h;

        // Body rows
        for (r, row) in rows.iter().enumerate() {
            let fill = if r % 2 == 0 { row_fill_even } else { row_fill_odd };
            self.fill_rect(x0, self.cursor, table_w, row_h, fill);
            for (c, column) in columns.iter().enumerate() {
                let cell_x = edges[c];
                let cell_w = edges[c + 1] - cell_x;
                self.stroke_rect(cell_x, self.cursor, cell_w, row_h, px(1), cell_border);
                if let Some(cell) = row.get(c) {
                    self.draw_text_in(
                        cell_x + pad,
                        self.cursor + pad,
                        cell_w.saturating_sub(2 * pad),
                        &cell.text,
                        Face::Caption,
                        ink,
                        cell.emphasis,
                        column.align,
                    );
                }
            }
            self.cursor += row_h;
        }

        self.cursor += px(24);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_totals_panel(
        &mut self,
        lines: &[crate::preview::TotalsLine],
        row_fill: Color,
        row_border: Color,
        label_ink: Color,
        value_ink: Color,
        discount_ink: Color,
        grand_fill: Color,
        grand_ink: Color,
    ) {
        let box_w = px(320).min(self.content_width());
        let x0 = self.content_left() + self.content_width() - box_w;
        let pad_x = px(16);
        let gap = px(8);

        for line in lines {
            match line.kind {
                TotalsLineKind::Entry | TotalsLineKind::Discount => {
                    let line_h = Face::Caption.line_height() as u32;
                    let row_h = line_h + 2 * px(12);
                    self.fill_rect(x0, self.cursor, box_w, row_h, row_fill);
                    self.hline(x0, self.cursor + row_h - px(1), box_w, px(1), row_border);
                    let ink = if line.kind == TotalsLineKind::Discount {
                        discount_ink
                    } else {
                        value_ink
                    };
                    self.draw_text(x0 + pad_x, self.cursor + px(12), &line.label, Face::Caption, label_ink, false);
                    self.draw_text_in(
                        x0 + pad_x,
                        self.cursor + px(12),
                        box_w - 2 * pad_x,
                        &line.value,
                        Face::Caption,
                        ink,
                        true,
                        Align::Right,
                    );
                    self.cursor += row_h + gap;
                }
                TotalsLineKind::Grand => {
                    let line_h = Face::Body.line_height() as u32;
                    let row_h = line_h + 2 * px(16);
                    self.fill_rect(x0, self.cursor, box_w, row_h, grand_fill);
                    self.draw_text(x0 + pad_x, self.cursor + px(16), &line.label, Face::Body, grand_ink, true);
                    self.draw_text_in(
                        x0 + pad_x,
                        self.cursor + px(16),
                        box_w - 2 * pad_x,
                        &line.value,
                        Face::Body,
                        grand_ink,
                        true,
                        Align::Right,
                    );
                    self.cursor += row_h + gap;
                }
            }
        }

        self.cursor += px(16);
    }

    fn render_note_panel(
        &mut self,
        title: &str,
        body: &str,
        fill: Color,
        border: Color,
        title_ink: Color,
        body_ink: Color,
    ) {
        let pad = px(16);
        let line_h = Face::Caption.line_height() as u32;
        let wrap_w = self.content_width() - 2 * pad;

        // Body height: newlines preserved, long lines wrapped by width.
        let per_line = Face::Caption.chars_that_fit(wrap_w as usize).max(1);
        let body_lines: u32 = body
            .split('\n')
            .map(|p| (p.chars().count().div_ceil(per_line)).max(1) as u32)
            .sum();
        let panel_h = 2 * pad + line_h + px(8) + body_lines * line_h;

        let x0 = self.content_left();
        self.fill_rect(x0, self.cursor, self.content_width(), panel_h, fill);
        self.stroke_rect(x0, self.cursor, self.content_width(), panel_h, px(1), border);
        self.draw_text(x0 + pad, self.cursor + pad, title, Face::Caption, title_ink, true);
        self.draw_wrapped(
            x0 + pad,
            self.cursor + pad + line_h + px(8),
            wrap_w,
            body,
            Face::Caption,
            body_ink,
        );

        self.cursor += panel_h + px(24);
    }

    fn render_footer(&mut self, lines: &[String], rule: Color, ink: Color) {
        let line_h = Face::Caption.line_height() as u32;
        let x0 = self.content_left();
        self.hline(x0, self.cursor, self.content_width(), px(2), rule);
        let mut y = self.cursor + px(16);
        for (i, line) in lines.iter().enumerate() {
            let text_w = Face::Caption.text_width(line) as u32;
            let cx = x0 + self.content_width().saturating_sub(text_w) / 2;
            self.draw_text(cx, y, line, Face::Caption, ink, i == 0);
            y += line_h;
        }
        self.cursor = y + px(8);
    }

    fn render_signature_row(&mut self, labels: &[String], ink: Color, rule: Color) {
        self.cursor += px(48);
        let line_h = Face::Caption.line_height() as u32;
        let box_h = px(64);
        let gap = px(16);
        let col_w = (self.content_width() - gap) / labels.len().max(1) as u32;
        let x0 = self.content_left();

        for (c, label) in labels.iter().enumerate() {
            let cx = x0 + c as u32 * (col_w + gap);
            self.draw_text(cx, self.cursor, label, Face::Caption, ink, true);
            let rule_y = self.cursor + line_h + box_h;
            self.hline(cx, rule_y, col_w, px(1), rule);
        }

        self.cursor += line_h + box_h + px(16);
    }
}

/// Render a resolved preview to the final raster.
pub fn render_preview(preview: &ResolvedPreview, letterhead: Option<&RgbImage>) -> RgbImage {
    Rasterizer::new(preview.page).render(preview, letterhead)
}

/// Encode a raster as PNG bytes (used by the preview endpoints).
pub fn to_png(image: &RgbImage) -> Result<Vec<u8>, FolioError> {
    use image::ImageEncoder;
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| FolioError::Render(format!("PNG encoding failed: {e}")))?;
    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentKind, Invoice, InvoiceItem};
    use crate::preview::{self, style};

    fn raster_for(document: &Document) -> RgbImage {
        let tree = preview::build(document);
        let resolved = style::resolve(&tree, &style::Theme::default());
        render_preview(&resolved, None)
    }

    #[test]
    fn test_raster_has_fixed_page_geometry() {
        let raster = raster_for(&Document::new(DocumentKind::Invoice));
        assert_eq!(raster.width(), pagefit::page_width_px());
        assert!(raster.height() >= pagefit::min_page_height_px());
    }

    #[test]
    fn test_page_background_is_white() {
        let raster = raster_for(&Document::new(DocumentKind::DeliveryOrder));
        assert_eq!(*raster.get_pixel(0, 0), Rgb([255, 255, 255]));
        let bottom = raster.height() - 1;
        assert_eq!(*raster.get_pixel(raster.width() - 1, bottom), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_long_documents_grow_past_one_page() {
        let mut inv = Invoice::default();
        for i in 0..120 {
            let mut item = InvoiceItem::new(i);
            item.description = format!("Line {i}");
            inv.items.push(item);
        }
        let raster = raster_for(&Document::Invoice(inv));
        assert!(raster.height() > pagefit::min_page_height_px());
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let doc = Document::new(DocumentKind::PurchaseOrder);
        let a = raster_for(&doc);
        let b = raster_for(&doc);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_png_encoding() {
        let raster = raster_for(&Document::new(DocumentKind::DeliveryOrder));
        let png = to_png(&raster).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
