//! Font metrics and glyph generation for the preview rasterizer.
//!
//! Uses the Spleen bitmap font family. The raster is produced at 2x
//! oversampling of a 96 dpi layout, so the 12×24 face comes out at body
//! size (~9 pt on paper) and the 8×16 face at caption size; headings use
//! integer scaling of the body face. Bold is a one-pixel double strike.

use spleen_font::{PSF2Font, FONT_12X24, FONT_8X16};

/// Type roles used by the preview, each mapping to a Spleen face and an
/// integer scale at the fixed raster resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    /// 8×16 — table cells, meta labels, fine print.
    Caption,
    /// 12×24 — body text, party names, totals.
    Body,
    /// 12×24 scaled 2x — section headings and the grand total figure.
    Heading,
}

/// Pixel metrics for a face.
#[derive(Debug, Clone, Copy)]
pub struct FaceMetrics {
    pub char_width: usize,
    pub char_height: usize,
}

impl Face {
    pub fn metrics(self) -> FaceMetrics {
        match self {
            Face::Caption => FaceMetrics {
                char_width: 8,
                char_height: 16,
            },
            Face::Body => FaceMetrics {
                char_width: 12,
                char_height: 24,
            },
            Face::Heading => FaceMetrics {
                char_width: 24,
                char_height: 48,
            },
        }
    }

    /// Line height including leading.
    pub fn line_height(self) -> usize {
        let m = self.metrics();
        m.char_height + m.char_height / 4
    }

    /// Width of a string in pixels.
    pub fn text_width(self, text: &str) -> usize {
        text.chars().count() * self.metrics().char_width
    }

    /// Number of characters that fit into `width` pixels.
    pub fn chars_that_fit(self, width: usize) -> usize {
        width / self.metrics().char_width
    }
}

/// Generate a glyph bitmap for a character.
///
/// Returns `char_width * char_height` bytes, each 0 (transparent) or 1
/// (ink). Unknown characters render as a box outline.
pub fn generate_glyph(face: Face, ch: char) -> Vec<u8> {
    let metrics = face.metrics();
    let mut glyph = vec![0u8; metrics.char_width * metrics.char_height];
    let utf8 = ch.to_string();

    match face {
        Face::Caption => {
            let mut spleen = PSF2Font::new(FONT_8X16).unwrap();
            if let Some(rows) = spleen.glyph_for_utf8(utf8.as_bytes()) {
                for (y, row) in rows.enumerate() {
                    for (x, on) in row.enumerate() {
                        let idx = y * metrics.char_width + x;
                        if on && idx < glyph.len() {
                            glyph[idx] = 1;
                        }
                    }
                }
            } else {
                draw_box(&mut glyph, metrics.char_width, metrics.char_height);
            }
        }
        Face::Body => {
            let mut spleen = PSF2Font::new(FONT_12X24).unwrap();
            if let Some(rows) = spleen.glyph_for_utf8(utf8.as_bytes()) {
                for (y, row) in rows.enumerate() {
                    for (x, on) in row.enumerate() {
                        let idx = y * metrics.char_width + x;
                        if on && idx < glyph.len() {
                            glyph[idx] = 1;
                        }
                    }
                }
            } else {
                draw_box(&mut glyph, metrics.char_width, metrics.char_height);
            }
        }
        Face::Heading => {
            // Render the 12x24 face and scale 2x nearest-neighbor.
            let mut spleen = PSF2Font::new(FONT_12X24).unwrap();
            if let Some(rows) = spleen.glyph_for_utf8(utf8.as_bytes()) {
                let mut base = vec![0u8; 12 * 24];
                for (y, row) in rows.enumerate() {
                    for (x, on) in row.enumerate() {
                        let idx = y * 12 + x;
                        if on && idx < base.len() {
                            base[idx] = 1;
                        }
                    }
                }
                scale_bitmap(&base, 12, 24, &mut glyph, metrics.char_width, metrics.char_height);
            } else {
                draw_box(&mut glyph, metrics.char_width, metrics.char_height);
            }
        }
    }

    glyph
}

/// Scale a bitmap between dimensions using nearest neighbor.
fn scale_bitmap(src: &[u8], src_w: usize, src_h: usize, dst: &mut [u8], dst_w: usize, dst_h: usize) {
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx * src_w / dst_w;
            let sy = dy * src_h / dst_h;
            let src_idx = sy * src_w + sx;
            let dst_idx = dy * dst_w + dx;
            if src_idx < src.len() && dst_idx < dst.len() {
                dst[dst_idx] = src[src_idx];
            }
        }
    }
}

/// Box outline for characters the font cannot represent.
fn draw_box(glyph: &mut [u8], width: usize, height: usize) {
    for x in 0..width {
        glyph[x] = 1;
        glyph[(height - 1) * width + x] = 1;
    }
    for y in 0..height {
        glyph[y * width] = 1;
        glyph[y * width + width - 1] = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_dimensions() {
        assert_eq!(generate_glyph(Face::Caption, 'A').len(), 8 * 16);
        assert_eq!(generate_glyph(Face::Body, 'A').len(), 12 * 24);
        assert_eq!(generate_glyph(Face::Heading, 'A').len(), 24 * 48);
    }

    #[test]
    fn test_known_glyph_has_ink() {
        let glyph = generate_glyph(Face::Body, 'A');
        assert!(glyph.iter().any(|&p| p == 1));
    }

    #[test]
    fn test_space_is_blank() {
        let glyph = generate_glyph(Face::Body, ' ');
        assert!(glyph.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(Face::Body.text_width("Total"), 5 * 12);
        assert_eq!(Face::Caption.chars_that_fit(80), 10);
    }
}
