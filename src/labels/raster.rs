use image::{ImageFormat, Rgb, RgbImage};

use crate::labels::renderer::{LabelDocument, RenderError};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([51, 51, 51]);
const HEADER_BLUE: Rgb<u8> = Rgb([30, 58, 138]);
const BANNER_BG: Rgb<u8> = Rgb([254, 242, 242]);
const BANNER_RED: Rgb<u8> = Rgb([220, 38, 38]);
const RULE: Rgb<u8> = Rgb([221, 221, 221]);

// Base geometry in layout units; the rasterizer multiplies by `scale`.
const BASE_W: u32 = 400;
const BASE_H: u32 = 280;
const FRAME_PX: u32 = 2;
const LEFT_W: u32 = 180;
const HEADER_H: u32 = 64;
const PROPERTY_H: u32 = 40;
const BANNER_H: u32 = 36;
const INFO_ROWS: u32 = 7;

/// Turns a rendered label document into a flat binary image. This is the
/// seam the ZIP download path goes through; tests substitute failing or
/// counting implementations.
pub trait Rasterizer: Send + Sync {
    fn capture(&self, doc: &LabelDocument) -> Result<Vec<u8>, RenderError>;
}

/// Built-in rasterizer: composes the sticker geometry (frame, header band,
/// QR modules with the centered logo knockout, property strip, info rules,
/// warning banner) into a PNG. Glyph text stays on the print-pipeline side;
/// the raster artifact carries the scannable symbol and the fixed layout.
pub struct PngRasterizer {
    pub scale: u32,
}

impl Default for PngRasterizer {
    fn default() -> Self {
        Self { scale: 2 }
    }
}

impl Rasterizer for PngRasterizer {
    fn capture(&self, doc: &LabelDocument) -> Result<Vec<u8>, RenderError> {
        let s = self.scale.max(1);
        let (w, h) = (BASE_W * s, BASE_H * s);
        let mut img = RgbImage::from_pixel(w, h, WHITE);

        // Outer frame and the column divider.
        fill_rect(&mut img, 0, 0, w, FRAME_PX * s, FRAME);
        fill_rect(&mut img, 0, h - FRAME_PX * s, w, FRAME_PX * s, FRAME);
        fill_rect(&mut img, 0, 0, FRAME_PX * s, h, FRAME);
        fill_rect(&mut img, w - FRAME_PX * s, 0, FRAME_PX * s, h, FRAME);
        fill_rect(&mut img, LEFT_W * s, 0, FRAME_PX * s, h - BANNER_H * s, FRAME);

        // Left region: header band, QR, property strip.
        fill_rect(&mut img, FRAME_PX * s, FRAME_PX * s, (LEFT_W - FRAME_PX) * s, HEADER_H * s, HEADER_BLUE);

        let qr_top = (HEADER_H + FRAME_PX) * s;
        let qr_bottom = (BASE_H - BANNER_H - PROPERTY_H) * s;
        draw_qr(&mut img, doc, FRAME_PX * s, qr_top, LEFT_W * s, qr_bottom - qr_top);

        let strip_y = (BASE_H - BANNER_H - PROPERTY_H) * s;
        fill_rect(&mut img, FRAME_PX * s, strip_y, (LEFT_W - FRAME_PX) * s, s, FRAME);

        // Right region: one hairline per key/value row, signature line last.
        let right_x = (LEFT_W + FRAME_PX + 8) * s;
        let right_w = (BASE_W - LEFT_W - FRAME_PX * 2 - 16) * s;
        let rows_top = (FRAME_PX + 8) * s;
        let rows_h = (BASE_H - BANNER_H - FRAME_PX - 16) * s;
        for row in 1..=INFO_ROWS {
            let y = rows_top + rows_h * row / (INFO_ROWS + 1);
            let color = if row == INFO_ROWS { FRAME } else { RULE };
            fill_rect(&mut img, right_x, y, right_w, s, color);
        }

        // Full-width warning banner.
        let banner_y = (BASE_H - BANNER_H) * s;
        fill_rect(&mut img, 0, banner_y, w, s, FRAME);
        fill_rect(&mut img, FRAME_PX * s, banner_y + s, w - FRAME_PX * 2 * s, (BANNER_H - FRAME_PX) * s - s, BANNER_BG);
        let accent_w = w / 3;
        fill_rect(&mut img, (w - accent_w) / 2, banner_y + (BANNER_H / 2) * s, accent_w, s * 2, BANNER_RED);

        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)
            .map_err(RenderError::Image)?;
        Ok(buf.into_inner())
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let (max_x, max_y) = (img.width(), img.height());
    for py in y..(y + h).min(max_y) {
        for px in x..(x + w).min(max_x) {
            img.put_pixel(px, py, color);
        }
    }
}

/// Scales the module matrix into the given region, centered, with a white
/// circular knockout where the logo sits. Safe at EC level H.
fn draw_qr(img: &mut RgbImage, doc: &LabelDocument, x: u32, y: u32, w: u32, h: u32) {
    let side = w.min(h).saturating_sub(16).max(1);
    let modules = doc.qr.width as u32;
    let module_px = (side / modules).max(1);
    let qr_side = module_px * modules;
    let ox = x + (w - qr_side) / 2;
    let oy = y + (h - qr_side) / 2;

    for my in 0..modules {
        for mx in 0..modules {
            if doc.qr.is_dark(mx as usize, my as usize) {
                fill_rect(img, ox + mx * module_px, oy + my * module_px, module_px, module_px, Rgb([0, 0, 0]));
            }
        }
    }

    let cx = (ox + qr_side / 2) as i64;
    let cy = (oy + qr_side / 2) as i64;
    let r = (qr_side as i64 * 18) / 100;
    for py in (cy - r).max(0)..(cy + r).min(img.height() as i64) {
        for px in (cx - r).max(0)..(cx + r).min(img.width() as i64) {
            let (dx, dy) = (px - cx, py - cy);
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(px as u32, py as u32, WHITE);
            }
        }
    }
}
