use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, Utc};
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::models::Item;

#[derive(Debug)]
pub enum RenderError {
    /// QR symbol construction failed (payload too long, bad characters).
    Qr(qrcode::types::QrError),
    Image(image::ImageError),
    EmptyPayload,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Qr(e) => write!(f, "QR encoding failed: {e:?}"),
            RenderError::Image(e) => write!(f, "image encoding failed: {e}"),
            RenderError::EmptyPayload => write!(f, "item has an empty unique id"),
        }
    }
}

/// Module matrix of an encoded QR symbol, row-major.
#[derive(Debug, Clone)]
pub struct QrMatrix {
    pub width: usize,
    pub modules: Vec<bool>,
}

impl QrMatrix {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }
}

/// Fixed two-region label layout for one item. Left region: branding header,
/// QR with centered logo knockout, property number strip. Right region:
/// ordered key/value rows plus a signature line. A DO NOT REMOVE banner spans
/// both regions in every delivery form.
#[derive(Debug, Clone)]
pub struct LabelDocument {
    pub qr_payload: String,
    pub qr: QrMatrix,
    pub property_no: String,
    pub description: String,
    pub model_number: String,
    pub serial_number: String,
    pub acquisition_date: String,
    pub acquisition_cost: String,
    pub accountable: String,
}

/// Deterministically renders one item into its label document.
///
/// The QR payload is the raw `unique_id`, encoded at the High error
/// correction tier: the printed layout overlays a logo on the symbol center,
/// which consumes redundancy. Failure is reported per item so batch callers
/// can skip and continue.
pub fn render(item: &Item) -> Result<LabelDocument, RenderError> {
    if item.unique_id.trim().is_empty() {
        return Err(RenderError::EmptyPayload);
    }

    let code = QrCode::with_error_correction_level(item.unique_id.as_bytes(), EcLevel::H)
        .map_err(RenderError::Qr)?;
    let qr = QrMatrix {
        width: code.width(),
        modules: code.to_colors().iter().map(|c| *c == Color::Dark).collect(),
    };

    let description = match item.description.as_deref() {
        Some(d) if !d.is_empty() => format!("{} - {}", item.name, d),
        _ => item.name.clone(),
    };

    let serial = item
        .serial_number
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("N/A")
        .to_string();

    Ok(LabelDocument {
        qr_payload: item.unique_id.clone(),
        qr,
        property_no: property_no(item),
        description,
        model_number: serial.clone(),
        serial_number: serial,
        acquisition_date: format_date(item.acquisition_date.as_deref()),
        acquisition_cost: format_currency(item.acquisition_cost),
        accountable: item
            .end_user
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("N/A")
            .to_string(),
    })
}

/// Property number shown on the label footer; falls back to the scannable id.
pub fn property_no(item: &Item) -> String {
    item.property_number
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&item.unique_id)
        .to_string()
}

/// `₱` prefix, thousands grouping, exactly two fraction digits. Missing or
/// zero amounts render as "N/A".
pub fn format_currency(amount: Option<f64>) -> String {
    match amount {
        Some(v) if v > 0.0 => format!("₱{}", group_thousands(v)),
        _ => "N/A".to_string(),
    }
}

fn group_thousands(v: f64) -> String {
    let s = format!("{v:.2}");
    let (int_part, frac_part) = s.split_once('.').expect("two fraction digits");
    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped}.{frac_part}")
}

/// `DD-MM-YYYY`, or "N/A" for missing/unparseable dates. Accepts the stored
/// `YYYY-MM-DD` form as well as full RFC 3339 timestamps.
pub fn format_date(date: Option<&str>) -> String {
    let Some(raw) = date.filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%d-%m-%Y").to_string();
    }
    match raw.parse::<DateTime<Utc>>() {
        Ok(dt) => dt.format("%d-%m-%Y").to_string(),
        Err(_) => "N/A".to_string(),
    }
}

/// PNG-encode the QR matrix with a quiet-zone margin, in whole modules.
pub fn qr_png(qr: &QrMatrix, scale: u32, margin: u32) -> Result<Vec<u8>, RenderError> {
    let scale = scale.max(1);
    let total = (qr.width as u32 + margin * 2) * scale;
    let img = GrayImage::from_fn(total, total, |x, y| {
        let mx = (x / scale) as i64 - margin as i64;
        let my = (y / scale) as i64 - margin as i64;
        let dark = mx >= 0
            && my >= 0
            && qr.is_dark(mx as usize, my as usize);
        if dark { Luma([0u8]) } else { Luma([255u8]) }
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(RenderError::Image)?;
    Ok(buf.into_inner())
}

/// Data URI for embedding the QR image in print/preview documents.
pub fn qr_data_uri(doc: &LabelDocument) -> Result<String, RenderError> {
    let png = qr_png(&doc.qr, 6, 1)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}
