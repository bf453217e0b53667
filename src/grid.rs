//! # Calibration Grid
//!
//! A ruled coordinate grid used to tune layout catalog entries by eye:
//! merge it over a rendered certificate and read positions straight off
//! the page. Only produced on request, never for production output.

use crate::error::ComposeError;
use crate::font::{FontContext, FontKey};
use crate::model::PageGeometry;
use crate::pdf::{Canvas, PdfWriter};

/// Offset of each coordinate label from the page edge it runs along.
const LABEL_INSET: f64 = 5.0;

/// Smallest accepted spacing between rules, in points.
pub const MIN_GRID_STEP: f64 = 1.0;

/// Draw a rule every `step` points in both directions, each labeled with
/// its coordinate.
pub fn make_grid(
    geometry: PageGeometry,
    step: f64,
    font_size: f64,
    fonts: &FontContext,
) -> Result<Vec<u8>, ComposeError> {
    if !(step.is_finite() && step >= MIN_GRID_STEP) {
        return Err(ComposeError::RenderError(format!(
            "grid step must be at least {}pt, got {}",
            MIN_GRID_STEP, step
        )));
    }

    let font = FontKey::helvetica();
    let mut canvas = Canvas::new(geometry);

    for x in ticks(geometry.width, step) {
        canvas.text(&coordinate_label(x), x, LABEL_INSET, &font, font_size);
        canvas.line(x, 0.0, x, geometry.height);
    }
    for y in ticks(geometry.height, step) {
        canvas.text(&coordinate_label(y), LABEL_INSET, y, &font, font_size);
        canvas.line(0.0, y, geometry.width, y);
    }

    PdfWriter::new().write(&canvas, fonts)
}

/// Multiples of `step` from 0 up to (not including) the page extent,
/// truncated to whole points.
fn ticks(extent: f64, step: f64) -> impl Iterator<Item = f64> {
    let limit = extent.trunc().max(0.0);
    let count = (limit / step).ceil() as usize;
    (0..count).map(move |i| i as f64 * step)
}

fn coordinate_label(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.1}", v)
    }
}
