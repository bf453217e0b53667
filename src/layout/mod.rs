//! # Row Layout
//!
//! Geometry helpers for the signature row: slot positions for a centered
//! row of fixed-width slots, and contain-fitting an image into a slot box.
//!
//! Positions are recomputed from scratch for whatever count is passed in.
//! Callers filter out non-renderable signers first and only then lay out, so
//! a dropped signer never leaves a gap.

/// An axis-aligned box in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// Total width of `n` slots separated by `spacing`.
pub fn row_width(n: usize, slot_width: f64, spacing: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    n as f64 * slot_width + (n - 1) as f64 * spacing
}

/// Left edges of `n` slots centered on `x_center`.
///
/// `layout_row(3, 100.0, 50.0, 400.0)` is `[200.0, 350.0, 500.0]`: the row
/// is 400 wide, so it starts at `400 - 400 / 2`.
pub fn layout_row(n: usize, slot_width: f64, spacing: f64, x_center: f64) -> Vec<f64> {
    let start_x = x_center - row_width(n, slot_width, spacing) / 2.0;
    (0..n)
        .map(|i| start_x + i as f64 * (slot_width + spacing))
        .collect()
}

/// Scale an image of `px_width` x `px_height` to fit inside `bounds`,
/// keeping its aspect ratio and centering it in the leftover space.
pub fn fit_contain(px_width: u32, px_height: u32, bounds: Rect) -> Rect {
    if px_width == 0 || px_height == 0 {
        return bounds;
    }
    let scale = (bounds.width / px_width as f64).min(bounds.height / px_height as f64);
    let width = px_width as f64 * scale;
    let height = px_height as f64 * scale;
    Rect {
        x: bounds.x + (bounds.width - width) / 2.0,
        y: bounds.y + (bounds.height - height) / 2.0,
        width,
        height,
    }
}
