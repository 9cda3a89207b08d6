//! The derived palette: the deduplicated set of colors a design uses.
//!
//! Never stored, always recomputed from the current state, so undo/redo can
//! not leave it stale.

use super::DesignState;
use super::types::BackgroundFill;
use crate::color::Rgba;

/// Background colors first (solid color or gradient stops in offset order),
/// then the QR primary, secondary and, when visible, border colors.
pub fn derived_palette(state: &DesignState) -> Vec<Rgba> {
    let mut palette: Vec<Rgba> = Vec::new();
    let mut push = |c: Rgba| {
        if !palette.contains(&c) {
            palette.push(c);
        }
    };

    match &state.background().fill {
        BackgroundFill::Solid { color } => push(*color),
        BackgroundFill::Gradient { gradient } => {
            for stop in &gradient.stops {
                push(stop.color);
            }
        }
        BackgroundFill::Image { .. } => {}
    }

    let style = &state.qr().style;
    push(style.primary_color);
    push(style.secondary_color);
    if style.border_size_ratio > 0.0 {
        push(style.border_color);
    }

    palette
}
