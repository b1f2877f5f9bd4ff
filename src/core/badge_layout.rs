use crate::core::geometry::{self, Rect};
use crate::models::{ElementId, ElementLayout, Size};
use std::collections::BTreeMap;

/// Padding added right of and below the outermost element when sizing the badge.
pub const BADGE_PADDING: u32 = 6;

/// Rendered element sizes as measured by the frontend.
pub type ElementSizes = BTreeMap<ElementId, Size>;

pub fn size_of(sizes: &ElementSizes, id: ElementId) -> Size {
    sizes.get(&id).copied().unwrap_or_default()
}

/// Badge window size that fits every element at its position.
pub fn fit_window_size(layout: &ElementLayout, sizes: &ElementSizes) -> Size {
    let mut right = 0i64;
    let mut bottom = 0i64;
    for (id, point) in layout {
        let size = size_of(sizes, *id);
        right = right.max(i64::from(point.x) + i64::from(size.width));
        bottom = bottom.max(i64::from(point.y) + i64::from(size.height));
    }
    let pad = i64::from(BADGE_PADDING);
    let to_u32 = |v: i64| u32::try_from((v + pad).max(0)).unwrap_or(u32::MAX);
    Size::new(to_u32(right), to_u32(bottom))
}

/// Clamps every element into `bounds`.
pub fn clamp_layout(layout: &ElementLayout, sizes: &ElementSizes, bounds: Rect) -> ElementLayout {
    layout
        .iter()
        .map(|(id, point)| (*id, geometry::clamp_into(*point, size_of(sizes, *id), bounds)))
        .collect()
}
