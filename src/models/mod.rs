pub mod layout;

pub use layout::{BadgeStyle, ElementId, ElementLayout, ElementPositions, LayoutConfig, Point, Size};
