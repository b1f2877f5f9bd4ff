use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_BADGE_FONT_SIZE: u32 = 56;
pub const DEFAULT_BADGE_FONT_COLOR: &str = "#A6E22E";
pub const DEFAULT_SUBTITLE_FONT_SIZE: u32 = 14;
pub const DEFAULT_SUBTITLE_FONT_COLOR: &str = "#9AA0A6";

const SUBTITLE_DEFAULT: Point = Point::new(6, 2);
const PRICE_DEFAULT: Point = Point::new(6, 28);
/// Lock button sits this far right of the subtitle, edit button this far right of the lock.
pub const LOCK_OFFSET_X: i32 = 120;
pub const EDIT_OFFSET_X: i32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementId {
    Subtitle,
    LockButton,
    EditButton,
    PriceLabel,
}

impl ElementId {
    pub const ALL: [ElementId; 4] = [
        ElementId::Subtitle,
        ElementId::LockButton,
        ElementId::EditButton,
        ElementId::PriceLabel,
    ];
}

/// Fully resolved element positions, window-local.
pub type ElementLayout = BTreeMap<ElementId, Point>;

/// Persisted element positions; `None` falls back to a default derived from the others.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ElementPositions {
    #[serde(rename = "badge_subtitle_pos")]
    pub subtitle: Option<Point>,
    #[serde(rename = "badge_lock_pos")]
    pub lock_button: Option<Point>,
    #[serde(rename = "badge_edit_pos")]
    pub edit_button: Option<Point>,
    #[serde(rename = "badge_price_pos")]
    pub price_label: Option<Point>,
}

impl ElementPositions {
    pub fn get(&self, id: ElementId) -> Option<Point> {
        match id {
            ElementId::Subtitle => self.subtitle,
            ElementId::LockButton => self.lock_button,
            ElementId::EditButton => self.edit_button,
            ElementId::PriceLabel => self.price_label,
        }
    }

    pub fn set(&mut self, id: ElementId, point: Point) {
        let slot = match id {
            ElementId::Subtitle => &mut self.subtitle,
            ElementId::LockButton => &mut self.lock_button,
            ElementId::EditButton => &mut self.edit_button,
            ElementId::PriceLabel => &mut self.price_label,
        };
        *slot = Some(point);
    }

    pub fn from_layout(layout: &ElementLayout) -> Self {
        let mut out = Self::default();
        for (id, point) in layout {
            out.set(*id, *point);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLayout")]
pub struct LayoutConfig {
    pub badge_font_size: u32,
    pub badge_font_color: String,
    pub subtitle_font_size: u32,
    pub subtitle_font_color: String,
    #[serde(rename = "badge_subtitle")]
    pub subtitle_text: String,
    #[serde(rename = "badge_pos")]
    pub badge_position: Option<Point>,
    #[serde(rename = "settings_pos")]
    pub settings_position: Option<Point>,
    #[serde(flatten)]
    pub element_positions: ElementPositions,
    /// Older files stored one header position for subtitle and buttons together.
    #[serde(skip)]
    pub legacy_header_position: Option<Point>,
}

/// A stored point; either coordinate may be missing.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct PartialPoint {
    x: Option<i32>,
    y: Option<i32>,
}

impl PartialPoint {
    fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }

    fn or(self, fallback: Point) -> Point {
        Point::new(self.x.unwrap_or(fallback.x), self.y.unwrap_or(fallback.y))
    }

    fn complete(self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }
}

/// On-disk shape of the layout file, before defaults are filled in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredLayout {
    badge_font_size: Option<u32>,
    badge_font_color: Option<String>,
    subtitle_font_size: Option<u32>,
    subtitle_font_color: Option<String>,
    badge_subtitle: Option<String>,
    badge_pos: Option<PartialPoint>,
    settings_pos: Option<PartialPoint>,
    badge_subtitle_pos: Option<PartialPoint>,
    badge_lock_pos: Option<PartialPoint>,
    badge_edit_pos: Option<PartialPoint>,
    badge_price_pos: Option<PartialPoint>,
    badge_header_pos: Option<PartialPoint>,
}

impl From<StoredLayout> for LayoutConfig {
    /// Window positions need both coordinates. Element coordinates fall back one axis at a time.
    fn from(stored: StoredLayout) -> Self {
        let defaults = LayoutConfig::default();
        let mut config = LayoutConfig {
            badge_font_size: stored.badge_font_size.unwrap_or(defaults.badge_font_size),
            badge_font_color: stored.badge_font_color.unwrap_or(defaults.badge_font_color),
            subtitle_font_size: stored
                .subtitle_font_size
                .unwrap_or(defaults.subtitle_font_size),
            subtitle_font_color: stored
                .subtitle_font_color
                .unwrap_or(defaults.subtitle_font_color),
            subtitle_text: stored.badge_subtitle.unwrap_or(defaults.subtitle_text),
            badge_position: stored.badge_pos.and_then(PartialPoint::complete),
            settings_position: stored.settings_pos.and_then(PartialPoint::complete),
            element_positions: ElementPositions::default(),
            legacy_header_position: stored
                .badge_header_pos
                .filter(|p| !p.is_empty())
                .map(|p| p.or(SUBTITLE_DEFAULT)),
        };

        let element_defaults = config.element_defaults();
        let stored_elements = [
            (ElementId::Subtitle, stored.badge_subtitle_pos),
            (ElementId::LockButton, stored.badge_lock_pos),
            (ElementId::EditButton, stored.badge_edit_pos),
            (ElementId::PriceLabel, stored.badge_price_pos),
        ];
        for (id, point) in stored_elements {
            if let Some(point) = point.filter(|p| !p.is_empty()) {
                config.element_positions.set(id, point.or(element_defaults[&id]));
            }
        }
        config
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            badge_font_size: DEFAULT_BADGE_FONT_SIZE,
            badge_font_color: DEFAULT_BADGE_FONT_COLOR.to_string(),
            subtitle_font_size: DEFAULT_SUBTITLE_FONT_SIZE,
            subtitle_font_color: DEFAULT_SUBTITLE_FONT_COLOR.to_string(),
            subtitle_text: String::new(),
            badge_position: None,
            settings_position: None,
            element_positions: ElementPositions::default(),
            legacy_header_position: None,
        }
    }
}

impl LayoutConfig {
    /// Subtitle shown on the badge; empty text follows the instrument id.
    pub fn effective_subtitle<'a>(&'a self, fallback: &'a str) -> &'a str {
        let text = self.subtitle_text.trim();
        if text.is_empty() {
            fallback
        } else {
            text
        }
    }

    pub fn element_defaults(&self) -> ElementLayout {
        let subtitle = self.legacy_header_position.unwrap_or(SUBTITLE_DEFAULT);
        let lock = subtitle.offset(LOCK_OFFSET_X, 0);
        let edit = lock.offset(EDIT_OFFSET_X, 0);

        let mut out = ElementLayout::new();
        out.insert(ElementId::Subtitle, subtitle);
        out.insert(ElementId::LockButton, lock);
        out.insert(ElementId::EditButton, edit);
        out.insert(ElementId::PriceLabel, PRICE_DEFAULT);
        out
    }

    /// Turns a legacy header position into explicit subtitle/lock/edit positions so the
    /// derived layout survives the next save, which drops the old key.
    pub fn migrate_legacy_header(&mut self) {
        if self.legacy_header_position.is_none() {
            return;
        }
        let defaults = self.element_defaults();
        for id in [ElementId::Subtitle, ElementId::LockButton, ElementId::EditButton] {
            if self.element_positions.get(id).is_none() {
                self.element_positions.set(id, defaults[&id]);
            }
        }
        self.legacy_header_position = None;
    }

    pub fn resolved_elements(&self) -> ElementLayout {
        let mut layout = self.element_defaults();
        for id in ElementId::ALL {
            if let Some(point) = self.element_positions.get(id) {
                layout.insert(id, point);
            }
        }
        layout
    }

    pub fn style(&self) -> BadgeStyle {
        BadgeStyle {
            badge_font_size: self.badge_font_size,
            badge_font_color: self.badge_font_color.clone(),
            subtitle_font_size: self.subtitle_font_size,
            subtitle_font_color: self.subtitle_font_color.clone(),
            subtitle_text: self.subtitle_text.clone(),
        }
    }

    pub fn apply_style(&mut self, style: BadgeStyle) {
        self.badge_font_size = style.badge_font_size;
        self.badge_font_color = style.badge_font_color;
        self.subtitle_font_size = style.subtitle_font_size;
        self.subtitle_font_color = style.subtitle_font_color;
        self.subtitle_text = style.subtitle_text;
    }
}

/// The style subset edited in the settings window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStyle {
    pub badge_font_size: u32,
    pub badge_font_color: String,
    pub subtitle_font_size: u32,
    pub subtitle_font_color: String,
    pub subtitle_text: String,
}
