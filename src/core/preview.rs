use crate::core::badge_layout::{self, ElementSizes};
use crate::core::geometry::Rect;
use crate::models::{BadgeStyle, ElementId, ElementLayout, LayoutConfig, Point, Size};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};

pub const PREVIEW_SIZE: Size = Size::new(320, 220);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreviewEvent {
    PositionsChanged { positions: ElementLayout },
}

/// Non-live copy of the badge elements inside the settings window.
#[derive(Debug)]
pub struct PreviewSurface {
    positions: ElementLayout,
    sizes: ElementSizes,
    events: Sender<PreviewEvent>,
}

impl PreviewSurface {
    fn new(positions: ElementLayout, events: Sender<PreviewEvent>) -> Self {
        Self {
            positions,
            sizes: ElementSizes::new(),
            events,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::local(PREVIEW_SIZE)
    }

    pub fn positions(&self) -> &ElementLayout {
        &self.positions
    }

    pub fn position(&self, id: ElementId) -> Point {
        self.positions.get(&id).copied().unwrap_or_default()
    }

    pub fn size_of(&self, id: ElementId) -> Size {
        badge_layout::size_of(&self.sizes, id)
    }

    /// New measurements (text or font changed) re-clamp everything into the box.
    pub fn set_sizes(&mut self, sizes: ElementSizes) {
        self.sizes = sizes;
        self.positions = badge_layout::clamp_layout(&self.positions, &self.sizes, self.bounds());
    }

    /// Applies an already-clamped drag position and publishes the full mapping.
    pub fn place(&mut self, id: ElementId, point: Point) {
        self.positions.insert(id, point);
        self.publish();
    }

    fn publish(&self) {
        // The receiver lives in the owning session; it only goes away together with us.
        let _ = self.events.send(PreviewEvent::PositionsChanged {
            positions: self.positions.clone(),
        });
    }
}

/// Pending edits of one settings-window visit. Dropping it discards everything.
#[derive(Debug)]
pub struct SettingsSession {
    preview: PreviewSurface,
    events: Receiver<PreviewEvent>,
    pending_positions: ElementLayout,
    draft: BadgeStyle,
}

impl SettingsSession {
    pub fn open(config: &LayoutConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let positions = config.resolved_elements();
        Self {
            preview: PreviewSurface::new(positions.clone(), tx),
            events: rx,
            pending_positions: positions,
            draft: config.style(),
        }
    }

    pub fn preview(&self) -> &PreviewSurface {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut PreviewSurface {
        &mut self.preview
    }

    /// Drains preview events in emission order; the last mapping wins.
    pub fn sync(&mut self) {
        while let Ok(PreviewEvent::PositionsChanged { positions }) = self.events.try_recv() {
            self.pending_positions = positions;
        }
    }

    pub fn draft(&self) -> &BadgeStyle {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: BadgeStyle) {
        self.draft = draft;
    }

    /// Consumes the session, yielding what accept should write.
    pub fn into_commit(mut self) -> (BadgeStyle, ElementLayout) {
        self.sync();
        (self.draft, self.pending_positions)
    }
}
