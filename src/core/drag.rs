use crate::core::geometry::{self, MonitorArea, Rect};
use crate::models::{ElementId, Point, Size};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DOUBLE_PRESS_WINDOW: Duration = Duration::from_millis(500);
/// Pointer travel (per axis) below which a press/release pair still counts as a click.
const CLICK_SLOP_PX: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Badge,
    Settings,
}

impl WindowKind {
    pub fn label(self) -> &'static str {
        match self {
            WindowKind::Badge => "badge",
            WindowKind::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Inside the badge window.
    Live,
    /// Inside the settings preview box.
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragTarget {
    Window { window: WindowKind },
    Element { surface: Surface, id: ElementId },
}

impl DragTarget {
    pub const fn window(window: WindowKind) -> Self {
        DragTarget::Window { window }
    }

    pub const fn element(surface: Surface, id: ElementId) -> Self {
        DragTarget::Element { surface, id }
    }

    /// The lock protects the live badge only; the preview and the settings window stay movable.
    pub fn respects_lock(&self) -> bool {
        matches!(
            self,
            DragTarget::Window {
                window: WindowKind::Badge
            } | DragTarget::Element {
                surface: Surface::Live,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Region a drag is confined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragBounds {
    /// Top-level window: clamp against the monitors enumerated at press time.
    Screen(Vec<MonitorArea>),
    /// Element: clamp against the parent's client rectangle.
    Local(Rect),
}

impl DragBounds {
    pub fn clamp(&self, desired: Point, size: Size) -> Point {
        match self {
            DragBounds::Screen(monitors) => geometry::clamp_to_screen(desired, size, monitors),
            DragBounds::Local(rect) => geometry::clamp_into(desired, size, *rect),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PressInput {
    pub target: DragTarget,
    pub origin: Point,
    pub pointer: Point,
    pub size: Size,
    pub bounds: DragBounds,
    pub button: PointerButton,
    pub at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressOutcome {
    Started,
    Ignored,
    /// Second quick press on the badge without a drag in between.
    DoublePress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DragStep {
    pub target: DragTarget,
    pub position: Point,
}

#[derive(Debug, Clone)]
struct DragSession {
    target: DragTarget,
    origin: Point,
    pointer: Point,
    size: Size,
    bounds: DragBounds,
    current: Point,
}

#[derive(Debug, Clone, Copy)]
struct LastPress {
    target: DragTarget,
    at: Instant,
    pointer: Point,
    travelled: bool,
}

fn beyond_slop(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() > CLICK_SLOP_PX || (a.y - b.y).abs() > CLICK_SLOP_PX
}

/// One drag state machine shared by every draggable unit: `Idle -> Dragging -> Idle`.
#[derive(Debug, Default)]
pub struct DragMachine {
    session: Option<DragSession>,
    last_press: Option<LastPress>,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn press(&mut self, input: PressInput, locked: bool) -> PressOutcome {
        if input.button != PointerButton::Primary {
            return PressOutcome::Ignored;
        }

        // only the badge background toggles visibility; buttons consume their own clicks
        if input.target == DragTarget::window(WindowKind::Badge) && self.is_double_press(&input) {
            self.last_press = None;
            self.session = None;
            return PressOutcome::DoublePress;
        }

        self.last_press = Some(LastPress {
            target: input.target,
            at: input.at,
            pointer: input.pointer,
            travelled: false,
        });

        if locked && input.target.respects_lock() {
            self.session = None;
            return PressOutcome::Ignored;
        }

        self.session = Some(DragSession {
            target: input.target,
            origin: input.origin,
            pointer: input.pointer,
            size: input.size,
            bounds: input.bounds,
            current: input.origin,
        });
        PressOutcome::Started
    }

    fn is_double_press(&self, input: &PressInput) -> bool {
        let Some(last) = self.last_press else {
            return false;
        };
        last.target == input.target
            && !last.travelled
            && input.at.saturating_duration_since(last.at) <= DOUBLE_PRESS_WINDOW
            && !beyond_slop(last.pointer, input.pointer)
    }

    /// Live feedback: the clamped position for the current pointer. Nothing is persisted here.
    pub fn move_to(&mut self, pointer: Point) -> Option<DragStep> {
        let session = self.session.as_mut()?;

        if let Some(last) = self.last_press.as_mut() {
            if beyond_slop(last.pointer, pointer) {
                last.travelled = true;
            }
        }

        let desired = session.origin.offset(
            pointer.x.saturating_sub(session.pointer.x),
            pointer.y.saturating_sub(session.pointer.y),
        );
        session.current = session.bounds.clamp(desired, session.size);
        Some(DragStep {
            target: session.target,
            position: session.current,
        })
    }

    /// Ends the gesture and yields the final clamped position to commit.
    pub fn release(&mut self) -> Option<DragStep> {
        let session = self.session.take()?;
        Some(DragStep {
            target: session.target,
            position: session.current,
        })
    }

    /// Drops an in-flight session without a commit (e.g. the owning surface closed).
    pub fn cancel_if(&mut self, pred: impl Fn(&DragTarget) -> bool) {
        if self.session.as_ref().is_some_and(|s| pred(&s.target)) {
            self.session = None;
        }
    }
}
