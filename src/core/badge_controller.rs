use crate::core::badge_layout::{self, ElementSizes};
use crate::core::drag::{
    DragBounds, DragMachine, DragStep, DragTarget, PointerButton, PressInput, PressOutcome,
    Surface, WindowKind,
};
use crate::core::errors::PersistenceError;
use crate::core::geometry::{self, MonitorArea, Rect};
use crate::core::persistence::LayoutStore;
use crate::core::preview::{SettingsSession, PREVIEW_SIZE};
use crate::core::style;
use crate::models::{BadgeStyle, ElementId, ElementLayout, ElementPositions, LayoutConfig, Point, Size};
use serde::Serialize;
use std::time::Instant;

/// Price text shown before the first quote arrives.
pub const PENDING_PRICE_TEXT: &str = "…";

#[derive(Debug, Clone, Serialize)]
pub struct BadgeSnapshot {
    pub instrument: String,
    pub subtitle: String,
    pub price_text: String,
    pub locked: bool,
    pub visible: bool,
    pub style: BadgeStyle,
    pub positions: ElementLayout,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsSnapshot {
    pub instrument: String,
    pub price_text: String,
    pub draft: BadgeStyle,
    pub positions: ElementLayout,
    pub preview_size: Size,
}

/// Result of a drag release.
#[derive(Debug)]
pub struct Committed {
    pub step: DragStep,
    /// Set when the position was persisted but the flush failed; memory stays authoritative.
    pub write_error: Option<PersistenceError>,
}

/// Owns the layout and every piece of UI state that is not a window handle.
#[derive(Debug)]
pub struct BadgeController {
    instrument: String,
    store: LayoutStore,
    locked: bool,
    visible: bool,
    drag: DragMachine,
    settings: Option<SettingsSession>,
    live_sizes: ElementSizes,
    price_text: String,
    status: Option<String>,
}

impl BadgeController {
    pub fn new(instrument: String, store: LayoutStore) -> Self {
        Self {
            instrument,
            store,
            locked: false,
            visible: true,
            drag: DragMachine::new(),
            settings: None,
            live_sizes: ElementSizes::new(),
            price_text: PENDING_PRICE_TEXT.to_string(),
            status: None,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.store.config()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        if self.locked {
            self.drag.cancel_if(DragTarget::respects_lock);
        }
        self.locked
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_price_text(&mut self, text: String) {
        self.price_text = text;
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    pub fn snapshot(&self) -> BadgeSnapshot {
        let config = self.store.config();
        BadgeSnapshot {
            instrument: self.instrument.clone(),
            subtitle: config.effective_subtitle(&self.instrument).to_string(),
            price_text: self.price_text.clone(),
            locked: self.locked,
            visible: self.visible,
            style: config.style(),
            positions: config.resolved_elements(),
            status: self.status.clone(),
        }
    }

    /// Records measured live element sizes and returns the badge window size that fits them.
    pub fn set_live_sizes(&mut self, sizes: ElementSizes) -> Size {
        self.live_sizes = sizes;
        self.badge_client_size()
    }

    pub fn badge_client_size(&self) -> Size {
        badge_layout::fit_window_size(&self.store.config().resolved_elements(), &self.live_sizes)
    }

    // ---- window placement ----

    /// Where the badge goes at startup. A first launch places and persists the default spot.
    pub fn restore_badge(
        &mut self,
        size: Size,
        monitors: &[MonitorArea],
    ) -> (Point, Result<(), PersistenceError>) {
        if let Some(saved) = self.store.config().badge_position {
            return (geometry::clamp_to_screen(saved, size, monitors), Ok(()));
        }
        let position = geometry::default_badge_position(size, monitors);
        let result = self.store.update(|cfg| cfg.badge_position = Some(position));
        (position, result)
    }

    /// New badge origin when its current frame no longer fits the screens, e.g. after the
    /// badge grew or a display changed. The persisted position is left alone.
    pub fn reclamp_badge(&self, frame: Rect, monitors: &[MonitorArea]) -> Option<Point> {
        let current = Point::new(frame.left, frame.top);
        let clamped =
            geometry::clamp_to_screen(current, Size::new(frame.width, frame.height), monitors);
        (clamped != current).then_some(clamped)
    }

    /// Where the settings window opens. Not persisted until the user moves it.
    pub fn settings_placement(
        &self,
        size: Size,
        badge_frame: Option<Rect>,
        monitors: &[MonitorArea],
    ) -> Point {
        let desired = self
            .store
            .config()
            .settings_position
            .unwrap_or_else(|| geometry::default_settings_position(size, badge_frame, monitors));
        geometry::clamp_to_screen(desired, size, monitors)
    }

    // ---- dragging ----

    pub fn press_window(
        &mut self,
        window: WindowKind,
        frame: Rect,
        monitors: Vec<MonitorArea>,
        pointer: Point,
        button: PointerButton,
        at: Instant,
    ) -> PressOutcome {
        let input = PressInput {
            target: DragTarget::window(window),
            origin: Point::new(frame.left, frame.top),
            pointer,
            size: Size::new(frame.width, frame.height),
            bounds: DragBounds::Screen(monitors),
            button,
            at,
        };
        let outcome = self.drag.press(input, self.locked);
        if outcome == PressOutcome::DoublePress {
            self.visible = !self.visible;
        }
        outcome
    }

    pub fn press_element(
        &mut self,
        surface: Surface,
        id: ElementId,
        pointer: Point,
        button: PointerButton,
        at: Instant,
    ) -> PressOutcome {
        let (origin, size, bounds) = match surface {
            Surface::Live => {
                let layout = self.store.config().resolved_elements();
                let origin = layout.get(&id).copied().unwrap_or_default();
                (
                    origin,
                    badge_layout::size_of(&self.live_sizes, id),
                    Rect::local(self.badge_client_size()),
                )
            }
            Surface::Preview => {
                let Some(session) = self.settings.as_ref() else {
                    return PressOutcome::Ignored;
                };
                let preview = session.preview();
                (preview.position(id), preview.size_of(id), preview.bounds())
            }
        };

        let input = PressInput {
            target: DragTarget::element(surface, id),
            origin,
            pointer,
            size,
            bounds: DragBounds::Local(bounds),
            button,
            at,
        };
        self.drag.press(input, self.locked)
    }

    /// Windows and live elements only get feedback; preview elements also update the preview.
    pub fn drag_move(&mut self, pointer: Point) -> Option<DragStep> {
        let step = self.drag.move_to(pointer)?;
        if let DragTarget::Element {
            surface: Surface::Preview,
            id,
        } = step.target
        {
            if let Some(session) = self.settings.as_mut() {
                session.preview_mut().place(id, step.position);
            }
        }
        Some(step)
    }

    /// Ends the drag and commits its final position. Preview positions only become pending.
    pub fn drag_release(&mut self) -> Option<Committed> {
        let step = self.drag.release()?;
        let position = step.position;
        let write = match step.target {
            DragTarget::Window {
                window: WindowKind::Badge,
            } => Some(self.store.update(|cfg| cfg.badge_position = Some(position))),
            DragTarget::Window {
                window: WindowKind::Settings,
            } => Some(self.store.update(|cfg| cfg.settings_position = Some(position))),
            DragTarget::Element {
                surface: Surface::Live,
                id,
            } => Some(
                self.store
                    .update(|cfg| cfg.element_positions.set(id, position)),
            ),
            DragTarget::Element {
                surface: Surface::Preview,
                id,
            } => {
                if let Some(session) = self.settings.as_mut() {
                    session.preview_mut().place(id, position);
                    session.sync();
                }
                None
            }
        };
        Some(Committed {
            step,
            write_error: write.and_then(Result::err),
        })
    }

    // ---- settings surface ----

    /// Starts editing from the committed layout. Re-opening keeps the pending session.
    pub fn open_settings(&mut self) {
        if self.settings.is_none() {
            self.settings = Some(SettingsSession::open(self.store.config()));
        }
    }

    pub fn settings_snapshot(&mut self) -> Option<SettingsSnapshot> {
        let instrument = self.instrument.clone();
        let price_text = self.price_text.clone();
        let session = self.settings.as_mut()?;
        session.sync();
        Some(SettingsSnapshot {
            instrument,
            price_text,
            draft: session.draft().clone(),
            positions: session.preview().positions().clone(),
            preview_size: PREVIEW_SIZE,
        })
    }

    pub fn set_preview_sizes(&mut self, sizes: ElementSizes) {
        if let Some(session) = self.settings.as_mut() {
            session.preview_mut().set_sizes(sizes);
        }
    }

    pub fn update_settings_draft(&mut self, draft: BadgeStyle) -> Option<BadgeStyle> {
        let normalized = style::normalize_style(draft, &self.instrument);
        let session = self.settings.as_mut()?;
        session.set_draft(normalized.clone());
        Some(normalized)
    }

    /// Writes pending style and positions in one flush. Returns false when nothing was open.
    pub fn accept_settings(&mut self) -> Result<bool, PersistenceError> {
        let Some(session) = self.settings.take() else {
            return Ok(false);
        };
        self.drag
            .cancel_if(|t| matches!(t, DragTarget::Element { surface: Surface::Preview, .. }));

        let (draft, positions) = session.into_commit();
        let draft = style::normalize_style(draft, &self.instrument);
        self.store.update(|cfg| {
            cfg.apply_style(draft);
            cfg.element_positions = ElementPositions::from_layout(&positions);
        })?;
        Ok(true)
    }

    /// Discards the session; the store is untouched.
    pub fn cancel_settings(&mut self) {
        self.drag
            .cancel_if(|t| matches!(t, DragTarget::Element { surface: Surface::Preview, .. }));
        self.settings = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persistence::{self, LAYOUT_FILE_NAME};
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    fn monitors() -> Vec<MonitorArea> {
        vec![MonitorArea {
            bounds: Rect::new(0, 0, 1920, 1080),
            available: Rect::new(0, 0, 1920, 1040),
            primary: true,
        }]
    }

    fn controller(dir: &tempfile::TempDir) -> (BadgeController, PathBuf) {
        let path = dir.path().join(LAYOUT_FILE_NAME);
        let (store, _) = LayoutStore::open(path.clone());
        (BadgeController::new("SHFE.cu2401".to_string(), store), path)
    }

    fn preview_sizes() -> ElementSizes {
        ElementId::ALL
            .into_iter()
            .map(|id| (id, Size::new(40, 20)))
            .collect()
    }

    #[test]
    fn first_restore_places_and_persists_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, path) = controller(&dir);
        let (pos, res) = c.restore_badge(Size::new(200, 100), &monitors());
        assert!(res.is_ok());
        assert_eq!(pos, Point::new(1708, 900));

        let saved = persistence::load(&path).expect("load").expect("present");
        assert_eq!(saved.badge_position, Some(pos));
    }

    #[test]
    fn restore_clamps_persisted_position_after_resolution_change() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        c.store
            .update(|cfg| cfg.badge_position = Some(Point::new(3000, 1500)))
            .expect("save");
        let (pos, _) = c.restore_badge(Size::new(200, 100), &monitors());
        assert_eq!(pos, Point::new(1720, 940));
    }

    #[test]
    fn grown_badge_is_pulled_back_inside_work_area() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        let (pos, _) = c.restore_badge(Size::new(200, 110), &monitors());
        assert_eq!(pos, Point::new(1708, 890));

        let grown = Rect::new(pos.x, pos.y, 260, 130);
        let moved = c.reclamp_badge(grown, &monitors()).expect("off screen");
        assert_eq!(moved, Point::new(1660, 890));
        let area = monitors()[0].available;
        assert!(moved.x + 260 <= area.right() && moved.y + 130 <= area.bottom());

        assert_eq!(c.reclamp_badge(Rect::new(moved.x, moved.y, 260, 130), &monitors()), None);
        assert_eq!(c.config().badge_position, Some(pos));
    }

    #[test]
    fn lock_and_settings_buttons_work_while_locked() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        assert!(c.toggle_lock());

        c.open_settings();
        assert!(c.settings_snapshot().is_some());
        c.cancel_settings();
        c.open_settings();
        assert!(c.settings_snapshot().is_some());

        assert!(!c.toggle_lock());
        assert!(c.toggle_lock());
        assert!(c.is_visible());
    }

    #[test]
    fn quick_element_presses_do_not_hide_badge() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        let t0 = Instant::now();
        for ms in [0, 100, 200] {
            let outcome = c.press_element(
                Surface::Live,
                ElementId::LockButton,
                Point::new(130, 10),
                PointerButton::Primary,
                t0 + Duration::from_millis(ms),
            );
            assert_eq!(outcome, PressOutcome::Started);
            c.drag_release();
        }
        assert!(c.is_visible());
    }

    #[test]
    fn badge_drag_persists_on_release_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, path) = controller(&dir);
        let t0 = Instant::now();
        let frame = Rect::new(100, 100, 200, 100);

        let outcome = c.press_window(
            WindowKind::Badge,
            frame,
            monitors(),
            Point::new(150, 120),
            PointerButton::Primary,
            t0,
        );
        assert_eq!(outcome, PressOutcome::Started);
        let step = c.drag_move(Point::new(250, 170)).expect("moving");
        assert_eq!(step.position, Point::new(200, 150));
        assert!(!path.exists());

        let done = c.drag_release().expect("released");
        assert!(done.write_error.is_none());
        let saved = persistence::load(&path).expect("load").expect("present");
        assert_eq!(saved.badge_position, Some(Point::new(200, 150)));
    }

    #[test]
    fn locked_badge_ignores_drag_but_settings_window_moves() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        assert!(c.toggle_lock());
        let t0 = Instant::now();

        let outcome = c.press_window(
            WindowKind::Badge,
            Rect::new(0, 0, 200, 100),
            monitors(),
            Point::new(10, 10),
            PointerButton::Primary,
            t0,
        );
        assert_eq!(outcome, PressOutcome::Ignored);
        assert!(c.drag_move(Point::new(40, 40)).is_none());

        let outcome = c.press_window(
            WindowKind::Settings,
            Rect::new(300, 300, 520, 520),
            monitors(),
            Point::new(310, 310),
            PointerButton::Primary,
            t0 + Duration::from_secs(1),
        );
        assert_eq!(outcome, PressOutcome::Started);
        let step = c.drag_move(Point::new(2000, 310)).expect("moving");
        assert_eq!(step.position, Point::new(1400, 300));
        let done = c.drag_release().expect("released");
        assert_eq!(c.config().settings_position, Some(done.step.position));
    }

    #[test]
    fn double_press_toggles_visibility() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        let t0 = Instant::now();
        let frame = Rect::new(0, 0, 200, 100);
        c.press_window(WindowKind::Badge, frame, monitors(), Point::new(5, 5), PointerButton::Primary, t0);
        c.drag_release();
        let outcome = c.press_window(
            WindowKind::Badge,
            frame,
            monitors(),
            Point::new(5, 5),
            PointerButton::Primary,
            t0 + Duration::from_millis(150),
        );
        assert_eq!(outcome, PressOutcome::DoublePress);
        assert!(!c.is_visible());
    }

    #[test]
    fn live_element_drag_clamps_to_badge_and_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, path) = controller(&dir);
        let mut sizes = ElementSizes::new();
        sizes.insert(ElementId::Subtitle, Size::new(100, 20));
        sizes.insert(ElementId::LockButton, Size::new(24, 22));
        sizes.insert(ElementId::EditButton, Size::new(24, 22));
        sizes.insert(ElementId::PriceLabel, Size::new(180, 70));
        let client = c.set_live_sizes(sizes);
        assert_eq!(client, Size::new(192, 104));

        let t0 = Instant::now();
        let outcome = c.press_element(
            Surface::Live,
            ElementId::LockButton,
            Point::new(500, 500),
            PointerButton::Primary,
            t0,
        );
        assert_eq!(outcome, PressOutcome::Started);
        let step = c.drag_move(Point::new(900, 400)).expect("moving");
        assert_eq!(step.position, Point::new(192 - 24, 0));
        c.drag_release().expect("released");

        let saved = persistence::load(&path).expect("load").expect("present");
        assert_eq!(saved.element_positions.lock_button, Some(Point::new(168, 0)));
    }

    #[test]
    fn cancel_leaves_layout_byte_for_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, path) = controller(&dir);
        c.store
            .update(|cfg| cfg.element_positions.set(ElementId::PriceLabel, Point::new(8, 30)))
            .expect("save");
        let before_bytes = fs::read(&path).expect("read");
        let before = c.config().element_positions.clone();

        c.open_settings();
        c.set_preview_sizes(preview_sizes());
        let t0 = Instant::now();
        c.toggle_lock();
        let outcome = c.press_element(
            Surface::Preview,
            ElementId::PriceLabel,
            Point::new(0, 0),
            PointerButton::Primary,
            t0,
        );
        assert_eq!(outcome, PressOutcome::Started);
        c.drag_move(Point::new(100, 100));
        let done = c.drag_release().expect("released");
        assert!(done.write_error.is_none());
        let mut draft = c.config().style();
        draft.badge_font_size = 20;
        c.update_settings_draft(draft);
        assert_eq!(
            c.settings_snapshot().expect("open").positions[&ElementId::PriceLabel],
            Point::new(108, 130)
        );

        c.cancel_settings();
        assert!(c.settings_snapshot().is_none());
        assert_eq!(c.config().element_positions, before);
        assert_eq!(c.config().badge_font_size, 56);
        assert_eq!(fs::read(&path).expect("read"), before_bytes);
    }

    #[test]
    fn accept_commits_pending_positions_and_style_at_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, path) = controller(&dir);
        c.open_settings();
        c.set_preview_sizes(preview_sizes());

        let t0 = Instant::now();
        c.press_element(Surface::Preview, ElementId::Subtitle, Point::new(10, 10), PointerButton::Primary, t0);
        c.drag_move(Point::new(30, 50));
        c.drag_release();

        let mut draft = c.config().style();
        draft.subtitle_text = "SHFE.cu2401".to_string();
        draft.badge_font_color = "#112233".to_string();
        c.update_settings_draft(draft);

        assert!(c.accept_settings().expect("accept"));
        assert!(c.settings_snapshot().is_none());

        let saved = persistence::load(&path).expect("load").expect("present");
        assert_eq!(saved.element_positions.subtitle, Some(Point::new(26, 42)));
        assert_eq!(saved.element_positions.lock_button, Some(Point::new(126, 2)));
        assert_eq!(saved.badge_font_color, "#112233");
        assert_eq!(saved.subtitle_text, "");
        assert_eq!(c.snapshot().subtitle, "SHFE.cu2401");
    }

    #[test]
    fn preview_moves_reach_the_session_before_release() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        c.open_settings();
        c.set_preview_sizes(preview_sizes());

        let t0 = Instant::now();
        c.press_element(Surface::Preview, ElementId::EditButton, Point::new(0, 0), PointerButton::Primary, t0);
        c.drag_move(Point::new(-500, 10));
        let snapshot = c.settings_snapshot().expect("open");
        assert_eq!(snapshot.positions[&ElementId::EditButton], Point::new(0, 12));
        assert!(c.config().element_positions.edit_button.is_none());
    }

    #[test]
    fn preview_press_without_session_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        let outcome = c.press_element(
            Surface::Preview,
            ElementId::EditButton,
            Point::new(0, 0),
            PointerButton::Primary,
            Instant::now(),
        );
        assert_eq!(outcome, PressOutcome::Ignored);
        assert!(!c.accept_settings().expect("noop"));
    }

    #[test]
    fn settings_placement_prefers_saved_then_centers_on_badge() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut c, _) = controller(&dir);
        let size = Size::new(520, 520);
        let badge = Rect::new(1600, 900, 200, 100);
        assert_eq!(
            c.settings_placement(size, Some(badge), &monitors()),
            Point::new(1400, 520)
        );

        c.store
            .update(|cfg| cfg.settings_position = Some(Point::new(-50, 10)))
            .expect("save");
        assert_eq!(c.settings_placement(size, Some(badge), &monitors()), Point::new(0, 10));
    }
}
