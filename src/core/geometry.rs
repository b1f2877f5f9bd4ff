use crate::models::{Point, Size};

/// Badge inset from the bottom-right corner of the primary work area on first launch.
const BADGE_DEFAULT_INSET: (i32, i32) = (12, 40);
const BADGE_FALLBACK: Point = Point::new(12, 40);
const SETTINGS_FALLBACK: Point = Point::new(100, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Local client rectangle of a window or surface of the given size.
    pub const fn local(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn right(&self) -> i32 {
        self.left.saturating_add(clamp_to_i32(self.width))
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(clamp_to_i32(self.height))
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.y >= self.top && p.x < self.right() && p.y < self.bottom()
    }

    #[cfg(test)]
    fn contains_rect(&self, origin: Point, size: Size) -> bool {
        origin.x >= self.left
            && origin.y >= self.top
            && origin.x.saturating_add(clamp_to_i32(size.width)) <= self.right()
            && origin.y.saturating_add(clamp_to_i32(size.height)) <= self.bottom()
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.left.saturating_add(clamp_to_i32(self.width / 2)),
            self.top.saturating_add(clamp_to_i32(self.height / 2)),
        )
    }
}

/// One enumerated display: its full geometry and the part not reserved by taskbars/docks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorArea {
    pub bounds: Rect,
    pub available: Rect,
    pub primary: bool,
}

fn clamp_to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn clamp_axis(value: i32, min: i32, span: u32, extent: u32) -> i32 {
    let max_offset = clamp_to_i32(span.saturating_sub(extent));
    let max = min.saturating_add(max_offset);
    value.clamp(min, max)
}

/// Constrains `desired` so a box of `size` at that origin stays inside `region`.
/// An element larger than the region in one dimension is pinned to the region's origin there.
pub fn clamp_into(desired: Point, size: Size, region: Rect) -> Point {
    Point::new(
        clamp_axis(desired.x, region.left, region.width, size.width),
        clamp_axis(desired.y, region.top, region.height, size.height),
    )
}

pub fn primary_monitor(monitors: &[MonitorArea]) -> Option<&MonitorArea> {
    monitors
        .iter()
        .find(|m| m.primary)
        .or_else(|| monitors.first())
}

fn monitor_containing_point(monitors: &[MonitorArea], p: Point) -> Option<&MonitorArea> {
    monitors.iter().find(|m| m.bounds.contains(p))
}

/// Available area of the monitor under `p`, falling back to the primary monitor.
pub fn screen_region(monitors: &[MonitorArea], p: Point) -> Option<Rect> {
    monitor_containing_point(monitors, p)
        .or_else(|| primary_monitor(monitors))
        .map(|m| m.available)
}

/// Screen-safe placement. Returns `desired` unchanged when no monitor is known.
pub fn clamp_to_screen(desired: Point, size: Size, monitors: &[MonitorArea]) -> Point {
    match screen_region(monitors, desired) {
        Some(region) => clamp_into(desired, size, region),
        None => desired,
    }
}

/// First-launch badge spot: bottom-right of the primary work area.
pub fn default_badge_position(size: Size, monitors: &[MonitorArea]) -> Point {
    let Some(primary) = primary_monitor(monitors) else {
        return BADGE_FALLBACK;
    };
    let area = primary.available;
    let desired = Point::new(
        area.right() - clamp_to_i32(size.width) - BADGE_DEFAULT_INSET.0,
        area.bottom() - clamp_to_i32(size.height) - BADGE_DEFAULT_INSET.1,
    );
    clamp_into(desired, size, area)
}

/// Settings window spot when none was persisted: centered on the badge, else on the primary
/// work area, else a fixed point.
pub fn default_settings_position(
    size: Size,
    badge_frame: Option<Rect>,
    monitors: &[MonitorArea],
) -> Point {
    let center = badge_frame
        .map(|r| r.center())
        .or_else(|| primary_monitor(monitors).map(|m| m.available.center()));
    match center {
        Some(c) => c.offset(
            -clamp_to_i32(size.width / 2),
            -clamp_to_i32(size.height / 2),
        ),
        None => SETTINGS_FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(left: i32, top: i32, w: u32, h: u32, taskbar: u32, primary: bool) -> MonitorArea {
        MonitorArea {
            bounds: Rect::new(left, top, w, h),
            available: Rect::new(left, top, w, h - taskbar),
            primary,
        }
    }

    fn dual() -> Vec<MonitorArea> {
        vec![
            monitor(0, 0, 1920, 1080, 40, true),
            monitor(1920, -200, 1280, 1024, 0, false),
        ]
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10, 20, 100, 100);
        assert!(r.contains(Point::new(10, 20)));
        assert!(r.contains(Point::new(109, 119)));
        assert!(!r.contains(Point::new(110, 20)));
        assert!(!r.contains(Point::new(10, 120)));
    }

    #[test]
    fn clamp_keeps_box_inside_the_monitor_under_the_point() {
        let monitors = dual();
        let size = Size::new(200, 100);
        let samples = [
            Point::new(-500, -500),
            Point::new(1900, 1070),
            Point::new(3100, 900),
            Point::new(2000, -150),
            Point::new(50_000, 50_000),
            Point::new(i32::MIN, i32::MAX),
        ];
        for p in samples {
            let out = clamp_to_screen(p, size, &monitors);
            let region = screen_region(&monitors, p).expect("region");
            assert!(region.contains_rect(out, size), "{p:?} -> {out:?}");
        }
    }

    #[test]
    fn clamp_is_idempotent() {
        let monitors = dual();
        for size in [Size::new(0, 0), Size::new(320, 90), Size::new(5000, 5000)] {
            for p in [
                Point::new(-1, -1),
                Point::new(1919, 1079),
                Point::new(2500, -300),
                Point::new(9999, 5),
            ] {
                let once = clamp_to_screen(p, size, &monitors);
                assert_eq!(clamp_to_screen(once, size, &monitors), once);
            }
        }
    }

    #[test]
    fn point_on_secondary_monitor_clamps_to_that_monitor() {
        let monitors = dual();
        let out = clamp_to_screen(Point::new(3150, 0), Size::new(200, 100), &monitors);
        assert_eq!(out, Point::new(1920 + 1280 - 200, 0));
    }

    #[test]
    fn point_off_every_monitor_uses_primary_work_area() {
        let monitors = dual();
        let out = clamp_to_screen(Point::new(-400, 5000), Size::new(200, 100), &monitors);
        assert_eq!(out, Point::new(0, 1040 - 100));
    }

    #[test]
    fn oversized_element_pins_to_region_origin() {
        let region = Rect::new(100, 50, 300, 200);
        let out = clamp_into(Point::new(250, 400), Size::new(500, 150), region);
        assert_eq!(out, Point::new(100, 100));
        let out = clamp_into(Point::new(-20, -20), Size::new(500, 900), region);
        assert_eq!(out, Point::new(100, 50));
    }

    #[test]
    fn no_monitors_degrades_to_identity() {
        let p = Point::new(-7000, 12);
        assert_eq!(clamp_to_screen(p, Size::new(100, 100), &[]), p);
        assert_eq!(screen_region(&[], p), None);
    }

    #[test]
    fn default_badge_sits_bottom_right_of_primary() {
        let monitors = dual();
        let out = default_badge_position(Size::new(200, 100), &monitors);
        assert_eq!(out, Point::new(1920 - 200 - 12, 1040 - 100 - 40));
        assert_eq!(default_badge_position(Size::new(200, 100), &[]), Point::new(12, 40));
    }

    #[test]
    fn default_settings_centers_on_badge_then_primary() {
        let monitors = dual();
        let size = Size::new(520, 520);
        let badge = Rect::new(1000, 800, 200, 100);
        assert_eq!(
            default_settings_position(size, Some(badge), &monitors),
            Point::new(1100 - 260, 850 - 260)
        );
        assert_eq!(
            default_settings_position(size, None, &monitors),
            Point::new(960 - 260, 520 - 260)
        );
        assert_eq!(default_settings_position(size, None, &[]), Point::new(100, 100));
    }
}
